use crate::core::Pipeline;
use crate::domain::model::TransformReport;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct EtlRun {
    pub output_path: String,
    pub report: TransformReport,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<EtlRun> {
        tracing::info!("Starting ETL process...");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} records ({} columns)",
            raw_data.len(),
            raw_data.headers.len()
        );

        // Transform
        let transformed_result = self.pipeline.transform(raw_data).await?;
        let report = transformed_result.report.clone();
        tracing::info!(
            total = report.total,
            resolved = report.resolved,
            unknown = report.unknown,
            converted = report.converted,
            missing = report.missing_measurements,
            "Transformed {} records",
            transformed_result.processed_records.len()
        );
        if !report.unknown_labels.is_empty() {
            tracing::warn!(
                "⚠️ {} record(s) have labels missing from the lookup table: {}",
                report.unknown,
                report.unknown_labels.join(", ")
            );
        }

        // Load
        let output_path = self.pipeline.load(transformed_result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(EtlRun {
            output_path,
            report,
        })
    }
}
