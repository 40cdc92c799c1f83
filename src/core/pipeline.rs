use crate::core::csv_io::{default_missing_markers, read_records, write_records};
use crate::core::lookup::LookupTable;
use crate::core::namer::OutputNamer;
use crate::core::resolver::UnknownLabelPolicy;
use crate::core::transformer::RecordTransformer;
use crate::core::{Clock, Pipeline, Storage, SystemClock, Table, TransformResult};
use crate::domain::model::ColumnSchema;
use crate::utils::error::Result;
use std::sync::Arc;

/// 單一輸入檔的處理設定
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub input: String,
    pub output_dir: String,
    pub schema: ColumnSchema,
    pub policy: UnknownLabelPolicy,
    pub missing_markers: Vec<String>,
    pub namer: OutputNamer,
}

impl PipelineSettings {
    pub fn new(input: impl Into<String>, output_dir: impl Into<String>, schema: ColumnSchema) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            schema,
            policy: UnknownLabelPolicy::default(),
            missing_markers: default_missing_markers(),
            namer: OutputNamer::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownLabelPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_namer(mut self, namer: OutputNamer) -> Self {
        self.namer = namer;
        self
    }

    pub fn with_missing_markers(mut self, markers: Vec<String>) -> Self {
        self.missing_markers = markers;
        self
    }
}

/// 讀取 CSV → 查表與轉換 → 以時間戳命名寫出
pub struct CsvPipeline<S: Storage, C: Clock = SystemClock> {
    storage: S,
    settings: PipelineSettings,
    lookup: Arc<LookupTable>,
    clock: C,
}

impl<S: Storage> CsvPipeline<S, SystemClock> {
    pub fn new(storage: S, settings: PipelineSettings, lookup: Arc<LookupTable>) -> Self {
        Self::with_clock(storage, settings, lookup, SystemClock)
    }
}

impl<S: Storage, C: Clock> CsvPipeline<S, C> {
    pub fn with_clock(
        storage: S,
        settings: PipelineSettings,
        lookup: Arc<LookupTable>,
        clock: C,
    ) -> Self {
        Self {
            storage,
            settings,
            lookup,
            clock,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn output_path(&self, file_name: &str) -> String {
        let dir = self.settings.output_dir.trim_end_matches('/');
        if dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", dir, file_name)
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: Clock> Pipeline for CsvPipeline<S, C> {
    async fn extract(&self) -> Result<Table> {
        let input = &self.settings.input;
        tracing::debug!("Reading input file: {}", input);

        let bytes = self.storage.read_file(input).await?;
        let table = read_records(
            input,
            &bytes,
            &self.settings.schema,
            &self.settings.missing_markers,
        )?;

        tracing::debug!("Parsed {} records from {} bytes", table.len(), bytes.len());
        Ok(table)
    }

    async fn transform(&self, data: Table) -> Result<TransformResult> {
        let transformer =
            RecordTransformer::new(&self.lookup, &self.settings.schema, &self.settings.policy);
        transformer.transform(data)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let bytes = write_records(&result.processed_records, &result.columns)?;

        // 時間戳在寫出當下才取樣
        let file_name = self.settings.namer.name_now(&self.settings.input, &self.clock);
        let output_path = self.output_path(&file_name);

        tracing::debug!("Writing {} bytes to {}", bytes.len(), output_path);
        self.storage.write_file(&output_path, &bytes).await?;

        Ok(output_path)
    }
}
