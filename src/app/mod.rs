use crate::adapters::storage::LocalStorage;
use crate::config::TomlConfig;
use crate::core::etl::{EtlEngine, EtlRun};
use crate::core::lookup::LookupTable;
use crate::core::pipeline::CsvPipeline;
use crate::core::Storage;
use crate::utils::error::Result;
use crate::utils::logger;
use crate::utils::validation::Validate;
use std::sync::Arc;

/// 依配置建立對照表
///
/// 檔案來源透過 `storage` 讀取；內嵌表直接解析。
pub async fn load_lookup<S: Storage>(config: &TomlConfig, storage: &S) -> Result<LookupTable> {
    match (&config.source.lookup_file, &config.source.lookup) {
        (Some(file), _) => {
            let bytes = storage.read_file(file).await?;
            LookupTable::from_csv(file, &bytes)
        }
        (None, Some(inline)) => LookupTable::from_text_pairs(
            "source.lookup",
            inline.iter().map(|(l, c)| (l.as_str(), c.as_str())),
        ),
        (None, None) => Ok(LookupTable::default()),
    }
}

/// 驗證配置、建立一次對照表，再依序處理每個輸入檔
///
/// 每個檔案各自在寫出時取樣時間戳。遇到第一個錯誤即停止並回傳。
/// 尚未安裝 tracing subscriber 時依 `[logging]` 安裝。
pub async fn run_from_config(config: &TomlConfig) -> Result<Vec<EtlRun>> {
    config.validate()?;
    if logger::init_from_config(&config.logging) {
        tracing::debug!("Logging initialized from [logging] section");
    }

    let storage = LocalStorage::new(config.pipeline.working_dir.clone());
    let lookup = Arc::new(load_lookup(config, &storage).await?);
    tracing::info!(
        "🔎 Loaded lookup table with {} entries for pipeline '{}'",
        lookup.len(),
        config.pipeline.name
    );

    let mut runs = Vec::new();
    for settings in config.pipeline_settings()? {
        tracing::info!("📄 Processing {}", settings.input);
        let pipeline = CsvPipeline::new(storage.clone(), settings, Arc::clone(&lookup));
        let engine = EtlEngine::new(pipeline);

        match engine.run().await {
            Ok(run) => runs.push(run),
            Err(e) => {
                tracing::error!(
                    "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                return Err(e);
            }
        }
    }

    tracing::info!("✅ Processed {} file(s)", runs.len());
    Ok(runs)
}
