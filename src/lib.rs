pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::LocalStorage;
pub use app::run_from_config;
pub use config::TomlConfig;
pub use crate::core::{
    etl::{EtlEngine, EtlRun},
    lookup::LookupTable,
    namer::OutputNamer,
    pipeline::{CsvPipeline, PipelineSettings},
    resolver::UnknownLabelPolicy,
    transformer::RecordTransformer,
};
pub use domain::model::{Category, ColumnSchema, Record, TransformReport, TransformResult};
pub use domain::ports::{Clock, SystemClock};
pub use utils::error::{EtlError, Result};
