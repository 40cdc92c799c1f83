use crate::config::toml_config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "obs_etl=debug,info"
    } else {
        "obs_etl=info"
    }
}

/// 依 `[logging]` 安裝全域 subscriber
///
/// `RUST_LOG` 優先於配置。已有 subscriber 時不覆蓋，回傳 `false`。
pub fn init_from_config(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.verbose)));
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .try_init()
    };

    installed.is_ok()
}
