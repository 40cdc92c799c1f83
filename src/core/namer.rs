use crate::domain::ports::Clock;
use crate::utils::error::Result;
use crate::utils::validation::validate_timestamp_format;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::Path;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";
pub const DEFAULT_SUFFIX: &str = "_processed";

/// 產生輸出檔名：`<時間戳>_<檔名><後綴>.<副檔名>`
///
/// 時間永遠在呼叫當下取得 (`name_now`) 或由呼叫端傳入 (`name_at`)，
/// 本身不保存任何時間。月份/星期名稱固定以英文呈現，不受系統 locale 影響。
#[derive(Debug, Clone)]
pub struct OutputNamer {
    format: String,
    timezone: Tz,
    suffix: String,
}

impl OutputNamer {
    pub fn new(format: impl Into<String>, timezone: Tz, suffix: impl Into<String>) -> Result<Self> {
        let format = format.into();
        validate_timestamp_format("timestamp_format", &format)?;
        Ok(Self {
            format,
            timezone,
            suffix: suffix.into(),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn name_at(&self, input: &str, at: DateTime<Utc>) -> String {
        let stamp = at.with_timezone(&self.timezone).format(&self.format);

        let path = Path::new(input);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}_{}{}.{}", stamp, stem, self.suffix, ext),
            None => format!("{}_{}{}", stamp, stem, self.suffix),
        }
    }

    pub fn name_now<C: Clock + ?Sized>(&self, input: &str, clock: &C) -> String {
        self.name_at(input, clock.now())
    }
}

impl Default for OutputNamer {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timezone: Tz::UTC,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}
