use crate::utils::error::{EtlError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 欄位名稱不可重複，否則輸出會互相覆蓋
pub fn validate_distinct(field_name: &str, values: &[&str]) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(*value) {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Column name is used more than once".to_string(),
            });
        }
    }
    Ok(())
}

/// 驗證 strftime 格式：必須可解析，且不能產生路徑分隔符
pub fn validate_timestamp_format(field_name: &str, format: &str) -> Result<()> {
    validate_non_empty_string(field_name, format)?;

    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format.to_string(),
            reason: "Invalid strftime pattern".to_string(),
        });
    }

    // %D、%x 等日期縮寫會展開成含 '/' 的字面項目
    let renders_separator = items.iter().any(|item| match item {
        Item::Literal(text) => text.contains('/') || text.contains('\\'),
        _ => false,
    });
    if renders_separator {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format.to_string(),
            reason: "Timestamp must not render path separators".to_string(),
        });
    }

    Ok(())
}

pub fn validate_timezone(field_name: &str, timezone: &str) -> Result<Tz> {
    timezone
        .parse::<Tz>()
        .map_err(|e| EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: timezone.to_string(),
            reason: format!("Unknown IANA timezone: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("load.output_path", "./output").is_ok());
        assert!(validate_path("load.output_path", "").is_err());
        assert!(validate_path("load.output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_distinct() {
        assert!(validate_distinct("schema", &["label", "value", "category"]).is_ok());
        assert!(validate_distinct("schema", &["label", "value", "label"]).is_err());
    }

    #[test]
    fn test_validate_timestamp_format() {
        assert!(validate_timestamp_format("load.timestamp_format", "%Y-%m-%d_%H-%M").is_ok());
        assert!(validate_timestamp_format("load.timestamp_format", "%d%b%Y").is_ok());
        assert!(validate_timestamp_format("load.timestamp_format", "%Y/%m/%d").is_err());
        assert!(validate_timestamp_format("load.timestamp_format", "%D").is_err());
        assert!(validate_timestamp_format("load.timestamp_format", "%x").is_err());
        assert!(validate_timestamp_format("load.timestamp_format", "%Y%%D").is_ok());
        assert!(validate_timestamp_format("load.timestamp_format", "%Y\\%m").is_err());
        assert!(validate_timestamp_format("load.timestamp_format", "%Q").is_err());
        assert!(validate_timestamp_format("load.timestamp_format", "  ").is_err());
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("load.timezone", "UTC").is_ok());
        assert!(validate_timezone("load.timezone", "Europe/London").is_ok());
        assert!(validate_timezone("load.timezone", "Mars/Olympus").is_err());
    }
}
