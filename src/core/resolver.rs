use crate::core::lookup::LookupTable;
use crate::domain::model::{ColumnSchema, Record, ResolvedCategory};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

pub const DEFAULT_UNKNOWN_SENTINEL: &str = "unknown";

/// 查無對應標籤時的處理方式，整個批次一致套用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownLabelPolicy {
    /// 分類欄位寫入哨兵值並繼續
    Sentinel(String),
    /// 直接回傳 `DataQualityError`
    Strict,
}

impl Default for UnknownLabelPolicy {
    fn default() -> Self {
        Self::Sentinel(DEFAULT_UNKNOWN_SENTINEL.to_string())
    }
}

pub struct CategoryResolver<'a> {
    table: &'a LookupTable,
    schema: &'a ColumnSchema,
    policy: &'a UnknownLabelPolicy,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(
        table: &'a LookupTable,
        schema: &'a ColumnSchema,
        policy: &'a UnknownLabelPolicy,
    ) -> Self {
        Self {
            table,
            schema,
            policy,
        }
    }

    pub fn label_column(&self) -> &str {
        &self.schema.label_column
    }

    /// 查表並寫入分類欄位。`row` 從 1 起算，只用於錯誤訊息
    pub fn resolve(&self, row: usize, record: &mut Record) -> Result<ResolvedCategory> {
        let label = record
            .text(&self.schema.label_column)
            .unwrap_or("")
            .to_string();

        match self.table.get(&label) {
            Some(category) => {
                record.set(
                    &self.schema.category_column,
                    Value::String(category.as_str().to_string()),
                );
                Ok(ResolvedCategory::Known(category))
            }
            None => match self.policy {
                UnknownLabelPolicy::Strict => Err(EtlError::DataQualityError {
                    row,
                    label,
                }),
                UnknownLabelPolicy::Sentinel(sentinel) => {
                    record.set(&self.schema.category_column, Value::String(sentinel.clone()));
                    Ok(ResolvedCategory::Unknown)
                }
            },
        }
    }
}
