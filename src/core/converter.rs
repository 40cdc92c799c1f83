use crate::domain::model::{Category, ColumnSchema, Record, ResolvedCategory};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// 先乘以 5/9 的比值，有限輸入不會溢位成 inf
pub fn fahrenheit_to_celsius(value: f64) -> f64 {
    (value - 32.0) * (5.0 / 9.0)
}

/// 依分類轉換量測值
///
/// `US` 的量測值是華氏，換成攝氏；其他分類 (包含查無對應) 原值保留。
/// 缺值一律原樣傳回。
pub fn convert(category: ResolvedCategory, value: Option<f64>) -> Option<f64> {
    match (category, value) {
        (ResolvedCategory::Known(Category::Us), Some(v)) => Some(fahrenheit_to_celsius(v)),
        (_, value) => value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Converted,
    Unchanged,
    Missing,
}

pub struct UnitConverter<'a> {
    schema: &'a ColumnSchema,
}

impl<'a> UnitConverter<'a> {
    pub fn new(schema: &'a ColumnSchema) -> Self {
        Self { schema }
    }

    pub fn apply(
        &self,
        row: usize,
        category: ResolvedCategory,
        record: &mut Record,
    ) -> Result<Conversion> {
        let column = &self.schema.measurement_column;
        let value = match record.get(column) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => {
                return Err(EtlError::schema(
                    "record batch",
                    format!("row {}: column '{}' is not numeric: {}", row, column, other),
                ));
            }
        };

        let converted = convert(category, value);
        record.set_number(self.schema.target_column(), converted);

        Ok(match (value, category.category()) {
            (None, _) => Conversion::Missing,
            (Some(_), Some(Category::Us)) => Conversion::Converted,
            (Some(_), _) => Conversion::Unchanged,
        })
    }
}
