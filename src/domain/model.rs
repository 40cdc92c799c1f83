use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// 一筆觀測資料，欄位依輸入順序保存
///
/// 缺值以 `Value::Null` 表示。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            data: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.data.get(field).and_then(Value::as_f64)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.data.insert(field.to_string(), value);
    }

    /// 寫入數值；非有限值 (NaN/inf) 視為缺值
    pub fn set_number(&mut self, field: &str, value: Option<f64>) {
        let value = value
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.set(field, value);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

/// 正規化後的分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "UK")]
    Uk,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Us, Category::Uk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Us => "US",
            Category::Uk => "UK",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "US" => Ok(Category::Us),
            "UK" => Ok(Category::Uk),
            other => Err(format!(
                "unknown category '{}', expected one of: US, UK",
                other
            )),
        }
    }
}

/// 查表結果：命中的分類，或查無對應 (寫出時使用哨兵值)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedCategory {
    Known(Category),
    Unknown,
}

impl ResolvedCategory {
    pub fn category(&self) -> Option<Category> {
        match self {
            ResolvedCategory::Known(category) => Some(*category),
            ResolvedCategory::Unknown => None,
        }
    }
}

/// 呼叫端提供的欄位契約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub label_column: String,
    pub measurement_column: String,
    #[serde(default = "default_category_column")]
    pub category_column: String,
    /// 未設定時直接覆寫量測欄位
    #[serde(default)]
    pub converted_column: Option<String>,
}

fn default_category_column() -> String {
    "category".to_string()
}

impl ColumnSchema {
    pub fn new(label_column: impl Into<String>, measurement_column: impl Into<String>) -> Self {
        Self {
            label_column: label_column.into(),
            measurement_column: measurement_column.into(),
            category_column: default_category_column(),
            converted_column: None,
        }
    }

    pub fn with_category_column(mut self, column: impl Into<String>) -> Self {
        self.category_column = column.into();
        self
    }

    pub fn with_converted_column(mut self, column: impl Into<String>) -> Self {
        self.converted_column = Some(column.into());
        self
    }

    /// 轉換結果寫入的欄位
    pub fn target_column(&self) -> &str {
        self.converted_column
            .as_deref()
            .unwrap_or(&self.measurement_column)
    }

    pub fn numeric_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.measurement_column.as_str()];
        if let Some(converted) = self.converted_column.as_deref() {
            columns.push(converted);
        }
        columns
    }

    /// 輸出表頭：輸入表頭依原順序，再補上尚未存在的必要欄位與新增欄位
    pub fn output_columns(&self, input_headers: &[String]) -> Vec<String> {
        let mut columns = input_headers.to_vec();
        let required = [
            Some(&self.label_column),
            Some(&self.measurement_column),
            Some(&self.category_column),
            self.converted_column.as_ref(),
        ];
        for column in required.into_iter().flatten() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }
}

/// 讀入的一批資料，連同輸入表頭
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub total: usize,
    pub resolved: usize,
    pub unknown: usize,
    pub converted: usize,
    pub missing_measurements: usize,
    /// 查無對應的原始標籤 (已排序、去重)
    pub unknown_labels: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    /// 寫出時的表頭
    pub columns: Vec<String>,
    pub processed_records: Vec<Record>,
    pub report: TransformReport,
}
