use crate::domain::model::Category;
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

/// 原始標籤到分類的對照表，建立後不可變
///
/// 多個 pipeline 以 `Arc<LookupTable>` 共用同一份，不需要加鎖。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    entries: HashMap<String, Category>,
}

impl LookupTable {
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Category)>,
        K: Into<String>,
    {
        let mut entries: HashMap<String, Category> = HashMap::new();
        for (label, category) in pairs {
            let label = label.into();
            match entries.get(&label) {
                Some(existing) if *existing != category => {
                    return Err(EtlError::schema(
                        "lookup table",
                        format!(
                            "label '{}' maps to both {} and {}",
                            label, existing, category
                        ),
                    ));
                }
                _ => {
                    entries.insert(label, category);
                }
            }
        }
        Ok(Self { entries })
    }

    /// 由文字對照建立，分類文字必須是已知分類
    pub fn from_text_pairs<'a, I>(source_name: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let parsed = pairs
            .into_iter()
            .map(|(label, category)| {
                category
                    .parse::<Category>()
                    .map(|c| (label.to_string(), c))
                    .map_err(|reason| {
                        EtlError::schema(source_name, format!("label '{}': {}", label, reason))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_pairs(parsed).map_err(|e| match e {
            EtlError::SchemaError { message, .. } => EtlError::schema(source_name, message),
            other => other,
        })
    }

    /// 讀取兩欄 CSV (含表頭)：原始標籤, 分類
    pub fn from_csv(source_name: &str, bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| EtlError::schema(source_name, e.to_string()))?
            .clone();
        if headers.len() != 2 {
            return Err(EtlError::schema(
                source_name,
                format!(
                    "lookup table needs exactly 2 columns (label, category), found {}",
                    headers.len()
                ),
            ));
        }

        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| EtlError::schema(source_name, e.to_string()))?;
            rows.push((row[0].to_string(), row[1].to_string()));
        }

        Self::from_text_pairs(
            source_name,
            rows.iter().map(|(l, c)| (l.as_str(), c.as_str())),
        )
    }

    pub fn get(&self, label: &str) -> Option<Category> {
        self.entries.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
