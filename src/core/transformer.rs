use crate::core::converter::{Conversion, UnitConverter};
use crate::core::lookup::LookupTable;
use crate::core::resolver::{CategoryResolver, UnknownLabelPolicy};
use crate::domain::model::{
    ColumnSchema, ResolvedCategory, Table, TransformReport, TransformResult,
};
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// 對整批資料依序套用查表與單位轉換
///
/// 不保存任何跨呼叫狀態；相同輸入與相同對照表一定得到相同輸出。
/// strict 模式下只要有一筆查無對應，整批失敗，不回傳部分結果。
pub struct RecordTransformer<'a> {
    schema: &'a ColumnSchema,
    resolver: CategoryResolver<'a>,
    converter: UnitConverter<'a>,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(
        table: &'a LookupTable,
        schema: &'a ColumnSchema,
        policy: &'a UnknownLabelPolicy,
    ) -> Self {
        Self {
            schema,
            resolver: CategoryResolver::new(table, schema, policy),
            converter: UnitConverter::new(schema),
        }
    }

    pub fn transform(&self, table: Table) -> Result<TransformResult> {
        let Table { headers, records } = table;
        let mut report = TransformReport {
            total: records.len(),
            ..TransformReport::default()
        };
        let mut unknown_labels = BTreeSet::new();
        let mut processed_records = Vec::with_capacity(records.len());

        for (index, mut record) in records.into_iter().enumerate() {
            let row = index + 1;
            let resolved = self.resolver.resolve(row, &mut record)?;

            match resolved {
                ResolvedCategory::Known(_) => report.resolved += 1,
                ResolvedCategory::Unknown => {
                    report.unknown += 1;
                    unknown_labels.insert(
                        record
                            .text(self.resolver.label_column())
                            .unwrap_or("")
                            .to_string(),
                    );
                }
            }

            match self.converter.apply(row, resolved, &mut record)? {
                Conversion::Converted => report.converted += 1,
                Conversion::Missing => report.missing_measurements += 1,
                Conversion::Unchanged => {}
            }

            processed_records.push(record);
        }

        report.unknown_labels = unknown_labels.into_iter().collect();

        Ok(TransformResult {
            columns: self.schema.output_columns(&headers),
            processed_records,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Category;
    use crate::domain::model::Record;
    use crate::utils::error::EtlError;
    use serde_json::{json, Value};

    fn table() -> LookupTable {
        LookupTable::from_pairs([("beach", Category::Us), ("seashore", Category::Uk)]).unwrap()
    }

    fn batch(rows: &[(&str, Option<f64>)]) -> Table {
        let records = rows
            .iter()
            .map(|(label, value)| {
                let value = value.map(|v| json!(v)).unwrap_or(Value::Null);
                Record::from_pairs([("label", json!(label)), ("value", value)])
            })
            .collect();
        Table::new(vec!["label".to_string(), "value".to_string()], records)
    }

    #[test]
    fn test_transform_scenario() {
        let table = table();
        let schema = ColumnSchema::new("label", "value");
        let policy = UnknownLabelPolicy::default();
        let transformer = RecordTransformer::new(&table, &schema, &policy);

        let result = transformer
            .transform(batch(&[("beach", Some(212.0)), ("seashore", Some(0.0))]))
            .unwrap();

        let out = &result.processed_records;
        assert_eq!(result.columns, vec!["label", "value", "category"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text("label"), Some("beach"));
        assert_eq!(out[0].text("category"), Some("US"));
        assert_eq!(out[0].number("value"), Some(100.0));
        assert_eq!(out[1].text("label"), Some("seashore"));
        assert_eq!(out[1].text("category"), Some("UK"));
        assert_eq!(out[1].number("value"), Some(0.0));

        assert_eq!(result.report.total, 2);
        assert_eq!(result.report.resolved, 2);
        assert_eq!(result.report.converted, 1);
        assert_eq!(result.report.unknown, 0);
    }

    #[test]
    fn test_preserves_length_and_order_with_gaps() {
        let table = table();
        let schema = ColumnSchema::new("label", "value");
        let policy = UnknownLabelPolicy::default();
        let transformer = RecordTransformer::new(&table, &schema, &policy);

        let input = batch(&[
            ("lake", Some(50.0)),
            ("beach", None),
            ("seashore", Some(3.0)),
            ("lake", None),
            ("pond", Some(1.0)),
        ]);
        let result = transformer.transform(input).unwrap();

        let labels: Vec<&str> = result
            .processed_records
            .iter()
            .map(|r| r.text("label").unwrap())
            .collect();
        assert_eq!(labels, vec!["lake", "beach", "seashore", "lake", "pond"]);

        assert_eq!(result.processed_records[0].text("category"), Some("unknown"));
        assert_eq!(result.processed_records[0].number("value"), Some(50.0));
        assert_eq!(result.processed_records[1].get("value"), Some(&Value::Null));

        assert_eq!(result.report.unknown, 3);
        assert_eq!(result.report.missing_measurements, 2);
        assert_eq!(result.report.unknown_labels, vec!["lake", "pond"]);
    }

    #[test]
    fn test_strict_mode_fails_whole_batch() {
        let table = table();
        let schema = ColumnSchema::new("label", "value");
        let policy = UnknownLabelPolicy::Strict;
        let transformer = RecordTransformer::new(&table, &schema, &policy);

        let err = transformer
            .transform(batch(&[("beach", Some(212.0)), ("lake", Some(10.0))]))
            .unwrap_err();
        match err {
            EtlError::DataQualityError { row, label } => {
                assert_eq!(row, 2);
                assert_eq!(label, "lake");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_deterministic_across_calls() {
        let table = table();
        let schema = ColumnSchema::new("label", "value").with_converted_column("celsius");
        let policy = UnknownLabelPolicy::default();
        let transformer = RecordTransformer::new(&table, &schema, &policy);

        let input = batch(&[("beach", Some(98.6)), ("lake", Some(1.0)), ("seashore", None)]);
        let first = transformer.transform(input.clone()).unwrap();
        let second = transformer.transform(input).unwrap();

        assert_eq!(first.processed_records, second.processed_records);
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn test_empty_batch() {
        let table = table();
        let schema = ColumnSchema::new("label", "value");
        let policy = UnknownLabelPolicy::Strict;
        let transformer = RecordTransformer::new(&table, &schema, &policy);

        let result = transformer.transform(Table::default()).unwrap();
        assert!(result.processed_records.is_empty());
        assert_eq!(result.report, TransformReport::default());
    }
}
