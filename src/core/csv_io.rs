use crate::domain::model::{ColumnSchema, Record, Table};
use crate::utils::error::{EtlError, Result};
use serde_json::{Number, Value};

pub fn default_missing_markers() -> Vec<String> {
    ["", "NA", "NaN", "null"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// 解析 CSV：表頭必須包含標籤與量測欄位，量測欄位轉成數值
pub fn read_records(
    source_name: &str,
    bytes: &[u8],
    schema: &ColumnSchema,
    missing_markers: &[String],
) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EtlError::schema(source_name, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    for required in [&schema.label_column, &schema.measurement_column] {
        if !headers.iter().any(|h| h == required) {
            return Err(EtlError::schema(
                source_name,
                format!("missing required column '{}'", required),
            ));
        }
    }

    let numeric = schema.numeric_columns();
    let mut records = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row = row.map_err(|e| EtlError::schema(source_name, e.to_string()))?;
        let mut record = Record::new();

        for (header, raw) in headers.iter().zip(row.iter()) {
            let value = if numeric.contains(&header.as_str()) {
                parse_measurement(raw, missing_markers).ok_or_else(|| {
                    EtlError::schema(
                        source_name,
                        format!(
                            "row {}: column '{}' is not numeric: {:?}",
                            index + 1,
                            header,
                            raw
                        ),
                    )
                })?
            } else {
                Value::String(raw.to_string())
            };
            record.set(header, value);
        }

        records.push(record);
    }

    Ok(Table::new(headers, records))
}

/// 缺值標記回傳 `Null`；無法解析或非有限值回傳 `None`
fn parse_measurement(raw: &str, missing_markers: &[String]) -> Option<Value> {
    let trimmed = raw.trim();
    if missing_markers.iter().any(|m| m == trimmed) {
        return Some(Value::Null);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// 寫出 CSV。表頭以 `columns` 為準，資料中額外出現的欄位依序附加在後面
pub fn write_records(records: &[Record], columns: &[String]) -> Result<Vec<u8>> {
    let mut columns = columns.to_vec();
    for record in records {
        for column in record.columns() {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| render_value(record.get(column)))
            .collect();
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::io("encoding", "csv output buffer", e.into_error()))
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}
