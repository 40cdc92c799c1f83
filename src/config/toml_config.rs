use crate::core::csv_io::default_missing_markers;
use crate::core::namer::{OutputNamer, DEFAULT_SUFFIX, DEFAULT_TIMESTAMP_FORMAT};
use crate::core::pipeline::PipelineSettings;
use crate::core::resolver::{UnknownLabelPolicy, DEFAULT_UNKNOWN_SENTINEL};
use crate::domain::model::{Category, ColumnSchema};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub schema: ColumnSchema,
    #[serde(default)]
    pub transform: TransformConfig,
    pub load: LoadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 所有相對路徑的根目錄
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub inputs: Vec<String>,
    #[serde(default)]
    pub lookup_file: Option<String>,
    /// 內嵌對照表：原始標籤 = 分類
    #[serde(default)]
    pub lookup: Option<BTreeMap<String, String>>,
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_sentinel")]
    pub unknown_sentinel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

fn default_working_dir() -> String {
    ".".to_string()
}

fn default_sentinel() -> String {
    DEFAULT_UNKNOWN_SENTINEL.to_string()
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            strict: false,
            unknown_sentinel: default_sentinel(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EtlError::io("reading config", path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn policy(&self) -> UnknownLabelPolicy {
        if self.transform.strict {
            UnknownLabelPolicy::Strict
        } else {
            UnknownLabelPolicy::Sentinel(self.transform.unknown_sentinel.clone())
        }
    }

    pub fn namer(&self) -> Result<OutputNamer> {
        let timezone = validation::validate_timezone("load.timezone", &self.load.timezone)?;
        OutputNamer::new(
            self.load.timestamp_format.clone(),
            timezone,
            self.load.suffix.clone(),
        )
    }

    /// 每個輸入檔各自一份設定
    pub fn pipeline_settings(&self) -> Result<Vec<PipelineSettings>> {
        let namer = self.namer()?;
        let policy = self.policy();

        Ok(self
            .source
            .inputs
            .iter()
            .map(|input| {
                PipelineSettings::new(input.clone(), self.load.output_path.clone(), self.schema.clone())
                    .with_policy(policy.clone())
                    .with_namer(namer.clone())
                    .with_missing_markers(self.source.missing_markers.clone())
            })
            .collect())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("pipeline.working_dir", &self.pipeline.working_dir)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if self.source.inputs.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "source.inputs".to_string(),
            });
        }
        for input in &self.source.inputs {
            validation::validate_path("source.inputs", input)?;
        }

        // 對照表來源只能擇一
        match (&self.source.lookup_file, &self.source.lookup) {
            (Some(file), None) => validation::validate_path("source.lookup_file", file)?,
            (None, Some(_)) => {}
            (None, None) => {
                return Err(EtlError::MissingConfigError {
                    field: "source.lookup_file or source.lookup".to_string(),
                });
            }
            (Some(file), Some(_)) => {
                return Err(EtlError::InvalidConfigValueError {
                    field: "source.lookup".to_string(),
                    value: file.clone(),
                    reason: "Set either lookup_file or an inline lookup table, not both".to_string(),
                });
            }
        }

        validation::validate_non_empty_string("schema.label_column", &self.schema.label_column)?;
        validation::validate_non_empty_string(
            "schema.measurement_column",
            &self.schema.measurement_column,
        )?;
        validation::validate_non_empty_string(
            "schema.category_column",
            &self.schema.category_column,
        )?;
        let mut columns = vec![
            self.schema.label_column.as_str(),
            self.schema.measurement_column.as_str(),
            self.schema.category_column.as_str(),
        ];
        if let Some(converted) = self.schema.converted_column.as_deref() {
            validation::validate_non_empty_string("schema.converted_column", converted)?;
            columns.push(converted);
        }
        validation::validate_distinct("schema", &columns)?;

        if !self.transform.strict {
            let sentinel = &self.transform.unknown_sentinel;
            if Category::ALL.iter().any(|c| c.as_str() == sentinel.trim()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "transform.unknown_sentinel".to_string(),
                    value: sentinel.clone(),
                    reason: "Sentinel must differ from every valid category".to_string(),
                });
            }
        }

        validation::validate_timestamp_format("load.timestamp_format", &self.load.timestamp_format)?;
        validation::validate_timezone("load.timezone", &self.load.timezone)?;

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[pipeline]
name = "coastal-observations"

[source]
inputs = ["obs.csv"]
lookup_file = "lookup.csv"

[schema]
label_column = "label"
measurement_column = "value"

[load]
output_path = "./output"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.pipeline.name, "coastal-observations");
        assert_eq!(config.pipeline.working_dir, ".");
        assert_eq!(config.schema.category_column, "category");
        assert_eq!(config.schema.converted_column, None);
        assert_eq!(config.source.missing_markers, default_missing_markers());
        assert_eq!(config.load.timestamp_format, "%Y-%m-%d_%H-%M");
        assert_eq!(config.load.timezone, "UTC");
        assert_eq!(config.policy(), UnknownLabelPolicy::Sentinel("unknown".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inline_lookup_and_strict_mode() {
        let toml_content = r#"
[pipeline]
name = "inline"

[source]
inputs = ["a.csv", "b.csv"]

[source.lookup]
beach = "US"
seashore = "UK"

[schema]
label_column = "place"
measurement_column = "temp"
converted_column = "temp_c"

[transform]
strict = true

[load]
output_path = "out"
timezone = "Europe/London"
suffix = "_clean"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.policy(), UnknownLabelPolicy::Strict);

        let settings = config.pipeline_settings().unwrap();
        assert_eq!(settings.len(), 2);
        assert_eq!(settings[1].input, "b.csv");
        assert_eq!(settings[0].schema.target_column(), "temp_c");
        assert_eq!(settings[0].namer.timezone(), chrono_tz::Europe::London);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OBS_ETL_TEST_OUTPUT", "/tmp/obs-output");

        let config = TomlConfig::from_toml_str(&BASIC.replace("./output", "${OBS_ETL_TEST_OUTPUT}"))
            .unwrap();
        assert_eq!(config.load.output_path, "/tmp/obs-output");

        std::env::remove_var("OBS_ETL_TEST_OUTPUT");
    }

    #[test]
    fn test_unset_env_var_is_kept() {
        let config =
            TomlConfig::from_toml_str(&BASIC.replace("./output", "${OBS_ETL_SURELY_UNSET}")).unwrap();
        assert_eq!(config.load.output_path, "${OBS_ETL_SURELY_UNSET}");
    }

    #[test]
    fn test_config_validation_errors() {
        let both = BASIC.replace(
            "lookup_file = \"lookup.csv\"",
            "lookup_file = \"lookup.csv\"\nlookup = { beach = \"US\" }",
        );
        assert!(TomlConfig::from_toml_str(&both).unwrap().validate().is_err());

        let neither = BASIC.replace("lookup_file = \"lookup.csv\"", "");
        assert!(TomlConfig::from_toml_str(&neither).unwrap().validate().is_err());

        let no_inputs = BASIC.replace("inputs = [\"obs.csv\"]", "inputs = []");
        assert!(TomlConfig::from_toml_str(&no_inputs).unwrap().validate().is_err());

        let same_columns = BASIC.replace("measurement_column = \"value\"", "measurement_column = \"label\"");
        assert!(TomlConfig::from_toml_str(&same_columns).unwrap().validate().is_err());

        let bad_tz = format!("{}timezone = \"Nowhere/Land\"\n", BASIC);
        assert!(TomlConfig::from_toml_str(&bad_tz).unwrap().validate().is_err());

        let bad_format = format!("{}timestamp_format = \"%Y/%m\"\n", BASIC);
        assert!(TomlConfig::from_toml_str(&bad_format).unwrap().validate().is_err());

        let sentinel = format!("{}\n[transform]\nunknown_sentinel = \"US\"\n", BASIC);
        assert!(TomlConfig::from_toml_str(&sentinel).unwrap().validate().is_err());
    }

    #[test]
    fn test_logging_section() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        assert!(!config.logging.verbose);
        assert!(!config.logging.json);

        let with_logging = format!("{}\n[logging]\nverbose = true\njson = true\n", BASIC);
        let config = TomlConfig::from_toml_str(&with_logging).unwrap();
        assert!(config.logging.verbose);
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let err = TomlConfig::from_toml_str("[pipeline]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "coastal-observations");
    }
}
