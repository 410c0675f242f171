use crate::adapters::gemini::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, DEFAULT_TEMPERATURE};
use crate::config::credentials::API_KEY_ENV;
use crate::core::catalog::SpecialtyCatalog;
use crate::core::history::DEFAULT_HISTORY_LIMIT;
use crate::core::prompt::PromptTemplate;
use crate::core::{ConfigProvider, MatchMode};
use crate::utils::error::{Result, TriageError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub model: ModelConfig,
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub endpoint: String,
    pub name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub api_key_env: String,
    pub prompt_template: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            name: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_seconds: 30,
            retry_attempts: 2,
            retry_delay_ms: 1000,
            api_key_env: API_KEY_ENV.to_string(),
            prompt_template: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub mode: MatchMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub specialties: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<KeywordConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub keyword: String,
    pub specialty: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TriageError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TriageError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DOCTORS_CSV})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TriageError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn api_key_env(&self) -> &str {
        &self.model.api_key_env
    }

    pub fn prompt_template(&self) -> PromptTemplate {
        self.model
            .prompt_template
            .as_ref()
            .map(PromptTemplate::new)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn model_endpoint(&self) -> &str {
        &self.model.endpoint
    }

    fn model_name(&self) -> &str {
        &self.model.name
    }

    fn temperature(&self) -> f32 {
        self.model.temperature
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.model.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.model.retry_delay_ms)
    }

    fn doctors_path(&self) -> &str {
        &self.directory.path
    }

    fn history_limit(&self) -> usize {
        self.history.limit
    }

    fn match_mode(&self) -> MatchMode {
        self.matching.mode
    }

    /// 沒有 [catalog] 區段時使用內建目錄
    fn catalog(&self) -> Result<SpecialtyCatalog> {
        match &self.catalog {
            Some(catalog) => SpecialtyCatalog::new(
                &catalog.specialties,
                catalog
                    .keywords
                    .iter()
                    .map(|k| (k.keyword.clone(), k.specialty.clone())),
            ),
            None => Ok(SpecialtyCatalog::builtin()),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("model.endpoint", &self.model.endpoint)?;
        validation::validate_non_empty_string("model.name", &self.model.name)?;
        validation::validate_non_empty_string("model.api_key_env", &self.model.api_key_env)?;
        validation::validate_range("model.temperature", self.model.temperature, 0.0, 2.0)?;
        validation::validate_positive_number(
            "model.timeout_seconds",
            self.model.timeout_seconds as usize,
            1,
        )?;
        validation::validate_range("model.retry_attempts", self.model.retry_attempts, 0, 10)?;
        validation::validate_path("directory.path", &self.directory.path)?;
        validation::validate_file_extension("directory.path", &self.directory.path, &["csv"])?;
        validation::validate_positive_number("history.limit", self.history.limit, 1)?;

        // 自訂目錄必須能成功建立
        self.catalog()?;

        tracing::debug!("✅ TOML configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
[directory]
path = "doctors.csv"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.model_name(), DEFAULT_GEMINI_MODEL);
        assert_eq!(config.api_key_env(), API_KEY_ENV);
        assert_eq!(config.history_limit(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.match_mode(), MatchMode::Substring);
        assert_eq!(config.catalog().unwrap().specialties().len(), 14);
    }

    #[test]
    fn test_full_config() {
        let config = TomlConfig::from_toml_str(
            r#"
[model]
endpoint = "http://127.0.0.1:9000"
name = "gemini-1.5-pro"
temperature = 0.2
timeout_seconds = 10
retry_attempts = 0
retry_delay_ms = 0
api_key_env = "CLINIC_GEMINI_KEY"
prompt_template = "Advise on: {symptoms}"

[directory]
path = "clinic.csv"

[matching]
mode = "word-boundary"

[history]
limit = 3

[catalog]
specialties = ["Cardiologist", "Pulmonologist"]

[[catalog.keywords]]
keyword = "Lungs"
specialty = "Pulmonologist"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.match_mode(), MatchMode::WordBoundary);
        assert_eq!(config.retry_delay(), Duration::from_millis(0));
        assert_eq!(config.prompt_template().render("cough"), "Advise on: cough");

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.specialties().len(), 2);
        assert_eq!(catalog.keywords()[0].keyword, "lungs");
    }

    #[test]
    fn test_nan_temperature_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[model]
temperature = nan

[directory]
path = "doctors.csv"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(TriageError::InvalidConfigValueError { ref field, .. }) if field == "model.temperature"
        ));
    }

    #[test]
    fn test_catalog_with_unknown_keyword_target_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[directory]
path = "doctors.csv"

[catalog]
specialties = ["Cardiologist"]

[[catalog.keywords]]
keyword = "lungs"
specialty = "Pulmonologist"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(TriageError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_env_vars_are_substituted() {
        std::env::set_var("SYMPTOM_TRIAGE_TEST_DOCTORS", "from-env.csv");
        let config = TomlConfig::from_toml_str(
            r#"
[directory]
path = "${SYMPTOM_TRIAGE_TEST_DOCTORS}"
"#,
        )
        .unwrap();
        assert_eq!(config.doctors_path(), "from-env.csv");
    }

    #[test]
    fn test_unknown_env_var_is_left_in_place() {
        let config = TomlConfig::from_toml_str(
            r#"
[directory]
path = "${SYMPTOM_TRIAGE_TEST_UNSET_VAR}"
"#,
        )
        .unwrap();
        assert_eq!(config.doctors_path(), "${SYMPTOM_TRIAGE_TEST_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_directory_section_is_rejected() {
        assert!(TomlConfig::from_toml_str("[history]\nlimit = 5\n").is_err());
    }
}
