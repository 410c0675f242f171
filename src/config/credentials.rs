use crate::utils::error::{Result, TriageError};
use std::fmt;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// 建議服務的 API 金鑰；Debug 輸出一律遮蔽
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(TriageError::InvalidConfigValueError {
                field: API_KEY_ENV.to_string(),
                value: String::new(),
                reason: "API key cannot be blank".to_string(),
            });
        }
        Ok(Self(key))
    }

    /// 啟動時讀取，缺少時立即失敗
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Self::new(value),
            _ => Err(TriageError::MissingConfigError {
                field: var.to_string(),
            }),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_reads_key() {
        std::env::set_var("SYMPTOM_TRIAGE_TEST_KEY_PRESENT", " abc123 ");
        let credential = ApiCredential::from_env("SYMPTOM_TRIAGE_TEST_KEY_PRESENT").unwrap();
        assert_eq!(credential.expose(), "abc123");
    }

    #[test]
    fn test_missing_key_fails_fast() {
        let err = ApiCredential::from_env("SYMPTOM_TRIAGE_TEST_KEY_ABSENT").unwrap_err();
        assert!(matches!(err, TriageError::MissingConfigError { ref field } if field == "SYMPTOM_TRIAGE_TEST_KEY_ABSENT"));
    }

    #[test]
    fn test_debug_hides_secret() {
        let credential = ApiCredential::new("super-secret").unwrap();
        assert!(!format!("{:?}", credential).contains("super-secret"));
    }
}
