pub mod cli;
pub mod credentials;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::gemini::{DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, DEFAULT_TEMPERATURE};
#[cfg(feature = "cli")]
use crate::core::catalog::SpecialtyCatalog;
#[cfg(feature = "cli")]
use crate::core::{ConfigProvider, MatchMode};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "symptom-triage")]
#[command(about = "Suggest medical specialties and nearby doctors from a symptom description")]
pub struct CliConfig {
    /// Path to the doctors CSV (Name, Specialty, Distance, lat, lng)
    #[arg(long, default_value = "doctors.csv")]
    pub doctors: String,

    /// Analyse a single description and exit instead of starting the interactive prompt
    #[arg(long)]
    pub symptom: Option<String>,

    #[arg(long, default_value = DEFAULT_GEMINI_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, default_value = DEFAULT_GEMINI_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    #[arg(long, default_value = "2")]
    pub retry_attempts: u32,

    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    /// Number of past analyses kept in the session history
    #[arg(long, default_value = "50")]
    pub history_limit: usize,

    #[arg(long, value_enum, default_value_t = MatchMode::Substring)]
    pub match_mode: MatchMode,

    #[arg(long, help = "Print each outcome as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn model_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn doctors_path(&self) -> &str {
        &self.doctors
    }

    fn history_limit(&self) -> usize {
        self.history_limit
    }

    fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    fn catalog(&self) -> Result<SpecialtyCatalog> {
        Ok(SpecialtyCatalog::builtin())
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_non_empty_string("model", &self.model)?;
        validation::validate_range("temperature", self.temperature, 0.0, 2.0)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;
        validation::validate_range("retry_attempts", self.retry_attempts, 0, 10)?;
        validation::validate_path("doctors", &self.doctors)?;
        validation::validate_file_extension("doctors", &self.doctors, &["csv"])?;
        validation::validate_positive_number("history_limit", self.history_limit, 1)?;

        tracing::debug!("✅ CLI configuration validation passed");
        Ok(())
    }
}
