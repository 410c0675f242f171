pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::gemini::GeminiAdviceGenerator;
pub use config::{cli::LocalStorage, credentials::ApiCredential, toml_config::TomlConfig};
pub use core::{
    catalog::SpecialtyCatalog,
    directory::DoctorDirectory,
    extractor::SpecialtyExtractor,
    filter::filter_doctors,
    history::SessionHistory,
    triage::{DirectoryState, TriageEngine, TriageSession},
};
pub use domain::model::{DoctorRecord, MapView, MatchMode, Specialty, TriageOutcome, TriageStatus};
pub use domain::ports::AdviceGenerator;
pub use utils::error::{Result, TriageError};
