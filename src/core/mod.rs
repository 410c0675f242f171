pub mod catalog;
pub mod directory;
pub mod extractor;
pub mod filter;
pub mod history;
pub mod prompt;
pub mod triage;

pub use crate::domain::model::{
    DoctorRecord, KeywordRule, MapView, MatchMode, Specialty, TriageOutcome, TriageStatus,
};
pub use crate::domain::ports::{AdviceGenerator, ConfigProvider, Storage};
pub use crate::utils::error::Result;
