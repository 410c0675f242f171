use crate::core::directory::DoctorDirectory;
use crate::core::extractor::SpecialtyExtractor;
use crate::core::filter::filter_doctors;
use crate::core::history::SessionHistory;
use crate::core::prompt::PromptTemplate;
use crate::domain::model::{MapView, TriageOutcome, TriageStatus};
use crate::domain::ports::AdviceGenerator;
use crate::utils::error::{Result, TriageError};
use std::collections::BTreeSet;
use std::sync::Arc;

/// 醫師名冊的載入狀態；載入失敗時仍可提供建議，只是沒有醫師可列
#[derive(Debug, Clone)]
pub enum DirectoryState {
    Loaded(Arc<DoctorDirectory>),
    Unavailable(String),
}

impl DirectoryState {
    pub fn from_load(result: Result<DoctorDirectory>) -> Self {
        match result {
            Ok(directory) => Self::Loaded(Arc::new(directory)),
            Err(e) => {
                tracing::warn!("⚠️ Doctor directory unavailable: {}", e);
                tracing::warn!("💡 Suggestion: {}", e.recovery_suggestion());
                Self::Unavailable(e.user_friendly_message())
            }
        }
    }

    pub fn directory(&self) -> Option<&DoctorDirectory> {
        match self {
            Self::Loaded(directory) => Some(directory),
            Self::Unavailable(_) => None,
        }
    }
}

/// 共用的分診流程：產生建議 → 擷取專科 → 篩選醫師 → 地圖
pub struct TriageEngine<G: AdviceGenerator> {
    generator: G,
    extractor: SpecialtyExtractor,
    directory: DirectoryState,
    prompt: PromptTemplate,
}

impl<G: AdviceGenerator> TriageEngine<G> {
    pub fn new(generator: G, extractor: SpecialtyExtractor, directory: DirectoryState) -> Self {
        Self {
            generator,
            extractor,
            directory,
            prompt: PromptTemplate::default(),
        }
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn directory(&self) -> &DirectoryState {
        &self.directory
    }

    pub async fn run(&self, symptom: &str) -> Result<TriageOutcome> {
        let symptom = symptom.trim();
        if symptom.is_empty() {
            return Err(TriageError::ValidationError {
                message: "Please describe your symptoms first".to_string(),
            });
        }

        tracing::info!("🩺 Requesting advice for submitted symptoms");
        let prompt = self.prompt.render(symptom);

        let advice = match self.generator.generate(&prompt).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                tracing::warn!("Advice service returned an empty response");
                return Ok(Self::without_advice(
                    symptom,
                    "the advice service returned an empty response".to_string(),
                ));
            }
            Err(e) => {
                tracing::warn!(
                    "❌ Advice generation failed: {} (Category: {:?})",
                    e,
                    e.category()
                );
                return Ok(Self::without_advice(symptom, e.to_string()));
            }
        };
        tracing::debug!("Received {} characters of advice", advice.len());

        let specialties = self.extractor.extract(&advice);
        tracing::info!("🔍 Suggested specialties: {}", specialties.len());

        let (doctors, status) = if specialties.is_empty() {
            (Vec::new(), TriageStatus::NoSpecialties)
        } else {
            match &self.directory {
                DirectoryState::Unavailable(reason) => (
                    Vec::new(),
                    TriageStatus::DoctorsUnavailable {
                        reason: reason.clone(),
                    },
                ),
                DirectoryState::Loaded(directory) => {
                    let doctors = filter_doctors(directory, &specialties);
                    if doctors.is_empty() {
                        (doctors, TriageStatus::NoMatchingDoctors)
                    } else {
                        (doctors, TriageStatus::Matched)
                    }
                }
            }
        };
        tracing::info!("👩‍⚕️ Matching doctors: {}", doctors.len());

        let map = MapView::centered_on(&doctors);
        Ok(TriageOutcome {
            symptom: symptom.to_string(),
            advice: Some(advice),
            specialties,
            doctors,
            map,
            status,
        })
    }

    fn without_advice(symptom: &str, reason: String) -> TriageOutcome {
        TriageOutcome {
            symptom: symptom.to_string(),
            advice: None,
            specialties: BTreeSet::new(),
            doctors: Vec::new(),
            map: None,
            status: TriageStatus::GenerationFailed { reason },
        }
    }
}

/// 單一使用者的會話，擁有自己的歷史紀錄
pub struct TriageSession<G: AdviceGenerator> {
    engine: Arc<TriageEngine<G>>,
    history: SessionHistory,
}

impl<G: AdviceGenerator> TriageSession<G> {
    pub fn new(engine: Arc<TriageEngine<G>>, history_limit: usize) -> Self {
        Self {
            engine,
            history: SessionHistory::new(history_limit),
        }
    }

    pub async fn submit(&mut self, symptom: &str) -> Result<TriageOutcome> {
        let outcome = self.engine.run(symptom).await?;
        if let Some(advice) = &outcome.advice {
            let entry = self.history.record(&outcome.symptom, advice);
            tracing::debug!("Recorded analysis {}", entry.sequence);
        }
        Ok(outcome)
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn engine(&self) -> &TriageEngine<G> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::SpecialtyCatalog;
    use crate::domain::model::{DoctorRecord, MatchMode, Specialty};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AdviceGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl AdviceGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(TriageError::generation("quota exceeded"))
        }
    }

    fn doctor(name: &str, specialty: &str, latitude: f64) -> DoctorRecord {
        DoctorRecord {
            name: name.to_string(),
            specialty: Specialty::new(specialty),
            distance: 1.0,
            latitude,
            longitude: 77.2,
        }
    }

    fn loaded_directory() -> DirectoryState {
        DirectoryState::Loaded(Arc::new(DoctorDirectory::new(vec![
            doctor("D1", "Cardiologist", 28.0),
            doctor("D2", "Neurologist", 28.5),
            doctor("D3", "Cardiologist", 29.0),
        ])))
    }

    fn engine<G: AdviceGenerator>(generator: G, directory: DirectoryState) -> TriageEngine<G> {
        let extractor = SpecialtyExtractor::new(&SpecialtyCatalog::builtin(), MatchMode::Substring);
        TriageEngine::new(generator, extractor, directory)
    }

    #[tokio::test]
    async fn test_matched_outcome() {
        let engine = engine(
            CannedGenerator::new("Please see a cardiologist about your heart."),
            loaded_directory(),
        );
        let outcome = engine.run("chest pain").await.unwrap();

        assert_eq!(outcome.status, TriageStatus::Matched);
        let names: Vec<&str> = outcome.doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["D1", "D3"]);
        let map = outcome.map.unwrap();
        assert!((map.latitude - 28.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_prompt_embeds_symptoms() {
        let generator = CannedGenerator::new("rest");
        let engine = engine(generator, loaded_directory());
        engine.run("  dizzy spells ").await.unwrap();

        let prompts = engine.generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("SYMPTOMS:\ndizzy spells\n"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_distinct_from_miss() {
        let engine = engine(FailingGenerator, loaded_directory());
        let outcome = engine.run("chest pain").await.unwrap();

        assert!(outcome.advice.is_none());
        assert!(outcome.specialties.is_empty());
        assert!(outcome.doctors.is_empty());
        assert!(matches!(
            outcome.status,
            TriageStatus::GenerationFailed { ref reason } if reason.contains("quota exceeded")
        ));
    }

    #[tokio::test]
    async fn test_empty_advice_counts_as_failure() {
        let engine = engine(CannedGenerator::new(""), loaded_directory());
        let outcome = engine.run("chest pain").await.unwrap();
        assert!(matches!(outcome.status, TriageStatus::GenerationFailed { .. }));
        assert!(outcome.advice.is_none());
    }

    #[tokio::test]
    async fn test_whitespace_advice_is_still_advice() {
        let shared = Arc::new(engine(CannedGenerator::new("   \n"), loaded_directory()));
        let mut session = TriageSession::new(shared, 10);
        let outcome = session.submit("chest pain").await.unwrap();

        assert_eq!(outcome.status, TriageStatus::NoSpecialties);
        assert_eq!(outcome.advice.as_deref(), Some("   \n"));
        assert!(outcome.specialties.is_empty());
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_no_specialties_found() {
        let engine = engine(CannedGenerator::new("Drink water and rest."), loaded_directory());
        let outcome = engine.run("tired").await.unwrap();

        assert_eq!(outcome.status, TriageStatus::NoSpecialties);
        assert!(outcome.advice.is_some());
        assert!(outcome.doctors.is_empty());
        assert!(outcome.map.is_none());
    }

    #[tokio::test]
    async fn test_no_matching_doctors() {
        let engine = engine(CannedGenerator::new("See a Dermatologist."), loaded_directory());
        let outcome = engine.run("rash").await.unwrap();
        assert_eq!(outcome.status, TriageStatus::NoMatchingDoctors);
        assert_eq!(outcome.specialties.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_directory_still_gives_advice() {
        let directory = DirectoryState::from_load(Err(TriageError::data_load(
            "doctors.csv",
            "missing required columns: lat",
        )));
        let engine = engine(CannedGenerator::new("See a Cardiologist."), directory);
        let outcome = engine.run("chest pain").await.unwrap();

        assert!(outcome.advice.is_some());
        assert_eq!(outcome.specialties.len(), 1);
        assert!(matches!(outcome.status, TriageStatus::DoctorsUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_blank_symptom_is_rejected() {
        let engine = engine(CannedGenerator::new("unused"), loaded_directory());
        assert!(matches!(
            engine.run("   ").await,
            Err(TriageError::ValidationError { .. })
        ));
        assert!(engine.generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_records_only_successful_advice() {
        let shared = Arc::new(engine(CannedGenerator::new("See a Neurologist."), loaded_directory()));
        let mut session = TriageSession::new(Arc::clone(&shared), 10);
        session.submit("headache").await.unwrap();
        session.submit("migraine").await.unwrap();

        let failing = Arc::new(engine(FailingGenerator, loaded_directory()));
        let mut other = TriageSession::new(failing, 10);
        other.submit("headache").await.unwrap();

        assert_eq!(session.history().len(), 2);
        assert!(other.history().is_empty());
        let symptoms: Vec<&str> = session
            .history()
            .entries()
            .map(|e| e.symptom.as_str())
            .collect();
        assert_eq!(symptoms, vec!["headache", "migraine"]);
    }
}
