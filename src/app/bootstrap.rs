use crate::adapters::gemini::GeminiAdviceGenerator;
use crate::config::cli::LocalStorage;
use crate::config::credentials::ApiCredential;
use crate::core::directory::DoctorDirectory;
use crate::core::extractor::SpecialtyExtractor;
use crate::core::prompt::PromptTemplate;
use crate::core::triage::{DirectoryState, TriageEngine, TriageSession};
use crate::core::{ConfigProvider, Storage};
use crate::utils::error::Result;
use std::sync::Arc;

/// 依設定組出完整流程；名冊載入失敗不會中止，只會降級
pub async fn build_session<C, S>(
    config: &C,
    storage: &S,
    credential: ApiCredential,
    prompt: PromptTemplate,
) -> Result<TriageSession<GeminiAdviceGenerator>>
where
    C: ConfigProvider,
    S: Storage,
{
    let catalog = config.catalog()?;
    let extractor = SpecialtyExtractor::new(&catalog, config.match_mode());
    tracing::info!(
        "📚 Catalog: {} specialties, {} keywords ({:?} matching)",
        catalog.specialties().len(),
        catalog.keywords().len(),
        extractor.mode()
    );

    let directory = DirectoryState::from_load(
        DoctorDirectory::load(storage, config.doctors_path(), &catalog).await,
    );

    let generator = GeminiAdviceGenerator::from_config(config, credential)?;
    tracing::info!(
        "🤖 Advice model: {} via {}",
        config.model_name(),
        config.model_endpoint()
    );

    let engine = TriageEngine::new(generator, extractor, directory).with_prompt(prompt);
    Ok(TriageSession::new(Arc::new(engine), config.history_limit()))
}

/// 從工作目錄建立 session
pub async fn build_local_session<C: ConfigProvider>(
    config: &C,
    credential: ApiCredential,
    prompt: PromptTemplate,
) -> Result<TriageSession<GeminiAdviceGenerator>> {
    build_session(config, &LocalStorage::current_dir(), credential, prompt).await
}
