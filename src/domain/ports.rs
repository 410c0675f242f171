use crate::core::catalog::SpecialtyCatalog;
use crate::domain::model::MatchMode;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn model_endpoint(&self) -> &str;
    fn model_name(&self) -> &str;
    fn temperature(&self) -> f32;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn doctors_path(&self) -> &str;
    fn history_limit(&self) -> usize;
    fn match_mode(&self) -> MatchMode;
    fn catalog(&self) -> Result<SpecialtyCatalog>;
}

/// 外部文字生成服務：輸入提示詞，回傳未結構化的建議文字
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
