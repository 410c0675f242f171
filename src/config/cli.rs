use crate::core::Storage;
use crate::utils::error::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// 以目前工作目錄為根
    pub fn current_dir() -> Self {
        Self::new(".".to_string())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        tracing::debug!("Reading {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_file_relative_to_base() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("doctors.csv"), b"Name\n").unwrap();

        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let data = storage.read_file("doctors.csv").await.unwrap();
        assert_eq!(data, b"Name\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        assert!(matches!(
            storage.read_file("absent.csv").await,
            Err(crate::utils::error::TriageError::IoError(_))
        ));
    }
}
