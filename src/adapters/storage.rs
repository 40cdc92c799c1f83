use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// 以本機目錄為根的檔案存取
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tokio::fs::read(&full_path)
            .await
            .map_err(|e| EtlError::io("reading", full_path.display().to_string(), e))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EtlError::io("creating directory", parent.display().to_string(), e))?;
        }

        tokio::fs::write(&full_path, data)
            .await
            .map_err(|e| EtlError::io("writing", full_path.display().to_string(), e))
    }
}
