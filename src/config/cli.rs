use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Filesystem storage rooted at `base_path`. Absolute paths bypass the root.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// Paths resolve against the process working directory.
    pub fn current_dir() -> Self {
        Self::new(".".to_string())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        let base = Path::new(&self.base_path);
        fs::rename(base.join(from), base.join(to))?;
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(Path::new(&self.base_path).join(path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_dirs_and_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());

        storage.write_file("out/nested/result.csv", b"Name").await.unwrap();

        assert_eq!(storage.read_file("out/nested/result.csv").await.unwrap(), b"Name");
    }

    #[tokio::test]
    async fn test_absolute_paths_bypass_base() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("dict.csv");
        std::fs::write(&target, "header\n").unwrap();

        let storage = LocalStorage::current_dir();
        let data = storage.read_file(target.to_str().unwrap()).await.unwrap();

        assert_eq!(data, b"header\n");
    }

    #[tokio::test]
    async fn test_rename_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());
        storage.write_file("out/result.csv.tmp", b"Name").await.unwrap();

        storage.rename_file("out/result.csv.tmp", "out/result.csv").await.unwrap();

        assert!(!temp_dir.path().join("out/result.csv.tmp").exists());
        assert_eq!(storage.read_file("out/result.csv").await.unwrap(), b"Name");

        storage.remove_file("out/result.csv").await.unwrap();
        assert!(!temp_dir.path().join("out/result.csv").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let storage = LocalStorage::current_dir();
        let result = storage.read_file("definitely/not/here.csv").await;
        assert!(matches!(result, Err(crate::utils::error::EtlError::IoError(_))));
    }
}
