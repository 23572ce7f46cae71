use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;

/// Binary payload placement for project attachments.
///
/// Paths handed to a store are always relative to its root: `<folder token>/<filename>`.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn create_folder(&self, token: &str) -> anyhow::Result<()>;
    async fn write(&self, relative_path: &str, body: Bytes) -> Result<(), AppError>;
    /// Absolute path of an existing file, guaranteed to live under the root.
    async fn resolve(&self, relative_path: &str) -> Result<PathBuf, AppError>;
}

/// Fresh 128-bit random folder token, 32 hex chars.
pub fn new_folder_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn relative_path(folder_token: &str, filename: &str) -> String {
    format!("{}/{}", folder_token, filename)
}

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Creates the uploads root if needed and pins it to its canonical form.
    pub async fn open(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref();
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("create uploads dir {}", root.display()))?;
        let root = tokio::fs::canonicalize(root)
            .await
            .with_context(|| format!("canonicalize uploads dir {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Lexical check only: every component must be a plain name.
    fn join_checked(&self, relative_path: &str) -> Result<PathBuf, AppError> {
        let rel = Path::new(relative_path);
        let plain = rel.components().count() > 0
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            warn!(path = %relative_path, "rejected non-plain relative path");
            return Err(AppError::InvalidPath);
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn create_folder(&self, token: &str) -> anyhow::Result<()> {
        let dir = self
            .join_checked(token)
            .map_err(|e| anyhow::anyhow!("folder token {:?}: {}", token, e))?;
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create project folder {}", dir.display()))?;
        debug!(dir = %dir.display(), "project folder created");
        Ok(())
    }

    async fn write(&self, relative_path: &str, body: Bytes) -> Result<(), AppError> {
        let path = self.join_checked(relative_path)?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        debug!(path = %path.display(), bytes = body.len(), "file written");
        Ok(())
    }

    async fn resolve(&self, relative_path: &str) -> Result<PathBuf, AppError> {
        let joined = self.join_checked(relative_path)?;
        let resolved = match tokio::fs::canonicalize(&joined).await {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("file"))
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("canonicalize {}", joined.display()))
                    .into())
            }
        };
        // Symlinks can still point outside even when the lexical form is clean.
        if !resolved.starts_with(&self.root) {
            warn!(
                path = %relative_path,
                resolved = %resolved.display(),
                root = %self.root.display(),
                "resolved path escapes uploads root"
            );
            return Err(AppError::InvalidPath);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn folder_tokens_are_full_width_and_unique() {
        let a = new_folder_token();
        let b = new_folder_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn open_creates_root() {
        let dir = tempdir().expect("tempdir");
        let store = LocalFileStore::open(dir.path().join("nested/uploads"))
            .await
            .expect("open");
        assert!(store.root().is_dir());
        assert!(store.root().is_absolute());
    }

    #[tokio::test]
    async fn write_then_resolve() {
        let dir = tempdir().expect("tempdir");
        let store = LocalFileStore::open(dir.path()).await.expect("open");
        store.create_folder("abc").await.expect("folder");
        store
            .write("abc/readme.txt", Bytes::from_static(b"hello"))
            .await
            .expect("write");

        let path = store.resolve("abc/readme.txt").await.expect("resolve");
        assert!(path.starts_with(store.root()));
        assert_eq!(std::fs::read(path).expect("read"), b"hello");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let store = LocalFileStore::open(dir.path().join("uploads"))
            .await
            .expect("open");
        std::fs::write(dir.path().join("secret.txt"), b"nope").expect("write secret");

        for bad in ["../secret.txt", "abc/../../secret.txt", "/etc/passwd", "", "./x"] {
            let err = store.resolve(bad).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidPath), "{:?} -> {:?}", bad, err);
        }
        let err = store
            .write("../escape.txt", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidPath));
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_root_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let store = LocalFileStore::open(dir.path().join("uploads"))
            .await
            .expect("open");
        std::fs::write(dir.path().join("secret.txt"), b"nope").expect("write secret");
        store.create_folder("tok").await.expect("folder");
        std::os::unix::fs::symlink(
            dir.path().join("secret.txt"),
            store.root().join("tok/link.txt"),
        )
        .expect("symlink");

        let err = store.resolve("tok/link.txt").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidPath));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let store = LocalFileStore::open(dir.path()).await.expect("open");
        let err = store.resolve("tok/nothing.bin").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
