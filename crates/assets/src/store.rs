//! Flat-directory asset storage with collision-resistant names.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use rand::Rng;
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;

use crate::{AssetError, AssetRef};

/// Attempts at minting an unused file name before giving up. Names carry a
/// millisecond timestamp plus a random suffix, so a second round only runs
/// on an astronomically unlikely collision.
const NAME_ATTEMPTS: usize = 3;

/// Store for uploaded cover images.
///
/// Generated names combine the upload instant (unix milliseconds) with a
/// random numeric suffix, preserving the original file extension, so
/// concurrent uploads in the same instant still land on distinct files.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AssetError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Persist `bytes` under a freshly generated name and return its handle.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<AssetRef, AssetError> {
        for _ in 0..NAME_ATTEMPTS {
            let name = generate_name(original_name);
            let path = self.root.join(&name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(AssetRef::new(name));
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Err(AssetError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "could not mint an unused asset name",
        )))
    }

    /// Delete the file the handle points at.
    pub async fn remove(&self, asset: &AssetRef) -> Result<(), AssetError> {
        let path = self.resolve(asset)?;
        tokio::fs::remove_file(path).await?;
        Ok(())
    }

    /// Whether the handle currently resolves to a stored file.
    pub async fn exists(&self, asset: &AssetRef) -> bool {
        match self.resolve(asset) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate the handle and map it to an absolute path inside the root.
    ///
    /// Handles read back from persisted documents are untrusted: anything
    /// that is empty or walks out of the flat store directory is rejected.
    fn resolve(&self, asset: &AssetRef) -> Result<PathBuf, AssetError> {
        let name = asset.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(AssetError::InvalidHandle(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn generate_name(original_name: &str) -> String {
    let millis = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let extension = Path::new(original_name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    format!("book-{millis}-{suffix}{extension}")
}
