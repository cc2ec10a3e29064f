use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// Filesystem-backed store for uploaded images.
///
/// Files are written under `<root>/<category>/` with collision-resistant
/// uuid names; the returned reference (`<category>/<uuid>.<ext>`) is the
/// only handle callers keep.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Save image bytes and return the stored reference.
    ///
    /// Fails if the payload is not a recognized image format.
    pub async fn save(&self, bytes: &[u8], category: &str) -> Result<String> {
        let ext = sniff_image_ext(bytes)
            .ok_or_else(|| anyhow::anyhow!("Payload is not a recognized image"))?;

        let dir = self.root.join(category);
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create upload dir {}", dir.display()))?;
        }

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = dir.join(&filename);

        fs::write(&file_path, bytes)
            .await
            .with_context(|| format!("Failed to write upload to {}", file_path.display()))?;

        info!(path = %file_path.display(), size = bytes.len(), "Stored upload");

        Ok(format!("{category}/{filename}"))
    }

    /// Remove the file behind a stored reference. Already-absent files are
    /// a no-op, not an error.
    pub async fn delete(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "Deleted stored file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to delete {}", path.display()))
            }
        }
    }

    /// Whether a stored reference currently resolves to a file.
    #[must_use]
    pub fn contains(&self, reference: &str) -> bool {
        self.resolve(reference).is_ok_and(|p| p.exists())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a stored reference back to a path, rejecting anything that
    /// would escape the uploads root.
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let rel = Path::new(reference);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            anyhow::bail!("Invalid stored reference: {reference}");
        }
        Ok(self.root.join(rel))
    }
}

/// Sniff the image format from magic bytes, returning the file extension.
#[must_use]
pub fn sniff_image_ext(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(b"\xff\xd8\xff") {
        Some("jpg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}
