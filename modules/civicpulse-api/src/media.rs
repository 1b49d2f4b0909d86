//! Local-disk blob store for evidence uploads. Stored files are served
//! statically under `/uploads/`; the rest of the system only ever sees the
//! returned URL.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::Utc;

use civicpulse_common::CivicError;

#[derive(Debug)]
pub struct StoredMedia {
    pub url: String,
    pub content_type: String,
}

pub struct MediaStore {
    dir: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(dir: PathBuf, public_base_url: String) -> Self {
        Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create media dir {}", self.dir.display()))?;
        Ok(())
    }

    /// Store an uploaded file and return its public URL. Only images and
    /// videos are accepted.
    pub async fn put(
        &self,
        original_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredMedia, CivicError> {
        if !is_allowed_media_type(content_type) {
            return Err(CivicError::invalid_field(
                "file",
                "only images and videos are allowed",
            ));
        }

        let file_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(StoredMedia {
            url: format!("{}/uploads/{file_name}", self.public_base_url),
            content_type: content_type.to_string(),
        })
    }
}

pub fn is_allowed_media_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type.starts_with("video/")
}

/// Keep alphanumerics, dots and dashes; everything else becomes '_'. Strips
/// any path components smuggled into the client-supplied name.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
