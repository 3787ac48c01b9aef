//! Loading uploaded text and saving downloads.

use std::path::{Path, PathBuf};

use super::ClientError;

/// Extensions accepted for upload (compared case-insensitively)
pub const UPLOAD_EXTENSIONS: [&str; 3] = ["txt", "html", "htm"];

/// Which text a download holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTarget {
    Input,
    Output,
}

impl DownloadTarget {
    pub fn file_name(self) -> &'static str {
        match self {
            DownloadTarget::Input => "input.txt",
            DownloadTarget::Output => "output.txt",
        }
    }
}

pub fn is_supported_upload(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            UPLOAD_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Read an uploaded `.txt`/`.html` file as plain text.
///
/// HTML is not rendered or stripped; invalid UTF-8 is replaced.
pub fn load_text_file(path: &Path) -> Result<String, ClientError> {
    if !is_supported_upload(path) {
        return Err(ClientError::UnsupportedFile(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Loaded {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `text` verbatim to `dir/input.txt` or `dir/output.txt`
pub fn save_text_file(dir: &Path, target: DownloadTarget, text: &str) -> Result<PathBuf, ClientError> {
    let path = dir.join(target.file_name());
    std::fs::write(&path, text).map_err(|source| ClientError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!("Saved {} bytes to {}", text.len(), path.display());
    Ok(path)
}
