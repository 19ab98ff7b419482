//! File acquisition: drag-drop, click-to-browse and picker results all end up
//! here as a [`RawFileHandle`] and leave as a [`SelectedFile`] or nothing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix every accepted media type must start with.
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Identifies one accepted selection. Strictly increasing per intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionId(pub u64);

/// Where the content of a candidate lives.
#[derive(Debug, Clone)]
pub enum FileSource {
    Bytes(Arc<[u8]>),
    Path(PathBuf),
}

/// A file handed over by the host before any validation.
#[derive(Debug, Clone)]
pub struct RawFileHandle {
    pub name: String,
    /// Media type as reported by the host, if it reported one.
    pub declared_media_type: Option<String>,
    pub source: FileSource,
}

impl RawFileHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            declared_media_type: None,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(
        name: impl Into<String>,
        media_type: Option<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_media_type: media_type.filter(|m| !m.trim().is_empty()),
            source: FileSource::Bytes(bytes.into()),
        }
    }

    /// Media type used for the acceptance decision.
    pub fn media_type(&self) -> String {
        if let Some(declared) = &self.declared_media_type {
            return declared.trim().to_ascii_lowercase();
        }
        if let Some(guessed) = media_type_from_name(&self.name) {
            return guessed.to_string();
        }
        if let FileSource::Bytes(bytes) = &self.source
            && let Some(kind) = infer::get(bytes)
        {
            return kind.mime_type().to_string();
        }
        FALLBACK_MEDIA_TYPE.to_string()
    }
}

/// An accepted image. Replaced wholesale by the next accepted candidate.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub id: SelectionId,
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Hands out [`SelectedFile`]s for candidates whose media type is an image.
#[derive(Debug, Default)]
pub struct FileIntake {
    next_id: u64,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` for anything that is not an image. Rejection has no
    /// side effects: the id counter only moves on acceptance.
    pub fn accept(&mut self, candidate: RawFileHandle) -> Option<SelectedFile> {
        let media_type = candidate.media_type();
        if !is_image_media_type(&media_type) {
            return None;
        }
        let bytes = match candidate.source {
            FileSource::Bytes(bytes) => bytes,
            FileSource::Path(path) => read_candidate(&path)?,
        };
        self.next_id += 1;
        Some(SelectedFile {
            id: SelectionId(self.next_id),
            name: candidate.name,
            media_type,
            bytes,
        })
    }
}

pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with(IMAGE_MEDIA_PREFIX)
}

fn read_candidate(path: &Path) -> Option<Arc<[u8]>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes.into()),
        Err(e) => {
            tracing::debug!("could not read {}: {e}", path.display());
            None
        }
    }
}

fn media_type_from_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(media_type)
}
