//! Batch input items.
//!
//! An item is either a file on disk or a buffer already in memory (stdin, a
//! drag-and-drop payload from a host application). The variant is resolved
//! once, by [`InputItem::load`], into a [`LoadedInput`] holding the bytes and
//! the display name; nothing downstream inspects which kind it was.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputItem {
    Path(PathBuf),
    Buffer { name: String, bytes: Vec<u8> },
}

impl InputItem {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn buffer(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Buffer {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Filename used to build the output name.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy()),
            Self::Buffer { name, .. } => Cow::Borrowed(name),
        }
    }

    /// Identifier shown in progress output and reports: the full path for
    /// files, the name for buffers.
    pub fn identifier(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Buffer { name, .. } => name.clone(),
        }
    }

    /// Lowercase extension without the dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.name();
        Path::new(name.as_ref())
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// Resolve the item into its bytes. Files are read, buffers borrowed.
    pub fn load(&self) -> std::io::Result<LoadedInput<'_>> {
        let bytes = match self {
            Self::Path(path) => Cow::Owned(std::fs::read(path)?),
            Self::Buffer { bytes, .. } => Cow::Borrowed(bytes.as_slice()),
        };
        Ok(LoadedInput {
            name: self.name(),
            bytes,
        })
    }
}

/// An input item after its bytes have been resolved.
#[derive(Debug)]
pub struct LoadedInput<'a> {
    pub name: Cow<'a, str>,
    pub bytes: Cow<'a, [u8]>,
}
