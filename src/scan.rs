//! Recursive, lazy discovery of input files.
//!
//! [`Scanner::files`] walks a directory tree with `walkdir` and yields one
//! [`ScannedFile`] per matching file as it goes, so a huge asset tree never
//! has to be materialized in memory. Calling `files` again restarts the walk
//! from the root.
//!
//! ## Matching
//!
//! - Extension in the configured list, compared case-insensitively. The
//!   default list is `png jpg jpeg psd pdf ai`: PSD, PDF and AI are listed so
//!   they show up in scans, but only formats with a compiled-in decoder can
//!   actually be processed.
//! - Hidden entries (name starting with `.`) are skipped, directories included.
//! - An optional excluded directory (usually the output directory) is not
//!   descended into, so re-running a batch never picks up its own outputs.
//!
//! Entries are visited in file-name order within each directory.

use crate::source::InputItem;
use log::warn;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extensions picked up by a scan unless configured otherwise.
pub const DEFAULT_SCAN_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "psd", "pdf", "ai"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A file found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Lowercase extension without the dot.
    pub kind: String,
}

impl ScannedFile {
    pub fn into_input(self) -> InputItem {
        InputItem::Path(self.path)
    }
}

/// Directory scanner. Cheap to construct; does no I/O until iterated.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    extensions: Vec<String>,
    exclude: Option<PathBuf>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_SCAN_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            exclude: None,
        }
    }

    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Skip `dir` and everything below it.
    pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exclude = Some(dir.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk the tree. Each call starts a fresh walk.
    pub fn files(&self) -> impl Iterator<Item = Result<ScannedFile, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.should_descend(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) => self.matching_file(&entry).map(Ok),
                Err(source) => Some(Err(ScanError::Walk {
                    root: self.root.clone(),
                    source,
                })),
            })
    }

    /// Like [`files`](Self::files), but unreadable entries are logged and
    /// skipped so one bad directory does not hide the rest of the tree.
    pub fn readable_files(&self) -> impl Iterator<Item = ScannedFile> + '_ {
        self.files().filter_map(|entry| match entry {
            Ok(file) => Some(file),
            Err(err) => {
                warn!("skipping unreadable entry: {}", err);
                None
            }
        })
    }

    fn should_descend(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            return false;
        }
        match &self.exclude {
            Some(excluded) if entry.file_type().is_dir() => !same_dir(entry.path(), excluded),
            _ => true,
        }
    }

    fn matching_file(&self, entry: &DirEntry) -> Option<ScannedFile> {
        if !entry.file_type().is_file() {
            return None;
        }
        let kind = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())?;
        if !self.extensions.iter().any(|e| *e == kind) {
            return None;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        Some(ScannedFile {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            size,
            kind,
        })
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn names(scanner: &Scanner) -> Vec<String> {
        scanner
            .files()
            .map(|f| f.unwrap().name)
            .collect::<Vec<_>>()
    }

    fn setup_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.png");
        touch(tmp.path(), "a.JPG");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "chars/hero.psd");
        touch(tmp.path(), "chars/deep/logo.ai");
        touch(tmp.path(), "chars/deep/sheet.pdf");
        touch(tmp.path(), ".cache/hidden.png");
        touch(tmp.path(), ".secret.png");
        tmp
    }

    #[test]
    fn finds_matching_files_recursively() {
        let tmp = setup_tree();
        let scanner = Scanner::new(tmp.path());
        let found = names(&scanner);
        // Depth-first, file-name order: `chars/deep/` sorts before `chars/hero.psd`.
        assert_eq!(
            found,
            vec!["a.JPG", "b.png", "logo.ai", "sheet.pdf", "hero.psd"]
        );
    }

    #[test]
    fn reports_kind_and_size() {
        let tmp = setup_tree();
        let scanner = Scanner::new(tmp.path());
        let first = scanner.files().next().unwrap().unwrap();
        assert_eq!(first.kind, "jpg");
        assert_eq!(first.size, 1);
        assert_eq!(first.path, tmp.path().join("a.JPG"));
    }

    #[test]
    fn walk_is_restartable() {
        let tmp = setup_tree();
        let scanner = Scanner::new(tmp.path());
        assert_eq!(names(&scanner), names(&scanner));
    }

    #[test]
    fn walk_is_lazy() {
        let tmp = setup_tree();
        let scanner = Scanner::new(tmp.path());
        let mut files = scanner.files();
        assert!(files.next().is_some());
        // Creating a file after the walk started is still picked up because
        // directories are read on demand.
        touch(tmp.path(), "chars/deep/zz.png");
        let rest: Vec<String> = files.map(|f| f.unwrap().name).collect();
        assert!(rest.contains(&"zz.png".to_string()));
    }

    #[test]
    fn custom_extensions() {
        let tmp = setup_tree();
        let scanner = Scanner::new(tmp.path()).with_extensions(&[".PNG"]);
        assert_eq!(names(&scanner), vec!["b.png"]);
    }

    #[test]
    fn excluded_directory_is_skipped() {
        let tmp = setup_tree();
        touch(tmp.path(), "out/b_u.png");
        let scanner = Scanner::new(tmp.path()).excluding(tmp.path().join("out"));
        assert!(!names(&scanner).contains(&"b_u.png".to_string()));
    }

    #[test]
    fn missing_root_is_error() {
        let scanner = Scanner::new("/nonexistent/texprep-root");
        let results: Vec<_> = scanner.files().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ScanError::Walk { .. })));
    }

    #[test]
    fn readable_files_skips_walk_errors() {
        let scanner = Scanner::new("/nonexistent/texprep-root");
        assert_eq!(scanner.readable_files().count(), 0);

        let tmp = setup_tree();
        let scanner = Scanner::new(tmp.path());
        let found: Vec<String> = scanner.readable_files().map(|f| f.name).collect();
        assert_eq!(found, names(&scanner));
    }

    #[test]
    fn scanned_file_becomes_path_input() {
        let file = ScannedFile {
            path: PathBuf::from("/a/b.png"),
            name: "b.png".into(),
            size: 0,
            kind: "png".into(),
        };
        assert_eq!(file.into_input(), InputItem::path("/a/b.png"));
    }
}
