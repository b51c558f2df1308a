#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStats {
    pub size: u64,
    pub is_directory: bool,
    pub is_file: bool,
    pub modified_ms: i64,
    pub created_ms: i64,
}

#[derive(Debug)]
pub enum FileStorageError {
    NotFound { path: String },
    PermissionDenied { path: String },
    Io { path: String, detail: String },
}

impl FileStorageError {
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path } => path,
            Self::PermissionDenied { path } => path,
            Self::Io { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io {
                path,
                detail: err.to_string(),
            },
        }
    }
}

impl std::fmt::Display for FileStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "not found: {path}"),
            Self::PermissionDenied { path } => write!(f, "permission denied: {path}"),
            Self::Io { path, detail } => write!(f, "io ({path}): {detail}"),
        }
    }
}

impl std::error::Error for FileStorageError {}

/// The raw filesystem capability the repository and index engine depend on.
/// Implementations map missing targets to `FileStorageError::NotFound`; the
/// layers above decide where "not found" is a normal outcome.
pub trait FileStorage: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<String, FileStorageError>;
    fn write_file(&self, path: &Path, contents: &str) -> Result<(), FileStorageError>;
    fn file_exists(&self, path: &Path) -> Result<bool, FileStorageError>;
    fn directory_exists(&self, path: &Path) -> Result<bool, FileStorageError>;
    fn create_directory(&self, path: &Path) -> Result<(), FileStorageError>;
    /// Returns whether a file was actually removed.
    fn delete_file(&self, path: &Path) -> Result<bool, FileStorageError>;
    /// Recursive listing of regular files, as paths relative to `dir`, sorted.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, FileStorageError>;
    /// Immediate subdirectories of `dir`, as names relative to `dir`, sorted.
    fn list_directories(&self, dir: &Path) -> Result<Vec<PathBuf>, FileStorageError>;
    fn file_stats(&self, path: &Path) -> Result<FileStats, FileStorageError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileStorage;

impl LocalFileStorage {
    pub fn new() -> Self {
        Self
    }
}

impl FileStorage for LocalFileStorage {
    fn read_file(&self, path: &Path) -> Result<String, FileStorageError> {
        fs::read_to_string(path).map_err(|err| FileStorageError::from_io(path, err))
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), FileStorageError> {
        fs::write(path, contents).map_err(|err| FileStorageError::from_io(path, err))
    }

    fn file_exists(&self, path: &Path) -> Result<bool, FileStorageError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(FileStorageError::from_io(path, err)),
        }
    }

    fn directory_exists(&self, path: &Path) -> Result<bool, FileStorageError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(FileStorageError::from_io(path, err)),
        }
    }

    fn create_directory(&self, path: &Path) -> Result<(), FileStorageError> {
        fs::create_dir_all(path).map_err(|err| FileStorageError::from_io(path, err))
    }

    fn delete_file(&self, path: &Path) -> Result<bool, FileStorageError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(FileStorageError::from_io(path, err)),
        }
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, FileStorageError> {
        let mut out = Vec::new();
        collect_files(dir, dir, &mut out)?;
        out.sort();
        Ok(out)
    }

    fn list_directories(&self, dir: &Path) -> Result<Vec<PathBuf>, FileStorageError> {
        let mut out = Vec::new();
        let entries = fs::read_dir(dir).map_err(|err| FileStorageError::from_io(dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| FileStorageError::from_io(dir, err))?;
            let file_type = entry
                .file_type()
                .map_err(|err| FileStorageError::from_io(&entry.path(), err))?;
            if file_type.is_dir() {
                out.push(PathBuf::from(entry.file_name()));
            }
        }
        out.sort();
        Ok(out)
    }

    fn file_stats(&self, path: &Path) -> Result<FileStats, FileStorageError> {
        let meta = fs::metadata(path).map_err(|err| FileStorageError::from_io(path, err))?;
        Ok(FileStats {
            size: meta.len(),
            is_directory: meta.is_dir(),
            is_file: meta.is_file(),
            modified_ms: meta.modified().map(system_time_ms).unwrap_or(0),
            created_ms: meta.created().map(system_time_ms).unwrap_or(0),
        })
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), FileStorageError> {
    let entries = fs::read_dir(dir).map_err(|err| FileStorageError::from_io(dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| FileStorageError::from_io(dir, err))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| FileStorageError::from_io(&path, err))?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.to_path_buf());
            }
        }
    }
    Ok(())
}

fn system_time_ms(time: SystemTime) -> i64 {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(_) => 0,
    }
}
