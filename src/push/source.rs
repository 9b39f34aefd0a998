// ABOUTME: Source specification and archive packaging for push.
// ABOUTME: A push takes exactly one of: local path, git reference, image.

use super::error::PushError;
use crate::types::ImageRef;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Where the application's code comes from. Exactly one variant per push.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    /// Local directory or pre-packaged archive to upload.
    Archive(PathBuf),
    /// Git URL and revision for the platform to fetch itself.
    Git { url: String, revision: String },
    /// Prebuilt image; skips source acquisition and staging entirely.
    Image(ImageRef),
}

impl SourceSpec {
    pub fn describe(&self) -> String {
        match self {
            SourceSpec::Archive(path) => path.display().to_string(),
            SourceSpec::Git { url, revision } => format!("{url} @ {revision}"),
            SourceSpec::Image(image) => format!("image {image}"),
        }
    }
}

/// An archive ready for upload. Keeps its scratch directory alive until the
/// upload is done.
#[derive(Debug)]
pub struct PackagedSource {
    archive: PathBuf,
    _workdir: Option<TempDir>,
}

impl PackagedSource {
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }
}

/// Package a local path for upload. Files are assumed to already be
/// archives and pass through untouched; directories are tarred up into a
/// scratch directory.
pub fn package_source(path: &Path) -> Result<PackagedSource, PushError> {
    let metadata = std::fs::metadata(path).map_err(|source| PushError::Package { source })?;

    if metadata.is_file() {
        return Ok(PackagedSource {
            archive: path.to_path_buf(),
            _workdir: None,
        });
    }

    let workdir = tempfile::tempdir().map_err(|source| PushError::Package { source })?;
    let archive = workdir.path().join("source.tar");

    let file = std::fs::File::create(&archive).map_err(|source| PushError::Package { source })?;
    let mut builder = tar::Builder::new(file);
    builder
        .append_dir_all(".", path)
        .map_err(|source| PushError::Package { source })?;
    builder
        .finish()
        .map_err(|source| PushError::Package { source })?;

    Ok(PackagedSource {
        archive,
        _workdir: Some(workdir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn directory_is_packaged_into_tar() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("main.py")).unwrap();
        writeln!(file, "print('hello')").unwrap();

        let packaged = package_source(dir.path()).unwrap();
        let metadata = std::fs::metadata(packaged.archive_path()).unwrap();
        assert!(metadata.len() > 0);
        assert_eq!(
            packaged.archive_path().extension().and_then(|e| e.to_str()),
            Some("tar")
        );
    }

    #[test]
    fn existing_file_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("app.tar");
        std::fs::File::create(&archive).unwrap();

        let packaged = package_source(&archive).unwrap();
        assert_eq!(packaged.archive_path(), archive.as_path());
    }

    #[test]
    fn missing_path_is_a_package_error() {
        let err = package_source(Path::new("/no/such/source")).unwrap_err();
        assert!(matches!(err, PushError::Package { .. }));
    }
}
