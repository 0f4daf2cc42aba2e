// stage.rs -- Staging of bundled resource archives into the build tree
//
// The bundled stemmer snapshot ships as a tarball next to the recipe and
// must land in the build tree before configure runs, because both the
// configure flags and the pre-configure patch assume it is there.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::exception::StagingError;

/// Compression wrappers we accept for bundled resources and source
/// archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarBz2,
    TarXz,
    Tar,
    Unknown,
}

impl ArchiveFormat {
    pub fn detect(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Self::TarGz
        } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") {
            Self::TarBz2
        } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            Self::TarXz
        } else if lower.ends_with(".tar") {
            Self::Tar
        } else {
            Self::Unknown
        }
    }
}

/// Extract a tar archive (optionally compressed) into dest_dir.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> Result<(), StagingError> {
    let filename = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StagingError::Extract("invalid archive file name".to_string()))?;

    let file = File::open(archive_path).map_err(|e| {
        StagingError::Extract(format!("failed to open {}: {}", archive_path.display(), e))
    })?;

    let unpack = |archive: &mut tar::Archive<Box<dyn std::io::Read>>| {
        archive
            .unpack(dest_dir)
            .map_err(|e| StagingError::Extract(format!("failed to unpack {}: {}", filename, e)))
    };

    let reader: Box<dyn std::io::Read> = match ArchiveFormat::detect(filename) {
        ArchiveFormat::TarGz => Box::new(flate2::read::GzDecoder::new(file)),
        ArchiveFormat::TarBz2 => Box::new(bzip2::read::BzDecoder::new(file)),
        ArchiveFormat::TarXz => Box::new(xz2::read::XzDecoder::new(file)),
        ArchiveFormat::Tar => Box::new(file),
        ArchiveFormat::Unknown => {
            return Err(StagingError::Extract(format!(
                "unknown archive format: {}",
                filename
            )));
        }
    };

    let mut archive = tar::Archive::new(reader);
    unpack(&mut archive)
}

/// Stage a bundled resource archive into `<build_root>/<subdir>`,
/// replacing whatever was there.  A missing archive is fatal: the bundle
/// ships with the recipe, so its absence means a corrupted distribution.
pub fn stage(archive_path: &Path, build_root: &Path, subdir: &str) -> Result<PathBuf, StagingError> {
    if !archive_path.is_file() {
        return Err(StagingError::MissingArchive(
            archive_path.display().to_string(),
        ));
    }

    let dest = build_root.join(subdir);
    if dest.exists() {
        std::fs::remove_dir_all(&dest)?;
    }
    std::fs::create_dir_all(&dest)?;

    // Unpack into a scratch directory first so a wrapping top-level
    // directory inside the tarball can be flattened away.
    let scratch = build_root.join(format!(".{}.staging", subdir));
    if scratch.exists() {
        std::fs::remove_dir_all(&scratch)?;
    }
    std::fs::create_dir_all(&scratch)?;

    extract_archive(archive_path, &scratch)?;

    let payload_root = single_toplevel_dir(&scratch)?.unwrap_or_else(|| scratch.clone());
    for entry in std::fs::read_dir(&payload_root)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        std::fs::rename(entry.path(), &target)?;
    }

    std::fs::remove_dir_all(&scratch)?;

    log::debug!("staged {} into {}", archive_path.display(), dest.display());
    Ok(dest)
}

/// If dir contains exactly one entry and it is a directory, return it.
pub fn single_toplevel_dir(dir: &Path) -> Result<Option<PathBuf>, std::io::Error> {
    let mut entries = std::fs::read_dir(dir)?;
    let first = match entries.next() {
        Some(entry) => entry?.path(),
        None => return Ok(None),
    };
    if entries.next().is_some() || !first.is_dir() {
        return Ok(None);
    }
    Ok(Some(first))
}
