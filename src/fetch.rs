// fetch.rs -- Source retrieval and unpacking
//
// Retrieval is delegated to external tooling (curl/wget for archives,
// svn for head checkouts); this module only sequences it and hands back
// the source root.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::deps::find_command_in_path;
use crate::exception::FetchError;
use crate::output::einfo;
use crate::stage::{extract_archive, single_toplevel_dir};

/// File name an archive URL downloads to.
fn archive_filename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Fetch a source archive into distdir, returning its local path.
/// Pre-seeded files are reused; `file://` locators are copied directly.
pub fn fetch_archive(url: &str, distdir: &Path) -> Result<PathBuf, FetchError> {
    std::fs::create_dir_all(distdir)?;
    let dest = distdir.join(archive_filename(url));

    if dest.is_file() {
        einfo(&format!("Using cached {}", dest.display()));
        return Ok(dest);
    }

    if let Some(path) = url.strip_prefix("file://") {
        std::fs::copy(path, &dest)?;
        return Ok(dest);
    }

    einfo(&format!("Downloading {}", url));
    if download_with_curl(url, &dest)? || download_with_wget(url, &dest)? {
        return Ok(dest);
    }

    if find_command_in_path("curl").is_none() && find_command_in_path("wget").is_none() {
        return Err(FetchError::NoDownloader);
    }

    // A zero-byte leftover from a failed attempt would shadow a retry.
    if dest.exists() {
        std::fs::remove_file(&dest)?;
    }
    Err(FetchError::Download {
        url: url.to_string(),
    })
}

fn download_with_curl(url: &str, dest: &Path) -> Result<bool, FetchError> {
    if find_command_in_path("curl").is_none() {
        return Ok(false);
    }
    let output = Command::new("curl")
        .arg("-L")
        .arg("-o")
        .arg(dest)
        .arg("--fail")
        .arg("--silent")
        .arg("--show-error")
        .arg(url)
        .output()?;
    Ok(output.status.success())
}

fn download_with_wget(url: &str, dest: &Path) -> Result<bool, FetchError> {
    if find_command_in_path("wget").is_none() {
        return Ok(false);
    }
    let output = Command::new("wget")
        .arg("-O")
        .arg(dest)
        .arg("--quiet")
        .arg(url)
        .output()?;
    Ok(output.status.success())
}

/// Check a head source out of version control into workdir and return
/// the checkout root.
pub fn checkout_head(name: &str, url: &str, workdir: &Path) -> Result<PathBuf, FetchError> {
    let dest = workdir.join(format!("{}-head", name));
    std::fs::create_dir_all(workdir)?;

    einfo(&format!("Checking out {}", url));
    let output = Command::new("svn")
        .arg("checkout")
        .arg(url)
        .arg(&dest)
        .output()?;

    if !output.status.success() {
        return Err(FetchError::Checkout {
            url: url.to_string(),
        });
    }
    Ok(dest)
}

/// Unpack a source archive into workdir and return the source root: the
/// archive's single top-level directory when it has one, else workdir
/// itself.
pub fn unpack_source(archive: &Path, workdir: &Path) -> Result<PathBuf, FetchError> {
    std::fs::create_dir_all(workdir)?;

    einfo(&format!("Unpacking {}", archive.display()));
    extract_archive(archive, workdir).map_err(|e| FetchError::Unpack(e.to_string()))?;

    if std::fs::read_dir(workdir)?.next().is_none() {
        return Err(FetchError::EmptyArchive);
    }

    Ok(single_toplevel_dir(workdir)?.unwrap_or_else(|| workdir.to_path_buf()))
}
