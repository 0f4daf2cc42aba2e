// exception.rs -- Error types for the recipe build pipeline

use thiserror::Error;

/// The host toolchain matches a known-broken family/build combination.
///
/// The cause string is the recorded failure signature from a real build and
/// must reach the operator unmodified.
#[derive(Debug, Error)]
#[error("incompatible toolchain: {family} build {build}: {cause}")]
pub struct IncompatibleToolchain {
    pub family: String,
    pub build: u32,
    pub cause: String,
}

/// Staging the bundled resource into the build tree failed.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("resource archive not found: {0}")]
    MissingArchive(String),
    #[error("failed to extract resource archive: {0}")]
    Extract(String),
    #[error("failed to write staged resource: {0}")]
    Io(#[from] std::io::Error),
}

/// Pre-configure source patching failed.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch target not found: {0} (was the resource staged?)")]
    MissingTarget(String),
    #[error("failed to rewrite {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fetching or unpacking the primary source failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no downloader available (need curl or wget)")]
    NoDownloader,
    #[error("failed to fetch {url}")]
    Download { url: String },
    #[error("checkout of {url} failed")]
    Checkout { url: String },
    #[error("source archive has no extractable contents")]
    EmptyArchive,
    #[error("failed to unpack source: {0}")]
    Unpack(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which of the two external build steps failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Configure,
    Install,
}

impl std::fmt::Display for BuildStep {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BuildStep::Configure => write!(f, "configure"),
            BuildStep::Install => write!(f, "install"),
        }
    }
}

/// A build step exited non-zero.  Carries the captured output so the
/// operator sees the native toolchain's diagnostics verbatim.
#[derive(Debug, Error)]
#[error("{step} step failed:\n{output}")]
pub struct BuildFailure {
    pub step: BuildStep,
    pub output: String,
}

/// Umbrella error for a full install attempt.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Toolchain(#[from] IncompatibleToolchain),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Staging(#[from] StagingError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Build(#[from] BuildFailure),
    #[error("unknown option '{0}' for this recipe")]
    UnknownOption(String),
}
