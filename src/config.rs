// config.rs -- Install settings and their precedence
//
// Defaults come from the environment (FORMULA_* variables), CLI flags
// override them.  Everything here is resolved once, before the pipeline
// starts.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Install prefix for the built package.
    pub prefix: PathBuf,
    /// Runtime state directory passed to configure (--localstatedir).
    pub statedir: PathBuf,
    /// Where downloaded source archives are cached.
    pub distdir: PathBuf,
    /// Where recipe-colocated files (bundled resources) live.
    pub filesdir: PathBuf,
    /// Scratch directory sources are unpacked into.
    pub workdir: PathBuf,
    /// Parallel jobs for the compile step.
    pub jobs: usize,
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

impl Settings {
    /// Environment-derived defaults.
    pub fn from_env() -> Self {
        let prefix = env_path("FORMULA_PREFIX", "/usr/local");
        let statedir = std::env::var_os("FORMULA_STATEDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| prefix.join("var"));
        Settings {
            prefix,
            statedir,
            distdir: env_path("FORMULA_DISTDIR", "/var/cache/formula/distfiles"),
            filesdir: env_path("FORMULA_FILESDIR", "."),
            workdir: env_path("FORMULA_WORKDIR", "/var/tmp/formula"),
            jobs: num_cpus::get(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env()
    }
}
