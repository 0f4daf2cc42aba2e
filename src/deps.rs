// deps.rs -- Dependency availability detection

use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Stdio};

/// Answers whether a named dependency is present on the host.  The build
/// engine only ever consumes the boolean; how presence is determined is
/// this module's business.
pub trait DependencyOracle {
    fn available(&self, name: &str) -> bool;
}

/// Probes the live host: pkg-config first, then a PATH scan for a tool of
/// the same name (mysql and postgresql ship client binaries named after
/// themselves; re2 registers with pkg-config).
#[derive(Debug, Default)]
pub struct HostOracle;

impl HostOracle {
    pub fn new() -> Self {
        HostOracle
    }

    fn pkg_config_knows(name: &str) -> bool {
        Command::new("pkg-config")
            .arg("--exists")
            .arg(name)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl DependencyOracle for HostOracle {
    fn available(&self, name: &str) -> bool {
        if Self::pkg_config_knows(name) {
            return true;
        }
        find_command_in_path(name).is_some()
    }
}

/// Fixed answers, for tests and for explicit CLI overrides.
#[derive(Debug, Default)]
pub struct FixedOracle {
    answers: HashMap<String, bool>,
    /// Answer for dependencies with no explicit entry.
    pub default: bool,
}

impl FixedOracle {
    pub fn new(default: bool) -> Self {
        FixedOracle {
            answers: HashMap::new(),
            default,
        }
    }

    pub fn set(&mut self, name: &str, present: bool) {
        self.answers.insert(name.to_string(), present);
    }
}

impl DependencyOracle for FixedOracle {
    fn available(&self, name: &str) -> bool {
        self.answers.get(name).copied().unwrap_or(self.default)
    }
}

/// Layered oracle: explicit CLI assumptions first, host probing for the
/// rest.
pub struct OverlayOracle<O> {
    overrides: HashMap<String, bool>,
    fallback: O,
}

impl<O: DependencyOracle> OverlayOracle<O> {
    pub fn new(fallback: O) -> Self {
        OverlayOracle {
            overrides: HashMap::new(),
            fallback,
        }
    }

    pub fn assume(&mut self, name: &str, present: bool) {
        self.overrides.insert(name.to_string(), present);
    }
}

impl<O: DependencyOracle> DependencyOracle for OverlayOracle<O> {
    fn available(&self, name: &str) -> bool {
        match self.overrides.get(name) {
            Some(answer) => *answer,
            None => self.fallback.available(name),
        }
    }
}

/// Scan PATH for an executable with the given name.
pub fn find_command_in_path(cmd: &str) -> Option<std::path::PathBuf> {
    let path_var = std::env::var("PATH").unwrap_or_else(|_| {
        "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin".to_string()
    });

    for path_dir in path_var.split(':') {
        let cmd_path = Path::new(path_dir).join(cmd);
        if cmd_path.is_file() {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(metadata) = std::fs::metadata(&cmd_path) {
                    if metadata.permissions().mode() & 0o111 != 0 {
                        return Some(cmd_path);
                    }
                }
                continue;
            }
            #[cfg(not(unix))]
            return Some(cmd_path);
        }
    }

    None
}
