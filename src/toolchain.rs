// toolchain.rs -- Host toolchain identification and compatibility guard

use std::process::Command;

use lazy_static::lazy_static;
use regex::Regex;

use crate::exception::IncompatibleToolchain;
use crate::recipe::ToolchainFailureRule;

lazy_static! {
    // Apple toolchains embed a build number in the version banner, e.g.
    // "Apple clang version 4.1 (tags/Apple/clang-421.11.66)" or
    // "Apple LLVM version ... llvm-gcc ... (LLVM build 2336.11.00)".
    static ref CLANG_BUILD_RE: Regex = Regex::new(r"clang-(\d+)").unwrap();
    static ref LLVM_BUILD_RE: Regex = Regex::new(r"LLVM build (\d+)").unwrap();
}

/// Identity of the host compiler, as reported by its version banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub family: String,
    pub build: u32,
}

impl Toolchain {
    pub fn new(family: &str, build: u32) -> Self {
        Toolchain {
            family: family.to_string(),
            build,
        }
    }

    /// Identify the host compiler by running `$CC --version` (default
    /// `cc`).  Returns None when there is no compiler or the banner is not
    /// one we know how to read; the guard is skipped in that case.
    pub fn detect() -> Option<Self> {
        let cc = std::env::var("CC").unwrap_or_else(|_| "cc".to_string());
        let output = Command::new(&cc).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        let banner = String::from_utf8_lossy(&output.stdout);
        Self::parse_banner(&banner)
    }

    /// Parse a compiler version banner into a family + build pair.
    pub fn parse_banner(banner: &str) -> Option<Self> {
        if let Some(caps) = CLANG_BUILD_RE.captures(banner) {
            let build = caps[1].parse().ok()?;
            return Some(Toolchain::new("clang", build));
        }
        if let Some(caps) = LLVM_BUILD_RE.captures(banner) {
            let build = caps[1].parse().ok()?;
            return Some(Toolchain::new("llvm", build));
        }
        None
    }
}

/// Reject toolchains the recipe declares broken.  Pure table lookup: a
/// rule matches when its family equals the host family and the host build
/// number is at or past the rule's threshold.  Runs before any staging or
/// patching so a doomed build never touches the tree.
pub fn check(rules: &[ToolchainFailureRule], toolchain: &Toolchain) -> Result<(), IncompatibleToolchain> {
    for rule in rules {
        if rule.family == toolchain.family && toolchain.build >= rule.build {
            return Err(IncompatibleToolchain {
                family: toolchain.family.clone(),
                build: toolchain.build,
                cause: rule.cause.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<ToolchainFailureRule> {
        vec![
            ToolchainFailureRule {
                family: "llvm",
                build: 2334,
                cause: "ld: rel32 out of range",
            },
            ToolchainFailureRule {
                family: "clang",
                build: 421,
                cause: "use of undeclared identifier 'ExprEval'",
            },
        ]
    }

    #[test]
    fn test_fails_at_threshold() {
        let err = check(&rules(), &Toolchain::new("clang", 421)).unwrap_err();
        assert_eq!(err.cause, "use of undeclared identifier 'ExprEval'");
    }

    #[test]
    fn test_fails_past_threshold() {
        assert!(check(&rules(), &Toolchain::new("llvm", 9999)).is_err());
    }

    #[test]
    fn test_passes_below_threshold() {
        assert!(check(&rules(), &Toolchain::new("clang", 420)).is_ok());
        assert!(check(&rules(), &Toolchain::new("llvm", 2333)).is_ok());
    }

    #[test]
    fn test_passes_unknown_family() {
        assert!(check(&rules(), &Toolchain::new("gcc", 99999)).is_ok());
    }

    #[test]
    fn test_cause_text_is_verbatim() {
        let err = check(&rules(), &Toolchain::new("llvm", 2334)).unwrap_err();
        assert_eq!(err.cause, "ld: rel32 out of range");
    }

    #[test]
    fn test_parse_clang_banner() {
        let banner = "Apple clang version 4.1 (tags/Apple/clang-421.11.66) (based on LLVM 3.1svn)";
        let tc = Toolchain::parse_banner(banner).unwrap();
        assert_eq!(tc.family, "clang");
        assert_eq!(tc.build, 421);
    }

    #[test]
    fn test_parse_llvm_gcc_banner() {
        let banner = "i686-apple-darwin11-llvm-gcc-4.2 (GCC) 4.2.1 (LLVM build 2336.11.00)";
        let tc = Toolchain::parse_banner(banner).unwrap();
        assert_eq!(tc.family, "llvm");
        assert_eq!(tc.build, 2336);
    }

    #[test]
    fn test_parse_unrecognized_banner() {
        assert!(Toolchain::parse_banner("gcc (GCC) 13.2.0").is_none());
    }
}
