// patch.rs -- Literal find/replace corrections applied before configure

use std::path::Path;

use crate::exception::PatchError;
use crate::output::einfo;
use crate::recipe::PatchRule;

/// Outcome of applying one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    /// The find text was absent; the rule had already been applied (or was
    /// never needed).  Repeated build attempts hit this path.
    AlreadyApplied,
}

/// Apply a single rule to its target file under build_root.  Exact
/// substring replacement, not a regex.
pub fn apply_patch(build_root: &Path, rule: &PatchRule) -> Result<PatchOutcome, PatchError> {
    let target = build_root.join(rule.file);
    if !target.is_file() {
        return Err(PatchError::MissingTarget(target.display().to_string()));
    }

    let content = std::fs::read_to_string(&target).map_err(|e| PatchError::Io {
        file: target.display().to_string(),
        source: e,
    })?;

    if !content.contains(rule.find) {
        log::debug!("{}: '{}' not present, treating as applied", rule.file, rule.find);
        return Ok(PatchOutcome::AlreadyApplied);
    }

    let patched = content.replace(rule.find, rule.replace);
    std::fs::write(&target, patched).map_err(|e| PatchError::Io {
        file: target.display().to_string(),
        source: e,
    })?;

    Ok(PatchOutcome::Applied)
}

/// Apply every rule in order, stopping at the first failure.
pub fn apply_patches(build_root: &Path, rules: &[PatchRule]) -> Result<(), PatchError> {
    for rule in rules {
        match apply_patch(build_root, rule)? {
            PatchOutcome::Applied => {
                einfo(&format!("Patched {} ({} -> {})", rule.file, rule.find, rule.replace));
            }
            PatchOutcome::AlreadyApplied => {
                einfo(&format!("{} already patched", rule.file));
            }
        }
    }
    Ok(())
}
