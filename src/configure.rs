// configure.rs -- Configuration argument builder
//
// The one piece of the pipeline with real decision logic.  Pure function
// over the recipe tables, the user's option selection and the dependency
// oracle's answers; no I/O.  Emission order is fixed because autoconf
// treats later duplicate flags as overrides.

use std::path::Path;

use crate::deps::DependencyOracle;
use crate::options::OptionSet;
use crate::recipe::{FlagRule, Recipe};

/// Expand `{prefix}` / `{statedir}` placeholders in a base-argument
/// template entry.
fn expand(template: &str, prefix: &Path, statedir: &Path) -> String {
    template
        .replace("{prefix}", &prefix.display().to_string())
        .replace("{statedir}", &statedir.display().to_string())
}

/// Produce the ordered configure argument vector.
///
/// 1. Base template, expanded, unconditionally (the resource-library flag
///    lives here and is never conditional).
/// 2. Each declared option, in declaration order, per its FlagRule.
pub fn build_args(
    recipe: &Recipe,
    options: &OptionSet,
    oracle: &dyn DependencyOracle,
    prefix: &Path,
    statedir: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = recipe
        .base_configure_args
        .iter()
        .map(|t| expand(t, prefix, statedir))
        .collect();

    for option in &recipe.options {
        match option.flag {
            FlagRule::WhenSelected(flag) => {
                if options.selected(option.name) {
                    args.push(flag.to_string());
                }
            }
            FlagRule::WhenSelectedAndPresent(flag) => {
                // Selected-but-absent is not an error here: configure is
                // the authority on whether the library is truly usable.
                if options.selected(option.name) && oracle.available(option.name) {
                    args.push(flag.to_string());
                }
            }
            FlagRule::WithWithout => {
                if options.selected(option.name) {
                    args.push(format!("--with-{}", option.name));
                } else {
                    args.push(format!("--without-{}", option.name));
                }
            }
        }
    }

    args
}
