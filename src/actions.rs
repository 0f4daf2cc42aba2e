// actions.rs -- The install pipeline
//
// Stage order is fixed by data dependencies: the guard runs before any
// filesystem work, staging must precede patching (the patch targets a
// staged file), and the argument vector must be complete before the
// external processes launch.

use std::path::PathBuf;

use crate::config::Settings;
use crate::configure::build_args;
use crate::deps::DependencyOracle;
use crate::exception::RecipeError;
use crate::execute::execute;
use crate::fetch::{checkout_head, fetch_archive, unpack_source};
use crate::options::OptionSet;
use crate::output::{eerror, einfo, ewarn};
use crate::patch::apply_patches;
use crate::recipe::{Recipe, SourceLocator, SourceVariant};
use crate::stage::stage;
use crate::toolchain::{self, Toolchain};

/// One install attempt's inputs, beyond the recipe itself.
pub struct InstallRequest {
    pub variant: SourceVariant,
    pub options: OptionSet,
    /// Existing build tree to use instead of fetching and unpacking.
    pub build_dir: Option<PathBuf>,
    /// Print the configure invocation and stop before touching anything.
    pub pretend: bool,
}

/// Run the full pipeline: guard, fetch, stage, patch, configure, install,
/// caveats.  Any error aborts the remainder immediately.
pub fn install(
    recipe: &Recipe,
    request: &InstallRequest,
    settings: &Settings,
    oracle: &dyn DependencyOracle,
    host: Option<&Toolchain>,
) -> Result<(), RecipeError> {
    // Cheap check first: a known-broken toolchain must not cost the
    // operator a fetch and a half-built tree.
    match host {
        Some(tc) => {
            toolchain::check(&recipe.fails_with, tc)?;
            log::debug!("toolchain {} build {} accepted", tc.family, tc.build);
        }
        None => ewarn("Could not identify the host compiler; skipping compatibility check"),
    }

    let args = build_args(
        recipe,
        &request.options,
        oracle,
        &settings.prefix,
        &settings.statedir,
    );

    if request.pretend {
        einfo(&format!("Would configure {} with:", recipe.name));
        for arg in &args {
            println!("    {}", arg);
        }
        return Ok(());
    }

    warn_missing_dependencies(recipe, &request.options, oracle);

    let build_root = match &request.build_dir {
        Some(dir) => dir.clone(),
        None => obtain_source(recipe, request.variant, settings)?,
    };

    if let Some(resource) = &recipe.resource {
        let archive = settings.filesdir.join(resource.archive);
        einfo(&format!("Staging {} into {}", resource.name, resource.subdir));
        stage(&archive, &build_root, resource.subdir)?;
    }

    apply_patches(&build_root, &recipe.patches)?;

    execute(recipe, &args, &build_root, settings.jobs)?;

    einfo(&format!("{} installed to {}", recipe.name, settings.prefix.display()));
    println!("\n{}\n", recipe.caveats);
    Ok(())
}

/// Fetch and unpack the selected source variant, returning the build
/// tree root.
fn obtain_source(
    recipe: &Recipe,
    variant: SourceVariant,
    settings: &Settings,
) -> Result<PathBuf, RecipeError> {
    let workdir = settings.workdir.join(recipe.name);
    match recipe.locator(variant) {
        SourceLocator::Archive(url) => {
            let archive = fetch_archive(url, &settings.distdir)?;
            Ok(unpack_source(&archive, &workdir)?)
        }
        SourceLocator::Vcs(url) => Ok(checkout_head(recipe.name, url, &workdir)?),
    }
}

/// A required dependency the oracle cannot find gets a warning, not an
/// error: configure is the final authority on usability.
fn warn_missing_dependencies(recipe: &Recipe, options: &OptionSet, oracle: &dyn DependencyOracle) {
    for dep in &recipe.dependencies {
        if dep.required(options) && !oracle.available(dep.name) {
            ewarn(&format!(
                "{} is required by the selected options but was not found on this host",
                dep.name
            ));
        }
    }
}

/// CLI wrapper: run the pipeline and map the outcome to an exit code.
pub fn action_install(
    recipe: &Recipe,
    request: &InstallRequest,
    settings: &Settings,
    oracle: &dyn DependencyOracle,
    host: Option<&Toolchain>,
) -> i32 {
    match install(recipe, request, settings, oracle, host) {
        Ok(()) => 0,
        Err(e) => {
            eerror(&e.to_string());
            1
        }
    }
}
