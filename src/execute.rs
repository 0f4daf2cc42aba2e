// execute.rs -- Runs the configure and install steps

use std::path::Path;
use std::process::Command;

use crate::exception::{BuildFailure, BuildStep};
use crate::output::{ebegin, eend, einfo};
use crate::recipe::Recipe;

/// Run a build step, echo its output, and capture it for diagnostics.
fn run_step(
    step: BuildStep,
    mut command: Command,
    build_root: &Path,
) -> Result<(), BuildFailure> {
    command.current_dir(build_root);

    let output = command.output().map_err(|e| BuildFailure {
        step,
        output: format!("failed to launch: {}", e),
    })?;

    // The operator sees the native toolchain's output live; on failure it
    // is also carried in the error, since it is the primary debugging aid.
    if !output.stdout.is_empty() {
        print!("{}", String::from_utf8_lossy(&output.stdout));
    }
    if !output.stderr.is_empty() {
        eprint!("{}", String::from_utf8_lossy(&output.stderr));
    }

    if !output.status.success() {
        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(BuildFailure {
            step,
            output: captured,
        });
    }

    Ok(())
}

/// Execute the two-step build: configure with the prepared argument
/// vector, then the recipe's install invocation.  The install step runs
/// only if configure succeeded; there is no partial-success state.
pub fn execute(
    recipe: &Recipe,
    args: &[String],
    build_root: &Path,
    jobs: usize,
) -> Result<(), BuildFailure> {
    einfo(&format!("Configuring in {}", build_root.display()));
    log::debug!("{} {}", recipe.configure_program, args.join(" "));

    let mut configure = Command::new(recipe.configure_program);
    configure.args(args);
    run_step(BuildStep::Configure, configure, build_root)?;

    let (program, rest) = recipe
        .install_invocation
        .split_first()
        .ok_or_else(|| BuildFailure {
            step: BuildStep::Install,
            output: "recipe has no install invocation".to_string(),
        })?;

    ebegin(&format!("Running {}", recipe.install_invocation.join(" ")));
    let mut install = Command::new(program);
    install.args(rest);
    // The install argv is fixed; parallelism rides in through make's
    // environment instead.
    install.env("MAKEFLAGS", format!("-j{}", jobs));
    let result = run_step(BuildStep::Install, install, build_root);
    eend(if result.is_ok() { 0 } else { 1 });

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A recipe whose build steps are harmless host commands, so tests
    /// stay hermetic.
    fn test_recipe(install_invocation: Vec<&'static str>) -> Recipe {
        let mut recipe = recipes::sphinx();
        recipe.install_invocation = install_invocation;
        recipe
    }

    fn write_configure(root: &Path, body: &str) {
        let path = root.join("configure");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }

    #[test]
    fn test_both_steps_run_in_order() {
        let tmp = TempDir::new().unwrap();
        write_configure(tmp.path(), "echo \"$@\" > args.txt");

        let recipe = test_recipe(vec!["touch", "installed"]);
        let args = vec!["--prefix=/usr/local".to_string(), "--without-mysql".to_string()];
        execute(&recipe, &args, tmp.path(), 1).unwrap();

        let recorded = std::fs::read_to_string(tmp.path().join("args.txt")).unwrap();
        assert_eq!(recorded.trim(), "--prefix=/usr/local --without-mysql");
        assert!(tmp.path().join("installed").exists());
    }

    #[test]
    fn test_configure_failure_skips_install() {
        let tmp = TempDir::new().unwrap();
        write_configure(tmp.path(), "echo broken >&2; exit 3");

        let recipe = test_recipe(vec!["touch", "installed"]);
        let err = execute(&recipe, &[], tmp.path(), 1).unwrap_err();

        assert_eq!(err.step, BuildStep::Configure);
        assert!(err.output.contains("broken"));
        assert!(!tmp.path().join("installed").exists());
    }

    #[test]
    fn test_install_failure_is_surfaced() {
        let tmp = TempDir::new().unwrap();
        write_configure(tmp.path(), "exit 0");

        let recipe = test_recipe(vec!["sh", "-c", "echo no rule >&2; exit 2"]);
        let err = execute(&recipe, &[], tmp.path(), 1).unwrap_err();

        assert_eq!(err.step, BuildStep::Install);
        assert!(err.output.contains("no rule"));
    }

    #[test]
    fn test_missing_configure_script_fails() {
        let tmp = TempDir::new().unwrap();
        let recipe = test_recipe(vec!["true"]);
        let err = execute(&recipe, &[], tmp.path(), 1).unwrap_err();
        assert_eq!(err.step, BuildStep::Configure);
    }
}
