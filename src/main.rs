use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::process;

use formula_rs::actions::{self, InstallRequest};
use formula_rs::config::Settings;
use formula_rs::deps::{HostOracle, OverlayOracle};
use formula_rs::options::OptionSet;
use formula_rs::output::eerror;
use formula_rs::recipe::SourceVariant;
use formula_rs::recipes;
use formula_rs::toolchain::Toolchain;

fn main() {
    env_logger::init();

    let app = create_app();
    let matches = app.get_matches();

    let result = run_formula(matches);
    process::exit(result);
}

fn create_app() -> Command {
    Command::new("formula")
        .version("0.1.0")
        .about("Declarative build-recipe orchestrator")
        .arg(
            Arg::new("recipe")
                .help("Recipe to install")
                .required(true),
        )
        .arg(
            Arg::new("option")
                .long("option")
                .short('o')
                .help("Select a build option (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("devel")
                .long("devel")
                .help("Build the development source variant")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("head")
                .long("head")
                .help("Build from the head of version control")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("devel"),
        )
        .arg(
            Arg::new("pretend")
                .long("pretend")
                .short('p')
                .help("Print the configure invocation and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .help("Install prefix")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("localstatedir")
                .long("localstatedir")
                .help("Runtime state directory")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("build-dir")
                .long("build-dir")
                .help("Use an existing source tree instead of fetching")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("files-dir")
                .long("files-dir")
                .help("Directory holding recipe-bundled files")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("distdir")
                .long("distdir")
                .help("Download cache directory")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .help("Parallel jobs for the compile step")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("cc-family")
                .long("cc-family")
                .help("Override detected compiler family")
                .requires("cc-build"),
        )
        .arg(
            Arg::new("cc-build")
                .long("cc-build")
                .help("Override detected compiler build number")
                .value_parser(clap::value_parser!(u32))
                .requires("cc-family"),
        )
        .arg(
            Arg::new("assume-present")
                .long("assume-present")
                .help("Treat a dependency as present without probing (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(
            Arg::new("assume-absent")
                .long("assume-absent")
                .help("Treat a dependency as absent without probing (repeatable)")
                .action(clap::ArgAction::Append),
        )
}

fn run_formula(matches: ArgMatches) -> i32 {
    let name = matches.get_one::<String>("recipe").cloned().unwrap_or_default();
    let Some(recipe) = recipes::find(&name) else {
        eerror(&format!("unknown recipe '{}'", name));
        return 1;
    };

    let flags: Vec<String> = matches
        .get_many::<String>("option")
        .unwrap_or_default()
        .cloned()
        .collect();
    let options = match OptionSet::from_flags(&recipe, &flags) {
        Ok(options) => options,
        Err(e) => {
            eerror(&e.to_string());
            return 1;
        }
    };

    let variant = if matches.get_flag("head") {
        SourceVariant::Head
    } else if matches.get_flag("devel") {
        SourceVariant::Devel
    } else {
        SourceVariant::Stable
    };

    let mut settings = Settings::from_env();
    if let Some(prefix) = matches.get_one::<PathBuf>("prefix") {
        settings.statedir = prefix.join("var");
        settings.prefix = prefix.clone();
    }
    if let Some(statedir) = matches.get_one::<PathBuf>("localstatedir") {
        settings.statedir = statedir.clone();
    }
    if let Some(filesdir) = matches.get_one::<PathBuf>("files-dir") {
        settings.filesdir = filesdir.clone();
    }
    if let Some(distdir) = matches.get_one::<PathBuf>("distdir") {
        settings.distdir = distdir.clone();
    }
    if let Some(jobs) = matches.get_one::<usize>("jobs") {
        settings.jobs = *jobs;
    }

    let mut oracle = OverlayOracle::new(HostOracle::new());
    for dep in matches.get_many::<String>("assume-present").unwrap_or_default() {
        oracle.assume(dep, true);
    }
    for dep in matches.get_many::<String>("assume-absent").unwrap_or_default() {
        oracle.assume(dep, false);
    }

    let host = match (
        matches.get_one::<String>("cc-family"),
        matches.get_one::<u32>("cc-build"),
    ) {
        (Some(family), Some(build)) => Some(Toolchain::new(family, *build)),
        _ => Toolchain::detect(),
    };

    let request = InstallRequest {
        variant,
        options,
        build_dir: matches.get_one::<PathBuf>("build-dir").cloned(),
        pretend: matches.get_flag("pretend"),
    };

    actions::action_install(&recipe, &request, &settings, &oracle, host.as_ref())
}
