// End-to-end pipeline tests: a hermetic build tree with a stub configure
// script, a generated stemmer bundle, and fixed dependency answers.

use std::fs::File;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use formula_rs::actions::{install, InstallRequest};
use formula_rs::config::Settings;
use formula_rs::deps::FixedOracle;
use formula_rs::exception::RecipeError;
use formula_rs::options::OptionSet;
use formula_rs::recipe::{Recipe, SourceVariant};
use formula_rs::recipes;
use formula_rs::toolchain::Toolchain;

fn settings_in(tmp: &TempDir) -> Settings {
    Settings {
        prefix: tmp.path().join("prefix"),
        statedir: tmp.path().join("prefix/var"),
        distdir: tmp.path().join("distfiles"),
        filesdir: tmp.path().join("files"),
        workdir: tmp.path().join("work"),
        jobs: 1,
    }
}

/// Sphinx recipe with the install step swapped for a harmless command, so
/// no real make is required.
fn hermetic_sphinx() -> Recipe {
    let mut recipe = recipes::sphinx();
    recipe.install_invocation = vec!["touch", "installed"];
    recipe
}

/// Build tree with a configure stub that records its argument vector.
fn make_build_tree(tmp: &TempDir) -> PathBuf {
    let build = tmp.path().join("build");
    std::fs::create_dir_all(&build).unwrap();
    let configure = build.join("configure");
    std::fs::write(&configure, "#!/bin/sh\necho \"$@\" > args.txt\n").unwrap();
    let mut perms = std::fs::metadata(&configure).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&configure, perms).unwrap();
    build
}

/// The bundled stemmer archive, with the Makefile still using the old
/// Hungarian file name.
fn make_stemmer_bundle(filesdir: &Path) {
    std::fs::create_dir_all(filesdir).unwrap();
    let file = File::create(filesdir.join("libstemmer_c.tgz")).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let data = b"OBJS = stem_ISO_8859_1_hungarian.o\n" as &[u8];
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "libstemmer_c/Makefile.in", data)
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap().flush().unwrap();
}

fn recorded_args(build: &Path) -> Vec<String> {
    std::fs::read_to_string(build.join("args.txt"))
        .unwrap()
        .trim()
        .split(' ')
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn default_build_configures_without_either_datastore() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = make_build_tree(&tmp);
    make_stemmer_bundle(&settings.filesdir);

    let recipe = hermetic_sphinx();
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options: OptionSet::new(),
        build_dir: Some(build.clone()),
        pretend: false,
    };

    install(&recipe, &request, &settings, &FixedOracle::new(false), None).unwrap();

    assert_eq!(
        recorded_args(&build),
        vec![
            format!("--prefix={}", settings.prefix.display()),
            "--disable-dependency-tracking".to_string(),
            format!("--localstatedir={}", settings.statedir.display()),
            "--with-libstemmer".to_string(),
            "--without-mysql".to_string(),
            "--without-pgsql".to_string(),
        ]
    );
    assert!(build.join("installed").exists());

    // Staging and patching both happened before configure.
    let makefile = std::fs::read_to_string(build.join("libstemmer_c/Makefile.in")).unwrap();
    assert!(makefile.contains("stem_ISO_8859_2_hungarian"));
    assert!(!makefile.contains("stem_ISO_8859_1_hungarian"));
}

#[test]
fn mysql_and_id64_selection_shapes_the_vector() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = make_build_tree(&tmp);
    make_stemmer_bundle(&settings.filesdir);

    let recipe = hermetic_sphinx();
    let mut options = OptionSet::new();
    options.select("mysql");
    options.select("id64");
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options,
        build_dir: Some(build.clone()),
        pretend: false,
    };

    install(&recipe, &request, &settings, &FixedOracle::new(false), None).unwrap();

    assert_eq!(
        recorded_args(&build),
        vec![
            format!("--prefix={}", settings.prefix.display()),
            "--disable-dependency-tracking".to_string(),
            format!("--localstatedir={}", settings.statedir.display()),
            "--with-libstemmer".to_string(),
            "--enable-id64".to_string(),
            "--with-mysql".to_string(),
            "--without-pgsql".to_string(),
        ]
    );
}

#[test]
fn re2_flag_needs_host_availability() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = make_build_tree(&tmp);
    make_stemmer_bundle(&settings.filesdir);

    let recipe = hermetic_sphinx();
    let mut options = OptionSet::new();
    options.select("re2");
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options,
        build_dir: Some(build.clone()),
        pretend: false,
    };

    // Selected but absent on the host: no flag, build still succeeds.
    install(&recipe, &request, &settings, &FixedOracle::new(false), None).unwrap();
    assert!(!recorded_args(&build).contains(&"--with-re2".to_string()));

    let mut present = FixedOracle::new(false);
    present.set("re2", true);
    install(&recipe, &request, &settings, &present, None).unwrap();
    assert!(recorded_args(&build).contains(&"--with-re2".to_string()));
}

#[test]
fn broken_clang_aborts_before_staging() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = make_build_tree(&tmp);
    make_stemmer_bundle(&settings.filesdir);

    let recipe = hermetic_sphinx();
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options: OptionSet::new(),
        build_dir: Some(build.clone()),
        pretend: false,
    };

    let host = Toolchain::new("clang", 421);
    let err = install(
        &recipe,
        &request,
        &settings,
        &FixedOracle::new(false),
        Some(&host),
    )
    .unwrap_err();

    match err {
        RecipeError::Toolchain(e) => {
            assert_eq!(
                e.cause,
                "sphinxexpr.cpp:1802:11: error: use of undeclared identifier 'ExprEval'"
            );
        }
        other => panic!("expected toolchain error, got {:?}", other),
    }
    assert!(!build.join("libstemmer_c").exists());
    assert!(!build.join("args.txt").exists());
}

#[test]
fn old_clang_passes_the_guard() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = make_build_tree(&tmp);
    make_stemmer_bundle(&settings.filesdir);

    let recipe = hermetic_sphinx();
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options: OptionSet::new(),
        build_dir: Some(build.clone()),
        pretend: false,
    };

    let host = Toolchain::new("clang", 420);
    install(
        &recipe,
        &request,
        &settings,
        &FixedOracle::new(false),
        Some(&host),
    )
    .unwrap();
    assert!(build.join("installed").exists());
}

#[test]
fn missing_bundle_is_a_staging_error() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = make_build_tree(&tmp);
    // No stemmer bundle in filesdir.

    let recipe = hermetic_sphinx();
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options: OptionSet::new(),
        build_dir: Some(build.clone()),
        pretend: false,
    };

    let err = install(&recipe, &request, &settings, &FixedOracle::new(false), None).unwrap_err();
    assert!(matches!(err, RecipeError::Staging(_)));
    // Configure never ran.
    assert!(!build.join("args.txt").exists());
}

#[test]
fn repeated_install_attempts_are_safe() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = make_build_tree(&tmp);
    make_stemmer_bundle(&settings.filesdir);

    let recipe = hermetic_sphinx();
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options: OptionSet::new(),
        build_dir: Some(build.clone()),
        pretend: false,
    };

    install(&recipe, &request, &settings, &FixedOracle::new(false), None).unwrap();
    let first = std::fs::read_to_string(build.join("libstemmer_c/Makefile.in")).unwrap();

    // Second attempt re-stages the bundle and re-applies the patch.
    install(&recipe, &request, &settings, &FixedOracle::new(false), None).unwrap();
    let second = std::fs::read_to_string(build.join("libstemmer_c/Makefile.in")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn failing_configure_surfaces_captured_output() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let build = tmp.path().join("build");
    std::fs::create_dir_all(&build).unwrap();
    let configure = build.join("configure");
    std::fs::write(&configure, "#!/bin/sh\necho 'checking for re2... no' >&2\nexit 1\n").unwrap();
    let mut perms = std::fs::metadata(&configure).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&configure, perms).unwrap();
    make_stemmer_bundle(&settings.filesdir);

    let recipe = hermetic_sphinx();
    let request = InstallRequest {
        variant: SourceVariant::Stable,
        options: OptionSet::new(),
        build_dir: Some(build),
        pretend: false,
    };

    let err = install(&recipe, &request, &settings, &FixedOracle::new(false), None).unwrap_err();
    match err {
        RecipeError::Build(failure) => {
            assert!(failure.output.contains("checking for re2... no"));
        }
        other => panic!("expected build failure, got {:?}", other),
    }
}
