// recipes.rs -- Built-in recipe catalog

use crate::recipe::{
    DependencyDecl, FlagRule, OptionDecl, PatchRule, Recipe, Requirement, Resource,
    SourceLocator, ToolchainFailureRule,
};

/// Look up a recipe by name.
pub fn find(name: &str) -> Option<Recipe> {
    match name {
        "sphinx" => Some(sphinx()),
        _ => None,
    }
}

/// Sphinx 2.1.9, pinned against a bundled libstemmer snapshot.
///
/// The bundled stemmer is shipped next to the recipe so the two stay in
/// lockstep; newer upstream libstemmer releases break this Sphinx release.
pub fn sphinx() -> Recipe {
    Recipe {
        name: "sphinx",
        homepage: "http://www.sphinxsearch.com",
        stable: SourceLocator::Archive("http://sphinxsearch.com/files/sphinx-2.1.9-release.tar.gz"),
        devel: SourceLocator::Archive("http://sphinxsearch.com/files/sphinx-2.2.3-beta.tar.gz"),
        head: SourceLocator::Vcs("http://sphinxsearch.googlecode.com/svn/trunk/"),
        // Declared in configure-argument emission order.
        options: vec![
            OptionDecl {
                name: "id64",
                description: "Force compiling with 64-bit ID support",
                flag: FlagRule::WhenSelected("--enable-id64"),
            },
            OptionDecl {
                name: "re2",
                description: "Compile against re2 for regexp field filtering",
                flag: FlagRule::WhenSelectedAndPresent("--with-re2"),
            },
            OptionDecl {
                name: "mysql",
                description: "Force compiling against MySQL",
                flag: FlagRule::WithWithout,
            },
            OptionDecl {
                name: "pgsql",
                description: "Force compiling against PostgreSQL",
                flag: FlagRule::WithWithout,
            },
        ],
        dependencies: vec![
            DependencyDecl {
                name: "mysql",
                requirement: Requirement::OptionSelected("mysql"),
            },
            DependencyDecl {
                name: "postgresql",
                requirement: Requirement::OptionSelected("pgsql"),
            },
            DependencyDecl {
                name: "re2",
                requirement: Requirement::Optional,
            },
        ],
        resource: Some(Resource {
            name: "stemmer",
            archive: "libstemmer_c.tgz",
            subdir: "libstemmer_c",
        }),
        fails_with: vec![
            ToolchainFailureRule {
                family: "llvm",
                build: 2334,
                cause: "ld: rel32 out of range in _GetPrivateProfileString from /usr/lib/libodbc.a(SQLGetPrivateProfileString.o)",
            },
            ToolchainFailureRule {
                family: "clang",
                build: 421,
                cause: "sphinxexpr.cpp:1802:11: error: use of undeclared identifier 'ExprEval'",
            },
        ],
        // libstemmer renamed the non-UTF8 Hungarian sources; the 2.1.9
        // release still references them under the old name.
        patches: vec![PatchRule {
            file: "libstemmer_c/Makefile.in",
            find: "stem_ISO_8859_1_hungarian",
            replace: "stem_ISO_8859_2_hungarian",
        }],
        base_configure_args: vec![
            "--prefix={prefix}",
            "--disable-dependency-tracking",
            "--localstatedir={statedir}",
            "--with-libstemmer",
        ],
        configure_program: "./configure",
        install_invocation: vec!["make", "install"],
        caveats: "\
Sphinx has been compiled with libstemmer support.

Sphinx depends on either MySQL or PostreSQL as a datasource.

You can install these with:
  mysql
    For MySQL server.

  mysql-connector-c
    For MySQL client libraries only.

  postgresql
    For PostgreSQL server.

We don't install these for you when you install this recipe, as
we don't know which datasource you intend to use.",
    }
}
