// recipe.rs -- Declarative description of a buildable package
//
// A recipe is plain data: where the source lives, which optional
// capabilities exist, what the package depends on, which toolchains are
// known to break it, and how to configure and install it.  All branching
// logic lives in the engine modules that consume these tables.

/// How a selected option translates into configure arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRule {
    /// Emit the flag when the option is selected, nothing otherwise.
    WhenSelected(&'static str),
    /// Emit the flag only when the option is selected *and* the dependency
    /// of the same name is present on the host.
    WhenSelectedAndPresent(&'static str),
    /// Emit `--with-<name>` when selected, `--without-<name>` otherwise.
    /// The explicit without keeps configure from auto-detecting a system
    /// copy that was never requested.
    WithWithout,
}

/// A user-selectable build capability toggle.
#[derive(Debug, Clone)]
pub struct OptionDecl {
    pub name: &'static str,
    pub description: &'static str,
    pub flag: FlagRule,
}

/// When a declared dependency is actually required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Required exactly when the named option is selected.
    OptionSelected(&'static str),
    /// Never required; used opportunistically when present.
    Optional,
}

#[derive(Debug, Clone)]
pub struct DependencyDecl {
    pub name: &'static str,
    pub requirement: Requirement,
}

impl DependencyDecl {
    /// Whether this dependency is required under the given selection.
    pub fn required(&self, options: &crate::options::OptionSet) -> bool {
        match self.requirement {
            Requirement::OptionSelected(opt) => options.selected(opt),
            Requirement::Optional => false,
        }
    }
}

/// Where a source variant comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// A downloadable archive (http://, https:// or file://).
    Archive(&'static str),
    /// A version-control checkout (subversion trunk, for head builds).
    Vcs(&'static str),
}

/// The three predefined source variants.  They differ only in retrieval
/// locator; configuration logic never branches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceVariant {
    #[default]
    Stable,
    Devel,
    Head,
}

/// A known-broken compiler family + build number combination.
#[derive(Debug, Clone)]
pub struct ToolchainFailureRule {
    pub family: &'static str,
    /// Build number at which the regression appears.  Matches any host
    /// build greater than or equal to this.
    pub build: u32,
    /// Recorded failure signature, surfaced verbatim.
    pub cause: &'static str,
}

/// A literal find/replace correction applied before configure runs.
#[derive(Debug, Clone)]
pub struct PatchRule {
    /// Target file, relative to the build tree root.
    pub file: &'static str,
    pub find: &'static str,
    pub replace: &'static str,
}

/// A bundled auxiliary archive staged into the build tree.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: &'static str,
    /// Archive file name, colocated with the recipe (files directory).
    pub archive: &'static str,
    /// Subdirectory of the build tree it is staged into.
    pub subdir: &'static str,
}

#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: &'static str,
    pub homepage: &'static str,
    pub stable: SourceLocator,
    pub devel: SourceLocator,
    pub head: SourceLocator,
    pub options: Vec<OptionDecl>,
    pub dependencies: Vec<DependencyDecl>,
    pub resource: Option<Resource>,
    pub fails_with: Vec<ToolchainFailureRule>,
    pub patches: Vec<PatchRule>,
    /// Base configure arguments, emitted first and unconditionally.
    /// `{prefix}` and `{statedir}` placeholders are expanded at build time.
    pub base_configure_args: Vec<&'static str>,
    /// Program run for the configure step, relative to the build tree.
    pub configure_program: &'static str,
    /// Full argv of the compile-and-install step.
    pub install_invocation: Vec<&'static str>,
    /// Post-install guidance, printed after a successful build.
    pub caveats: &'static str,
}

impl Recipe {
    pub fn locator(&self, variant: SourceVariant) -> &SourceLocator {
        match variant {
            SourceVariant::Stable => &self.stable,
            SourceVariant::Devel => &self.devel,
            SourceVariant::Head => &self.head,
        }
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name == name)
    }

    pub fn find_dependency(&self, name: &str) -> Option<&DependencyDecl> {
        self.dependencies.iter().find(|d| d.name == name)
    }
}
