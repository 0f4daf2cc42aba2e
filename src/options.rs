// options.rs -- User-selected build option handling

use std::collections::HashSet;

use crate::exception::RecipeError;
use crate::recipe::Recipe;

/// The set of build options the user selected for this invocation.
/// Options not present are unselected; there is no tri-state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    selected: HashSet<String>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an OptionSet from CLI flags, rejecting names the recipe does
    /// not declare.
    pub fn from_flags<I, S>(recipe: &Recipe, flags: I) -> Result<Self, RecipeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = OptionSet::new();
        for flag in flags {
            let name = flag.as_ref();
            if !recipe.has_option(name) {
                return Err(RecipeError::UnknownOption(name.to_string()));
            }
            set.select(name);
        }
        Ok(set)
    }

    pub fn select(&mut self, name: &str) {
        self.selected.insert(name.to_string());
    }

    pub fn selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
