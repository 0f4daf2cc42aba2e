// formula-rs -- declarative build-recipe orchestrator
//
// Turns a package recipe (source locations, options, dependencies,
// known-broken toolchains, patches) into a configured, compiled and
// installed tree.

pub mod actions;
pub mod config;
pub mod configure;
pub mod deps;
pub mod exception;
pub mod execute;
pub mod fetch;
pub mod options;
pub mod output;
pub mod patch;
pub mod recipe;
pub mod recipes;
pub mod stage;
pub mod toolchain;
