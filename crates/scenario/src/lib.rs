//! Taleweave-scenario - declarative scenario documents
//!
//! A scenario document describes a story prompt, two pinned context
//! blocks (Memory and Author's Note), a lorebook, placeholder
//! definitions, and generation settings. This crate parses the JSON
//! form, folds every optional field into realized defaults, wires the
//! placeholder table, and exposes the context-generation entry point.

pub mod error;
pub use error::{Result, ScenarioError};

pub mod document;
pub mod module;
pub use module::AiModule;

pub mod params;
pub use params::{banned_brackets, GenerateParams};

pub mod permutations;
pub use permutations::PermutationSpec;

pub mod scenario;
pub use scenario::{Scenario, ScenarioSettings};
