//! Taleweave-context - context assembly for generation requests
//!
//! This crate turns a set of context entries (the story, the pinned
//! Memory and Author's Note blocks, and keyword-activated lorebook
//! entries) into a single token-budgeted input string plus a structural
//! report of what was inserted where.
//!
//! The pipeline:
//!
//! 1. Placeholder variables (`${name}`) are discovered and substituted.
//! 2. The lorebook matcher scans candidate texts for key regexes and
//!    activates matching entries.
//! 3. The assembler tokenizes every entry, charges reservations against
//!    the budget, walks entries in priority order, trims each to its
//!    allowance, and splices its lines into the output at the entry's
//!    insertion position.

pub mod error;
pub use error::{ContextError, Result};

pub mod config;
pub use config::{ContextConfig, MaxTrimType};

pub mod entry;
pub use entry::{ContextEntries, ContextEntry, MatchIndexes, MatchSpans};

pub mod placeholders;
pub use placeholders::{Placeholder, Placeholders};

pub mod lorebook;
pub use lorebook::{Candidate, Lorebook, LorebookCategory, LorebookEntry, LorebookSettings};

pub mod report;
pub use report::{ContextReport, ReportEntry};

pub mod assembler;
pub use assembler::{assemble, AssemblerOptions};
