//! Opcode symbol synchronization.
//!
//! This crate keeps three artifacts consistent with one another:
//!
//! - The canonical `enum class Opcode { ... };` declaration, whose member order
//!   defines each opcode's index.
//! - A generated implementation file that refers to opcodes by raw index
//!   (`Opcode::OP_12`), which is rewritten to symbolic form (`Opcode::CALL`).
//! - A hand-maintained debug table whose `OPCODE_NAMES` block is regenerated
//!   from the enumeration.
//!
//! # Pipeline
//!
//! ```text
//! enum source --extract--> names --build--> SymbolTable --+--> rewrite generated file
//!                                                         +--> regenerate debug table
//! ```
//!
//! Every text transformation is a pure function over strings; file I/O is a
//! thin layer on top (see [`pipeline::run`]).

pub mod config;
pub mod debug_table;
pub mod enumeration;
mod fsutil;
pub mod pipeline;
pub mod rewrite;
pub mod section;
pub mod style;
pub mod table;

pub use config::{ConfigError, SyncConfig};
pub use debug_table::{DebugTableError, DebugTableStats};
pub use enumeration::{Enumeration, ExtractionError, Member};
pub use fsutil::{StageOutcome, WriteMode};
pub use pipeline::{SyncError, SyncReport, run};
pub use rewrite::{RewriteError, RewriteStats};
pub use section::{Delimiters, Section, SectionError};
pub use style::SymbolStyle;
pub use table::SymbolTable;
