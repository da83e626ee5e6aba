//! End-to-end sync run.
//!
//! Extraction failures abort the run before anything is written. The two
//! mutation stages then run independently; each stage's result is kept in the
//! [`SyncReport`] and the caller decides what a failure means.

use crate::config::SyncConfig;
use crate::debug_table::{self, DebugTableError, DebugTableStats};
use crate::enumeration::{Enumeration, ExtractionError};
use crate::fsutil::{StageOutcome, WriteMode};
use crate::rewrite::{self, RewriteError, RewriteStats};
use crate::table::SymbolTable;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info};

/// Errors that stop a run before any target file is touched.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read enumeration source {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid enumeration in {}: {source}", .path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: ExtractionError,
    },
}

/// Outcome of a full run.
#[derive(Debug)]
pub struct SyncReport {
    pub table: SymbolTable,
    pub rewrite: Result<StageOutcome<RewriteStats>, RewriteError>,
    pub debug_table: Result<StageOutcome<DebugTableStats>, DebugTableError>,
}

impl SyncReport {
    /// Number of opcodes discovered.
    pub fn opcode_count(&self) -> usize {
        self.table.len()
    }

    /// True if no stage failed. Skipped stages count as success.
    pub fn is_success(&self) -> bool {
        self.rewrite.is_ok() && self.debug_table.is_ok()
    }

    /// True if any target changed (or would change, in check mode).
    pub fn has_drift(&self) -> bool {
        matches!(&self.rewrite, Ok(outcome) if outcome.changed())
            || matches!(&self.debug_table, Ok(outcome) if outcome.changed())
    }
}

/// Read and extract the canonical enumeration.
pub fn load_table(config: &SyncConfig) -> Result<SymbolTable, SyncError> {
    let path = &config.enum_source;
    let source = fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.clone(),
        source,
    })?;

    let enumeration =
        Enumeration::extract(&source, &config.style.enum_name).map_err(|source| {
            SyncError::Extraction {
                path: path.clone(),
                source,
            }
        })?;

    info!("Found {} opcodes in {}", enumeration.len(), path.display());
    Ok(SymbolTable::from(enumeration))
}

/// Run the whole pipeline.
pub fn run(config: &SyncConfig, mode: WriteMode) -> Result<SyncReport, SyncError> {
    let table = load_table(config)?;

    let rewrite = rewrite::rewrite_file(&config.generated, &table, &config.style, mode);
    if let Err(err) = &rewrite {
        error!("{}", err);
    }

    let debug_table =
        debug_table::regenerate_file(&config.debug_table, &table, &config.style, mode);
    if let Err(err) = &debug_table {
        error!("{}", err);
    }

    Ok(SyncReport {
        table,
        rewrite,
        debug_table,
    })
}
