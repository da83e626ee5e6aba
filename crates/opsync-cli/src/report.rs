//! Human-readable run summaries.

use std::error::Error;
use std::fmt::Write as FmtWrite;

use rhizome_opsync_core::{StageOutcome, SymbolTable, SyncReport, WriteMode};

/// Render the summary printed after `opsync sync`.
pub fn render(report: &SyncReport, mode: WriteMode) -> String {
    let mut out = String::new();
    let verb = |changed: bool| match (changed, mode) {
        (false, _) => "Unchanged",
        (true, WriteMode::Write) => "Updated",
        (true, WriteMode::Check) => "Would update",
    };

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Found {} opcodes", report.opcode_count());

    match &report.rewrite {
        Ok(StageOutcome::Done { stats, changed }) => {
            let _ = writeln!(
                out,
                "{} generated file: {} placeholders ({} symbolic, {} fallback)",
                verb(*changed),
                stats.found,
                stats.symbolic,
                stats.fallback
            );
        }
        Ok(StageOutcome::Skipped { path }) => {
            let _ = writeln!(out, "Skipped {} (file does not exist)", path.display());
        }
        Err(err) => {
            let _ = writeln!(out, "Rewrite failed: {}", error_chain(err));
        }
    }

    match &report.debug_table {
        Ok(StageOutcome::Done { stats, changed }) => {
            let _ = writeln!(
                out,
                "{} debug table: {} entries (replaced {} previous lines)",
                verb(*changed),
                stats.entries,
                stats.previous_lines
            );
        }
        Ok(StageOutcome::Skipped { path }) => {
            let _ = writeln!(out, "Skipped {} (file does not exist)", path.display());
        }
        Err(err) => {
            let _ = writeln!(out, "Debug table failed: {}", error_chain(err));
        }
    }

    out
}

/// Resolve `key` as an index or a name.
pub fn lookup(table: &SymbolTable, key: &str) -> Option<String> {
    match key.parse::<usize>() {
        Ok(index) => table.name(index).map(|name| format!("{} {}", index, name)),
        Err(_) => table
            .index_of(key)
            .map(|index| format!("{} {}", index, key)),
    }
}

/// Format an error followed by its sources.
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
