//! Rewriting raw-index opcode references to symbolic form.
//!
//! A placeholder looks like `Opcode::OP_12`. Each one is replaced with
//! `Opcode::<name>` when index 12 is known, or with `static_cast<Opcode>(12)`
//! otherwise. Already-symbolic references never match, so re-running is a no-op.

use crate::fsutil::{self, StageOutcome, WriteMode};
use crate::style::{SymbolStyle, is_ident_char};
use crate::table::SymbolTable;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to rewrite {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counts reported by one rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Placeholders found
    pub found: usize,
    /// Placeholders replaced with a symbolic reference
    pub symbolic: usize,
    /// Placeholders replaced with a fallback cast
    pub fallback: usize,
}

/// Output of [`rewrite_references`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub stats: RewriteStats,
}

/// Replace every placeholder in `text` in a single left-to-right pass.
pub fn rewrite_references(text: &str, table: &SymbolTable, style: &SymbolStyle) -> Rewrite {
    let head = style.placeholder_head();
    let mut output = String::with_capacity(text.len());
    let mut stats = RewriteStats::default();
    let mut cursor = 0;

    for (start, _) in text.match_indices(head.as_str()) {
        let digits_start = start + head.len();
        let digits_len = text[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits_len == 0 {
            continue;
        }
        let end = digits_start + digits_len;

        // `MyOpcode::OP_1` and `Opcode::OP_1x` are different identifiers.
        let glued_before = text[..start].chars().next_back().is_some_and(is_ident_char);
        let glued_after = text[end..].starts_with(is_ident_char);
        if glued_before || glued_after {
            continue;
        }

        // An enumerator spelled like a placeholder is already symbolic.
        let ident = &text[start + style.enum_name.len() + 2..end];
        if table.index_of(ident).is_some() {
            continue;
        }

        let numeral = &text[digits_start..end];
        output.push_str(&text[cursor..start]);

        match numeral.parse::<usize>().ok().and_then(|index| table.name(index)) {
            Some(name) => {
                output.push_str(&style.symbolic(name));
                stats.symbolic += 1;
            }
            None => {
                debug!("no opcode at index {}, emitting fallback cast", numeral);
                output.push_str(&style.fallback_cast(numeral));
                stats.fallback += 1;
            }
        }

        stats.found += 1;
        cursor = end;
    }

    output.push_str(&text[cursor..]);
    Rewrite { text: output, stats }
}

/// Rewrite the placeholders in the file at `path`.
///
/// A missing file is skipped with a warning.
pub fn rewrite_file(
    path: &Path,
    table: &SymbolTable,
    style: &SymbolStyle,
    mode: WriteMode,
) -> Result<StageOutcome<RewriteStats>, RewriteError> {
    let io_err = |source: std::io::Error| RewriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let Some(original) = fsutil::read_optional(path).map_err(io_err)? else {
        warn!("{} does not exist, skipping reference rewrite", path.display());
        return Ok(StageOutcome::Skipped {
            path: path.to_path_buf(),
        });
    };

    let Rewrite { text, stats } = rewrite_references(&original, table, style);
    let changed = fsutil::store(path, &original, &text, mode).map_err(io_err)?;

    info!(
        "{}: {} placeholders, {} symbolic, {} fallback",
        path.display(),
        stats.found,
        stats.symbolic,
        stats.fallback
    );

    Ok(StageOutcome::Done { stats, changed })
}
