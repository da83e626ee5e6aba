//! Debug table regeneration.
//!
//! The debug table file contains exactly one block of the form
//!
//! ```text
//! const std::unordered_map<Opcode, std::string> OPCODE_NAMES = {
//!     {Opcode::LOAD, "LOAD"},
//!     ...
//! };
//! ```
//!
//! The block is rebuilt from the symbol table. Everything outside it is left alone.

use crate::fsutil::{self, StageOutcome, WriteMode};
use crate::section::{Delimiters, Section, SectionError, splice};
use crate::style::SymbolStyle;
use crate::table::SymbolTable;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DebugTableError {
    #[error("debug table block not found in {}: {source}", .path.display())]
    BlockNotFound {
        path: PathBuf,
        #[source]
        source: SectionError,
    },

    #[error("failed to update {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counts reported by one regeneration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugTableStats {
    /// Entries written to the new block
    pub entries: usize,
    /// Non-blank lines in the block that was replaced
    pub previous_lines: usize,
}

/// Output of [`regenerate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regenerated {
    pub text: String,
    pub stats: DebugTableStats,
}

/// Render the full block, delimiters included, in index order, ending each
/// line but the last with `newline`.
pub fn render_block(table: &SymbolTable, style: &SymbolStyle, newline: &str) -> String {
    let mut block = String::new();
    block.push_str(&style.table_prologue);
    block.push_str(newline);
    for entry in table.iter() {
        block.push_str(&style.debug_entry(entry.name));
        block.push_str(newline);
    }
    block.push_str(&style.table_epilogue);
    block
}

/// Replace the debug table block in `text`.
pub fn regenerate(
    text: &str,
    table: &SymbolTable,
    style: &SymbolStyle,
) -> Result<Regenerated, SectionError> {
    let delimiters = Delimiters::new(&style.table_prologue, &style.table_epilogue);
    let section = Section::locate(text, &delimiters)?;

    let previous_lines = section
        .body(text)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();

    let block = render_block(table, style, line_ending(&text[section.span.clone()], text));
    Ok(Regenerated {
        text: splice(text, &section, &block),
        stats: DebugTableStats {
            entries: table.len(),
            previous_lines,
        },
    })
}

/// The line ending used by `block`, falling back to the rest of `text`.
fn line_ending(block: &str, text: &str) -> &'static str {
    let crlf = if block.contains('\n') {
        block.contains("\r\n")
    } else {
        text.contains("\r\n")
    };
    if crlf { "\r\n" } else { "\n" }
}

/// Regenerate the debug table block in the file at `path`.
///
/// A missing file is skipped with a warning.
pub fn regenerate_file(
    path: &Path,
    table: &SymbolTable,
    style: &SymbolStyle,
    mode: WriteMode,
) -> Result<StageOutcome<DebugTableStats>, DebugTableError> {
    let io_err = |source: std::io::Error| DebugTableError::Io {
        path: path.to_path_buf(),
        source,
    };

    let Some(original) = fsutil::read_optional(path).map_err(io_err)? else {
        warn!("{} does not exist, skipping debug table", path.display());
        return Ok(StageOutcome::Skipped {
            path: path.to_path_buf(),
        });
    };

    let Regenerated { text, stats } =
        regenerate(&original, table, style).map_err(|source| DebugTableError::BlockNotFound {
            path: path.to_path_buf(),
            source,
        })?;
    let changed = fsutil::store(path, &original, &text, mode).map_err(io_err)?;

    info!(
        "{}: debug table regenerated with {} entries",
        path.display(),
        stats.entries
    );

    Ok(StageOutcome::Done { stats, changed })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROLOGUE: &str = "const std::unordered_map<Opcode, std::string> OPCODE_NAMES = {";

    fn table() -> SymbolTable {
        SymbolTable::from_names(vec!["LOAD".into(), "STORE".into(), "JUMP".into()])
    }

    #[test]
    fn test_render_block() {
        let block = render_block(&table(), &SymbolStyle::default(), "\n");
        assert_eq!(
            block,
            format!(
                "{PROLOGUE}\n    {{Opcode::LOAD, \"LOAD\"}},\n    {{Opcode::STORE, \"STORE\"}},\n    {{Opcode::JUMP, \"JUMP\"}},\n}};"
            )
        );
    }

    #[test]
    fn test_regenerate_replaces_stale_block() {
        let text = format!(
            "#include \"opcodes.hh\"\n\n{PROLOGUE}\n    {{Opcode::JUMP, \"JUMP\"}},\n    {{Opcode::OLD, \"OLD\"}},\n}};\n\nint main() {{ return 0; }}\n"
        );
        let result = regenerate(&text, &table(), &SymbolStyle::default()).unwrap();

        let expected = format!(
            "#include \"opcodes.hh\"\n\n{}\n\nint main() {{ return 0; }}\n",
            render_block(&table(), &SymbolStyle::default(), "\n")
        );
        assert_eq!(result.text, expected);
        assert_eq!(
            result.stats,
            DebugTableStats {
                entries: 3,
                previous_lines: 2
            }
        );
    }

    #[test]
    fn test_regenerate_is_stable() {
        let text = format!("// top\n{PROLOGUE}\n}};\n// bottom\n");
        let once = regenerate(&text, &table(), &SymbolStyle::default()).unwrap();
        let twice = regenerate(&once.text, &table(), &SymbolStyle::default()).unwrap();
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn test_regenerate_keeps_crlf_line_endings() {
        let table = SymbolTable::from_names(vec!["A".into(), "B".into()]);
        let text = format!("x\r\n{PROLOGUE}\r\n    {{Opcode::A, \"A\"}},\r\n}};\r\ny\r\n");
        let result = regenerate(&text, &table, &SymbolStyle::default()).unwrap();

        assert_eq!(
            result.text,
            format!(
                "x\r\n{PROLOGUE}\r\n    {{Opcode::A, \"A\"}},\r\n    {{Opcode::B, \"B\"}},\r\n}};\r\ny\r\n"
            )
        );
        assert!(!result.text.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_missing_block() {
        let err = regenerate("int x;\n", &table(), &SymbolStyle::default()).unwrap_err();
        assert!(matches!(err, SectionError::Missing { .. }));
    }

    #[test]
    fn test_duplicate_block() {
        let text = format!("{PROLOGUE}\n}};\n{PROLOGUE}\n}};\n");
        let err = regenerate(&text, &table(), &SymbolStyle::default()).unwrap_err();
        assert!(matches!(err, SectionError::Ambiguous { count: 2, .. }));
    }

    #[test]
    fn test_block_not_found_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_parser.cpp");
        std::fs::write(&path, "int main() {}\n").unwrap();

        let err = regenerate_file(&path, &table(), &SymbolStyle::default(), WriteMode::Write)
            .unwrap_err();
        assert!(matches!(err, DebugTableError::BlockNotFound { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "int main() {}\n");
    }
}
