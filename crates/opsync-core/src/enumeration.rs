//! Enumeration extraction.
//!
//! Parses the canonical `enum class Opcode { ... };` declaration into an ordered
//! list of members. Member order is the opcode numbering.
//!
//! # Member grammar
//!
//! After comments and blank lines are removed, each line holds one or more
//! comma-separated enumerators:
//!
//! ```text
//! enumerator := identifier [ '=' integer ]
//! integer    := decimal | '0x' hex | '0b' binary
//! ```
//!
//! An explicit value is only accepted when it equals the enumerator's position.

use crate::section::Section;
use crate::style::{is_ident_char, is_identifier};
use std::collections::HashMap;
use thiserror::Error;

const CLOSE: &str = "};";

/// Errors that can occur while extracting the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no `enum class {enum_name}` declaration block found")]
    NoDeclaration { enum_name: String },

    #[error(
        "`enum class {enum_name}` is declared {} times (lines {lines:?}), expected exactly one",
        .lines.len()
    )]
    Ambiguous { enum_name: String, lines: Vec<usize> },

    #[error("`enum class {enum_name}` opened on line {line} is never closed with `}};`")]
    Unterminated { enum_name: String, line: usize },

    #[error("`enum class {enum_name}` declares no members")]
    Empty { enum_name: String },

    #[error("line {line}: cannot parse enumerator `{text}`")]
    Malformed { line: usize, text: String },

    #[error("line {line}: `{name}` has explicit value {found} but is declared at position {expected}")]
    NonSequentialValue {
        line: usize,
        name: String,
        expected: usize,
        found: u64,
    },

    #[error("line {line}: duplicate symbol `{name}` (first declared on line {first_line})")]
    DuplicateSymbol {
        name: String,
        first_line: usize,
        line: usize,
    },
}

impl ExtractionError {
    /// Returns true for the duplicate-name failure.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ExtractionError::DuplicateSymbol { .. })
    }
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Enumerator name
    pub name: String,
    /// 1-based line in the source file
    pub line: usize,
    /// Explicit value, if one was written
    pub value: Option<u64>,
}

/// The ordered, duplicate-free members of the canonical enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    members: Vec<Member>,
}

impl Enumeration {
    /// Extract the `enum class <enum_name>` declaration from `source`.
    pub fn extract(source: &str, enum_name: &str) -> Result<Self, ExtractionError> {
        let section = locate_block(source, enum_name)?;
        let first_line = line_of(source, section.body.start);

        let mut members: Vec<Member> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut in_block_comment = false;

        for (offset, raw) in section.body(source).split('\n').enumerate() {
            let line = first_line + offset;
            let cleaned = strip_comments(raw, &mut in_block_comment);
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                continue;
            }

            let cleaned = cleaned.strip_suffix(',').unwrap_or(cleaned);
            for piece in cleaned.split(',') {
                let member = parse_member(piece.trim(), line)?;

                let expected = members.len();
                if let Some(found) = member.value.filter(|&v| v != expected as u64) {
                    return Err(ExtractionError::NonSequentialValue {
                        line,
                        name: member.name,
                        expected,
                        found,
                    });
                }

                if let Some(&first_line) = seen.get(&member.name) {
                    return Err(ExtractionError::DuplicateSymbol {
                        name: member.name,
                        first_line,
                        line,
                    });
                }

                seen.insert(member.name.clone(), line);
                members.push(member);
            }
        }

        if members.is_empty() {
            return Err(ExtractionError::Empty {
                enum_name: enum_name.to_string(),
            });
        }

        Ok(Self { members })
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Consume into the ordered name list.
    pub fn into_names(self) -> Vec<String> {
        self.members.into_iter().map(|m| m.name).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Find the one `enum class <name> [: type] {` that opens a definition.
///
/// Forward declarations (`enum class Opcode;`) and longer names sharing the
/// prefix (`enum class OpcodeKind`) are not candidates.
fn locate_block(source: &str, enum_name: &str) -> Result<Section, ExtractionError> {
    let marker = format!("enum class {}", enum_name);
    let mut candidates = Vec::new();

    for (start, _) in source.match_indices(&marker) {
        let rest = &source[start + marker.len()..];
        if rest.starts_with(is_ident_char) {
            continue;
        }

        let Some(stop) = rest.find(['{', ';']) else {
            continue;
        };
        let between = rest[..stop].trim();
        let header_ok = between.is_empty() || between.starts_with(':');
        if header_ok && rest[stop..].starts_with('{') {
            candidates.push((start, start + marker.len() + stop + 1));
        }
    }

    let (start, body_start) = match candidates.as_slice() {
        [] => {
            return Err(ExtractionError::NoDeclaration {
                enum_name: enum_name.to_string(),
            });
        }
        [only] => *only,
        _ => {
            return Err(ExtractionError::Ambiguous {
                enum_name: enum_name.to_string(),
                lines: candidates.iter().map(|(s, _)| line_of(source, *s)).collect(),
            });
        }
    };

    let close = find_close(source, body_start).ok_or_else(|| ExtractionError::Unterminated {
        enum_name: enum_name.to_string(),
        line: line_of(source, start),
    })?;

    Ok(Section {
        span: start..close + CLOSE.len(),
        body: body_start..close,
    })
}

/// Offset of the first `};` at or after `from` that is not inside a comment.
fn find_close(source: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while pos < source.len() {
        let rest = &source[pos..];
        if rest.starts_with(CLOSE) {
            return Some(pos);
        } else if rest.starts_with("//") {
            pos += rest.find('\n')?;
        } else if rest.starts_with("/*") {
            pos += rest[2..].find("*/")? + 4;
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

fn parse_member(text: &str, line: usize) -> Result<Member, ExtractionError> {
    let malformed = || ExtractionError::Malformed {
        line,
        text: text.to_string(),
    };

    let (name, value) = match text.split_once('=') {
        Some((name, literal)) => {
            let value = parse_integer(literal.trim()).ok_or_else(malformed)?;
            (name.trim(), Some(value))
        }
        None => (text, None),
    };

    if !is_identifier(name) {
        return Err(malformed());
    }

    Ok(Member {
        name: name.to_string(),
        line,
        value,
    })
}

fn parse_integer(literal: &str) -> Option<u64> {
    let lower = literal.to_ascii_lowercase();
    let digits = lower.trim_end_matches(['u', 'l']);
    if let Some(hex) = digits.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = digits.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else {
        digits.parse().ok()
    }
}

/// Remove `//` and `/* */` comments from one line.
///
/// `in_block` carries an unterminated `/*` over to the next line.
fn strip_comments(line: &str, in_block: &mut bool) -> String {
    let mut output = String::with_capacity(line.len());
    let mut rest = line;

    loop {
        if *in_block {
            match rest.find("*/") {
                Some(end) => {
                    rest = &rest[end + 2..];
                    *in_block = false;
                }
                None => return output,
            }
        }

        let line_comment = rest.find("//");
        let block_comment = rest.find("/*");
        match (line_comment, block_comment) {
            (Some(l), Some(b)) if b < l => {
                output.push_str(&rest[..b]);
                rest = &rest[b + 2..];
                *in_block = true;
            }
            (None, Some(b)) => {
                output.push_str(&rest[..b]);
                rest = &rest[b + 2..];
                *in_block = true;
            }
            (Some(l), _) => {
                output.push_str(&rest[..l]);
                return output;
            }
            (None, None) => {
                output.push_str(rest);
                return output;
            }
        }
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(source: &str) -> Vec<String> {
        Enumeration::extract(source, "Opcode").unwrap().into_names()
    }

    #[test]
    fn test_extract_in_declaration_order() {
        let source = "enum class Opcode {\n    LOAD,\n    STORE,\n    JUMP\n};\n";
        assert_eq!(names(source), vec!["LOAD", "STORE", "JUMP"]);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let source = r#"
#pragma once
// Bytecode operation codes
enum class Opcode {
    // Stack operations
    PUSH_INT,           // Push integer onto stack

    /* a block
       comment spanning lines */
    POP, /* inline */ DUP,
};
"#;
        assert_eq!(names(source), vec!["PUSH_INT", "POP", "DUP"]);
    }

    #[test]
    fn test_member_lines_are_file_relative() {
        let source = "// header\n\nenum class Opcode {\n    A,\n\n    B,\n};\n";
        let enumeration = Enumeration::extract(source, "Opcode").unwrap();
        let lines: Vec<usize> = enumeration.members().iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![4, 6]);
    }

    #[test]
    fn test_closing_delimiter_inside_comment_is_ignored() {
        let source = "enum class Opcode {\n    LOAD,  // was `};` before\n    /* }; */ STORE,\n    JUMP,\n};\n";
        assert_eq!(names(source), vec!["LOAD", "STORE", "JUMP"]);
    }

    #[test]
    fn test_unterminated_when_only_commented_close() {
        let source = "enum class Opcode {\n    LOAD, // };\n";
        let err = Enumeration::extract(source, "Opcode").unwrap_err();
        assert!(matches!(err, ExtractionError::Unterminated { line: 1, .. }));
    }

    #[test]
    fn test_underlying_type_and_brace_on_next_line() {
        let source = "enum class Opcode : uint8_t\n{\n    NOP,\n    HALT,\n};";
        assert_eq!(names(source), vec!["NOP", "HALT"]);
    }

    #[test]
    fn test_forward_declaration_is_not_a_candidate() {
        let source = "enum class Opcode;\nenum class OpcodeKind { X };\nenum class Opcode { A };\n";
        assert_eq!(names(source), vec!["A"]);
    }

    #[test]
    fn test_missing_declaration() {
        let err = Enumeration::extract("int main() {}", "Opcode").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NoDeclaration {
                enum_name: "Opcode".to_string()
            }
        );
    }

    #[test]
    fn test_ambiguous_declaration() {
        let source = "enum class Opcode { A };\n#else\nenum class Opcode { B };\n";
        let err = Enumeration::extract(source, "Opcode").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::Ambiguous {
                enum_name: "Opcode".to_string(),
                lines: vec![1, 3]
            }
        );
    }

    #[test]
    fn test_unterminated_declaration() {
        let err = Enumeration::extract("\nenum class Opcode {\n A,\n", "Opcode").unwrap_err();
        assert!(matches!(err, ExtractionError::Unterminated { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_symbol() {
        let source = "enum class Opcode {\n    ADD,\n    SUB,\n    ADD,\n};";
        let err = Enumeration::extract(source, "Opcode").unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(
            err,
            ExtractionError::DuplicateSymbol {
                name: "ADD".to_string(),
                first_line: 2,
                line: 4
            }
        );
    }

    #[test]
    fn test_malformed_member() {
        let source = "enum class Opcode {\n    ADD SUB,\n};";
        let err = Enumeration::extract(source, "Opcode").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::Malformed {
                line: 2,
                text: "ADD SUB".to_string()
            }
        );
    }

    #[test]
    fn test_explicit_values_must_match_position() {
        let ok = "enum class Opcode {\n    A = 0,\n    B,\n    C = 0x2,\n};";
        assert_eq!(names(ok), vec!["A", "B", "C"]);

        let bad = "enum class Opcode {\n    A,\n    B = 5,\n};";
        let err = Enumeration::extract(bad, "Opcode").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NonSequentialValue {
                line: 3,
                name: "B".to_string(),
                expected: 1,
                found: 5
            }
        );
    }

    #[test]
    fn test_empty_enumeration() {
        let err = Enumeration::extract("enum class Opcode {\n  // none\n};", "Opcode").unwrap_err();
        assert!(matches!(err, ExtractionError::Empty { .. }));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer("0x1F"), Some(31));
        assert_eq!(parse_integer("0b101"), Some(5));
        assert_eq!(parse_integer("3u"), Some(3));
        assert_eq!(parse_integer("X"), None);
    }
}
