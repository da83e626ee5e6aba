//! Rendering conventions for opcode references.

use serde::{Deserialize, Serialize};

/// How opcodes are spelled in the files being synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolStyle {
    /// Name of the enumeration (e.g., `Opcode`)
    pub enum_name: String,
    /// Prefix of raw-index placeholders (`Opcode::OP_12`)
    pub placeholder_prefix: String,
    /// Line that opens the debug table block
    pub table_prologue: String,
    /// Delimiter that closes the debug table block
    pub table_epilogue: String,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            enum_name: "Opcode".to_string(),
            placeholder_prefix: "OP_".to_string(),
            table_prologue: "const std::unordered_map<Opcode, std::string> OPCODE_NAMES = {"
                .to_string(),
            table_epilogue: "};".to_string(),
        }
    }
}

impl SymbolStyle {
    /// `Opcode::NAME`
    pub fn symbolic(&self, name: &str) -> String {
        format!("{}::{}", self.enum_name, name)
    }

    /// `static_cast<Opcode>(N)`, keeping the numeral exactly as written.
    pub fn fallback_cast(&self, numeral: &str) -> String {
        format!("static_cast<{}>({})", self.enum_name, numeral)
    }

    /// One debug table line: `    {Opcode::NAME, "NAME"},`
    pub fn debug_entry(&self, name: &str) -> String {
        format!("    {{{}, \"{}\"}},", self.symbolic(name), name)
    }

    /// Text that precedes the digits of a placeholder (`Opcode::OP_`).
    pub(crate) fn placeholder_head(&self) -> String {
        format!("{}::{}", self.enum_name, self.placeholder_prefix)
    }
}

/// Returns true if `c` can appear in a C++/Rust identifier.
pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns true if `s` is a valid identifier.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(is_ident_char),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rendering() {
        let style = SymbolStyle::default();
        assert_eq!(style.symbolic("STORE"), "Opcode::STORE");
        assert_eq!(style.fallback_cast("7"), "static_cast<Opcode>(7)");
        assert_eq!(style.debug_entry("LOAD"), "    {Opcode::LOAD, \"LOAD\"},");
        assert_eq!(style.placeholder_head(), "Opcode::OP_");
    }

    #[test]
    fn test_custom_enum_name() {
        let style = SymbolStyle {
            enum_name: "Op".to_string(),
            ..SymbolStyle::default()
        };
        assert_eq!(style.symbolic("ADD"), "Op::ADD");
        assert_eq!(style.fallback_cast("0042"), "static_cast<Op>(0042)");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("PUSH_INT"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1ADD"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("A-B"));
    }
}
