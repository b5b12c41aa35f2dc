use std::cmp::Ordering;
use std::fmt;

/// Is `sym` the empty string, i.e. the ε symbol?
pub fn is_epsilon(sym: &str) -> bool {
    sym.is_empty()
}

/// Grammar convention: non-terminals start with an upper-case letter or
/// underscore/hyphen run beginning upper-case; `S` is always a non-terminal.
pub fn is_non_terminal_name(sym: &str) -> bool {
    sym.chars().next().map_or(false, |c| c.is_ascii_uppercase())
}

/// Terminals start with a lower-case letter.
pub fn is_terminal_name(sym: &str) -> bool {
    sym.chars().next().map_or(false, |c| c.is_ascii_lowercase())
}

/// Valid head / non-terminal name: `[A-Z_-]+`, optionally followed by one or
/// more trailing `'`s (the augmented-start-symbol convention, e.g. `S'`).
pub fn is_valid_head_name(name: &str) -> bool {
    let base = name.trim_end_matches('\'');
    !base.is_empty() && base.chars().all(|c| c.is_ascii_uppercase() || c == '_' || c == '-')
}

/// Valid terminal name: `[a-z_-]+`.
pub fn is_valid_terminal_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_lowercase() || c == '_' || c == '-')
}

/// Valid non-ε production symbol: `[A-Za-z_-]+`.
pub fn is_valid_symbol(sym: &str) -> bool {
    !sym.is_empty() && sym.chars().all(|c| c.is_ascii_alphabetic() || c == '_' || c == '-')
}

/// Identified by an opaque, case-insensitively-compared ID, plus a
/// human-readable label and a Pratt left-binding-power.
#[derive(Debug, Clone)]
pub struct TokenClass {
    id: String,
    label: String,
    lbp: u32,
}

impl TokenClass {
    pub fn new(id: impl Into<String>, label: impl Into<String>, lbp: u32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            lbp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn lbp(&self) -> u32 {
        self.lbp
    }

    /// The sentinel class marking end-of-text.
    pub fn end_marker() -> Self {
        Self::new("$", "end of input", 0)
    }

    pub fn is_end_marker(&self) -> bool {
        self.id.eq_ignore_ascii_case("$")
    }

    /// The sentinel used to mean "no class mapped here yet"; never a valid
    /// target for `add_term`.
    pub fn undefined() -> Self {
        Self::new("undefined", "undefined", 0)
    }

    pub fn is_undefined(&self) -> bool {
        self.id.eq_ignore_ascii_case("undefined")
    }
}

impl PartialEq for TokenClass {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
    }
}

impl Eq for TokenClass {}

impl PartialOrd for TokenClass {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TokenClass {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.to_lowercase().cmp(&other.id.to_lowercase())
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_class_equality_is_case_insensitive_on_id() {
        let a = TokenClass::new("Plus", "+", 10);
        let b = TokenClass::new("plus", "the plus sign", 10);
        assert_eq!(a, b);
    }

    #[test]
    fn name_classifiers() {
        assert!(is_non_terminal_name("EXPR"));
        assert!(is_non_terminal_name("S"));
        assert!(is_terminal_name("id"));
        assert!(!is_terminal_name("EXPR"));
        assert!(is_epsilon(""));
        assert!(is_valid_symbol("id_list"));
        assert!(!is_valid_symbol(""));
    }
}
