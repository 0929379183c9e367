//! SQL identifier sanitizer for the configurable outbox table name.
//!
//! Every value in the insert statement is a bound parameter; the table name
//! is the one piece that must be spliced into the SQL text. It is accepted
//! only if it survives, in order:
//!
//! 1. length bounds (1..=128 characters, after trimming)
//! 2. a scan for dangerous character sequences
//! 3. a keyword denylist (exact match or substring, case-insensitive)
//! 4. the grammar `letter (letter|digit|_)*` with optional `.`-separated segments
//! 5. a ban on system catalogs (`information_schema`, `pg_*`, `mysql.*`)
//!
//! An optional allow-list narrows acceptance further to operator-approved names.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Upper bound on identifier length, in characters.
pub const MAX_IDENTIFIER_LEN: usize = 128;

static IDENTIFIER_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*(\.[a-zA-Z][a-zA-Z0-9_]*)*$")
        .expect("identifier grammar is valid")
});

const DANGEROUS_SEQUENCES: &[&str] = &[
    "'", "\"", ";", "--", "/*", "*/", "xp_", "sp_", "fn_", "0x", "0b", "\\", "`", "=", "<", ">",
    "!", "&", "|",
];

const DENIED_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "create", "alter", "truncate", "union",
    "exec", "execute", "script", "javascript", "vbscript", "expression", "declare", "begin",
    "end", "if", "while", "for", "loop", "goto", "waitfor", "delay", "sleep", "benchmark",
    "load_file", "into", "outfile", "dumpfile", "information_schema", "sys", "master", "xp_",
    "sp_", "fn_",
];

const INJECTION_PATTERNS: &[&str] = &[
    "union select", "union all select", "union distinct select", "'; drop table",
    "'; delete from", "'; truncate table", "'; insert into", "'; update ", "'; alter table",
    "exec(", "execute(", "sp_", "xp_", "fn_", "waitfor delay", "benchmark(", "sleep(",
    "load_file(", "into outfile", "into dumpfile", "information_schema", "sys.tables",
    "sys.columns", "0x", "0b", "\\x", "\\u", "\\n", "\\r", "\\t", "<!--", "-->", "<script",
    "</script>", "javascript:", "vbscript:", "expression(",
];

/// Why an identifier was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("identifier cannot be empty")]
    Empty,

    #[error("identifier too long ({length} characters, max 128)")]
    TooLong { length: usize },

    #[error("identifier contains dangerous sequence '{sequence}'")]
    DangerousSequence { sequence: &'static str },

    #[error("identifier is a reserved SQL keyword: {identifier}")]
    ReservedKeyword { identifier: String },

    #[error("identifier contains SQL keyword '{keyword}': {identifier}")]
    ContainsKeyword {
        keyword: &'static str,
        identifier: String,
    },

    #[error("invalid identifier format: {identifier} (must start with a letter and contain only letters, digits, underscores and single dots between segments)")]
    InvalidFormat { identifier: String },

    #[error("identifier references a system catalog: {identifier}")]
    SystemCatalog { identifier: String },

    #[error("identifier is not in the allowed table list: {identifier}")]
    NotAllowed { identifier: String },
}

/// A table name proven safe to splice into SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// Sanitizes `input`, returning the trimmed original-case name.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let identifier = input.trim();
        validate_sql_identifier(identifier)?;

        let lower = identifier.to_lowercase();
        if lower.contains("information_schema") || lower.contains("pg_") || lower.contains("mysql.") {
            return Err(IdentifierError::SystemCatalog {
                identifier: identifier.to_string(),
            });
        }

        Ok(Self(identifier.to_string()))
    }

    /// Sanitizes `input` and additionally requires membership in `allowed`
    /// (compared case-insensitively).
    pub fn parse_allowed(input: &str, allowed: &HashSet<String>) -> Result<Self, IdentifierError> {
        let identifier = Self::parse(input)?;
        let lower = identifier.0.to_lowercase();
        if allowed.iter().any(|a| a.trim().to_lowercase() == lower) {
            Ok(identifier)
        } else {
            Err(IdentifierError::NotAllowed {
                identifier: identifier.0,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Applies the length, sequence, keyword and grammar checks to a raw identifier.
///
/// Does not trim and does not apply the system-catalog rule; use
/// [`SqlIdentifier::parse`] for table names.
pub fn validate_sql_identifier(identifier: &str) -> Result<(), IdentifierError> {
    if identifier.is_empty() {
        return Err(IdentifierError::Empty);
    }

    let length = identifier.chars().count();
    if length > MAX_IDENTIFIER_LEN {
        return Err(IdentifierError::TooLong { length });
    }

    if let Some(sequence) = DANGEROUS_SEQUENCES
        .iter()
        .copied()
        .find(|s| identifier.contains(s))
    {
        return Err(IdentifierError::DangerousSequence { sequence });
    }

    let lower = identifier.to_lowercase();
    if DENIED_KEYWORDS.iter().any(|k| *k == lower) {
        return Err(IdentifierError::ReservedKeyword {
            identifier: identifier.to_string(),
        });
    }
    if let Some(keyword) = DENIED_KEYWORDS.iter().copied().find(|k| lower.contains(k)) {
        return Err(IdentifierError::ContainsKeyword {
            keyword,
            identifier: identifier.to_string(),
        });
    }

    if !IDENTIFIER_GRAMMAR.is_match(identifier) {
        return Err(IdentifierError::InvalidFormat {
            identifier: identifier.to_string(),
        });
    }

    Ok(())
}

/// Heuristic check for injection payloads in free-form input.
///
/// Flags known attack fragments, unbalanced quotes and comment openers.
/// Not a substitute for parameter binding.
pub fn is_sql_injection_attempt(input: &str) -> bool {
    if input.is_empty() {
        return false;
    }

    let lower = input.to_lowercase();
    if INJECTION_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    let single_quotes = input.matches('\'').count();
    let double_quotes = input.matches('"').count();
    if single_quotes % 2 != 0 || double_quotes % 2 != 0 {
        return true;
    }

    lower.contains("--") || lower.contains("/*")
}
