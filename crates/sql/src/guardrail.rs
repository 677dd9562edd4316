//! Structural read-only validation of SQL text.
//!
//! Every candidate passes through [`Guardrail::validate`] whatever its
//! origin. Checks run in a fixed order and the first failure wins:
//!
//! 1. forbidden keyword anywhere, as a whole word ([`RejectionReason::ForbiddenKeyword`])
//! 2. first keyword is not `SELECT`/`WITH`, a CTE that does not end in a
//!    `SELECT`, or `SELECT ... INTO` ([`RejectionReason::NotReadOnly`])
//! 3. content after a statement-ending semicolon ([`RejectionReason::MultiStatement`])
//!
//! Accepted statements are normalized: comments removed, trailing
//! semicolons dropped, and ` LIMIT <n>` appended when the outermost query
//! has neither `LIMIT` nor `FETCH`. Normalizing an already-normalized statement is a no-op.

use sahayak_core::{GuardrailVerdict, RejectionReason, SqlCandidate};
use tracing::debug;

/// Keywords that reject a statement wherever they appear.
pub const FORBIDDEN_KEYWORDS: [&str; 10] = [
    "DROP", "DELETE", "UPDATE", "INSERT", "ALTER", "TRUNCATE", "GRANT", "REVOKE", "CREATE", "EXEC",
];

pub const DEFAULT_ROW_LIMIT: u32 = 50;

/// Keywords that can begin the terminal statement of a `WITH` query.
const TERMINAL_KEYWORDS: [&str; 8] = [
    "SELECT", "VALUES", "TABLE", "INSERT", "UPDATE", "DELETE", "MERGE", "EXECUTE",
];

#[derive(Debug, Clone)]
pub struct Guardrail {
    row_limit: u32,
}

impl Guardrail {
    pub fn new(row_limit: u32) -> Self {
        Self {
            row_limit: row_limit.max(1),
        }
    }

    pub fn row_limit(&self) -> u32 {
        self.row_limit
    }

    pub fn validate(&self, candidate: &SqlCandidate) -> GuardrailVerdict {
        match self.check(&candidate.statement_text) {
            Ok(normalized) => GuardrailVerdict::accept(normalized, candidate.parameters.clone()),
            Err(reason) => {
                debug!(
                    origin = ?candidate.origin,
                    template = candidate.template_id.as_deref().unwrap_or("-"),
                    %reason,
                    "Guardrail rejected statement"
                );
                GuardrailVerdict::reject(reason)
            }
        }
    }

    fn check(&self, statement: &str) -> Result<String, RejectionReason> {
        if find_forbidden_keyword(statement).is_some() {
            return Err(RejectionReason::ForbiddenKeyword);
        }

        let scan = Scan::new(statement);
        check_read_only(&scan.lexemes)?;
        check_single_statement(&scan.lexemes)?;

        let mut normalized = scan.stripped.trim();
        while let Some(rest) = normalized.strip_suffix(';') {
            normalized = rest.trim_end();
        }

        if has_outer_limit(&scan.lexemes) {
            Ok(normalized.to_string())
        } else {
            Ok(format!("{normalized} LIMIT {}", self.row_limit))
        }
    }
}

impl Default for Guardrail {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_LIMIT)
    }
}

/// First forbidden keyword found as a whole word, case-insensitive.
///
/// Scans the raw text, comments and literals included.
pub fn find_forbidden_keyword(statement: &str) -> Option<&'static str> {
    statement
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .find_map(|word| {
            FORBIDDEN_KEYWORDS
                .iter()
                .copied()
                .find(|kw| word.eq_ignore_ascii_case(kw))
        })
}

fn check_read_only(lexemes: &[Lexeme<'_>]) -> Result<(), RejectionReason> {
    let first = lexemes
        .first()
        .filter(|l| l.kind == Kind::Word)
        .ok_or(RejectionReason::NotReadOnly)?;

    if first.is("WITH") {
        let terminal = lexemes[1..]
            .iter()
            .filter(|l| l.kind == Kind::Word && l.depth == 0)
            .find(|l| TERMINAL_KEYWORDS.iter().any(|kw| l.is(kw)));
        match terminal {
            Some(l) if l.is("SELECT") => {}
            _ => return Err(RejectionReason::NotReadOnly),
        }
    } else if !first.is("SELECT") {
        return Err(RejectionReason::NotReadOnly);
    }

    // SELECT ... INTO creates a table
    if lexemes.iter().any(|l| l.kind == Kind::Word && l.is("INTO")) {
        return Err(RejectionReason::NotReadOnly);
    }
    Ok(())
}

fn check_single_statement(lexemes: &[Lexeme<'_>]) -> Result<(), RejectionReason> {
    if let Some(pos) = lexemes.iter().position(|l| l.kind == Kind::Semicolon) {
        if lexemes[pos..].iter().any(|l| l.kind != Kind::Semicolon) {
            return Err(RejectionReason::MultiStatement);
        }
    }
    Ok(())
}

/// `LIMIT` or `FETCH FIRST/NEXT` on the outermost query.
fn has_outer_limit(lexemes: &[Lexeme<'_>]) -> bool {
    lexemes
        .iter()
        .any(|l| l.kind == Kind::Word && l.depth == 0 && (l.is("LIMIT") || l.is("FETCH")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Literal,
    QuotedIdent,
    Semicolon,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Lexeme<'a> {
    kind: Kind,
    text: &'a str,
    /// Parenthesis nesting level; 0 is the outermost query.
    depth: usize,
}

impl Lexeme<'_> {
    fn is(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Lexemes of a statement plus its text with comments blanked out.
struct Scan<'a> {
    lexemes: Vec<Lexeme<'a>>,
    stripped: String,
}

impl<'a> Scan<'a> {
    fn new(sql: &'a str) -> Self {
        let bytes = sql.as_bytes();
        let mut lexemes = Vec::new();
        let mut stripped = String::with_capacity(sql.len());
        let mut depth = 0usize;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            let start = i;
            let kind = match b {
                b'-' if bytes.get(i + 1) == Some(&b'-') => {
                    i = sql[i..].find('\n').map_or(sql.len(), |n| i + n);
                    stripped.push(' ');
                    continue;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = sql[i + 2..].find("*/").map_or(sql.len(), |n| i + 2 + n + 2);
                    stripped.push(' ');
                    continue;
                }
                b'\'' => {
                    i = quoted_end(bytes, i, b'\'');
                    Kind::Literal
                }
                b'"' => {
                    i = quoted_end(bytes, i, b'"');
                    Kind::QuotedIdent
                }
                b'$' if dollar_quoted_end(sql, i).is_some() => {
                    i = dollar_quoted_end(sql, i).unwrap_or(i + 1);
                    Kind::Literal
                }
                b'(' => {
                    i += 1;
                    depth += 1;
                    Kind::Punct
                }
                b')' => {
                    i += 1;
                    depth = depth.saturating_sub(1);
                    Kind::Punct
                }
                b';' => {
                    i += 1;
                    Kind::Semicolon
                }
                _ if b.is_ascii_whitespace() => {
                    stripped.push(b as char);
                    i += 1;
                    continue;
                }
                _ if is_word_byte(b) => {
                    i += bytes[i..]
                        .iter()
                        .position(|c| !is_word_byte(*c))
                        .unwrap_or(bytes.len() - i);
                    Kind::Word
                }
                _ => {
                    i += sql[i..].chars().next().map_or(1, char::len_utf8);
                    Kind::Punct
                }
            };
            let text = &sql[start..i];
            stripped.push_str(text);
            let lexeme_depth = if b == b'(' { depth - 1 } else { depth };
            lexemes.push(Lexeme {
                kind,
                text,
                depth: lexeme_depth,
            });
        }

        Self { lexemes, stripped }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Length of the `$tag$` opener at `start`, if there is one.
///
/// `$1` style placeholders are not openers.
fn dollar_tag_len(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if bytes.get(j).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    while j < bytes.len() && bytes[j] != b'$' {
        if !(bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_' || bytes[j] >= 0x80) {
            return None;
        }
        j += 1;
    }
    (j < bytes.len()).then_some(j + 1 - start)
}

/// Index just past the matching closing `$tag$`.
///
/// `None` when there is no opener or it is never closed.
fn dollar_quoted_end(sql: &str, start: usize) -> Option<usize> {
    let len = dollar_tag_len(sql.as_bytes(), start)?;
    let tag = &sql[start..start + len];
    let body = start + len;
    sql[body..].find(tag).map(|n| body + n + len)
}

/// Index just past the closing quote; doubled quotes are escapes.
fn quoted_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        if bytes[j] == quote {
            if bytes.get(j + 1) == Some(&quote) {
                j += 2;
                continue;
            }
            return j + 1;
        }
        j += 1;
    }
    bytes.len()
}
