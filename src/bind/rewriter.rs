use serde::Serialize;

use crate::lex::{is_param_char, LexicalContext};

/// A statement with its named bind markers rewritten to positional `?`
/// placeholders, plus the marker names in textual order. Repeated names
/// stay repeated; the list length always equals the placeholder count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterizedSql {
    pub sql: String,
    pub names: Vec<String>,
}

/// Rewrite `&name` and `:name` markers in one statement to positional
/// placeholders.
///
/// A marker is recognized only at a token boundary: the `&`/`:` must not be
/// directly preceded by an identifier character, and must be directly
/// followed by at least one. Everything else — markers inside comments or
/// quoted regions, bare `&`/`:` operators, `1:2`, `x&p` — passes through
/// literally. The function never fails; unterminated quotes or comments are
/// passed through as-is.
pub fn parameterize(sql: &str) -> ParameterizedSql {
    let chars: Vec<char> = sql.chars().collect();
    let len = chars.len();
    let mut ctx = LexicalContext::new();
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();

    let mut i = 0usize;
    while i < len {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if ctx.in_region() {
            // Comment and quoted text passes through unchanged.
            let consumed = ctx.step(c, next).consumed();
            out.extend(&chars[i..i + consumed]);
            i += consumed;
            continue;
        }

        if let Some(opening) = ctx.try_open(c, next) {
            out.extend(&chars[i..i + opening]);
            i += opening;
            continue;
        }

        if (c == '&' || c == ':') && next.is_some_and(is_param_char) {
            let at_boundary = i == 0 || !is_param_char(chars[i - 1]);
            if at_boundary {
                let mut j = i + 1;
                while j < len && is_param_char(chars[j]) {
                    j += 1;
                }
                names.push(chars[i + 1..j].iter().collect());
                out.push('?');
                i = j;
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    ParameterizedSql { sql: out, names }
}
