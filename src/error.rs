use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Approximate source position of a lexical construct, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Move past one character of input.
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Lexical failures raised while splitting a script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unterminated {} opened at {at}", literal_kind(.quote))]
    UnterminatedLiteral { quote: char, at: Position },

    #[error("unterminated block comment opened at {at}")]
    UnterminatedComment { at: Position },

    #[error("script ended with {depth} unclosed block(s), last opened at {opened}")]
    UnbalancedBlock { depth: usize, opened: Position },
}

fn literal_kind(quote: &char) -> &'static str {
    if *quote == '"' {
        "quoted identifier"
    } else {
        "string literal"
    }
}
