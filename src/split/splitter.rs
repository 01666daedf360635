use crate::error::{Position, Result, ScriptError};
use crate::lex::{is_word_char, LexMode, LexicalContext, Step};

/// Policy knobs for [`ScriptSplitter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitOptions {
    /// Fail with [`ScriptError::UnbalancedBlock`] when a script is
    /// force-terminated (end of input or a `/` line) while procedural
    /// blocks are still open. The default clamps the depth and emits a
    /// warning through the `log` facade instead.
    pub strict_blocks: bool,
}

/// Keyword-level state for procedural block tracking. DECLARE opens the
/// block early so the declaration-list semicolons stay literal; the BEGIN
/// that follows belongs to the same block and does not nest further.
#[derive(Debug, Default)]
struct BlockState {
    token: String,
    token_start: Position,
    /// Positions of the openers of currently unclosed blocks.
    begin_stack: Vec<Position>,
    after_declare: bool,
    /// True when the last flushed token was END, so that a `;` directly
    /// following it is kept as part of the statement text.
    end_pending: bool,
}

impl BlockState {
    fn push_char(&mut self, c: char, at: Position) {
        if self.token.is_empty() {
            self.token_start = at;
        }
        self.token.push(c);
    }

    /// Close out the pending keyword token, updating the nesting depth.
    fn flush(&mut self, ctx: &mut LexicalContext) {
        if self.token.is_empty() {
            return;
        }
        if self.token.eq_ignore_ascii_case("DECLARE") {
            ctx.open_block();
            self.begin_stack.push(self.token_start);
            self.after_declare = true;
            self.end_pending = false;
        } else if self.token.eq_ignore_ascii_case("BEGIN") {
            if self.after_declare {
                self.after_declare = false;
            } else {
                ctx.open_block();
                self.begin_stack.push(self.token_start);
            }
            self.end_pending = false;
        } else if self.token.eq_ignore_ascii_case("END") {
            if ctx.close_block() {
                self.begin_stack.pop();
            } else {
                log::warn!("END without a matching BEGIN at {}", self.token_start);
            }
            self.end_pending = true;
        } else {
            self.end_pending = false;
        }
        self.token.clear();
    }

    fn last_opened(&self, fallback: Position) -> Position {
        self.begin_stack.last().copied().unwrap_or(fallback)
    }
}

/// Splits a SQL script into individual statement strings.
///
/// The splitter is a lazy iterator: each call to `next` scans forward until
/// one statement terminator is reached. Exhaustion is `None`; a lexical
/// failure is `Some(Err(_))`, after which the iterator only returns `None`.
/// Statements already yielded before a failure remain valid.
pub struct ScriptSplitter {
    chars: Vec<char>,
    cursor: usize,
    /// Position of the next unconsumed character, 1-based.
    pos: Position,
    /// Index of the first character of the current line, for the
    /// standalone-`/` terminator check.
    line_start: usize,
    options: SplitOptions,
    done: bool,
}

impl ScriptSplitter {
    pub fn new(script: &str) -> Self {
        Self::with_options(script, SplitOptions::default())
    }

    pub fn with_options(script: &str, options: SplitOptions) -> Self {
        Self {
            chars: script.chars().collect(),
            cursor: 0,
            pos: Position::start(),
            line_start: 0,
            options,
            done: false,
        }
    }

    fn bump(&mut self) {
        if let Some(&c) = self.chars.get(self.cursor) {
            self.cursor += 1;
            self.pos.advance(c);
            if c == '\n' {
                self.line_start = self.cursor;
            }
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    /// True when the `/` at the cursor is the only non-whitespace character
    /// on its line.
    fn slash_alone_on_line(&self) -> bool {
        let before = &self.chars[self.line_start..self.cursor];
        if !before.iter().all(|c| c.is_whitespace()) {
            return false;
        }
        for &c in &self.chars[self.cursor + 1..] {
            if c == '\n' {
                return true;
            }
            if !c.is_whitespace() {
                return false;
            }
        }
        true
    }

    /// Scan forward from the cursor until a statement is complete.
    /// `Ok(None)` means the remaining input holds no further statement.
    fn scan_statement(&mut self) -> Result<Option<String>> {
        let mut ctx = LexicalContext::new();
        let mut blocks = BlockState::default();
        let mut current = String::new();
        // Byte length of `current` up to the last character of the
        // statement's meaningful span: everything past it is trailing
        // whitespace or comment text and is cut before emission.
        let mut meaningful = 0usize;
        // Where the currently open comment or quoted region started.
        let mut opened_at = self.pos;
        // Whether the currently open block comment is kept in the output.
        // Standalone comment blocks between statements are dropped.
        let mut keep_comment = false;

        while self.cursor < self.chars.len() {
            let c = self.chars[self.cursor];
            let next = self.chars.get(self.cursor + 1).copied();

            if ctx.in_region() {
                let mode = ctx.mode;
                let step = ctx.step(c, next);
                let consumed = step.consumed();
                match mode {
                    LexMode::LineComment => {
                        // Comment text is stripped; the newline that ends it
                        // stays so surrounding lines keep their shape.
                        if matches!(step, Step::Closed(_)) {
                            current.push('\n');
                        }
                    }
                    LexMode::BlockComment => {
                        if keep_comment {
                            for k in 0..consumed {
                                current.push(self.chars[self.cursor + k]);
                            }
                        }
                    }
                    LexMode::SingleQuoted | LexMode::DoubleQuoted => {
                        for k in 0..consumed {
                            current.push(self.chars[self.cursor + k]);
                        }
                        meaningful = current.len();
                    }
                    LexMode::Normal => {}
                }
                self.bump_n(consumed);
                continue;
            }

            let at = self.pos;

            if let Some(opening) = ctx.try_open(c, next) {
                blocks.flush(&mut ctx);
                opened_at = at;
                match ctx.mode {
                    LexMode::LineComment => {}
                    LexMode::BlockComment => {
                        keep_comment = meaningful > 0;
                        if keep_comment {
                            current.push_str("/*");
                        }
                    }
                    LexMode::SingleQuoted | LexMode::DoubleQuoted => {
                        current.push(c);
                        meaningful = current.len();
                    }
                    LexMode::Normal => {}
                }
                self.bump_n(opening);
                continue;
            }

            if is_word_char(c) {
                blocks.push_char(c, at);
                current.push(c);
                meaningful = current.len();
                self.bump();
                continue;
            }

            blocks.flush(&mut ctx);

            if c == ';' {
                self.bump();
                if ctx.depth > 0 {
                    // Inside a procedural block the semicolon is literal.
                    current.push(';');
                    meaningful = current.len();
                    blocks.end_pending = false;
                    continue;
                }
                if blocks.end_pending {
                    // The terminator belongs to the END token; keep it.
                    current.push(';');
                    meaningful = current.len();
                }
                current.truncate(meaningful);
                let text = current.trim();
                if !text.is_empty() {
                    return Ok(Some(text.to_string()));
                }
                current.clear();
                meaningful = 0;
                blocks.end_pending = false;
                continue;
            }

            if c == '/' && self.slash_alone_on_line() {
                self.bump();
                if ctx.depth > 0 {
                    let opened = blocks.last_opened(at);
                    if self.options.strict_blocks {
                        return Err(ScriptError::UnbalancedBlock {
                            depth: ctx.depth,
                            opened,
                        });
                    }
                    log::warn!(
                        "terminator '/' at {} with {} unclosed block(s), last opened at {}",
                        at,
                        ctx.depth,
                        opened
                    );
                    ctx.depth = 0;
                    blocks.begin_stack.clear();
                }
                current.truncate(meaningful);
                let text = current.trim();
                if !text.is_empty() {
                    return Ok(Some(text.to_string()));
                }
                current.clear();
                meaningful = 0;
                blocks.end_pending = false;
                continue;
            }

            current.push(c);
            if !c.is_whitespace() {
                meaningful = current.len();
                blocks.end_pending = false;
            }
            self.bump();
        }

        // End of input.
        blocks.flush(&mut ctx);
        match ctx.mode {
            LexMode::SingleQuoted => {
                return Err(ScriptError::UnterminatedLiteral {
                    quote: '\'',
                    at: opened_at,
                });
            }
            LexMode::DoubleQuoted => {
                return Err(ScriptError::UnterminatedLiteral {
                    quote: '"',
                    at: opened_at,
                });
            }
            LexMode::BlockComment => {
                return Err(ScriptError::UnterminatedComment { at: opened_at });
            }
            LexMode::LineComment | LexMode::Normal => {}
        }
        if ctx.depth > 0 {
            let opened = blocks.last_opened(self.pos);
            if self.options.strict_blocks {
                return Err(ScriptError::UnbalancedBlock {
                    depth: ctx.depth,
                    opened,
                });
            }
            log::warn!(
                "script ended with {} unclosed block(s), last opened at {}",
                ctx.depth,
                opened
            );
        }
        current.truncate(meaningful);
        let text = current.trim();
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }
}

impl Iterator for ScriptSplitter {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.scan_statement() {
            Ok(Some(statement)) => Some(Ok(statement)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
