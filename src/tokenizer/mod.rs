mod rows;

pub use self::rows::*;

use log::trace;

/// One parsed record: the field values in source order.
pub type Row = Vec<String>;

const DELIMITER: char = ',';
const QUOTE: char = '"';

type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("{line}:{col} {msg}")]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub msg: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Unquoted,
    Quoted,
}

/// Character-level CSV state machine.
///
/// Input is fed one line at a time (terminator included) and a row is handed
/// back whenever a line terminator ends a record outside of a quoted field.
/// A quote only opens a quoted field when nothing but whitespace precedes it in
/// the current field; anywhere else it is an ordinary character.
#[derive(Debug)]
pub struct Tokenizer {
    state: State,
    field: String,
    row: Row,
    // inside a quoted field the char after a quote decides between `""` and a closing quote
    pending_quote: bool,
    // byte length of the quoted content once the closing quote was seen
    quoted_len: Option<usize>,
    line_has_content: bool,
    line: usize,
    column: usize,
    quote_start: (usize, usize),
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            state: State::Unquoted,
            field: String::new(),
            row: Row::new(),
            pending_quote: false,
            quoted_len: None,
            line_has_content: false,
            line: 1,
            column: 0,
            quote_start: (0, 0),
        }
    }

    /// Consumes one line of input including its `\n` or `\r\n` terminator.
    ///
    /// Only the last line of an input may come without a terminator. Returns
    /// the row completed by this line, if any.
    pub fn feed_line(&mut self, line: &str) -> Option<Row> {
        let (content, terminated) = match line.strip_suffix('\n') {
            Some(content) => (content.strip_suffix('\r').unwrap_or(content), true),
            None => (line, false),
        };

        for c in content.chars() {
            self.column += 1;
            self.bump(c);
        }

        if !terminated {
            return None;
        }

        let row = self.end_line();
        self.line += 1;
        self.column = 0;
        row
    }

    /// Signals the end of input and flushes a row that had no trailing terminator.
    pub fn finish(&mut self) -> ParseResult<Option<Row>> {
        if self.state == State::Quoted {
            if !self.pending_quote {
                let (line, col) = self.quote_start;
                return Err(ParseError {
                    line,
                    col,
                    msg: "unterminated quoted field, found EOF".into(),
                });
            }
            self.close_quote();
        }

        if !self.line_has_content {
            return Ok(None);
        }

        Ok(Some(self.end_row()))
    }

    fn bump(&mut self, c: char) {
        if self.state == State::Quoted {
            if !self.pending_quote {
                if c == QUOTE {
                    self.pending_quote = true;
                } else {
                    self.field.push(c);
                }
                return;
            }

            if c == QUOTE {
                // escaped quote
                self.pending_quote = false;
                self.field.push(QUOTE);
                return;
            }
            self.close_quote();
        }

        self.line_has_content = true;
        match c {
            DELIMITER => self.end_field(),
            QUOTE if self.quoted_len.is_none() && self.field.trim().is_empty() => {
                self.open_quote()
            }
            _ => self.field.push(c),
        }
    }

    fn open_quote(&mut self) {
        self.field.clear();
        self.state = State::Quoted;
        self.quote_start = (self.line, self.column);
    }

    fn close_quote(&mut self) {
        self.pending_quote = false;
        self.state = State::Unquoted;
        self.quoted_len = Some(self.field.len());
    }

    fn end_field(&mut self) {
        let mut field = std::mem::take(&mut self.field);

        match self.quoted_len.take() {
            Some(len) => {
                // text after the closing quote is kept, minus trailing whitespace
                let tail = field[len..].trim_end().len();
                field.truncate(len + tail);
            }
            None => {
                let trimmed = field.trim();
                if trimmed.len() != field.len() {
                    field = trimmed.to_owned();
                }
            }
        }

        self.row.push(field);
    }

    fn end_line(&mut self) -> Option<Row> {
        if self.state == State::Quoted {
            if !self.pending_quote {
                // multi-line field
                self.field.push('\n');
                return None;
            }
            self.close_quote();
        }

        if !self.line_has_content {
            trace!("Skipping blank line {}", self.line);
            return None;
        }

        Some(self.end_row())
    }

    fn end_row(&mut self) -> Row {
        self.end_field();
        self.line_has_content = false;
        std::mem::take(&mut self.row)
    }
}
