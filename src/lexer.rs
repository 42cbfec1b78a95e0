use crate::error::{Span, StarError};
use log::trace;

pub const MAX_IDENT_LENGTH: usize = 256;
pub const MAX_STRING_LENGTH: usize = 30;
pub const MAX_INT_VALUE: u64 = 4_294_967_295;

const KEYWORDS: [&str; 8] = ["int", "loop", "text", "times", "read", "write", "newLine", "is"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    IntConst,
    StrConst,
    Keyword,
    Operator,
    Comma,
    ParenOpen,
    ParenClose,
    CurlyOpen,
    CurlyClose,
    /// `.` or the word `times`.
    StatementEnd,
    /// `newLine.`
    BlankLine,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// 1-based count of statement terminators seen before this token.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, span: Span, line: usize) -> Self {
        Self {
            kind,
            text,
            span,
            line,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    /// Terminators end a statement buffer; they also advance the line count.
    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, TokenKind::StatementEnd | TokenKind::BlankLine)
    }
}

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Pull-based tokenizer. Each call to [`Lexer::next_token`] consumes exactly
/// the characters of one token; once `EndOfInput` is produced every further
/// call produces it again.
pub struct Lexer {
    source: String,
    start: usize,
    current: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: String) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Tokenize the whole input, `EndOfInput` included.
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>, StarError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::EndOfInput;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, StarError> {
        self.skip_trivia()?;
        self.start = self.current;

        if self.is_at_end() {
            return Ok(self.make_token(TokenKind::EndOfInput, String::new()));
        }

        let c = self.advance();
        let token = match c {
            '.' => self.make_token(TokenKind::StatementEnd, ".".to_string()),
            '+' | '-' => self.make_token(TokenKind::Operator, c.to_string()),
            '=' => self.make_token(TokenKind::Operator, "=".to_string()),
            ',' => self.make_token(TokenKind::Comma, ",".to_string()),
            '(' => self.make_token(TokenKind::ParenOpen, "(".to_string()),
            ')' => self.make_token(TokenKind::ParenClose, ")".to_string()),
            '{' => self.make_token(TokenKind::CurlyOpen, "{".to_string()),
            '}' => self.make_token(TokenKind::CurlyClose, "}".to_string()),
            '"' => self.string()?,
            c if c.is_ascii_digit() => self.number()?,
            c if c.is_ascii_alphabetic() => self.word()?,
            _ => {
                return Err(StarError::lexical(
                    Span::new(self.start, self.current),
                    self.line,
                    format!("Unrecognized character: '{}'!", c),
                ));
            }
        };

        if token.is_terminator() {
            self.line += 1;
        }
        trace!("token {:?} {:?} at line {}", token.kind, token.text, token.line);
        Ok(token)
    }

    fn skip_trivia(&mut self) -> Result<(), StarError> {
        loop {
            let c = self.peek();
            if c.is_whitespace() {
                self.advance();
            } else if c == '/' && self.peek_next() == '*' {
                let open = self.current;
                self.advance();
                self.advance();
                loop {
                    if self.is_at_end() {
                        return Err(StarError::lexical(
                            Span::new(open, open + 2),
                            self.line,
                            "Comment cannot be terminated!".to_string(),
                        )
                        .with_help("Close block comments with '*/'."));
                    }
                    if self.advance() == '*' && self.match_char('/') {
                        break;
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        match self.source[self.current..].chars().next() {
            Some(c) => {
                self.current += c.len_utf8();
                c
            }
            None => '\0',
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> char {
        self.source[self.current..].chars().next().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    fn string(&mut self) -> Result<Token, StarError> {
        let mut length = 0;
        while self.peek() != '"' {
            if self.is_at_end() {
                return Err(StarError::lexical(
                    Span::new(self.start, self.current),
                    self.line,
                    "String cannot be terminated!".to_string(),
                )
                .with_help("String constants end with a closing '\"'."));
            }
            self.advance();
            length += 1;
            if length > MAX_STRING_LENGTH {
                return Err(StarError::lexical(
                    Span::new(self.start, self.current),
                    self.line,
                    format!(
                        "String constants must be smaller than or equal to {} characters!",
                        MAX_STRING_LENGTH
                    ),
                ));
            }
        }

        // closing quote
        self.advance();
        let content = self.source[self.start + 1..self.current - 1].to_string();
        Ok(self.make_token(TokenKind::StrConst, content))
    }

    fn number(&mut self) -> Result<Token, StarError> {
        let mut value = u64::from(self.source.as_bytes()[self.start] - b'0');
        while self.peek().is_ascii_digit() {
            let digit = self.advance() as u8 - b'0';
            value = value * 10 + u64::from(digit);
            if value > MAX_INT_VALUE {
                return Err(StarError::lexical(
                    Span::new(self.start, self.current),
                    self.line,
                    "Integer value is too big!".to_string(),
                )
                .with_help(format!("Integers range from 0 to {}.", MAX_INT_VALUE)));
            }
        }

        let next = self.peek();
        if next.is_ascii_alphabetic() || next == '_' {
            self.advance();
            return Err(StarError::lexical(
                Span::new(self.start, self.current),
                self.line,
                "Invalid identifier, identifiers cannot start with a number!".to_string(),
            ));
        }

        Ok(self.make_token(TokenKind::IntConst, value.to_string()))
    }

    /// Identifiers, keywords and the three word-shaped specials: `is`,
    /// `times` and `newLine.`.
    fn word(&mut self) -> Result<Token, StarError> {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
            if self.current - self.start > MAX_IDENT_LENGTH {
                return Err(StarError::lexical(
                    Span::new(self.start, self.current),
                    self.line,
                    format!(
                        "Identifiers must be smaller or equal than {} characters!",
                        MAX_IDENT_LENGTH
                    ),
                ));
            }
        }

        let kind = match &self.source[self.start..self.current] {
            "is" => TokenKind::Operator,
            "times" => TokenKind::StatementEnd,
            "newLine" if self.peek() == '.' => TokenKind::BlankLine,
            word if is_keyword(word) => TokenKind::Keyword,
            _ => TokenKind::Identifier,
        };

        let text = match kind {
            TokenKind::Operator => "=".to_string(),
            TokenKind::BlankLine => {
                self.advance();
                "newLine.".to_string()
            }
            _ => self.source[self.start..self.current].to_string(),
        };
        Ok(self.make_token(kind, text))
    }

    fn make_token(&self, kind: TokenKind, text: String) -> Token {
        Token::new(kind, text, Span::new(self.start, self.current), self.line)
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, StarError>;

    /// Yields tokens up to, but not including, `EndOfInput`.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::EndOfInput => None,
            other => Some(other),
        }
    }
}
