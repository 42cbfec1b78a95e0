use crate::ast::{ArithOp, DataType, Declarator, Operand, Program, Stmt};
use crate::error::{Span, StarError};
use crate::lexer::{Lexer, Token, TokenKind};
use log::debug;

/// The tokens of one statement plus the token that ended it (`.`, `times`,
/// `newLine.`, a brace or end of input).
struct StatementBuffer {
    tokens: Vec<Token>,
    current: usize,
    end: Token,
}

impl StatementBuffer {
    fn line(&self) -> usize {
        self.tokens.first().map_or(self.end.line, |t| t.line)
    }

    fn span(&self) -> Span {
        match self.tokens.first() {
            Some(first) => first.span.to(&self.end.span),
            None => self.end.span.clone(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Span of the current token, or of the terminator once the buffer is
    /// exhausted.
    fn here(&self) -> Span {
        self.peek().map_or(self.end.span.clone(), |t| t.span.clone())
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, StarError> {
        if self.check(kind) {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(StarError::structural(self.here(), self.line(), message.to_string()))
    }

    fn shape(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

/// Turns the token stream into statements one at a time. Loops are parsed
/// whole: the header together with every statement of its body.
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self { lexer }
    }

    pub fn from_source(source: &str) -> Self {
        Self::new(Lexer::new(source.to_string()))
    }

    /// Parse every remaining statement.
    pub fn parse(&mut self) -> Result<Program, StarError> {
        let mut statements = Vec::new();
        while let Some(stmt) = self.next_statement()? {
            statements.push(stmt);
        }
        Ok(Program { statements })
    }

    /// Next top-level statement, or `None` at end of input.
    pub fn next_statement(&mut self) -> Result<Option<Stmt>, StarError> {
        let buffer = self.read_buffer()?;

        let end_kind = buffer.end.kind;
        match end_kind {
            TokenKind::EndOfInput if buffer.tokens.is_empty() => Ok(None),
            TokenKind::EndOfInput => Err(missing_terminator(&buffer)),
            TokenKind::CurlyClose => Err(StarError::structural(
                buffer.end.span.clone(),
                buffer.line(),
                "Unexpected '}' without a matching loop!".to_string(),
            )),
            TokenKind::CurlyOpen => Err(unexpected_block(&buffer)),
            _ => self.statement(buffer).map(Some),
        }
    }

    fn read_buffer(&mut self) -> Result<StatementBuffer, StarError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.lexer.next_token()?;
            match token.kind {
                TokenKind::StatementEnd
                | TokenKind::BlankLine
                | TokenKind::CurlyOpen
                | TokenKind::CurlyClose
                | TokenKind::EndOfInput => {
                    return Ok(StatementBuffer {
                        tokens,
                        current: 0,
                        end: token,
                    });
                }
                _ => tokens.push(token),
            }
        }
    }

    /// Classify a buffer ended by `.`, `times` or `newLine.`.
    fn statement(&mut self, mut buffer: StatementBuffer) -> Result<Stmt, StarError> {
        let line = buffer.line();
        let span = buffer.span();

        if buffer.end.kind == TokenKind::BlankLine {
            if !buffer.tokens.is_empty() {
                return Err(missing_terminator(&buffer)
                    .with_help("End the statement with '.' before 'newLine.'."));
            }
            return Ok(Stmt::BlankLine { line, span });
        }

        let first = match buffer.peek() {
            Some(token) => token.clone(),
            None => {
                return Err(StarError::structural(span, line, "Parsing error!".to_string())
                    .with_help("Found a '.' with no statement before it."));
            }
        };

        let stmt = if first.is_keyword("loop") {
            self.loop_statement(buffer)?
        } else if buffer.end.text == "times" {
            return Err(StarError::structural(
                buffer.end.span.clone(),
                line,
                "'times' can only end a loop header!".to_string(),
            ));
        } else if first.is_keyword("int") || first.is_keyword("text") {
            declaration(&mut buffer)?
        } else if first.is_keyword("write") {
            write_statement(&mut buffer)?
        } else if first.is_keyword("read") {
            read_statement(&mut buffer)?
        } else if first.kind == TokenKind::Identifier {
            assignment(&mut buffer)?
        } else {
            return Err(StarError::structural(span, line, "Parsing error!".to_string())
                .with_help("Statements start with int, text, read, write, loop or a variable name."));
        };

        debug!("line {}: parsed {}", line, describe(&stmt));
        Ok(stmt)
    }

    fn loop_statement(&mut self, mut buffer: StatementBuffer) -> Result<Stmt, StarError> {
        let line = buffer.line();
        buffer.advance();

        if buffer.end.text != "times" {
            return Err(StarError::structural(
                buffer.end.span.clone(),
                line,
                "Invalid loop statement!".to_string(),
            )
            .with_help("Loop headers have the form: loop <count> times { ... }"));
        }

        let count = match buffer.advance() {
            Some(token) if matches!(token.kind, TokenKind::IntConst | TokenKind::Identifier) => {
                operand(&token, line)?
            }
            _ => {
                return Err(StarError::structural(
                    buffer.here(),
                    line,
                    "Invalid loop statement!".to_string(),
                )
                .with_help("The loop count is an integer or an int variable."));
            }
        };
        if !buffer.is_at_end() {
            return Err(StarError::structural(
                buffer.here(),
                line,
                "Invalid loop statement!".to_string(),
            ));
        }

        let body = self.loop_body(line)?;
        let span = buffer.span().to(&body_end_span(&body, &buffer.end.span));
        Ok(Stmt::Loop {
            count,
            body,
            line,
            span,
        })
    }

    /// Either a `{ ... }` block or a directly following loop header, whose
    /// count then compounds with this one.
    fn loop_body(&mut self, header_line: usize) -> Result<Vec<Stmt>, StarError> {
        let buffer = self.read_buffer()?;
        let end_kind = buffer.end.kind;
        match end_kind {
            TokenKind::CurlyOpen if buffer.tokens.is_empty() => self.block(),
            TokenKind::StatementEnd
                if buffer.tokens.first().is_some_and(|t| t.is_keyword("loop")) =>
            {
                Ok(vec![self.loop_statement(buffer)?])
            }
            _ => Err(StarError::structural(
                buffer.span(),
                header_line,
                "Expected '{' after loop header!".to_string(),
            )
            .with_help("Loop bodies are enclosed in braces: loop 3 times { write x. }")),
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>, StarError> {
        let mut statements = Vec::new();
        loop {
            let buffer = self.read_buffer()?;
            let end_kind = buffer.end.kind;
            match end_kind {
                TokenKind::CurlyClose if buffer.tokens.is_empty() => return Ok(statements),
                TokenKind::CurlyClose => return Err(missing_terminator(&buffer)),
                TokenKind::EndOfInput => {
                    return Err(StarError::structural(
                        buffer.end.span.clone(),
                        buffer.line(),
                        "Expected '}' after loop body!".to_string(),
                    )
                    .with_help("Every '{' of a loop body needs a matching '}'."));
                }
                TokenKind::CurlyOpen => return Err(unexpected_block(&buffer)),
                _ => statements.push(self.statement(buffer)?),
            }
        }
    }
}

fn body_end_span(body: &[Stmt], fallback: &Span) -> Span {
    body.last().map_or(fallback.clone(), |stmt| stmt.span().clone())
}

fn missing_terminator(buffer: &StatementBuffer) -> StarError {
    StarError::structural(
        buffer.span(),
        buffer.line(),
        "Expected '.' at the end of the statement!".to_string(),
    )
}

fn unexpected_block(buffer: &StatementBuffer) -> StarError {
    let help = if buffer.tokens.first().is_some_and(|t| t.is_keyword("loop")) {
        "Loop headers end with 'times': loop 3 times { ... }"
    } else {
        "Braces may only enclose a loop body."
    };
    StarError::structural(
        buffer.end.span.clone(),
        buffer.line(),
        "Unexpected '{'!".to_string(),
    )
    .with_help(help)
}

fn operand(token: &Token, line: usize) -> Result<Operand, StarError> {
    match token.kind {
        TokenKind::IntConst => {
            let value = token.text.parse::<u32>().map_err(|_| {
                StarError::lexical(token.span.clone(), line, "Integer value is too big!".to_string())
            })?;
            Ok(Operand::Int {
                value,
                span: token.span.clone(),
            })
        }
        TokenKind::StrConst => Ok(Operand::Text {
            value: token.text.clone(),
            span: token.span.clone(),
        }),
        TokenKind::Identifier => Ok(Operand::Variable {
            name: token.text.clone(),
            span: token.span.clone(),
        }),
        TokenKind::Operator if token.text == "-" => Err(StarError::semantic(
            token.span.clone(),
            line,
            "Negative values are not allowed!".to_string(),
        )),
        TokenKind::Keyword => Err(StarError::structural(
            token.span.clone(),
            line,
            format!("'{}' is a keyword and cannot be used as a value!", token.text),
        )),
        _ => Err(StarError::structural(
            token.span.clone(),
            line,
            "Invalid assignment!".to_string(),
        )),
    }
}

/// `int a, b is 2, c.`
fn declaration(buffer: &mut StatementBuffer) -> Result<Stmt, StarError> {
    let line = buffer.line();
    let span = buffer.span();
    let keyword = buffer.consume(TokenKind::Keyword, "Invalid variable initialization")?;
    let data_type = DataType::from_keyword(&keyword.text).ok_or_else(|| {
        StarError::structural(
            keyword.span.clone(),
            line,
            format!("Unrecognized type: {}!", keyword.text),
        )
    })?;

    let mut declarators = Vec::new();
    loop {
        let name = buffer.consume(TokenKind::Identifier, "Invalid variable initialization")?;
        let mut decl_span = name.span.clone();
        let init = if buffer.check(TokenKind::Operator)
            && buffer.peek().is_some_and(|t| t.text == "=")
        {
            buffer.advance();
            let value = match buffer.advance() {
                Some(token) => token,
                None => {
                    return Err(StarError::structural(
                        buffer.here(),
                        line,
                        "Invalid variable initialization".to_string(),
                    )
                    .with_help("Give the variable a value: int x is 5."));
                }
            };
            let value = operand(&value, line)?;
            decl_span = decl_span.to(value.span());
            Some(value)
        } else {
            None
        };

        declarators.push(Declarator {
            name: name.text,
            init,
            span: decl_span,
        });

        if buffer.is_at_end() {
            break;
        }
        if !buffer.match_kind(TokenKind::Comma) {
            let help = if buffer.check(TokenKind::Operator) {
                "Declarations cannot compute a value; declare first, then assign."
            } else {
                "Separate several declarations with ','."
            };
            return Err(StarError::structural(
                buffer.here(),
                line,
                "Invalid variable initialization".to_string(),
            )
            .with_help(help));
        }
    }

    Ok(Stmt::Declaration {
        data_type,
        declarators,
        line,
        span,
    })
}

/// `write "label", x, y.`
fn write_statement(buffer: &mut StatementBuffer) -> Result<Stmt, StarError> {
    let line = buffer.line();
    let span = buffer.span();
    buffer.advance();

    let mut items = Vec::new();
    let mut dangling_comma = false;
    while let Some(token) = buffer.advance() {
        match token.kind {
            TokenKind::StrConst | TokenKind::Identifier => {
                items.push(operand(&token, line)?);
                dangling_comma = false;
            }
            TokenKind::Comma if !items.is_empty() && !dangling_comma => dangling_comma = true,
            _ => {
                return Err(StarError::structural(
                    token.span.clone(),
                    line,
                    "Invalid output statement!".to_string(),
                )
                .with_help("write takes string constants and variable names."));
            }
        }
    }

    if items.is_empty() {
        return Err(StarError::structural(span, line, "Invalid output statement!".to_string())
            .with_help("write needs at least one value: write x."));
    }
    if dangling_comma {
        return Err(StarError::structural(
            buffer.end.span.clone(),
            line,
            "Invalid output statement!".to_string(),
        )
        .with_help("A ',' must be followed by another value."));
    }

    Ok(Stmt::Write { items, line, span })
}

/// `read "prompt", target.`
fn read_statement(buffer: &mut StatementBuffer) -> Result<Stmt, StarError> {
    let line = buffer.line();
    let span = buffer.span();

    if buffer.shape()
        != [
            TokenKind::Keyword,
            TokenKind::StrConst,
            TokenKind::Comma,
            TokenKind::Identifier,
        ]
    {
        return Err(StarError::structural(span, line, "Invalid input!".to_string())
            .with_help("Input statements have the form: read \"prompt\", variable."));
    }

    buffer.advance();
    let prompt = buffer.consume(TokenKind::StrConst, "Invalid input!")?;
    buffer.consume(TokenKind::Comma, "Invalid input!")?;
    let target = buffer.consume(TokenKind::Identifier, "Invalid input!")?;

    Ok(Stmt::Read {
        prompt: prompt.text,
        target: target.text,
        line,
        span,
    })
}

/// `x is value.` or `x is a + b.`
fn assignment(buffer: &mut StatementBuffer) -> Result<Stmt, StarError> {
    let line = buffer.line();
    let span = buffer.span();

    let target = buffer.consume(TokenKind::Identifier, "Invalid assignment!")?;
    match buffer.advance() {
        Some(token) if token.kind == TokenKind::Operator && token.text == "=" => {}
        _ => {
            return Err(StarError::structural(span, line, "Parsing error!".to_string())
                .with_help("Assignments have the form: x is value."));
        }
    }

    let value_token = match buffer.advance() {
        Some(token) => token,
        None => {
            return Err(StarError::structural(span, line, "Invalid assignment!".to_string())
                .with_help("Give the variable a value: x is 5."));
        }
    };
    let left = operand(&value_token, line)?;

    if buffer.is_at_end() {
        return Ok(Stmt::Assign {
            target: target.text,
            value: left,
            line,
            span,
        });
    }

    let operator = match buffer.advance() {
        Some(token) if token.kind == TokenKind::Operator && token.text == "+" => ArithOp::Add,
        Some(token) if token.kind == TokenKind::Operator && token.text == "-" => ArithOp::Subtract,
        _ => {
            return Err(StarError::structural(
                span,
                line,
                "Invalid arithmetic assignment!".to_string(),
            )
            .with_help("Only '+' and '-' combine two values."));
        }
    };

    let right = match buffer.advance() {
        Some(token) => operand(&token, line)?,
        None => {
            return Err(StarError::structural(
                buffer.end.span.clone(),
                line,
                "Invalid arithmetic assignment!".to_string(),
            )
            .with_help(format!("Expected a value after '{}'.", operator)));
        }
    };

    if !buffer.is_at_end() {
        return Err(StarError::structural(
            buffer.here(),
            line,
            "Invalid arithmetic assignment!".to_string(),
        )
        .with_help("Arithmetic combines exactly two values: x is a + b."));
    }

    Ok(Stmt::Arithmetic {
        target: target.text,
        left,
        operator,
        right,
        line,
        span,
    })
}

fn describe(stmt: &Stmt) -> &'static str {
    match stmt {
        Stmt::BlankLine { .. } => "blank line",
        Stmt::Declaration { .. } => "declaration",
        Stmt::Assign { .. } => "assignment",
        Stmt::Arithmetic { .. } => "arithmetic assignment",
        Stmt::Read { .. } => "read",
        Stmt::Write { .. } => "write",
        Stmt::Loop { .. } => "loop",
    }
}
