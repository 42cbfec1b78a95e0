use crate::error::Span;
use std::fmt;

/// Parsed STAR source: top-level statements in source order. Each statement
/// comes from one statement buffer, except loops, which own their body.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Text,
}

impl DataType {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" => Some(DataType::Int),
            "text" => Some(DataType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Text => write!(f, "text"),
        }
    }
}

/// The right-hand side atoms of assignments, arithmetic, loop counts and
/// `write` items.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int { value: u32, span: Span },
    Text { value: String, span: Span },
    Variable { name: String, span: Span },
}

impl Operand {
    pub fn span(&self) -> &Span {
        match self {
            Operand::Int { span, .. } => span,
            Operand::Text { span, .. } => span,
            Operand::Variable { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Subtract => write!(f, "-"),
        }
    }
}

/// `name [is value]` inside a declaration list.
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Operand>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    BlankLine {
        line: usize,
        span: Span,
    },
    Declaration {
        data_type: DataType,
        declarators: Vec<Declarator>,
        line: usize,
        span: Span,
    },
    Assign {
        target: String,
        value: Operand,
        line: usize,
        span: Span,
    },
    Arithmetic {
        target: String,
        left: Operand,
        operator: ArithOp,
        right: Operand,
        line: usize,
        span: Span,
    },
    Read {
        prompt: String,
        target: String,
        line: usize,
        span: Span,
    },
    Write {
        items: Vec<Operand>,
        line: usize,
        span: Span,
    },
    Loop {
        count: Operand,
        body: Vec<Stmt>,
        line: usize,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::BlankLine { span, .. } => span,
            Stmt::Declaration { span, .. } => span,
            Stmt::Assign { span, .. } => span,
            Stmt::Arithmetic { span, .. } => span,
            Stmt::Read { span, .. } => span,
            Stmt::Write { span, .. } => span,
            Stmt::Loop { span, .. } => span,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Stmt::BlankLine { line, .. } => *line,
            Stmt::Declaration { line, .. } => *line,
            Stmt::Assign { line, .. } => *line,
            Stmt::Arithmetic { line, .. } => *line,
            Stmt::Read { line, .. } => *line,
            Stmt::Write { line, .. } => *line,
            Stmt::Loop { line, .. } => *line,
        }
    }
}
