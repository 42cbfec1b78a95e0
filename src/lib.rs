// STAR Language Interpreter Library
//
// Core of the STAR interpreter: a small teaching language with typed int and
// text variables, two-operand arithmetic, console I/O and counted loops.

// Public modules
pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod output_log;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod symbols;
pub mod value;

// Re-export commonly used items
pub use ast::{DataType, Operand, Program, Stmt};
pub use error::{ErrorKind, Span, StarError};
pub use interpreter::Interpreter;
pub use lexer::{Lexer, Token, TokenKind};
pub use output_log::OutputLog;
pub use parser::Parser;
pub use symbols::{SymbolTable, Variable};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{execute_source, run, RunConfig};
