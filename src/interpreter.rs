use crate::ast::{ArithOp, DataType, Declarator, Operand, Program, Stmt};
use crate::error::{Span, StarError};
use crate::lexer::MAX_INT_VALUE;
use crate::symbols::{SymbolError, SymbolTable, Variable};
use crate::value::Value;
use log::{debug, trace};
use std::io::{BufRead, Write};

/// Executes STAR statements against one symbol table.
///
/// Console input, console output and the output log are injected so the
/// binary can use the process streams while tests use in-memory buffers.
pub struct Interpreter<R, W, L> {
    symbols: SymbolTable,
    input: R,
    console: W,
    log: L,
    /// One frame per loop currently executing, innermost last.
    frames: Vec<LoopFrame>,
}

/// Pass bookkeeping for one executing loop.
#[derive(Debug, Clone, Copy)]
struct LoopFrame {
    target: u64,
    completed: u64,
}

impl LoopFrame {
    fn new(target: u64) -> Self {
        Self {
            target,
            completed: 0,
        }
    }

    fn is_done(&self) -> bool {
        self.completed >= self.target
    }

    /// Past the first pass, the body's declarations are being re-executed.
    fn is_replaying(&self) -> bool {
        self.completed > 0
    }
}

impl<R: BufRead, W: Write, L: Write> Interpreter<R, W, L> {
    pub fn new(input: R, console: W, log: L) -> Self {
        Self {
            symbols: SymbolTable::new(),
            input,
            console,
            log,
            frames: Vec::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The console input, shared with the REPL's own command reading.
    pub fn input_mut(&mut self) -> &mut R {
        &mut self.input
    }

    /// Hands back the console and log writers.
    pub fn into_parts(self) -> (W, L) {
        (self.console, self.log)
    }

    pub fn execute_program(&mut self, program: &Program) -> Result<(), StarError> {
        for stmt in &program.statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    pub fn execute(&mut self, stmt: &Stmt) -> Result<(), StarError> {
        trace!("line {}: executing", stmt.line());
        match stmt {
            Stmt::BlankLine { line, span } => {
                writeln!(self.console).map_err(|e| StarError::io(span.clone(), *line, &e))
            }
            Stmt::Declaration {
                data_type,
                declarators,
                line,
                ..
            } => {
                for declarator in declarators {
                    self.declare(*data_type, declarator, *line)?;
                }
                Ok(())
            }
            Stmt::Assign {
                target,
                value,
                line,
                span,
            } => self.assign(target, value, span, *line),
            Stmt::Arithmetic {
                target,
                left,
                operator,
                right,
                line,
                span,
            } => self.arithmetic(target, left, *operator, right, span, *line),
            Stmt::Read {
                prompt,
                target,
                line,
                span,
            } => self.read(prompt, target, span, *line),
            Stmt::Write { items, line, span } => self.write(items, span, *line),
            Stmt::Loop {
                count,
                body,
                line,
                ..
            } => self.run_loop(count, body, *line),
        }
    }

    fn declare(
        &mut self,
        data_type: DataType,
        declarator: &Declarator,
        line: usize,
    ) -> Result<(), StarError> {
        if self.frames.iter().any(LoopFrame::is_replaying) {
            self.symbols.redeclare(&declarator.name, data_type);
        } else {
            self.symbols
                .declare(&declarator.name, data_type)
                .map_err(|e| symbol_error(e, &declarator.name, &declarator.span, line))?;
        }
        debug!("declared {} {}", data_type, declarator.name);

        match &declarator.init {
            Some(init) => self.assign(&declarator.name, init, &declarator.span, line),
            None => Ok(()),
        }
    }

    fn assign(
        &mut self,
        target: &str,
        value: &Operand,
        span: &Span,
        line: usize,
    ) -> Result<(), StarError> {
        let target_type = self.variable(target, span, line)?.data_type;
        let value = self.resolve(value, line)?;

        if value.data_type() != target_type {
            return Err(StarError::semantic(
                span.clone(),
                line,
                "Invalid assignment!".to_string(),
            )
            .with_help(format!(
                "'{}' is declared {} but the value is {}.",
                target,
                target_type,
                value.type_name()
            )));
        }

        self.store(target, value, span, line)
    }

    fn arithmetic(
        &mut self,
        target: &str,
        left: &Operand,
        operator: ArithOp,
        right: &Operand,
        span: &Span,
        line: usize,
    ) -> Result<(), StarError> {
        let target_type = self.variable(target, span, line)?.data_type;
        let left = self.resolve(left, line)?;
        let right = self.resolve(right, line)?;

        for operand in [&left, &right] {
            if operand.data_type() != target_type {
                return Err(StarError::semantic(
                    span.clone(),
                    line,
                    "Invalid arithmetic assignment!".to_string(),
                )
                .with_help(format!(
                    "'{}' is declared {} so both operands must be {}.",
                    target, target_type, target_type
                )));
            }
        }

        let result = match (left, right) {
            (Value::Int(a), Value::Int(b)) => {
                Value::Int(int_arithmetic(a, operator, b, span, line)?)
            }
            (Value::Text(a), Value::Text(b)) => {
                Value::Text(text_arithmetic(a, operator, &b, span, line)?)
            }
            _ => {
                return Err(StarError::semantic(
                    span.clone(),
                    line,
                    "Invalid arithmetic assignment!".to_string(),
                ));
            }
        };

        self.store(target, result, span, line)
    }

    fn read(&mut self, prompt: &str, target: &str, span: &Span, line: usize) -> Result<(), StarError> {
        let current = self.variable(target, span, line)?.value.clone();
        let io_err = |e: std::io::Error| StarError::io(span.clone(), line, &e);

        write!(self.console, "{} {}", prompt, current).map_err(io_err)?;
        self.console.flush().map_err(io_err)?;

        let mut buffer = String::new();
        self.input.read_line(&mut buffer).map_err(io_err)?;
        let entered = buffer.trim_end_matches(['\n', '\r']).to_string();

        writeln!(self.console, "{}", entered).map_err(io_err)?;
        debug!("read {:?} into {}", entered, target);
        self.symbols
            .set_value(target, entered)
            .map_err(|e| symbol_error(e, target, span, line))
    }

    /// Each item goes on its own line, to the console and to the log.
    fn write(&mut self, items: &[Operand], span: &Span, line: usize) -> Result<(), StarError> {
        let io_err = |e: std::io::Error| StarError::io(span.clone(), line, &e);

        for item in items {
            let text = match item {
                Operand::Int { value, .. } => value.to_string(),
                Operand::Text { value, .. } => value.clone(),
                Operand::Variable { name, span } => self.variable(name, span, line)?.value.clone(),
            };
            writeln!(self.console, "{}", text).map_err(io_err)?;
            writeln!(self.log, "{}", text).map_err(io_err)?;
        }

        self.console.flush().map_err(io_err)?;
        self.log.flush().map_err(io_err)
    }

    fn run_loop(&mut self, count: &Operand, body: &[Stmt], line: usize) -> Result<(), StarError> {
        let passes = match self.resolve(count, line)? {
            Value::Int(n) => n,
            Value::Text(_) => {
                return Err(StarError::semantic(
                    count.span().clone(),
                    line,
                    "Invalid loop statement!".to_string(),
                )
                .with_help("The loop count must be an int."));
            }
        };

        debug!("line {}: loop of {} passes", line, passes);
        self.frames.push(LoopFrame::new(passes));
        let result = self.run_passes(body, line);
        self.frames.pop();
        result
    }

    /// Runs the body until the innermost frame reaches its target.
    fn run_passes(&mut self, body: &[Stmt], line: usize) -> Result<(), StarError> {
        loop {
            match self.frames.last() {
                Some(frame) if !frame.is_done() => {}
                _ => return Ok(()),
            }

            self.run_pass(body)?;

            if let Some(frame) = self.frames.last_mut() {
                frame.completed += 1;
                trace!("line {}: pass {} of {} done", line, frame.completed, frame.target);
            }
        }
    }

    fn run_pass(&mut self, body: &[Stmt]) -> Result<(), StarError> {
        for stmt in body {
            self.execute(stmt)?;
        }
        Ok(())
    }

    fn resolve(&self, operand: &Operand, line: usize) -> Result<Value, StarError> {
        match operand {
            Operand::Int { value, .. } => Ok(Value::Int(u64::from(*value))),
            Operand::Text { value, .. } => Ok(Value::Text(value.clone())),
            Operand::Variable { name, span } => {
                let variable = self.variable(name, span, line)?;
                variable.resolve().ok_or_else(|| {
                    StarError::semantic(
                        span.clone(),
                        line,
                        format!("Variable '{}' does not hold a valid integer!", name),
                    )
                    .with_help(format!("Its current value is {:?}.", variable.value))
                })
            }
        }
    }

    fn variable(&self, name: &str, span: &Span, line: usize) -> Result<&Variable, StarError> {
        self.symbols
            .lookup(name)
            .map_err(|e| symbol_error(e, name, span, line))
    }

    fn store(&mut self, target: &str, value: Value, span: &Span, line: usize) -> Result<(), StarError> {
        self.symbols
            .set_value(target, value.into_stored())
            .map_err(|e| symbol_error(e, target, span, line))
    }
}

fn symbol_error(error: SymbolError, name: &str, span: &Span, line: usize) -> StarError {
    match error {
        SymbolError::Undeclared => StarError::semantic(
            span.clone(),
            line,
            format!("Undeclared variable '{}'!", name),
        )
        .with_help(format!("Declare it first: int {} or text {}.", name, name)),
        SymbolError::AlreadyDeclared => StarError::semantic(
            span.clone(),
            line,
            format!("Variable '{}' is already declared!", name),
        )
        .with_help(format!("Assign a new value instead: {} is ...", name)),
    }
}

fn int_arithmetic(a: u64, operator: ArithOp, b: u64, span: &Span, line: usize) -> Result<u64, StarError> {
    match operator {
        ArithOp::Add => {
            let sum = a + b;
            if sum > MAX_INT_VALUE {
                return Err(StarError::semantic(
                    span.clone(),
                    line,
                    "Integer value is too big!".to_string(),
                )
                .with_help(format!("Integers range from 0 to {}.", MAX_INT_VALUE)));
            }
            Ok(sum)
        }
        ArithOp::Subtract => a.checked_sub(b).ok_or_else(|| {
            StarError::semantic(
                span.clone(),
                line,
                "The answer cannot be negative!".to_string(),
            )
        }),
    }
}

/// `+` concatenates; `-` removes the first occurrence of `b` from `a`.
fn text_arithmetic(a: String, operator: ArithOp, b: &str, span: &Span, line: usize) -> Result<String, StarError> {
    match operator {
        ArithOp::Add => Ok(a + b),
        ArithOp::Subtract => {
            if b.chars().count() > a.chars().count() {
                return Err(StarError::semantic(
                    span.clone(),
                    line,
                    "The subtrahend cannot be longer than the minuend!".to_string(),
                ));
            }
            Ok(a.replacen(b, "", 1))
        }
    }
}
