use crate::error::StarError;
use crate::interpreter::Interpreter;
use crate::output_log::OutputLog;
use crate::parser::Parser;
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Script run when no file is named on the command line.
pub const DEFAULT_SCRIPT: &str = "testCases.sta";
pub const DEFAULT_OUTPUT_LOG: &str = "output.txt";

/// Everything the command line decides about a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub script: PathBuf,
    pub interactive: bool,
    /// `None` disables the output log.
    pub output_log: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            script: PathBuf::from(DEFAULT_SCRIPT),
            interactive: false,
            output_log: Some(PathBuf::from(DEFAULT_OUTPUT_LOG)),
        }
    }
}

impl RunConfig {
    pub fn open_log(&self) -> io::Result<OutputLog> {
        match &self.output_log {
            Some(path) => OutputLog::open(path),
            None => Ok(OutputLog::disabled()),
        }
    }
}

/// Run a whole script on the process console, reporting the first error.
pub fn run(source: &str, filename: Option<&str>, log: OutputLog) -> Result<(), StarError> {
    info!("running {}", filename.unwrap_or("<input>"));

    let stdin = io::stdin();
    let mut interpreter = Interpreter::new(stdin.lock(), io::stdout(), log);
    let result = execute_source(source, &mut interpreter);

    if let Err(ref error) = result {
        error.report(source, filename);
    }
    result
}

/// Parse and execute statement by statement, so everything before a
/// failing statement has already taken effect when the error surfaces.
pub fn execute_source<R: BufRead, W: Write, L: Write>(
    source: &str,
    interpreter: &mut Interpreter<R, W, L>,
) -> Result<(), StarError> {
    let mut parser = Parser::from_source(source);
    let mut executed = 0usize;

    while let Some(stmt) = parser.next_statement()? {
        interpreter.execute(&stmt)?;
        executed += 1;
    }

    info!("finished after {} top-level statements", executed);
    Ok(())
}
