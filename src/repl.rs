use crate::interpreter::Interpreter;
use crate::output_log::OutputLog;
use crate::runner::execute_source;
use std::io::{self, BufRead, Write};

/// Interactive session: every entered line runs against one persistent
/// interpreter, so declarations survive between lines. Errors are reported
/// and the session continues.
pub fn start(log: OutputLog) {
    println!("STAR Interpreter v0.1.0");
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    // `read` statements and the prompt loop share one stdin lock.
    let stdin = io::stdin();
    let mut interpreter = Interpreter::new(stdin.lock(), io::stdout(), log);

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match interpreter.input_mut().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, &mut interpreter);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command<R: BufRead, W: Write, L: Write>(
    source: &str,
    interpreter: &mut Interpreter<R, W, L>,
) {
    if let Err(error) = execute_source(source, interpreter) {
        error.report(source, None);
    }
}
