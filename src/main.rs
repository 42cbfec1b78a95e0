use clap::Parser;
use log::Level;
use star::runner::{self, RunConfig, DEFAULT_OUTPUT_LOG, DEFAULT_SCRIPT};
use star::start_repl;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Interpreter for STAR, a small teaching language with int and text
/// variables, two-operand arithmetic and counted loops.
#[derive(Parser, Debug)]
#[command(name = "star", version, about, long_about = None)]
struct Args {
    /// The script file to execute
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Start in interactive REPL mode
    #[arg(short, long)]
    interactive: bool,

    /// File every `write` line is appended to
    #[arg(short, long, value_name = "PATH", env = "STAR_OUTPUT_LOG", default_value = DEFAULT_OUTPUT_LOG)]
    output_log: PathBuf,

    /// Do not keep an output log
    #[arg(long)]
    no_log: bool,

    /// Raise diagnostic verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> RunConfig {
        RunConfig {
            interactive: self.interactive && self.file.is_none(),
            script: self.file.unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT)),
            output_log: (!self.no_log).then_some(self.output_log),
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Error: could not install logger: {}", e);
    }

    let config = args.into_config();

    let log = match config.open_log() {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: cannot open output log: {}", e);
            process::exit(1);
        }
    };

    if config.interactive {
        start_repl(log);
    } else {
        run_file(&config.script, log);
    }
}

fn run_file(path: &Path, log: star::OutputLog) {
    if !path.exists() {
        eprintln!("Cannot open file: {}", path.display());
        process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            if runner::run(&source, Some(&filename), log).is_err() {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}
