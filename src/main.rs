// sprig - A small Lisp: reader, tree-walking evaluator and namespaces
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use sprig_core::{Error, Runtime, RuntimeOptions};
use sprig_reader::read_all;
use tracing_subscriber::EnvFilter;

/// Evaluation recurses on the host stack; give it room.
const STACK_SIZE: usize = 256 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "sprig", version, about = "A small Lisp with namespaces")]
struct Cli {
    /// Source files to evaluate, in order
    files: Vec<PathBuf>,

    /// Evaluate an expression and print the result
    #[arg(short, long)]
    eval: Option<String>,

    /// Add a directory to the require search path
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    include: Vec<PathBuf>,

    /// Skip the bootstrap macros
    #[arg(long)]
    no_prelude: bool,

    /// Deepest evaluation nesting before an error is raised
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let worker = thread::Builder::new()
        .name("sprig".into())
        .stack_size(STACK_SIZE)
        .spawn(move || run(cli));
    match worker.map(thread::JoinHandle::join) {
        Ok(Ok(code)) => code,
        Ok(Err(_)) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: failed to start evaluator thread: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> ExitCode {
    let mut options = RuntimeOptions::from_env();
    options.load_paths.extend(cli.include.iter().cloned());
    options.prelude = !cli.no_prelude;
    options.max_stack = STACK_SIZE - STACK_SIZE / 8;
    if let Some(depth) = cli.max_depth {
        options.max_depth = depth;
    }
    options.args = cli.files.iter().map(|f| f.display().to_string()).collect();

    let runtime = match Runtime::with_options(options) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for file in &cli.files {
        tracing::debug!(file = %file.display(), "running file");
        if let Err(e) = runtime.run_file(file) {
            report(&runtime, &e);
            return ExitCode::FAILURE;
        }
    }

    if let Some(expr) = &cli.eval {
        return match runtime.eval_str(expr) {
            Ok(value) => {
                println!("{}", value);
                ExitCode::SUCCESS
            }
            Err(e) => {
                report(&runtime, &e);
                ExitCode::FAILURE
            }
        };
    }

    if cli.files.is_empty() {
        repl(&runtime);
    }
    ExitCode::SUCCESS
}

/// Print an uncaught error and the call trace that led to it.
fn report(runtime: &Runtime, err: &Error) {
    eprintln!("Error: {}", err);
    eprint!("{}", runtime.last_trace());
}

/// Line REPL: reads until the buffered text holds complete forms.
fn repl(runtime: &Runtime) {
    println!("sprig {}", env!("CARGO_PKG_VERSION"));
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            format!("{}=> ", runtime.current_ns().name())
        } else {
            "... ".to_string()
        };
        print!("{}", prompt);
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => buffer.push_str(&line),
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }

        // Keep reading while a form is still open
        if let Err(e) = read_all(&buffer, Some("<repl>"))
            && e.message.contains("EOF")
        {
            continue;
        }
        let input = std::mem::take(&mut buffer);
        if input.trim().is_empty() {
            continue;
        }
        match runtime.eval_str(&input) {
            Ok(value) => println!("{}", value),
            Err(e) => report(runtime, &e),
        }
    }
}
