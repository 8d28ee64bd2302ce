//! tupl - command-line interface
//!
//! Runs a single source file, printing its output to stdout. Errors are
//! reported on stderr and end the process with exit code 1.

use std::env;
use std::path::Path;
use std::process;

use tupl_rs::{DummyLogger, FileLogger, Logger, Runtime, RuntimeConfig};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        print_usage(args.first().map(String::as_str).unwrap_or("tupl"));
        process::exit(1);
    }

    // Setting TUPL_LOG to a path enables logging to that file
    let logger: Box<dyn Logger> = match env::var_os("TUPL_LOG") {
        Some(path) => match FileLogger::create(Path::new(&path)) {
            Ok(logger) => Box::new(logger),
            Err(e) => {
                eprintln!("Error: failed to create log file: {}", e);
                process::exit(1);
            }
        },
        None => Box::new(DummyLogger),
    };

    let mut runtime = Runtime::new(logger, std::io::stdout(), RuntimeConfig::default());
    if let Err(e) = runtime.run_file(Path::new(&args[1])) {
        eprint!("{}", e);
        process::exit(1);
    }

    runtime.destroy_everything();
}

fn print_usage(program: &str) {
    eprintln!("tupl");
    eprintln!("Usage: {} <source_file>", program);
}
