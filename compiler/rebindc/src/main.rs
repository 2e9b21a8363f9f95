//! rebind CLI
//!
//! Rewrites host sources so their calls become interceptable.

use std::error::Error;
use std::path::{Path, PathBuf};

use rebindc::commands::{lex_source, read_file, rewrite_file, CommandError, RewriteOptions};

fn main() {
    rebindc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "rewrite" => {
            let mut options = RewriteOptions::default();
            let mut file = None;
            let mut i = 2;
            while i < args.len() {
                if args[i] == "--config" {
                    let Some(path) = args.get(i + 1) else {
                        eprintln!("error: --config needs a path");
                        std::process::exit(1);
                    };
                    options.config = Some(PathBuf::from(path));
                    i += 2;
                } else if let Some(path) = args[i].strip_prefix("--config=") {
                    options.config = Some(PathBuf::from(path));
                    i += 1;
                } else if !args[i].starts_with('-') && file.is_none() {
                    file = Some(PathBuf::from(&args[i]));
                    i += 1;
                } else {
                    eprintln!("error: unexpected argument '{}'", args[i]);
                    std::process::exit(1);
                }
            }

            let Some(file) = file else {
                eprintln!("Usage: rebind rewrite <file> [--config <path>]");
                std::process::exit(1);
            };
            match rewrite_file(&file, &options) {
                Ok(outcome) => print!("{}", outcome.text()),
                Err(error) => fail(&error),
            }
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: rebind lex <file>");
                std::process::exit(1);
            }
            match read_file(Path::new(&args[2])) {
                Ok(code) => print!("{}", lex_source(&args[2], &code)),
                Err(error) => fail(&error),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("rebind {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn fail(error: &CommandError) -> ! {
    eprintln!("error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    std::process::exit(1);
}

fn print_usage() {
    println!("rebind: source rewriting for call interception");
    println!();
    println!("Usage: rebind <command> [options]");
    println!();
    println!("Commands:");
    println!("  rewrite <file>       Print the rewritten source");
    println!("  lex <file>           Tokenize and display tokens");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Rewrite options:");
    println!("  --config <path>      Use this config instead of the nearest rebind.json");
    println!();
    println!("Set REBIND_LOG (e.g. REBIND_LOG=debug) to enable logging.");
}
