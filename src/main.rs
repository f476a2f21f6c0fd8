//! Basil - the command-line driver for the Basil compiler front end.

use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use basil::lexer::{TokenKind, TokenStream};
use basil::module::Loader;

/// Basil - a BASIC-like language compiler
#[derive(Parser, Debug)]
#[command(name = "basil")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input Basil source file (.bas)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Only run the tokenizer and print the token stream (for debugging)
    #[arg(long)]
    tokens: bool,

    /// Load and resolve the script without executing it
    #[arg(long)]
    parse_only: bool,

    /// Directory searched for system-wide modules
    #[arg(long, value_name = "DIR")]
    system_path: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if args.tokens {
        return dump_tokens(&args.input);
    }

    let mut loader = Loader::new();

    if let Some(system_path) = &args.system_path {
        if let Err(error) = loader.set_system_path(system_path) {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    }

    let module = match loader.get_script(&args.input) {
        Ok(module) => module,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    if args.parse_only {
        println!("ok: module {} resolved", module.name());
        return ExitCode::SUCCESS;
    }

    ExitCode::from(module.execute().clamp(0, u8::MAX as i32) as u8)
}

/// Prints the token stream of one file, one token per line.
fn dump_tokens(input: &PathBuf) -> ExitCode {
    let text = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("error: could not read {}: {error}", input.display());
            return ExitCode::FAILURE;
        }
    };

    let mut stream = TokenStream::with_path(&text, input.clone());

    loop {
        match stream.next() {
            Ok(token) if token.kind == TokenKind::Eof => return ExitCode::SUCCESS,
            Ok(token) => println!("{} {}", token.location, token),
            Err(error) => {
                eprintln!("error: {error}");
                return ExitCode::FAILURE;
            }
        }
    }
}
