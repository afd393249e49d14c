use std::io::{BufReader, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anodec_drv::repl::Repl;
use anodec_drv::Compiler;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<bool> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [] => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                let mut repl = Repl::new();
                let mut input = BufReader::new(stdin.lock());
                let mut output = std::io::stdout();
                repl.run(&mut input, &mut output)?;
                Ok(true)
            } else {
                // Piped input: treat it as a script.
                let mut source = String::new();
                stdin.lock().read_to_string(&mut source)?;
                let mut compiler = Compiler::new();
                let outcome = compiler.compile_module("stdin", &source);
                for diagnostic in &outcome.diagnostics {
                    eprintln!("{}", diagnostic);
                }
                Ok(outcome.succeeded())
            }
        }
        [path] => {
            let mut compiler = Compiler::new();
            compiler.run_file(&PathBuf::from(path))
        }
        _ => {
            eprintln!("usage: anode [script]");
            Ok(false)
        }
    }
}
