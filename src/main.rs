use std::env;
use std::fs;
use std::process::ExitCode;

use serde::Serialize;

use sqlscript::{parameterize, ScriptSplitter, SplitOptions};

#[derive(Serialize)]
struct StatementRecord {
    sql: String,
    parameters: Vec<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let mut options = SplitOptions::default();
    let mut path: Option<String> = None;
    for arg in env::args().skip(1) {
        if arg == "--strict" {
            options.strict_blocks = true;
        } else if path.is_none() {
            path = Some(arg);
        } else {
            eprintln!("Usage: sqlscript [--strict] <script.sql>");
            return ExitCode::FAILURE;
        }
    }
    let path = match path {
        Some(path) => path,
        None => {
            eprintln!("Usage: sqlscript [--strict] <script.sql>");
            return ExitCode::FAILURE;
        }
    };

    let script = match fs::read_to_string(&path) {
        Ok(script) => script,
        Err(err) => {
            eprintln!("Cannot read {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    for item in ScriptSplitter::with_options(&script, options) {
        let statement = match item {
            Ok(statement) => statement,
            Err(err) => {
                // A splitter failure is fatal to the script; statements
                // already printed stay usable for the caller.
                eprintln!("Script error: {}", err);
                return ExitCode::FAILURE;
            }
        };
        let rewritten = parameterize(&statement);
        let record = StatementRecord {
            sql: rewritten.sql,
            parameters: rewritten.names,
        };
        match serde_json::to_string(&record) {
            Ok(line) => println!("{}", line),
            Err(err) => {
                eprintln!("Output error: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
