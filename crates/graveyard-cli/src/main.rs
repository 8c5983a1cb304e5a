use std::{env, process::ExitCode};

use graveyard::{Runner, StdPrint, StdScan};

const USAGE: &str = "usage: graveyard <file.graveyard> [S|T|P|E|M|D]

modes:
  S  print the resolved source (comments stripped, libraries spliced)
  T  print the token stream
  P  print the syntax tree
  E  execute (default)
  M  execute, then dump the monolith
  D  reserved";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(file_path) = args.get(1) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };
    let mode = args.get(2).map_or("E", String::as_str);

    let runner = match Runner::from_file(file_path) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let result = match mode {
        "S" => {
            println!("{}", runner.resolved_source());
            Ok(())
        }
        "T" => runner.tokens().map(|tokens| {
            for token in tokens {
                println!("({:?}, {:?})", token.kind, token.lexeme);
            }
        }),
        "P" => runner.nodes().map(|nodes| {
            for node in nodes {
                println!("{node:#?}");
            }
        }),
        "E" => runner.execute(&mut StdPrint, &mut StdScan),
        "M" => runner.execute_with_dump(&mut StdPrint, &mut StdScan).map(|dump| {
            println!("{dump}");
        }),
        "D" => {
            eprintln!("mode D is reserved");
            Ok(())
        }
        other => {
            eprintln!("unknown mode: {other}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
