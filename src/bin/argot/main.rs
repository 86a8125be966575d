//! Command-line interface for argot
//! This binary exercises the engine against a built-in demo command set.
//!
//! Usage:
//!   argot check `<line>`     - Validate a command line, print the match report as JSON
//!   argot complete `<line>`  - Print autocomplete output for a partial line as JSON
//!   argot forms            - List every command's accepted argument forms
mod commandset;

use argot::argot::Completion;
use clap::{Arg, Command};
use serde_json::json;

fn main() {
    let matches = Command::new("argot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A grammar-driven command-argument engine, demo driver")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check")
                .about("Validate a command line against the demo command set")
                .arg(
                    Arg::new("line")
                        .help("The full command line, e.g. 'go north 3'")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("complete")
                .about("Compute autocomplete output for a partial command line")
                .arg(
                    Arg::new("line")
                        .help("The partial command line, e.g. 'go no'")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("forms").about("List accepted argument forms per command"))
        .get_matches();

    if let Err(e) = commandset::register_all() {
        eprintln!("Registration error: {}", e);
        std::process::exit(1);
    }

    match matches.subcommand() {
        Some(("check", check_matches)) => {
            let line = check_matches.get_one::<String>("line").unwrap();
            handle_check_command(line);
        }
        Some(("complete", complete_matches)) => {
            let line = complete_matches.get_one::<String>("line").unwrap();
            handle_complete_command(line);
        }
        Some(("forms", _)) => {
            handle_forms_command();
        }
        _ => unreachable!(),
    }
}

/// Handle the check command
fn handle_check_command(line: &str) {
    let Some((command, args)) = split_command(line) else {
        eprintln!("Error: empty command line");
        std::process::exit(1);
    };

    let mut grammar = commandset::invoke(command).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let matched = grammar.validate(args).unwrap_or_else(|e| {
        eprintln!("Grammar defect: {}", e);
        std::process::exit(1);
    });

    let report = if matched {
        json!({
            "command": command,
            "matched": true,
            "alternative": grammar.matched_leaf_id().unwrap_or("?"),
        })
    } else {
        json!({
            "command": command,
            "matched": false,
            "error": grammar.last_error(),
        })
    };
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}

/// Handle the complete command
fn handle_complete_command(line: &str) {
    // Before the first separator the command word itself is the partial
    let command_complete = line.trim_start().contains(char::is_whitespace);

    let completion = if command_complete {
        let (command, args) = split_command(line).unwrap_or(("", ""));
        match commandset::invoke(command) {
            Ok(grammar) => grammar.prompt(args),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        let partial = line.trim();
        let names: Vec<String> = commandset::COMMANDS
            .iter()
            .filter(|name| name.starts_with(partial))
            .map(|name| name.to_string())
            .collect();
        Completion::Candidates(vec![argot::argot::CandidateGroup {
            source: "command".to_string(),
            candidates: names,
        }])
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&completion).unwrap()
    );
}

/// Handle the forms command
fn handle_forms_command() {
    for &command in commandset::COMMANDS {
        let grammar = commandset::invoke(command).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        for path in grammar.leaf_paths() {
            println!("{} {}", command, path);
        }
    }
}

/// Split a line into the command word and the remaining argument line
fn split_command(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    let command = trimmed.split_whitespace().next()?;
    let rest = &trimmed[command.len()..];
    Some((command, rest.trim_start_matches(' ')))
}
