//! Command-line driver for the WXX scripting core.
//!
//! With no arguments it starts an interactive REPL. Given a `.wxxsh` file
//! it runs the script; given anything else it treats the arguments as one
//! inline statement. Scripts must use the `.wxxsh` extension so they can
//! never be confused with Worldographer data files (`.wxx`).

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use wxx_dsl::document::MapRoot;
use wxx_dsl::{check, parse, parse_file, Vm};

fn main() -> ExitCode {
    let mut debug = false;
    let mut show_version = false;
    let mut rest: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--debug" => debug = true,
            "--version" => show_version = true,
            _ => rest.push(arg),
        }
    }

    setup_logging(debug);

    if show_version {
        println!("wxx-repl {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    if rest.is_empty() {
        repl()
    } else {
        batch(&rest)
    }
}

fn setup_logging(debug: bool) {
    let level = if debug { log::LevelFilter::Debug } else { log::LevelFilter::Warn };
    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}][{}] {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply();
    if let Err(err) = result {
        eprintln!("warning: could not initialize logging: {err}");
    }
}

// ─── Batch mode ──────────────────────────────────────────────────────────────

fn batch(args: &[String]) -> ExitCode {
    let first = &args[0];
    let (source, filename) = if first.contains('.') {
        // Anything with a dot is a filename, and only .wxxsh is accepted.
        if !first.ends_with(".wxxsh") {
            eprintln!("error: script files must have .wxxsh extension (got: {first})");
            eprintln!("this keeps scripts distinct from Worldographer data files (.wxx)");
            return ExitCode::FAILURE;
        }
        match std::fs::read_to_string(first) {
            Ok(text) => (text, Some(first.clone())),
            Err(err) => {
                eprintln!("error: reading {first}: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        // Inline statement mode; join the arguments back together.
        (args.join(" "), None)
    };

    log::debug!("executing: {source}");

    let parsed = match &filename {
        Some(name) => parse_file(&source, name),
        None => parse(&source),
    };
    let program = match parsed {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("parsed {} statement(s)", program.statements.len());

    let diagnostics = check(&program);
    if !diagnostics.is_empty() {
        for err in &diagnostics {
            eprintln!("error: {err}");
        }
        return ExitCode::FAILURE;
    }

    let mut vm = match filename {
        Some(name) => Vm::with_filename(name),
        None => Vm::new(),
    };
    let mut doc = MapRoot::mock();
    let result = vm.execute(&program, &mut doc);
    for line in vm.take_output() {
        println!("{line}");
    }
    if let Err(err) = result {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    log::debug!("execution completed");
    ExitCode::SUCCESS
}

// ─── Interactive mode ────────────────────────────────────────────────────────

fn repl() -> ExitCode {
    println!("WXX DSL REPL - type `$exit` to quit");

    let mut vm = Vm::new();
    let mut doc = MapRoot::mock();
    let mut pending: Vec<String> = Vec::new();

    let stdin = io::stdin();
    loop {
        let prompt = if pending.is_empty() { "> " } else { ". " };
        print!("{prompt}");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return ExitCode::SUCCESS,
            Ok(_) => {}
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(command) = trimmed.strip_prefix('$') {
            if !handle_command(command, &vm, &doc) {
                return ExitCode::SUCCESS;
            }
            continue;
        }

        pending.push(line.trim_end().to_string());
        if !block_complete(&pending) {
            continue;
        }
        let input = pending.join("\n");
        pending.clear();
        run_turn(&mut vm, &mut doc, &input);
    }
}

fn run_turn(vm: &mut Vm, doc: &mut MapRoot, input: &str) {
    let program = match parse(input) {
        Ok(program) => program,
        Err(err) => {
            println!("Syntax error: {err}");
            return;
        }
    };

    let diagnostics = check(&program);
    if !diagnostics.is_empty() {
        for err in &diagnostics {
            println!("Check error: {err}");
        }
        return;
    }

    let result = vm.execute(&program, doc);
    for line in vm.take_output() {
        println!("{line}");
    }
    if let Err(err) = result {
        println!("Runtime error: {err}");
    }
}

/// Crude block detection: the turn is complete once there are at least as
/// many `end`s as `if`/`for` openers. Good enough until the parser can
/// report recoverable "incomplete input" errors.
fn block_complete(lines: &[String]) -> bool {
    let text = lines.join("\n");
    let lowered = text.to_ascii_lowercase();
    let opens = lowered.matches("if").count() + lowered.matches("for").count();
    let closes = lowered.matches("end").count();
    closes >= opens
}

/// Returns false when the REPL should exit.
fn handle_command(command: &str, vm: &Vm, doc: &MapRoot) -> bool {
    let mut words = command.split_whitespace();
    let Some(name) = words.next() else {
        return true;
    };
    match name {
        "exit" => false,
        "debug" => {
            match words.next() {
                Some("on") => {
                    log::set_max_level(log::LevelFilter::Debug);
                    println!("Debug mode now enabled");
                }
                Some("off") => {
                    log::set_max_level(log::LevelFilter::Warn);
                    println!("Debug mode now disabled");
                }
                _ => {
                    if log::max_level() >= log::LevelFilter::Debug {
                        println!("Debug mode is enabled");
                    } else {
                        println!("Debug mode is disabled");
                    }
                }
            }
            true
        }
        "vars" => {
            let mut names: Vec<&String> = vm.vars().keys().collect();
            names.sort();
            for name in names {
                println!("{name}");
            }
            true
        }
        "hexes" => {
            for (i, hex) in doc.hexes.iter().enumerate() {
                println!("hexes[{i}] = {}", hex.terrain);
            }
            true
        }
        other => {
            println!("Unknown REPL command: {other}");
            true
        }
    }
}
