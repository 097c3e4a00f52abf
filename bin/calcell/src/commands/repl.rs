use calcell_core::{Config, Paths};
use calcell_ops::Calculator;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

use super::calc::{evaluate, parse_postfix, print_outcome};
use super::history_cmd::{add_parts, clear_all, delete_at, load_into, print_detail, print_lines, save_from};
use super::menu::print_menu;
use super::open_calculator;

/// One line of the calculator shell.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellLine {
    Empty,
    Exit,
    Help,
    Menu,
    Reload,
    History(Limit),
    HistoryDetail(Limit),
    HistoryMode,
    HistoryLoad(Option<String>),
    HistorySave(Option<String>),
    HistoryClear,
    HistoryDelete(Option<String>),
    Calculate(Vec<String>),
}

fn parse_shell_line(line: &str) -> ShellLine {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = parts.first() else {
        return ShellLine::Empty;
    };
    let arg = parts.get(1).map(|s| s.to_string());
    match first.to_lowercase().as_str() {
        "exit" | "quit" => ShellLine::Exit,
        "help" => ShellLine::Help,
        "menu" => ShellLine::Menu,
        "reload" => ShellLine::Reload,
        "history" => ShellLine::History(parse_limit(arg.as_deref())),
        "history-detail" => ShellLine::HistoryDetail(parse_limit(arg.as_deref())),
        "history-mode" => ShellLine::HistoryMode,
        "history-load" => ShellLine::HistoryLoad(arg),
        "history-save" => ShellLine::HistorySave(arg),
        "history-clear" => ShellLine::HistoryClear,
        "history-delete" => ShellLine::HistoryDelete(arg),
        _ => ShellLine::Calculate(parts.iter().map(|s| s.to_string()).collect()),
    }
}

/// One line of the nested `history>` shell.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HistoryLine {
    Empty,
    Exit,
    Help,
    Load(Option<String>),
    Save(Option<String>),
    Add(Vec<String>),
    Clear,
    Delete(Option<String>),
    Show(Limit),
    Detail(Limit),
    Unknown(String),
}

fn parse_history_line(line: &str) -> HistoryLine {
    let mut split = line.trim().splitn(2, char::is_whitespace);
    let command = match split.next() {
        Some(c) if !c.is_empty() => c.to_lowercase(),
        _ => return HistoryLine::Empty,
    };
    let args = split.next().map(str::trim).filter(|a| !a.is_empty());
    match command.as_str() {
        "exit" => HistoryLine::Exit,
        "help" => HistoryLine::Help,
        "load" => HistoryLine::Load(args.map(String::from)),
        "save" => HistoryLine::Save(args.map(String::from)),
        "add" => HistoryLine::Add(
            args.map(|a| a.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
        ),
        "clear" => HistoryLine::Clear,
        "delete" => HistoryLine::Delete(args.map(String::from)),
        "show" => HistoryLine::Show(parse_limit(args)),
        "detail" => HistoryLine::Detail(parse_limit(args)),
        _ => HistoryLine::Unknown(command),
    }
}

/// Optional record limit given to a history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Limit {
    All,
    Last(usize),
    Invalid(String),
}

fn parse_limit(arg: Option<&str>) -> Limit {
    match arg {
        None => Limit::All,
        Some(arg) => arg
            .parse()
            .map(Limit::Last)
            .unwrap_or_else(|_| Limit::Invalid(arg.to_string())),
    }
}

/// An invalid limit falls back to every record.
fn resolve_limit(limit: Limit) -> Option<usize> {
    match limit {
        Limit::All => None,
        Limit::Last(n) => Some(n),
        Limit::Invalid(arg) => {
            println!("Invalid limit: {}, showing all records", arg);
            None
        }
    }
}

fn print_help(paths: &Paths, config: &Config) {
    println!();
    println!("Basic Commands:");
    println!("  <a> <b> <operation>      Calculate in postfix notation, e.g. 4 3 add");
    println!("  menu                     List available operations");
    println!("  reload                   Rediscover operation plugins");
    println!("  help                     Show this help message");
    println!("  exit                     Exit the program");
    println!();
    println!("History Commands:");
    println!("  history [n]              Show calculation history");
    println!("  history-detail [n]       Show detailed history");
    println!("  history-mode             Enter history management mode");
    println!("  history-load [file]      Load history from file");
    println!("  history-save [file]      Save history to file");
    println!("  history-clear            Clear all calculation history");
    println!("  history-delete <index>   Delete a history record");
    println!();
    println!("Data directory: {}", paths.data_dir(config).display());
}

fn print_history_help(paths: &Paths, config: &Config) {
    println!();
    println!("History Management Commands:");
    println!("  load [file]              Load history (default: {})", config.history.csv_file);
    println!("  save [file]              Save history (default: {})", config.history.csv_file);
    println!("  add <op> <a> <b> <r>     Add a record to history");
    println!("  clear                    Clear all history");
    println!("  delete <index>           Delete record at index");
    println!("  show [limit]             Show formatted history records");
    println!("  detail [limit]           Show detailed history records");
    println!("  help                     Show this help message");
    println!("  exit                     Return to calculator");
    println!();
    println!("Data is stored in: {}", paths.data_dir(config).display());
}

/// Print `prompt` and read one line. `None` on end of input.
fn prompt<R: BufRead>(input: &mut R, prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn run(paths: &Paths, config: &Config) -> anyhow::Result<()> {
    let mut calc = open_calculator(paths, config)?;
    info!("Interactive mode started");

    println!("🧮 calcell - Interactive Mode");
    println!("Enter commands in postfix notation (e.g. '4 3 add')");
    println!("Type 'help' for more information, 'menu' to see available operations, or 'exit' to quit");

    let stdin = io::stdin();
    let mut input = stdin.lock();

    while let Some(line) = prompt(&mut input, "\n> ")? {
        match parse_shell_line(&line) {
            ShellLine::Empty => continue,
            ShellLine::Exit => break,
            ShellLine::Help => print_help(paths, config),
            ShellLine::Menu => print_menu(&calc),
            ShellLine::Reload => {
                let reports = calc.reload();
                let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
                println!("Reloaded plugins ({} discovery issues)", failures);
                print_menu(&calc);
            }
            ShellLine::History(limit) => print_lines(&calc, resolve_limit(limit)),
            ShellLine::HistoryDetail(limit) => {
                print_detail(&calc, config, resolve_limit(limit))
            }
            ShellLine::HistoryMode => history_mode(&mut calc, &mut input, paths, config)?,
            ShellLine::HistoryLoad(file) => load_into(&mut calc, paths, config, file.as_deref()),
            ShellLine::HistorySave(file) => save_from(&calc, paths, config, file.as_deref()),
            ShellLine::HistoryClear => clear_all(&mut calc),
            ShellLine::HistoryDelete(Some(index)) => delete_at(&mut calc, &index),
            ShellLine::HistoryDelete(None) => println!("Error: Please specify an index to delete"),
            ShellLine::Calculate(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                let outcome = parse_postfix(&parts).and_then(|p| evaluate(&mut calc, config, &p));
                print_outcome(&calc, outcome);
            }
        }
    }

    println!("Exiting...");
    info!("Interactive mode finished");
    Ok(())
}

fn history_mode<R: BufRead>(
    calc: &mut Calculator,
    input: &mut R,
    paths: &Paths,
    config: &Config,
) -> io::Result<()> {
    debug!("Entering history mode");
    println!();
    println!("History Management Mode");
    println!("Type 'help' for available commands or 'exit' to return to calculator");

    while let Some(line) = prompt(input, "history> ")? {
        match parse_history_line(&line) {
            HistoryLine::Empty => continue,
            HistoryLine::Exit => break,
            HistoryLine::Help => print_history_help(paths, config),
            HistoryLine::Load(file) => load_into(calc, paths, config, file.as_deref()),
            HistoryLine::Save(file) => save_from(calc, paths, config, file.as_deref()),
            HistoryLine::Add(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                add_parts(calc, &parts);
            }
            HistoryLine::Clear => clear_all(calc),
            HistoryLine::Delete(Some(index)) => delete_at(calc, &index),
            HistoryLine::Delete(None) => println!("Usage: delete <index>"),
            HistoryLine::Show(limit) => print_lines(calc, resolve_limit(limit)),
            HistoryLine::Detail(limit) => print_detail(calc, config, resolve_limit(limit)),
            HistoryLine::Unknown(command) => {
                println!("Unknown command: {}", command);
                print_history_help(paths, config);
            }
        }
    }

    println!("Returning to calculator");
    Ok(())
}
