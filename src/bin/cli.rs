//! KeelDB - interactive shell
//!
//! ```bash
//! # Start the shell over a snapshot file (created on exit)
//! keeldb --file shop.json
//!
//! # Run statements and exit
//! keeldb --file shop.json -c "SELECT * FROM items"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use keeldb::{Session, ShellConfig};

/// Continuation prompt for multi-line statements
const CONTINUATION_PROMPT: &str = "   ...> ";

/// KeelDB interactive shell
#[derive(Parser, Debug)]
#[command(name = "keeldb", version, about = "In-memory relational engine shell")]
struct Args {
    /// Name for a new database
    #[arg(short = 'd', long, default_value = "main")]
    database: String,

    /// JSON snapshot to load on start and save on exit
    #[arg(short = 'f', long, value_name = "FILE", env = "KEELDB_FILE")]
    file: Option<PathBuf>,

    /// Do not write the snapshot on exit
    #[arg(long)]
    no_autosave: bool,

    /// Execute statements and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// Print welcome banner
fn print_banner() {
    println!("KeelDB v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'HELP' for help, 'EXIT' to quit.\n");
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  HELP               Show this help message
  EXIT, QUIT         Leave the shell (saves the snapshot)

Statements (end with ';'):
  CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT UNIQUE);
  DROP TABLE t;
  INSERT INTO t [(cols)] VALUES (..), (..);
  SELECT * | cols FROM t [JOIN t2 ON t.a = t2.b] [WHERE cond];
  UPDATE t SET col = value, ... [WHERE cond];
  DELETE FROM t [WHERE cond];
  SHOW TABLES;
  DESCRIBE t;

Conditions:
  col = | <> | != | < | <= | > | >= literal, col IS [NOT] NULL,
  combined with AND, OR, NOT and parentheses
"#
    );
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("keeldb=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Args) -> ShellConfig {
    let config = ShellConfig::new()
        .database(args.database.clone())
        .autosave(!args.no_autosave);
    match &args.file {
        Some(path) => config.snapshot(path.clone()),
        None => config,
    }
}

/// Run statements, printing each result as it completes; true if all succeeded
fn execute_and_print(session: &mut Session, sql: &str) -> bool {
    match session.execute_each(sql, |result| print!("{}", result.render())) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}

fn save(session: &Session, config: &ShellConfig) -> Result<()> {
    if let Some(path) = config.autosave_path() {
        session
            .database()
            .save_to_disk(path)
            .with_context(|| format!("failed to save snapshot to {}", path.display()))?;
        debug!(path = %path.display(), "autosaved");
    }
    Ok(())
}

fn run_repl(session: &mut Session, config: &ShellConfig) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    if let Some(path) = &config.history_file {
        if path.exists() {
            let _ = editor.load_history(path);
        }
    }

    print_banner();

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() {
            config.prompt.as_str()
        } else {
            CONTINUATION_PROMPT
        };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if buffer.is_empty() {
                    let command = trimmed.trim_end_matches(';').to_uppercase();
                    match command.as_str() {
                        "" => continue,
                        "EXIT" | "QUIT" => break,
                        "HELP" => {
                            print_help();
                            continue;
                        }
                        _ => {}
                    }
                }

                buffer.push_str(&line);
                buffer.push('\n');
                if trimmed.ends_with(';') {
                    let _ = editor.add_history_entry(buffer.trim());
                    execute_and_print(session, &buffer);
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                error!("Readline error: {}", e);
                break;
            }
        }
    }

    if !buffer.trim().is_empty() {
        execute_and_print(session, &buffer);
    }
    if let Some(path) = &config.history_file {
        let _ = editor.save_history(path);
    }

    println!("Goodbye!");
    Ok(())
}

fn run() -> Result<bool> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args);
    let db = config.open().context("failed to open database")?;
    let mut session = Session::new(db);

    let ok = match &args.command {
        Some(sql) => execute_and_print(&mut session, sql),
        None => {
            run_repl(&mut session, &config)?;
            true
        }
    };

    save(&session, &config)?;
    Ok(ok)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
