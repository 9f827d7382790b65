use aks::cli::{generate_completions, Args, Commands};
use aks::config::AppConfig;
use aks::diagnostic::{render_diagnostics, Diagnostic};
use aks::format;
use aks::interpreter::{parse, Interpreter};
use aks::lexer::{tokenize, tokenize_from};
use aks::token::TokenKind;
use aks::{Error, Stmt, Value};
use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::OwoColorize;
use std::path::Path;

/// Prints library and driver log lines to stderr as `[aks:level] message`.
struct VerboseLogger;

impl Log for VerboseLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[aks:{}] {}",
                record.level().as_str().to_lowercase(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: VerboseLogger = VerboseLogger;

fn init_logging(verbose: bool) {
    if !verbose {
        log::set_max_level(LevelFilter::Off);
        return;
    }
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    init_logging(config.verbose);
    log::debug!("Starting aks");

    let (source, file_name, echo_result) = if let Some(path) = &args.script {
        match read_file(path) {
            Ok(source) => (source, path.display().to_string(), false),
            Err(e) => {
                error_message(&config, &e);
                std::process::exit(1);
            }
        }
    } else if let Some(code) = &args.eval {
        (code.clone(), "<eval>".to_string(), true)
    } else {
        let status = run_repl(&config);
        std::process::exit(status);
    };

    log::debug!("Read {} bytes from {}", source.len(), file_name);
    let status = run_script(&source, &file_name, echo_result, &config);
    std::process::exit(status);
}

/// Runs a whole program, returning the process exit status.
fn run_script(source: &str, file_name: &str, echo_result: bool, config: &AppConfig) -> i32 {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => return report(source, file_name, e.to_diagnostic(), config),
    };

    if config.dump_tokens {
        for token in &tokens {
            println!(
                "{:>4}:{:<4} {}",
                token.position.line,
                token.position.column,
                token.kind.describe()
            );
        }
    }

    let program = match parse(tokens) {
        Ok(program) => program,
        Err(e) => return report(source, file_name, e.to_diagnostic(), config),
    };

    if config.dump_ast {
        println!("{:#?}", program);
    }
    if config.dump_only() {
        return 0;
    }

    let mut interpreter = Interpreter::new().with_max_depth(config.max_depth);
    match interpreter.run(&program) {
        Ok(value) => {
            if let Some(code) = interpreter.exit_status() {
                log::debug!("Program exited with status {}", code);
                return code;
            }
            log::debug!("Program finished with {}", format::repr(&value));
            let mirrored = matches!(program.statements.last(), Some(Stmt::Mirror(_)));
            if echo_result && !value.is_null() && !mirrored {
                println!("{}", format::repr(&value));
            }
            0
        }
        Err(e) => report(source, file_name, e.to_diagnostic(), config),
    }
}

fn report(source: &str, file_name: &str, diagnostic: Diagnostic, config: &AppConfig) -> i32 {
    eprint!(
        "{}",
        render_diagnostics(source, file_name, &[diagnostic], config.color_enabled)
    );
    1
}

/// Nesting left open by `source`, so the REPL knows to keep reading.
fn open_braces(source: &str) -> i64 {
    tokenize(source).map_or(0, |tokens| {
        tokens.iter().fold(0, |depth, token| match token.kind {
            TokenKind::LBrace => depth + 1,
            TokenKind::RBrace => depth - 1,
            _ => depth,
        })
    })
}

/// Runs the interactive loop and returns the process exit status.
fn run_repl(config: &AppConfig) -> i32 {
    if !config.verbose {
        println!("AkshayaLang {}", env!("CARGO_PKG_VERSION"));
        println!("Type statements to run them. Exit with Ctrl+D or type 'exit'.");
        println!();
    } else {
        log::debug!("Entering interactive mode");
    }

    let mut interpreter = Interpreter::new().with_max_depth(config.max_depth);
    let mut pending = String::new();
    // Every entry, so spans from functions defined earlier still resolve.
    let mut history = String::new();
    let mut status = 0;

    loop {
        let prompt = if pending.is_empty() { "aks> " } else { "...> " };
        if let Err(e) = interpreter.write(prompt) {
            error_message(config, &e.to_string());
            break;
        }

        let line = match interpreter.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error_message(config, &e.to_string());
                break;
            }
        };

        let trimmed = line.trim();
        if pending.is_empty() && (trimmed == "exit" || trimmed == "quit") {
            break;
        }

        pending.push_str(&line);
        pending.push('\n');
        if open_braces(&pending) > 0 {
            continue;
        }

        let start = history.len();
        history.push_str(&std::mem::take(&mut pending));
        match eval_entry(&mut interpreter, &history, start) {
            Ok(Some(value)) => {
                if let Err(e) = interpreter.write_line(&format::repr(&value)) {
                    error_message(config, &e.to_string());
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                eprint!(
                    "{}",
                    render_diagnostics(&history, "<repl>", &[e.to_diagnostic()], config.color_enabled)
                );
            }
        }
        if let Some(code) = interpreter.exit_status() {
            status = code;
            break;
        }
    }
    println!();
    status
}

/// Runs the REPL entry that begins at `start` in `history`. The value is echoed
/// unless it is null or was already printed by a trailing `mirror`.
fn eval_entry(
    interpreter: &mut Interpreter,
    history: &str,
    start: usize,
) -> Result<Option<Value>, Error> {
    let program = parse(tokenize_from(history, start)?)?;
    let value = interpreter.run(&program)?;
    let mirrored = matches!(program.statements.last(), Some(Stmt::Mirror(_)));
    Ok((!value.is_null() && !mirrored).then_some(value))
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
