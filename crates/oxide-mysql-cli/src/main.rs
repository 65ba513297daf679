//! oxide-mysql CLI
//!
//! Lexes and parses MySQL-flavored SQL from a file or stdin and prints the
//! token trace or the reduction trace.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser as _;
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_mysql_core::lexer::{
    spawn_scanner, ChannelOptions, LexerOptions, ScannerChannel, Token, TokenKind, TokenSource,
};
use oxide_mysql_core::parser::{ActionError, ParseError, Parser, ParserOptions, SyntaxError, Value};
use oxide_mysql_core::sink::{Reduction, Sink, TraceSink, TreeSink};

const SCANNER_JOIN_TIMEOUT: Duration = Duration::from_millis(250);

/// Table-driven lexer and LALR(1) parser for MySQL-flavored SQL.
#[derive(clap::Parser)]
#[command(name = "oxide-mysql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file (stdin if not specified).
    file: Option<PathBuf>,

    /// Only run the lexer and print one line per token.
    #[arg(long, conflicts_with_all = ["trace_parse", "tree", "recover"])]
    lex_only: bool,

    /// Print every reduction the parser performs.
    #[arg(long)]
    trace_parse: bool,

    /// Print the syntax tree of accepted input.
    #[arg(long)]
    tree: bool,

    /// Keep parsing after syntax errors, resynchronizing on error rules.
    #[arg(long)]
    recover: bool,

    /// Bound of the scanner-to-parser token channel.
    #[arg(
        long,
        env = "OXIDE_MYSQL_CHANNEL_CAPACITY",
        default_value_t = ChannelOptions::default().capacity
    )]
    channel_capacity: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

/// How a run ended, for the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Accepted,
    Rejected,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(3),
            };
        }
    };

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("oxide-mysql: failed to install logger: {e}");
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = run(&cli, &mut out).and_then(|outcome| {
        out.flush().context("failed to write output")?;
        Ok(outcome)
    });
    match result {
        Ok(Outcome::Accepted) => ExitCode::SUCCESS,
        Ok(Outcome::Rejected) => ExitCode::from(1),
        Err(e) => {
            let _ = out.flush();
            eprintln!("oxide-mysql: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// 2 for I/O failures anywhere in the chain, 1 for everything else.
fn exit_code(error: &anyhow::Error) -> u8 {
    if error.chain().any(|cause| cause.downcast_ref::<io::Error>().is_some()) {
        2
    } else {
        1
    }
}

fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let input = open_input(cli.file.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("oxide-mysql-scanner")
        .enable_time()
        .build()
        .context("failed to start the scanner runtime")?;

    let mut source = spawn_scanner(
        runtime.handle(),
        input,
        LexerOptions::default(),
        ChannelOptions {
            capacity: cli.channel_capacity,
        },
    );
    debug!(capacity = cli.channel_capacity, "scanner started");

    let outcome = if cli.lex_only {
        lex(&mut source, out)
    } else {
        parse(cli, &mut source, out)
    };

    report_diagnostics(&mut source);
    if let Some(task) = source.shutdown() {
        // A scanner blocked reading stdin only notices the stop request
        // after its read returns.
        match runtime.block_on(async { tokio::time::timeout(SCANNER_JOIN_TIMEOUT, task).await }) {
            Ok(joined) => joined.context("scanner task did not finish cleanly")?,
            Err(_) => debug!("scanner still blocked on input, leaving it behind"),
        }
    }
    runtime.shutdown_background();
    outcome
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn Read + Send>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin())),
    }
}

/// Logs the diagnostics received since the last call.
fn report_diagnostics(source: &mut ScannerChannel) {
    for diagnostic in source.take_diagnostics() {
        warn!("{diagnostic}");
    }
}

fn lex(source: &mut ScannerChannel, out: &mut impl Write) -> anyhow::Result<Outcome> {
    loop {
        let token = source.next_token().context("lexing failed")?;
        report_diagnostics(source);
        if token.kind == TokenKind::Eof {
            writeln!(out, "-- EOF")?;
            return Ok(Outcome::Accepted);
        }
        writeln!(out, "{}", token.trace_line())?;
    }
}

fn parse(cli: &Cli, source: &mut ScannerChannel, out: &mut impl Write) -> anyhow::Result<Outcome> {
    let sink = CliSink {
        trace: cli.trace_parse.then(TraceSink::new),
        tree: cli.tree.then(TreeSink::new),
    };
    let mut parser = Parser::mysql(sink)?.with_options(ParserOptions {
        recover: cli.recover,
    });
    let result = parser.parse(source);
    let sink = parser.into_sink();
    report_diagnostics(source);

    // The trace already holds the ERROR and ACCEPT lines.
    match &sink.trace {
        Some(trace) => {
            for line in trace.lines() {
                writeln!(out, "{line}")?;
            }
        }
        None => write_outcome(out, &result)?,
    }
    if let Some(tree) = &sink.tree {
        if tree.tree().root().is_some() {
            writeln!(out, "{}", tree.tree())?;
        }
    }

    match result {
        Ok(_) => Ok(Outcome::Accepted),
        Err(ParseError::Syntax(_) | ParseError::Multiple(_)) => Ok(Outcome::Rejected),
        Err(e) => Err(e).context("parse failed"),
    }
}

fn write_outcome(out: &mut impl Write, result: &Result<Value, ParseError>) -> io::Result<()> {
    match result {
        Ok(_) => writeln!(out, "ACCEPT"),
        Err(e) => {
            for error in e.syntax_errors() {
                writeln!(out, "ERROR at {error}")?;
            }
            Ok(())
        }
    }
}

/// Feeds the parse to a reduction trace and a tree builder, each optional.
struct CliSink {
    trace: Option<TraceSink>,
    tree: Option<TreeSink>,
}

impl Sink for CliSink {
    fn shift(&mut self, token: &Token) -> Value {
        self.tree
            .as_mut()
            .map_or(Value::None, |tree| tree.shift(token))
    }

    fn reduce(&mut self, reduction: &Reduction<'_>, values: Vec<Value>) -> Result<Value, ActionError> {
        if let Some(trace) = &mut self.trace {
            trace.reduce(reduction, Vec::new())?;
        }
        match &mut self.tree {
            Some(tree) => tree.reduce(reduction, values),
            None => {
                oxide_mysql_core::sink::check_reduction(reduction)?;
                Ok(Value::None)
            }
        }
    }

    fn syntax_error(&mut self, error: &SyntaxError) {
        if let Some(trace) = &mut self.trace {
            trace.syntax_error(error);
        }
    }

    fn accept(&mut self) {
        if let Some(trace) = &mut self.trace {
            trace.accept();
        }
        if let Some(tree) = &mut self.tree {
            tree.accept();
        }
    }
}
