//! linecast - run code in a persistent interpreter from the command line
//!
//! Streams which line is running and what it prints, either as plain text or
//! as JSON lines of execution chunks.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{debug, info};

use linecast::diagnostics::SystemInfo;
use linecast::scan::{CodeScanner, SemgrepScanner};
use linecast::{
    notice, CodeRequest, Config, ExecutionChunk, LanguageRegistry, LineEvent, SessionManager,
};

/// Run code in persistent interpreters and watch it execute line by line
#[derive(Parser, Debug)]
#[command(name = "linecast")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run code and stream its progress
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Print JSON lines of execution chunks
        #[arg(long)]
        json: bool,
    },
    /// List supported languages and their aliases
    Languages,
    /// Show the host and the interpreters linecast would use
    Info {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Scan code with semgrep without running it
    Scan {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct SourceArgs {
    /// Language identifier or alias (python, powershell, shell, py, bash, ...)
    #[arg(short, long)]
    language: String,

    /// Read code from a file
    #[arg(short, long, conflicts_with = "code")]
    file: Option<PathBuf>,

    /// Code given inline; stdin is read when neither --file nor --code is set
    #[arg(long)]
    code: Option<String>,
}

impl SourceArgs {
    fn read_code(&self) -> anyhow::Result<String> {
        if let Some(code) = &self.code {
            return Ok(code.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }

        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read code from stdin")?;
        Ok(code)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_configuration(args.config.as_deref())?;
    init_logging(&config, args.debug);
    info!("Starting linecast v{}", linecast::VERSION);

    match args.command {
        Command::Run { source, json } => run(config, &source, json).await,
        Command::Languages => {
            list_languages();
            Ok(())
        }
        Command::Info { json } => {
            let info = SystemInfo::collect(&config);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print!("{}", info);
            }
            Ok(())
        }
        Command::Scan { source } => scan(&source).await,
    }
}

fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let result = match path {
        Some(path) => linecast::init_with_config(path),
        None => linecast::init(),
    };
    result.map_err(|e| anyhow::anyhow!(linecast::handle_startup_error(&e)))
}

/// Logs go to stderr so stdout only carries program output
fn init_logging(config: &Config, debug: bool) {
    let level = if debug {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(config: Config, source: &SourceArgs, json: bool) -> anyhow::Result<()> {
    let spec = LanguageRegistry::new().lookup(&source.language)?;
    let code = source.read_code()?;

    if !json {
        if let Some(welcome) = notice::welcome_once() {
            eprintln!("{}\n", welcome);
        }
    }

    let manager = SessionManager::new(config);
    let mut turn = manager
        .execute(CodeRequest::new(spec.language, code))
        .await
        .map_err(|e| anyhow::anyhow!(linecast::handle_startup_error(&e)))?;

    // Ctrl+C stops the interpreter; the turn then ends with a fault
    let killer = turn.killer();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, killing interpreter");
            let _ = killer.kill().await;
        }
    });

    let mut fault = None;
    while let Some(event) = turn.next().await {
        if json {
            if let Some(chunk) = ExecutionChunk::from_event(&event) {
                println!("{}", serde_json::to_string(&chunk)?);
            }
        } else {
            match &event {
                LineEvent::ActiveLine(line) => eprintln!("[line {}]", line),
                LineEvent::OutputText(text) => println!("{}", text),
                _ => {}
            }
        }

        if let LineEvent::Fault(reason) = event {
            fault = Some(reason);
        }
    }

    drop(turn);
    manager.shutdown().await?;

    match fault {
        Some(reason) => bail!("{} interpreter failed: {}", spec.proper_name, reason),
        None => Ok(()),
    }
}

fn list_languages() {
    for spec in LanguageRegistry::new().all() {
        println!(
            "{:<12} {:<12} .{:<5} aliases: {}",
            spec.id(),
            spec.proper_name,
            spec.file_extension,
            spec.aliases.join(", ")
        );
    }
}

async fn scan(source: &SourceArgs) -> anyhow::Result<()> {
    let spec = LanguageRegistry::new().lookup(&source.language)?;
    let code = source.read_code()?;

    let report = SemgrepScanner::new().scan(&code, spec.language).await?;
    if !report.output.trim().is_empty() {
        print!("{}", report.output);
    }
    println!("{}", report.summary());

    if report.clean {
        Ok(())
    } else {
        bail!("Scan reported issues")
    }
}
