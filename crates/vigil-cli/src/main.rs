//! vigil CLI: hosts the Pomodoro and keep-awake add-ons in a terminal.
//!
//! Commands are read one per line from standard input, standing in for the
//! screen reader's gesture bindings. Announcements go to standard output.

use std::future::Future;
use std::io::BufRead;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use vigil_daemon::{setup, Addon, Config, DaemonEvent};
use vigil_input::InputEmulation;
use vigil_notify::ConsoleNotifier;

#[derive(Parser)]
#[command(
    name = "vigil",
    about = "Pomodoro timer and keep-awake add-ons for screen reader users",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the add-ons, reading commands from standard input.
    Run {
        /// Path to configuration file.
        #[arg(short, long)]
        config: Option<String>,

        /// Host is in secure mode: load nothing and ignore commands.
        #[arg(long)]
        secure: bool,
    },

    /// Print the default configuration as TOML.
    DefaultConfig,
}

const USAGE: &str = "commands: toggle (t), status (s), stop (x), keep-awake (k), help (h), quit (q)";

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Daemon(DaemonEvent),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let command = match line.trim().to_ascii_lowercase().as_str() {
        "toggle" | "t" => Command::Daemon(DaemonEvent::ToggleCycle),
        "status" | "s" => Command::Daemon(DaemonEvent::ReportStatus),
        "stop" | "x" => Command::Daemon(DaemonEvent::StopCycle),
        "keep-awake" | "k" => Command::Daemon(DaemonEvent::ToggleKeepAwake),
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "linux")]
fn emulation_backend() -> Box<dyn InputEmulation> {
    Box::new(vigil_input::linux::UinputEmulation::new())
}

#[cfg(not(feature = "linux"))]
fn emulation_backend() -> Box<dyn InputEmulation> {
    Box::new(vigil_input::UnavailableEmulation)
}

/// Read standard input on a dedicated thread.
///
/// A blocked read on that thread does not hold up runtime shutdown; the
/// thread ends at EOF, on a read error or once the receiver is dropped.
fn spawn_stdin_reader() -> std::io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("vigil-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Feed command lines to the add-ons until quit, EOF or `interrupt`, then
/// shut them down.
async fn host(
    addon: Addon,
    mut lines: mpsc::Receiver<String>,
    interrupt: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let (events, daemon_task) = match addon {
        Addon::Enabled(daemon) => {
            let events = daemon.event_sender();
            (Some(events), Some(tokio::spawn(daemon.run())))
        }
        Addon::Disabled => {
            warn!("secure mode: add-ons disabled, commands will be ignored");
            (None, None)
        }
    };
    tokio::pin!(interrupt);

    loop {
        let line = tokio::select! {
            () = &mut interrupt => {
                info!("interrupted");
                break;
            }
            line = lines.recv() => line,
        };
        let Some(line) = line else {
            debug!("stdin closed");
            break;
        };

        match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Help) => eprintln!("{USAGE}"),
            Some(Command::Daemon(event)) => match &events {
                Some(tx) => {
                    if tx.send(event).await.is_err() {
                        warn!("daemon stopped unexpectedly");
                        break;
                    }
                }
                None => debug!(?event, "add-ons disabled, ignoring command"),
            },
            None if line.trim().is_empty() => {}
            None => eprintln!("unknown command: {}; {USAGE}", line.trim()),
        }
    }

    if let Some(tx) = events {
        let _ = tx.send(DaemonEvent::Shutdown).await;
    }
    if let Some(task) = daemon_task {
        task.await??;
    }
    Ok(())
}

async fn run(config_path: Option<&str>, secure: bool) -> anyhow::Result<()> {
    let config = setup::load_config(config_path)?;
    init_tracing(&config.daemon.log_level);
    info!(config = ?config_path, secure, "starting vigil");

    let addon = Addon::build(&config, secure, emulation_backend(), ConsoleNotifier::stdout())?;
    let lines = spawn_stdin_reader()?;
    eprintln!("{USAGE}");

    host(addon, lines, ctrl_c()).await?;
    info!("vigil stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, secure } => run(config.as_deref(), secure).await,
        Commands::DefaultConfig => {
            print!("{}", toml::to_string_pretty(&Config::default())?);
            Ok(())
        }
    }
}
