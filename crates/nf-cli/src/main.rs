mod config;
mod replay;
mod server;
mod simulate;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::AppConfig;
use nf_core::StreamEngine;
use nf_core::time::now_unix_millis;
use replay::ReplaySession;
use simulate::{Profile, Simulator};

#[derive(Parser)]
#[command(name = "nf", about = "Streaming EEG neurofeedback processor")]
struct Cli {
    /// Path to a TOML config file (defaults to $NF_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP processing service
    Serve {
        /// Port to listen on (overrides config and $PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (overrides config and $NF_BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Feed a JSONL file of samples through a fresh engine
    Replay {
        /// JSONL file, one sample per line ("-" for stdin)
        file: PathBuf,

        /// Record the replay as a session with this id
        #[arg(long)]
        session: Option<String>,

        /// Patient id for the session (a session id is generated if omitted)
        #[arg(long)]
        patient: Option<String>,

        /// Session type
        #[arg(long)]
        session_type: Option<String>,
    },

    /// Emit synthetic band-power samples as JSONL
    Simulate {
        /// Number of samples to emit
        #[arg(long, default_value_t = 256)]
        count: usize,

        /// Seed for a reproducible stream
        #[arg(long)]
        seed: Option<u64>,

        /// Brain-state profile to simulate
        #[arg(long, value_enum, default_value_t = Profile::Focused)]
        profile: Profile,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve { port, bind } => cmd_serve(&cli, *port, bind.as_deref()).await,
        Commands::Replay {
            file,
            session,
            patient,
            session_type,
        } => cmd_replay(
            &cli,
            file,
            session.as_deref(),
            patient.as_deref(),
            session_type.as_deref(),
        ),
        Commands::Simulate {
            count,
            seed,
            profile,
        } => cmd_simulate(*count, *seed, *profile),
    }
}

async fn cmd_serve(cli: &Cli, port: Option<u16>, bind: Option<&str>) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(bind) = bind {
        config.server.bind_addr = bind.to_string();
    }

    let addr = config.socket_addr()?;
    let engine = StreamEngine::new(config.engine).context("invalid engine configuration")?;
    server::serve(addr, engine).await
}

fn cmd_replay(
    cli: &Cli,
    file: &Path,
    session: Option<&str>,
    patient: Option<&str>,
    session_type: Option<&str>,
) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    let session = match (session, patient) {
        (Some(_), None) => bail!("--session requires --patient"),
        (None, None) => None,
        (session_id, Some(patient_id)) => Some(ReplaySession {
            session_id: session_id
                .map(str::to_string)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            patient_id: patient_id.to_string(),
            session_type: session_type.map(str::to_string),
        }),
    };

    let report = replay::replay_path(file, config.engine, session)?;
    tracing::info!(
        "replayed {} lines: {} accepted, {} rejected, {} passes",
        report.lines,
        report.accepted,
        report.rejected,
        report.passes
    );
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn cmd_simulate(count: usize, seed: Option<u64>, profile: Profile) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    for sample in Simulator::new(profile, seed, now_unix_millis()).take(count) {
        let line = serde_json::to_string(&sample).context("failed to serialize sample")?;
        writeln!(out, "{line}").context("failed to write sample")?;
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}
