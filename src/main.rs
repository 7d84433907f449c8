extern crate clap;

mod config;
mod display;
mod errors;
mod fast;
mod measurements;
mod results;
mod stats;

use crate::config::{Options, TestConfig, MAX_TRANSFER_SIZE};
use crate::display::{print_report, ConsoleProgress, DisplayMode, ProgressCallback, ProgressEvent, TestPhase};
use crate::errors::{exit_codes, format_error_for_display, ErrorKind, SpeedTestError};
use crate::fast::client::Client;
use crate::fast::requests::targets::TargetsRequest;
use crate::fast::requests::token::fetch_token;
use crate::fast::tests::engine::TestEngine;
use crate::fast::tests::probe::{ProbeKind, Prober};
use crate::fast::tests::ranking::rank;
use crate::results::SpeedTestResults;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use log::{debug, info};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

/// Measure download and upload speed against the fast.com servers closest
/// to you.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API token; scraped from fast.com when omitted
    #[arg(short, long)]
    token: Option<String>,

    /// Number of servers to test against (1-5)
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Transfers kept in flight during each throughput test (1-16)
    #[arg(long, default_value_t = 3)]
    concurrency: usize,

    /// Bytes requested by each download
    #[arg(short = 'n', long, default_value_t = MAX_TRANSFER_SIZE)]
    chunk: u64,

    /// Bytes sent by each upload
    #[arg(long, default_value_t = MAX_TRANSFER_SIZE)]
    payload: u64,

    /// Length of each throughput test in seconds (3-30)
    #[arg(short, long, default_value_t = 15)]
    duration: u64,

    /// Latency samples per server (1-5)
    #[arg(short = 'p', long = "pcount", default_value_t = 3)]
    pcount: usize,

    /// Measure latency over HTTP instead of ICMP
    #[arg(long)]
    no_icmp: bool,

    /// Skip the download test
    #[arg(long)]
    no_download: bool,

    /// Skip the upload test
    #[arg(long)]
    no_upload: bool,

    /// Use binary (base 2) units
    #[arg(long)]
    binary: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Print the ranked servers as JSON and exit
    #[arg(long)]
    list: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            token: self.token.clone(),
            server_count: self.count,
            probe: if self.no_icmp { ProbeKind::Http } else { ProbeKind::Icmp },
            run_download: !self.no_download,
            run_upload: !self.no_upload,
            test: TestConfig {
                concurrency: self.concurrency,
                duration: Duration::from_secs(self.duration),
                payload_size: self.payload,
                chunk_size: self.chunk,
                ping_count: self.pcount,
                binary_prefix: self.binary,
            },
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let code = tokio::select! {
        result = run(cli) => match result {
            Ok(()) => exit_codes::SUCCESS,
            Err(e) => {
                eprintln!("{}", format_error_for_display(&e));
                e.exit_code()
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted");
            exit_codes::INTERRUPTED
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), SpeedTestError> {
    let options = cli.options();
    options.validate()?;

    let mode = DisplayMode::detect(cli.json, std::io::stderr().is_terminal());
    debug!("Display mode: {:?}", mode);

    let progress: Option<Arc<dyn ProgressCallback>> = match mode {
        DisplayMode::Progress if !cli.list => {
            Some(Arc::new(ConsoleProgress::new(options.test.binary_prefix)))
        }
        _ => None,
    };
    let emit = |event: ProgressEvent| {
        if let Some(progress) = &progress {
            progress.on_progress(event);
        }
    };

    let client = Client::new();

    let token = match &options.token {
        Some(token) => token.clone(),
        None => fetch_token(&client).await?,
    };

    let targets = client.send(TargetsRequest::new(token)).await?;
    info!("Received {} candidate servers", targets.targets.len());

    let prober = Prober::new(options.probe)?;
    let desired = if cli.list { targets.targets.len() } else { options.server_count };

    emit(ProgressEvent::PhaseChange(TestPhase::Ranking));
    let ranked = rank(targets.targets, desired, &prober).await;
    emit(ProgressEvent::PhaseComplete(TestPhase::Ranking));
    let servers = ranked?;

    if cli.list {
        println!("{}", to_json(&servers)?);
        return Ok(());
    }

    let outcomes = TestEngine::new(&options, &prober)?
        .with_progress(progress.clone())
        .run(servers)
        .await?;

    let results = SpeedTestResults::from_outcomes(targets.client, &outcomes);

    match mode {
        DisplayMode::Json => println!("{}", to_json(&results)?),
        DisplayMode::Progress | DisplayMode::Silent => {
            print_report(&results, options.test.binary_prefix)
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SpeedTestError> {
    serde_json::to_string_pretty(value).map_err(|e| {
        SpeedTestError::new(ErrorKind::Unknown, "failed to serialize results")
            .with_source(e)
    })
}
