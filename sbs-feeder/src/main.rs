//! sbs-feeder: inspect SBS-1 station feeds.
//!
//! Supports:
//! - Watching live stations and printing every parsed message
//! - Parsing a captured feed file and reporting bad records

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sbs_core::config::{self, Config};
use sbs_core::{format_record, icao_to_string, parse_line, Message};
use sbs_feeder::logging::init_logging;
use sbs_feeder::{FeedConnector, ReconnectPolicy, MERGE_CHANNEL_CAPACITY};

#[derive(Parser)]
#[command(name = "sbs-feeder", version, about = "SBS-1 BaseStation feed inspector")]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to stations and print parsed messages until Ctrl-C
    Watch {
        /// Station addresses (host:port). Defaults to the configured list.
        stations: Vec<String>,

        /// Config file (default ~/.sbs-merge/config.yaml)
        #[arg(long, env = "SBS_MERGE_CONFIG")]
        config: Option<PathBuf>,

        /// Re-emit messages as SBS-1 records instead of a debug dump
        #[arg(long)]
        raw: bool,
    },
    /// Parse a captured feed file, one record per line
    Parse {
        /// Path to the capture file
        file: PathBuf,

        /// Station name to tag messages with
        #[arg(long, default_value = "file")]
        station: String,

        /// Only report records that fail to parse
        #[arg(short, long)]
        errors_only: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Watch {
            stations,
            config,
            raw,
        } => cmd_watch(stations, config, raw),
        Commands::Parse {
            file,
            station,
            errors_only,
        } => cmd_parse(file, &station, errors_only),
    }
}

fn load_config(path: Option<PathBuf>) -> Config {
    match path {
        Some(p) => match config::load_config_from(&p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => config::load_config(),
    }
}

fn print_message(msg: &Message, raw: bool) {
    if raw {
        println!("{}", format_record(msg));
    } else {
        println!("[{}] {} {:?}", msg.station, icao_to_string(msg.icao), msg);
    }
}

#[tokio::main]
async fn cmd_watch(stations: Vec<String>, config_path: Option<PathBuf>, raw: bool) {
    let config = load_config(config_path);
    let stations = if stations.is_empty() {
        config.stations.clone()
    } else {
        stations
    };
    if stations.is_empty() {
        eprintln!("Error: no stations configured");
        std::process::exit(1);
    }

    let policy = ReconnectPolicy::from_config(&config.reconnect);
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(MERGE_CHANNEL_CAPACITY);

    let handles: Vec<_> = stations
        .iter()
        .map(|s| FeedConnector::new(s.clone(), tx.clone(), policy, cancel.clone()).spawn())
        .collect();
    drop(tx);

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    while let Some(msg) = rx.recv().await {
        print_message(&msg, raw);
    }

    for (station, handle) in stations.iter().zip(handles) {
        if let Ok(stats) = handle.await {
            let s = stats.snapshot();
            eprintln!(
                "{station}: {} lines, {} parsed, {} errors, {} reconnects",
                s.lines, s.parsed, s.parse_errors, s.reconnects
            );
        }
    }
}

fn cmd_parse(file: PathBuf, station: &str, errors_only: bool) {
    let text = match std::fs::read_to_string(&file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {e}", file.display());
            std::process::exit(1);
        }
    };

    let mut parsed = 0u64;
    let mut failed = 0u64;
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(station, line) {
            Ok(msg) => {
                parsed += 1;
                if !errors_only {
                    print_message(&msg, false);
                }
            }
            Err(e) => {
                failed += 1;
                println!("line {}: {e}: {line}", i + 1);
            }
        }
    }

    eprintln!("{parsed} parsed, {failed} failed");
}
