//! sbs: multi-station SBS-1 aggregation daemon + CLI.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use sbs_core::config::{self, split_station_list, Config};
use sbs_core::types::*;
use sbs_core::{parse_line, Disposition, HistoryLimits, Registry};
use sbs_feeder::logging::init_logging;
use sbs_feeder::{FeedConnector, ReconnectPolicy, MERGE_CHANNEL_CAPACITY};

mod engine;
mod web;

#[derive(Parser)]
#[command(name = "sbs", version, about = "Merge SBS-1 feeds from multiple stations")]
struct Cli {
    /// Config file (default ~/.sbs-merge/config.yaml)
    #[arg(long, global = true, env = "SBS_MERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to stations, aggregate, and serve the dashboard API
    Serve {
        /// Comma separated station addresses (host:port)
        #[arg(long, env = "SBS_STATIONS")]
        stations: Option<String>,

        /// Dashboard bind address
        #[arg(long)]
        host: Option<String>,

        /// Dashboard port
        #[arg(long)]
        port: Option<u16>,

        /// Directory of static files served under /
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Replay capture files through the aggregator and print an aircraft table.
    /// Each file is treated as a separate station.
    Replay {
        /// Capture files, one SBS-1 record per line
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Messages kept per aircraft for duplicate detection
        #[arg(long)]
        dedup_window: Option<usize>,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Serve {
            stations,
            host,
            port,
            static_dir,
        } => {
            let mut config = config;
            if let Some(list) = stations {
                config.stations = split_station_list(&list);
            }
            if let Some(host) = host {
                config.dashboard.host = host;
            }
            if let Some(port) = port {
                config.dashboard.port = port;
            }
            cmd_serve(config, static_dir)
        }
        Commands::Replay {
            files,
            dedup_window,
        } => {
            let mut limits = config.history;
            if let Some(w) = dedup_window {
                limits.dedup_window = w;
            }
            cmd_replay(&files, limits)
        }
        Commands::Config { save } => cmd_config(&config, cli.config.as_deref(), save),
    }
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(p) => config::load_config_from(p).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }),
        None => config::load_config(),
    }
}

// ---------------------------------------------------------------------------
// serve
// ---------------------------------------------------------------------------

#[tokio::main]
async fn cmd_serve(config: Config, static_dir: Option<PathBuf>) {
    if config.stations.is_empty() {
        eprintln!("Error: no stations configured");
        std::process::exit(1);
    }

    let registry = Arc::new(RwLock::new(Registry::new(config.history)));
    let policy = ReconnectPolicy::from_config(&config.reconnect);
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel(MERGE_CHANNEL_CAPACITY);

    let mut stations = Vec::with_capacity(config.stations.len());
    let mut connectors = Vec::with_capacity(config.stations.len());
    for address in &config.stations {
        let connector = FeedConnector::new(address.clone(), tx.clone(), policy, cancel.clone());
        stations.push(web::StationEntry {
            address: address.clone(),
            stats: connector.stats(),
        });
        connectors.push(connector.spawn());
    }
    // The engine stops once every connector has dropped its sender.
    drop(tx);

    let engine = engine::spawn(rx, Arc::clone(&registry));

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            ctrl_c_cancel.cancel();
        }
    });

    let state = Arc::new(web::AppState {
        registry: Arc::clone(&registry),
        stations,
    });

    let served = web::serve(
        state,
        &config.dashboard.host,
        config.dashboard.port,
        static_dir,
        cancel.clone(),
    )
    .await;
    let dashboard_failed = served.is_err();
    if let Err(e) = served {
        eprintln!("Error: dashboard on {}:{}: {e}", config.dashboard.host, config.dashboard.port);
        cancel.cancel();
    }

    for handle in connectors {
        let _ = handle.await;
    }
    let totals = match engine.await {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: engine task failed: {e}");
            std::process::exit(1);
        }
    };

    println!();
    println!(
        "Messages: {} received, {} accepted, {} duplicates, {} aircraft",
        totals.received,
        totals.accepted,
        totals.duplicates,
        totals.new_aircraft
    );

    if dashboard_failed {
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

fn station_name(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

fn cmd_replay(files: &[PathBuf], limits: HistoryLimits) {
    let mut messages = Vec::new();
    let mut lines = 0u64;
    let mut errors = 0u64;

    for file in files {
        let text = std::fs::read_to_string(file).unwrap_or_else(|e| {
            eprintln!("Error opening {}: {e}", file.display());
            std::process::exit(1);
        });
        let station = station_name(file);

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            lines += 1;
            match parse_line(&station, line) {
                Ok(m) => messages.push(m),
                Err(e) => {
                    errors += 1;
                    tracing::warn!(station = %station, record = line, error = %e, "dropping unparseable record");
                }
            }
        }
    }

    // Interleave stations the way a live merge would see them.
    messages.sort_by_key(|m| m.generated_at);

    let mut registry = Registry::new(limits);
    let mut duplicates = 0u64;
    for m in messages {
        if registry.accept(m) == Disposition::Duplicate {
            duplicates += 1;
        }
    }

    println!();
    println!(
        "Records: {lines} read, {errors} unparseable, {} accepted, {duplicates} duplicates",
        registry.accepted_messages
    );
    println!("Aircraft: {}", registry.len());
    println!();

    print_summary(&registry);
}

fn print_summary(registry: &Registry) {
    if registry.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ICAO", "Callsign", "Squawk", "Alt (ft)", "Speed (kts)", "Trk", "VRate", "Lat", "Lon",
        "Stations", "Msgs", "Dups",
    ]);

    for ac in registry.snapshot() {
        let pos = ac.position();
        table.add_row(vec![
            Cell::new(icao_to_string(ac.icao)),
            Cell::new(ac.callsign.as_deref().unwrap_or("-")),
            Cell::new(ac.squawk.map(squawk_to_string).unwrap_or("-".into())),
            Cell::new(
                ac.altitude_ft
                    .map(|a| a.to_string())
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                ac.ground_speed_kts
                    .map(|s| format!("{s:.0}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                ac.track_deg
                    .map(|h| format!("{h:.1}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                ac.vertical_rate_fpm
                    .map(|v| format!("{v:+}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(pos.map(|p| format!("{:.4}", p.lat)).unwrap_or("-".into())),
            Cell::new(pos.map(|p| format!("{:.4}", p.lon)).unwrap_or("-".into())),
            Cell::new(ac.stations.len()),
            Cell::new(ac.message_count),
            Cell::new(ac.duplicate_count),
        ]);
    }

    println!("{table}");
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config(config: &Config, path: Option<&Path>, save: bool) {
    println!();
    println!("Stations:");
    for station in &config.stations {
        println!("  {station}");
    }
    println!();
    println!(
        "  Dashboard:     http://{}:{}",
        config.dashboard.host, config.dashboard.port
    );
    println!("  Dedup window:  {}", config.history.dedup_window);
    println!("  Max trail:     {}", config.history.max_trail);
    println!(
        "  Reconnect:     {}ms .. {}ms, {}",
        config.reconnect.initial_ms,
        config.reconnect.max_ms,
        config
            .reconnect
            .max_attempts
            .map(|n| format!("{n} attempts"))
            .unwrap_or("unlimited".into())
    );
    println!();

    if save {
        let saved = match path {
            Some(p) => config::save_config_to(config, p).map(|_| p.to_path_buf()),
            None => config::save_config(config),
        };
        match saved {
            Ok(p) => println!("Saved to {}", p.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}
