use std::path::Path;

use clap::Parser;
use frostbyte_sim::{
    cli::{Cli, Commands},
    compare, default_sweep, run_simulation, summarize, sweep, visualize, Scenario, SimConfig,
};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Trie-level events go to their own file when asked for.
    let (consensus_layer, _guard) = match &cli.consensus_log {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().ok_or("consensus log path has no file name")?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
                    metadata.target() == "consensus"
                }));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,frostbyte_sim=debug,consensus=warn".into()),
        );

    tracing_subscriber::registry()
        .with(consensus_layer)
        .with(stderr_layer)
        .init();

    match cli.command {
        Commands::Simulate {
            overrides,
            algorithm,
            mode,
            json,
        } => {
            let mut config = overrides.resolve()?;
            if let Some(algorithm) = algorithm {
                config.algorithm = algorithm;
            }
            if let Some(mode) = mode {
                config.mode = mode;
            }

            let results = run_simulation(&config)?;
            let summary = summarize(&results);
            if json {
                let report = json!({ "config": config, "runs": results, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{summary}");
            }
        }
        Commands::Compare { overrides, json } => {
            let config = overrides.resolve()?;
            let comparisons = match compare(&config) {
                Ok(comparisons) => comparisons,
                Err(e) => {
                    error!("comparison failed: {}", e);
                    return Err(e.into());
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&comparisons)?);
            } else {
                println!("{:>5} {:>12} {:>12}", "Run", "RoundsTree", "RoundsFlat");
                for c in &comparisons {
                    let show = |rounds: Option<u64>| rounds.map_or("-".to_string(), |r| r.to_string());
                    println!("{:>5} {:>12} {:>12}", c.run, show(c.tree_rounds), show(c.flat_rounds));
                }
            }
        }
        Commands::Sweep {
            overrides,
            params,
            algorithm,
            json,
        } => {
            let mut config = overrides.resolve()?;
            if let Some(algorithm) = algorithm {
                config.algorithm = algorithm;
            }
            let params = if params.is_empty() {
                default_sweep()
            } else {
                params
            };

            let entries = sweep(&config, &params)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{:>5}", "Run");
                for i in 1..=entries.len() {
                    print!(" {:>12}", format!("NumRounds{i}"));
                }
                println!();
                for run in 0..config.runs {
                    print!("{:>5}", run);
                    for entry in &entries {
                        let rounds = entry.rounds[run].map_or("-".to_string(), |r| r.to_string());
                        print!(" {:>12}", rounds);
                    }
                    println!();
                }
                println!();
                for (i, entry) in entries.iter().enumerate() {
                    println!("NumRounds{}: {}", i + 1, entry.params);
                }
            }
        }
        Commands::Visualize { bits, json } => {
            let visualization = visualize(&Scenario::default())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&visualization)?);
            } else {
                print!("{}", visualization.report(bits));
            }
        }
        Commands::InitConfig { path } => {
            SimConfig::default().save_to_file(&path)?;
            info!("Default config written to {}", path.display());
        }
    }

    Ok(())
}
