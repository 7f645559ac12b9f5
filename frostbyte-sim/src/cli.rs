use clap::{Args, Parser, Subcommand};
use frostbyte_common::Parameters;
use frostbyte_consensus::Algorithm;
use std::path::PathBuf;

use crate::config::{Finality, Mode, SimConfig};
use crate::errors::SimError;

#[derive(Parser, Debug)]
#[command(name = "frostbyte")]
#[command(about = "Snowball decision trie simulations and visualizations")]
pub struct Cli {
    /// Also write consensus-level events to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub consensus_log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a batch of network simulations and summarize them
    Simulate {
        #[command(flatten)]
        overrides: Overrides,

        /// Decision structure run by honest participants
        #[arg(long, value_name = "tree|flat")]
        algorithm: Option<Algorithm>,

        /// Round scheduling
        #[arg(long, value_enum)]
        mode: Option<Mode>,

        /// Print per-run statistics and the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run trie and flat networks side by side on identical seeds
    Compare {
        #[command(flatten)]
        overrides: Overrides,

        #[arg(long)]
        json: bool,
    },
    /// Run the same seeds under several parameter sets
    Sweep {
        #[command(flatten)]
        overrides: Overrides,

        /// Parameter set to run; repeat for more. Defaults to a K = 10 / 20 quorum sweep
        #[arg(long = "params", value_name = "K,ALPHA,BV,BR", value_parser = parse_parameters)]
        params: Vec<Parameters>,

        #[arg(long, value_name = "tree|flat")]
        algorithm: Option<Algorithm>,

        #[arg(long)]
        json: bool,
    },
    /// Play the scripted trie visualization
    Visualize {
        /// Leading bits of each id to print
        #[arg(long, default_value_t = 8)]
        bits: usize,

        #[arg(long)]
        json: bool,
    },
    /// Write the default simulation config
    InitConfig {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

/// Flags shared by the batch commands; they take precedence over the file.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// JSON config file; defaults are used without one
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub runs: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop each run at full or partial finality
    #[arg(long, value_enum)]
    pub finality: Option<Finality>,
}

impl Overrides {
    /// Loads the config file, if any, and applies the flags on top.
    pub fn resolve(&self) -> Result<SimConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load_from_file(path)?,
            None => SimConfig::default(),
        };
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(finality) = self.finality {
            config.finality = finality;
        }
        Ok(config)
    }
}

/// Parses `K,ALPHA,BETA_VIRTUOUS,BETA_ROGUE`.
fn parse_parameters(value: &str) -> Result<Parameters, String> {
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();
    let &[k, alpha, beta_virtuous, beta_rogue] = fields.as_slice() else {
        return Err(format!("expected K,ALPHA,BV,BR, got '{value}'"));
    };
    let number = |field: &str| -> Result<u64, String> {
        field
            .parse::<u64>()
            .map_err(|e| format!("invalid number '{field}': {e}"))
    };
    let beta = |field: &str| -> Result<u32, String> {
        field
            .parse::<u32>()
            .map_err(|e| format!("invalid number '{field}': {e}"))
    };
    let params = Parameters::new(
        number(k)?,
        number(alpha)?,
        beta(beta_virtuous)?,
        beta(beta_rogue)?,
    );
    params.verify().map_err(|e| e.to_string())?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "frostbyte", "simulate", "--runs", "3", "--seed", "9", "--algorithm", "flat", "--mode",
            "random", "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Simulate {
                overrides,
                algorithm,
                mode,
                json,
            } => {
                assert_eq!(overrides.runs, Some(3));
                assert_eq!(overrides.seed, Some(9));
                assert_eq!(algorithm, Some(Algorithm::Flat));
                assert_eq!(mode, Some(Mode::RandomSampling));
                assert!(json);

                let config = overrides.resolve().unwrap();
                assert_eq!(config.runs, 3);
                assert_eq!(config.seed, 9);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_visualize_defaults() {
        let cli = Cli::try_parse_from(["frostbyte", "visualize"]).unwrap();
        assert!(matches!(cli.command, Commands::Visualize { bits: 8, json: false }));
        assert!(cli.consensus_log.is_none());

        let cli =
            Cli::try_parse_from(["frostbyte", "visualize", "--consensus-log", "trie.log"]).unwrap();
        assert_eq!(cli.consensus_log, Some(PathBuf::from("trie.log")));
    }

    #[test]
    fn test_parse_sweep() {
        let cli = Cli::try_parse_from([
            "frostbyte", "sweep", "--params", "10,6,10,13", "--params", "20, 15, 10, 13",
            "--finality", "partial",
        ])
        .unwrap();

        match cli.command {
            Commands::Sweep {
                overrides, params, ..
            } => {
                assert_eq!(
                    params,
                    vec![Parameters::new(10, 6, 10, 13), Parameters::new(20, 15, 10, 13)]
                );
                assert_eq!(overrides.resolve().unwrap().finality, Finality::Partial);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_malformed_params() {
        assert!(parse_parameters("10,6,10").is_err());
        assert!(parse_parameters("10,x,10,13").is_err());
        assert!(parse_parameters("5,6,10,13").is_err());
        assert!(Cli::try_parse_from(["frostbyte", "sweep", "--params", "1,2"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_algorithm() {
        assert!(Cli::try_parse_from(["frostbyte", "simulate", "--algorithm", "dag"]).is_err());
    }
}
