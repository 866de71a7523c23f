use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version = "0.1.0")]
#[command(about = "Sends randomized native or ERC-20 transfers to a pool of EVM addresses")]
#[command(
    long_about = "Sends randomized transfers from one funded account to a pool of addresses, \
    pausing a random delay between sends and a fixed interval between passes. \
    Options left out on the command line are asked for interactively."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start sending transfers
    Start {
        /// Path to config.yaml file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Where recipient addresses come from
        #[arg(long, value_enum)]
        source: Option<SourceArg>,

        /// Address file used by the `file` source
        #[arg(long, default_value = "wallet.txt")]
        wallet_file: PathBuf,

        /// Keep at most this many addresses from the `url` source (0 = no limit)
        #[arg(long)]
        max_addresses: Option<usize>,

        /// Send the native currency or the configured token
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },

    /// Generate a sample config file
    GenerateConfig {
        /// Path to output config file
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    File,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Native,
    Token,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_defaults() {
        let cli = Cli::try_parse_from(["evm-drip-sender", "start"]).unwrap();
        match cli.command {
            Commands::Start {
                config,
                source,
                wallet_file,
                max_addresses,
                mode,
            } => {
                assert_eq!(config, PathBuf::from("config.yaml"));
                assert_eq!(wallet_file, PathBuf::from("wallet.txt"));
                assert_eq!(source, None);
                assert_eq!(max_addresses, None);
                assert_eq!(mode, None);
            }
            Commands::GenerateConfig { .. } => panic!("expected start"),
        }
    }

    #[test]
    fn start_with_everything_preselected() {
        let cli = Cli::try_parse_from([
            "evm-drip-sender",
            "start",
            "--source",
            "url",
            "--max-addresses",
            "50",
            "--mode",
            "token",
        ])
        .unwrap();
        match cli.command {
            Commands::Start {
                source,
                max_addresses,
                mode,
                ..
            } => {
                assert_eq!(source, Some(SourceArg::Url));
                assert_eq!(max_addresses, Some(50));
                assert_eq!(mode, Some(ModeArg::Token));
            }
            Commands::GenerateConfig { .. } => panic!("expected start"),
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["evm-drip-sender", "start", "--mode", "nft"]).is_err());
    }
}
