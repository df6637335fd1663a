//! Defines the client interface for the attestor server.
use clap::{Parser, ValueEnum};

/// The upstream the attestor takes prices from
#[derive(Clone, Debug, ValueEnum)]
pub enum SourceType {
    /// Pyth Hermes price service
    Hermes,
    /// Prices listed in the config file
    Fixed,
}

#[derive(Clone, Debug, Parser)]
#[command(
    name = "price_attestor",
    version,
    about = "Price Attestor - signed price oracle service",
    long_about = "A service that signs (feed, maxAge, price) observations and verifies them against a trusted key.\nSupports key management and running the attestation server."
)]
/// The command line interface for the attestor.
pub struct AttestorCli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// The subcommands for the attestor.
#[derive(Clone, Debug, Parser)]
pub enum Commands {
    /// The subcommand to run the server.
    Server(server::Args),

    /// The subcommand to run key management program.
    #[command(subcommand)]
    Key(key::KeyCommands),
}

/// The arguments for the start subcommand.
pub mod server {
    use super::{Parser, SourceType};

    /// The arguments for the server subcommand.
    #[derive(Clone, Debug, Parser)]
    pub struct Args {
        /// The configuration file for the attestor.
        #[clap(long)]
        pub config: String,

        /// Where prices are fetched from.
        #[clap(long, value_enum, default_value = "hermes")]
        pub source_type: SourceType,
    }
}

/// The arguments for the key subcommand.
pub mod key {
    use std::path::PathBuf;

    use super::Parser;

    #[derive(Clone, Debug, Parser)]
    pub enum KeyCommands {
        /// Create a new keystore
        Generate(GenerateArgs),
        /// Print the keys held in a keystore
        Show(ShowArgs),
    }

    #[derive(Clone, Debug, Parser)]
    pub struct GenerateArgs {
        /// Custom keystore directory path. If not specified, uses ~/.price-attestor/
        #[clap(long)]
        pub keystore: Option<PathBuf>,
        /// Password encrypting the keystore
        #[clap(long, default_value = "")]
        pub password: String,
    }

    #[derive(Clone, Debug, Parser)]
    pub struct ShowArgs {
        #[clap(long, default_value = "false")]
        pub show_private: bool,
        #[clap(long, default_value = "true")]
        pub show_public: bool,
        /// Custom keystore directory path. If not specified, uses ~/.price-attestor/
        #[clap(long)]
        pub keystore: Option<PathBuf>,
        /// Password encrypting the keystore
        #[clap(long, default_value = "")]
        pub password: String,
    }
}
