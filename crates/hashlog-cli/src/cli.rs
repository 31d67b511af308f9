use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hashlog",
    about = "Append-only registry of IPFS multihashes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Record log file (overrides the config file)
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the fixed-width triple for a multihash
    Encode(EncodeArgs),
    /// Rebuild a multihash from a triple
    Decode(DecodeArgs),
    /// Store a multihash at the next free index
    Append(AppendArgs),
    /// Store a multihash at a pre-assigned index
    Set(SetArgs),
    /// Show the multihash stored at an index
    Get(GetArgs),
    /// Show the number of stored entries
    Count,
    /// Show every stored entry
    List,
    /// Check the record log against the registry invariants
    Verify,
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
pub struct EncodeArgs {
    pub multihash: String,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Digest bytes as hex (at most 32 bytes)
    #[arg(long)]
    pub digest: String,
    #[arg(long)]
    pub hash_function: u8,
    #[arg(long)]
    pub size: u8,
}

#[derive(Args)]
pub struct AppendArgs {
    pub multihash: String,
    /// Account name of the writer
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    pub writer: String,
}

#[derive(Args)]
pub struct SetArgs {
    pub index: u64,
    pub multihash: String,
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    pub writer: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const H0: &str = "QmSr8fFpgMm4x9mFB3NTyctKjfHLpKpzUkKCxNXrisfu9e";

    #[test]
    fn parse_encode() {
        let cli = Cli::try_parse_from(["hashlog", "encode", H0]).unwrap();
        if let Command::Encode(args) = cli.command {
            assert_eq!(args.multihash, H0);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_decode() {
        let cli = Cli::try_parse_from([
            "hashlog", "decode", "--digest", "abcd", "--hash-function", "18", "--size", "2",
        ])
        .unwrap();
        if let Command::Decode(args) = cli.command {
            assert_eq!(args.digest, "abcd");
            assert_eq!(args.hash_function, 18);
            assert_eq!(args.size, 2);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_append_with_writer() {
        let cli = Cli::try_parse_from(["hashlog", "append", H0, "-w", "alice"]).unwrap();
        if let Command::Append(args) = cli.command {
            assert_eq!(args.writer, "alice");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn append_requires_writer() {
        assert!(Cli::try_parse_from(["hashlog", "append", H0]).is_err());
        assert!(Cli::try_parse_from(["hashlog", "append", H0, "--writer", ""]).is_err());
    }

    #[test]
    fn parse_set() {
        let cli = Cli::try_parse_from(["hashlog", "set", "3", H0, "--writer", "bob"]).unwrap();
        if let Command::Set(args) = cli.command {
            assert_eq!(args.index, 3);
            assert_eq!(args.writer, "bob");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from(["hashlog", "get", "5"]).unwrap();
        assert!(matches!(cli.command, Command::Get(GetArgs { index: 5 })));
    }

    #[test]
    fn get_rejects_negative_index() {
        assert!(Cli::try_parse_from(["hashlog", "get", "-1"]).is_err());
    }

    #[test]
    fn parse_global_registry_and_format() {
        let cli = Cli::try_parse_from([
            "hashlog", "count", "--registry", "/tmp/e.log", "--format", "json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Count));
        assert_eq!(cli.registry, Some(PathBuf::from("/tmp/e.log")));
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["hashlog", "--verbose", "list"]).unwrap();
        assert!(cli.verbose);
    }
}
