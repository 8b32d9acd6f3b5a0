use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(
    name = "nyzo",
    about = "Nyzo record layer: keys, transactions, blocks and peer messages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format; overrides the config file
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Record kinds accepted by `decode`, `verify` and `hash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RecordKind {
    Transaction,
    /// A bare block body
    Block,
    /// Block count, block and trailing balance list, as peers send it
    BlockBundle,
    BalanceList,
    /// A full frame, length prefix included
    Message,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a new private key
    Keygen,
    /// Derive the public key of a hex seed
    Pubkey(PubkeyArgs),
    /// Decode a hex-encoded record and print it
    Decode(RecordArgs),
    /// Validate a transaction or check a block or message signature
    Verify(VerifyArgs),
    /// Print the hash of a hex-encoded record
    Hash(RecordArgs),
    /// Build and sign a standard transaction
    Transfer(TransferArgs),
    /// Build and sign a framed peer message
    Message(MessageArgs),
    /// List the message type catalog
    Types,
}

#[derive(Args)]
pub struct PubkeyArgs {
    pub seed: String,
}

#[derive(Args)]
pub struct RecordArgs {
    #[arg(value_enum)]
    pub kind: RecordKind,
    pub hex: String,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub record: RecordArgs,
    /// Previous-block hash signed by a transaction; the wire omits it
    #[arg(long)]
    pub prev_hash: Option<String>,
}

#[derive(Args)]
pub struct TransferArgs {
    /// Recipient public key (hex, dashes allowed)
    #[arg(long)]
    pub recipient: String,
    /// Amount in µNyzos
    #[arg(long)]
    pub amount: i64,
    /// Sender data, at most 32 bytes (hex)
    #[arg(long)]
    pub data: Option<String>,
    /// Signing seed (hex); falls back to the configured key file
    #[arg(long)]
    pub key: Option<String>,
    #[arg(long, default_value = "0")]
    pub prev_height: i64,
    #[arg(long)]
    pub prev_hash: Option<String>,
}

#[derive(Args)]
pub struct MessageArgs {
    /// Numeric message type
    #[arg(long = "type")]
    pub message_type: u16,
    /// Content bytes (hex)
    #[arg(long)]
    pub content: Option<String>,
    /// Signing seed (hex); falls back to the configured key file
    #[arg(long)]
    pub key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keygen() {
        let cli = Cli::try_parse_from(["nyzo", "keygen"]).unwrap();
        assert!(matches!(cli.command, Command::Keygen));
    }

    #[test]
    fn parse_pubkey() {
        let cli = Cli::try_parse_from(["nyzo", "pubkey", "ab"]).unwrap();
        if let Command::Pubkey(args) = cli.command {
            assert_eq!(args.seed, "ab");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_decode_kinds() {
        for (name, kind) in [
            ("transaction", RecordKind::Transaction),
            ("block", RecordKind::Block),
            ("block-bundle", RecordKind::BlockBundle),
            ("balance-list", RecordKind::BalanceList),
            ("message", RecordKind::Message),
        ] {
            let cli = Cli::try_parse_from(["nyzo", "decode", name, "00"]).unwrap();
            if let Command::Decode(args) = cli.command {
                assert_eq!(args.kind, kind);
                assert_eq!(args.hex, "00");
            } else {
                panic!("wrong command");
            }
        }
    }

    #[test]
    fn parse_unknown_kind_fails() {
        assert!(Cli::try_parse_from(["nyzo", "decode", "receipt", "00"]).is_err());
    }

    #[test]
    fn parse_verify_with_prev_hash() {
        let cli =
            Cli::try_parse_from(["nyzo", "verify", "transaction", "00", "--prev-hash", "11"]).unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.record.kind, RecordKind::Transaction);
            assert_eq!(args.prev_hash, Some("11".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_transfer() {
        let cli = Cli::try_parse_from([
            "nyzo",
            "transfer",
            "--recipient",
            "aa",
            "--amount",
            "100",
            "--data",
            "6869",
            "--prev-height",
            "12",
        ])
        .unwrap();
        if let Command::Transfer(args) = cli.command {
            assert_eq!(args.amount, 100);
            assert_eq!(args.data, Some("6869".into()));
            assert_eq!(args.prev_height, 12);
            assert!(args.key.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_transfer_requires_amount() {
        assert!(Cli::try_parse_from(["nyzo", "transfer", "--recipient", "aa"]).is_err());
    }

    #[test]
    fn parse_message() {
        let cli = Cli::try_parse_from(["nyzo", "message", "--type", "200"]).unwrap();
        if let Command::Message(args) = cli.command {
            assert_eq!(args.message_type, 200);
            assert!(args.content.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["nyzo", "--verbose", "types"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format_and_config() {
        let cli =
            Cli::try_parse_from(["nyzo", "keygen", "--format", "json", "--config", "nyzo.toml"])
                .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("nyzo.toml")));
    }
}
