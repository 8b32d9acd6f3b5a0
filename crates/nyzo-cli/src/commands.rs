use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;

use nyzo_crypto::PrivateKey;
use nyzo_ledger::{BalanceList, Block, BlockBundle, Decode, Encode, Transaction, TransactionType};
use nyzo_protocol::{Message, MessageFrame, MessageType};
use nyzo_types::{Hash, PublicKey};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    let format = config.output(cli.format);
    match cli.command {
        Command::Keygen => cmd_keygen(format),
        Command::Pubkey(args) => cmd_pubkey(args, format),
        Command::Decode(args) => cmd_decode(args, format),
        Command::Verify(args) => cmd_verify(args, format),
        Command::Hash(args) => cmd_hash(args, format),
        Command::Transfer(args) => cmd_transfer(args, config, format),
        Command::Message(args) => cmd_message(args, config, format),
        Command::Types => cmd_types(format),
    }
}

/// A decoded record of any supported kind.
#[derive(Debug)]
pub enum Record {
    Transaction(Transaction),
    Block(Block),
    BlockBundle(BlockBundle),
    BalanceList(BalanceList),
    Message(Message),
}

impl Record {
    pub fn decode(kind: RecordKind, bytes: &[u8]) -> anyhow::Result<Self> {
        let record = match kind {
            RecordKind::Transaction => Self::Transaction(Transaction::from_bytes(bytes)?),
            RecordKind::Block => Self::Block(Block::from_bytes(bytes)?),
            RecordKind::BlockBundle => Self::BlockBundle(BlockBundle::from_bytes(bytes)?),
            RecordKind::BalanceList => Self::BalanceList(BalanceList::from_bytes(bytes)?),
            RecordKind::Message => {
                let (msg, consumed) = MessageFrame::decode(bytes)?;
                if consumed != bytes.len() {
                    bail!("{} trailing bytes after message frame", bytes.len() - consumed);
                }
                Self::Message(msg)
            }
        };
        Ok(record)
    }

    /// The record's hash as the protocol defines it. Messages have none.
    pub fn hash(&self) -> anyhow::Result<Hash> {
        match self {
            Self::Transaction(tx) => Ok(tx.hash()),
            Self::Block(block) => Ok(block.hash()),
            Self::BlockBundle(bundle) => Ok(bundle.block.hash()),
            Self::BalanceList(list) => Ok(list.hash()),
            Self::Message(_) => bail!("messages have no record hash"),
        }
    }

    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::Transaction(tx) => serde_json::to_value(tx),
            Self::Block(block) => serde_json::to_value(block),
            Self::BlockBundle(bundle) => serde_json::to_value(bundle),
            Self::BalanceList(list) => serde_json::to_value(list),
            Self::Message(msg) => serde_json::to_value(msg),
        }
    }
}

/// Outcome of `verify`: the check that ran and why it failed, if it did.
#[derive(Debug, PartialEq, Eq)]
pub struct Verdict {
    pub check: &'static str,
    pub failure: Option<String>,
}

impl Verdict {
    fn pass(check: &'static str) -> Self {
        Self {
            check,
            failure: None,
        }
    }

    fn fail(check: &'static str, reason: impl Into<String>) -> Self {
        Self {
            check,
            failure: Some(reason.into()),
        }
    }
}

/// Run the check that applies to `record`. A transaction's previous-block
/// hash is not on the wire, so it must be supplied for the signature to
/// verify.
pub fn verify_record(record: &mut Record, prev_hash: Option<Hash>) -> anyhow::Result<Verdict> {
    let verdict = match record {
        Record::Transaction(tx) => {
            if let Some(hash) = prev_hash {
                tx.prev_hash = hash;
            }
            match tx.validate() {
                Ok(()) => Verdict::pass("transaction"),
                Err(reason) => Verdict::fail("transaction", reason.to_string()),
            }
        }
        Record::Block(block) => block_verdict(block),
        Record::BlockBundle(bundle) => {
            let verdict = block_verdict(&bundle.block);
            if verdict.failure.is_some() {
                return Ok(verdict);
            }
            match bundle.balance_list_matches() {
                Some(false) => Verdict::fail("block bundle", "balance list hash mismatch"),
                _ => Verdict::pass("block bundle"),
            }
        }
        Record::Message(msg) => {
            if msg.verify() {
                Verdict::pass("message signature")
            } else {
                Verdict::fail("message signature", "signature is not valid")
            }
        }
        Record::BalanceList(_) => bail!("balance lists carry no signature"),
    };
    Ok(verdict)
}

fn block_verdict(block: &Block) -> Verdict {
    if block.verify_signature() {
        Verdict::pass("block signature")
    } else {
        Verdict::fail("block signature", "signature is not valid")
    }
}

/// Parse hex input, tolerating surrounding whitespace, a `0x` prefix and
/// the dashes of the grouped public-key form.
pub fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = input.trim();
    let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let cleaned: String = body.chars().filter(|c| *c != '-').collect();
    hex::decode(&cleaned).with_context(|| format!("invalid hex: {input}"))
}

fn parse_public_key(input: &str) -> anyhow::Result<PublicKey> {
    PublicKey::from_slice(&parse_hex(input)?).context("public key must be 32 bytes")
}

fn parse_hash(input: &str) -> anyhow::Result<Hash> {
    Hash::from_slice(&parse_hex(input)?).context("hash must be 32 bytes")
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_keygen(format: OutputFormat) -> anyhow::Result<()> {
    let key = PrivateKey::generate();
    let public = key.public_key();
    match format {
        OutputFormat::Json => print_json(&json!({
            "seed": key.to_hex(),
            "public_key": public.to_hex(),
        })),
        OutputFormat::Text => {
            println!("{} Generated key", "✓".green().bold());
            println!("  Seed:       {}", key.to_hex().red());
            println!("  Public key: {}", public.to_dashed_hex().cyan());
            Ok(())
        }
    }
}

fn cmd_pubkey(args: PubkeyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let key = PrivateKey::from_hex(&args.seed).context("parsing seed")?;
    let public = key.public_key();
    match format {
        OutputFormat::Json => print_json(&json!({ "public_key": public.to_hex() })),
        OutputFormat::Text => {
            println!("{}", public.to_dashed_hex().cyan());
            Ok(())
        }
    }
}

fn cmd_decode(args: RecordArgs, format: OutputFormat) -> anyhow::Result<()> {
    let record = Record::decode(args.kind, &parse_hex(&args.hex)?)?;
    match format {
        OutputFormat::Json => print_json(&record.to_json()?),
        OutputFormat::Text => {
            print_record(&record);
            Ok(())
        }
    }
}

fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let prev_hash = args.prev_hash.as_deref().map(parse_hash).transpose()?;
    let mut record = Record::decode(args.record.kind, &parse_hex(&args.record.hex)?)?;
    let verdict = verify_record(&mut record, prev_hash)?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "check": verdict.check,
            "valid": verdict.failure.is_none(),
            "reason": verdict.failure,
        }))?,
        OutputFormat::Text => match &verdict.failure {
            None => println!("{} {} valid", "✓".green().bold(), verdict.check),
            Some(reason) => println!("{} {} invalid: {}", "✗".red().bold(), verdict.check, reason),
        },
    }
    if let Some(reason) = verdict.failure {
        bail!("{} failed verification: {reason}", verdict.check);
    }
    Ok(())
}

fn cmd_hash(args: RecordArgs, format: OutputFormat) -> anyhow::Result<()> {
    let record = Record::decode(args.kind, &parse_hex(&args.hex)?)?;
    let hash = record.hash()?;
    match format {
        OutputFormat::Json => print_json(&json!({ "hash": hash.to_hex() })),
        OutputFormat::Text => {
            println!("{}", hash.to_hex().yellow());
            Ok(())
        }
    }
}

/// Build and sign a standard transaction from command-line arguments.
pub fn build_transfer(args: &TransferArgs, key: &PrivateKey) -> anyhow::Result<Transaction> {
    let recipient = parse_public_key(&args.recipient)?;
    let data = match &args.data {
        Some(hex) => parse_hex(hex)?,
        None => Vec::new(),
    };
    if data.len() > nyzo_ledger::MAX_SENDER_DATA_LEN {
        bail!(
            "sender data is {} bytes, at most {} allowed",
            data.len(),
            nyzo_ledger::MAX_SENDER_DATA_LEN
        );
    }
    let prev_hash = match &args.prev_hash {
        Some(hex) => parse_hash(hex)?,
        None => Hash::zero(),
    };
    let mut tx = Transaction::standard(args.amount, recipient, &data)
        .with_previous_block(args.prev_height, prev_hash);
    tx.sign(key);
    Ok(tx)
}

fn cmd_transfer(args: TransferArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let key = config.signing_key(args.key.as_deref())?;
    let tx = build_transfer(&args, &key)?;
    if let Err(reason) = tx.validate() {
        bail!("refusing to emit invalid transaction: {reason}");
    }
    let bytes = tx.to_bytes();
    match format {
        OutputFormat::Json => print_json(&json!({
            "hash": tx.hash().to_hex(),
            "bytes": hex::encode(&bytes),
            "transaction": tx,
        })),
        OutputFormat::Text => {
            println!("{} Signed transaction", "✓".green().bold());
            println!("  Hash:  {}", tx.hash().to_hex().yellow());
            println!("  Bytes: {}", hex::encode(&bytes));
            Ok(())
        }
    }
}

/// Build and sign a peer message from command-line arguments.
pub fn build_message(args: &MessageArgs, key: &PrivateKey) -> anyhow::Result<Message> {
    let Some(message_type) = MessageType::from_u16(args.message_type) else {
        bail!("unknown message type {}", args.message_type);
    };
    let content = match &args.content {
        Some(hex) => parse_hex(hex)?,
        None => Vec::new(),
    };
    let mut msg = Message::new(message_type, content);
    msg.sign(key);
    Ok(msg)
}

fn cmd_message(args: MessageArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let key = config.signing_key(args.key.as_deref())?;
    let msg = build_message(&args, &key)?;
    let frame = MessageFrame::encode(&msg);
    match format {
        OutputFormat::Json => print_json(&json!({
            "frame": hex::encode(&frame),
            "message": msg,
        })),
        OutputFormat::Text => {
            println!("{} Signed {}", "✓".green().bold(), msg.message_type.to_string().cyan());
            println!("  Frame: {}", hex::encode(&frame));
            Ok(())
        }
    }
}

fn cmd_types(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let types: Vec<_> = MessageType::ALL
                .iter()
                .map(|ty| json!({ "value": ty.as_u16(), "name": ty.name() }))
                .collect();
            print_json(&serde_json::Value::Array(types))
        }
        OutputFormat::Text => {
            for ty in MessageType::ALL {
                println!("{:>5}  {}", ty.as_u16().to_string().yellow(), ty.name());
            }
            Ok(())
        }
    }
}

fn print_record(record: &Record) {
    match record {
        Record::Transaction(tx) => print_transaction(tx, ""),
        Record::Block(block) => print_block(block),
        Record::BlockBundle(bundle) => {
            print_block(&bundle.block);
            match &bundle.balance_list {
                Some(list) => print_balance_list(list),
                None => println!("{}", "No balance list".dimmed()),
            }
        }
        Record::BalanceList(list) => print_balance_list(list),
        Record::Message(msg) => {
            println!("{} {}", "Message".bold(), msg.message_type.to_string().cyan());
            println!("  Timestamp: {}", msg.timestamp);
            println!("  Sender:    {}", msg.sender_id.to_dashed_hex());
            println!("  Content:   {} bytes", msg.content.len());
            println!("  Signature: {}", signature_label(msg.verify()));
        }
    }
}

fn print_transaction(tx: &Transaction, indent: &str) {
    println!("{indent}{} {}", "Transaction".bold(), tx.tx_type.to_string().cyan());
    println!("{indent}  Timestamp: {}", tx.timestamp);
    println!("{indent}  Amount:    µ{}", tx.amount);
    println!("{indent}  Recipient: {}", tx.recipient_id.to_dashed_hex());
    if tx.tx_type != TransactionType::CoinGeneration {
        println!("{indent}  Sender:    {}", tx.sender_id.to_dashed_hex());
        println!("{indent}  Prev hash height: {}", tx.prev_hash_height);
        if !tx.sender_data.is_empty() {
            println!("{indent}  Data:      {}", hex::encode(&tx.sender_data));
        }
    }
    println!("{indent}  Hash:      {}", tx.hash().to_hex().yellow());
}

fn print_block(block: &Block) {
    println!("{} {}", "Block".bold(), block.height.to_string().yellow());
    println!("  Hash:         {}", block.hash().to_hex().yellow());
    println!("  Previous:     {}", block.prev_block_hash.to_hex().dimmed());
    println!("  Started:      {}", block.start_timestamp);
    println!("  Verified:     {}", block.verification_timestamp);
    println!("  Balance list: {}", block.balancelist_hash.to_hex().dimmed());
    println!("  Verifier:     {}", block.verifier_id.to_dashed_hex());
    println!("  Signature:    {}", signature_label(block.verify_signature()));
    println!("  Transactions: {}", block.transactions.len());
    for tx in &block.transactions {
        print_transaction(tx, "    ");
    }
}

fn print_balance_list(list: &BalanceList) {
    println!("{} at height {}", "Balance list".bold(), list.height.to_string().yellow());
    println!("  Hash:           {}", list.hash().to_hex().yellow());
    println!("  Rollover fees:  {}", list.rollover_fees);
    println!("  Prev verifiers: {}", list.prev_verifiers.len());
    for verifier in &list.prev_verifiers {
        println!("    {}", verifier.compact_hex().dimmed());
    }
    println!("  Accounts:       {} (total µ{})", list.items.len(), list.total_balance());
    for item in &list.items {
        println!(
            "    {}  µ{}  fee in {}",
            item.id.compact_hex(),
            item.balance,
            item.blocks_until_fee
        );
    }
}

fn signature_label(valid: bool) -> colored::ColoredString {
    if valid {
        "valid".green()
    } else {
        "invalid".red()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nyzo_ledger::BalanceListItem;
    use nyzo_types::Timestamp;

    fn key() -> PrivateKey {
        PrivateKey::from_seed([0x21; 32])
    }

    fn transfer_args(recipient: &PublicKey) -> TransferArgs {
        TransferArgs {
            recipient: recipient.to_dashed_hex(),
            amount: 100,
            data: Some("6869".into()),
            key: None,
            prev_height: 5,
            prev_hash: Some(hex::encode([0x77; 32])),
        }
    }

    #[test]
    fn parse_hex_variants() {
        assert_eq!(parse_hex(" 0x0aff \n").unwrap(), vec![0x0a, 0xff]);
        assert_eq!(parse_hex("00-11").unwrap(), vec![0x00, 0x11]);
        assert!(parse_hex("xyz").is_err());
    }

    #[test]
    fn transfer_builds_valid_transaction() {
        let recipient = PrivateKey::from_seed([0x22; 32]).public_key();
        let tx = build_transfer(&transfer_args(&recipient), &key()).unwrap();
        assert_eq!(tx.recipient_id, recipient);
        assert_eq!(tx.sender_data, b"hi".to_vec());
        assert_eq!(tx.prev_hash_height, 5);
        assert!(tx.is_valid());
    }

    #[test]
    fn transfer_rejects_long_data() {
        let mut args = transfer_args(&PublicKey::from_bytes([1; 32]));
        args.data = Some(hex::encode([0u8; 33]));
        assert!(build_transfer(&args, &key()).is_err());
    }

    #[test]
    fn decoded_transfer_verifies_with_prev_hash() {
        let recipient = PublicKey::from_bytes([0x09; 32]);
        let tx = build_transfer(&transfer_args(&recipient), &key()).unwrap();
        let bytes = tx.to_bytes();

        let mut record = Record::decode(RecordKind::Transaction, &bytes).unwrap();
        let verdict = verify_record(&mut record, None).unwrap();
        assert!(verdict.failure.is_some());

        let mut record = Record::decode(RecordKind::Transaction, &bytes).unwrap();
        let verdict = verify_record(&mut record, Some(Hash::from_bytes([0x77; 32]))).unwrap();
        assert_eq!(verdict, Verdict::pass("transaction"));
    }

    #[test]
    fn self_transfer_reports_reason() {
        let tx = build_transfer(&transfer_args(&key().public_key()), &key()).unwrap();
        let mut record = Record::Transaction(tx);
        let verdict = verify_record(&mut record, None).unwrap();
        assert!(verdict.failure.unwrap().contains("sender and recipient"));
    }

    #[test]
    fn message_frame_roundtrip_through_record() {
        let args = MessageArgs {
            message_type: 200,
            content: Some("beef".into()),
            key: None,
        };
        let msg = build_message(&args, &key()).unwrap();
        let frame = MessageFrame::encode(&msg);

        let mut record = Record::decode(RecordKind::Message, &frame).unwrap();
        assert!(record.hash().is_err());
        assert_eq!(
            verify_record(&mut record, None).unwrap(),
            Verdict::pass("message signature")
        );

        let mut padded = frame.clone();
        padded.push(0);
        assert!(Record::decode(RecordKind::Message, &padded).is_err());
    }

    #[test]
    fn unknown_message_type_is_refused() {
        let args = MessageArgs {
            message_type: 2,
            content: None,
            key: None,
        };
        assert!(build_message(&args, &key()).is_err());
    }

    #[test]
    fn bundle_checks_balance_list() {
        let list = BalanceList {
            height: 1,
            rollover_fees: 0,
            prev_verifiers: vec![PublicKey::from_bytes([3; 32])],
            items: vec![BalanceListItem::new(PublicKey::from_bytes([4; 32]), 10, 0)],
        };
        let mut block = Block::new(1, Timestamp::from_millis(10), Hash::zero(), list.hash());
        block.sign(&key());
        let bytes = BlockBundle::new(block.clone(), Some(list.clone())).to_bytes();

        let mut record = Record::decode(RecordKind::BlockBundle, &bytes).unwrap();
        assert_eq!(record.hash().unwrap(), block.hash());
        assert_eq!(verify_record(&mut record, None).unwrap(), Verdict::pass("block bundle"));

        let mut wrong = list;
        wrong.rollover_fees = 1;
        let bytes = BlockBundle::new(block, Some(wrong)).to_bytes();
        let mut record = Record::decode(RecordKind::BlockBundle, &bytes).unwrap();
        assert_eq!(
            verify_record(&mut record, None).unwrap(),
            Verdict::fail("block bundle", "balance list hash mismatch")
        );
    }

    #[test]
    fn balance_list_has_no_signature() {
        let mut record = Record::BalanceList(BalanceList::new(0));
        assert!(verify_record(&mut record, None).is_err());
        assert_eq!(record.hash().unwrap(), BalanceList::new(0).hash());
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(Record::decode(RecordKind::Transaction, &[7]).is_err());
        assert!(Record::decode(RecordKind::BlockBundle, &[0, 2]).is_err());
    }

    #[test]
    fn records_render_as_json() {
        let record = Record::BalanceList(BalanceList::new(3));
        let json = record.to_json().unwrap();
        assert_eq!(json["height"], 3);
    }
}
