use anyhow::{bail, Context};
use colored::Colorize;
use hashlog_codec::MultihashCodec;
use hashlog_registry::{DurableRegistry, RegistryConfig};
use hashlog_sdk::HashLog;
use hashlog_types::{EntryIndex, Triple, WriterId, DIGEST_CAPACITY};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Encode(ref args) => cmd_encode(args, json),
        Command::Decode(ref args) => cmd_decode(args, json),
        Command::Append(ref args) => cmd_append(&open(&cli)?, args, json),
        Command::Set(ref args) => cmd_set(&open(&cli)?, args, json),
        Command::Get(ref args) => cmd_get(&open(&cli)?, args, json),
        Command::Count => cmd_count(&open(&cli)?, json),
        Command::List => cmd_list(&open(&cli)?, json),
        Command::Verify => cmd_verify(&open(&cli)?, json),
        Command::Config => cmd_config(&resolve_config(&cli)?),
    }
}

/// Config file (if given), then `--registry` on top.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<RegistryConfig> {
    let mut config = match &cli.config {
        Some(path) => RegistryConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RegistryConfig::default(),
    };
    if let Some(path) = &cli.registry {
        config.path = path.clone();
    }
    Ok(config)
}

fn open(cli: &Cli) -> anyhow::Result<HashLog<DurableRegistry>> {
    let config = resolve_config(cli)?;
    HashLog::open(&config).with_context(|| format!("opening registry {}", config.path.display()))
}

fn triple_json(triple: &Triple) -> serde_json::Value {
    json!({
        "digest": hex::encode(triple.digest),
        "hash_function": triple.hash_function,
        "size": triple.size,
    })
}

fn cmd_encode(args: &EncodeArgs, json: bool) -> anyhow::Result<()> {
    let triple = MultihashCodec::encode(&args.multihash)?;
    if json {
        println!("{}", triple_json(&triple));
    } else {
        println!("digest:        {}", hex::encode(triple.digest).cyan());
        println!("hash function: 0x{:02x}", triple.hash_function);
        println!("size:          {}", triple.size);
    }
    Ok(())
}

/// Parse a hex digest into a right-padded digest block.
pub fn parse_digest(hex_digest: &str) -> anyhow::Result<[u8; DIGEST_CAPACITY]> {
    let hex_digest = hex_digest.strip_prefix("0x").unwrap_or(hex_digest);
    let bytes = hex::decode(hex_digest).context("digest is not valid hex")?;
    if bytes.len() > DIGEST_CAPACITY {
        bail!("digest is {} bytes; at most {DIGEST_CAPACITY} fit", bytes.len());
    }
    let mut block = [0u8; DIGEST_CAPACITY];
    block[..bytes.len()].copy_from_slice(&bytes);
    Ok(block)
}

fn cmd_decode(args: &DecodeArgs, json: bool) -> anyhow::Result<()> {
    let triple = Triple::new(parse_digest(&args.digest)?, args.hash_function, args.size);
    let multihash = MultihashCodec::decode(&triple)?;
    if json {
        println!("{}", json!({ "multihash": multihash }));
    } else {
        println!("{multihash}");
    }
    Ok(())
}

fn cmd_append(log: &HashLog<DurableRegistry>, args: &AppendArgs, json: bool) -> anyhow::Result<()> {
    let writer = WriterId::account(&args.writer);
    let index = log.register(&args.multihash, writer)?;
    if json {
        println!("{}", json!({ "index": index.0, "writer": writer.to_hex() }));
    } else {
        println!("{} Stored at {}", "✓".green().bold(), index.to_string().yellow());
        println!("  Writer: {}", writer.to_string().cyan());
    }
    Ok(())
}

fn cmd_set(log: &HashLog<DurableRegistry>, args: &SetArgs, json: bool) -> anyhow::Result<()> {
    let writer = WriterId::account(&args.writer);
    let index = EntryIndex(args.index);
    log.register_at(index, &args.multihash, writer)?;
    if json {
        println!("{}", json!({ "index": index.0, "writer": writer.to_hex() }));
    } else {
        println!("{} Stored at {}", "✓".green().bold(), index.to_string().yellow());
    }
    Ok(())
}

fn cmd_get(log: &HashLog<DurableRegistry>, args: &GetArgs, json: bool) -> anyhow::Result<()> {
    let index = EntryIndex(args.index);
    let triple = log.triple(index)?;
    let multihash = MultihashCodec::decode(&triple)?;
    if json {
        println!(
            "{}",
            json!({ "index": index.0, "multihash": multihash, "triple": triple_json(&triple) })
        );
    } else {
        println!("{} {}", index.to_string().yellow(), multihash.bold());
        println!("  Triple: {}", triple.to_string().dimmed());
    }
    Ok(())
}

fn cmd_count(log: &HashLog<DurableRegistry>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", json!({ "count": log.count() }));
    } else {
        println!("{}", log.count());
    }
    Ok(())
}

fn cmd_list(log: &HashLog<DurableRegistry>, json: bool) -> anyhow::Result<()> {
    let entries = log.list()?;
    if json {
        println!("{}", serde_json::to_string(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No entries.");
    }
    for entry in &entries {
        println!(
            "{} {} {}",
            entry.index.to_string().yellow(),
            entry.multihash,
            entry.writer.to_string().dimmed()
        );
    }
    Ok(())
}

fn cmd_verify(log: &HashLog<DurableRegistry>, json: bool) -> anyhow::Result<()> {
    let report = log.registry().verify()?;
    if json {
        println!(
            "{}",
            json!({
                "count": report.count,
                "records": report.records,
                "consistent": report.is_consistent(),
                "violations": report.violations.iter().map(|v| v.description.clone()).collect::<Vec<_>>(),
            })
        );
    } else if report.is_consistent() {
        println!("{} Registry consistent", "✓".green().bold());
        println!("  Entries: {}", report.count.to_string().bold());
        println!("  Indices: {}", "sequential".green());
    } else {
        println!("{} Registry inconsistent", "✗".red().bold());
        for violation in &report.violations {
            println!("  {} {:?}: {}", violation.index, violation.kind, violation.description);
        }
    }
    if !report.is_consistent() {
        bail!("{} violation(s) found", report.violations.len());
    }
    Ok(())
}

fn cmd_config(config: &RegistryConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string(config)?);
    Ok(())
}
