//! tallytag - generates keyed tag test vectors for the tally hardware.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tallytag::record::check_record;
use tallytag::utils::bits::to_binary_string;
use tallytag::vectors::DEFAULT_OUTPUT;
use tallytag::{
    parse_key_literal, sanity_vectors, DecodedKey, RecordPolicy, SwapConvention, TagGenerator,
    TallyEntry, TestVector, VectorTable, TAG_SIZE,
};

fn parse_u32(s: &str) -> Result<u32, String> {
    parse_key_literal(s).map_err(|e| e.to_string())
}

fn parse_convention(s: &str) -> Result<SwapConvention, String> {
    s.parse().map_err(|e: tallytag::TagError| e.to_string())
}

fn parse_policy(s: &str) -> Result<RecordPolicy, String> {
    s.parse().map_err(|e: tallytag::TagError| e.to_string())
}

#[derive(Parser)]
#[command(name = "tallytag")]
#[command(about = "Keyed 4-bit tags and test vectors for tally records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 32-bit key (hex 0x.., binary 0b.., or decimal)
    #[arg(long, global = true, value_parser = parse_u32, default_value = "0x32110000")]
    key: u32,

    /// Swap index convention (lsb, msb)
    #[arg(long, global = true, value_parser = parse_convention, default_value = "lsb")]
    convention: SwapConvention,
}

#[derive(Subcommand)]
enum Command {
    /// Write the full 4096-line vector table
    Table {
        /// Output file ("-" for stdout)
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Record policy (plain, testbench)
        #[arg(long, value_parser = parse_policy, default_value = "testbench")]
        policy: RecordPolicy,
    },

    /// Print the five testbench vectors
    Sanity,

    /// Tag a single record
    Tag {
        /// 31-bit record value (hex 0x.., binary 0b.., or decimal)
        #[arg(value_parser = parse_u32)]
        record: u32,

        /// Print the blocks after each step
        #[arg(long)]
        trace: bool,
    },

    /// Show the decoded key parameters
    DecodeKey,
}

fn print_vectors(vectors: &[TestVector]) -> Result<()> {
    let mut out = io::stdout().lock();
    for v in vectors {
        writeln!(out, "{}", v)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let key = DecodedKey::decode(cli.key);
    let generator = TagGenerator::with_convention(key, cli.convention);

    match cli.command {
        Command::Table { output, policy } => {
            let table = VectorTable::generate(&generator, policy);
            if output.as_os_str() == "-" {
                table.write_to(io::stdout().lock())?;
            } else {
                let file = File::create(&output)
                    .with_context(|| format!("Failed to create {}", output.display()))?;
                table
                    .write_to(BufWriter::new(file))
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                info!("Wrote {} lines to {}", table.len(), output.display());
            }
        }

        Command::Sanity => {
            print_vectors(&sanity_vectors(&generator))?;
        }

        Command::Tag { record, trace } => {
            let record = check_record(record).context("Record does not fit in 31 bits")?;
            if trace {
                println!("{}", generator.trace(record));
            } else {
                let tag = generator.tag_of(record);
                let entry = TallyEntry::from_record(record);
                println!(
                    "record: 0x{:08X}, {}, tag: {}",
                    record,
                    entry,
                    to_binary_string(tag as u64, TAG_SIZE)
                );
            }
        }

        Command::DecodeKey => {
            println!("key: 0x{:08X}", cli.key);
            println!("{}", generator.key());
            println!("swap: {}", if key.swaps() { "active" } else { "skipped (bx == by)" });
        }
    }

    Ok(())
}
