use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use convcode_core::logging::{LogFormat, LogLevel};

use crate::error::{CliError, CliResult};

#[derive(Debug, Parser)]
#[command(name = "convcode", version, about = "Convolutional encoder and Viterbi decoder", long_about = None)]
pub struct Cli {
    /// Configuration file (overrides the search path)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Constraint length K
    #[arg(short = 'k', long, global = true)]
    pub constraint_length: Option<usize>,

    /// Generator tap masks, comma separated (0o, 0b and 0x prefixes accepted)
    #[arg(short = 'g', long, global = true, value_delimiter = ',', value_parser = parse_generator)]
    pub generators: Option<Vec<u32>>,

    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode a bit string such as 10110
    Encode { bits: String },

    /// Decode a received bit string, or soft symbols with --soft
    Decode {
        /// Treat the input as comma-separated real symbols (0 -> -1.0, 1 -> +1.0)
        #[arg(long)]
        soft: bool,
        #[arg(allow_hyphen_values = true)]
        input: String,
    },

    /// Encode a text message, flip coded bits, decode it back
    Demo {
        #[arg(short, long, default_value = "HELLO")]
        message: String,

        /// Coded bit positions to flip
        #[arg(long, value_delimiter = ',', default_values_t = [10usize, 25, 40])]
        flip: Vec<usize>,
    },

    /// Coded vs. uncoded bit error rate over AWGN
    Ber {
        #[arg(long)]
        block_length: Option<usize>,

        /// SNR points in dB, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        snr: Option<Vec<f64>>,

        /// Blocks per SNR point
        #[arg(long)]
        blocks: Option<usize>,

        /// Hard-decision decoding
        #[arg(long)]
        hard: bool,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Describe the configured code
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Parse a generator mask in decimal or with a 0o/0b/0x prefix.
pub fn parse_generator(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let (digits, radix) = match s.get(..2) {
        Some("0o") | Some("0O") => (&s[2..], 8),
        Some("0b") | Some("0B") => (&s[2..], 2),
        Some("0x") | Some("0X") => (&s[2..], 16),
        _ => (s, 10),
    };
    u32::from_str_radix(digits, radix).map_err(|e| format!("invalid generator '{}': {}", s, e))
}

/// Parse a 0/1 string. Whitespace, commas and underscores are ignored.
pub fn parse_bits(s: &str) -> CliResult<Vec<bool>> {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '_')
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(CliError::InvalidBit(other)),
        })
        .collect()
}

/// Parse comma- or whitespace-separated real symbols.
pub fn parse_symbols(s: &str) -> CliResult<Vec<f64>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f64>().map_err(|_| CliError::InvalidSymbol(t.to_string())))
        .collect()
}

pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Text to bits, most significant bit of each byte first.
pub fn text_to_bits(text: &str) -> Vec<bool> {
    text.bytes()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1 == 1))
        .collect()
}

/// Pack bits back into bytes (MSB first) and decode as lossy UTF-8. A
/// trailing partial byte is dropped.
pub fn bits_to_text(bits: &[bool]) -> String {
    let bytes: Vec<u8> = bits
        .chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
