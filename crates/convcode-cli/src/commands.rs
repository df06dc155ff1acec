//! Subcommand execution. Output goes to the writer passed in; logs go to
//! stderr through `tracing`.

use std::io::Write;

use convcode_core::{free_distance, ConvolutionalEncoder, DecisionMode, ViterbiDecoder};
use convcode_sim::{BerCurve, Simulator, SweepConfig};

use crate::cli::{bits_to_text, format_bits, parse_bits, parse_symbols, text_to_bits, Command, OutputFormat};
use crate::config::AppConfig;
use crate::error::CliResult;

pub fn run(command: &Command, config: &AppConfig, out: &mut impl Write) -> CliResult<()> {
    let encoder = ConvolutionalEncoder::new(config.code.clone())?;

    match command {
        Command::Encode { bits } => {
            let data = parse_bits(bits)?;
            writeln!(out, "{}", format_bits(&encoder.encode(&data)))?;
        }
        Command::Decode { soft, input } => {
            let decoder = ViterbiDecoder::new(&encoder);
            let decoded = if *soft {
                let symbols = parse_symbols(input)?;
                warn_on_truncation(&decoder, symbols.len());
                decoder.decode_soft(&symbols)
            } else {
                let bits = parse_bits(input)?;
                warn_on_truncation(&decoder, bits.len());
                decoder.decode(&bits)
            };
            writeln!(out, "{}", format_bits(&decoded))?;
        }
        Command::Demo { message, flip } => demo(&encoder, message, flip, out)?,
        Command::Ber {
            block_length,
            snr,
            blocks,
            hard,
            seed,
            format,
        } => {
            let mut sweep = config.sweep.clone();
            if let Some(len) = block_length {
                sweep.block_length = *len;
            }
            if let Some(snr) = snr {
                sweep.snr_db = snr.clone();
            }
            if let Some(blocks) = blocks {
                sweep.num_blocks = *blocks;
            }
            if *hard {
                sweep.decision = DecisionMode::Hard;
            }
            if let Some(seed) = seed {
                sweep.seed = *seed;
            }
            ber(&encoder, &sweep, *format, out)?;
        }
        Command::Info => info(&encoder, out)?,
    }

    Ok(())
}

fn warn_on_truncation(decoder: &ViterbiDecoder, received: usize) {
    if let Err(err) = decoder.check_length(received) {
        tracing::warn!(%err, "decoding whole steps only");
    }
}

fn demo(encoder: &ConvolutionalEncoder, message: &str, flip: &[usize], out: &mut impl Write) -> CliResult<()> {
    let decoder = ViterbiDecoder::new(encoder);
    let bits = text_to_bits(message);
    let encoded = encoder.encode(&bits);

    writeln!(out, "Code:     {}", encoder.config())?;
    writeln!(out, "States:   {}", encoder.state_count())?;
    writeln!(out, "Message:  {:?} ({} bits)", message, bits.len())?;
    writeln!(out, "Encoded:  {} bits", encoded.len())?;

    let mut corrupted = encoded.clone();
    let mut flipped = 0;
    for &pos in flip {
        if let Some(bit) = corrupted.get_mut(pos) {
            *bit = !*bit;
            flipped += 1;
        } else {
            tracing::warn!(pos, len = encoded.len(), "flip position past end of block, skipped");
        }
    }
    writeln!(out, "Flipped:  {} bits", flipped)?;

    let decoded = decoder.decode(&corrupted);
    let residual = bits.iter().zip(&decoded).filter(|(a, b)| a != b).count();
    let text = bits_to_text(&decoded[..bits.len().min(decoded.len())]);

    writeln!(out, "Decoded:  {:?} ({} bits)", text, decoded.len())?;
    writeln!(out, "Residual: {} bit errors", residual)?;
    Ok(())
}

fn ber(encoder: &ConvolutionalEncoder, sweep: &SweepConfig, format: OutputFormat, out: &mut impl Write) -> CliResult<()> {
    let curve = Simulator::new(encoder.clone()).simulate_ber(sweep)?;

    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&curve)?)?,
        OutputFormat::Csv => write!(out, "{}", curve.to_csv())?,
        OutputFormat::Table => write_table(&curve, out)?,
    }
    Ok(())
}

fn write_table(curve: &BerCurve, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{} ({} decision)", curve.code, curve.decision)?;
    writeln!(
        out,
        "{} blocks of {} bits per point",
        curve.num_blocks, curve.block_length
    )?;
    writeln!(
        out,
        "{:>8}  {:>12}  {:>23}  {:>12}",
        "SNR (dB)", "coded BER", "coded 95% CI", "uncoded BER"
    )?;
    for p in &curve.points {
        let (lo, hi) = p.coded_interval();
        writeln!(
            out,
            "{:>8.2}  {:>12.4e}  {:>23}  {:>12.4e}",
            p.snr_db,
            p.coded_ber(),
            format!("[{:.3e}, {:.3e}]", lo, hi),
            p.uncoded_ber()
        )?;
    }
    Ok(())
}

fn info(encoder: &ConvolutionalEncoder, out: &mut impl Write) -> CliResult<()> {
    writeln!(out, "Constraint length: {}", encoder.constraint_length())?;
    writeln!(out, "Outputs per input: {}", encoder.outputs_per_input())?;
    writeln!(out, "Rate:              1/{} ({:.3})", encoder.outputs_per_input(), encoder.rate())?;
    writeln!(out, "Memory:            {}", encoder.memory())?;
    writeln!(out, "States:            {}", encoder.state_count())?;
    writeln!(out, "Free distance:     {}", free_distance(encoder))?;
    for (i, g) in encoder.generators().iter().enumerate() {
        writeln!(
            out,
            "Generator {}:       0o{:o} ({:0width$b})",
            i,
            g,
            g,
            width = encoder.constraint_length()
        )?;
    }
    Ok(())
}
