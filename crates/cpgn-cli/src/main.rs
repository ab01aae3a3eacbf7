//! Convert compressed chess games to PGN or JSON, and JSON games back to the
//! compressed format.
//!
//! Usage:
//!   cpgn -u game.cpgn [-o game.pgn] [--format pgn|json]
//!   cpgn -c game.json [-o game.cpgn]
//!
//! Reads CPGN_MAX_VARIATION_DEPTH and CPGN_OUTPUT_FORMAT from the environment or `.env`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use tracing::{error, info};

use cpgn_cli::args::{parse_args, Command, USAGE};
use cpgn_cli::config::CliConfig;

fn write_output(path: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), bytes = bytes.len(), "output written");
        }
        None => io::stdout().write_all(bytes)?,
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(err) => {
            eprint!("{err}\n\n{USAGE}");
            std::process::exit(2);
        }
    };
    let config = CliConfig::load()?;

    match args.command {
        Command::Help => print!("{USAGE}"),
        Command::Uncompress(input) => {
            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let format = args.format.unwrap_or(config.output_format);
            match cpgn_cli::uncompress(&bytes, &config, format) {
                Ok(text) => write_output(args.output.as_deref(), text.as_bytes())?,
                Err((partial, err)) => {
                    if let Some(text) = partial {
                        error!("writing the part of the game decoded before the error");
                        write_output(args.output.as_deref(), text.as_bytes())?;
                    }
                    return Err(err.into());
                }
            }
        }
        Command::Compress(input) => {
            let json = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let bytes = cpgn_cli::compress(&json)?;
            write_output(args.output.as_deref(), &bytes)?;
        }
    }

    Ok(())
}
