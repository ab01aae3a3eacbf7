//! Command-line argument parsing.

use std::path::PathBuf;

use crate::config::OutputFormat;
use crate::error::CliError;

pub const USAGE: &str = "\
Usage:
  cpgn -u <game.cpgn> [-o <output>] [--format pgn|json]
  cpgn -c <game.json> [-o <output>]

Options:
  -u, --uncompress <file>  decode a compressed game
  -c, --compress <file>    encode a JSON game
  -o, --output <file>      write to a file instead of stdout
      --format <pgn|json>  output format for -u (default: CPGN_OUTPUT_FORMAT or pgn)
  -h, --help               print this message
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Uncompress(PathBuf),
    Compress(PathBuf),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

/// Parse arguments, program name excluded.
pub fn parse_args(args: &[String]) -> Result<Args, CliError> {
    let mut command = None;
    let mut output = None;
    let mut format = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
        };

        match flag {
            "-h" | "--help" => {
                return Ok(Args {
                    command: Command::Help,
                    output: None,
                    format: None,
                })
            }
            "-u" | "--uncompress" => command = Some(Command::Uncompress(value()?.into())),
            "-c" | "--compress" => command = Some(Command::Compress(value()?.into())),
            "-o" | "--output" => output = Some(PathBuf::from(value()?)),
            "--format" => format = Some(value()?.parse()?),
            other => return Err(CliError::Usage(format!("unexpected argument '{other}'"))),
        }
        i += 1;
    }

    let command = command.ok_or_else(|| CliError::Usage("one of -u or -c is required".into()))?;
    Ok(Args {
        command,
        output,
        format,
    })
}
