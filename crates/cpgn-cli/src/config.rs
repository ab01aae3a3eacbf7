//! CLI configuration from environment variables

use std::env;
use std::str::FromStr;

use cpgn_core::DecoderOptions;
use tracing::warn;

use crate::error::CliError;

/// Each nesting level is a stack frame in the decoder.
const MAX_VARIATION_DEPTH_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pgn,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pgn" => Ok(OutputFormat::Pgn),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::Config(format!(
                "unknown output format '{other}' (expected pgn or json)"
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Variation nesting accepted by the decoder
    pub max_variation_depth: usize,

    /// Format used for decoded games unless `--format` overrides it
    pub output_format: OutputFormat,
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, CliError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let max_variation_depth = lookup("CPGN_MAX_VARIATION_DEPTH")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DecoderOptions::default().max_variation_depth);
        if max_variation_depth > MAX_VARIATION_DEPTH_LIMIT {
            warn!(
                requested = max_variation_depth,
                limit = MAX_VARIATION_DEPTH_LIMIT,
                "variation depth clamped"
            );
        }
        let max_variation_depth = max_variation_depth.min(MAX_VARIATION_DEPTH_LIMIT);

        let output_format = match lookup("CPGN_OUTPUT_FORMAT") {
            Some(value) => value.parse()?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            max_variation_depth,
            output_format,
        })
    }

    pub fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions {
            max_variation_depth: self.max_variation_depth,
        }
    }
}
