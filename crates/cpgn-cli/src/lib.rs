//! Command-line front end: configuration, argument parsing and PGN rendering.

pub mod args;
pub mod config;
pub mod error;
pub mod render;

use cpgn_core::{decode_game_with, encode_game, Game};
use tracing::info;

use crate::config::{CliConfig, OutputFormat};
use crate::error::CliError;

/// Decode a compressed game and render it. On failure the game decoded so far is
/// rendered too and returned next to the error.
pub fn uncompress(
    bytes: &[u8],
    config: &CliConfig,
    format: OutputFormat,
) -> Result<String, (Option<String>, CliError)> {
    match decode_game_with(bytes, config.decoder_options()) {
        Ok(game) => {
            info!(tokens = game.tokens.len(), tags = game.tags.len(), "game decoded");
            render::render(&game, format).map_err(|err| (None, err))
        }
        Err(partial) => {
            let text = render::render(&partial.game, format).ok();
            Err((text, partial.into()))
        }
    }
}

/// Encode a game given as JSON.
pub fn compress(json: &str) -> Result<Vec<u8>, CliError> {
    let game: Game = serde_json::from_str(json)?;
    let bytes = encode_game(&game)?;
    info!(tokens = game.tokens.len(), bytes = bytes.len(), "game encoded");
    Ok(bytes)
}
