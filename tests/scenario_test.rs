//! Integration tests: disambiguation, configuration limits and the CLI entry points.

mod common;

use common::{BitString, BISHOP, KNIGHT, PAWN, QUEEN, ROOK};
use cpgn_cli::config::{CliConfig, OutputFormat};
use cpgn_cli::error::CliError;
use cpgn_cli::render::render_pgn;
use cpgn_core::{decode_game, encode_game, DecodeError, Outcome, Square};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

/// Both rooks can reach d1 once the first rank is cleared and White has castled.
fn rooks_on_a1_and_f1() -> BitString {
    let moves = [
        (KNIGHT, "c3"), (PAWN, "a6"),
        (PAWN, "b3"), (PAWN, "a5"),
        (BISHOP, "b2"), (PAWN, "h6"),
        (PAWN, "e3"), (PAWN, "h5"),
        (QUEEN, "f3"), (PAWN, "b6"),
        (BISHOP, "d3"), (PAWN, "b5"),
        (KNIGHT, "h3"), (PAWN, "g6"),
    ];
    let mut bits = common::header();
    for (piece, square) in moves {
        bits = bits.mv(piece, square);
    }
    bits.push(common::KINGSIDE_CASTLING).mv(PAWN, "g5")
}

#[test]
fn test_two_rooks_read_one_index_bit() {
    for (index, from, san) in [("0", "a1", "Rad1"), ("1", "f1", "Rfd1")] {
        let bits = rooks_on_a1_and_f1()
            .mv(ROOK, "d1")
            .push(index)
            .push(common::GAME_END)
            .push(common::DRAW);
        let bytes = bits.to_bytes();

        let game = decode_game(&bytes).unwrap();
        let last = game.mainline().last().unwrap();
        assert_eq!((last.from, last.to), (sq(from), sq("d1")));
        assert_eq!(game.outcome(), Some(Outcome::Draw));
        assert!(render_pgn(&game).unwrap().ends_with(&format!("8. O-O g5 9. {san} 1/2-1/2\n")));
        assert_eq!(encode_game(&game).unwrap(), bytes);
    }
}

#[test]
fn test_depth_limit_from_config() {
    // 1. e4 e5 (1... c5 2. Nf3 (2. Nc3))
    let bytes = common::header()
        .mv(PAWN, "e4")
        .mv(PAWN, "e5")
        .push(common::VARIATION_START)
        .mv(PAWN, "c5")
        .mv(KNIGHT, "f3")
        .push(common::VARIATION_START)
        .mv(KNIGHT, "c3")
        .push(common::VARIATION_END)
        .push(common::VARIATION_END)
        .to_bytes();

    let config = CliConfig::from_lookup(|key| {
        (key == "CPGN_MAX_VARIATION_DEPTH").then(|| "1".to_string())
    })
    .unwrap();

    let (partial, err) = cpgn_cli::uncompress(&bytes, &config, OutputFormat::Pgn).unwrap_err();
    // The variation that hit the limit keeps the moves read before it.
    assert_eq!(partial.as_deref(), Some("1. e4 e5 (1... c5 2. Nf3) *\n"));
    match err {
        CliError::Decode(partial) => {
            assert!(matches!(partial.error, DecodeError::VariationTooDeep { limit: 1, .. }))
        }
        other => panic!("unexpected error: {other}"),
    }

    let default = CliConfig::from_lookup(|_| None).unwrap();
    let text = cpgn_cli::uncompress(&bytes, &default, OutputFormat::Pgn).unwrap();
    assert_eq!(text, "1. e4 e5 (1... c5 2. Nf3 (2. Nc3)) *\n");
}

#[test]
fn test_json_output_compresses_back() {
    let bytes = common::fixture().to_bytes();
    let config = CliConfig::from_lookup(|_| None).unwrap();
    let json = cpgn_cli::uncompress(&bytes, &config, OutputFormat::Json).unwrap();
    assert!(json.contains("\"Epoch: 01/01/1970\""));
    assert_eq!(cpgn_cli::compress(&json).unwrap(), bytes);
}

#[test]
fn test_compress_rejects_bad_input() {
    assert!(matches!(cpgn_cli::compress("{"), Err(CliError::Json(_))));

    // A knight cannot move from b1 to b3.
    let bytes = common::header().mv(PAWN, "e4").to_bytes();
    let mut game = decode_game(&bytes).unwrap();
    if let cpgn_core::Token::Move(mv) = &mut game.tokens[0] {
        mv.piece = cpgn_core::Role::Knight;
        mv.from = sq("b1");
        mv.to = sq("b3");
    }
    let json = serde_json::to_string(&game).unwrap();
    assert!(matches!(cpgn_cli::compress(&json), Err(CliError::Encode(_))));
}

#[test]
fn test_trailing_zero_bits_are_padding() {
    // Header and two moves take 38 bits, so two zero bits pad the last byte. With no
    // game end token the game just stops there.
    let bits = common::header().mv(PAWN, "e4").mv(PAWN, "e5");
    assert_eq!(bits.len(), 38);
    let game = decode_game(&bits.to_bytes()).unwrap();
    assert_eq!(game.tokens.len(), 2);
    assert_eq!(game.outcome(), None);
    assert_eq!(render_pgn(&game).unwrap(), "1. e4 e5 *\n");
}
