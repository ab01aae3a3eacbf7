#![allow(dead_code)]

//! Hand-assembled compressed games, written as strings of '0' and '1'.

pub const KING: &str = "000";
pub const QUEEN: &str = "001";
pub const BISHOP: &str = "010";
pub const KNIGHT: &str = "011";
pub const ROOK: &str = "100";
pub const PAWN: &str = "101";

pub const KINGSIDE_CASTLING: &str = "11000";
pub const QUEENSIDE_CASTLING: &str = "11001";
pub const PROMOTION: &str = "1101";
pub const PROMOTE_QUEEN: &str = "00";
pub const PROMOTE_BISHOP: &str = "01";
pub const PROMOTE_KNIGHT: &str = "10";
pub const PROMOTE_ROOK: &str = "11";

pub const COMMENT: &str = "11100";
pub const VARIATION_START: &str = "111011";
pub const VARIATION_END: &str = "111010";
pub const NAG: &str = "11110";
pub const GAME_END: &str = "11111";
pub const WHITE_WINS: &str = "00";
pub const BLACK_WINS: &str = "01";
pub const DRAW: &str = "10";

#[derive(Debug, Default, Clone)]
pub struct BitString {
    bits: String,
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bits such as `"1101"`.
    pub fn push(mut self, bits: &str) -> Self {
        assert!(bits.chars().all(|c| c == '0' || c == '1'), "not a bit string: {bits}");
        self.bits.push_str(bits);
        self
    }

    pub fn value(self, width: usize, value: u32) -> Self {
        let bits = format!("{value:0width$b}");
        assert_eq!(bits.len(), width, "{value} does not fit in {width} bits");
        self.push(&bits)
    }

    /// NUL-terminated text.
    pub fn text(mut self, text: &str) -> Self {
        for byte in text.bytes().chain(std::iter::once(0)) {
            self = self.value(8, u32::from(byte));
        }
        self
    }

    pub fn version(self, version: u8) -> Self {
        self.value(8, u32::from(version))
    }

    pub fn tags(mut self, tags: &[(&str, &str)]) -> Self {
        for (name, value) in tags {
            self = self.text(name).text(value);
        }
        self.value(8, 0)
    }

    pub fn en_passant(self, flags: &str) -> Self {
        self.value(4, flags.len() as u32).push(flags)
    }

    /// Piece code followed by a destination such as `"e4"`.
    pub fn mv(self, piece: &str, square: &str) -> Self {
        let mut chars = square.chars();
        let file = chars.next().expect("file") as u32 - 'a' as u32;
        let rank = chars.next().expect("rank") as u32 - '1' as u32;
        self.push(piece).value(3, file).value(3, rank)
    }

    pub fn comment(self, text: &str) -> Self {
        self.push(COMMENT).text(text)
    }

    pub fn nag(self, code: u8) -> Self {
        self.push(NAG).value(8, u32::from(code))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Pack into bytes, zero padding the last one.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bits = self.bits.clone();
        while bits.len() % 8 != 0 {
            bits.push('0');
        }
        bits.as_bytes()
            .chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b - b'0')))
            .collect()
    }
}

/// Version 1, no tags, no en-passant captures.
pub fn header() -> BitString {
    BitString::new().version(1).tags(&[]).en_passant("")
}

/// A game exercising every token kind.
///
/// 1. e4 e6 2. e5 d5 (2... d6 {Avoids en passant}) 3. exd6 e.p. Qxd6 4. Qf3 Be7
/// 5. d3 Nf6 6. Bg5 {Blunder, Qe5+ wins the bishop.} 6... O-O 7. Nc3 Nd5 8. Bxe7 Nxe7
/// 9. O-O-O a5 10. a3 a4 11. b4 axb3 {En passant !!} 12. Kd2 b2 13. Ra1 bxa1=Q $41
/// {Black has the attack} 14. a4 Qxc3+ 15. Kxc3 Nd5+ 16. Kc4 Qb4# 0-1
pub fn fixture() -> BitString {
    BitString::new()
        .version(0)
        .tags(&[("Date", "Epoch: 01/01/1970")])
        .en_passant("10")
        .mv(PAWN, "e4")
        .mv(PAWN, "e6")
        .mv(PAWN, "e5")
        .mv(PAWN, "d5")
        .push(VARIATION_START)
        .mv(PAWN, "d6")
        .comment("Avoids en passant")
        .push(VARIATION_END)
        .mv(PAWN, "d6")
        .mv(QUEEN, "d6")
        .mv(QUEEN, "f3")
        .mv(BISHOP, "e7")
        .mv(PAWN, "d3")
        .mv(KNIGHT, "f6")
        .mv(BISHOP, "g5")
        .comment("Blunder, Qe5+ wins the bishop.")
        .push(KINGSIDE_CASTLING)
        .mv(KNIGHT, "c3")
        .mv(KNIGHT, "d5")
        .mv(BISHOP, "e7")
        .mv(KNIGHT, "e7")
        .push(QUEENSIDE_CASTLING)
        .mv(PAWN, "a5")
        .mv(PAWN, "a3")
        .mv(PAWN, "a4")
        .mv(PAWN, "b4")
        .mv(PAWN, "b3")
        .comment("En passant !!")
        .mv(KING, "d2")
        .mv(PAWN, "b2")
        .mv(ROOK, "a1")
        // One promotable pawn, so no pawn index; a1 and b1 are targets, a1 first.
        .push(PROMOTION)
        .push(PROMOTE_QUEEN)
        .push("0")
        .nag(41)
        .comment("Black has the attack")
        .mv(PAWN, "a4")
        .mv(QUEEN, "c3")
        .mv(KING, "c3")
        .mv(KNIGHT, "d5")
        .mv(KING, "c4")
        .mv(QUEEN, "b4")
        .push(GAME_END)
        .push(BLACK_WINS)
}

pub const FIXTURE_PGN: &str = "[Date \"Epoch: 01/01/1970\"]\n\n\
1. e4 e6 2. e5 d5 (2... d6 {Avoids en passant}) 3. exd6 e.p. Qxd6 4. Qf3 Be7 \
5. d3 Nf6 6. Bg5 {Blunder, Qe5+ wins the bishop.} 6... O-O 7. Nc3 Nd5 8. Bxe7 Nxe7 \
9. O-O-O a5 10. a3 a4 11. b4 axb3 {En passant !!} 12. Kd2 b2 13. Ra1 bxa1=Q $41 \
{Black has the attack} 14. a4 Qxc3+ 15. Kxc3 Nd5+ 16. Kc4 Qb4# 0-1\n";
