use std::fmt::{Debug, Display};

use log::trace;
use thiserror::Error;

use crate::moves::Move;

pub const PIECE_NONE: u8 = 0;
pub const PIECE_PAWN: u8 = 1;
pub const PIECE_KNIGHT: u8 = 2;
pub const PIECE_BISHOP: u8 = 3;
pub const PIECE_ROOK: u8 = 4;
pub const PIECE_QUEEN: u8 = 5;
pub const PIECE_KING: u8 = 6;
/// Bits 0-6 hold the piece kind
pub const PIECE_MASK: u8 = 0x7F;

pub const COLOR_BLACK: u8 = 1 << 7;
pub const COLOR_FLAG_MASK: u8 = COLOR_BLACK;

pub const CASTLE_WHITE_KING_FLAG: u8 = 1 << CastlingValue::WhiteKing as u8;
pub const CASTLE_WHITE_QUEEN_FLAG: u8 = 1 << CastlingValue::WhiteQueen as u8;
pub const CASTLE_BLACK_KING_FLAG: u8 = 1 << CastlingValue::BlackKing as u8;
pub const CASTLE_BLACK_QUEEN_FLAG: u8 = 1 << CastlingValue::BlackQueen as u8;

pub const BOARD_SQUARES: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChessError {
    #[error("square index {0} is outside of the board")]
    OutOfRange(u8),
    #[error("value {0:#04x} is not a valid piece")]
    InvalidPiece(u8),
    #[error("invalid position string: {0}")]
    InvalidFormat(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn flag(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => COLOR_BLACK,
        }
    }

    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = PIECE_PAWN,
    Knight = PIECE_KNIGHT,
    Bishop = PIECE_BISHOP,
    Rook = PIECE_ROOK,
    Queen = PIECE_QUEEN,
    King = PIECE_KING,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    pub const fn from_bits(bits: u8) -> Option<PieceKind> {
        match bits & PIECE_MASK {
            PIECE_PAWN => Some(PieceKind::Pawn),
            PIECE_KNIGHT => Some(PieceKind::Knight),
            PIECE_BISHOP => Some(PieceKind::Bishop),
            PIECE_ROOK => Some(PieceKind::Rook),
            PIECE_QUEEN => Some(PieceKind::Queen),
            PIECE_KING => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Lowercase letter used by position strings
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

/// A square's contents. Blank is always stored as `PIECE_NONE` with no color bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Piece(u8);

impl Piece {
    pub const NONE: Piece = Piece(PIECE_NONE);

    pub const fn new(kind: PieceKind, color: Color) -> Piece {
        Piece(kind as u8 | color.flag())
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == PIECE_NONE
    }

    pub const fn kind(self) -> Option<PieceKind> {
        PieceKind::from_bits(self.0)
    }

    pub const fn color(self) -> Option<Color> {
        if self.is_none() {
            None
        } else if self.0 & COLOR_FLAG_MASK == COLOR_BLACK {
            Some(Color::Black)
        } else {
            Some(Color::White)
        }
    }

    pub fn is_king(self) -> bool {
        self.kind() == Some(PieceKind::King)
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::ALL
            .into_iter()
            .find(|kind| kind.letter() == c.to_ascii_lowercase())?;
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };

        Some(Piece::new(kind, color))
    }
}

impl TryFrom<u8> for Piece {
    type Error = ChessError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value == PIECE_NONE || PieceKind::from_bits(value).is_some() {
            Ok(Piece(value))
        } else {
            Err(ChessError::InvalidPiece(value))
        }
    }
}

impl Debug for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x} ({})", self.0, piece_to_name(*self))
    }
}

/// Uppercase for white, lowercase for black, '.' for an empty square
pub fn piece_to_name(piece: Piece) -> char {
    match (piece.kind(), piece.color()) {
        (Some(kind), Some(Color::White)) => kind.letter().to_ascii_uppercase(),
        (Some(kind), Some(Color::Black)) => kind.letter(),
        _ => '.',
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CastlingValue {
    WhiteKing = 0,
    WhiteQueen,
    BlackKing,
    BlackQueen,
}

#[inline]
pub const fn file_8x8(index: u8) -> u8 {
    index & 7
}

#[inline]
pub const fn rank_8x8(index: u8) -> u8 {
    index >> 3
}

pub fn index_8x8_to_pos_str(index: u8) -> String {
    format!("{}{}", (b'a' + file_8x8(index)) as char, rank_8x8(index) + 1)
}

pub fn pos_str_to_index_8x8(pos: &str) -> Option<u8> {
    let bytes = pos.as_bytes();
    if bytes.len() != 2 {
        return None;
    }

    match (bytes[0], bytes[1]) {
        (file @ b'a'..=b'h', rank @ b'1'..=b'8') => Some((rank - b'1') * 8 + (file - b'a')),
        _ => None,
    }
}

fn check_square(index: u8) -> Result<usize, ChessError> {
    if (index as usize) < BOARD_SQUARES {
        Ok(index as usize)
    } else {
        Err(ChessError::OutOfRange(index))
    }
}

/// Index 0 is a1, index 7 is h1, index 63 is h8.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Piece; BOARD_SQUARES],
    /// Not enforced, only tracked for display and position strings
    pub white_to_move: bool,
    pub castling_rights: u8,
    pub last_move: Option<Move>,
    pub move_counter: u32,
}

impl Board {
    pub fn new() -> Board {
        Board::default()
    }

    pub fn get_piece(&self, index: u8) -> Result<Piece, ChessError> {
        Ok(self.squares[check_square(index)?])
    }

    pub fn set_piece(&mut self, index: u8, piece: Piece) -> Result<(), ChessError> {
        self.squares[check_square(index)?] = piece;
        Ok(())
    }

    pub fn set_piece_bits(&mut self, index: u8, bits: u8) -> Result<(), ChessError> {
        let index = check_square(index)?;
        self.squares[index] = Piece::try_from(bits)?;
        Ok(())
    }

    /// Moves whatever is on `from` onto `to` and blanks `from`. Nothing about chess rules is checked.
    pub fn relocate(&mut self, from: u8, to: u8) -> Result<(), ChessError> {
        let from = check_square(from)?;
        let to = check_square(to)?;
        self.relocate_64(from, to);
        Ok(())
    }

    #[inline]
    pub(crate) fn get_piece_64(&self, index: usize) -> Piece {
        self.squares[index]
    }

    #[inline]
    pub(crate) fn write_piece(&mut self, piece: Piece, index: usize) {
        self.squares[index] = piece;
    }

    pub(crate) fn relocate_64(&mut self, from: usize, to: usize) {
        trace!("relocate {from} -> {to}");
        self.squares[to] = self.squares[from];
        self.squares[from] = Piece::NONE;
    }

    pub fn squares(&self) -> &[Piece; BOARD_SQUARES] {
        &self.squares
    }

    pub fn occupied_squares(&self) -> impl Iterator<Item = (u8, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, piece)| !piece.is_none())
            .map(|(i, piece)| (i as u8, *piece))
    }

    pub fn find_king(&self, color: Color) -> Option<u8> {
        let king = Piece::new(PieceKind::King, color);
        self.occupied_squares().find(|(_, piece)| *piece == king).map(|(i, _)| i)
    }

    pub fn side_to_move(&self) -> Color {
        if self.white_to_move { Color::White } else { Color::Black }
    }

    pub fn has_castling_right(&self, castling: CastlingValue) -> bool {
        self.castling_rights & (1 << castling as u8) != 0
    }

    /// Board drawn as rank 8 down to rank 1, one character per square
    pub fn pretty_squares(&self) -> String {
        self.squares
            .chunks_exact(8)
            .map(|rank| rank.iter().map(|p| piece_to_name(*p)).collect::<String>())
            .rev()
            .collect::<Vec<String>>()
            .join("\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            squares: [Piece::NONE; BOARD_SQUARES],
            white_to_move: true,
            castling_rights: 0,
            last_move: None,
            move_counter: 0,
        }
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("squares", &"See end value")
            .field("white_to_move", &self.white_to_move)
            .field("castling_rights", &format_args!("{:#06b}", self.castling_rights))
            .field("last_move", &self.last_move)
            .field("move_counter", &self.move_counter)
            .finish()?;

        writeln!(f, "\nsquares: \n{}", self.pretty_squares())
    }
}
