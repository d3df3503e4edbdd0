use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::board::{Board, ChessError, Piece, index_8x8_to_pos_str, piece_to_name, pos_str_to_index_8x8};

static MOVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-h][1-8])([a-h][1-8])$").expect("move pattern is valid"));

#[derive(PartialEq, Eq, Copy, Clone, Hash)]
pub struct Move {
    pub from: u8,
    pub to: u8,
}

impl Move {
    pub fn new(from_square_index: u8, to_square_index: u8) -> Move {
        Move {
            from: from_square_index,
            to: to_square_index,
        }
    }

    /// Piece letter, origin, '-' or 'x' for a capture, destination. e.g. `Nb1-c3`, `Pe4xd5`
    pub fn pretty_print(&self, board: Option<&Board>) -> String {
        let (piece_name, capture) = match board {
            Some(b) => (
                b.get_piece(self.from).map_or('?', piece_to_name),
                b.is_capture(*self),
            ),
            None => ('?', false),
        };
        let capture_char = if capture { 'x' } else { '-' };

        format!(
            "{}{}{}{}",
            piece_name,
            square_name(self.from),
            capture_char,
            square_name(self.to)
        )
    }

    pub fn simple_long_algebraic_notation(&self) -> String {
        format!("{}{}", square_name(self.from), square_name(self.to))
    }

    /// Parses coordinate notation such as `e2e3`
    pub fn from_simple_long_algebraic_notation(notation: &str) -> Result<Move, ChessError> {
        let Some(captures) = MOVE_PATTERN.captures(notation.trim()) else {
            return Err(ChessError::InvalidFormat(format!(
                "Expected a move like 'e2e3' but got '{notation}'"
            )));
        };

        let from = pos_str_to_index_8x8(&captures[1]);
        let to = pos_str_to_index_8x8(&captures[2]);
        match (from, to) {
            (Some(from), Some(to)) => Ok(Move::new(from, to)),
            _ => Err(ChessError::InvalidFormat(format!("Could not read squares of move '{notation}'"))),
        }
    }
}

fn square_name(index: u8) -> String {
    if index < 64 {
        index_8x8_to_pos_str(index)
    } else {
        format!("#{index}")
    }
}

impl std::fmt::Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Move from: {} to: {} ({})",
            self.from,
            self.to,
            self.simple_long_algebraic_notation()
        )
    }
}

/// What a simulated move needs to be taken back
#[derive(Debug, Default)]
pub struct MoveRollback {
    pub captured_piece: Piece,
}

impl Board {
    /// True when the destination currently holds a piece. Callers use this before
    /// [Board::try_move] to tell a capture from a quiet move.
    pub fn is_capture(&self, r#move: Move) -> bool {
        self.get_piece(r#move.to).is_ok_and(|piece| !piece.is_none())
    }

    /// Commits `r#move` if it is one of the legal destinations of the piece on its origin square.
    /// Returns false and leaves the board untouched otherwise.
    pub fn try_move(&mut self, r#move: Move) -> bool {
        let legal_destinations = match self.generate_legal_destinations(r#move.from) {
            Ok(destinations) => destinations,
            Err(e) => {
                warn!("Rejected move {:?}: {e}", r#move);
                return false;
            }
        };

        if !legal_destinations.contains(&r#move.to) {
            debug!("Rejected illegal move {}", r#move.pretty_print(Some(self)));
            return false;
        }

        debug!("Making move {}", r#move.pretty_print(Some(self)));
        self.relocate_64(r#move.from as usize, r#move.to as usize);
        self.last_move = Some(r#move);
        self.move_counter += 1;
        self.white_to_move = !self.white_to_move;

        true
    }
}
