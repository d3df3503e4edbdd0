use log::trace;

use crate::{
    board::{Board, ChessError, Color},
    moves::{Move, MoveRollback},
};

/// Which kings are attacked, relative to the color that was asked about
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckStatus {
    pub own_king_attacked: bool,
    pub opponent_king_attacked: bool,
}

impl Board {
    /// Plays `r#move` on the board, scans every piece for attacks on a king, then puts the board back.
    /// Both squares of the move are checked before anything is changed.
    pub fn simulate_and_scan(&mut self, color: Color, r#move: Option<Move>) -> Result<CheckStatus, ChessError> {
        let Some(r#move) = r#move else {
            return Ok(self.check_status(color));
        };

        let rollback = self.make_simulated_move(r#move)?;
        let status = self.check_status(color);
        self.unmake_simulated_move(r#move, rollback);

        trace!("Simulated {} for {color}: {:?}", r#move.simple_long_algebraic_notation(), status);
        Ok(status)
    }

    /// Scans the board as it stands. Destinations come from the pseudo legal generator, never the
    /// filtered one, as filtering calls back into this scan.
    pub fn check_status(&self, color: Color) -> CheckStatus {
        let mut status = CheckStatus::default();

        for (from, _) in self.occupied_squares() {
            for to in self.pseudo_legal_destinations_64(from) {
                let target_piece = self.get_piece_64(to as usize);
                if !target_piece.is_king() {
                    continue;
                }

                // Destinations never hold a piece of the mover's own color
                if target_piece.color() == Some(color) {
                    status.own_king_attacked = true;
                } else {
                    status.opponent_king_attacked = true;
                }
            }

            if status.own_king_attacked && status.opponent_king_attacked {
                break;
            }
        }

        status
    }

    /// `Some(color)` when that color's king is attacked, otherwise `Some` of the opponent if theirs is
    pub fn color_in_check(&self, color: Color) -> Option<Color> {
        let status = self.check_status(color);
        if status.own_king_attacked {
            Some(color)
        } else if status.opponent_king_attacked {
            Some(color.opponent())
        } else {
            None
        }
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.check_status(color).own_king_attacked
    }

    fn make_simulated_move(&mut self, r#move: Move) -> Result<MoveRollback, ChessError> {
        let captured_piece = self.get_piece(r#move.to)?;
        self.get_piece(r#move.from)?;

        self.relocate_64(r#move.from as usize, r#move.to as usize);
        Ok(MoveRollback { captured_piece })
    }

    fn unmake_simulated_move(&mut self, r#move: Move, rollback: MoveRollback) {
        self.relocate_64(r#move.to as usize, r#move.from as usize);
        self.write_piece(rollback.captured_piece, r#move.to as usize);
    }
}
