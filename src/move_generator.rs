use log::trace;
use tinyvec::ArrayVec;

use crate::{
    board::{Board, ChessError, Color, PieceKind, file_8x8, index_8x8_to_pos_str, rank_8x8},
    moves::Move,
};

/// The most squares a single piece can reach: a queen in the centre of an empty board
pub const MAX_DESTINATIONS: usize = 27;

pub type Destinations = ArrayVec<[u8; MAX_DESTINATIONS]>;

/// If the piece can slide through squares when moving
const SLIDES: [bool; 5] = [false, true, true, true, false];
#[rustfmt::skip]
/// (file, rank) steps for each piece's valid directions, terminated by (0, 0).
/// Knight (1, 2) is +17 on the 8x8 index, king (1, 1) is +9.
const OFFSET: [[(i8, i8); 8]; 5] = [
    [ (-2, -1), (-1, -2), (1, -2), (2, -1), (-2, 1), (-1, 2), (1, 2), (2, 1) ], /* KNIGHT */
    [ (-1, -1), ( 1, -1), (-1, 1), (1,  1), ( 0, 0), ( 0, 0), (0, 0), (0, 0) ], /* BISHOP */
    [ ( 0, -1), (-1,  0), ( 1, 0), (0,  1), ( 0, 0), ( 0, 0), (0, 0), (0, 0) ], /* ROOK */
    [ (-1, -1), ( 0, -1), (1, -1), (-1, 0), ( 1, 0), (-1, 1), (0, 1), (1, 1) ], /* QUEEN */
    [ (-1, -1), ( 0, -1), (1, -1), (-1, 0), ( 1, 0), (-1, 1), (0, 1), (1, 1) ]  /* KING */
];

/// Applies a (file, rank) step, returning None if it leaves the board or wraps around a file edge
#[inline]
fn offset_square(index: u8, (file_step, rank_step): (i8, i8)) -> Option<u8> {
    let file = file_8x8(index) as i8 + file_step;
    let rank = rank_8x8(index) as i8 + rank_step;

    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as u8)
    } else {
        None
    }
}

impl Board {
    /// Squares the piece on `from` could move to, ignoring whether its own king is left attacked
    pub fn generate_pseudo_legal_destinations(&self, from: u8) -> Result<Destinations, ChessError> {
        self.get_piece(from)?;
        Ok(self.pseudo_legal_destinations_64(from))
    }

    /// Pseudo legal destinations with those leaving the mover's own king attacked removed.
    /// The board is the same afterwards as it was before.
    pub fn generate_legal_destinations(&mut self, from: u8) -> Result<Destinations, ChessError> {
        let Some(color) = self.get_piece(from)?.color() else {
            return Ok(Destinations::new());
        };

        let pseudo_legal = self.pseudo_legal_destinations_64(from);
        let mut result = Destinations::new();
        for to in pseudo_legal {
            let status = self.simulate_and_scan(color, Some(Move::new(from, to)))?;
            if status.own_king_attacked {
                trace!(
                    "{} -> {} leaves the {color} king attacked",
                    index_8x8_to_pos_str(from),
                    index_8x8_to_pos_str(to)
                );
            } else {
                result.push(to);
            }
        }

        Ok(result)
    }

    /// `from` must already be known to be on the board
    pub(crate) fn pseudo_legal_destinations_64(&self, from: u8) -> Destinations {
        let mut result = Destinations::new();
        let piece = self.get_piece_64(from as usize);
        let (Some(kind), Some(color)) = (piece.kind(), piece.color()) else {
            return result;
        };

        match kind {
            PieceKind::Pawn => self.add_pawn_destinations(from, color, &mut result),
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen | PieceKind::King => {
                let piece_type = kind as usize - 2;
                for offset in OFFSET[piece_type] {
                    if offset == (0, 0) {
                        break;
                    }

                    let mut cur_pos = from;
                    while let Some(target_pos) = offset_square(cur_pos, offset) {
                        let target_piece = self.get_piece_64(target_pos as usize);
                        match target_piece.color() {
                            None => result.push(target_pos),
                            Some(target_color) => {
                                if target_color != color {
                                    result.push(target_pos);
                                }
                                break;
                            }
                        }

                        if !SLIDES[piece_type] {
                            break;
                        }
                        cur_pos = target_pos;
                    }
                }
            }
        }

        result
    }

    fn add_pawn_destinations(&self, from: u8, color: Color, result: &mut Destinations) {
        let direction_sign: i8 = match color {
            Color::White => 1,
            Color::Black => -1,
        };

        if let Some(target_pos) = offset_square(from, (0, direction_sign))
            && self.get_piece_64(target_pos as usize).is_none()
        {
            result.push(target_pos);
        }

        for file_step in [-1, 1] {
            if let Some(target_pos) = offset_square(from, (file_step, direction_sign))
                && self.get_piece_64(target_pos as usize).color() == Some(color.opponent())
            {
                result.push(target_pos);
            }
        }
    }
}

#[cfg(test)]
mod move_generator_tests {
    use crate::board::pos_str_to_index_8x8;

    use super::*;

    fn squares(names: &[&str]) -> Vec<u8> {
        let mut result: Vec<u8> = names.iter().map(|n| pos_str_to_index_8x8(n).unwrap()).collect();
        result.sort();
        result
    }

    fn sorted(destinations: Destinations) -> Vec<u8> {
        let mut result = destinations.to_vec();
        result.sort();
        result
    }

    macro_rules! destination_count_test {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (fen, square, expected_count) = $value;

                    let board = Board::from_fen(fen).unwrap();
                    let from = pos_str_to_index_8x8(square).unwrap();
                    let destinations = board.generate_pseudo_legal_destinations(from).unwrap();

                    assert_eq!(expected_count, destinations.len(), "{:?}", destinations);
                }
            )*
        }
    }

    destination_count_test! {
        rook_in_corner: ("8/8/8/8/8/8/8/R7 w -", "a1", 14),
        rook_on_h_file_does_not_wrap: ("8/8/8/8/8/8/8/7R w -", "h1", 14),
        bishop_in_corner: ("8/8/8/8/8/8/8/B7 w -", "a1", 7),
        bishop_on_h_file_does_not_wrap: ("8/8/8/8/7B/8/8/8 w -", "h4", 7),
        knight_in_corner: ("8/8/8/8/8/8/8/N7 w -", "a1", 2),
        knight_on_h_file_does_not_wrap: ("8/8/8/8/7N/8/8/8 w -", "h4", 4),
        knight_on_g_file_does_not_wrap: ("8/8/8/8/8/8/8/6N1 w -", "g1", 3),
        knight_in_centre: ("8/8/8/8/3N4/8/8/8 w -", "d4", 8),
        queen_in_centre: ("8/8/8/8/3Q4/8/8/8 w -", "d4", MAX_DESTINATIONS),
        king_in_corner: ("8/8/8/8/8/8/8/7K w -", "h1", 3),
        king_in_centre: ("8/8/8/8/4k3/8/8/8 w -", "e4", 8),
        king_on_a_file_does_not_wrap: ("8/8/8/K7/8/8/8/8 w -", "a5", 5),
        white_pawn_single_push_only: ("8/8/8/8/8/8/4P3/8 w -", "e2", 1),
        black_pawn_single_push_only: ("8/4p3/8/8/8/8/8/8 w -", "e7", 1),
        blocked_pawn: ("8/8/8/8/4p3/4P3/8/8 w -", "e3", 0),
        pawn_on_last_rank_has_nowhere_to_go: ("4P3/8/8/8/8/8/8/8 w -", "e8", 0),
        blank_square: ("8/8/8/8/8/8/8/8 w -", "e4", 0),
        starting_knight: ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq", "b1", 2),
        starting_bishop: ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq", "c1", 0),
    }

    #[test]
    pub fn rook_stops_at_own_piece_and_captures_enemy() {
        let board = Board::from_fen("8/8/8/8/8/8/P7/R1p5 w -").unwrap();

        let destinations = board.generate_pseudo_legal_destinations(0).unwrap();
        assert_eq!(squares(&["b1", "c1"]), sorted(destinations));
    }

    #[test]
    pub fn bishop_rays_stop_on_capture() {
        let board = Board::from_fen("8/8/8/8/8/2n5/1P6/B7 b -").unwrap();
        let destinations = board.generate_pseudo_legal_destinations(0).unwrap();
        assert!(destinations.is_empty());

        let board = Board::from_fen("8/8/8/8/8/2n5/8/B7 w -").unwrap();
        let destinations = board.generate_pseudo_legal_destinations(0).unwrap();
        assert_eq!(squares(&["b2", "c3"]), sorted(destinations));
    }

    #[test]
    pub fn pawn_captures_only_enemy_diagonals() {
        let board = Board::from_fen("8/8/8/3p1P2/4P3/8/8/8 w -").unwrap();

        let from = pos_str_to_index_8x8("e4").unwrap();
        let destinations = board.generate_pseudo_legal_destinations(from).unwrap();
        assert_eq!(squares(&["d5", "e5"]), sorted(destinations));
    }

    #[test]
    pub fn black_pawn_moves_down_the_board() {
        let board = Board::from_fen("8/8/8/8/3p4/2P1P3/8/8 w -").unwrap();

        let from = pos_str_to_index_8x8("d4").unwrap();
        let destinations = board.generate_pseudo_legal_destinations(from).unwrap();
        assert_eq!(squares(&["c3", "d3", "e3"]), sorted(destinations));
    }

    #[test]
    pub fn pawn_capture_does_not_wrap_around_board_edge() {
        // h4 + 9 lands on a6 without the file check
        let board = Board::from_fen("8/8/p7/8/7P/8/8/8 w -").unwrap();

        let from = pos_str_to_index_8x8("h4").unwrap();
        let destinations = board.generate_pseudo_legal_destinations(from).unwrap();
        assert_eq!(squares(&["h5"]), sorted(destinations));
    }

    #[test]
    pub fn out_of_range_origin_is_an_error() {
        let mut board = Board::new();

        assert_eq!(Err(ChessError::OutOfRange(64)), board.generate_pseudo_legal_destinations(64));
        assert_eq!(Err(ChessError::OutOfRange(200)), board.generate_legal_destinations(200));
    }

    #[test]
    pub fn pinned_bishop_has_no_legal_moves() {
        let mut board = Board::from_fen("4r3/8/8/8/8/8/4B3/4K3 w -").unwrap();
        let before = board.clone();
        let from = pos_str_to_index_8x8("e2").unwrap();

        assert!(!board.generate_pseudo_legal_destinations(from).unwrap().is_empty());
        assert!(board.generate_legal_destinations(from).unwrap().is_empty());
        assert_eq!(before, board);
    }

    #[test]
    pub fn pinned_rook_may_move_along_the_pin() {
        let mut board = Board::from_fen("4r3/8/8/8/8/8/4R3/4K3 w -").unwrap();
        let from = pos_str_to_index_8x8("e2").unwrap();

        let destinations = board.generate_legal_destinations(from).unwrap();
        assert_eq!(squares(&["e3", "e4", "e5", "e6", "e7", "e8"]), sorted(destinations));
    }

    #[test]
    pub fn king_cannot_step_onto_attacked_squares() {
        let mut board = Board::from_fen("8/8/8/8/8/8/8/K6r w -").unwrap();

        let destinations = board.generate_legal_destinations(0).unwrap();
        assert_eq!(squares(&["a2", "b2"]), sorted(destinations));
    }

    #[test]
    pub fn king_may_capture_undefended_checking_piece() {
        let mut board = Board::from_fen("8/8/8/8/8/8/8/Kr6 w -").unwrap();
        let before = board.clone();

        let destinations = board.generate_legal_destinations(0).unwrap();
        assert_eq!(squares(&["a2", "b1"]), sorted(destinations));
        assert_eq!(before, board);
    }

    #[test]
    pub fn kings_cannot_stand_next_to_each_other() {
        let mut board = Board::from_fen("8/8/8/4k3/8/4K3/8/8 w -").unwrap();

        let from = pos_str_to_index_8x8("e3").unwrap();
        let destinations = board.generate_legal_destinations(from).unwrap();
        assert_eq!(squares(&["d2", "d3", "e2", "f2", "f3"]), sorted(destinations));
    }

    #[test]
    pub fn legal_destinations_of_blank_square_are_empty() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w -").unwrap();

        assert!(board.generate_legal_destinations(20).unwrap().is_empty());
    }
}
