use log::{debug, trace, warn};

use crate::board::{
    Board, CASTLE_BLACK_KING_FLAG, CASTLE_BLACK_QUEEN_FLAG, CASTLE_WHITE_KING_FLAG,
    CASTLE_WHITE_QUEEN_FLAG, CastlingValue, ChessError, Piece, piece_to_name,
};

impl Board {
    pub fn from_fen(fen: &str) -> Result<Board, ChessError> {
        let mut board = Board::default();
        board.load_fen(fen)?;
        Ok(board)
    }

    /// Resets the board and loads `<placement> [<side to move> [<castling rights>]]`.
    /// Fields after the castling rights are ignored. On failure the board is left blank.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        *self = Board::default();

        let result = self.parse_fen_fields(fen);
        match &result {
            Ok(()) => debug!("Loaded position '{fen}'"),
            Err(e) => {
                warn!("Failed to load position '{fen}': {e}");
                *self = Board::default();
            }
        }

        result
    }

    fn parse_fen_fields(&mut self, fen: &str) -> Result<(), ChessError> {
        if !fen.is_ascii() {
            return Err(ChessError::InvalidFormat(String::from(
                "Expected FEN to only contain ASCII characters",
            )));
        }

        let mut fields = fen.split_ascii_whitespace();
        let Some(placement) = fields.next() else {
            return Err(ChessError::InvalidFormat(String::from("Expected a piece placement field")));
        };
        self.parse_placement(placement)?;

        if let Some(side_to_move) = fields.next() {
            self.white_to_move = match side_to_move {
                "w" => true,
                "b" => false,
                _ => {
                    return Err(ChessError::InvalidFormat(format!(
                        "Encountered unexpected Side to move value '{side_to_move}'"
                    )));
                }
            };
        }

        if let Some(castling) = fields.next() {
            self.parse_castling_rights(castling)?;
        }

        for ignored in fields {
            trace!("Ignoring FEN field '{ignored}'");
        }

        Ok(())
    }

    fn parse_placement(&mut self, placement: &str) -> Result<(), ChessError> {
        // Ranks are listed from 8 down to 1
        let mut rank: u8 = 7;
        let mut file: u8 = 0;

        for c in placement.chars() {
            match c {
                '/' => {
                    if rank == 0 {
                        return Err(ChessError::InvalidFormat(String::from(
                            "Expected at most 8 ranks in piece placement",
                        )));
                    }
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => {
                    file += c as u8 - b'0';
                    if file > 8 {
                        return Err(rank_overflow(rank));
                    }
                }
                _ => {
                    let Some(piece) = Piece::from_fen_char(c) else {
                        return Err(ChessError::InvalidFormat(format!(
                            "Encountered unexpected character {c} while processing piece placement"
                        )));
                    };
                    if file >= 8 {
                        return Err(rank_overflow(rank));
                    }

                    self.write_piece(piece, (rank * 8 + file) as usize);
                    file += 1;
                }
            }
        }

        Ok(())
    }

    fn parse_castling_rights(&mut self, castling: &str) -> Result<(), ChessError> {
        if castling == "-" {
            return Ok(());
        }

        for c in castling.chars() {
            match c {
                'K' => {
                    self.castling_rights |= CASTLE_WHITE_KING_FLAG;
                }
                'Q' => {
                    self.castling_rights |= CASTLE_WHITE_QUEEN_FLAG;
                }
                'k' => {
                    self.castling_rights |= CASTLE_BLACK_KING_FLAG;
                }
                'q' => {
                    self.castling_rights |= CASTLE_BLACK_QUEEN_FLAG;
                }
                _ => {
                    return Err(ChessError::InvalidFormat(format!(
                        "Encountered unexpected character {c} while processing castling rights"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Writes the placement, side to move and castling rights fields
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for (i, rank) in self.squares().chunks_exact(8).rev().enumerate() {
            if i != 0 {
                placement.push('/');
            }

            let mut blanks = 0;
            for piece in rank {
                if piece.is_none() {
                    blanks += 1;
                    continue;
                }
                if blanks != 0 {
                    placement.push_str(&blanks.to_string());
                    blanks = 0;
                }
                placement.push(piece_to_name(*piece));
            }
            if blanks != 0 {
                placement.push_str(&blanks.to_string());
            }
        }

        let mut castling = String::new();
        for (value, c) in [
            (CastlingValue::WhiteKing, 'K'),
            (CastlingValue::WhiteQueen, 'Q'),
            (CastlingValue::BlackKing, 'k'),
            (CastlingValue::BlackQueen, 'q'),
        ] {
            if self.has_castling_right(value) {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        format!("{placement} {} {castling}", if self.white_to_move { 'w' } else { 'b' })
    }
}

fn rank_overflow(rank: u8) -> ChessError {
    ChessError::InvalidFormat(format!("Rank {} describes more than 8 squares", rank + 1))
}
