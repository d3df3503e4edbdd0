pub mod board;
pub mod check;
pub mod fen;
pub mod move_generator;
pub mod moves;

pub static STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
