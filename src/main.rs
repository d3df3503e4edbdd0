use std::{process::ExitCode, time::SystemTime};

use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, error, info};

use tile_chess::{
    STARTING_FEN,
    board::{Board, Color, index_8x8_to_pos_str, pos_str_to_index_8x8},
    moves::Move,
};

#[derive(Parser)]
#[command(version, about = "Looks up legal moves and plays them out on a chess board")]
struct Cli {
    /// Position to start from
    #[arg(long, global = true, default_value = STARTING_FEN)]
    fen: String,

    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the legal destinations of the piece on a square, e.g. `g1`
    Moves { square: String },
    /// Play moves in coordinate notation, e.g. `e2e3 e7e6`, stopping at the first illegal one
    Play { moves: Vec<String> },
    /// Report which kings are attacked
    Check,
    /// Print the board and its position string
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.log_level.into()) {
        eprintln!("Failed to set up logging: {e}");
        return ExitCode::FAILURE;
    }
    log_panics::init();

    let mut board = match Board::from_fen(&cli.fen) {
        Ok(b) => b,
        Err(e) => {
            error!("Could not load position '{}': {e}", cli.fen);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Moves { square } => print_moves_from_square(&mut board, &square),
        Command::Play { moves } => play_moves(&mut board, &moves),
        Command::Check => {
            print_check_status(&board);
            ExitCode::SUCCESS
        }
        Command::Show => {
            print_board(&board);
            ExitCode::SUCCESS
        }
    }
}

fn setup_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn print_moves_from_square(board: &mut Board, square: &str) -> ExitCode {
    let Some(from) = pos_str_to_index_8x8(square) else {
        error!("'{square}' is not a square, expected something like 'e2'");
        return ExitCode::FAILURE;
    };

    let destinations = match board.generate_legal_destinations(from) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to generate moves from {square}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if destinations.is_empty() {
        println!("No moves found")
    }

    for to in destinations {
        println!("{}", Move::new(from, to).pretty_print(Some(&*board)));
    }

    ExitCode::SUCCESS
}

fn play_moves(board: &mut Board, moves: &[String]) -> ExitCode {
    for (i, notation) in moves.iter().enumerate() {
        let r#move = match Move::from_simple_long_algebraic_notation(notation) {
            Ok(m) => m,
            Err(e) => {
                error!("Move {}: {e}", i + 1);
                return ExitCode::FAILURE;
            }
        };

        let pretty = r#move.pretty_print(Some(&*board));
        if !board.try_move(r#move) {
            error!("Move {} {pretty} is not legal in this position", i + 1);
            print_board(board);
            return ExitCode::FAILURE;
        }

        info!("Played move {} {pretty}", i + 1);
        println!("{pretty}");
        print_check_status(board);
    }

    print_board(board);
    ExitCode::SUCCESS
}

fn print_check_status(board: &Board) {
    for color in [Color::White, Color::Black] {
        if board.is_in_check(color) {
            let king = board
                .find_king(color)
                .map_or_else(|| String::from("?"), index_8x8_to_pos_str);
            println!("{color} king on {king} is in check");
        }
    }
}

fn print_board(board: &Board) {
    println!("{}", board.pretty_squares());
    println!("{}", board.to_fen());
    println!("{} to move", board.side_to_move());
    if let Some(last_move) = board.last_move {
        println!("last move: {}", last_move.simple_long_algebraic_notation());
    }
}
