/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io::{self, BufRead, Write},
    ops::ControlFlow,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use clap::{builder::PossibleValue, Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::{
    evaluate, generate_moves, generate_moves_from, king_safety, order_moves, perft, splitperft,
    Board, Color, Engine, EngineConfig, Evaluator, Move, Piece, Square, FEN_STARTPOS,
};

/// Positions searched by the `bench` command, with the side to move in each.
pub const BENCHMARK_FENS: [(&str, Color); 6] = [
    (FEN_STARTPOS, Color::White),
    ("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R", Color::White),
    ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R", Color::White),
    ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8", Color::Black),
    ("6k1/5ppp/8/8/8/8/5PPP/3R2K1", Color::White),
    ("4k3/8/8/8/8/8/3PqP2/4K3", Color::White),
];

/// Command-line interface of the engine's developer shell.
///
/// Options set up the starting position and the search settings. If no command is given,
/// commands are read from stdin, one per line, until `exit` or end of input.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Piece placements to start from, in FEN. Fields after the placements are ignored.
    #[arg(short, long, default_value = FEN_STARTPOS)]
    pub fen: String,

    /// The side to move first.
    #[arg(short, long, default_value = "white")]
    pub color: Color,

    /// Depth, in plies, to search to.
    #[arg(short, long)]
    pub depth: Option<u8>,

    /// Time limit for a single move, in milliseconds.
    #[arg(short, long)]
    pub movetime: Option<u64>,

    /// Seed for breaking ties between equally good moves.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Command to execute. If omitted, an interactive shell is started.
    #[command(subcommand)]
    pub command: Option<EngineCommand>,
}

impl Cli {
    /// Builds a [`Shell`] from the parsed options and executes the requested command, or starts reading from stdin.
    pub fn run(self) -> Result<()> {
        let board = Board::from_fen(&self.fen).context("Failed to parse --fen")?;

        let mut config = EngineConfig {
            movetime: self.movetime.map(Duration::from_millis),
            seed: self.seed,
            ..Default::default()
        };
        if let Some(depth) = self.depth {
            config.depth = depth;
        }

        let mut shell = Shell::new(board, self.color, config);

        match self.command {
            Some(command) => shell.execute(command).map(|_| ()),
            None => shell.repl(),
        }
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "lower")]
pub enum EngineCommand {
    /// Search a fixed set of positions and report the node count and speed.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<u8>,
    },

    /// Print whether each side's King is safe, in check, or checkmated.
    Classify,

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position for the side to move.
    Eval {
        /// If set, the contribution of every piece will be printed.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the shell.
    #[command(alias = "quit")]
    Exit,

    /// Print the FEN of the current position, followed by the side to move.
    Fen,

    /// Flips the side-to-move without making a move.
    Flip,

    /// Apply the provided move for the side to move, if it is legal.
    #[command(alias = "move")]
    MakeMove { mv: Move },

    /// Shows all legal moves for the side to move, or for a specific piece.
    Moves {
        square: Option<Square>,

        /// If set, moves will be sorted in alphabetical order.
        ///
        /// By default, moves are listed in the order the search would try them.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Start a new game from the standard starting position, forgetting all previous moves.
    #[command(alias = "new")]
    NewGame,

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft {
        depth: usize,

        /// If set, the node count reachable after each root move is printed as well.
        #[arg(short, long, default_value = "false")]
        split: bool,
    },

    /// Place a piece on the provided square.
    Place { piece: Piece, square: Square },

    /// Let the engine play against itself for the given number of plies.
    Play {
        #[arg(default_value = "10")]
        plies: usize,
    },

    /// Set up a new position from a FEN. If the FEN names a side to move, it becomes the side to move.
    Position {
        fen: Vec<String>, // This is a vector in order to support the whitespace-separated fields
    },

    /// Search the current position and print the move the engine would play.
    #[command(alias = "go")]
    Select,

    /// Remove the piece at the provided square.
    Take { square: Square },

    /// Check whether the provided move is legal for the side to move, without making it.
    Validate { mv: Move },
}

/// A single line typed into the interactive shell.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: EngineCommand,
}

impl ValueEnum for Color {
    fn value_variants<'a>() -> &'a [Self] {
        &[Color::White, Color::Black]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        // Full names, with the FEN chars as aliases
        let alias = match self {
            Color::White => "w",
            Color::Black => "b",
        };

        Some(PossibleValue::new(self.name()).alias(alias))
    }
}

/// The developer shell: a board, the side to move, and one [`Engine`] for each side.
///
/// Plays the part of the game framework that hosts engines: it owns the live board,
/// asks the engine to move, and checks moves typed in on behalf of the opponent.
#[derive(Debug)]
pub struct Shell {
    board: Board,
    side: Color,
    config: EngineConfig,
    engines: [Engine; Color::COUNT],
}

impl Shell {
    /// Creates a new [`Shell`] for `board`, with `side` to move.
    pub fn new(board: Board, side: Color, config: EngineConfig) -> Self {
        Self {
            board,
            side,
            config,
            engines: [Engine::new(config), Engine::new(config)],
        }
    }

    /// The current position.
    #[inline(always)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    #[inline(always)]
    pub fn side(&self) -> Color {
        self.side
    }

    /// The engine playing `color`.
    #[inline(always)]
    pub fn engine(&self, color: Color) -> &Engine {
        &self.engines[color as usize]
    }

    #[inline(always)]
    fn engine_mut(&mut self, color: Color) -> &mut Engine {
        &mut self.engines[color as usize]
    }

    /// Reads commands from stdin, one per line, executing each until `exit` or the end of input.
    ///
    /// A line that fails to parse or execute is reported and does not end the shell.
    pub fn repl(&mut self) -> Result<()> {
        let stdin = io::stdin();

        for line in stdin.lock().lines() {
            let line = line.context("Failed to read from stdin")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(line.split_ascii_whitespace()) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            };

            match self.execute(command) {
                Ok(ControlFlow::Break(())) => break,
                Ok(ControlFlow::Continue(())) => {}
                Err(e) => eprintln!("Error: {e:#}"),
            }

            io::stdout().flush()?;
        }

        Ok(())
    }

    /// Executes a single command, returning [`ControlFlow::Break`] if the shell should stop.
    pub fn execute(&mut self, command: EngineCommand) -> Result<ControlFlow<()>> {
        debug!(?command, "executing");

        match command {
            EngineCommand::Bench { pretty, depth } => self.bench(depth, pretty),

            EngineCommand::Classify => {
                for color in Color::all() {
                    println!("{color}: {}", king_safety(&self.board, color));
                }
            }

            EngineCommand::Display => self.display(),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => return Ok(ControlFlow::Break(())),

            EngineCommand::Fen => println!("{} {}", self.board.to_fen(), self.side.to_uci()),

            EngineCommand::Flip => self.side = self.side.opponent(),

            EngineCommand::MakeMove { mv } => self.make_move(mv)?,

            EngineCommand::Moves { square, sort } => self.moves(square, sort),

            EngineCommand::NewGame => self.new_game(),

            EngineCommand::Perft { depth, split } => self.perft(depth, split),

            EngineCommand::Place { piece, square } => self.board.place(piece, square),

            EngineCommand::Play { plies } => self.play(plies),

            EngineCommand::Position { fen } => self.set_position(&fen.join(" "))?,

            EngineCommand::Select => self.select(),

            EngineCommand::Take { square } => {
                if self.board.take(square).is_none() {
                    bail!("There is no piece on {square}");
                }
            }

            EngineCommand::Validate { mv } => {
                // The engine that did not move judges the move
                let legal = self
                    .engine(self.side.opponent())
                    .validate_opponent_move(&self.board, mv, self.side);

                let verdict = if legal { "legal" } else { "illegal" };
                println!("{mv} is {verdict} for {}", self.side);
            }
        };

        Ok(ControlFlow::Continue(()))
    }

    /// Prints the board, the side to move, and its FEN.
    fn display(&self) {
        println!("{}", self.board);
        println!("Side to move: {}", self.side);
        println!("FEN: {}", self.board.to_fen());
    }

    /// Prints the evaluation of the current position for the side to move.
    fn eval(&self, pretty: bool) {
        if pretty {
            println!("{}", Evaluator::new(&self.board, self.side));
        } else {
            println!("{}", evaluate(&self.board, self.side));
        }
    }

    /// Prints all legal moves for the side to move.
    fn moves(&self, square: Option<Square>, sort: bool) {
        let mut moves = match square {
            Some(square) => generate_moves_from(&self.board, square, self.side),
            None => generate_moves(&self.board, self.side),
        };

        if sort {
            moves.sort_by_key(|mv| mv.to_string());
        } else {
            order_moves(&self.board, &mut moves, self.side);
        }

        let moves = moves.iter().map(|mv| mv.to_string()).collect::<Vec<_>>();
        println!("{}", moves.join(", "));
    }

    /// Makes `mv` for the side to move, after the opponent's engine has checked it.
    fn make_move(&mut self, mv: Move) -> Result<()> {
        if !self
            .engine(self.side.opponent())
            .validate_opponent_move(&self.board, mv, self.side)
        {
            bail!("Illegal move {mv} for {}", self.side);
        }

        self.board.make_move(mv);
        self.side = self.side.opponent();
        Ok(())
    }

    /// Resets the board to the starting position and clears every engine's memory.
    fn new_game(&mut self) {
        self.board = Board::default();
        self.side = Color::White;
        for engine in &mut self.engines {
            engine.new_game();
        }
    }

    /// Replaces the current position. The FEN's second field, if present, sets the side to move.
    fn set_position(&mut self, fen: &str) -> Result<()> {
        let board = Board::from_fen(fen).context("Failed to parse position")?;

        if let Some(side) = fen.split_ascii_whitespace().nth(1) {
            self.side = side.parse()?;
        }
        self.board = board;
        Ok(())
    }

    /// Asks the engine for the side to move to choose a move, and prints it without making it.
    fn select(&mut self) {
        let (board, side) = (self.board, self.side);
        let res = self.engine_mut(side).select_move(&board, side);

        if let Some(over) = res.game_over {
            println!("{side} has no legal moves: {over}");
            return;
        }

        println!(
            "depth {} nodes {} score {} timed_out {}",
            res.depth, res.nodes, res.score, res.timed_out
        );
        if let Some(mv) = res.bestmove {
            println!("bestmove {mv}");
        }
    }

    /// Lets each side's engine move in turn, printing every move, until `plies` moves have been made or the game ends.
    fn play(&mut self, plies: usize) {
        for ply in 0..plies {
            let (board, side) = (self.board, self.side);
            let res = self.engine_mut(side).select_move(&board, side);

            let Some(mv) = res.bestmove else {
                if let Some(over) = res.game_over {
                    println!("{side} has no legal moves: {over}");
                }
                break;
            };

            println!("{:>3}. {side:<5} {mv:<7} ({})", ply + 1, res.score);
            self.board.make_move(mv);
            self.side = side.opponent();
        }

        println!("\n{}", self.board);
    }

    /// Runs perft on the current position, printing the node count and speed.
    fn perft(&self, depth: usize, split: bool) {
        let now = Instant::now();
        let nodes = if split {
            splitperft(&self.board, self.side, depth)
        } else {
            perft(&self.board, self.side, depth)
        };
        let elapsed = now.elapsed();

        let nps = nodes as f32 / elapsed.as_secs_f32();
        if split {
            println!();
        }
        println!("{nodes} nodes in {elapsed:?} ({nps:.0} nps)");
    }

    /// Searches every position in [`BENCHMARK_FENS`] with a fresh engine, and prints the total nodes and speed.
    fn bench(&self, depth: Option<u8>, pretty: bool) {
        let config = EngineConfig {
            depth: depth.unwrap_or(self.config.depth),
            movetime: None,
            seed: Some(self.config.seed.unwrap_or_default()),
        };

        let mut nodes = 0;
        let now = Instant::now();
        for (fen, side) in BENCHMARK_FENS {
            // Every benchmark position is a valid FEN
            let Ok(board) = Board::from_fen(fen) else {
                continue;
            };

            let res = Engine::new(config).select_move(&board, side);
            nodes += res.nodes;

            if pretty {
                println!("{fen:<64} {side:<5} {:>10} nodes", res.nodes);
            }
        }
        let elapsed = now.elapsed();

        let nps = nodes as f32 / elapsed.as_secs_f32();
        let mnps = nps / 1_000_000.0;
        if pretty {
            println!();
            println!("+{:-^18}+", " Benchmark Complete ");
            println!("| {:<7} {:>9} |", "depth:", config.depth);
            println!("| {:<7} {:>9} |", "time:", format!("{:.1?}", elapsed));
            println!("| {:<7} {:>9} |", "nodes:", nodes);
            println!("| {:<7} {:>9.0} |", "nps:", nps);
            println!("| {:<7} {:>9.3} |", "Mnps:", mnps);
            println!("+{:-^18}+", "");
        } else {
            println!("{nodes} nodes {nps:.0} nps");
        }
    }
}
