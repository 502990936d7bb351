//! Interactive terminal front-end for playing a game by typed moves.

use std::io::{self, BufRead, Write};

use log::debug;
use thiserror::Error;

use crate::game::GameState;
use crate::moves::MoveFlag;
use crate::position::Position;
use crate::types::Square;

/// Error type for terminal operations.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Highlight drawn behind a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareHighlight {
    /// Square of the selected piece
    Origin,
    /// Legal quiet destination
    Destination,
    /// Legal destination that captures
    Capture,
    /// King in check
    Check,
}

/// Highlights for the current position, optionally showing the moves of the
/// piece on `selected`.
pub fn highlights(game: &GameState, selected: Option<Square>) -> Vec<(Square, SquareHighlight)> {
    let mut highlights = Vec::new();
    let position = game.position();

    if game.is_check() {
        highlights.push((
            position.king_square(game.turn()),
            SquareHighlight::Check,
        ));
    }

    if let Some(from) = selected {
        let moves = game.moves_from(from);
        if !moves.is_empty() {
            highlights.push((from, SquareHighlight::Origin));
        }
        for mv in moves {
            let capture =
                mv.flag() == MoveFlag::EnPassant || position.piece_at(mv.to()).is_some();
            let highlight = if capture {
                SquareHighlight::Capture
            } else {
                SquareHighlight::Destination
            };
            // Promotions repeat the same target square
            if !highlights.contains(&(mv.to(), highlight)) {
                highlights.push((mv.to(), highlight));
            }
        }
    }

    highlights
}

/// Renders the board, status line and position text to any writer.
pub fn render(
    w: &mut impl Write,
    game: &GameState,
    highlights: &[(Square, SquareHighlight)],
) -> Result<(), TerminalError> {
    let position = game.position();
    for rank in (0..8).rev() {
        write!(w, " {} ", rank + 1)?;
        for file in 0..8 {
            let square = Square::from_coords(file, rank);
            let highlight = highlights
                .iter()
                .find(|(sq, _)| *sq == square)
                .map(|(_, h)| *h);
            write!(w, "{}", format_square(position, square, highlight))?;
        }
        writeln!(w)?;
    }
    writeln!(w, "    a  b  c  d  e  f  g  h")?;
    writeln!(w)?;
    writeln!(w, "{}", game.status_text())?;
    writeln!(w, "{}", position)?;
    w.flush()?;
    Ok(())
}

fn format_square(position: &Position, square: Square, highlight: Option<SquareHighlight>) -> String {
    let symbol = position.piece_at(square).map_or('·', |piece| piece.char());
    match highlight {
        Some(SquareHighlight::Origin) => format!("\x1b[42m {symbol} \x1b[0m"),
        Some(SquareHighlight::Destination) => format!("\x1b[44m {symbol} \x1b[0m"),
        Some(SquareHighlight::Capture) => format!("\x1b[41m {symbol} \x1b[0m"),
        Some(SquareHighlight::Check) => format!("\x1b[45m {symbol} \x1b[0m"),
        None => format!(" {symbol} "),
    }
}

const HELP: &str = "Commands: <move> (e2e4, e7e8q) | moves [square] | fen <text> | reset | q (quit)";

/// Runs the read-eval-print loop until `q` or end of input.
pub fn run(input: impl BufRead, output: &mut impl Write) -> Result<(), TerminalError> {
    let mut game = GameState::new();

    writeln!(output, "{HELP}")?;
    render(output, &game, &highlights(&game, None))?;

    for line in input.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "q" | "quit" => break,
            "help" => writeln!(output, "{HELP}")?,
            "reset" => {
                game = GameState::new();
                render(output, &game, &highlights(&game, None))?;
            }
            "fen" => {
                let text = line.trim_start()["fen".len()..].trim();
                match GameState::from_text(text) {
                    Ok(loaded) => {
                        game = loaded;
                        render(output, &game, &highlights(&game, None))?;
                    }
                    Err(e) => writeln!(output, "{e}")?,
                }
            }
            "moves" => match parts.next() {
                Some(text) => match text.parse::<Square>() {
                    Ok(square) => render(output, &game, &highlights(&game, Some(square)))?,
                    Err(e) => writeln!(output, "invalid square '{text}': {e}")?,
                },
                None => {
                    for (from, moves) in game.moves_by_origin() {
                        let targets: Vec<String> = moves.iter().map(|mv| mv.to_string()).collect();
                        writeln!(output, "{from}: {}", targets.join(" "))?;
                    }
                }
            },
            text => {
                if let Some(outcome) = game.outcome() {
                    writeln!(output, "Game over ({outcome}); type reset or fen to start again")?;
                    continue;
                }
                match game.play(text) {
                    Ok(mv) => {
                        debug!("terminal played {mv}");
                        render(output, &game, &highlights(&game, None))?;
                    }
                    Err(e) => writeln!(output, "{e}")?,
                }
            }
        }
    }

    Ok(())
}

/// Runs [`run`] on the process's standard input and output.
pub fn run_interactive_terminal() -> Result<(), TerminalError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(stdin.lock(), &mut stdout)
}
