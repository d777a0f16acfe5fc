use crate::config::PlayerColor;
use crate::core::{MoveRecord, Side};
use crate::game::{format_time, SessionSnapshot, SessionState};
use crossterm::{cursor, execute, style::Stylize, terminal};
use shakmaty::{Color, File, Rank, Square};
use std::io::{stdout, Write};

const PROGRESS_WIDTH: usize = 20;

/// Redraws the whole screen from a snapshot.
pub fn render(snapshot: &SessionSnapshot) -> std::io::Result<()> {
    let mut out = stdout();

    // 画面クリア（スクロール防止）
    execute!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;

    writeln!(out, "=== Chess Gate ===")?;
    writeln!(out, "{}", snapshot.message.clone().bold().yellow())?;
    writeln!(out)?;

    render_clock(&mut out, snapshot, Side::Opponent)?;
    render_board(&mut out, snapshot)?;
    render_clock(&mut out, snapshot, Side::Player)?;
    writeln!(out)?;

    if snapshot.state == SessionState::EngineThinking {
        writeln!(out, "{}", progress_bar(snapshot.progress).dark_grey())?;
    }
    if snapshot.unlocked {
        writeln!(out, "{}", "*** Section unlocked! ***".bold().green())?;
    }

    let moves = move_list(&snapshot.history);
    if !moves.is_empty() {
        writeln!(out, "Moves: {moves}")?;
    }
    writeln!(out)?;
    write!(out, "[e2e4 | reset | switch | quit] > ")?;
    out.flush()
}

fn render_clock(out: &mut impl Write, snapshot: &SessionSnapshot, side: Side) -> std::io::Result<()> {
    let (label, secs) = match side {
        Side::Player => (format!("You ({})", snapshot.player_color), snapshot.player_clock),
        Side::Opponent => (
            format!("Engine ({})", snapshot.player_color.flipped()),
            snapshot.opponent_clock,
        ),
    };
    let text = format!("{label:<16} {:>6}", format_time(secs));
    if snapshot.active_clock == Some(side) {
        writeln!(out, "{}", text.green().bold())
    } else {
        writeln!(out, "{text}")
    }
}

fn render_board(out: &mut impl Write, snapshot: &SessionSnapshot) -> std::io::Result<()> {
    let white_bottom = snapshot.player_color == PlayerColor::White;
    let ranks: Vec<Rank> = if white_bottom {
        Rank::ALL.iter().rev().copied().collect()
    } else {
        Rank::ALL.to_vec()
    };
    let files: Vec<File> = if white_bottom {
        File::ALL.to_vec()
    } else {
        File::ALL.iter().rev().copied().collect()
    };

    writeln!(out, "   +{}+", "---".repeat(8))?;
    for &rank in &ranks {
        write!(out, " {} |", rank.char())?;
        for &file in &files {
            let square = Square::from_coords(file, rank);
            let is_last_move = snapshot
                .last_move
                .is_some_and(|(from, to)| from == square || to == square);

            let piece = snapshot.board.piece_at(square);
            let char_str = piece.map_or('.', |p| p.char());
            let (prefix, suffix) = if is_last_move { ("{", "}") } else { (" ", " ") };
            let cell_text = format!("{prefix}{char_str}{suffix}");

            if is_last_move {
                write!(out, "{}", cell_text.red())?;
            } else if let Some(p) = piece {
                if p.color == Color::White {
                    write!(out, "{}", cell_text.cyan())?;
                } else {
                    write!(out, "{}", cell_text.magenta())?;
                }
            } else {
                write!(out, "{cell_text}")?;
            }
        }
        writeln!(out, "|")?;
    }
    writeln!(out, "   +{}+", "---".repeat(8))?;

    write!(out, "    ")?;
    for file in files {
        write!(out, " {} ", file.char())?;
    }
    writeln!(out)
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * PROGRESS_WIDTH / 100;
    format!(
        "thinking [{}{}] {progress:>3}%",
        "#".repeat(filled),
        ".".repeat(PROGRESS_WIDTH - filled)
    )
}

/// Numbered notation, e.g. `1. e4 e5 2. Nf3`. Assumes White moved first.
fn move_list(history: &[MoveRecord]) -> String {
    history
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let sans: Vec<&str> = pair.iter().map(|m| m.san.as_str()).collect();
            format!("{}. {}", i + 1, sans.join(" "))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(san: &str) -> MoveRecord {
        MoveRecord {
            side: Side::Player,
            uci: String::new(),
            san: san.to_string(),
            fen_after: String::new(),
        }
    }

    #[test]
    fn test_move_list() {
        assert_eq!(move_list(&[]), "");
        let history = vec![record("e4"), record("e5"), record("Nf3")];
        assert_eq!(move_list(&history), "1. e4 e5 2. Nf3");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("thinking [{}]   0%", ".".repeat(20)));
        assert_eq!(progress_bar(50), format!("thinking [{}{}]  50%", "#".repeat(10), ".".repeat(10)));
        assert_eq!(progress_bar(100), format!("thinking [{}] 100%", "#".repeat(20)));
    }
}
