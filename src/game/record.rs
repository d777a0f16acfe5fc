use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::session::SessionSnapshot;
use crate::config::PlayerColor;
use crate::core::{GameStatus, MoveRecord, Side};

pub const DEFAULT_DIR: &str = "gate_games";

/// Finished game, as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub started_fen: String,
    pub player_color: PlayerColor,
    pub skill: u16,
    pub status: GameStatus,
    pub winner: Option<Side>,
    pub moves: Vec<MoveRecord>,
}

impl GameRecord {
    pub fn from_snapshot(snapshot: &SessionSnapshot, skill: u16) -> Self {
        GameRecord {
            started_fen: snapshot.start_fen.clone(),
            player_color: snapshot.player_color,
            skill,
            status: snapshot.status,
            winner: snapshot.winner,
            moves: snapshot.history.clone(),
        }
    }
}

/// Writes `record` as `game_<timestamp>.json` under `dir`, creating the
/// directory when needed.
pub fn save_record(dir: impl AsRef<Path>, record: &GameRecord) -> anyhow::Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let filename = dir.join(format!(
        "game_{}.json",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));

    let file = std::fs::File::create(&filename)?;
    serde_json::to_writer_pretty(file, record)?;
    tracing::info!(path = %filename.display(), moves = record.moves.len(), "game saved");
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn load_record(path: &Path) -> GameRecord {
        let data = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&data).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("gate_record_{}", std::process::id()));
        let record = GameRecord {
            started_fen: "k7/8/1K6/8/8/8/8/7R w - - 0 1".to_string(),
            player_color: PlayerColor::White,
            skill: 1000,
            status: GameStatus::Checkmate,
            winner: Some(Side::Player),
            moves: vec![MoveRecord {
                side: Side::Player,
                uci: "h1h8".to_string(),
                san: "Rh8#".to_string(),
                fen_after: "k6R/8/1K6/8/8/8/8/8 b - - 1 1".to_string(),
            }],
        };

        let path = save_record(&dir, &record).unwrap();
        assert!(path.starts_with(&dir));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("game_") && n.ends_with(".json")));
        assert_eq!(load_record(&path), record);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
