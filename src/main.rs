use chess_gate::config::{self, GameConfig};
use chess_gate::core::MoveRequest;
use chess_gate::display;
use chess_gate::game::{record, save_record, spawn_session, GameRecord, SessionSnapshot};
use chess_gate::logic::ShakmatyRules;
use crossterm::style::Stylize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ログは標準エラーへ（盤面表示を崩さないため）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_PATH.to_string());
    let config = GameConfig::load_or_default(&path);
    let skill = config.engine.skill;

    let handle = spawn_session(
        config,
        ShakmatyRules::new(),
        Box::new(StdRng::from_entropy()),
        Box::new(|| tracing::info!("content unlocked")),
    )?;

    let mut updates = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut notice: Option<String> = None;
    let mut saved_generation = None;

    let snapshot = updates.borrow_and_update().clone();
    redraw(&snapshot, notice.as_deref())?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if snapshot.status.is_terminal() && saved_generation != Some(snapshot.generation) {
                    saved_generation = Some(snapshot.generation);
                    let game = GameRecord::from_snapshot(&snapshot, skill);
                    if let Err(e) = save_record(record::DEFAULT_DIR, &game) {
                        tracing::warn!(error = %e, "could not save game");
                    }
                }
                redraw(&snapshot, notice.as_deref())?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                notice = None;
                match line.trim() {
                    "" => {}
                    "quit" | "q" => break,
                    "reset" => {
                        handle.reset().await?;
                    }
                    "switch" => {
                        handle.switch_sides().await?;
                    }
                    text => match text.parse::<MoveRequest>() {
                        Ok(request) => {
                            if let Err(rejection) = handle.submit(request).await {
                                notice = Some(rejection.to_string());
                            }
                        }
                        Err(e) => notice = Some(e.to_string()),
                    },
                }
                let snapshot = handle.snapshot().await?;
                redraw(&snapshot, notice.as_deref())?;
            }
        }
    }

    handle.shutdown().await?;
    println!();
    Ok(())
}

fn redraw(snapshot: &SessionSnapshot, notice: Option<&str>) -> anyhow::Result<()> {
    display::render(snapshot)?;
    if let Some(text) = notice {
        print!("\n{}\n> ", text.red());
        std::io::Write::flush(&mut std::io::stdout())?;
    }
    Ok(())
}
