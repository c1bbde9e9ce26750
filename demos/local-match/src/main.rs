use dotbox::prelude::*;
use dotbox::rules::MAX_GRID_SIZE;
use rand::Rng;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

const GRID_SIZE_VAR: &str = "DOTBOX_GRID_SIZE";
const DEFAULT_DEMO_GRID: u32 = 3;

/// Board size from `DOTBOX_GRID_SIZE`, falling back to a small board.
fn grid_size_from_env() -> u32 {
    parse_grid_size(std::env::var(GRID_SIZE_VAR).ok().as_deref())
}

/// Parses a raw grid size. Missing, unparseable or out-of-range values
/// fall back to [`DEFAULT_DEMO_GRID`].
fn parse_grid_size(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_DEMO_GRID;
    };
    match raw.trim().parse::<u32>() {
        Ok(size) if (1..=MAX_GRID_SIZE).contains(&size) => size,
        _ => {
            tracing::warn!(value = %raw, "ignoring invalid {GRID_SIZE_VAR}");
            DEFAULT_DEMO_GRID
        }
    }
}

// ---------------------------------------------------------------------------
// Match loop
// ---------------------------------------------------------------------------

/// Plays a whole match between an autopiloted local player and the AI.
async fn play_match<R: Rng>(
    store: MemoryStore,
    grid_size: u32,
    rng: &mut R,
) -> Result<MatchController<MemoryStore>, DotboxError> {
    let me = PlayerId::from("local");
    let config = MatchConfig {
        grid_size,
        ..MatchConfig::default()
    };

    let mut game = MatchController::create(store, me.clone(), "You", config).await?;
    game.add_ai_player("Computer").await?;
    game.start().await?;

    while game.state().state == Lifecycle::InProgress {
        let summary = if game.is_my_turn() {
            let Some(line) = ai::choose_line(game.grid(), &game.state().lines, &mut *rng) else {
                break;
            };
            game.draw_line(&me, line.start(), line.end()).await?
        } else {
            match game.play_ai_turn(&mut *rng).await? {
                Some(summary) => summary,
                None => break,
            }
        };

        let mover = game
            .state()
            .lines
            .get(&summary.line)
            .map(|p| game.state().player_names.get(p).map_or(p.as_str(), String::as_str))
            .unwrap_or("?");
        if summary.completed.is_empty() {
            println!("{mover:>8} drew {}", summary.line);
        } else {
            println!(
                "{mover:>8} drew {} and closed {} box(es)",
                summary.line,
                summary.completed.len()
            );
        }
    }

    Ok(game)
}

fn print_result(game: &MatchController<MemoryStore>) {
    let state = game.state();
    println!();
    for (player, score) in state.roster_scores() {
        let name = state.player_names.get(player).map_or(player.as_str(), String::as_str);
        println!("{name:>8}: {score}");
    }
    match game.outcome() {
        Outcome::Winner(w) => {
            let name = state.player_names.get(&w).map_or(w.as_str(), String::as_str);
            println!("{name} wins!");
        }
        Outcome::Tie(_) => println!("it's a tie"),
        Outcome::Undecided => println!("match abandoned"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotbox::init_tracing();

    let grid_size = grid_size_from_env();
    tracing::info!(grid_size, "starting local match");

    let store = MemoryStore::spawn();
    let mut game = play_match(store.clone(), grid_size, &mut rand::rng()).await?;
    print_result(&game);

    if game.record_result().await? {
        if let Some(stats) = store.user_stats(game.local_player()).await? {
            println!(
                "record: {} won, {} lost, {} tied",
                stats.wins, stats.losses, stats.ties
            );
        }
    }

    store.shutdown().await?;
    Ok(())
}
