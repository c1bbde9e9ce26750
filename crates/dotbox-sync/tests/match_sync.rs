//! Integration tests for match controllers over the in-memory store.

use dotbox_protocol::{Dot, Lifecycle, Match, MatchId, MatchUpdate, PlayerId, ProtocolError, SquareKey};
use dotbox_rules::{Grid, MatchConfig, Outcome, ai, grid::line_key};
use dotbox_sync::{
    GameResult, MatchController, MatchStore, MemoryStore, StatsStore, SyncError, UserStats,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: &str) -> PlayerId {
    PlayerId::from(id)
}

fn d(r: u32, c: u32) -> Dot {
    Dot::new(r, c)
}

fn config(grid_size: u32) -> MatchConfig {
    MatchConfig {
        grid_size,
        ..MatchConfig::default()
    }
}

/// Two human players, match started, p1 to move.
async fn started(store: &MemoryStore, grid_size: u32) -> (MatchController<MemoryStore>, MatchController<MemoryStore>) {
    let mut p1 = MatchController::create(store.clone(), pid("p1"), "Ada", config(grid_size))
        .await
        .unwrap();
    let mut p2 = MatchController::join(
        store.clone(),
        p1.match_id().clone(),
        pid("p2"),
        "Bob",
        MatchConfig::default(),
    )
    .await
    .unwrap();
    p1.refresh().await.unwrap();
    p1.start().await.unwrap();
    p2.refresh().await.unwrap();
    (p1, p2)
}

// =========================================================================
// Lobby
// =========================================================================

#[tokio::test]
async fn test_create_opens_lobby_with_creator() {
    let store = MemoryStore::spawn();
    let ctl = MatchController::create(store.clone(), pid("p1"), "Ada", config(4))
        .await
        .unwrap();

    let doc = store.read(ctl.match_id()).await.unwrap();
    assert_eq!(doc.state, Lifecycle::Lobby);
    assert_eq!(doc.players, vec![pid("p1")]);
    assert_eq!(doc.grid_size, 4);
    assert!(doc.player_colors.contains_key(&pid("p1")));
    assert_eq!(&doc, ctl.state());
    assert_eq!(ctl.match_id().0.len(), 20);
}

#[tokio::test]
async fn test_create_rejects_invalid_config() {
    let store = MemoryStore::spawn();
    let result = MatchController::create(store, pid("p1"), "Ada", config(0)).await;
    assert!(matches!(result, Err(SyncError::Rules(_))));
}

#[tokio::test]
async fn test_oversized_grid_rejected_on_create_and_join() {
    let store = MemoryStore::spawn();
    let created = MatchController::create(store.clone(), pid("p1"), "Ada", config(65_536)).await;
    assert!(matches!(created, Err(SyncError::Rules(_))));

    // A document written by some other client, bypassing validation.
    let id = store
        .create(Match::new_lobby(pid("p1"), "Ada", 65_536))
        .await
        .unwrap();
    let joined =
        MatchController::join(store.clone(), id.clone(), pid("p2"), "Bob", MatchConfig::default())
            .await;
    assert!(matches!(joined, Err(SyncError::Rules(_))));
    assert_eq!(store.read(&id).await.unwrap().players, vec![pid("p1")]);
}

#[tokio::test]
async fn test_join_adds_player_and_takes_grid_from_document() {
    let store = MemoryStore::spawn();
    let host = MatchController::create(store.clone(), pid("p1"), "Ada", config(3))
        .await
        .unwrap();

    let guest = MatchController::join(
        store.clone(),
        host.match_id().clone(),
        pid("p2"),
        "Bob",
        MatchConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(guest.grid(), Grid::square(3));
    let doc = store.read(host.match_id()).await.unwrap();
    assert_eq!(doc.players, vec![pid("p1"), pid("p2")]);
    assert_eq!(doc.player_names[&pid("p2")], "Bob");
    assert_ne!(doc.player_colors[&pid("p1")], doc.player_colors[&pid("p2")]);
}

#[tokio::test]
async fn test_rejoin_does_not_duplicate_player() {
    let store = MemoryStore::spawn();
    let host = MatchController::create(store.clone(), pid("p1"), "Ada", config(3))
        .await
        .unwrap();
    let id = host.match_id().clone();

    MatchController::join(store.clone(), id.clone(), pid("p1"), "Ada", MatchConfig::default())
        .await
        .unwrap();

    assert_eq!(store.read(&id).await.unwrap().players, vec![pid("p1")]);
}

#[tokio::test]
async fn test_join_unknown_match() {
    let store = MemoryStore::spawn();
    let result = MatchController::join(
        store,
        MatchId::from("nope"),
        pid("p2"),
        "Bob",
        MatchConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(SyncError::NotFound(_))));
}

#[tokio::test]
async fn test_join_full_lobby() {
    let store = MemoryStore::spawn();
    let limits = MatchConfig {
        grid_size: 2,
        min_players: 1,
        max_players: 2,
    };
    let host = MatchController::create(store.clone(), pid("p1"), "Ada", limits.clone())
        .await
        .unwrap();
    let id = host.match_id().clone();
    MatchController::join(store.clone(), id.clone(), pid("p2"), "Bob", limits.clone())
        .await
        .unwrap();

    let result = MatchController::join(store.clone(), id, pid("p3"), "Cy", limits).await;
    assert!(matches!(result, Err(SyncError::MatchFull(_))));
}

#[tokio::test]
async fn test_join_running_match_rejected() {
    let store = MemoryStore::spawn();
    let (p1, _p2) = started(&store, 2).await;

    let result = MatchController::join(
        store.clone(),
        p1.match_id().clone(),
        pid("late"),
        "Late",
        MatchConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(SyncError::InvalidState(_))));
}

#[tokio::test]
async fn test_start_requires_min_players() {
    let store = MemoryStore::spawn();
    let mut host = MatchController::create(store, pid("p1"), "Ada", config(2))
        .await
        .unwrap();
    let err = host.start().await.unwrap_err();
    assert!(err.to_string().contains("need 2 players"));
}

#[tokio::test]
async fn test_start_sets_first_turn_and_zero_scores() {
    let store = MemoryStore::spawn();
    let (p1, p2) = started(&store, 2).await;

    let doc = store.read(p1.match_id()).await.unwrap();
    assert_eq!(doc.state, Lifecycle::InProgress);
    assert_eq!(doc.current_player, Some(pid("p1")));
    assert_eq!(doc.scores.get(&pid("p1")), Some(&0));
    assert_eq!(doc.scores.get(&pid("p2")), Some(&0));
    assert!(p1.is_my_turn());
    assert!(!p2.is_my_turn());
}

#[tokio::test]
async fn test_start_twice_rejected() {
    let store = MemoryStore::spawn();
    let (mut p1, _p2) = started(&store, 2).await;
    assert!(matches!(p1.start().await, Err(SyncError::InvalidState(_))));
}

// =========================================================================
// Drawing lines
// =========================================================================

#[tokio::test]
async fn test_draw_in_lobby_rejected() {
    let store = MemoryStore::spawn();
    let mut host = MatchController::create(store, pid("p1"), "Ada", config(2))
        .await
        .unwrap();
    let result = host.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await;
    assert!(matches!(result, Err(SyncError::InvalidState(_))));
}

#[tokio::test]
async fn test_draw_out_of_turn_rejected() {
    let store = MemoryStore::spawn();
    let (_p1, mut p2) = started(&store, 2).await;
    let result = p2.draw_line(&pid("p2"), d(0, 0), d(0, 1)).await;
    assert!(matches!(result, Err(SyncError::NotYourTurn(p)) if p == pid("p2")));
}

#[tokio::test]
async fn test_draw_invalid_line_rejected() {
    let store = MemoryStore::spawn();
    let (mut p1, _p2) = started(&store, 2).await;

    let diagonal = p1.draw_line(&pid("p1"), d(0, 0), d(1, 1)).await;
    assert!(matches!(diagonal, Err(SyncError::Rules(_))));

    let outside = p1.draw_line(&pid("p1"), d(2, 2), d(2, 3)).await;
    assert!(matches!(outside, Err(SyncError::Rules(_))));

    assert!(store.read(p1.match_id()).await.unwrap().lines.is_empty());
}

#[tokio::test]
async fn test_draw_passes_turn_when_nothing_completed() {
    let store = MemoryStore::spawn();
    let (mut p1, _p2) = started(&store, 2).await;

    let summary = p1.draw_line(&pid("p1"), d(0, 1), d(0, 0)).await.unwrap();

    assert_eq!(summary.line.to_string(), "0,0-0,1");
    assert!(summary.completed.is_empty());
    assert_eq!(summary.next_player, pid("p2"));
    assert_eq!(summary.outcome, Outcome::Undecided);

    let doc = store.read(p1.match_id()).await.unwrap();
    assert_eq!(doc.lines[&line_key(d(0, 0), d(0, 1))], pid("p1"));
    assert_eq!(doc.current_player, Some(pid("p2")));
    assert!(!p1.is_my_turn());
}

#[tokio::test]
async fn test_draw_duplicate_line_rejected() {
    let store = MemoryStore::spawn();
    let (mut p1, mut p2) = started(&store, 2).await;

    p1.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await.unwrap();
    p2.refresh().await.unwrap();

    let result = p2.draw_line(&pid("p2"), d(0, 1), d(0, 0)).await;
    assert!(matches!(result, Err(SyncError::LineTaken(_))));
}

#[tokio::test]
async fn test_completing_square_scores_and_keeps_turn() {
    let store = MemoryStore::spawn();
    let (mut p1, mut p2) = started(&store, 2).await;

    p1.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await.unwrap();
    p2.refresh().await.unwrap();
    p2.draw_line(&pid("p2"), d(1, 0), d(1, 1)).await.unwrap();
    p1.refresh().await.unwrap();
    p1.draw_line(&pid("p1"), d(0, 0), d(1, 0)).await.unwrap();
    p2.refresh().await.unwrap();

    let summary = p2.draw_line(&pid("p2"), d(0, 1), d(1, 1)).await.unwrap();
    assert_eq!(summary.completed, vec![SquareKey::new(0, 0)]);
    assert_eq!(summary.next_player, pid("p2"));

    let doc = store.read(p2.match_id()).await.unwrap();
    assert_eq!(doc.score_of(&pid("p2")), 1);
    assert_eq!(doc.squares[&SquareKey::new(0, 0)], pid("p2"));
    assert_eq!(doc.current_player, Some(pid("p2")));
    assert!(p2.is_my_turn());
}

#[tokio::test]
async fn test_single_square_match_finishes_with_winner() {
    let store = MemoryStore::spawn();
    let (mut p1, mut p2) = started(&store, 1).await;

    p1.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await.unwrap();
    p2.refresh().await.unwrap();
    p2.draw_line(&pid("p2"), d(0, 0), d(1, 0)).await.unwrap();
    p1.refresh().await.unwrap();
    p1.draw_line(&pid("p1"), d(1, 0), d(1, 1)).await.unwrap();
    p2.refresh().await.unwrap();
    let last = p2.draw_line(&pid("p2"), d(0, 1), d(1, 1)).await.unwrap();

    assert_eq!(last.outcome, Outcome::Winner(pid("p2")));
    let doc = store.read(p2.match_id()).await.unwrap();
    assert_eq!(doc.state, Lifecycle::Finished);
    assert_eq!(doc.winner, Some(pid("p2")));

    let after = p2.draw_line(&pid("p2"), d(0, 0), d(0, 1)).await;
    assert!(matches!(after, Err(SyncError::InvalidState(_))));
}

#[tokio::test]
async fn test_final_line_can_finish_in_tie() {
    let store = MemoryStore::spawn();
    let (mut p1, mut p2) = started(&store, 2).await;
    let grid = Grid::square(2);
    let last = line_key(d(1, 2), d(2, 2));

    // Every line but the right side of square (1,1); a holds two
    // squares, b one, and it is b's move.
    let setup = MatchUpdate {
        lines: grid
            .lines()
            .filter(|l| *l != last)
            .map(|l| (l, pid("p1")))
            .collect(),
        squares: [
            (SquareKey::new(0, 0), pid("p1")),
            (SquareKey::new(0, 1), pid("p1")),
            (SquareKey::new(1, 0), pid("p2")),
        ]
        .into(),
        scores: [(pid("p1"), 2), (pid("p2"), 1)].into(),
        current_player: Some(pid("p2")),
        ..MatchUpdate::default()
    };
    store.write(p2.match_id(), setup).await.unwrap();
    p1.refresh().await.unwrap();
    p2.refresh().await.unwrap();

    let summary = p2.draw_line(&pid("p2"), d(2, 2), d(1, 2)).await.unwrap();
    assert_eq!(summary.outcome, Outcome::Tie(vec![pid("p1"), pid("p2")]));

    let doc = store.read(p2.match_id()).await.unwrap();
    assert_eq!(doc.state, Lifecycle::Finished);
    assert_eq!(doc.winner, None);
    assert_eq!(doc.score_of(&pid("p1")), doc.score_of(&pid("p2")));
}

// =========================================================================
// Synchronization
// =========================================================================

#[tokio::test]
async fn test_subscriber_gets_current_document_first() {
    let store = MemoryStore::spawn();
    let (p1, _p2) = started(&store, 2).await;

    let mut sub = p1.subscribe().await.unwrap();
    let first = sub.try_next_snapshot().expect("initial snapshot");
    assert_eq!(first.state, Some(Lifecycle::InProgress));
}

#[tokio::test]
async fn test_snapshot_hands_turn_to_other_player() {
    let store = MemoryStore::spawn();
    let (mut p1, mut p2) = started(&store, 2).await;
    let mut feed = p2.subscribe().await.unwrap();
    let _ = feed.try_next_snapshot();

    p1.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await.unwrap();

    let snapshot = feed.try_next_snapshot().expect("snapshot after write");
    assert!(!p2.is_my_turn());
    p2.apply_snapshot(snapshot);
    assert!(p2.is_my_turn());
    assert_eq!(p2.state(), p1.state());
}

#[tokio::test]
async fn test_unsubscribed_feed_does_not_block_others() {
    let store = MemoryStore::spawn();
    let (mut p1, p2) = started(&store, 2).await;
    let gone = p2.subscribe().await.unwrap();
    let mut kept = p2.subscribe().await.unwrap();
    let _ = kept.try_next_snapshot();

    gone.unsubscribe();
    p1.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await.unwrap();

    let snapshot = kept.next_snapshot().await.unwrap();
    assert_eq!(snapshot.lines.unwrap().len(), 1);
}

#[tokio::test]
async fn test_racing_write_conflict_leaves_local_state_alone() {
    let store = MemoryStore::spawn();
    let (mut p1, _p2) = started(&store, 2).await;
    let contested = line_key(d(0, 0), d(0, 1));

    // Someone else's write lands first.
    let rival = MatchUpdate {
        lines: [(contested, pid("p2"))].into(),
        ..MatchUpdate::default()
    };
    store.write(p1.match_id(), rival).await.unwrap();

    let before: Match = p1.state().clone();
    let result = p1.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await;
    assert!(matches!(
        result,
        Err(SyncError::Protocol(ProtocolError::Conflict(_)))
    ));
    assert_eq!(p1.state(), &before);

    p1.refresh().await.unwrap();
    let retry = p1.draw_line(&pid("p1"), d(0, 0), d(0, 1)).await;
    assert!(matches!(retry, Err(SyncError::LineTaken(_))));
}

#[tokio::test]
async fn test_store_unavailable_after_shutdown() {
    let store = MemoryStore::spawn();
    store.shutdown().await.unwrap();
    tokio::task::yield_now().await;

    let result = store.read(&MatchId::from("x")).await;
    assert!(matches!(result, Err(SyncError::Unavailable)));
}

// =========================================================================
// AI and stats
// =========================================================================

async fn ai_match(store: &MemoryStore, grid_size: u32) -> MatchController<MemoryStore> {
    let mut host = MatchController::create(store.clone(), pid("human"), "Ada", config(grid_size))
        .await
        .unwrap();
    host.add_ai_player("Orion").await.unwrap();
    host.start().await.unwrap();
    host
}

#[tokio::test]
async fn test_play_ai_turn_waits_for_ai() {
    let store = MemoryStore::spawn();
    let mut host = ai_match(&store, 2).await;
    let mut rng = StdRng::seed_from_u64(3);

    assert_eq!(host.play_ai_turn(&mut rng).await.unwrap(), None);

    host.draw_line(&pid("human"), d(0, 0), d(0, 1)).await.unwrap();
    let played = host.play_ai_turn(&mut rng).await.unwrap().expect("ai moves");
    assert_ne!(played.line, line_key(d(0, 0), d(0, 1)));
}

#[tokio::test]
async fn test_full_match_against_ai_is_consistent() {
    for seed in 0..5 {
        let store = MemoryStore::spawn();
        let mut host = ai_match(&store, 3).await;
        let mut rng = StdRng::seed_from_u64(seed);

        while host.state().state == Lifecycle::InProgress {
            if host.is_my_turn() {
                let line = ai::choose_line(host.grid(), &host.state().lines, &mut rng).unwrap();
                host.draw_line(&pid("human"), line.start(), line.end()).await.unwrap();
            } else {
                host.play_ai_turn(&mut rng).await.unwrap().expect("ai's turn");
            }
        }

        let doc = store.read(host.match_id()).await.unwrap();
        assert_eq!(doc.state, Lifecycle::Finished);
        assert_eq!(doc.lines.len(), Grid::square(3).line_count());
        assert_eq!(doc.squares.len(), 9);
        assert_eq!(doc.scores.values().sum::<u32>(), 9);
        assert_eq!(&doc, host.state(), "seed {seed}");
        match host.outcome() {
            Outcome::Winner(w) => assert_eq!(doc.winner, Some(w)),
            Outcome::Tie(_) => panic!("an odd number of squares can't tie two players"),
            Outcome::Undecided => panic!("finished match is undecided"),
        }
    }
}

#[tokio::test]
async fn test_record_result_once_and_skip_ai() {
    let store = MemoryStore::spawn();
    let mut host = ai_match(&store, 1).await;
    let mut rng = StdRng::seed_from_u64(11);

    assert!(!host.record_result().await.unwrap(), "not finished yet");

    while host.state().state == Lifecycle::InProgress {
        if host.is_my_turn() {
            let line = ai::choose_line(host.grid(), &host.state().lines, &mut rng).unwrap();
            host.draw_line(&pid("human"), line.start(), line.end()).await.unwrap();
        } else {
            host.play_ai_turn(&mut rng).await.unwrap();
        }
    }

    assert!(host.record_result().await.unwrap());
    assert!(!host.record_result().await.unwrap());

    let stats = store.user_stats(&pid("human")).await.unwrap().unwrap();
    assert_eq!(stats.games_played(), 1);
    let expected = match host.outcome() {
        Outcome::Winner(w) if w == pid("human") => GameResult::Win,
        _ => GameResult::Loss,
    };
    let mut want = UserStats::default();
    want.record(expected);
    assert_eq!(stats, want);

    store.record_result(&PlayerId::ai(), GameResult::Win).await.unwrap();
    assert_eq!(store.user_stats(&PlayerId::ai()).await.unwrap(), None);
}
