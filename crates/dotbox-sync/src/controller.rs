//! Match controller: one participant's view of a match.
//!
//! The controller owns the local copy of the match document and the
//! turn cursor. Every action follows the same path:
//!
//! ```text
//! validate → compute delta (rules) → store.write → apply locally
//! ```
//!
//! Local state is only touched after the store accepts the write, so a
//! failed sync never leaves a half-applied move behind. Snapshots from
//! other participants arrive through [`MatchController::apply_snapshot`].

use dotbox_protocol::{
    Dot, LineKey, Lifecycle, Match, MatchId, MatchSnapshot, MatchUpdate, PlayerId, SquareKey,
};
use dotbox_rules::{Grid, MatchConfig, Outcome, TurnManager, ai, squares_affected_by_line, victory};
use rand::Rng;

use crate::{GameResult, MatchStore, StatsStore, Subscription, SyncError};

/// Colors handed out by join order.
const PLAYER_COLORS: [&str; 8] = [
    "#e53935", "#1e88e5", "#43a047", "#fb8c00", "#8e24aa", "#00acc1", "#fdd835", "#6d4c41",
];

fn color_for(index: usize) -> String {
    PLAYER_COLORS[index % PLAYER_COLORS.len()].to_string()
}

/// What a single accepted line draw did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSummary {
    pub line: LineKey,
    /// Squares newly credited to the mover, above/left first.
    pub completed: Vec<SquareKey>,
    /// Whose turn it is now. Completing a square keeps the turn.
    pub next_player: PlayerId,
    pub outcome: Outcome,
}

/// Drives one participant's side of a match against a [`MatchStore`].
pub struct MatchController<S: MatchStore> {
    store: S,
    match_id: MatchId,
    local_player: PlayerId,
    config: MatchConfig,
    state: Match,
    turns: TurnManager,
    result_recorded: bool,
}

impl<S: MatchStore> MatchController<S> {
    /// Creates a new match in the lobby with `creator` as its only player.
    pub async fn create(
        store: S,
        creator: PlayerId,
        creator_name: impl Into<String>,
        config: MatchConfig,
    ) -> Result<Self, SyncError> {
        config.validate()?;

        let mut initial = Match::new_lobby(creator.clone(), creator_name, config.grid_size);
        initial.player_colors.insert(creator.clone(), color_for(0));

        let match_id = store.create(initial.clone()).await?;
        tracing::info!(%match_id, %creator, grid_size = config.grid_size, "match opened");

        Ok(Self::from_parts(store, match_id, creator, config, initial))
    }

    /// Joins an existing match as `player`.
    ///
    /// Rejoining a match the player is already in just loads it, in any
    /// lifecycle state. New players can only join a lobby that has room.
    pub async fn join(
        store: S,
        match_id: MatchId,
        player: PlayerId,
        name: impl Into<String>,
        config: MatchConfig,
    ) -> Result<Self, SyncError> {
        let current = store.read(&match_id).await?;
        let config = MatchConfig {
            grid_size: current.grid_size,
            ..config
        };
        config.validate()?;
        let mut controller = Self::from_parts(store, match_id, player.clone(), config, current);

        if !controller.state.players.contains(&player) {
            controller.admit(player, name.into()).await?;
        }
        Ok(controller)
    }

    fn from_parts(
        store: S,
        match_id: MatchId,
        local_player: PlayerId,
        config: MatchConfig,
        state: Match,
    ) -> Self {
        let mut controller = Self {
            store,
            match_id,
            local_player,
            config,
            state,
            turns: TurnManager::default(),
            result_recorded: false,
        };
        controller.sync_turns();
        controller
    }

    /// Seats the computer opponent. Lobby only.
    pub async fn add_ai_player(&mut self, name: impl Into<String>) -> Result<(), SyncError> {
        self.admit(PlayerId::ai(), name.into()).await
    }

    async fn admit(&mut self, player: PlayerId, name: String) -> Result<(), SyncError> {
        if self.state.state != Lifecycle::Lobby {
            return Err(SyncError::InvalidState(format!(
                "cannot join match in state {}",
                self.state.state
            )));
        }
        if self.state.players.contains(&player) {
            return Ok(());
        }
        if self.state.players.len() >= self.config.max_players {
            return Err(SyncError::MatchFull(self.match_id.clone()));
        }

        let update = MatchUpdate {
            players_joined: vec![player.clone()],
            player_names: [(player.clone(), name)].into(),
            player_colors: [(player.clone(), color_for(self.state.players.len()))].into(),
            ..MatchUpdate::default()
        };
        self.commit(update).await?;
        tracing::info!(
            match_id = %self.match_id,
            %player,
            players = self.state.players.len(),
            "player joined"
        );
        Ok(())
    }

    /// Leaves the lobby and starts play.
    ///
    /// Freezes the roster, zeroes every score and gives the first turn to
    /// the first player who joined.
    pub async fn start(&mut self) -> Result<(), SyncError> {
        if !self.state.state.can_transition_to(Lifecycle::InProgress) {
            return Err(SyncError::InvalidState(format!(
                "cannot start match in state {}",
                self.state.state
            )));
        }
        if self.state.players.len() < self.config.min_players {
            return Err(SyncError::InvalidState(format!(
                "need {} players to start, have {}",
                self.config.min_players,
                self.state.players.len()
            )));
        }

        let update = MatchUpdate {
            scores: self.state.players.iter().map(|p| (p.clone(), 0)).collect(),
            current_player: self.state.players.first().cloned(),
            state: Some(Lifecycle::InProgress),
            ..MatchUpdate::default()
        };
        self.commit(update).await?;
        tracing::info!(match_id = %self.match_id, players = self.state.players.len(), "match started");
        Ok(())
    }

    /// Draws the line between `a` and `b` for `player`.
    ///
    /// # Errors
    /// - [`SyncError::InvalidState`] unless the match is in progress
    /// - [`SyncError::NotYourTurn`] if `player` isn't the current player
    /// - [`SyncError::Rules`] for lines that aren't on the grid
    /// - [`SyncError::LineTaken`] if the line is already drawn
    /// - any store error from the write; local state is left untouched
    pub async fn draw_line(
        &mut self,
        player: &PlayerId,
        a: Dot,
        b: Dot,
    ) -> Result<MoveSummary, SyncError> {
        if self.state.state != Lifecycle::InProgress {
            return Err(SyncError::InvalidState(format!(
                "cannot draw in state {}",
                self.state.state
            )));
        }
        if !self.turns.is_turn_of(player) {
            return Err(SyncError::NotYourTurn(player.clone()));
        }
        let line = self.grid().validate_line(a, b)?;
        if self.state.lines.contains_key(&line) {
            return Err(SyncError::LineTaken(line));
        }

        let (update, summary) = self.plan_move(player, line);
        self.commit(update).await?;

        tracing::debug!(
            match_id = %self.match_id,
            %player,
            %line,
            completed = summary.completed.len(),
            next = %summary.next_player,
            "line drawn"
        );
        if let Outcome::Winner(w) = &summary.outcome {
            tracing::info!(match_id = %self.match_id, winner = %w, "match finished");
        } else if let Outcome::Tie(tied) = &summary.outcome {
            tracing::info!(match_id = %self.match_id, tied = tied.len(), "match finished in a tie");
        }
        Ok(summary)
    }

    /// Builds the delta for `player` drawing `line`, without applying it.
    fn plan_move(&mut self, player: &PlayerId, line: LineKey) -> (MatchUpdate, MoveSummary) {
        // The checker needs the new line in the collection; put it in
        // just long enough to ask, so nothing changes before the write.
        self.state.lines.insert(line, player.clone());
        let mut completed = squares_affected_by_line(line, &self.state.lines, self.grid());
        self.state.lines.remove(&line);
        completed.retain(|sq| !self.state.squares.contains_key(sq));

        let gained = completed.len() as u32;
        let next_player = if gained == 0 {
            self.turns.next_player().cloned().unwrap_or_else(|| player.clone())
        } else {
            player.clone()
        };

        let projected: Vec<(&PlayerId, u32)> = self
            .state
            .roster_scores()
            .into_iter()
            .map(|(p, s)| (p, if p == player { s + gained } else { s }))
            .collect();
        let outcome = victory::outcome(projected, self.state.total_squares());

        let mut update = MatchUpdate {
            lines: [(line, player.clone())].into(),
            squares: completed.iter().map(|sq| (*sq, player.clone())).collect(),
            current_player: Some(next_player.clone()),
            ..MatchUpdate::default()
        };
        if gained > 0 {
            update.scores.insert(player.clone(), gained);
        }
        if outcome.is_over() {
            update.state = Some(Lifecycle::Finished);
            if let Outcome::Winner(w) = &outcome {
                update.winner = Some(w.clone());
            }
        }

        let summary = MoveSummary {
            line,
            completed,
            next_player,
            outcome,
        };
        (update, summary)
    }

    /// Plays the computer opponent's move if it is the AI's turn.
    ///
    /// Returns `Ok(None)` when it isn't.
    pub async fn play_ai_turn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<MoveSummary>, SyncError> {
        let ai_player = PlayerId::ai();
        if self.state.state != Lifecycle::InProgress || !self.turns.is_turn_of(&ai_player) {
            return Ok(None);
        }
        let Some(line) = ai::choose_line(self.grid(), &self.state.lines, rng) else {
            return Ok(None);
        };
        self.draw_line(&ai_player, line.start(), line.end())
            .await
            .map(Some)
    }

    /// Writes `update` to the store, then applies it locally.
    async fn commit(&mut self, update: MatchUpdate) -> Result<(), SyncError> {
        if let Err(e) = self.store.write(&self.match_id, update.clone()).await {
            tracing::warn!(match_id = %self.match_id, error = %e, "failed to sync update");
            return Err(e);
        }
        self.state.apply(&update)?;
        self.sync_turns();
        Ok(())
    }

    /// Overlays a snapshot received from the store.
    pub fn apply_snapshot(&mut self, snapshot: MatchSnapshot) {
        self.state.overlay(snapshot);
        self.sync_turns();
    }

    /// Replaces local state with the store's current document.
    ///
    /// Use after a rejected write to catch up with whoever won the race.
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        let current = self.store.read(&self.match_id).await?;
        self.apply_snapshot(MatchSnapshot::from(current));
        Ok(())
    }

    /// Subscribes to snapshots of this match.
    pub async fn subscribe(&self) -> Result<Subscription, SyncError> {
        self.store.subscribe(&self.match_id).await
    }

    /// Rebuilds the turn cursor from the document.
    fn sync_turns(&mut self) {
        if self.turns.players() != self.state.players.as_slice() {
            self.turns = TurnManager::new(self.state.players.clone());
        }
        if let Some(current) = &self.state.current_player {
            self.turns.set_current_player(current);
        }
    }

    // -- Accessors --------------------------------------------------------

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub fn local_player(&self) -> &PlayerId {
        &self.local_player
    }

    /// The local copy of the match document.
    pub fn state(&self) -> &Match {
        &self.state
    }

    pub fn turns(&self) -> &TurnManager {
        &self.turns
    }

    pub fn grid(&self) -> Grid {
        Grid::square(self.state.grid_size)
    }

    pub fn is_my_turn(&self) -> bool {
        self.state.state == Lifecycle::InProgress && self.turns.is_turn_of(&self.local_player)
    }

    /// The match result so far, ties included.
    pub fn outcome(&self) -> Outcome {
        victory::outcome(self.state.roster_scores(), self.state.total_squares())
    }
}

impl<S: MatchStore + StatsStore> MatchController<S> {
    /// Records the local player's win/loss/tie once the match is over.
    ///
    /// Each participant records only its own result, so every player is
    /// counted once. Returns `true` if something was recorded.
    pub async fn record_result(&mut self) -> Result<bool, SyncError> {
        if self.result_recorded || self.state.state != Lifecycle::Finished {
            return Ok(false);
        }
        let Some(result) = GameResult::for_player(&self.outcome(), &self.local_player) else {
            return Ok(false);
        };
        self.store.record_result(&self.local_player, result).await?;
        self.result_recorded = true;
        tracing::info!(
            match_id = %self.match_id,
            player = %self.local_player,
            ?result,
            "result recorded"
        );
        Ok(true)
    }
}
