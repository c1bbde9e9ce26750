//! In-process match store: an isolated Tokio task that owns every document.
//!
//! The store runs as an actor. [`MemoryStore`] is a cheap, cloneable
//! handle that sends commands through an mpsc channel; each command that
//! needs an answer carries a `oneshot` reply channel. All writes are
//! therefore serialized, which is what makes [`MatchStore::write`]
//! atomic here.

use std::collections::HashMap;

use dotbox_protocol::{Match, MatchId, MatchSnapshot, MatchUpdate, PlayerId};
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::{mpsc, oneshot};

use crate::{GameResult, MatchStore, StatsStore, Subscription, SyncError, UserStats};

/// Shortest match id a store will generate.
pub const MIN_ID_LENGTH: usize = 8;

/// Settings for a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the command channel. Senders wait when it is full.
    pub channel_size: usize,

    /// Length of generated match ids, at least [`MIN_ID_LENGTH`].
    pub id_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            id_length: 20,
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, SyncError>>;

/// Commands sent to the store actor.
enum StoreCommand {
    Create {
        initial: Match,
        reply: Reply<MatchId>,
    },
    Read {
        id: MatchId,
        reply: Reply<Match>,
    },
    Write {
        id: MatchId,
        update: MatchUpdate,
        reply: Reply<()>,
    },
    Subscribe {
        id: MatchId,
        reply: Reply<(u64, mpsc::UnboundedReceiver<MatchSnapshot>)>,
    },
    Unsubscribe {
        id: MatchId,
        subscriber: u64,
    },
    RecordResult {
        player: PlayerId,
        result: GameResult,
        reply: Reply<()>,
    },
    Stats {
        player: PlayerId,
        reply: Reply<Option<UserStats>>,
    },
    Shutdown,
}

/// Handle to a running in-memory store.
///
/// Cloning is cheap; every clone talks to the same documents.
#[derive(Clone)]
pub struct MemoryStore {
    sender: mpsc::Sender<StoreCommand>,
}

impl MemoryStore {
    /// Spawns a store with default settings. Must be called inside a
    /// Tokio runtime.
    pub fn spawn() -> Self {
        Self::spawn_with(StoreConfig::default())
    }

    /// Spawns a store actor and returns a handle to it.
    ///
    /// `channel_size` is raised to at least 1 and `id_length` to at least
    /// [`MIN_ID_LENGTH`].
    pub fn spawn_with(config: StoreConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_size.max(1));
        let actor = StoreActor {
            documents: HashMap::new(),
            stats: HashMap::new(),
            next_subscriber: 1,
            id_length: config.id_length.max(MIN_ID_LENGTH),
            receiver: rx,
        };
        tokio::spawn(actor.run());
        Self { sender: tx }
    }

    /// Stops the actor. Open subscriptions end with `None`.
    pub async fn shutdown(&self) -> Result<(), SyncError> {
        self.sender
            .send(StoreCommand::Shutdown)
            .await
            .map_err(|_| SyncError::Unavailable)
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> StoreCommand + Send,
    ) -> Result<T, SyncError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| SyncError::Unavailable)?;
        reply_rx.await.map_err(|_| SyncError::Unavailable)?
    }
}

impl MatchStore for MemoryStore {
    async fn create(&self, initial: Match) -> Result<MatchId, SyncError> {
        self.request(|reply| StoreCommand::Create { initial, reply })
            .await
    }

    async fn read(&self, id: &MatchId) -> Result<Match, SyncError> {
        let id = id.clone();
        self.request(|reply| StoreCommand::Read { id, reply }).await
    }

    async fn write(&self, id: &MatchId, update: MatchUpdate) -> Result<(), SyncError> {
        let id = id.clone();
        self.request(|reply| StoreCommand::Write { id, update, reply })
            .await
    }

    async fn subscribe(&self, id: &MatchId) -> Result<Subscription, SyncError> {
        let match_id = id.clone();
        let (subscriber, receiver) = self
            .request(|reply| StoreCommand::Subscribe { id: match_id, reply })
            .await?;

        // Drop can't await, so deregistration uses `try_send`. If the
        // channel is full the command is lost, but the closed receiver
        // is pruned on the next write anyway.
        let sender = self.sender.clone();
        let id = id.clone();
        Ok(Subscription::new(receiver, move || {
            let _ = sender.try_send(StoreCommand::Unsubscribe { id, subscriber });
        }))
    }
}

impl StatsStore for MemoryStore {
    async fn record_result(&self, player: &PlayerId, result: GameResult) -> Result<(), SyncError> {
        let player = player.clone();
        self.request(|reply| StoreCommand::RecordResult { player, result, reply })
            .await
    }

    async fn user_stats(&self, player: &PlayerId) -> Result<Option<UserStats>, SyncError> {
        let player = player.clone();
        self.request(|reply| StoreCommand::Stats { player, reply })
            .await
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// One stored match plus everyone listening to it.
struct Document {
    current: Match,
    subscribers: HashMap<u64, mpsc::UnboundedSender<MatchSnapshot>>,
}

impl Document {
    /// Sends the current document to every subscriber, dropping the
    /// ones whose receiver is gone.
    fn fan_out(&mut self) {
        let current = &self.current;
        self.subscribers
            .retain(|_, tx| tx.send(MatchSnapshot::from(current.clone())).is_ok());
    }
}

struct StoreActor {
    documents: HashMap<MatchId, Document>,
    stats: HashMap<PlayerId, UserStats>,
    next_subscriber: u64,
    id_length: usize,
    receiver: mpsc::Receiver<StoreCommand>,
}

impl StoreActor {
    async fn run(mut self) {
        tracing::info!("match store started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                StoreCommand::Create { initial, reply } => {
                    let _ = reply.send(Ok(self.handle_create(initial)));
                }
                StoreCommand::Read { id, reply } => {
                    let result = self
                        .documents
                        .get(&id)
                        .map(|doc| doc.current.clone())
                        .ok_or(SyncError::NotFound(id));
                    let _ = reply.send(result);
                }
                StoreCommand::Write { id, update, reply } => {
                    let _ = reply.send(self.handle_write(id, update));
                }
                StoreCommand::Subscribe { id, reply } => {
                    let _ = reply.send(self.handle_subscribe(id));
                }
                StoreCommand::Unsubscribe { id, subscriber } => {
                    if let Some(doc) = self.documents.get_mut(&id) {
                        doc.subscribers.remove(&subscriber);
                        tracing::debug!(match_id = %id, subscriber, "unsubscribed");
                    }
                }
                StoreCommand::RecordResult {
                    player,
                    result,
                    reply,
                } => {
                    if !player.is_ai() {
                        self.stats.entry(player).or_default().record(result);
                    }
                    let _ = reply.send(Ok(()));
                }
                StoreCommand::Stats { player, reply } => {
                    let stats = if player.is_ai() {
                        None
                    } else {
                        self.stats.get(&player).copied()
                    };
                    let _ = reply.send(Ok(stats));
                }
                StoreCommand::Shutdown => {
                    tracing::info!("match store shutting down");
                    break;
                }
            }
        }

        tracing::info!("match store stopped");
    }

    fn handle_create(&mut self, initial: Match) -> MatchId {
        let id = loop {
            let candidate = self.generate_id();
            if !self.documents.contains_key(&candidate) {
                break candidate;
            }
        };
        tracing::info!(match_id = %id, grid_size = initial.grid_size, "match created");
        self.documents.insert(
            id.clone(),
            Document {
                current: initial,
                subscribers: HashMap::new(),
            },
        );
        id
    }

    fn handle_write(&mut self, id: MatchId, update: MatchUpdate) -> Result<(), SyncError> {
        let doc = self
            .documents
            .get_mut(&id)
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;

        if let Err(e) = doc.current.apply(&update) {
            tracing::debug!(match_id = %id, error = %e, "write rejected");
            return Err(e.into());
        }
        doc.fan_out();
        Ok(())
    }

    fn handle_subscribe(
        &mut self,
        id: MatchId,
    ) -> Result<(u64, mpsc::UnboundedReceiver<MatchSnapshot>), SyncError> {
        let doc = self
            .documents
            .get_mut(&id)
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        // Listeners get the current document straight away.
        let _ = tx.send(MatchSnapshot::from(doc.current.clone()));

        let subscriber = self.next_subscriber;
        self.next_subscriber += 1;
        doc.subscribers.insert(subscriber, tx);
        tracing::debug!(match_id = %id, subscriber, "subscribed");
        Ok((subscriber, rx))
    }

    /// A random alphanumeric document id.
    fn generate_id(&self) -> MatchId {
        let id: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.id_length)
            .map(char::from)
            .collect();
        MatchId(id)
    }
}
