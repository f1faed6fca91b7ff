//! Pool actor: registry ownership and matchmaking.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use goban_game::{Game, Gamer};
use goban_types::GamerId;

use crate::PoolError;

/// Command queue depth for the pool actor.
const COMMAND_CHANNEL_SIZE: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, PoolError>>;

/// Commands sent to the pool actor through its queue.
pub(crate) enum PoolCommand {
    Add {
        gamer: Gamer,
        reply: Reply<()>,
    },
    Remove {
        id: GamerId,
        reply: Reply<Gamer>,
    },
    Get {
        id: GamerId,
        reply: Reply<Gamer>,
    },
    List {
        reply: oneshot::Sender<Vec<Gamer>>,
    },
    JoinGame {
        id: GamerId,
        size: usize,
        komi: f64,
        reply: Reply<()>,
    },
    ReleaseGame {
        id: GamerId,
        reply: Reply<()>,
    },
    Release {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to the running pool actor. Cheap to clone.
///
/// After [`Pool::release`] every operation fails with
/// [`PoolError::Unavailable`].
#[derive(Debug, Clone)]
pub struct Pool {
    sender: mpsc::Sender<PoolCommand>,
}

impl Pool {
    /// Spawns the pool worker and returns its handle.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let actor = PoolActor {
            gamers: HashMap::new(),
            receiver,
        };
        tokio::spawn(actor.run());
        Self { sender }
    }

    /// Registers a gamer under its id.
    pub async fn add_gamer(&self, gamer: Gamer) -> Result<(), PoolError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PoolCommand::Add { gamer, reply })
            .await
            .map_err(|_| PoolError::Unavailable)?;
        rx.await.map_err(|_| PoolError::Unavailable)?
    }

    /// Unregisters a gamer and returns the removed record.
    pub async fn rm_gamer(&self, id: GamerId) -> Result<Gamer, PoolError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PoolCommand::Remove { id, reply })
            .await
            .map_err(|_| PoolError::Unavailable)?;
        rx.await.map_err(|_| PoolError::Unavailable)?
    }

    /// A copy of the registered gamer.
    pub async fn get_gamer(&self, id: GamerId) -> Result<Gamer, PoolError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PoolCommand::Get { id, reply })
            .await
            .map_err(|_| PoolError::Unavailable)?;
        rx.await.map_err(|_| PoolError::Unavailable)?
    }

    /// A snapshot of copies of every registered gamer, in no
    /// particular order.
    pub async fn list_gamers(&self) -> Result<Vec<Gamer>, PoolError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PoolCommand::List { reply })
            .await
            .map_err(|_| PoolError::Unavailable)?;
        rx.await.map_err(|_| PoolError::Unavailable)
    }

    /// Attaches the gamer to some other gamer's session, or opens a
    /// fresh one of `size` x `size` with the given komi.
    pub async fn join_game(
        &self,
        id: GamerId,
        size: usize,
        komi: f64,
    ) -> Result<(), PoolError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PoolCommand::JoinGame {
                id,
                size,
                komi,
                reply,
            })
            .await
            .map_err(|_| PoolError::Unavailable)?;
        rx.await.map_err(|_| PoolError::Unavailable)?
    }

    /// Detaches the gamer from their current session, if any.
    pub async fn release_game(&self, id: GamerId) -> Result<(), PoolError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PoolCommand::ReleaseGame { id, reply })
            .await
            .map_err(|_| PoolError::Unavailable)?;
        rx.await.map_err(|_| PoolError::Unavailable)?
    }

    /// Stops the pool worker.
    ///
    /// Sessions are NOT ended: a game whose handle is held elsewhere
    /// keeps running after the pool is gone.
    pub async fn release(&self) -> Result<(), PoolError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(PoolCommand::Release { reply })
            .await
            .map_err(|_| PoolError::Unavailable)?;
        rx.await.map_err(|_| PoolError::Unavailable)
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

/// The internal pool actor. Runs inside a Tokio task.
struct PoolActor {
    gamers: HashMap<GamerId, Gamer>,
    receiver: mpsc::Receiver<PoolCommand>,
}

impl PoolActor {
    async fn run(mut self) {
        tracing::info!("gamer pool started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                PoolCommand::Release { reply } => {
                    let _ = reply.send(());
                    break;
                }
                PoolCommand::Add { gamer, reply } => {
                    let _ = reply.send(self.handle_add(gamer));
                }
                PoolCommand::Remove { id, reply } => {
                    let _ = reply.send(self.handle_remove(id));
                }
                PoolCommand::Get { id, reply } => {
                    let _ = reply.send(self.handle_get(id));
                }
                PoolCommand::List { reply } => {
                    let _ = reply.send(self.gamers.values().cloned().collect());
                }
                PoolCommand::JoinGame {
                    id,
                    size,
                    komi,
                    reply,
                } => {
                    let _ = reply.send(self.handle_join_game(id, size, komi).await);
                }
                PoolCommand::ReleaseGame { id, reply } => {
                    let _ = reply.send(self.handle_release_game(id).await);
                }
            }
        }

        tracing::info!(gamers = self.gamers.len(), "gamer pool stopped");
    }

    fn handle_add(&mut self, gamer: Gamer) -> Result<(), PoolError> {
        if self.gamers.contains_key(&gamer.id) {
            return Err(PoolError::IdOccupied(gamer.id));
        }
        tracing::info!(gamer = %gamer, "gamer registered");
        self.gamers.insert(gamer.id, gamer);
        Ok(())
    }

    fn handle_remove(&mut self, id: GamerId) -> Result<Gamer, PoolError> {
        let gamer = self.gamers.remove(&id).ok_or(PoolError::NotFound(id))?;
        tracing::info!(gamer = %gamer, "gamer removed");
        Ok(gamer)
    }

    fn handle_get(&self, id: GamerId) -> Result<Gamer, PoolError> {
        self.gamers
            .get(&id)
            .cloned()
            .ok_or(PoolError::NotFound(id))
    }

    async fn handle_join_game(
        &mut self,
        id: GamerId,
        size: usize,
        komi: f64,
    ) -> Result<(), PoolError> {
        let gamer = self.gamers.get(&id).ok_or(PoolError::NotFound(id))?;
        if gamer.game.is_some() {
            return Err(PoolError::GamerOccupied(id));
        }
        // The session receives identity only, never the live handle.
        let seeker = gamer.detached();

        // Scan every other gamer's live session; first acceptance
        // wins, rejections (full, collapsed, gone) just continue the
        // search.
        let candidates: Vec<Game> = self
            .gamers
            .values()
            .filter(|other| other.id != id)
            .filter_map(|other| other.game.clone())
            .collect();
        for game in candidates {
            if game.join(&seeker).await.is_ok() {
                tracing::info!(gamer = %id, game = %game, "gamer matched into game");
                self.attach(id, game);
                return Ok(());
            }
        }

        // Nobody to play with: open a fresh session and take the
        // first seat. A failed self-join tears the session back down.
        let game = Game::new(size, komi).map_err(PoolError::GameStart)?;
        if let Err(err) = game.join(&seeker).await {
            let _ = game.end().await;
            return Err(PoolError::GameStart(err));
        }
        tracing::info!(gamer = %id, game = %game, "gamer started a new game");
        self.attach(id, game);
        Ok(())
    }

    async fn handle_release_game(&mut self, id: GamerId) -> Result<(), PoolError> {
        let gamer = self.gamers.get_mut(&id).ok_or(PoolError::NotFound(id))?;
        if let Some(game) = gamer.game.take() {
            // The session may already be gone; either way the
            // reference is cleared.
            let _ = game.leave(id).await;
            tracing::info!(gamer = %id, game = %game, "gamer released their game");
        }
        Ok(())
    }

    fn attach(&mut self, id: GamerId, game: Game) {
        if let Some(entry) = self.gamers.get_mut(&id) {
            entry.game = Some(game);
        }
    }
}
