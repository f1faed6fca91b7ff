//! Game actor: an isolated Tokio task that owns one session.
//!
//! Every operation on a session travels as a command through one mpsc
//! queue and is processed strictly sequentially by the session's
//! worker. Results come back on per-command oneshot reply channels.
//! The worker also parks reply channels for callers blocked in
//! `wait_begin` / `wait_turn` and resolves them when the game starts,
//! the turn changes, a participant leaves, or the session dies.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use goban_field::Field;
use goban_types::{Colour, Coord, FieldState, GameId, GamerId};

use crate::{Board, GameError, Gamer};

/// Counter for generating unique game ids.
static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Command queue depth per session. Two players cannot realistically
/// keep 64 commands in flight; the bound exists for backpressure.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// Reply channel for a single command.
///
/// `oneshot` gives the buffer-of-one guarantee the wait protocol
/// needs: the actor never blocks posting to a waiter that has already
/// been cancelled and dropped its receiver.
type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Commands sent to a game actor through its queue.
pub(crate) enum GameCommand {
    Join {
        id: GamerId,
        name: String,
        reply: Reply<()>,
    },
    Leave {
        id: GamerId,
        reply: Reply<()>,
    },
    End {
        reply: Reply<()>,
    },
    GamerState {
        id: GamerId,
        reply: Reply<GamerState>,
    },
    FieldSize {
        id: GamerId,
        reply: Reply<usize>,
    },
    GameState {
        id: GamerId,
        reply: Reply<FieldState>,
    },
    IsBegun {
        id: GamerId,
        reply: Reply<bool>,
    },
    IsMyTurn {
        id: GamerId,
        reply: Reply<bool>,
    },
    WaitBegin {
        id: GamerId,
        reply: Reply<()>,
    },
    WaitTurn {
        id: GamerId,
        reply: Reply<()>,
    },
    MakeTurn {
        id: GamerId,
        at: Coord,
        reply: Reply<()>,
    },
}

/// A copy of one participant's state as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamerState {
    /// The chip colour assigned on join.
    pub colour: Colour,
    /// The participant's display name.
    pub name: String,
}

/// Handle to a running game actor.
///
/// Cheap to clone, just an id plus an `mpsc::Sender`. Handles compare and
/// hash by game id, so callers can keep them in maps and sets to tally
/// distinct sessions. Once the actor stops, every operation fails with
/// [`GameError::Unavailable`].
#[derive(Debug, Clone)]
pub struct Game {
    game_id: GameId,
    sender: mpsc::Sender<GameCommand>,
}

impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        self.game_id == other.game_id
    }
}

impl Eq for Game {}

impl Hash for Game {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.game_id.hash(state);
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.game_id, f)
    }
}

impl Game {
    /// Creates a session over a fresh board and spawns its worker.
    ///
    /// Fails if the board rejects the size; komi is passed through to
    /// the engine.
    pub fn new(size: usize, komi: f64) -> Result<Self, GameError> {
        let field = Field::new(size, komi)?;
        Ok(Self::with_board(field, StdRng::from_os_rng()))
    }

    /// Creates a session over a caller-supplied board engine and rng.
    ///
    /// The rng drives colour assignment; seed it for deterministic
    /// tests.
    pub fn with_board<B: Board + 'static>(board: B, rng: StdRng) -> Self {
        let game_id = GameId(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        let actor = GameActor {
            game_id,
            participants: HashMap::new(),
            turn_index: 0,
            over: false,
            board: Box::new(board),
            rng,
            receiver,
        };
        tokio::spawn(actor.run());

        Self { game_id, sender }
    }

    /// The session's unique id.
    pub fn id(&self) -> GameId {
        self.game_id
    }

    /// Takes a vacant seat for `gamer`.
    ///
    /// The first joiner draws a random colour; the second gets the
    /// other one and the game begins.
    pub async fn join(&self, gamer: &Gamer) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::Join {
                id: gamer.id,
                name: gamer.name.clone(),
                reply,
            })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Gives up the seat held by `id` and collapses the game.
    ///
    /// Every wait still pending on the session resolves with
    /// [`GameError::OtherGamerLeft`]. When the last participant
    /// leaves, the session destroys itself.
    pub async fn leave(&self, id: GamerId) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::Leave { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Destroys the session immediately.
    ///
    /// Pending waits resolve with [`GameError::Destroyed`]; later
    /// operations fail with [`GameError::Unavailable`].
    pub async fn end(&self) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::End { reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// A copy of the participant's assigned colour and name.
    ///
    /// Still answerable during collapse while the participant remains
    /// registered.
    pub async fn gamer_state(&self, id: GamerId) -> Result<GamerState, GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::GamerState { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// The board dimension.
    pub async fn field_size(&self, id: GamerId) -> Result<usize, GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::FieldSize { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// A full snapshot of the board situation.
    pub async fn game_state(&self, id: GamerId) -> Result<FieldState, GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::GameState { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Whether both seats are taken. A poll-style alternative to
    /// [`Game::wait_begin`].
    pub async fn is_begun(&self, id: GamerId) -> Result<bool, GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::IsBegun { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Whether it is this participant's turn. A poll-style alternative
    /// to [`Game::wait_turn`].
    pub async fn is_my_turn(&self, id: GamerId) -> Result<bool, GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::IsMyTurn { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Blocks until both seats are taken, the session collapses, or
    /// `cancel` fires.
    ///
    /// Cancellation is caller-side: the actor is not informed and may
    /// still resolve the parked reply later; the one-shot buffer
    /// absorbs it.
    pub async fn wait_begin(
        &self,
        id: GamerId,
        cancel: &CancellationToken,
    ) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::WaitBegin { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        tokio::select! {
            res = rx => res.map_err(|_| GameError::Unavailable)?,
            _ = cancel.cancelled() => Err(GameError::Cancelled),
        }
    }

    /// Blocks until it is this participant's turn, the session
    /// collapses, or `cancel` fires. Resolves immediately when the
    /// turn is already theirs.
    pub async fn wait_turn(
        &self,
        id: GamerId,
        cancel: &CancellationToken,
    ) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::WaitTurn { id, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        tokio::select! {
            res = rx => res.map_err(|_| GameError::Unavailable)?,
            _ = cancel.cancelled() => Err(GameError::Cancelled),
        }
    }

    /// Places a chip for `id` at `at`.
    ///
    /// The turn index advances only if the board accepts the move;
    /// the opponent's pending `wait_turn` resolves afterwards.
    pub async fn make_turn(&self, id: GamerId, at: Coord) -> Result<(), GameError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(GameCommand::MakeTurn { id, at, reply })
            .await
            .map_err(|_| GameError::Unavailable)?;
        rx.await.map_err(|_| GameError::Unavailable)?
    }
}

/// One seat's state, owned by the worker.
struct Participant {
    colour: Colour,
    name: String,
    /// Parked reply for a caller blocked in `wait_begin`.
    wait_begin: Option<Reply<()>>,
    /// Parked reply for a caller blocked in `wait_turn`.
    wait_turn: Option<Reply<()>>,
}

/// The internal game actor. Runs inside a Tokio task.
struct GameActor {
    game_id: GameId,
    participants: HashMap<GamerId, Participant>,
    /// Incremented once per accepted move. Black moves on even
    /// indices, White on odd.
    turn_index: u64,
    /// Set when any participant leaves; mutations are refused from
    /// then on.
    over: bool,
    board: Box<dyn Board>,
    rng: StdRng,
    receiver: mpsc::Receiver<GameCommand>,
}

impl GameActor {
    /// Runs the actor loop, processing commands in arrival order until
    /// the session ends.
    async fn run(mut self) {
        tracing::info!(game_id = %self.game_id, "game actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GameCommand::End { reply } => {
                    let _ = reply.send(Ok(()));
                    break;
                }
                GameCommand::Join { id, name, reply } => {
                    let _ = reply.send(self.handle_join(id, name));
                }
                GameCommand::Leave { id, reply } => {
                    let _ = reply.send(self.handle_leave(id));
                }
                GameCommand::GamerState { id, reply } => {
                    let _ = reply.send(self.handle_gamer_state(id));
                }
                GameCommand::FieldSize { id, reply } => {
                    let _ = reply.send(self.registered(id).map(|_| self.board.size()));
                }
                GameCommand::GameState { id, reply } => {
                    let _ = reply.send(self.registered(id).map(|_| self.board.state()));
                }
                GameCommand::IsBegun { id, reply } => {
                    let begun = self.participants.len() == 2;
                    let _ = reply.send(self.checked(id).map(|_| begun));
                }
                GameCommand::IsMyTurn { id, reply } => {
                    let turn = self.turn_index;
                    let _ = reply
                        .send(self.checked(id).map(|p| p.colour.is_to_move(turn)));
                }
                GameCommand::WaitBegin { id, reply } => {
                    self.handle_wait_begin(id, reply);
                }
                GameCommand::WaitTurn { id, reply } => {
                    self.handle_wait_turn(id, reply);
                }
                GameCommand::MakeTurn { id, at, reply } => {
                    let _ = reply.send(self.handle_make_turn(id, at));
                }
            }

            // The last leave ends the session: nothing can join a
            // collapsed game, so an empty one can never recover.
            if self.over && self.participants.is_empty() {
                break;
            }
        }

        self.finalize();
        tracing::info!(game_id = %self.game_id, "game actor stopped");
    }

    /// Resolves every still-parked wait after the queue stops being
    /// served. Queued commands beyond this point are dropped; their
    /// callers observe the closed channel.
    fn finalize(&mut self) {
        for participant in self.participants.values_mut() {
            resolve(&mut participant.wait_begin, Err(GameError::Destroyed));
            resolve(&mut participant.wait_turn, Err(GameError::Destroyed));
        }
    }

    fn handle_join(&mut self, id: GamerId, name: String) -> Result<(), GameError> {
        if self.participants.len() > 1 {
            return Err(GameError::NoPlace);
        }
        if self.over {
            return Err(GameError::GameOver);
        }

        let colour = match self.participants.values().next() {
            Some(seated) => seated.colour.opposite(),
            None if self.rng.random() => Colour::Black,
            None => Colour::White,
        };
        self.participants.insert(
            id,
            Participant {
                colour,
                name,
                wait_begin: None,
                wait_turn: None,
            },
        );
        tracing::info!(
            game_id = %self.game_id,
            gamer = %id,
            %colour,
            seats = self.participants.len(),
            "gamer joined"
        );

        // Second seat taken: the game begins, release begin-waiters.
        if self.participants.len() == 2 {
            for participant in self.participants.values_mut() {
                resolve(&mut participant.wait_begin, Ok(()));
            }
        }

        Ok(())
    }

    fn handle_leave(&mut self, id: GamerId) -> Result<(), GameError> {
        if !self.participants.contains_key(&id) {
            return Err(GameError::UnknownGamer(id));
        }

        // Collapse first, then release every parked waiter: a wait
        // can never outlive the departure that invalidated it.
        self.over = true;
        for participant in self.participants.values_mut() {
            resolve(&mut participant.wait_begin, Err(GameError::OtherGamerLeft));
            resolve(&mut participant.wait_turn, Err(GameError::OtherGamerLeft));
        }
        self.participants.remove(&id);

        tracing::info!(
            game_id = %self.game_id,
            gamer = %id,
            seats = self.participants.len(),
            "gamer left, game collapsed"
        );
        Ok(())
    }

    fn handle_gamer_state(&self, id: GamerId) -> Result<GamerState, GameError> {
        // Registration is the only gate: reads stay answerable during
        // collapse until this participant leaves.
        let participant = self.registered(id)?;
        Ok(GamerState {
            colour: participant.colour,
            name: participant.name.clone(),
        })
    }

    fn handle_wait_begin(&mut self, id: GamerId, reply: Reply<()>) {
        let begun = self.participants.len() == 2;
        let participant = match self.checked(id) {
            Ok(p) => p,
            Err(err) => {
                let _ = reply.send(Err(err));
                return;
            }
        };

        if begun {
            let _ = reply.send(Ok(()));
            return;
        }

        // A repeated wait from the same caller replaces the parked
        // one; the earlier caller is released to re-check.
        if let Some(previous) = participant.wait_begin.replace(reply) {
            let _ = previous.send(Ok(()));
        }
    }

    fn handle_wait_turn(&mut self, id: GamerId, reply: Reply<()>) {
        let turn = self.turn_index;
        let participant = match self.checked(id) {
            Ok(p) => p,
            Err(err) => {
                let _ = reply.send(Err(err));
                return;
            }
        };

        if participant.colour.is_to_move(turn) {
            let _ = reply.send(Ok(()));
            return;
        }

        if let Some(previous) = participant.wait_turn.replace(reply) {
            let _ = previous.send(Ok(()));
        }
    }

    fn handle_make_turn(&mut self, id: GamerId, at: Coord) -> Result<(), GameError> {
        let turn = self.turn_index;
        let colour = self.checked(id)?.colour;
        if !colour.is_to_move(turn) {
            return Err(GameError::NotYourTurn);
        }

        self.board
            .move_chip(colour, at)
            .map_err(GameError::WrongTurn)?;

        // The index advances only past this point; waiters are
        // released against the new parity.
        self.turn_index += 1;
        let next = self.turn_index;
        for participant in self.participants.values_mut() {
            if participant.colour.is_to_move(next) {
                resolve(&mut participant.wait_turn, Ok(()));
            }
        }

        tracing::debug!(
            game_id = %self.game_id,
            gamer = %id,
            %colour,
            %at,
            turn = next,
            "turn made"
        );
        Ok(())
    }

    /// Looks up a registered participant; the only check for reads
    /// that stay available during collapse.
    fn registered(&self, id: GamerId) -> Result<&Participant, GameError> {
        self.participants
            .get(&id)
            .ok_or(GameError::UnknownGamer(id))
    }

    /// Looks up a participant for an operation refused after collapse.
    fn checked(&mut self, id: GamerId) -> Result<&mut Participant, GameError> {
        if !self.participants.contains_key(&id) {
            return Err(GameError::UnknownGamer(id));
        }
        if self.over {
            return Err(GameError::GameOver);
        }
        Ok(self
            .participants
            .get_mut(&id)
            .expect("presence checked above"))
    }
}

/// Resolves a parked wait, if any. Sending never blocks and a
/// cancelled caller's dropped receiver is ignored.
fn resolve(slot: &mut Option<Reply<()>>, result: Result<(), GameError>) {
    if let Some(reply) = slot.take() {
        let _ = reply.send(result);
    }
}
