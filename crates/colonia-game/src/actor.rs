//! Game actor: the single owner of the authoritative [`GameState`].
//!
//! Every connection talks to the game through a [`GameHandle`]. Requests
//! are queued on one channel and handled one at a time, so controller
//! calls never overlap and no lock guards the state.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use colonia_protocol::{Change, ClientError, Message, PlayerId, Response};
use tokio::sync::{mpsc, oneshot};

use crate::{handle_message, ChangeSet, GameConfig, GameError, GameState};

/// Sending half of a joined player's update queue. Held by the actor.
type UpdateSender = mpsc::Sender<Response>;

/// Where a joined player receives changes caused by others.
///
/// The queue is bounded by [`GameConfig::update_buffer`]. A player that
/// falls that far behind is dropped from the game's observers and sees
/// the channel close.
pub type UpdateReceiver = mpsc::Receiver<Response>;

pub(crate) enum GameCommand {
    Join {
        player: PlayerId,
        reply: oneshot::Sender<Result<(Vec<Change>, UpdateReceiver), GameError>>,
    },
    Leave {
        player: PlayerId,
    },
    Handle {
        player: PlayerId,
        message: Message,
        reply: oneshot::Sender<Response>,
    },
    Snapshot {
        player: PlayerId,
        reply: oneshot::Sender<Vec<Change>>,
    },
    State {
        reply: oneshot::Sender<GameState>,
    },
    Shutdown,
}

/// Handle to the running game. Cheap to clone.
#[derive(Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    async fn request<T>(
        &self,
        command: GameCommand,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, GameError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| GameError::Unavailable)?;
        reply.await.map_err(|_| GameError::Unavailable)
    }

    /// Joins `player` to the game and returns their starting view.
    ///
    /// Changes other players make that `player` may see arrive on the
    /// returned receiver until [`Self::leave`] is called.
    pub async fn join(
        &self,
        player: PlayerId,
    ) -> Result<(Vec<Change>, UpdateReceiver), GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::Join { player, reply }, rx).await?
    }

    /// Stops pushing updates to `player`.
    pub async fn leave(&self, player: PlayerId) -> Result<(), GameError> {
        self.sender
            .send(GameCommand::Leave { player })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Handles one request from `player` and waits for the response.
    pub async fn handle(&self, player: PlayerId, message: Message) -> Result<Response, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::Handle { player, message, reply }, rx)
            .await
    }

    /// Everything `player` can currently see.
    pub async fn snapshot(&self, player: PlayerId) -> Result<Vec<Change>, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::Snapshot { player, reply }, rx).await
    }

    /// A copy of the whole state.
    pub async fn state(&self) -> Result<GameState, GameError> {
        let (reply, rx) = oneshot::channel();
        self.request(GameCommand::State { reply }, rx).await
    }

    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.sender
            .send(GameCommand::Shutdown)
            .await
            .map_err(|_| GameError::Unavailable)
    }
}

/// The actor itself. Runs inside a Tokio task.
struct GameActor {
    state: GameState,
    config: GameConfig,
    observers: HashMap<PlayerId, UpdateSender>,
    receiver: mpsc::Receiver<GameCommand>,
}

impl GameActor {
    async fn run(mut self) {
        tracing::info!(
            players = self.state.players().count(),
            units = self.state.unit_count(),
            "game actor started"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GameCommand::Join { player, reply } => {
                    let _ = reply.send(self.join(player));
                }
                GameCommand::Leave { player } => {
                    if self.observers.remove(&player).is_some() {
                        tracing::info!(%player, "player left game");
                    }
                }
                GameCommand::Handle { player, message, reply } => {
                    let response = self.handle(player, &message);
                    let _ = reply.send(response);
                }
                GameCommand::Snapshot { player, reply } => {
                    let _ = reply.send(self.state.snapshot_for(player));
                }
                GameCommand::State { reply } => {
                    let _ = reply.send(self.state.clone());
                }
                GameCommand::Shutdown => {
                    tracing::info!("game shutting down");
                    break;
                }
            }
        }

        tracing::info!("game actor stopped");
    }

    fn join(&mut self, player: PlayerId) -> Result<(Vec<Change>, UpdateReceiver), GameError> {
        if self.state.player(player).is_none() {
            return Err(GameError::UnknownPlayer(player));
        }
        let (updates, receiver) = mpsc::channel(self.config.update_buffer.max(1));
        self.observers.insert(player, updates);
        tracing::info!(%player, joined = self.observers.len(), "player joined game");
        Ok((self.state.snapshot_for(player), receiver))
    }

    fn handle(&mut self, player: PlayerId, message: &Message) -> Response {
        self.guarded(player, message.tag(), |state| {
            handle_message(message, state, player)
        })
    }

    /// Runs one action against the state. A panic inside it is answered
    /// with an `internal` error and the actor keeps serving.
    fn guarded<F>(&mut self, player: PlayerId, tag: &str, action: F) -> Response
    where
        F: FnOnce(&mut GameState) -> ChangeSet,
    {
        let state = &mut self.state;
        let set = match std::panic::catch_unwind(AssertUnwindSafe(|| action(state))) {
            Ok(set) => set,
            Err(_) => {
                tracing::error!(%player, tag, "handler panicked");
                ChangeSet::rejected(ClientError::internal(format!(
                    "internal error while handling {tag}"
                )))
            }
        };

        if !set.is_rejected() {
            tracing::debug!(%player, tag, changes = set.len(), "request applied");
            if self.config.broadcast {
                self.broadcast(player, &set);
            }
        }
        set.build(player)
    }

    /// Pushes what each other joined player may see of `set`.
    ///
    /// An observer whose queue is full or closed is dropped.
    fn broadcast(&mut self, actor: PlayerId, set: &ChangeSet) {
        self.observers.retain(|&player, updates| {
            if player == actor {
                return true;
            }
            let changes = set.visible_to(player);
            if changes.is_empty() {
                return true;
            }
            match updates.try_send(Response::Update(changes)) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(%player, "update queue full, dropping observer");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }
}

/// Spawns the game actor and returns a handle to it.
pub fn spawn_game(state: GameState, config: GameConfig) -> GameHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = GameActor {
        state,
        config,
        observers: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    GameHandle { sender: tx }
}
