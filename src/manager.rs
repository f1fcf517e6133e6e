use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;

use crate::board::TilePlacement;
use crate::errors::{ConcurrencyError, ScrabbleError, ScrabbleResult, ValidationError};
use crate::session::{ChallengeOutcome, GameSession, PlayOutcome, SessionStatus};
use crate::store::SessionStore;
use crate::tiles::Letter;
use crate::words::WordValidator;
use crate::PlayerId;

/// Default bound on waiting for a channel's in-flight command to finish
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatch layer tying the engine to its collaborators: one mutating
/// command per channel at a time, load-apply-save around every transition.
///
/// Commands mirror the chat bot's `/scrabble` surface (new, play, challenge,
/// pass, exchange, undo, tiles, reorder). Nothing here touches the chat
/// transport; rendering and command parsing live with the caller.
pub struct SessionManager<S, W> {
    store: S,
    validator: W,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    lock_timeout: Duration,
}

impl<S: SessionStore, W: WordValidator> SessionManager<S, W> {
    pub fn new(store: S, validator: W) -> Self {
        SessionManager {
            store,
            validator,
            locks: Mutex::new(HashMap::new()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Start a game in a channel. Fails while a game is still in progress
    /// there; a finished game may be replaced.
    pub async fn new_game(
        &self,
        channel: &str,
        creator: &str,
        players: &[PlayerId],
    ) -> ScrabbleResult<GameSession> {
        let lock = self.channel_lock(channel);
        let _guard = self.acquire(channel, &lock).await?;

        if let Some(existing) = self.store.load(channel).await? {
            if existing.status == SessionStatus::InProgress {
                log::warn!("{} tried to start a second game in channel {}", creator, channel);
                return Err(ValidationError::GameAlreadyExists {
                    channel: channel.to_string(),
                }
                .into());
            }
        }

        let session = GameSession::new(channel, players, &mut rand::thread_rng())?;
        self.store.save(channel, &session).await?;
        Ok(session)
    }

    pub async fn play(
        &self,
        channel: &str,
        player: &str,
        placements: &[TilePlacement],
    ) -> ScrabbleResult<PlayOutcome> {
        self.with_session(channel, |session| {
            session.play(player, placements, &self.validator, &mut rand::thread_rng())
        })
        .await
    }

    pub async fn exchange(
        &self,
        channel: &str,
        player: &str,
        tiles: &[Letter],
    ) -> ScrabbleResult<()> {
        self.with_session(channel, |session| {
            session.exchange(player, tiles, &mut rand::thread_rng())
        })
        .await
    }

    /// Returns the id of the player now on turn
    pub async fn pass(&self, channel: &str, player: &str) -> ScrabbleResult<PlayerId> {
        self.with_session(channel, |session| session.pass(player)).await
    }

    pub async fn challenge(&self, channel: &str, player: &str) -> ScrabbleResult<ChallengeOutcome> {
        self.with_session(channel, |session| session.challenge(player, &self.validator))
            .await
    }

    pub async fn undo(&self, channel: &str, player: &str) -> ScrabbleResult<()> {
        self.with_session(channel, |session| session.undo(player)).await
    }

    pub async fn reorder(
        &self,
        channel: &str,
        player: &str,
        order: &[Letter],
    ) -> ScrabbleResult<()> {
        self.with_session(channel, |session| session.reorder(player, order))
            .await
    }

    /// A player's private rack. Read-only: observes a consistent snapshot
    /// under the channel lock and persists nothing.
    pub async fn rack(&self, channel: &str, player: &str) -> ScrabbleResult<Vec<Letter>> {
        let lock = self.channel_lock(channel);
        let _guard = self.acquire(channel, &lock).await?;
        let session = self.load_existing(channel).await?;
        Ok(session.rack_of(player)?.to_vec())
    }

    /// Snapshot of the whole session, for the caller's board renderer
    pub async fn game(&self, channel: &str) -> ScrabbleResult<GameSession> {
        let lock = self.channel_lock(channel);
        let _guard = self.acquire(channel, &lock).await?;
        self.load_existing(channel).await
    }

    /// Run one mutating transition under the channel lock: load, apply,
    /// save. A validation failure persists nothing; a save failure is
    /// propagated so the caller knows the state may be stale.
    async fn with_session<T>(
        &self,
        channel: &str,
        apply: impl FnOnce(&mut GameSession) -> ScrabbleResult<T>,
    ) -> ScrabbleResult<T> {
        let lock = self.channel_lock(channel);
        let _guard = self.acquire(channel, &lock).await?;

        let mut session = self.load_existing(channel).await?;
        let outcome = match apply(&mut session) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Rejected command in channel {}: {}", channel, err);
                return Err(err);
            }
        };
        self.store.save(channel, &session).await?;
        Ok(outcome)
    }

    async fn load_existing(&self, channel: &str) -> ScrabbleResult<GameSession> {
        self.store
            .load(channel)
            .await?
            .ok_or_else(|| {
                ValidationError::GameNotFound {
                    channel: channel.to_string(),
                }
                .into()
            })
    }

    async fn acquire<'a>(
        &self,
        channel: &str,
        lock: &'a AsyncMutex<()>,
    ) -> ScrabbleResult<tokio::sync::MutexGuard<'a, ()>> {
        tokio::time::timeout(self.lock_timeout, lock.lock())
            .await
            .map_err(|_| {
                ScrabbleError::Concurrency(ConcurrencyError::SessionBusy {
                    channel: channel.to_string(),
                })
            })
    }

    pub(crate) fn channel_lock(&self, channel: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(channel.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
