//! The single latest authoritative snapshot, plus client-side decorations.
//!
//! Every `game_state` / `game_started` message replaces the stored snapshot
//! wholesale. Subscribers are notified after the swap, with the new value.
//! The store never edits a snapshot; it keeps the last one across disconnects
//! until the server sends another.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ballot_shared::{GameSnapshot, Phase};

use super::local_flags::LocalFlags;
use crate::application::PendingChoice;
use crate::infrastructure::messaging::{BusEvent, EventBus, SubscriptionId};

/// Notification published by the store.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Replaced(Arc<GameSnapshot>),
    ChoiceOffered(PendingChoice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreEventKind {
    Replaced,
    ChoiceOffered,
}

impl BusEvent for StoreEvent {
    type Kind = StoreEventKind;

    fn kind(&self) -> StoreEventKind {
        match self {
            StoreEvent::Replaced(_) => StoreEventKind::Replaced,
            StoreEvent::ChoiceOffered(_) => StoreEventKind::ChoiceOffered,
        }
    }
}

#[derive(Default)]
struct StoreInner {
    snapshot: Option<Arc<GameSnapshot>>,
    viewer: Option<String>,
    pending: Option<PendingChoice>,
    flags: LocalFlags,
}

/// Shared handle to the snapshot store. Clones see the same state.
#[derive(Clone, Default)]
pub struct GameStateStore {
    inner: Arc<RwLock<StoreInner>>,
    events: EventBus<StoreEvent>,
}

impl GameStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest snapshot, if any has arrived.
    pub fn current(&self) -> Option<Arc<GameSnapshot>> {
        self.read().snapshot.clone()
    }

    /// Local player name the store decorates for.
    pub fn viewer(&self) -> Option<String> {
        self.read().viewer.clone()
    }

    /// Bind the store to a player. Switching player drops per-player state.
    pub fn bind_viewer(&self, name: &str) {
        let mut inner = self.write();
        if inner.viewer.as_deref() != Some(name) {
            inner.viewer = Some(name.to_string());
            inner.pending = None;
            inner.flags = LocalFlags::default();
        }
    }

    /// Replace the stored snapshot, then notify subscribers.
    pub fn replace(&self, snapshot: GameSnapshot) -> Arc<GameSnapshot> {
        self.commit(snapshot, false)
    }

    /// Replace the stored snapshot and mark the viewer's role as revealed,
    /// then notify subscribers. Used for the snapshot that deals roles.
    pub fn replace_revealing_role(&self, snapshot: GameSnapshot) -> Arc<GameSnapshot> {
        self.commit(snapshot, true)
    }

    fn commit(&self, snapshot: GameSnapshot, reveal_role: bool) -> Arc<GameSnapshot> {
        let snapshot = Arc::new(snapshot);
        {
            let mut inner = self.write();
            let previous = inner.snapshot.replace(Arc::clone(&snapshot));
            let viewer = inner.viewer.clone();
            inner
                .flags
                .reconcile(previous.as_deref(), &snapshot, viewer.as_deref());
            if reveal_role {
                inner.flags.role_revealed = true;
            }
            if snapshot.phase != Phase::Executive {
                inner.pending = None;
            }
        }
        tracing::debug!(
            game_id = %snapshot.game_id,
            phase = %snapshot.phase,
            "Snapshot replaced"
        );
        self.events.publish(&StoreEvent::Replaced(Arc::clone(&snapshot)));
        snapshot
    }

    pub fn subscribe_replaced(
        &self,
        handler: impl Fn(&Arc<GameSnapshot>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(StoreEventKind::Replaced, move |event| {
            if let StoreEvent::Replaced(snapshot) = event {
                handler(snapshot);
            }
        })
    }

    pub fn subscribe_choice(
        &self,
        handler: impl Fn(&PendingChoice) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(StoreEventKind::ChoiceOffered, move |event| {
            if let StoreEvent::ChoiceOffered(choice) = event {
                handler(choice);
            }
        })
    }

    pub fn unsubscribe(&self, kind: StoreEventKind, id: SubscriptionId) -> bool {
        self.events.unsubscribe(kind, id)
    }

    /// Record the powers the server just offered the viewer.
    ///
    /// `context` is the snapshot embedded in the offer, when the server sent
    /// one; otherwise candidates come from the stored snapshot.
    pub fn offer_choice(
        &self,
        offer: &str,
        context: Option<&GameSnapshot>,
    ) -> Option<PendingChoice> {
        let choice = {
            let mut inner = self.write();
            let viewer = inner.viewer.clone().unwrap_or_default();
            let stored = inner.snapshot.clone();
            let basis = context.or(stored.as_deref())?;
            let choice = PendingChoice::from_offer(offer, basis, &viewer)?;
            inner.pending = Some(choice.clone());
            choice
        };
        self.events.publish(&StoreEvent::ChoiceOffered(choice.clone()));
        Some(choice)
    }

    pub fn pending_choice(&self) -> Option<PendingChoice> {
        self.read().pending.clone()
    }

    pub fn clear_pending_choice(&self) {
        self.write().pending = None;
    }

    pub fn local_flags(&self) -> LocalFlags {
        self.read().flags
    }

    pub fn mark_ready_requested(&self) {
        self.write().flags.ready_requested = true;
    }
}
