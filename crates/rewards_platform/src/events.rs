//! Recurring platform events and listener bookkeeping.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::RawPromotion;

/// Kind of recurring event a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformEventKind {
    /// Promotion list published (after `fetch_promotions` or a server push).
    Promotions,
    /// New tokens became spendable; the balance changed.
    UnblindedTokensReady,
    /// A rewards notification was added.
    NotificationAdded,
    /// A rewards notification was deleted.
    NotificationDeleted,
    /// All rewards notifications were deleted.
    AllNotificationsDeleted,
}

/// Recurring event payload delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Current promotion list with the platform result code.
    Promotions {
        /// Platform result code; [`crate::PROMOTIONS_RESULT_ERROR`] marks a failed fetch.
        result: i32,
        /// Full promotion list.
        promotions: Vec<RawPromotion>,
    },
    /// New tokens became spendable.
    UnblindedTokensReady,
    /// A notification was added.
    NotificationAdded,
    /// A notification was deleted.
    NotificationDeleted,
    /// All notifications were deleted.
    AllNotificationsDeleted,
}

impl PlatformEvent {
    /// Returns the kind used for listener routing.
    pub const fn kind(&self) -> PlatformEventKind {
        match self {
            Self::Promotions { .. } => PlatformEventKind::Promotions,
            Self::UnblindedTokensReady => PlatformEventKind::UnblindedTokensReady,
            Self::NotificationAdded => PlatformEventKind::NotificationAdded,
            Self::NotificationDeleted => PlatformEventKind::NotificationDeleted,
            Self::AllNotificationsDeleted => PlatformEventKind::AllNotificationsDeleted,
        }
    }
}

/// Shared listener callback.
pub type EventListener = Rc<dyn Fn(&PlatformEvent)>;

/// Identifier returned when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Single-threaded listener table for host adapters.
///
/// Dispatch copies the matching listeners before invoking them, so a listener may register or
/// remove listeners while an event is being delivered.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, PlatformEventKind, EventListener)>>,
}

impl ListenerRegistry {
    /// Registers a listener and returns its id.
    pub fn add(&self, kind: PlatformEventKind, listener: EventListener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, kind, listener));
        id
    }

    /// Removes a listener by id.
    pub fn remove(&self, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, _, _)| *listener_id != id);
    }

    /// Delivers an event to every listener registered for its kind.
    pub fn emit(&self, event: &PlatformEvent) {
        let kind = event.kind();
        let targets: Vec<EventListener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in targets {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Returns whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }
}
