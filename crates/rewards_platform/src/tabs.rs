//! Browser tab and panel-window services.

use std::cell::{Cell, RefCell};

use crate::{PlatformError, PlatformFuture};

/// Host service for tab queries and the panel's own window.
pub trait BrowserTabs {
    /// Returns the id of the active tab in the current window, if any.
    fn active_tab_id(&self) -> PlatformFuture<'_, Option<i64>>;

    /// Opens a URL in a new tab.
    fn create_tab<'a>(&'a self, url: &'a str) -> PlatformFuture<'a, ()>;

    /// Closes the rewards panel.
    fn close_panel(&self);

    /// Returns the hash fragment of the panel URL (for example `#grant_abc`), or an empty string.
    fn location_hash(&self) -> String;
}

/// Observable navigation effect recorded by [`MemoryBrowserTabs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEffect {
    /// A tab was opened with this URL.
    Opened(String),
    /// The panel was closed.
    PanelClosed,
}

#[derive(Debug, Default)]
/// In-memory tab service that records navigation effects in order.
pub struct MemoryBrowserTabs {
    active_tab: Cell<Option<i64>>,
    hash: RefCell<String>,
    fail_create: Cell<bool>,
    effects: RefCell<Vec<TabEffect>>,
}

impl MemoryBrowserTabs {
    /// Creates a service with an active tab id.
    pub fn with_active_tab(tab_id: i64) -> Self {
        let tabs = Self::default();
        tabs.set_active_tab(Some(tab_id));
        tabs
    }

    /// Sets or clears the active tab.
    pub fn set_active_tab(&self, tab_id: Option<i64>) {
        self.active_tab.set(tab_id);
    }

    /// Sets the panel URL hash.
    pub fn set_location_hash(&self, hash: impl Into<String>) {
        *self.hash.borrow_mut() = hash.into();
    }

    /// Makes subsequent tab creation fail.
    pub fn fail_tab_creation(&self, fail: bool) {
        self.fail_create.set(fail);
    }

    /// Returns recorded effects in the order they happened.
    pub fn effects(&self) -> Vec<TabEffect> {
        self.effects.borrow().clone()
    }
}

impl BrowserTabs for MemoryBrowserTabs {
    fn active_tab_id(&self) -> PlatformFuture<'_, Option<i64>> {
        Box::pin(async move { Ok(self.active_tab.get()) })
    }

    fn create_tab<'a>(&'a self, url: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            if self.fail_create.get() {
                return Err(PlatformError::transport("tabs.create", "tab creation refused"));
            }
            self.effects
                .borrow_mut()
                .push(TabEffect::Opened(url.to_string()));
            Ok(())
        })
    }

    fn close_panel(&self) {
        self.effects.borrow_mut().push(TabEffect::PanelClosed);
    }

    fn location_hash(&self) -> String {
        self.hash.borrow().clone()
    }
}
