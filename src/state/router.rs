/// Top-level view selection
///
/// Holds which of the five screens is presented and whether the
/// introduction screen still has to be shown.

use super::data::VISITED_KEY;
use super::store::Store;
use crate::error::StoreError;

/// The five screens reachable from the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Scan,
    Folders,
    Files,
    Share,
    SuiteDash,
}

impl Tab {
    /// All tabs in navigation order
    pub const ALL: [Tab; 5] = [Tab::Scan, Tab::Folders, Tab::Files, Tab::Share, Tab::SuiteDash];

    /// Stable identifier ("scan", "folders", ...)
    pub const fn id(self) -> &'static str {
        match self {
            Tab::Scan => "scan",
            Tab::Folders => "folders",
            Tab::Files => "files",
            Tab::Share => "share",
            Tab::SuiteDash => "suitedash",
        }
    }

    /// Label shown in the navigation bar
    pub const fn label(self) -> &'static str {
        match self {
            Tab::Scan => "Scan",
            Tab::Folders => "Folders",
            Tab::Files => "Files",
            Tab::Share => "Share",
            Tab::SuiteDash => "SuiteDash",
        }
    }

    /// Resolve an identifier; anything unknown falls back to `Scan`
    pub fn from_id(id: &str) -> Tab {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id() == id)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Active tab plus the one-shot introduction flag
#[derive(Debug, Clone)]
pub struct Router {
    store: Store,
    active: Tab,
    introduction_shown: bool,
}

impl Router {
    /// Load the router state; the visited flag is read exactly once here.
    pub fn load(store: Store) -> Self {
        let introduction_shown = store.flag(VISITED_KEY);
        tracing::debug!(introduction_shown, "router loaded");
        Self {
            store,
            active: Tab::Scan,
            introduction_shown,
        }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    /// Select by identifier, falling back to `Scan` for unknown ids
    pub fn select_id(&mut self, id: &str) {
        self.select(Tab::from_id(id));
    }

    /// True when the introduction has never been completed
    pub fn should_show_introduction(&self) -> bool {
        !self.introduction_shown
    }

    /// Mark the introduction as seen, persistently
    pub fn complete_introduction(&mut self) -> Result<(), StoreError> {
        self.introduction_shown = true;
        self.store.set_flag(VISITED_KEY)
    }
}
