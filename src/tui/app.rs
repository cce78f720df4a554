//! TUI application state management.
//!
//! # Overview
//!
//! [`App`] holds everything the browser shows: the open asset, its related
//! GUIDs, the history of opened assets, the GUID being typed, and status
//! messages. It performs no I/O. Actions that need the finder, the cache or
//! the config file leave a [`Request`] behind, which the run loop takes and
//! fulfils before feeding the result back through [`App::show_asset`] and
//! friends.
//!
//! # Example
//!
//! ```
//! use assets_explorer::tui::app::{Action, App, AppMode, Request};
//!
//! let mut app = App::new();
//! app.handle_action(Action::StartInput);
//! for c in "1010017".chars() {
//!     app.handle_action(Action::InputChar(c));
//! }
//! app.handle_action(Action::Open);
//!
//! assert_eq!(app.mode(), AppMode::Browsing);
//! assert_eq!(
//!     app.take_request(),
//!     Some(Request::Open { guid: "1010017".to_string(), record_history: true })
//! );
//! ```

use crate::assets::RelatedRef;
use crate::cache::AssetInfo;
use crate::filter::Blacklist;

/// Application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Viewing an asset and navigating its related list
    #[default]
    Browsing,
    /// Typing a GUID to open
    Input,
    Quitting,
}

/// User action triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NavigateUp,
    NavigateDown,
    /// Open the selected related GUID, or submit the typed GUID
    Open,
    /// Return to the previously opened asset
    Back,
    /// Start typing a GUID
    StartInput,
    InputChar(char),
    InputBackspace,
    /// Leave input mode, or dismiss the error message
    Cancel,
    /// Show or hide blacklisted related entries
    ToggleBlacklist,
    /// Add the selected entry's element name to the blacklist
    BlacklistSelected,
    /// Drop cached "not found" markers
    ClearNotFound,
    Quit,
}

/// Work the run loop must do on the app's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Look up `guid` and show it.
    Open { guid: String, record_history: bool },
    /// Persist a new blacklist keyword.
    AddKeyword(String),
    ClearNotFound,
}

/// One row of the related list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedEntry {
    pub reference: RelatedRef,
    /// Name of the referenced asset, when it is already cached.
    pub name: Option<String>,
    /// The referenced GUID is cached as not found.
    pub missing: bool,
}

/// TUI application state.
///
/// Only accessed from the main thread.
#[derive(Debug, Clone, Default)]
pub struct App {
    mode: AppMode,
    asset: Option<AssetInfo>,
    related: Vec<RelatedEntry>,
    /// GUIDs opened before the current one, oldest first
    history: Vec<String>,
    /// Index into the visible related list
    selected: usize,
    input: String,
    blacklist: Blacklist,
    blacklist_enabled: bool,
    status: Option<String>,
    error_message: Option<String>,
    request: Option<Request>,
}

impl App {
    /// Create an empty app with the blacklist enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blacklist_enabled: true,
            ..Self::default()
        }
    }

    // ==================== Mode Management ====================

    #[must_use]
    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AppMode) {
        log::debug!("Mode transition: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.mode == AppMode::Quitting
    }

    // ==================== Asset State ====================

    #[must_use]
    pub fn asset(&self) -> Option<&AssetInfo> {
        self.asset.as_ref()
    }

    /// Show a freshly looked-up asset.
    ///
    /// With `record_history` the previously shown asset is pushed onto the
    /// history, unless it is the same GUID.
    pub fn show_asset(&mut self, asset: AssetInfo, related: Vec<RelatedEntry>, record_history: bool) {
        if record_history {
            if let Some(previous) = self.asset.take() {
                if previous.guid != asset.guid {
                    self.history.push(previous.guid);
                }
            }
        }
        log::debug!("Showing {} with {} related entries", asset.guid, related.len());
        self.status = Some(format!("{} [{}]", asset.name, asset.guid));
        self.asset = Some(asset);
        self.related = related;
        self.selected = 0;
    }

    /// All related entries, including blacklisted ones.
    #[must_use]
    pub fn related(&self) -> &[RelatedEntry] {
        &self.related
    }

    /// Related entries that pass the blacklist (all of them when it is off).
    #[must_use]
    pub fn visible_related(&self) -> Vec<&RelatedEntry> {
        self.related
            .iter()
            .filter(|e| !self.blacklist_enabled || !self.blacklist.is_hidden(&e.reference))
            .collect()
    }

    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.related.len() - self.visible_related().len()
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn selected_entry(&self) -> Option<&RelatedEntry> {
        self.visible_related().get(self.selected).copied()
    }

    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Forget every "missing" flag after the markers were cleared.
    pub fn clear_missing_flags(&mut self) {
        for entry in &mut self.related {
            entry.missing = false;
        }
    }

    // ==================== Blacklist ====================

    pub fn set_blacklist(&mut self, blacklist: Blacklist) {
        self.blacklist = blacklist;
        self.clamp_selection();
    }

    #[must_use]
    pub fn is_blacklist_enabled(&self) -> bool {
        self.blacklist_enabled
    }

    // ==================== Input ====================

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    // ==================== Messages ====================

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.error_message = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    // ==================== Requests ====================

    /// Ask the run loop to open `guid`, as if it had been typed.
    pub fn request_open(&mut self, guid: &str) {
        let guid = guid.trim();
        if !guid.is_empty() {
            self.request = Some(Request::Open {
                guid: guid.to_string(),
                record_history: true,
            });
        }
    }

    /// The pending request, if any. Taking it clears it.
    pub fn take_request(&mut self) -> Option<Request> {
        self.request.take()
    }

    // ==================== Navigation ====================

    pub fn next(&mut self) {
        let len = self.visible_related().len();
        if self.selected + 1 < len {
            self.selected += 1;
            log::trace!("Navigate next: selected = {}", self.selected);
        }
    }

    pub fn previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            log::trace!("Navigate previous: selected = {}", self.selected);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_related().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn go_back(&mut self) -> bool {
        match self.history.pop() {
            Some(guid) => {
                self.request = Some(Request::Open {
                    guid,
                    record_history: false,
                });
                true
            }
            None => {
                self.set_status("No previous asset");
                false
            }
        }
    }

    // ==================== Action Handling ====================

    /// Apply an action. Returns whether it had any effect.
    pub fn handle_action(&mut self, action: Action) -> bool {
        log::trace!("Handling action: {:?} in mode {:?}", action, self.mode);

        // An open error swallows the next key.
        if self.error_message.is_some() && self.mode == AppMode::Browsing {
            self.clear_error();
            if !matches!(action, Action::Quit) {
                return true;
            }
        }

        match (self.mode, action) {
            (_, Action::Quit) => {
                self.set_mode(AppMode::Quitting);
                true
            }
            (AppMode::Input, Action::InputChar(c)) => {
                self.input.push(c);
                true
            }
            (AppMode::Input, Action::InputBackspace) => self.input.pop().is_some(),
            (AppMode::Input, Action::Open) => {
                let guid = std::mem::take(&mut self.input);
                self.set_mode(AppMode::Browsing);
                self.request_open(&guid);
                self.request.is_some()
            }
            (AppMode::Input, Action::Cancel) => {
                self.input.clear();
                self.set_mode(AppMode::Browsing);
                true
            }
            (AppMode::Input, _) => false,
            (AppMode::Browsing, Action::NavigateUp) => {
                self.previous();
                true
            }
            (AppMode::Browsing, Action::NavigateDown) => {
                self.next();
                true
            }
            (AppMode::Browsing, Action::Open) => match self.selected_entry() {
                Some(entry) => {
                    let guid = entry.reference.guid.clone();
                    self.request_open(&guid);
                    true
                }
                None => false,
            },
            (AppMode::Browsing, Action::Back) => self.go_back(),
            (AppMode::Browsing, Action::StartInput) => {
                self.input.clear();
                self.set_mode(AppMode::Input);
                true
            }
            (AppMode::Browsing, Action::ToggleBlacklist) => {
                self.blacklist_enabled = !self.blacklist_enabled;
                self.clamp_selection();
                self.set_status(if self.blacklist_enabled {
                    "Blacklist on"
                } else {
                    "Blacklist off"
                });
                true
            }
            (AppMode::Browsing, Action::BlacklistSelected) => match self.selected_entry() {
                Some(entry) => {
                    let keyword = entry.reference.element_name.clone();
                    self.request = Some(Request::AddKeyword(keyword));
                    true
                }
                None => false,
            },
            (AppMode::Browsing, Action::ClearNotFound) => {
                self.request = Some(Request::ClearNotFound);
                true
            }
            (AppMode::Browsing, _) | (AppMode::Quitting, _) => false,
        }
    }
}
