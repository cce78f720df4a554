//! Interactive asset browser.
//!
//! - [`app`]: browser state (open asset, related list, history, input)
//! - [`events`]: key press to [`Action`] mapping
//! - [`ui`]: ratatui rendering
//! - [`run`]: terminal setup and the main loop
//!
//! # Architecture
//!
//! Data flows one way:
//! 1. Key events are read from the terminal (crossterm)
//! 2. Events are translated to Actions
//! 3. Actions update the App and may leave a Request
//! 4. The run loop fulfils the Request (lookups, cache and config writes)
//! 5. The UI renders the current App

pub mod app;
pub mod events;
pub mod run;
pub mod ui;

pub use app::{Action, App, AppMode, RelatedEntry, Request};
pub use events::{EventError, EventHandler};
pub use run::{fulfil_request, run_tui, TuiError};
pub use ui::render;
