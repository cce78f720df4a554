//! TUI main loop.
//!
//! Takes over the terminal (raw mode, alternate screen, hidden cursor), runs
//! the draw/poll loop, and restores the terminal on exit, including on panic.
//!
//! The loop is also where the browser touches the outside world: after each
//! action it fulfils the app's pending [`Request`] against the
//! [`AssetFinder`] and the [`ConfigStore`].

use std::io::{self, Stdout};
use std::panic;
use std::time::{Duration, Instant};

use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use thiserror::Error;

use super::app::{App, RelatedEntry, Request};
use super::events::EventHandler;
use super::ui::render;
use crate::assets::AssetFinder;
use crate::cache::CacheRecord;
use crate::config::ConfigStore;
use crate::filter::Blacklist;

/// ~60 FPS.
const FRAME_DURATION: Duration = Duration::from_millis(16);

const POLL_TIMEOUT: Duration = Duration::from_millis(16);

/// Error type for TUI operations.
#[derive(Debug, Error)]
pub enum TuiError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("event error: {0}")]
    Event(#[from] super::events::EventError),
}

pub type TuiResult<T> = Result<T, TuiError>;

type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Run the browser until the user quits.
///
/// The terminal is always restored, even on error or panic.
pub fn run_tui(app: &mut App, finder: &mut AssetFinder, config: &mut ConfigStore) -> TuiResult<()> {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let result = run_tui_inner(app, finder, config);

    let _ = panic::take_hook();
    result
}

fn run_tui_inner(app: &mut App, finder: &mut AssetFinder, config: &mut ConfigStore) -> TuiResult<()> {
    let mut terminal = setup_terminal()?;
    let event_handler = EventHandler::new();
    let mut last_render = Instant::now();

    refresh_blacklist(app, config);
    // A GUID passed on the command line is pending before the first frame.
    fulfil_request(app, finder, config);

    let result = loop {
        if app.should_quit() {
            log::debug!("App requested quit");
            break Ok(());
        }

        if let Err(e) = terminal.draw(|frame| render(frame, app)) {
            break Err(e.into());
        }

        match event_handler.poll(POLL_TIMEOUT, app.mode()) {
            Ok(Some(action)) => {
                if !app.handle_action(action) {
                    log::trace!("Action not handled: {:?}", action);
                }
                fulfil_request(app, finder, config);
            }
            Ok(None) => {}
            Err(e) => break Err(e.into()),
        }

        let elapsed = last_render.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
        last_render = Instant::now();
    };

    restore_terminal()?;
    log::info!("Browser exited");
    result
}

/// Carry out whatever the last action asked for.
///
/// Failures end up in the app's error dialog; the browser keeps running.
pub fn fulfil_request(app: &mut App, finder: &mut AssetFinder, config: &mut ConfigStore) {
    let Some(request) = app.take_request() else {
        return;
    };
    log::debug!("Fulfilling {:?}", request);

    match request {
        Request::Open {
            guid,
            record_history,
        } => open_asset(app, finder, config, &guid, record_history),
        Request::AddKeyword(keyword) => match config.add_blacklist_keyword(&keyword) {
            Ok(true) => {
                refresh_blacklist(app, config);
                app.set_status(format!("Blacklisted '{keyword}'"));
            }
            Ok(false) => app.set_status(format!("'{keyword}' is already blacklisted")),
            Err(e) => app.set_error(format!("Could not save keyword: {e}")),
        },
        Request::ClearNotFound => match finder.cache_mut().clear_not_found() {
            Ok(removed) => {
                app.clear_missing_flags();
                app.set_status(format!("Cleared {removed} not-found entries"));
            }
            Err(e) => app.set_error(format!("Could not clear cache: {e}")),
        },
    }
}

fn open_asset(
    app: &mut App,
    finder: &mut AssetFinder,
    config: &mut ConfigStore,
    guid: &str,
    record_history: bool,
) {
    let Some(asset) = finder.find(guid) else {
        app.set_error(format!("GUID {guid} not found"));
        return;
    };

    let related = finder
        .related(guid)
        .into_iter()
        .map(|reference| {
            let record = finder.cache_mut().get(&reference.guid);
            RelatedEntry {
                name: record
                    .as_ref()
                    .and_then(CacheRecord::asset)
                    .map(|a| a.name.clone()),
                missing: record.as_ref().is_some_and(CacheRecord::is_not_found),
                reference,
            }
        })
        .collect();

    // Keywords may have been edited by another process.
    refresh_blacklist(app, config);
    app.show_asset(asset, related, record_history);
}

fn refresh_blacklist(app: &mut App, config: &mut ConfigStore) {
    match config.blacklist_keywords() {
        Ok(keywords) => app.set_blacklist(Blacklist::from_keywords(&keywords)),
        Err(e) => app.set_error(format!("Could not reload config: {e}")),
    }
}

fn setup_terminal() -> TuiResult<Terminal> {
    log::debug!("Setting up terminal for TUI");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal() -> TuiResult<()> {
    let _ = terminal::disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    log::debug!("Terminal restored");
    Ok(())
}
