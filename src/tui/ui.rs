//! TUI layout and rendering with ratatui.
//!
//! Header with the open asset, a list of related GUIDs, and a footer that
//! shows either the GUID being typed or the available commands. Errors are
//! drawn as a centered dialog on top.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, AppMode, RelatedEntry};

const ACCENT: Color = Color::Cyan;
const HIGHLIGHT: Color = Color::Yellow;
const DANGER: Color = Color::Red;
const DIM: Color = Color::DarkGray;

/// Render the whole screen from the app state.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Related list
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_related(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if app.error_message().is_some() {
        render_error_dialog(frame, app, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.asset() {
        Some(asset) => vec![
            Line::from(vec![
                Span::styled(
                    asset.name.clone(),
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  [{}]", asset.guid)),
            ]),
            Line::from(Span::styled(
                format!("{} in {}", asset.template, asset.file),
                Style::default().fg(DIM),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "No asset open. Press / to enter a GUID.",
            Style::default().fg(DIM),
        ))],
    };

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" assets-explorer ")
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(header, area);
}

fn render_related(frame: &mut Frame, app: &App, area: Rect) {
    let visible = app.visible_related();
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = visible
        .iter()
        .map(|entry| ListItem::new(related_line(entry, width)))
        .collect();

    let blacklist = if app.is_blacklist_enabled() {
        format!("blacklist on, {} hidden", app.hidden_count())
    } else {
        "blacklist off".to_string()
    };
    let title = format!(" Related ({}) - {} ", visible.len(), blacklist);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(HIGHLIGHT)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected_index()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// `guid  name  element (context)`; known-missing GUIDs are dimmed.
fn related_line(entry: &RelatedEntry, width: usize) -> Line<'static> {
    let r = &entry.reference;
    let name = match (&entry.name, entry.missing) {
        (_, true) => "(not found)".to_string(),
        (Some(name), false) => name.clone(),
        (None, false) => "?".to_string(),
    };
    let text = truncate_string(
        &format!("{:<10} {:<30} {} ({})", r.guid, name, r.element_name, r.context),
        width,
    );

    let style = if entry.missing {
        Style::default().fg(DIM).add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    Line::from(Span::styled(text, style))
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.mode() {
        AppMode::Input => Line::from(vec![
            Span::styled("GUID: ", Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{}_", app.input())),
        ]),
        _ => {
            let mut spans: Vec<Span> = footer_commands()
                .iter()
                .flat_map(|(key, desc)| {
                    [
                        Span::styled(
                            format!("[{key}]"),
                            Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(format!("{desc} ")),
                    ]
                })
                .collect();
            if let Some(status) = app.status() {
                spans.push(Span::styled(format!(" | {status}"), Style::default().fg(DIM)));
            }
            Line::from(spans)
        }
    };

    let footer = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(DIM)),
        );
    frame.render_widget(footer, area);
}

fn footer_commands() -> [(&'static str, &'static str); 7] {
    [
        ("/", "GUID"),
        ("Enter", "Open"),
        ("b", "Back"),
        ("f", "Blacklist"),
        ("x", "Hide element"),
        ("c", "Clear missing"),
        ("q", "Quit"),
    ]
}

fn render_error_dialog(frame: &mut Frame, app: &App, area: Rect) {
    let dialog_area = centered_rect(60, 25, area);
    frame.render_widget(Clear, dialog_area);

    let message = app.error_message().unwrap_or("Unknown error");
    let error = Paragraph::new(vec![
        Line::from(Span::styled(
            "Error",
            Style::default().fg(DANGER).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss",
            Style::default().fg(DIM),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DANGER)),
    );
    frame.render_widget(error, dialog_area);
}

/// Truncate with an ellipsis if longer than `max_len` characters.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::RelatedRef;
    use crate::cache::AssetInfo;
    use crate::tui::app::Action;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn entry(guid: &str, name: Option<&str>, missing: bool) -> RelatedEntry {
        RelatedEntry {
            reference: RelatedRef {
                guid: guid.to_string(),
                element_name: "Ingredient".to_string(),
                context: "Item".to_string(),
            },
            name: name.map(str::to_string),
            missing,
        }
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hello", 3), "...");
        assert_eq!(truncate_string("", 0), "");
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.width < area.width);
    }

    #[test]
    fn test_render_empty_app() {
        let screen = draw(&App::new());
        assert!(screen.contains("No asset open"));
        assert!(screen.contains("Related (0)"));
    }

    #[test]
    fn test_render_asset_and_related() {
        let mut app = App::new();
        app.show_asset(
            AssetInfo {
                guid: "100".to_string(),
                name: "Wood".to_string(),
                template: "Product".to_string(),
                file: "Product.xml".to_string(),
            },
            vec![entry("200", Some("Planks"), false), entry("300", None, true)],
            true,
        );
        let screen = draw(&app);

        assert!(screen.contains("Wood"));
        assert!(screen.contains("Product in Product.xml"));
        assert!(screen.contains("Planks"));
        assert!(screen.contains("(not found)"));
    }

    #[test]
    fn test_render_input_and_error() {
        let mut app = App::new();
        app.handle_action(Action::StartInput);
        app.handle_action(Action::InputChar('4'));
        assert!(draw(&app).contains("GUID: 4_"));

        let mut app = App::new();
        app.set_error("GUID 999 not found");
        assert!(draw(&app).contains("GUID 999 not found"));
    }
}
