use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::session::MessageRole;
use crate::tui::app::{App, Focus};

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Main content
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status bar
            ]
            .as_ref(),
        )
        .split(frame.area());

    render_header(frame, chunks[0], app);

    // The chat list only appears once a chat has been launched
    if app.sidebar_visible() {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
            .split(chunks[1]);
        render_sidebar(frame, content_chunks[0], app);
        render_chat(frame, content_chunks[1], app);
    } else {
        render_chat(frame, chunks[1], app);
    }

    render_input(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_text = vec![Line::from(vec![
        Span::styled(
            "Adewin",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Backend: "),
        Span::styled(&app.backend, Style::default().fg(Color::Green)),
    ])];

    let header = Paragraph::new(header_text)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

/// Render the chat list, newest first
fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.manager.view();
    let items: Vec<ListItem> = view
        .chats
        .iter()
        .map(|chat| {
            let selected = view.selected_chat_id == Some(&chat.id);
            let title_style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(vec![
                Line::from(Span::styled(chat.title.clone(), title_style)),
                Line::from(Span::styled(
                    chat.last_message.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    chat.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let border_color = if app.focus == Focus::Sidebar {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Campaigns [{}] ", view.chats.len()))
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(border_color)),
        )
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if app.focus == Focus::Sidebar {
        state.select(Some(app.sidebar_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the messages of the active chat
fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.manager.view();
    let mut lines = Vec::new();

    if view.messages.is_empty() {
        lines.push(Line::from(Span::styled(
            "Describe the campaign you want to run and the assistant will ask follow-up questions.",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    for msg in view.messages {
        let (role, color) = match msg.role {
            MessageRole::User => ("You", Color::Blue),
            MessageRole::Assistant => ("Assistant", Color::Green),
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", role),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                msg.timestamp.format("%H:%M").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        for line in msg.content.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::from(""));
    }

    if view.is_loading {
        lines.push(Line::from(vec![
            Span::styled(
                "[Assistant] ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "typing...",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC | Modifier::SLOW_BLINK),
            ),
        ]));
    }

    let title = match view.selected_chat_id.and_then(|id| app.manager.chat(id)) {
        Some(chat) => format!(" {} ", chat.title),
        None => " Temporary chat ".to_string(),
    };

    // Scroll from the bottom so new messages stay visible
    let inner_height = area.height.saturating_sub(2);
    let total = lines.len() as u16;
    let bottom = total.saturating_sub(inner_height);
    let scroll = bottom.saturating_sub(app.scroll_offset);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let border_color = if app.focus == Focus::Input {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Message (Enter to send) "),
        );

    frame.render_widget(input, area);

    if app.focus == Focus::Input {
        let cursor_offset = app.input.chars().count() as u16;
        let cursor_x = (area.x + 1 + cursor_offset).min(area.x + area.width.saturating_sub(2));
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.manager.view();

    let status_text = if let Some(status) = &app.status_message {
        status.clone()
    } else if view.is_loading {
        "Waiting for the assistant...".to_string()
    } else {
        "Ready".to_string()
    };

    let (mode, mode_color) = if view.is_temporary_chat {
        ("TEMP", Color::Yellow)
    } else {
        ("CHAT", Color::Green)
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", mode),
            Style::default()
                .bg(mode_color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(status_text),
        Span::raw(" | "),
    ];

    if view.is_temporary_chat && !view.messages.is_empty() {
        spans.push(Span::styled(
            "Ctrl+L: launch campaign",
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(
        "Ctrl+N: new chat | Tab: chats | Ctrl+C: quit",
        Style::default().fg(Color::DarkGray),
    ));

    let status_bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Black))
        .block(Block::default());

    frame.render_widget(status_bar, area);
}
