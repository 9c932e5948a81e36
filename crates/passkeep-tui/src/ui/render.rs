//! Rendering for the passkeep TUI.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::app::{App, Screen, ToastKind};

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);

    match app.screen {
        Screen::Login => render_login(f, app, chunks[1]),
        Screen::Register => render_register(f, app, chunks[1]),
        Screen::Generator => render_generator(f, app, chunks[1]),
        Screen::Vault => render_vault(f, app, chunks[1]),
        Screen::History => render_history(f, app, chunks[1]),
    }

    render_footer(f, app, chunks[2]);

    if app.save_name.is_some() {
        render_save_dialog(f, app);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let who = match app.session.identity() {
        Some(identity) => identity.email.clone(),
        None => "not signed in".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(
            "passkeep",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" · "),
        Span::raw(app.screen.title()),
        Span::raw(" · "),
        Span::styled(who, Style::default().fg(Color::DarkGray)),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.screen {
        Screen::Login => "Tab next field · Enter submit · Ctrl+N create account · Esc quit",
        Screen::Register => "Tab next field · Enter submit · Esc back",
        Screen::Generator => "g generate · s save · 1/2/3 screens · o sign out · q quit",
        Screen::Vault => "r refresh · d delete · Up/Down select · 1/2/3 screens · q quit",
        Screen::History => "x clear · 1/2/3 screens · o sign out · q quit",
    };

    let mut lines = vec![Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(toast) = &app.toast {
        let color = match toast.kind {
            ToastKind::Info => Color::Gray,
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
        };
        lines.insert(
            0,
            Line::from(Span::styled(
                toast.message.clone(),
                Style::default().fg(color),
            )),
        );
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn field<'a>(label: &'a str, value: &'a str, masked: bool, focused: bool) -> Paragraph<'a> {
    let shown = if masked {
        "\u{2022}".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Paragraph::new(shown).block(
        Block::default()
            .borders(Borders::ALL)
            .title(label)
            .border_style(style),
    )
}

fn form_area(area: Rect, rows: u16) -> Rect {
    let width = area.width.min(60);
    let height = (rows * 3).min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn render_login(f: &mut Frame, app: &App, area: Rect) {
    let form = form_area(area, 2);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(form);

    f.render_widget(
        field("Email", &app.login.email, false, app.login.focus == 0),
        rows[0],
    );
    f.render_widget(
        field("Password", &app.login.password, true, app.login.focus == 1),
        rows[1],
    );
}

fn render_register(f: &mut Frame, app: &App, area: Rect) {
    let form = form_area(area, 5);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(form);

    let r = &app.register;
    f.render_widget(field("Name", &r.name, false, r.focus == 0), rows[0]);
    f.render_widget(field("Email", &r.email, false, r.focus == 1), rows[1]);
    f.render_widget(
        field("Birth date (DD/MM/YYYY)", &r.birth_date, false, r.focus == 2),
        rows[2],
    );
    f.render_widget(field("Password", &r.password, true, r.focus == 3), rows[3]);
    f.render_widget(
        field("Confirm password", &r.confirm, true, r.focus == 4),
        rows[4],
    );
}

fn render_generator(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.generated {
        Some(value) => vec![
            Line::from(""),
            Line::from(Span::styled(
                value.clone(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "press s to save it to your vault",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => vec![
            Line::from(""),
            Line::from("press g to generate a password"),
        ],
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Generator"));
    f.render_widget(widget, area);
}

fn render_vault(f: &mut Frame, app: &App, area: Rect) {
    if app.vault.is_empty() {
        let empty = Paragraph::new("no saved passwords - press r to refresh")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Vault"));
        f.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .vault
        .iter()
        .map(|item| {
            let created = item
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![item.name.clone(), item.secret.clone(), created])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(45),
            Constraint::Percentage(25),
        ],
    )
    .header(
        Row::new(vec!["Name", "Password", "Created"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .block(Block::default().borders(Borders::ALL).title("Vault"));

    let mut state = TableState::default();
    state.select(Some(app.vault_selected));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_history(f: &mut Frame, app: &App, area: Rect) {
    if app.history_entries.is_empty() {
        let empty = Paragraph::new("no generated passwords yet")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("History"));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .history_entries
        .iter()
        .rev()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.generated_at.format("%Y-%m-%d %H:%M ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.value.clone()),
            ]))
        })
        .collect();

    let list =
        List::new(items).block(Block::default().borders(Borders::ALL).title("History"));
    f.render_widget(list, area);
}

fn render_save_dialog(f: &mut Frame, app: &App) {
    let Some(name) = &app.save_name else { return };

    let area = f.area();
    let width = area.width.min(50);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height / 2).saturating_sub(2),
        width,
        height: 3,
    };

    f.render_widget(Clear, popup);
    f.render_widget(field("Save as (Enter to save, Esc to cancel)", name, false, true), popup);
}
