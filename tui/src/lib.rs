//! TUI rendering for the gate panel using ratatui.

mod input;
mod theme;

pub use input::{InputPump, apply_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, ring_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use gate_engine::{
    ACTIVATION_WORD, App, DraftInput, EditTarget, InputMode, sanitize_terminal_text,
};

const RELAY_DESTINATION_PREVIEW: usize = 24;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),    // Panels
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    draw_gate_panel(frame, app, columns[0], &palette, &glyphs);
    draw_messaging_panel(frame, app, columns[1], &palette, &glyphs);
    draw_status_bar(frame, app, rows[1], &palette);

    if let Some(notice) = app.notice() {
        draw_notice(frame, notice, &palette);
    }
}

fn panel_block<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .title(Span::styled(format!(" {title} "), styles::title(palette)))
}

fn draw_gate_panel(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Key field
            Constraint::Length(6), // Status
            Constraint::Min(3),    // Gate Log
        ])
        .split(area);

    draw_text_field(frame, app, chunks[0], EditTarget::Credential, palette);
    draw_gate_status(frame, app, chunks[1], palette, glyphs);
    draw_gate_log(frame, app, chunks[2], palette);
}

fn draw_gate_status(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let access = app.access();
    let auth = access.auth_state();
    let portal = access.portal();
    let preconditions = access.preconditions();
    let ring = ring_frame(app.tick_count(), portal.spinning, app.ui_options());
    let flag = |set: bool| if set { glyphs.check } else { glyphs.cross };

    let (portal_glyph, portal_label, portal_style) = if portal.open {
        (glyphs.portal_open, "OPEN", Style::default().fg(palette.success))
    } else if portal.spinning {
        (glyphs.portal_closed, "CHARGING", Style::default().fg(palette.warning))
    } else {
        (glyphs.portal_closed, "CLOSED", Style::default().fg(palette.text_muted))
    };

    let label = Style::default().fg(palette.text_muted);
    let lines = vec![
        Line::from(vec![
            Span::styled("Status: ", label),
            Span::styled(
                auth.as_str().to_ascii_uppercase(),
                Style::default()
                    .fg(palette.auth(auth))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Portal: ", label),
            Span::styled(format!("{portal_glyph} {portal_label}"), portal_style),
            Span::raw("  "),
            Span::styled(ring, Style::default().fg(palette.accent)),
        ]),
        Line::from(vec![
            Span::styled("Mars Plate: ", label),
            Span::raw(flag(preconditions.standing)),
            Span::styled(format!("  Word \"{ACTIVATION_WORD}\": "), label),
            Span::raw(flag(preconditions.spoken_word)),
        ]),
        Line::from(vec![
            Span::styled("Orientation: ", label),
            Span::raw(format!("{}{}", app.orientation().degrees(), glyphs.degrees)),
        ]),
    ];

    let status = Paragraph::new(lines)
        .style(Style::default().fg(palette.text_primary))
        .block(panel_block("Gate", palette));
    frame.render_widget(status, area);
}

fn draw_gate_log(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let lines: Vec<Line> = app
        .log()
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", entry.display_time()),
                    Style::default().fg(palette.text_muted),
                ),
                Span::styled(
                    sanitize_terminal_text(entry.message()).into_owned(),
                    Style::default().fg(palette.text_secondary),
                ),
            ])
        })
        .collect();

    let log = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel_block("Gate Log", palette));
    frame.render_widget(log, area);
}

fn draw_messaging_panel(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let compose_target = match app.input_mode() {
        InputMode::Editing(EditTarget::Relay) => EditTarget::Relay,
        _ => EditTarget::Chat,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Contact draft
            Constraint::Min(4),    // Contacts
            Constraint::Length(4), // Identity
            Constraint::Min(4),    // Chat
            Constraint::Length(3), // Compose
        ])
        .split(area);

    draw_text_field(frame, app, chunks[0], EditTarget::NewContact, palette);
    draw_contacts(frame, app, chunks[1], palette, glyphs);
    draw_identity(frame, app, chunks[2], palette);
    draw_chat(frame, app, chunks[3], palette, glyphs);
    draw_text_field(frame, app, chunks[4], compose_target, palette);
}

fn draw_contacts(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let cursor = app.contact_cursor();
    let selected = app.selected_contact();
    let lines: Vec<Line> = if app.contacts().is_empty() {
        vec![Line::from(Span::styled(
            "No contacts",
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::ITALIC),
        ))]
    } else {
        app.contacts()
            .contacts()
            .iter()
            .enumerate()
            .map(|(i, contact)| {
                let marker = if selected == Some(&contact.id) {
                    glyphs.selected
                } else {
                    " "
                };
                let style = if i == cursor {
                    styles::selected(palette)
                } else {
                    Style::default().fg(palette.text_secondary)
                };
                Line::from(vec![
                    Span::styled(format!("{marker} "), style),
                    Span::styled(sanitize_terminal_text(&contact.name).into_owned(), style),
                    Span::styled(
                        format!("  {}", contact.token),
                        Style::default().fg(palette.text_muted),
                    ),
                ])
            })
            .collect()
    };

    let list = Paragraph::new(lines).block(panel_block("Contacts", palette));
    frame.render_widget(list, area);
}

fn draw_identity(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let label = Style::default().fg(palette.text_muted);
    let lines = vec![
        Line::from(vec![
            Span::styled("Share token: ", label),
            Span::styled(
                app.share_token().to_string(),
                Style::default().fg(palette.accent),
            ),
        ]),
        Line::from(vec![
            Span::styled("Relay (simulated): ", label),
            Span::raw(truncate_with_ellipsis(
                app.relay().destination(),
                RELAY_DESTINATION_PREVIEW,
            )),
        ]),
    ];
    let identity = Paragraph::new(lines)
        .style(Style::default().fg(palette.text_secondary))
        .block(panel_block("Identity", palette));
    frame.render_widget(identity, area);
}

fn draw_chat(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let (title, lines) = match app.selected_contact() {
        Some(id) => {
            let title = app
                .contacts()
                .contact(id)
                .map_or_else(|| id.to_string(), |c| c.name.clone());
            let lines: Vec<Line> = app
                .contacts()
                .history(id)
                .iter()
                .map(|message| {
                    Line::from(vec![
                        Span::styled(
                            format!("{} ", glyphs.outbound),
                            Style::default().fg(palette.accent),
                        ),
                        Span::raw(sanitize_terminal_text(&message.text).into_owned()),
                    ])
                })
                .collect();
            (sanitize_terminal_text(&title).into_owned(), lines)
        }
        None => (
            "Chat".to_string(),
            vec![Line::from(Span::styled(
                "Select a contact to chat",
                Style::default()
                    .fg(palette.text_muted)
                    .add_modifier(Modifier::ITALIC),
            ))],
        ),
    };

    let chat = Paragraph::new(lines)
        .style(Style::default().fg(palette.text_primary))
        .wrap(Wrap { trim: false })
        .block(panel_block(&title, palette));
    frame.render_widget(chat, area);
}

fn draw_text_field(frame: &mut Frame, app: &App, area: Rect, target: EditTarget, palette: &Palette) {
    let draft: &DraftInput = app.draft(target);
    let editing = app.input_mode() == InputMode::Editing(target);

    let border_style = if editing {
        Style::default().fg(palette.success)
    } else {
        Style::default().fg(palette.bg_border)
    };
    let content = if draft.is_empty() && !editing {
        Span::styled(
            target.placeholder(),
            Style::default()
                .fg(palette.text_muted)
                .add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled(
            sanitize_terminal_text(draft.text()).into_owned(),
            Style::default().fg(palette.text_primary),
        )
    };

    let field = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Span::styled(
                format!(" {} ", target.label()),
                styles::key_hint(palette),
            )),
    );
    frame.render_widget(field, area);

    if editing {
        let before: String = draft.text().chars().take(draft.cursor()).collect();
        let offset = sanitize_terminal_text(&before).width() as u16;
        let max_x = area.x + area.width.saturating_sub(2);
        let x = (area.x + 1).saturating_add(offset).min(max_x);
        frame.set_cursor_position((x, area.y + 1));
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(key, styles::key_highlight(palette)),
            Span::styled(format!(" {label}  "), styles::key_hint(palette)),
        ]
    };

    let (mode_label, mode_style, hints): (String, Style, Vec<[Span; 2]>) = match app.input_mode() {
        InputMode::Normal => (
            " NORMAL ".to_string(),
            styles::mode_normal(palette),
            vec![
                hint("k", "key"),
                hint("x", "clear"),
                hint("s", "stand"),
                hint("w", "word"),
                hint("o", "open"),
                hint("e", "eject"),
                hint("a", "add"),
                hint("Enter", "chat"),
                hint("m", "msg"),
                hint("r", "relay"),
                hint("i", "inbox"),
                hint("[ ]", "rotate"),
                hint("n", "north"),
                hint("q", "quit"),
            ],
        ),
        InputMode::Editing(target) => (
            format!(" {} ", target.label()),
            styles::mode_edit(palette),
            vec![hint("Enter", "submit"), hint("Esc", "cancel")],
        ),
    };

    let mut spans = vec![Span::styled(mode_label, mode_style), Span::raw(" ")];
    spans.extend(hints.into_iter().flatten());
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notice(frame: &mut Frame, notice: &str, palette: &Palette) {
    let area = frame.area();
    let text = sanitize_terminal_text(notice).into_owned();
    let width = (text.width() as u16 + 6)
        .max(30)
        .min(area.width.saturating_sub(4));
    let height = 5.min(area.height);

    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width) / 2),
        y: area.y + (area.height.saturating_sub(height) / 2),
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let body = Paragraph::new(vec![
        Line::from(Span::styled(text, Style::default().fg(palette.text_primary))),
        Line::from(""),
        Line::from(Span::styled("Esc to dismiss", styles::key_hint(palette))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.primary))
            .style(Style::default().bg(palette.bg_popup)),
    );
    frame.render_widget(body, popup);
}

fn truncate_with_ellipsis(raw: &str, max: usize) -> String {
    let max = max.max(3);
    let trimmed = raw.trim();
    if trimmed.chars().count() <= max {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(max - 3).collect();
        format!("{head}...")
    }
}
