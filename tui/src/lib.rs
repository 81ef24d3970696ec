//! TUI rendering for the user dashboard using ratatui.
//!
//! [`render`] is a pure function of the dashboard state: while the initial load
//! is in flight it shows only a loading indicator, otherwise the full
//! dashboard (header, error banner, status card, new-user form, user list).
//! [`draw`] renders the app and feeds the user list's page size back into it
//! so scrolling can be clamped.

mod format;
mod input;
mod theme;

pub use input::{InputPump, apply_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    },
};
use unicode_width::UnicodeWidthStr;

use userdash_engine::{
    ApiStatus, App, DashboardError, DashboardState, FormField, FormFocus, Role, UiOptions, User,
    sanitize_single_line,
};

use self::format::format_timestamp;

const LABEL_WIDTH: usize = 8;
const FORM_HEIGHT: u16 = 8;
const STATUS_HEIGHT: u16 = 6;
const BANNER_HEIGHT: u16 = 3;
const CARD_HEIGHT: usize = 2;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
    if let Some(cards) = render(frame, app.state(), app.ui_options(), app.tick_count()) {
        app.update_users_viewport(cards);
    }
}

/// Render `state` into `frame`. No side effects.
///
/// Returns how many user cards fit on screen, or `None` when the user list
/// is not shown (loading).
pub fn render(
    frame: &mut Frame,
    state: &DashboardState,
    options: UiOptions,
    tick: usize,
) -> Option<usize> {
    let palette = palette(options);
    let glyphs = glyphs(options);

    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    if state.loading {
        draw_loading(frame, &palette, spinner_frame(tick, options));
        return None;
    }

    let mut constraints = vec![Constraint::Length(2)];
    if state.error.is_some() {
        constraints.push(Constraint::Length(BANNER_HEIGHT));
    }
    if state.api_status.is_some() {
        constraints.push(Constraint::Length(STATUS_HEIGHT));
    }
    constraints.push(Constraint::Length(FORM_HEIGHT));
    constraints.push(Constraint::Min(3));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(frame.area());

    let mut next = 0;
    let mut take = || {
        let area = chunks[next];
        next += 1;
        area
    };

    draw_header(frame, take(), &palette, &glyphs);
    if let Some(error) = state.error {
        let area = take();
        draw_error_banner(frame, area, error, &palette, &glyphs);
    }
    if let Some(status) = &state.api_status {
        let area = take();
        draw_status_card(frame, area, status, &palette, &glyphs);
    }
    let form_area = take();
    draw_form(frame, form_area, state, &palette, &glyphs);
    let users_area = take();
    let cards = draw_users(frame, users_area, state, &palette, &glyphs);
    let footer_area = take();
    draw_footer(frame, footer_area, state, cards, &palette);
    Some(cards)
}

fn draw_loading(frame: &mut Frame, palette: &Palette, spinner: &str) {
    let area = frame.area();
    let y = area.y + area.height / 2;
    let line = Line::from(vec![
        Span::styled(format!("{spinner} "), Style::default().fg(palette.accent)),
        Span::styled("Loading...", Style::default().fg(palette.text_primary)),
    ]);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, Rect::new(area.x, y, area.width, 1));
}

fn draw_header(frame: &mut Frame, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", glyphs.header), styles::title(palette)),
            Span::styled("User Dashboard", styles::title(palette)),
        ]),
        Line::from(Span::styled(
            "Backend status and user management",
            Style::default().fg(palette.text_muted),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_error_banner(
    frame: &mut Frame,
    area: Rect,
    error: DashboardError,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let error_style = Style::default()
        .fg(palette.error)
        .add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled(format!(" {} ", glyphs.warning), error_style),
        Span::styled(error.to_string(), error_style),
    ];
    if error.offers_retry() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("[Ctrl+R]", styles::key_highlight(palette)));
        spans.push(Span::styled(" Retry", styles::key_hint(palette)));
    }

    let banner = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.error)),
    );
    frame.render_widget(banner, area);
}

fn draw_status_card(
    frame: &mut Frame,
    area: Rect,
    status: &ApiStatus,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<13}"), styles::label(palette)),
            Span::styled(value, Style::default().fg(palette.text_primary)),
        ])
    };
    let lines = vec![
        row("Message:", sanitize_single_line(&status.message).into_owned()),
        row("Version:", sanitize_single_line(&status.version).into_owned()),
        row(
            "Environment:",
            sanitize_single_line(&status.environment).into_owned(),
        ),
        row(
            "Timestamp:",
            sanitize_single_line(&format_timestamp(&status.timestamp)).into_owned(),
        ),
    ];

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(styles::border(palette, false))
            .title(Span::styled(
                format!(" {} Backend Status ", glyphs.status),
                styles::title(palette),
            )),
    );
    frame.render_widget(card, area);
}

fn draw_form(
    frame: &mut Frame,
    area: Rect,
    state: &DashboardState,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette, true))
        .title(Span::styled(" Add New User ", styles::title(palette)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::with_capacity(6);
    let mut cursor = None;

    for (row, field) in [FormField::Name, FormField::Email].into_iter().enumerate() {
        let focused = state.focus == FormFocus::from(field);
        let value = sanitize_single_line(state.draft.value(field));
        let marker = if focused { glyphs.selected } else { " " };

        let mut spans = vec![
            Span::styled(format!("{marker} "), Style::default().fg(palette.accent)),
            Span::styled(
                format!("{:<width$}", field.label(), width = LABEL_WIDTH),
                styles::label(palette),
            ),
        ];
        if value.is_empty() {
            spans.push(Span::styled(
                field.label(),
                Style::default()
                    .fg(palette.text_muted)
                    .add_modifier(Modifier::ITALIC),
            ));
        } else {
            let style = if focused {
                styles::focused_input(palette)
            } else {
                Style::default().fg(palette.text_primary)
            };
            spans.push(Span::styled(value.to_string(), style));
        }
        lines.push(Line::from(spans));

        if focused {
            let x = inner.x as usize + 2 + LABEL_WIDTH + value.width();
            let x = x.min((inner.x + inner.width.saturating_sub(1)) as usize) as u16;
            cursor = Some((x, inner.y + row as u16));
        }
    }

    lines.push(role_line(state, palette, glyphs));
    lines.push(Line::from(""));
    lines.push(submit_line(state, palette, glyphs));
    if let Some(validation) = &state.validation {
        lines.push(Line::from(Span::styled(
            format!("  {} {validation}", glyphs.warning),
            Style::default().fg(palette.warning),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

fn role_line<'a>(state: &DashboardState, palette: &Palette, glyphs: &Glyphs) -> Line<'a> {
    let focused = state.focus == FormFocus::Role;
    let marker = if focused { glyphs.selected } else { " " };
    let mut spans = vec![
        Span::styled(format!("{marker} "), Style::default().fg(palette.accent)),
        Span::styled(
            format!("{:<width$}", FormField::Role.label(), width = LABEL_WIDTH),
            styles::label(palette),
        ),
    ];
    for (i, role) in Role::ALL.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" / ", styles::key_hint(palette)));
        }
        let selected = state.draft.role == role;
        let style = match (selected, focused) {
            (true, true) => styles::focused_input(palette).add_modifier(Modifier::BOLD),
            (true, false) => Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
            (false, _) => Style::default().fg(palette.text_muted),
        };
        let text = if selected {
            format!("({})", role.display_name())
        } else {
            format!(" {} ", role.display_name())
        };
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn submit_line<'a>(state: &DashboardState, palette: &Palette, glyphs: &Glyphs) -> Line<'a> {
    let focused = state.focus == FormFocus::Submit;
    let marker = if focused { glyphs.selected } else { " " };
    let label = if state.submitting {
        "[ Adding... ]"
    } else {
        "[ Add User ]"
    };
    let style = if focused {
        Style::default()
            .fg(palette.bg_dark)
            .bg(palette.success)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(palette.success)
            .add_modifier(Modifier::BOLD)
    };
    Line::from(vec![
        Span::styled(format!("{marker} "), Style::default().fg(palette.accent)),
        Span::raw(" ".repeat(LABEL_WIDTH)),
        Span::styled(label, style),
    ])
}

/// Draws the visible page of user cards starting at `users_scroll`; returns
/// the page size.
fn draw_users(
    frame: &mut Frame,
    area: Rect,
    state: &DashboardState,
    palette: &Palette,
    glyphs: &Glyphs,
) -> usize {
    let users = &state.users;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette, false))
        .title(Span::styled(
            format!(" {} Current Users ({}) ", glyphs.users, users.len()),
            styles::title(palette),
        ));
    let inner = block.inner(area);

    let page = (usize::from(inner.height) / CARD_HEIGHT).max(1);
    let max_first = users.len().saturating_sub(page);
    let first = state.users_scroll.min(max_first);

    let mut lines = Vec::with_capacity(page * CARD_HEIGHT);
    for user in users.iter().skip(first).take(page) {
        lines.extend(user_card(user, palette, glyphs));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);

    // Only render scrollbar when the list overflows
    if max_first > 0 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None)
            .track_symbol(Some(glyphs.scroll_track))
            .thumb_symbol(glyphs.scroll_thumb)
            .style(Style::default().fg(palette.text_muted));
        let mut scrollbar_state = ScrollbarState::new(max_first).position(first);
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }

    page
}

fn user_card<'a>(user: &User, palette: &Palette, glyphs: &Glyphs) -> [Line<'a>; 2] {
    let role_glyph = match user.role {
        Role::Admin => glyphs.admin,
        Role::User => glyphs.user,
    };
    let muted = Style::default().fg(palette.text_muted);
    [
        Line::from(vec![
            Span::styled(format!(" {role_glyph} "), Style::default().fg(palette.peach)),
            Span::styled(
                sanitize_single_line(&user.name).into_owned(),
                Style::default()
                    .fg(palette.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  ID: {}", user.id), muted),
        ]),
        Line::from(vec![
            Span::styled(format!("   {} ", glyphs.email), muted),
            Span::styled(
                sanitize_single_line(&user.email).into_owned(),
                Style::default().fg(palette.blue),
            ),
            Span::styled(format!("  {} {} ", glyphs.separator, glyphs.role), muted),
            Span::styled(
                user.role.as_str(),
                Style::default().fg(palette.text_secondary),
            ),
        ]),
    ]
}

fn draw_footer(
    frame: &mut Frame,
    area: Rect,
    state: &DashboardState,
    user_cards: usize,
    palette: &Palette,
) {
    let key = |k: &'static str| Span::styled(k, styles::key_highlight(palette));
    let hint = |h: &'static str| Span::styled(h, styles::key_hint(palette));

    let mut spans = vec![
        key("Tab"),
        hint(" next  "),
        key("Enter"),
        hint(" add user  "),
    ];
    if state.focus == FormFocus::Role {
        spans.push(key("Space"));
        spans.push(hint(" switch role  "));
    }
    if state.users.len() > user_cards {
        spans.push(key("PgUp/PgDn"));
        spans.push(hint(" scroll users  "));
    }
    spans.extend([key("Ctrl+R"), hint(" reload  "), key("Esc"), hint(" quit")]);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
