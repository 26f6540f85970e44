//! Frame rendering — chart panel, event strip, status bar.
//!
//! The chart draws price history as dots and every retained surface
//! primitive as a horizontal line in its resolved style. Drawing also
//! rebuilds the mouse hit map, so clicks always land on what is shown.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, LineHit, StatusLevel};
use crate::chart::Viewport;

/// Width of the `[x]` cancel affordance, including trailing space.
const CANCEL_WIDTH: u16 = 4;

/// Core theme color → terminal color.
fn rgb(c: tradelines_core::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Draw the entire UI and refresh the hit map.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_chart(f, chunks[0], app);
    draw_events(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);
}

fn draw_chart(f: &mut Frame, area: Rect, app: &mut AppState) {
    let last = app.feed.last();
    let title = format!(
        " {} {:.2}{} — {} line(s) ",
        app.symbol,
        last,
        if app.paused { " [paused]" } else { "" },
        app.engine.len(),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    app.chart_area = inner;
    app.line_hits.clear();
    if inner.height == 0 || inner.width == 0 {
        app.viewport = None;
        return;
    }

    // Fit the band around history, every order line, and the cursor.
    let anchors: Vec<f64> = app
        .engine
        .host()
        .lines()
        .map(|(_, line)| line.anchor.price)
        .collect();
    let prices = app
        .history
        .iter()
        .copied()
        .chain(anchors.iter().copied())
        .chain(std::iter::once(app.cursor_price));
    let Some(vp) = Viewport::fit(prices, inner.height) else {
        app.viewport = None;
        return;
    };
    app.viewport = Some(vp);

    let width = inner.width as usize;
    let mut rows: Vec<Line> = (0..inner.height)
        .map(|row| history_row(app, vp, row, width))
        .collect();

    // Order lines on top of the history, hit map alongside.
    let drag_target = app.engine.drag_target().cloned();
    for (handle, line) in app.engine.host().lines() {
        let Some(row) = vp.price_to_row(line.anchor.price) else {
            continue;
        };
        let payload = &line.payload;
        let style = payload.style;
        let dragging = drag_target.as_ref() == Some(&payload.order.id);

        let mut body = String::with_capacity(width);
        if style.show_cancel {
            body.push_str("[x] ");
        }
        body.push_str(&payload.label());
        body.push(' ');
        while body.chars().count() < width {
            body.push('─');
        }
        let body: String = body.chars().take(width).collect();

        let mut text_style = Style::default().fg(rgb(style.line_color));
        if dragging {
            text_style = text_style.add_modifier(Modifier::REVERSED);
        }
        rows[row as usize] = Line::from(Span::styled(body, text_style));

        app.line_hits.push(LineHit {
            handle,
            order_id: payload.order.id.clone(),
            row: inner.y + row,
            cancel_span: style
                .show_cancel
                .then(|| (inner.x, inner.x + CANCEL_WIDTH - 1)),
            draggable: style.draggable,
        });
    }

    f.render_widget(Paragraph::new(rows), inner);
}

/// One chart row of history dots, with the cursor marker on its row.
fn history_row(app: &AppState, vp: Viewport, row: u16, width: usize) -> Line<'static> {
    let mut cells = vec![' '; width];
    let len = app.history.len();
    for col in 0..width {
        let Some(idx) = (len + col).checked_sub(width) else {
            continue;
        };
        if let Some(price) = app.history.get(idx) {
            if vp.price_to_row(*price) == Some(row) {
                cells[col] = '·';
            }
        }
    }
    let is_cursor_row = vp.price_to_row(app.cursor_price) == Some(row);
    if is_cursor_row && !cells.is_empty() {
        cells[0] = '›';
    }
    let style = if is_cursor_row {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(cells.into_iter().collect::<String>(), style))
}

fn draw_events(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Events ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = app
        .events
        .recent(inner.height as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Gray))))
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = vec![Span::styled(
        " b/s:limit B/S:bracket f:fill ↑/↓:cursor t:theme space:pause w:save q:quit",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => Style::default().fg(Color::Cyan),
            StatusLevel::Warning => Style::default().fg(Color::Yellow),
            StatusLevel::Error => Style::default().fg(Color::Red),
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
