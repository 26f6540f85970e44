//! Keyboard and mouse dispatch.
//!
//! The mouse drives the drag protocol: press on a line begins the drag
//! (or hits the cancel zone), move samples candidate prices, release
//! settles. Everything else is keyboard.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use tradelines_core::persistence;
use tradelines_core::OrderSide;

use crate::app::AppState;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char(' ') => {
            app.paused = !app.paused;
            app.set_status(if app.paused { "feed paused" } else { "feed running" });
        }
        KeyCode::Char('b') => app.place_limit(OrderSide::Buy),
        KeyCode::Char('s') => app.place_limit(OrderSide::Sell),
        KeyCode::Char('B') => app.place_bracket(OrderSide::Buy),
        KeyCode::Char('S') => app.place_bracket(OrderSide::Sell),
        KeyCode::Char('f') => app.fill_nearest(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('w') => save_orders(app),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(true),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(false),
        _ => {}
    }
}

pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            left_button_down(app, mouse.column, mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.mouse_dragging {
                drag_sample(app, mouse.row);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if app.mouse_dragging {
                app.mouse_dragging = false;
                if let Some((id, price)) = app.engine.end_drag() {
                    app.set_status(format!("{id} settled at {price:.2}"));
                }
                app.drain_sync_failures();
            }
        }
        MouseEventKind::Down(MouseButton::Right) => {
            right_button_down(app, mouse.column, mouse.row);
        }
        _ => {}
    }
}

fn left_button_down(app: &mut AppState, column: u16, row: u16) {
    let Some(hit) = app.line_at(column, row).cloned() else {
        return;
    };

    // The cancel zone wins over the drag.
    if let Some((start, end)) = hit.cancel_span {
        if (start..=end).contains(&column) {
            match app.engine.cancel_clicked(&hit.order_id) {
                Ok(()) => app.set_status(format!("cancelled {}", hit.order_id)),
                Err(err) => app.set_error(err.to_string()),
            }
            app.drain_sync_failures();
            return;
        }
    }

    app.engine.overlay_clicked(&hit.order_id);
    if hit.draggable && app.engine.begin_drag(&hit.order_id) {
        app.mouse_dragging = true;
        app.set_status(format!("dragging {}", hit.order_id));
    }
}

fn drag_sample(app: &mut AppState, row: u16) {
    let Some(vp) = app.viewport else {
        return;
    };
    let row = row
        .saturating_sub(app.chart_area.y)
        .min(app.chart_area.height.saturating_sub(1));
    let candidate = vp.row_to_price(row);
    app.engine.drag_to(candidate);
    app.drain_sync_failures();
}

fn right_button_down(app: &mut AppState, column: u16, row: u16) {
    let Some(hit) = app.line_at(column, row).cloned() else {
        return;
    };
    // Owned lines swallow the host context menu.
    if app.engine.secondary_clicked(hit.handle) {
        app.set_status(format!("context menu suppressed on {}", hit.order_id));
    }
}

fn save_orders(app: &mut AppState) {
    let path = app.orders_path.clone();
    match persistence::save_orders(&path, &app.engine) {
        Ok(()) => app.set_status(format!("saved {} order(s) to {}", app.engine.len(), path.display())),
        Err(err) => app.set_error(format!("save failed: {err}")),
    }
}
