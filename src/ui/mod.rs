//! User interface rendering.

mod form;
mod keymap_bar;
mod plot;
mod status_bar;
mod theme;

use crate::app::App;
use crate::script::Mode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

pub use theme::{line_color, ThemeColors};

/// Draw the UI.
pub fn draw(f: &mut Frame<'_>, app: &mut App) {
    let colors = ThemeColors::from_theme(&app.theme);
    f.render_widget(Block::default().style(Style::default().bg(colors.bg)), f.area());

    let settings_height = match app.tab() {
        Mode::TwoD => 4,
        Mode::ThreeD => 5,
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(settings_height),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    form::draw_tabs(f, app, chunks[0], &colors);
    form::draw_input(f, app, chunks[1], &colors);
    form::draw_settings(f, app, chunks[2], &colors);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(chunks[3]);

    plot::draw_functions(f, app, content[0], &colors);
    plot::draw_graph(f, app, content[1], &colors);

    status_bar::draw_status(f, chunks[4], &app.status, app.is_busy(), &colors);
    keymap_bar::draw_keymap(f, chunks[5], app.focus, app.tab(), &colors);
}
