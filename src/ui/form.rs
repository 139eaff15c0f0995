//! Tab bar, expression entry and settings form.

use crate::app::{App, Field, Focus};
use crate::script::{Axis, Mode};
use crate::ui::ThemeColors;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Draw the tab bar.
pub(super) fn draw_tabs(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let titles = [Mode::TwoD, Mode::ThreeD]
        .iter()
        .enumerate()
        .map(|(i, mode)| format!("{} {}", i + 1, mode.title()))
        .collect::<Vec<_>>();
    let selected = match app.tab() {
        Mode::TwoD => 0,
        Mode::ThreeD => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(colors.muted).bg(colors.bg))
        .highlight_style(
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");

    f.render_widget(tabs, area);
}

/// Draw the expression entry.
pub(super) fn draw_input(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let editing = app.focus == Focus::Editing(Field::Expression);
    let (title, placeholder) = match app.tab() {
        Mode::TwoD => (" y = f(x) ", "press a to add a function"),
        Mode::ThreeD => (" z = f(x, y) ", "press a to enter a surface"),
    };

    let line = if app.input.text.is_empty() && !editing {
        Line::from(Span::styled(placeholder, Style::default().fg(colors.muted)))
    } else {
        Line::from(Span::styled(app.input.text.clone(), Style::default().fg(colors.value)))
    };

    let next = app.session.next_example();
    let block = Block::default()
        .title(title)
        .title(Line::from(format!(" e: {} ", next.name)).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { colors.focus } else { colors.border }))
        .style(Style::default().bg(colors.bg));

    f.render_widget(Paragraph::new(line).block(block), area);

    if editing {
        let x = area.x + 1 + app.input.cursor_column() as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Draw the settings form of the current tab.
pub(super) fn draw_settings(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let tab = app.tab();
    let axes: &[Axis] = match tab {
        Mode::TwoD => &[Axis::X, Axis::Y],
        Mode::ThreeD => &[Axis::X, Axis::Y, Axis::Z],
    };
    let grid = app.session.settings(tab).grid;

    let mut ranges = FormLine::new(colors);
    for &axis in axes {
        ranges.caption(format!("{} ", axis.letter()));
        ranges.field(app, Field::RangeMin(axis));
        ranges.caption(" : ".to_string());
        ranges.field(app, Field::RangeMax(axis));
        ranges.caption("   ".to_string());
    }
    ranges.caption("grid ".to_string());
    ranges.value(if grid { "on" } else { "off" }.to_string());

    let mut labels = FormLine::new(colors);
    for &axis in axes {
        labels.caption(format!("{} label ", axis.letter()));
        labels.field(app, Field::Label(axis));
        labels.caption("   ".to_string());
    }

    let mut lines = vec![ranges, labels];
    if tab == Mode::ThreeD {
        let mut view = FormLine::new(colors);
        view.caption("view ".to_string());
        view.field(app, Field::RotationX);
        view.caption(" , ".to_string());
        view.field(app, Field::RotationZ);
        view.caption("   palette ".to_string());
        view.value(app.session.palette().name().to_string());
        lines.push(view);
    }

    let cursor = lines
        .iter()
        .enumerate()
        .find_map(|(row, line)| line.cursor.map(|col| (col, row)));

    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .style(Style::default().bg(colors.bg));

    let text: Vec<Line<'_>> = lines.into_iter().map(|l| Line::from(l.spans)).collect();
    f.render_widget(Paragraph::new(text).block(block), area);

    if let Some((col, row)) = cursor {
        let x = area.x + 1 + col as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1 + row as u16));
    }
}

/// One row of the settings form, tracking the edit cursor column.
struct FormLine<'c> {
    spans: Vec<Span<'static>>,
    width: usize,
    cursor: Option<usize>,
    colors: &'c ThemeColors,
}

impl<'c> FormLine<'c> {
    fn new(colors: &'c ThemeColors) -> Self {
        Self {
            spans: Vec::new(),
            width: 0,
            cursor: None,
            colors,
        }
    }

    fn push(&mut self, text: String, style: Style) {
        self.width += text.width();
        self.spans.push(Span::styled(text, style));
    }

    fn caption(&mut self, text: String) {
        self.push(text, Style::default().fg(self.colors.label));
    }

    fn value(&mut self, text: String) {
        self.push(text, Style::default().fg(self.colors.value));
    }

    fn field(&mut self, app: &App, field: Field) {
        if app.focus == Focus::Editing(field) {
            self.cursor = Some(self.width + 1 + app.field_input.cursor_column());
            let style = Style::default()
                .fg(self.colors.cursor_fg)
                .bg(self.colors.cursor_bg);
            self.push(format!("[{}]", app.field_input.text), style);
            return;
        }

        let value = app.field_value(field);
        if value.is_empty() {
            self.push(format!("[{}]", placeholder(field)), Style::default().fg(self.colors.muted));
        } else {
            self.push(format!("[{}]", value), Style::default().fg(self.colors.value));
        }
    }
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::RangeMin(_) | Field::RangeMax(_) => "auto",
        Field::Label(axis) => axis.letter(),
        Field::RotationX => crate::script::DEFAULT_ROT_X,
        Field::RotationZ => crate::script::DEFAULT_ROT_Z,
        Field::Expression => "",
    }
}
