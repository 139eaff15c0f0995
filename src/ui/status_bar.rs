//! Status bar UI component.

use crate::ui::ThemeColors;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Draw the status bar. A spinner glyph is shown while work is outstanding.
pub fn draw_status(f: &mut Frame<'_>, area: Rect, status: &str, busy: bool, colors: &ThemeColors) {
    let base = Style::default().fg(colors.status_fg).bg(colors.status_bg);
    let mut spans = Vec::with_capacity(2);
    if busy {
        spans.push(Span::styled("⟳ ", base.fg(colors.warning)));
    }
    let message_style = if is_failure(status) {
        base.fg(colors.error)
    } else {
        base
    };
    spans.push(Span::styled(status.to_string(), message_style));

    f.render_widget(Paragraph::new(Line::from(spans)).style(base), area);
}

fn is_failure(status: &str) -> bool {
    ["failed", "Failed", "Error", "not found", "not generated", "disappeared"]
        .iter()
        .any(|needle| status.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_recognised() {
        assert!(is_failure("Gnuplot failed. Check your function syntax."));
        assert!(is_failure("Graph disappeared. Generate it again."));
        assert!(!is_failure("Graph copied to clipboard!"));
    }
}
