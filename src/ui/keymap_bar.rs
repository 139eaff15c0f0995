//! Keymap help bar UI component.

use crate::app::{Field, Focus};
use crate::script::Mode;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the keymap help bar.
pub fn draw_keymap(f: &mut Frame<'_>, area: Rect, focus: Focus, tab: Mode, colors: &ThemeColors) {
    let keymap_text = match (focus, tab) {
        (Focus::Editing(Field::Expression), Mode::TwoD) => "Enter:add | Tab:next field | Esc:done",
        (Focus::Editing(Field::Expression), Mode::ThreeD) => "Enter:plot | Tab:next field | Esc:done",
        (Focus::Editing(_), _) => "Enter:apply | Tab/S-Tab:next/prev field | Esc:cancel",
        (Focus::Normal, Mode::TwoD) => {
            "q:quit | 1/2:tab | a:add | f:fields | jk:select | space:show/hide | d:remove | e:example | g:grid | r:refresh | s:save | y:copy | T:theme"
        },
        (Focus::Normal, Mode::ThreeD) => {
            "q:quit | 1/2:tab | a:function | f:fields | e:example | g:grid | p:palette | r:refresh | s:save | y:copy | T:theme"
        },
    };

    let paragraph = Paragraph::new(keymap_text).style(Style::default().fg(colors.muted).bg(colors.bg));

    f.render_widget(paragraph, area);
}
