//! Function list and graph pane.

use crate::app::App;
use crate::script::Mode;
use crate::ui::{line_color, ThemeColors};
use image::imageops::FilterType;
use image::DynamicImage;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use ratatui_image::StatefulImage;

/// Draw the 2D function list, or the active surface on the 3D tab.
pub(super) fn draw_functions(f: &mut Frame<'_>, app: &App, area: Rect, colors: &ThemeColors) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .style(Style::default().bg(colors.bg));

    match app.tab() {
        Mode::TwoD => {
            let entries = app.session.entries();
            if entries.is_empty() {
                let hint = Paragraph::new("No functions yet.\n\na: add one\ne: load an example")
                    .style(Style::default().fg(colors.muted))
                    .block(block.title(" Functions "));
                f.render_widget(hint, area);
                return;
            }

            let items: Vec<ListItem<'_>> = entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| {
                    let (marker, text_style) = if entry.visible {
                        ("● ", Style::default().fg(colors.text))
                    } else {
                        ("○ ", Style::default().fg(colors.muted).add_modifier(Modifier::CROSSED_OUT))
                    };
                    let line = Line::from(vec![
                        Span::styled(marker, Style::default().fg(line_color(entry.color))),
                        Span::styled(format!("y = {}", entry.expression), text_style),
                    ]);

                    let item = ListItem::new(line);
                    if idx == app.selected {
                        item.style(Style::default().bg(colors.status_bg).add_modifier(Modifier::BOLD))
                    } else {
                        item
                    }
                })
                .collect();

            let title = format!(" Functions ({}) ", entries.len());
            f.render_widget(List::new(items).block(block.title(title)), area);
        },
        Mode::ThreeD => {
            let lines = match app.session.active_function() {
                Some(expression) => vec![
                    Line::from(Span::styled("z =", Style::default().fg(colors.label))),
                    Line::from(Span::styled(expression.to_string(), Style::default().fg(colors.value))),
                    Line::default(),
                    Line::from(vec![
                        Span::styled("view ", Style::default().fg(colors.label)),
                        Span::styled(app.session.rotation().view(), Style::default().fg(colors.value)),
                    ]),
                ],
                None => vec![Line::from(Span::styled(
                    "No surface yet.",
                    Style::default().fg(colors.muted),
                ))],
            };
            let paragraph = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(block.title(" Surface "));
            f.render_widget(paragraph, area);
        },
    }
}

/// Draw the rendered image of the current tab.
pub(super) fn draw_graph(f: &mut Frame<'_>, app: &mut App, area: Rect, colors: &ThemeColors) {
    let mode = app.tab();
    let title = if app.is_rendering() {
        format!(" {} (plotting) ", mode.title())
    } else {
        format!(" {} ", mode.title())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .style(Style::default().bg(colors.bg));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let picker = app.picker.clone();
    let view = app.view_mut(mode);
    let Some(image) = view.image.as_ref() else {
        let hint = match mode {
            Mode::TwoD => "Add a function to see the graph",
            Mode::ThreeD => "Enter a 3D function to see the surface",
        };
        f.render_widget(
            Paragraph::new(hint).style(Style::default().fg(colors.muted)),
            inner,
        );
        return;
    };

    match picker {
        Some(picker) => {
            if view.protocol.is_none() {
                view.protocol = Some(picker.new_resize_protocol(image.clone()));
            }
            if let Some(protocol) = view.protocol.as_mut() {
                f.render_stateful_widget(StatefulImage::default(), inner, protocol);
            }
        },
        None => draw_halfblocks(f, image, inner),
    }
}

/// Draw an image with upper-half-block cells, two pixels per cell.
fn draw_halfblocks(f: &mut Frame<'_>, image: &DynamicImage, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let (max_width, max_height) = (area.width as u32, area.height as u32 * 2);
    let scaled = if image.width() <= max_width && image.height() <= max_height {
        image.to_rgb8()
    } else {
        image.resize(max_width, max_height, FilterType::Triangle).into_rgb8()
    };
    let (width, height) = scaled.dimensions();
    let rows = height.div_ceil(2);
    let left = area.x + ((area.width as u32 - width) / 2) as u16;
    let top = area.y + ((area.height as u32 - rows) / 2) as u16;

    let buf = f.buffer_mut();
    for row in 0..rows {
        for col in 0..width {
            let upper = scaled.get_pixel(col, row * 2);
            let lower = if row * 2 + 1 < height {
                scaled.get_pixel(col, row * 2 + 1)
            } else {
                upper
            };
            if let Some(cell) = buf.cell_mut((left + col as u16, top + row as u16)) {
                cell.set_char('▀')
                    .set_fg(Color::Rgb(upper[0], upper[1], upper[2]))
                    .set_bg(Color::Rgb(lower[0], lower[1], lower[2]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn halfblocks_pack_two_rows_per_cell() {
        let mut img = image::RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        img.put_pixel(1, 1, image::Rgb([0, 0, 255]));
        let image = DynamicImage::ImageRgb8(img);

        let mut terminal = Terminal::new(TestBackend::new(2, 1)).unwrap();
        terminal
            .draw(|f| draw_halfblocks(f, &image, Rect::new(0, 0, 2, 1)))
            .unwrap();

        let cell = &terminal.backend().buffer()[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }
}
