use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table},
};

use crate::model::{Model, Tone, UIData, ViewKind};

pub const TITLE_HEIGHT: u16 = 3;
pub const PROMPT_HEIGHT: u16 = 3;
const PROMPT_SEPARATOR: &str = ": ";

#[derive(Debug, Default)]
pub struct TableUI;

impl TableUI {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [title_area, table_area, hint_area, status_area, prompt_area] = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(PROMPT_HEIGHT),
        ])
        .areas(frame.area());

        self.draw_title(uidata, frame, title_area);
        self.draw_table(uidata, frame, table_area);

        frame.render_widget(
            Paragraph::new(Line::from(uidata.hint.as_str().dim()).right_aligned()),
            hint_area,
        );
        if let Some(status) = &uidata.status {
            let color = match status.tone {
                Tone::Success => Color::Green,
                Tone::Error => Color::Red,
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    status.text.as_str(),
                    Style::new().fg(color).add_modifier(Modifier::BOLD),
                ))),
                status_area,
            );
        }
        self.draw_prompt(uidata, frame, prompt_area);
    }

    fn draw_title(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let color = match uidata.kind {
            ViewKind::Groups => Color::Cyan,
            ViewKind::Files => Color::Yellow,
        };
        let title = Span::styled(
            uidata.title.as_str(),
            Style::new().fg(color).add_modifier(Modifier::BOLD),
        );
        let block = Block::bordered()
            .border_set(border::THICK)
            .border_style(Style::new().fg(color));
        frame.render_widget(
            Paragraph::new(Line::from(title)).centered().block(block),
            area,
        );
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header_style = match uidata.kind {
            ViewKind::Groups => Style::new().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ViewKind::Files => Style::new().fg(Color::Green).add_modifier(Modifier::BOLD),
        };
        let widths: Vec<Constraint> = match uidata.kind {
            ViewKind::Groups => vec![Constraint::Fill(1)],
            ViewKind::Files => vec![Constraint::Percentage(50), Constraint::Percentage(50)],
        };

        let header = Row::new(
            uidata
                .headers
                .iter()
                .map(|h| Cell::from(Line::from(h.as_str()).right_aligned())),
        )
        .style(header_style);

        let rows = uidata.rows.iter().map(|row| {
            let cells = row
                .cells
                .iter()
                .map(|c| Cell::from(Line::from(c.as_str()).right_aligned()));
            let ui_row = Row::new(cells);
            if row.annotation {
                ui_row.style(Style::new().add_modifier(Modifier::DIM))
            } else {
                ui_row
            }
        });

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(2)
            .block(Block::bordered());
        frame.render_widget(table, area);
    }

    fn draw_prompt(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let input = &uidata.cmdinput;
        let prompt = Span::styled(uidata.prompt.as_str(), Style::new().add_modifier(Modifier::BOLD));
        let line = Line::from(vec![
            prompt.clone(),
            Span::raw(PROMPT_SEPARATOR),
            Span::raw(input.input.as_str()),
        ]);
        frame.render_widget(Paragraph::new(line).block(Block::bordered()), area);

        let before_cursor: String = input.input.chars().take(input.cursor_pos).collect();
        let offset = prompt.width() + PROMPT_SEPARATOR.len() + Span::raw(before_cursor).width();
        frame.set_cursor_position((cursor_x(area, offset), area.y + 1));
    }
}

/// Cursor column inside a bordered box, clamped to its last inner cell.
fn cursor_x(area: Rect, offset: usize) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(offset);
    let max_x = area.x.saturating_add(area.width.saturating_sub(2));
    x.min(max_x)
}
