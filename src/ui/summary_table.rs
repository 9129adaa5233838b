use gomi_quiz::item::AnsweredEntry;
use std::rc::Rc;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HEADERS: [&str; 5] = ["#", "品名", "あなたの回答", "正解（詳細）", "結果"];

/// Pure presenter for a single answer row
pub fn present_row(index: usize, entry: &AnsweredEntry) -> Row<'static> {
    let (mark, color) = if entry.result {
        ("〇", Color::Green)
    } else {
        ("×", Color::Red)
    };

    Row::new(vec![
        Cell::from((index + 1).to_string()),
        Cell::from(entry.item.clone()),
        Cell::from(entry.user.clone()),
        Cell::from(entry.full.clone()),
        Cell::from(mark).style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

/// Display width of each column, wide enough for its header and every row.
pub fn column_widths(rows: &[AnsweredEntry]) -> [u16; 5] {
    let mut widths = HEADERS.map(|h| h.width() as u16);
    widths[0] = widths[0].max(rows.len().to_string().len() as u16);
    for entry in rows {
        widths[1] = widths[1].max(entry.item.width() as u16);
        widths[2] = widths[2].max(entry.user.width() as u16);
        widths[3] = widths[3].max(entry.full.width() as u16);
    }
    widths
}

fn summary_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // headline
            Constraint::Min(0),    // answers table
            Constraint::Length(3), // instructions
        ])
        .split(area)
}

/// Number of answer rows that fit in the table for a screen of `area`.
pub fn table_height(area: Rect) -> usize {
    // borders and header
    summary_layout(area)[1].height.saturating_sub(3) as usize
}

pub fn render_summary(app: &App, f: &mut Frame) {
    let view = app.view();
    let Some(summary) = view.summary.as_ref() else {
        return;
    };

    let chunks = summary_layout(f.area());

    let headline = Paragraph::new(summary.headline())
        .block(Block::default().borders(Borders::ALL).title("ゲーム終了！"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    if summary.rows.is_empty() {
        let no_data = Paragraph::new("回答した問題はありません。")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height = table_height(f.area());
        let total_rows = summary.rows.len();
        let offset = view.summary_scroll.min(total_rows.saturating_sub(table_height));

        let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows: Vec<Row> = summary
            .rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(table_height)
            .map(|(i, entry)| present_row(i, entry))
            .collect();

        let scroll_info = if total_rows > table_height {
            format!(
                " ({}/{})",
                offset + visible_rows.len().min(table_height),
                total_rows
            )
        } else {
            String::new()
        };

        let widths = column_widths(&summary.rows).map(Constraint::Length);
        let table = Table::new(visible_rows, widths)
            .header(header)
            .column_spacing(2)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("回答一覧{}", scroll_info)),
            );
        f.render_widget(table, chunks[1]);
    }

    let legend = if app.share_available() {
        "(r) スタート画面に戻る / (t) 結果をシェア / ↑↓ PgUp/PgDn / (esc)ape"
    } else {
        "(r) スタート画面に戻る / ↑↓ PgUp/PgDn / (esc)ape"
    };
    let instructions = Paragraph::new(legend)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}
