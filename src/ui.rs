pub mod summary_table;

use gomi_quiz::{
    item::CHOICES,
    view::{QuizView, ViewScreen},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
    Frame,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub fn draw(app: &App, f: &mut Frame) {
    match app.view().screen() {
        ViewScreen::Summary => summary_table::render_summary(app, f),
        _ => f.render_widget(app, f.area()),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.view();
        match view.screen() {
            ViewScreen::Intro => render_intro(self, area, buf),
            ViewScreen::Loading => {
                let loading = Paragraph::new(Span::styled(
                    "問題を読み込み中…",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Center);
                loading.render(centered_line(area), buf);
            }
            ViewScreen::Question => render_question(self, view, area, buf),
            // drawn by summary_table with a Frame
            ViewScreen::Summary => {}
        }
    }
}

fn centered_line(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    }
}

fn render_intro(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(2), // title
            Constraint::Length(3), // rules
            Constraint::Length(2), // alert
            Constraint::Length(1), // legend
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        app.config.title.clone(),
        bold_style.fg(Color::Green),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let rules = format!(
        "{}秒以内に、表示されたごみをどの分別に出すか答えてください。\n最大{}問 / 出題元: {}",
        app.config.time_limit_secs, app.config.question_limit, app.source_kind
    );
    Paragraph::new(rules)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    if let Some(alert) = &app.view().alert {
        Paragraph::new(Span::styled(alert.clone(), bold_style.fg(Color::Red)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);
    }

    Paragraph::new(Span::styled("(enter) スタート / (esc)ape", italic_style))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn render_question(app: &App, view: &QuizView, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // timer and score
            Constraint::Min(0),
            Constraint::Length(2), // question
            Constraint::Length(2), // choices
            Constraint::Length(1), // result
            Constraint::Length(1), // note
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let timer_style = if view.timer <= 10 {
        red_bold_style
    } else {
        dim_bold_style
    };
    Paragraph::new(Line::from(vec![
        Span::styled(format!("残り時間: {}秒", view.timer.max(0)), timer_style),
        Span::raw("   "),
        Span::styled(format!("正解数: {}", app.session.score()), dim_bold_style),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    if let Some(question) = &view.question {
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Q{} / {}", question.number, question.total),
                dim_bold_style,
            )),
            Line::from(Span::styled(question.prompt(), bold_style)),
        ])
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }

    let mut buttons = Vec::with_capacity(CHOICES.len() * 2);
    for (idx, label) in CHOICES.iter().enumerate() {
        let style = if !view.controls_enabled {
            Style::default().add_modifier(Modifier::DIM)
        } else if idx == view.selected {
            bold_style.fg(Color::Black).bg(Color::Cyan)
        } else {
            bold_style
        };
        buttons.push(Span::styled(format!(" {} {} ", idx + 1, label), style));
        buttons.push(Span::raw(" "));
    }
    Paragraph::new(Line::from(buttons))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    if let Some(result) = &view.result {
        let style = if result.correct {
            green_bold_style
        } else {
            red_bold_style
        };
        Paragraph::new(Span::styled(result.text.clone(), style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        if let Some(note) = &result.note {
            Paragraph::new(Span::styled(format!("※ {}", note), italic_style))
                .alignment(Alignment::Center)
                .render(chunks[5], buf);
        }
    }

    Paragraph::new(Span::styled(
        "(1-5) 回答 / (←→) 選択 / (enter) 決定 / (esc)ape",
        italic_style,
    ))
    .render(chunks[7], buf);
}
