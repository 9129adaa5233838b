use crate::item::CHOICES;
use crate::presentation::{DisplayCommand, PresentationSink};
use crate::summary::Summary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionLine {
    pub number: usize,
    pub total: usize,
    pub item: String,
}

impl QuestionLine {
    pub fn prompt(&self) -> String {
        format!("「{}」はどのごみ？", self.item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub text: String,
    pub correct: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewScreen {
    Intro,
    Loading,
    Question,
    Summary,
}

/// Everything the terminal UI needs to draw, kept up to date from the
/// session's display commands.
#[derive(Debug, Clone)]
pub struct QuizView {
    pub intro_visible: bool,
    pub timer: i64,
    pub question: Option<QuestionLine>,
    pub result: Option<ResultLine>,
    pub controls_enabled: bool,
    pub summary: Option<Summary>,
    pub alert: Option<String>,
    pub selected: usize,
    pub summary_scroll: usize,
    /// answer rows the summary table can show at once, 0 until first drawn
    pub summary_viewport: usize,
}

impl Default for QuizView {
    fn default() -> Self {
        Self {
            intro_visible: true,
            timer: 0,
            question: None,
            result: None,
            controls_enabled: false,
            summary: None,
            alert: None,
            selected: 0,
            summary_scroll: 0,
            summary_viewport: 0,
        }
    }
}

impl QuizView {
    pub fn screen(&self) -> ViewScreen {
        if self.summary.is_some() {
            ViewScreen::Summary
        } else if self.intro_visible {
            ViewScreen::Intro
        } else if self.question.is_some() {
            ViewScreen::Question
        } else {
            ViewScreen::Loading
        }
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % CHOICES.len();
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + CHOICES.len() - 1) % CHOICES.len();
    }

    pub fn selected_choice(&self) -> &'static str {
        CHOICES[self.selected]
    }

    fn max_scroll(&self) -> usize {
        let rows = self.summary.as_ref().map_or(0, |s| s.rows.len());
        rows.saturating_sub(self.summary_viewport.max(1))
    }

    pub fn scroll_down(&mut self, by: usize) {
        self.summary_scroll = (self.summary_scroll + by).min(self.max_scroll());
    }

    /// Record how many rows the last draw showed and pull the scroll back
    /// so the final page stays full.
    pub fn set_summary_viewport(&mut self, rows: usize) {
        self.summary_viewport = rows;
        self.summary_scroll = self.summary_scroll.min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, by: usize) {
        self.summary_scroll = self.summary_scroll.saturating_sub(by);
    }
}

impl PresentationSink for QuizView {
    fn display(&mut self, command: DisplayCommand) {
        match command {
            DisplayCommand::SetIntroVisible(visible) => {
                self.intro_visible = visible;
                if visible {
                    self.question = None;
                    self.result = None;
                    self.summary = None;
                    self.controls_enabled = false;
                } else {
                    self.alert = None;
                }
            }
            DisplayCommand::UpdateTimer(secs) => self.timer = secs,
            DisplayCommand::ShowQuestion {
                number,
                total,
                item,
            } => {
                self.question = Some(QuestionLine {
                    number,
                    total,
                    item,
                });
                self.summary = None;
            }
            DisplayCommand::ClearResult => self.result = None,
            DisplayCommand::ShowResult {
                text,
                correct,
                note,
            } => self.result = Some(ResultLine { text, correct, note }),
            DisplayCommand::SetAnswerControls(enabled) => self.controls_enabled = enabled,
            DisplayCommand::ShowSummary(summary) => {
                self.question = None;
                self.result = None;
                self.controls_enabled = false;
                self.summary_scroll = 0;
                self.summary = Some(summary);
            }
            DisplayCommand::Alert(message) => self.alert = Some(message),
        }
    }
}
