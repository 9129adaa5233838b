use crate::summary::Summary;

/// A fire-and-forget instruction for whatever is drawing the quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    SetIntroVisible(bool),
    UpdateTimer(i64),
    ShowQuestion {
        number: usize,
        total: usize,
        item: String,
    },
    ClearResult,
    ShowResult {
        text: String,
        correct: bool,
        note: Option<String>,
    },
    SetAnswerControls(bool),
    ShowSummary(Summary),
    Alert(String),
}

/// Receiver of display commands emitted by the session controller.
pub trait PresentationSink {
    fn display(&mut self, command: DisplayCommand);
}

/// Sink that just keeps every command, for headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub commands: Vec<DisplayCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_summary(&self) -> Option<&Summary> {
        self.commands.iter().rev().find_map(|c| match c {
            DisplayCommand::ShowSummary(s) => Some(s),
            _ => None,
        })
    }

    pub fn summaries(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DisplayCommand::ShowSummary(_)))
            .count()
    }

    pub fn last_result(&self) -> Option<(&str, bool)> {
        self.commands.iter().rev().find_map(|c| match c {
            DisplayCommand::ShowResult { text, correct, .. } => Some((text.as_str(), *correct)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl PresentationSink for RecordingSink {
    fn display(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }
}
