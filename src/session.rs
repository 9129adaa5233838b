use std::time::{Duration, Instant};

use crate::countdown::Countdown;
use crate::item::{AnsweredEntry, QuizItem};
use crate::summary::Summary;

pub const DEFAULT_QUESTION_LIMIT: usize = 100;
pub const DEFAULT_TIME_LIMIT_SECS: i64 = 60;
pub const DEFAULT_RESULT_DELAY_MS: u64 = 500;
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub question_limit: usize,
    pub time_limit_secs: i64,
    pub result_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            question_limit: DEFAULT_QUESTION_LIMIT,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            result_delay: Duration::from_millis(DEFAULT_RESULT_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Loading,
    Running,
    Finished,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: Phase,
    pub generation: u64,
    pub quiz_data: Vec<QuizItem>,
    pub current_index: usize,
    pub score: usize,
    pub time_left: i64,
    pub answered: Vec<AnsweredEntry>,
    pub countdown: Countdown,
    // Deadline for showing the next question after a result pause
    pub advance_at: Option<Instant>,
    pub controls_enabled: bool,
    pub summary: Option<Summary>,
}

impl SessionState {
    pub fn new(time_limit_secs: i64) -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            quiz_data: Vec::new(),
            current_index: 0,
            score: 0,
            time_left: time_limit_secs,
            answered: Vec::new(),
            countdown: Countdown::new(COUNTDOWN_PERIOD),
            advance_at: None,
            controls_enabled: false,
            summary: None,
        }
    }

    /// Zero the per-session counters; the generation survives.
    pub fn clear(&mut self, time_limit_secs: i64) {
        self.countdown.cancel();
        self.advance_at = None;
        self.controls_enabled = false;
        self.quiz_data.clear();
        self.current_index = 0;
        self.score = 0;
        self.time_left = time_limit_secs;
        self.answered.clear();
        self.summary = None;
    }

    pub fn current_item(&self) -> Option<&QuizItem> {
        self.quiz_data.get(self.current_index)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_LIMIT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = SessionState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.time_left, 60);
        assert!(!state.countdown.is_running());
        assert!(state.current_item().is_none());
    }

    #[test]
    fn clear_keeps_generation() {
        let mut state = SessionState::new(30);
        state.generation = 4;
        state.score = 3;
        state.quiz_data.push(QuizItem::new("瓶", "資源ごみ"));
        state.countdown.start(Instant::now());

        state.clear(45);

        assert_eq!(state.generation, 4);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_left, 45);
        assert!(state.quiz_data.is_empty());
        assert!(!state.countdown.is_running());
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Running.to_string(), "Running");
    }
}
