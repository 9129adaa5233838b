use std::time::Instant;

use url::Url;

use crate::error::FetchError;
use crate::item::{normalize_choice, AnsweredEntry, QuizItem};
use crate::presentation::{DisplayCommand, PresentationSink};
use crate::session::{Phase, SessionConfig, SessionState};
use crate::share::{share_message, share_url};
use crate::source::QuestionSource;
use crate::summary::Summary;

/// Handle for one in-flight question request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Started,
    /// The response belonged to an earlier `start` and was dropped.
    Stale,
}

/// Quiz session controller: owns the question list, the score, the countdown
/// and the answer log, and tells its sink what to show.
#[derive(Debug)]
pub struct QuizSession<S: PresentationSink> {
    pub config: SessionConfig,
    state: SessionState,
    sink: S,
}

impl<S: PresentationSink> QuizSession<S> {
    pub fn new(config: SessionConfig, sink: S) -> Self {
        let state = SessionState::new(config.time_limit_secs);
        Self {
            config,
            state,
            sink,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn score(&self) -> usize {
        self.state.score
    }

    pub fn time_left(&self) -> i64 {
        self.state.time_left
    }

    pub fn answered(&self) -> &[AnsweredEntry] {
        &self.state.answered
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.state.summary.as_ref()
    }

    pub fn accepts_answers(&self) -> bool {
        self.state.phase == Phase::Running
            && self.state.controls_enabled
            && self.state.current_index < self.state.quiz_data.len()
    }

    /// Reset counters and enter `Loading`. The returned ticket must be passed
    /// back to [`finish_start`](Self::finish_start) with the fetch result.
    pub fn begin_start(&mut self) -> FetchTicket {
        self.state.clear(self.config.time_limit_secs);
        self.state.generation += 1;
        self.state.phase = Phase::Loading;

        self.sink.display(DisplayCommand::SetIntroVisible(false));
        self.sink.display(DisplayCommand::UpdateTimer(self.state.time_left));

        tracing::info!(generation = self.state.generation, "session loading");
        FetchTicket {
            generation: self.state.generation,
            limit: self.config.question_limit,
        }
    }

    pub fn finish_start(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<QuizItem>, FetchError>,
        now: Instant,
    ) -> Result<LoadOutcome, FetchError> {
        if ticket.generation != self.state.generation || self.state.phase != Phase::Loading {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.state.generation,
                "discarding stale question response"
            );
            return Ok(LoadOutcome::Stale);
        }

        let items = match result {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(error = %err, "could not load questions");
                self.state.clear(self.config.time_limit_secs);
                self.state.phase = Phase::Idle;
                self.sink.display(DisplayCommand::Alert(err.user_notice().to_string()));
                self.sink.display(DisplayCommand::SetIntroVisible(true));
                return Err(err);
            }
        };

        tracing::info!(count = items.len(), "session running");
        self.state.quiz_data = items;
        self.state.phase = Phase::Running;
        self.show_current_question();

        // an empty list has already finished the game
        if self.state.phase == Phase::Running {
            self.state.countdown.cancel();
            self.state.countdown.start(now);
        }
        Ok(LoadOutcome::Started)
    }

    /// Fetch synchronously and start.
    pub fn start(
        &mut self,
        source: &dyn QuestionSource,
        now: Instant,
    ) -> Result<LoadOutcome, FetchError> {
        let ticket = self.begin_start();
        let result = source.fetch(ticket.limit);
        self.finish_start(ticket, result, now)
    }

    /// One second of the countdown.
    pub fn tick(&mut self) {
        if self.state.phase != Phase::Running {
            return;
        }

        self.state.time_left -= 1;
        self.sink.display(DisplayCommand::UpdateTimer(self.state.time_left));

        if self.state.time_left <= 0 {
            self.state.countdown.cancel();
            self.end_game();
        }
    }

    pub fn show_current_question(&mut self) {
        if self.state.phase != Phase::Running {
            return;
        }

        let total = self.state.quiz_data.len();
        let number = self.state.current_index + 1;
        let Some(item) = self.state.current_item() else {
            self.end_game();
            return;
        };
        let item = item.item.clone();

        self.sink.display(DisplayCommand::ShowQuestion {
            number,
            total,
            item,
        });
        self.sink.display(DisplayCommand::ClearResult);
        self.state.controls_enabled = true;
        self.sink.display(DisplayCommand::SetAnswerControls(true));
    }

    /// Score `choice` against the current question. Ignored unless a
    /// question is on screen and waiting for an answer.
    pub fn answer(&mut self, choice: &str, now: Instant) {
        if !self.accepts_answers() {
            tracing::debug!(choice, phase = %self.state.phase, "answer ignored");
            return;
        }
        let Some(current) = self.state.current_item() else {
            return;
        };

        let correct = current.category.clone();
        let full = current.full().to_string();
        let note = current.note.clone();
        let item = current.item.clone();
        let user = normalize_choice(choice).to_string();
        let result = user == correct;

        self.state.controls_enabled = false;
        self.sink.display(DisplayCommand::SetAnswerControls(false));

        let text = if result {
            self.state.score += 1;
            format!("✨正解！「{}」です✨", full)
        } else {
            format!("❌不正解。正しくは「{}」です。", full)
        };
        self.sink.display(DisplayCommand::ShowResult {
            text,
            correct: result,
            note,
        });

        tracing::debug!(%item, %user, %correct, result, "answered");
        self.state.answered.push(AnsweredEntry {
            item,
            correct,
            full,
            user,
            result,
        });
        self.state.current_index += 1;
        self.state.advance_at = Some(now + self.config.result_delay);
    }

    /// Deliver whatever timed work is due at `now`: countdown ticks and the
    /// pending next question, in deadline order.
    pub fn poll(&mut self, now: Instant) {
        while self.state.phase == Phase::Running {
            let tick_due = self.state.countdown.next_due().filter(|d| *d <= now);
            let advance_due = self.state.advance_at.filter(|d| *d <= now);

            match (tick_due, advance_due) {
                (Some(tick), Some(advance)) if advance < tick => self.advance(),
                (Some(_), _) => {
                    self.state.countdown.fire_if_due(now);
                    self.tick();
                }
                (None, Some(_)) => self.advance(),
                (None, None) => break,
            }
        }
    }

    fn advance(&mut self) {
        self.state.advance_at = None;
        self.show_current_question();
    }

    /// Finish the session and show the summary. Only the first call per
    /// session has any effect.
    pub fn end_game(&mut self) {
        if self.state.phase == Phase::Finished {
            return;
        }

        self.state.countdown.cancel();
        self.state.advance_at = None;
        self.state.controls_enabled = false;
        self.state.phase = Phase::Finished;

        let summary = Summary::from_answers(self.state.score, &self.state.answered);
        tracing::info!(
            total = summary.total,
            score = summary.score,
            accuracy = summary.accuracy,
            "session finished"
        );
        self.state.summary = Some(summary.clone());
        self.sink.display(DisplayCommand::ShowSummary(summary));
    }

    /// Drop the session and go back to the start screen.
    pub fn reset(&mut self) {
        self.state.clear(self.config.time_limit_secs);
        self.state.generation += 1;
        self.state.phase = Phase::Idle;
        self.sink.display(DisplayCommand::SetIntroVisible(true));
    }

    /// Share text for the finished session, or `None` before the end.
    pub fn share_text(&self, title: &str) -> Option<String> {
        let summary = self.state.summary.as_ref()?;
        Some(share_message(
            title,
            summary.score,
            summary.total,
            summary.accuracy,
            &summary.rows,
        ))
    }

    /// Share link for the finished session, pointing back at `page_url`.
    pub fn share_link(&self, title: &str, page_url: &str) -> Option<Url> {
        let text = self.share_text(title)?;
        match share_url(&text, page_url) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(error = %err, "could not build share link");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingSink;
    use crate::source::StaticQuestionSource;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn pet_bottle() -> QuizItem {
        QuizItem::new("ペットボトル", "プラスチック").with_full_category("プラスチック(容器)")
    }

    fn items(n: usize) -> Vec<QuizItem> {
        (0..n)
            .map(|i| QuizItem::new(format!("品目{}", i), "燃やすごみ"))
            .collect()
    }

    fn started(items: Vec<QuizItem>) -> (QuizSession<RecordingSink>, Instant) {
        let mut session = QuizSession::new(SessionConfig::default(), RecordingSink::new());
        let t0 = Instant::now();
        session
            .start(&StaticQuestionSource::new(items), t0)
            .unwrap();
        (session, t0)
    }

    fn assert_invariants(session: &QuizSession<RecordingSink>) {
        let correct = session.answered().iter().filter(|e| e.result).count();
        assert_eq!(session.score(), correct);
        if session.phase() == Phase::Running {
            assert_eq!(session.state().current_index, session.answered().len());
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = QuizSession::new(SessionConfig::default(), RecordingSink::new());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.time_left(), 60);
        assert!(!session.accepts_answers());
    }

    #[test]
    fn test_start_shows_first_question_and_arms_countdown() {
        let (session, t0) = started(items(3));

        assert_eq!(session.phase(), Phase::Running);
        assert!(session.state().countdown.is_running());
        assert_eq!(
            session.state().countdown.next_due(),
            Some(t0 + Duration::from_secs(1))
        );
        let cmds = &session.sink().commands;
        assert_eq!(cmds[0], DisplayCommand::SetIntroVisible(false));
        assert_eq!(cmds[1], DisplayCommand::UpdateTimer(60));
        assert_matches!(
            &cmds[2],
            DisplayCommand::ShowQuestion { number: 1, total: 3, item } if item == "品目0"
        );
        assert_eq!(cmds[3], DisplayCommand::ClearResult);
        assert_eq!(cmds[4], DisplayCommand::SetAnswerControls(true));
    }

    #[test]
    fn test_correct_answer_scores() {
        let (mut session, t0) = started(vec![pet_bottle()]);
        session.answer("プラスチック", t0);

        assert_eq!(session.score(), 1);
        assert_eq!(
            session.sink().last_result(),
            Some(("✨正解！「プラスチック(容器)」です✨", true))
        );
        assert_invariants(&session);

        session.poll(t0 + Duration::from_millis(500));
        assert_eq!(session.phase(), Phase::Finished);
        let summary = session.summary().unwrap();
        assert_eq!((summary.total, summary.score, summary.accuracy), (1, 1, 100));
    }

    #[test]
    fn test_recycle_label_is_normalized_but_still_wrong_bin() {
        let (mut session, t0) = started(vec![pet_bottle()]);
        session.answer("リサイクル", t0);

        assert_eq!(session.score(), 0);
        let entry = &session.answered()[0];
        assert_eq!(entry.user, "資源ごみ");
        assert!(!entry.result);
        assert_eq!(
            session.sink().last_result(),
            Some(("❌不正解。正しくは「プラスチック(容器)」です。", false))
        );
    }

    #[test]
    fn test_recycle_label_matches_canonical_bin() {
        let (mut session, t0) = started(vec![QuizItem::new("新聞紙", "資源ごみ")]);
        session.answer("リサイクル", t0);
        assert_eq!(session.score(), 1);
        assert!(session.answered()[0].result);
    }

    #[test]
    fn test_answer_compares_coarse_category_only() {
        let (mut session, t0) = started(vec![pet_bottle()]);
        session.answer("プラスチック(容器)", t0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_answer_ignored_during_result_pause() {
        let (mut session, t0) = started(items(3));
        session.answer("燃やすごみ", t0);
        session.answer("燃やすごみ", t0 + Duration::from_millis(100));

        assert_eq!(session.answered().len(), 1);
        assert_invariants(&session);

        session.poll(t0 + Duration::from_millis(499));
        assert!(!session.accepts_answers());
        session.poll(t0 + Duration::from_millis(500));
        assert!(session.accepts_answers());
        assert_matches!(
            session.sink().commands.iter().rev().find(|c| matches!(c, DisplayCommand::ShowQuestion { .. })),
            Some(DisplayCommand::ShowQuestion { number: 2, .. })
        );
    }

    #[test]
    fn test_answer_ignored_outside_running() {
        let mut session = QuizSession::new(SessionConfig::default(), RecordingSink::new());
        session.answer("燃やすごみ", Instant::now());
        assert!(session.answered().is_empty());

        let (mut session, t0) = started(items(1));
        session.answer("燃やすごみ", t0);
        session.poll(t0 + Duration::from_secs(1));
        assert_eq!(session.phase(), Phase::Finished);
        session.answer("燃やすごみ", t0 + Duration::from_secs(2));
        assert_eq!(session.answered().len(), 1);
    }

    #[test]
    fn test_invariants_hold_through_mixed_answers() {
        let (mut session, mut now) = started(items(6));
        for (i, choice) in ["燃やすごみ", "その他", "燃やすごみ", "粗大ごみ", "燃やすごみ"]
            .iter()
            .enumerate()
        {
            session.answer(choice, now);
            assert_invariants(&session);
            assert_eq!(session.answered().len(), i + 1);
            now += Duration::from_millis(500);
            session.poll(now);
            assert_invariants(&session);
        }
        assert_eq!(session.score(), 3);
    }

    #[test]
    fn test_timer_expiry_after_three_of_ten() {
        let (mut session, t0) = started(items(10));
        let mut now = t0;
        for _ in 0..3 {
            session.answer("燃やすごみ", now);
            now += Duration::from_millis(500);
            session.poll(now);
        }

        session.poll(t0 + Duration::from_secs(60));

        assert_eq!(session.phase(), Phase::Finished);
        assert_eq!(session.time_left(), 0);
        assert!(!session.state().countdown.is_running());
        let summary = session.summary().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(session.sink().summaries(), 1);
    }

    #[test]
    fn test_tick_counts_down_and_ends_once() {
        let (mut session, _) = started(items(2));
        for _ in 0..59 {
            session.tick();
        }
        assert_eq!(session.time_left(), 1);
        assert_eq!(session.phase(), Phase::Running);

        session.tick();
        assert_eq!(session.phase(), Phase::Finished);
        session.tick();
        assert_eq!(session.time_left(), 0);
        assert_eq!(session.sink().summaries(), 1);
    }

    #[test]
    fn test_end_game_is_idempotent() {
        let (mut session, t0) = started(items(2));
        session.answer("その他", t0);
        session.end_game();
        let first = session.sink().last_summary().cloned();
        session.end_game();
        session.poll(t0 + Duration::from_secs(120));

        assert_eq!(session.sink().summaries(), 1);
        assert_eq!(session.sink().last_summary().cloned(), first);
        assert_eq!(first.unwrap().accuracy, 0);
    }

    #[test]
    fn test_exhaustion_stops_countdown() {
        let (mut session, t0) = started(items(1));
        session.answer("燃やすごみ", t0);
        session.poll(t0 + Duration::from_millis(500));

        assert_eq!(session.phase(), Phase::Finished);
        assert!(!session.state().countdown.is_running());
        session.poll(t0 + Duration::from_secs(90));
        assert_eq!(session.sink().summaries(), 1);
    }

    #[test]
    fn test_empty_question_list_finishes_immediately() {
        let (session, _) = started(Vec::new());

        assert_eq!(session.phase(), Phase::Finished);
        assert!(!session.state().countdown.is_running());
        let summary = session.summary().unwrap();
        assert_eq!((summary.total, summary.score, summary.accuracy), (0, 0, 0));
    }

    struct FailingSource;

    impl QuestionSource for FailingSource {
        fn fetch(&self, _limit: usize) -> Result<Vec<QuizItem>, FetchError> {
            Err(FetchError::Dictionary("boom".into()))
        }
    }

    #[test]
    fn test_fetch_failure_returns_to_idle_with_alert() {
        let mut session = QuizSession::new(SessionConfig::default(), RecordingSink::new());
        let err = session.start(&FailingSource, Instant::now()).unwrap_err();

        assert_matches!(err, FetchError::Dictionary(_));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.state().quiz_data.is_empty());
        assert!(!session.state().countdown.is_running());
        assert!(session
            .sink()
            .commands
            .iter()
            .any(|c| matches!(c, DisplayCommand::Alert(_))));
        assert_eq!(
            session.sink().commands.last(),
            Some(&DisplayCommand::SetIntroVisible(true))
        );
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = QuizSession::new(SessionConfig::default(), RecordingSink::new());
        let t0 = Instant::now();
        let old = session.begin_start();
        let new = session.begin_start();
        assert!(new.generation > old.generation);

        let outcome = session.finish_start(old, Ok(items(5)), t0).unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(session.phase(), Phase::Loading);

        let outcome = session.finish_start(new, Ok(items(2)), t0).unwrap();
        assert_eq!(outcome, LoadOutcome::Started);
        assert_eq!(session.state().quiz_data.len(), 2);

        // a late duplicate for the live generation is ignored once running
        let outcome = session.finish_start(new, Ok(items(9)), t0).unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(session.state().quiz_data.len(), 2);
    }

    #[test]
    fn test_restart_cancels_previous_countdown() {
        let (mut session, t0) = started(items(3));
        session.tick();
        assert_eq!(session.time_left(), 59);

        let t1 = t0 + Duration::from_secs(5);
        session.start(&StaticQuestionSource::new(items(3)), t1).unwrap();
        assert_eq!(session.time_left(), 60);
        assert_eq!(
            session.state().countdown.next_due(),
            Some(t1 + Duration::from_secs(1))
        );
        assert!(session.answered().is_empty());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let (mut session, t0) = started(items(3));
        session.answer("燃やすごみ", t0);
        session.reset();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.answered().is_empty());
        assert!(session.state().advance_at.is_none());
        assert!(!session.state().countdown.is_running());
    }

    #[test]
    fn test_share_text_only_after_finish() {
        let (mut session, t0) = started(vec![pet_bottle()]);
        assert!(session.share_text("T").is_none());

        session.answer("燃やすごみ", t0);
        session.end_game();
        let text = session.share_text("T").unwrap();
        assert_eq!(
            text,
            "T\n正解数：0/1問（正解率：0%）\n「ペットボトル」はプラスチック(容器)。\n#ごみ分別クイズ"
        );

        let url = session.share_link("T", "http://localhost:8000/").unwrap();
        assert!(url.as_str().starts_with("https://twitter.com/intent/tweet?text="));
    }
}
