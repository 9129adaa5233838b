use crate::item::AnsweredEntry;

/// End-of-game results as shown on the summary screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub score: usize,
    pub accuracy: u32,
    pub rows: Vec<AnsweredEntry>,
}

impl Summary {
    pub fn from_answers(score: usize, answered: &[AnsweredEntry]) -> Self {
        let total = answered.len();
        Self {
            total,
            score,
            accuracy: accuracy(score, total),
            rows: answered.to_vec(),
        }
    }

    pub fn wrong_answers(&self) -> impl Iterator<Item = &AnsweredEntry> {
        self.rows.iter().filter(|e| !e.result)
    }

    /// One-line headline, e.g. `解答数：3 問 ／ 正解数：2 問 ／ 正解率：67%`.
    pub fn headline(&self) -> String {
        format!(
            "解答数：{} 問 ／ 正解数：{} 問 ／ 正解率：{}%",
            self.total, self.score, self.accuracy
        )
    }
}

/// Percentage of correct answers rounded half away from zero; 0 for no answers.
pub fn accuracy(score: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(result: bool) -> AnsweredEntry {
        AnsweredEntry {
            item: "缶".into(),
            correct: "資源ごみ".into(),
            full: "資源ごみ(缶)".into(),
            user: if result { "資源ごみ" } else { "燃やすごみ" }.into(),
            result,
        }
    }

    #[test]
    fn test_accuracy_zero_total() {
        assert_eq!(accuracy(0, 0), 0);
    }

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy(1, 1), 100);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(1, 8), 13);
        assert_eq!(accuracy(0, 5), 0);
    }

    #[test]
    fn test_summary_from_answers() {
        let answered = vec![entry(true), entry(false), entry(true)];
        let summary = Summary::from_answers(2, &answered);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.score, 2);
        assert_eq!(summary.accuracy, 67);
        assert_eq!(summary.wrong_answers().count(), 1);
        assert_eq!(summary.headline(), "解答数：3 問 ／ 正解数：2 問 ／ 正解率：67%");
    }
}
