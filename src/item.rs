use serde::{Deserialize, Serialize};

/// Canonical name of the recyclable-resource bin.
pub const RECYCLABLE: &str = "資源ごみ";

/// Button label the player sees for the recyclable bin.
pub const RECYCLE_LABEL: &str = "リサイクル";

/// Coarse bins offered as answers, in on-screen order. The third entry is
/// a display label and goes through [`normalize_choice`] before comparison.
pub const CHOICES: [&str; 5] = ["燃やすごみ", "燃やせないごみ", RECYCLE_LABEL, "粗大ごみ", "その他"];

/// A single question as delivered by a question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    pub item: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl QuizItem {
    pub fn new(item: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            category: category.into(),
            full_category: None,
            note: None,
        }
    }

    pub fn with_full_category(mut self, full: impl Into<String>) -> Self {
        self.full_category = Some(full.into());
        self
    }

    /// Detailed bin, falling back to the coarse one.
    pub fn full(&self) -> &str {
        match self.full_category.as_deref() {
            Some(full) if !full.is_empty() => full,
            _ => &self.category,
        }
    }
}

/// Record of one answered question. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredEntry {
    pub item: String,
    pub correct: String,
    pub full: String,
    pub user: String,
    pub result: bool,
}

/// Map a button label onto the internal bin name.
pub fn normalize_choice(choice: &str) -> &str {
    if choice == RECYCLE_LABEL {
        RECYCLABLE
    } else {
        choice
    }
}

/// Collapse a detailed municipal category onto one of the coarse bins.
///
/// A parenthesised qualifier such as `資源ごみ(缶)` is ignored for matching.
pub fn coarse_category(detailed: &str) -> &'static str {
    let s = detailed
        .split(['(', '（'])
        .next()
        .unwrap_or_default()
        .trim();
    let s = match s {
        "燃えるごみ" | "可燃ごみ" | "もやすごみ" => "燃やすごみ",
        "燃やさないごみ" | "不燃ごみ" => "燃やせないごみ",
        "資源ゴミ" | "資源" | RECYCLE_LABEL => RECYCLABLE,
        other => other,
    };

    match s {
        "燃やすごみ" => "燃やすごみ",
        "燃やせないごみ" => "燃やせないごみ",
        RECYCLABLE => RECYCLABLE,
        "粗大ごみ" => "粗大ごみ",
        _ => "その他",
    }
}
