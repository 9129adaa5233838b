use std::io;

use itertools::Itertools;
use url::Url;
use webbrowser::Browser;

use crate::item::AnsweredEntry;

pub const DEFAULT_TITLE: &str = "平泉町ごみ分別クイズ";
pub const HASHTAG: &str = "#ごみ分別クイズ";
pub const SHARE_INTENT_URL: &str = "https://twitter.com/intent/tweet";

const DETAIL_LIMIT: usize = 100;
const DETAIL_KEEP: usize = 97;

/// Comma-joined list of the wrong answers, capped at [`DETAIL_LIMIT`] characters.
pub fn wrong_answer_detail<'a>(answered: impl IntoIterator<Item = &'a AnsweredEntry>) -> String {
    let detail = answered
        .into_iter()
        .filter(|e| !e.result)
        .map(|e| format!("「{}」は{}", e.item, e.full))
        .join("、");

    if detail.chars().count() > DETAIL_LIMIT {
        let mut cut: String = detail.chars().take(DETAIL_KEEP).collect();
        cut.push('…');
        cut
    } else {
        detail
    }
}

pub fn share_message(
    title: &str,
    score: usize,
    total: usize,
    accuracy: u32,
    answered: &[AnsweredEntry],
) -> String {
    let detail = wrong_answer_detail(answered);
    let detail = if detail.is_empty() {
        String::new()
    } else {
        format!("{}。\n", detail)
    };

    format!(
        "{}\n正解数：{}/{}問（正解率：{}%）\n{}{}",
        title, score, total, accuracy, detail, HASHTAG
    )
}

/// Share-intent link carrying the message and the quiz page address.
pub fn share_url(message: &str, page_url: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(SHARE_INTENT_URL, &[("text", message), ("url", page_url)])
}

/// Opens an external composition flow for a share link.
pub trait Sharer {
    fn is_available(&self) -> bool {
        true
    }

    fn share(&self, url: &Url) -> io::Result<()>;
}

/// Hands share links to the system web browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSharer;

impl Sharer for BrowserSharer {
    fn is_available(&self) -> bool {
        Browser::is_available()
    }

    fn share(&self, url: &Url) -> io::Result<()> {
        webbrowser::open(url.as_str())
    }
}
