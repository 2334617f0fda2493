//! Key extractors: pure `Record -> keys` functions, one per statistic.
//!
//! Extractors never fail. A record lacking the field they need yields no keys, which keeps
//! decode problems out of the aggregation core.

use crate::decode::Record;
use regex::Regex;
use std::sync::OnceLock;
use time::Date;

pub trait KeyExtractor {
    type Key<'r>;

    /// Keys contributed by `record`, in the order they appear in it.
    fn keys<'r>(&self, record: &'r Record) -> Vec<Self::Key<'r>>;
}

/// `(date, author)` for records carrying both; nothing otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateAuthorKeys;

impl KeyExtractor for DateAuthorKeys {
    type Key<'r> = (Date, &'r str);

    fn keys<'r>(&self, record: &'r Record) -> Vec<Self::Key<'r>> {
        match (record.occurred_on, record.author.as_deref()) {
            (Some(d), Some(a)) if !a.is_empty() => vec![(d, a)],
            _ => Vec::new(),
        }
    }
}

/// Every emoji glyph in the post body.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmojiKeys;

impl KeyExtractor for EmojiKeys {
    type Key<'r> = &'r str;

    fn keys<'r>(&self, record: &'r Record) -> Vec<Self::Key<'r>> {
        match record.body.as_deref() {
            Some(body) => emoji_glyphs(body).collect(),
            None => Vec::new(),
        }
    }
}

/// Every mentioned handle.
#[derive(Clone, Copy, Debug, Default)]
pub struct MentionKeys;

impl KeyExtractor for MentionKeys {
    type Key<'r> = &'r str;

    fn keys<'r>(&self, record: &'r Record) -> Vec<Self::Key<'r>> {
        record.mentions.iter().map(String::as_str).filter(|s| !s.is_empty()).collect()
    }
}

static EMOJI_RE: OnceLock<Regex> = OnceLock::new();

fn emoji_regex() -> &'static Regex {
    EMOJI_RE.get_or_init(|| {
        // pictograph, optional VS16, then any ZWJ-joined pictographs (each with optional VS16)
        Regex::new(
            r"[\p{Emoji_Presentation}\p{Extended_Pictographic}]\x{FE0F}?(?:\x{200D}[\p{Emoji_Presentation}\p{Extended_Pictographic}]\x{FE0F}?)*",
        )
        .expect("emoji pattern is valid")
    })
}

/// Emoji glyphs in `text`, left to right. ZWJ sequences come back as one glyph.
pub fn emoji_glyphs(text: &str) -> impl Iterator<Item = &str> + '_ {
    emoji_regex().find_iter(text).map(|m| m.as_str())
}
