//! Line decoding: one NDJSON line -> a transient `Record`, or a tagged skip.
//!
//! Fields are located with JSON pointers (`FieldMap`) so datasets with a different layout
//! can be read without code changes. Each field is decoded independently: a record with a
//! broken `mentionedUsers` still counts toward the date and emoji statistics.

use crate::date::parse_post_date;
use serde_json::Value;
use time::Date;

/// JSON pointers for the fields the statistics consume.
/// Defaults match the archived tweet layout (`date`, `user.username`, `content`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMap {
    pub date: String,
    pub author: String,
    pub body: String,
    /// Used when `body` is absent, not a string, or empty.
    pub body_fallback: Option<String>,
    pub mentions: String,
    /// Key holding the handle inside each mention object.
    pub mention_handle: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            date: "/date".into(),
            author: "/user/username".into(),
            body: "/content".into(),
            body_fallback: Some("/renderedContent".into()),
            mentions: "/mentionedUsers".into(),
            mention_handle: "username".into(),
        }
    }
}

/// One decoded post. Only the fields the statistics need; never retained past its line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub occurred_on: Option<Date>,
    pub author: Option<String>,
    pub mentions: Vec<String>,
    pub body: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    Blank,
    InvalidUtf8,
    Malformed,
    NotAnObject,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Blank => "blank",
            SkipReason::InvalidUtf8 => "invalid utf-8",
            SkipReason::Malformed => "malformed json",
            SkipReason::NotAnObject => "not a json object",
        }
    }
}

/// Outcome of decoding one line. Skips are expected and never abort a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    Record(Record),
    Skip(SkipReason),
}

#[derive(Clone, Debug, Default)]
pub struct RecordDecoder {
    fields: FieldMap,
    fold_case: bool,
}

impl RecordDecoder {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields, fold_case: false }
    }

    /// Lowercase author and mention handles.
    pub fn fold_case(mut self, yes: bool) -> Self {
        self.fold_case = yes;
        self
    }

    pub fn decode(&self, line: &str) -> Decoded {
        if line.trim().is_empty() {
            return Decoded::Skip(SkipReason::Blank);
        }
        let v: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => return Decoded::Skip(SkipReason::Malformed),
        };
        if !v.is_object() {
            return Decoded::Skip(SkipReason::NotAnObject);
        }
        Decoded::Record(self.record_from_value(&v))
    }

    /// Same as [`decode`](Self::decode) for raw bytes; rejects invalid UTF-8 per line.
    pub fn decode_bytes(&self, line: &[u8]) -> Decoded {
        match std::str::from_utf8(line) {
            Ok(s) => self.decode(s),
            Err(_) => Decoded::Skip(SkipReason::InvalidUtf8),
        }
    }

    pub fn record_from_value(&self, v: &Value) -> Record {
        let f = &self.fields;
        let occurred_on = str_at(v, &f.date).and_then(parse_post_date);
        let author = str_at(v, &f.author)
            .filter(|s| !s.is_empty())
            .map(|s| self.handle(s));

        let body = str_at(v, &f.body)
            .filter(|s| !s.is_empty())
            .or_else(|| f.body_fallback.as_deref().and_then(|p| str_at(v, p)))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mentions = match v.pointer(&f.mentions).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(|m| m.get(&f.mention_handle).and_then(Value::as_str))
                .filter(|s| !s.is_empty())
                .map(|s| self.handle(s))
                .collect(),
            None => Vec::new(),
        };

        Record { occurred_on, author, mentions, body }
    }

    fn handle(&self, s: &str) -> String {
        if self.fold_case { s.to_lowercase() } else { s.to_string() }
    }
}

fn str_at<'v>(v: &'v Value, pointer: &str) -> Option<&'v str> {
    v.pointer(pointer).and_then(Value::as_str)
}
