//! Per-statistic aggregation state.
//! Implement `Aggregator` for a statistic's state and hand it to the pipeline; the parallel
//! strategy builds one per batch and folds them together with `merge`.

use crate::decode::Record;
use crate::extract::{DateAuthorKeys, EmojiKeys, KeyExtractor, MentionKeys};
use crate::tally::{CountTable, NestedCountTable, Position};
use time::Date;

pub trait Aggregator: Send + Default {
    /// Fold one record observed at global line `line`.
    fn ingest(&mut self, record: &Record, line: u64);
    /// Combine with a partial built over a disjoint part of the stream.
    fn merge(&mut self, other: Self);
}

/// Posts per date, and per (date, author).
#[derive(Default, Debug, Clone)]
pub struct DateActivity {
    pub dates: CountTable<Date>,
    pub authors_by_date: NestedCountTable<Date, String>,
    pub records_with_keys: u64,
}

impl Aggregator for DateActivity {
    fn ingest(&mut self, record: &Record, line: u64) {
        let keys = DateAuthorKeys.keys(record);
        if keys.is_empty() { return; }
        self.records_with_keys += 1;
        for (slot, (date, author)) in keys.into_iter().enumerate() {
            let at = Position::new(line, slot as u32);
            self.dates.observe_at(&date, at);
            self.authors_by_date.observe_nested(&date, author, at);
        }
    }

    fn merge(&mut self, other: Self) {
        self.dates.merge(other.dates);
        self.authors_by_date.merge(other.authors_by_date);
        self.records_with_keys += other.records_with_keys;
    }
}

/// Occurrences per emoji glyph.
#[derive(Default, Debug, Clone)]
pub struct EmojiUsage {
    pub glyphs: CountTable<String>,
    pub records_with_keys: u64,
}

impl Aggregator for EmojiUsage {
    fn ingest(&mut self, record: &Record, line: u64) {
        let keys = EmojiKeys.keys(record);
        if keys.is_empty() { return; }
        self.records_with_keys += 1;
        for (slot, glyph) in keys.into_iter().enumerate() {
            self.glyphs.observe_at(glyph, Position::new(line, slot as u32));
        }
    }

    fn merge(&mut self, other: Self) {
        self.glyphs.merge(other.glyphs);
        self.records_with_keys += other.records_with_keys;
    }
}

/// Occurrences per mentioned handle.
#[derive(Default, Debug, Clone)]
pub struct MentionCounts {
    pub handles: CountTable<String>,
    pub records_with_keys: u64,
}

impl Aggregator for MentionCounts {
    fn ingest(&mut self, record: &Record, line: u64) {
        let keys = MentionKeys.keys(record);
        if keys.is_empty() { return; }
        self.records_with_keys += 1;
        for (slot, handle) in keys.into_iter().enumerate() {
            self.handles.observe_at(handle, Position::new(line, slot as u32));
        }
    }

    fn merge(&mut self, other: Self) {
        self.handles.merge(other.handles);
        self.records_with_keys += other.records_with_keys;
    }
}

/// All three statistics from a single pass.
#[derive(Default, Debug, Clone)]
pub struct AllStats {
    pub dates: DateActivity,
    pub emojis: EmojiUsage,
    pub mentions: MentionCounts,
}

impl Aggregator for AllStats {
    fn ingest(&mut self, record: &Record, line: u64) {
        self.dates.ingest(record, line);
        self.emojis.ingest(record, line);
        self.mentions.ingest(record, line);
    }

    fn merge(&mut self, other: Self) {
        self.dates.merge(other.dates);
        self.emojis.merge(other.emojis);
        self.mentions.merge(other.mentions);
    }
}
