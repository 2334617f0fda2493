use crate::aggregate::{Aggregator, AllStats, DateActivity, EmojiUsage, MentionCounts};
use crate::config::{AnalysisOptions, Strategy};
use crate::date::format_date;
use crate::decode::{Decoded, FieldMap, RecordDecoder, SkipReason};
use crate::mem::PeakMemory;
use crate::paths::{plan_inputs, InputFile};
use crate::progress::{make_progress_bar_labeled, total_input_size};
use crate::select::{top_k, top_k_non_empty, top_one, Ranked};
use crate::source::for_each_line;
use crate::tally::CountTable;
use crate::util::init_tracing_once;
use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use time::Date;

/// Entry point: configure with builder methods, then run one of the statistics.
///
/// ```no_run
/// use postrank::PostAnalyzer;
/// let leaders = PostAnalyzer::new()
///     .input("posts.json")
///     .top_k(10)
///     .top_dates()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct PostAnalyzer {
    pub(crate) input: Option<PathBuf>,
    pub(crate) opts: AnalysisOptions,
}

/// A top date with its most active author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DateLeader {
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    pub author: String,
    /// Posts on `date`.
    pub posts: u64,
    /// Posts by `author` on `date`.
    pub author_posts: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: u64,
}

/// Counters and measurements for one pass over the input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub lines: u64,
    pub records: u64,
    pub skipped: u64,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub peak_rss_bytes: Option<u64>,
}

impl PassStats {
    fn absorb(&mut self, other: &PassStats) {
        self.lines += other.lines;
        self.records += other.records;
        self.skipped += other.skipped;
    }
}

/// All three statistics from one pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub dates: Vec<DateLeader>,
    pub emojis: Vec<KeyCount>,
    pub mentions: Vec<KeyCount>,
    pub stats: PassStats,
}

fn serialize_date<S: Serializer>(d: &Date, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format_date(*d))
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl PostAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    // -------- Builder methods --------
    pub fn input(mut self, path: impl AsRef<Path>) -> Self { self.input = Some(path.as_ref().to_path_buf()); self }
    pub fn options(mut self, opts: AnalysisOptions) -> Self { self.opts = opts; self }
    pub fn top_k(mut self, k: usize) -> Self { self.opts = self.opts.with_top_k(k); self }
    pub fn strategy(mut self, strategy: Strategy) -> Self { self.opts = self.opts.with_strategy(strategy); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn batch_lines(mut self, n: usize) -> Self { self.opts = self.opts.with_batch_lines(n); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_read_buffer(bytes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn fold_handle_case(mut self, yes: bool) -> Self { self.opts = self.opts.with_fold_handle_case(yes); self }
    pub fn track_memory(mut self, yes: bool) -> Self { self.opts = self.opts.with_track_memory(yes); self }
    pub fn require_results(mut self, yes: bool) -> Self { self.opts = self.opts.with_require_results(yes); self }
    pub fn fields(mut self, fields: FieldMap) -> Self { self.opts = self.opts.with_fields(fields); self }

    pub fn opts(&self) -> &AnalysisOptions {
        &self.opts
    }

    // -------- Statistics --------

    /// Top dates by post count, each with its most active author.
    pub fn top_dates(&self) -> Result<Vec<DateLeader>> {
        Ok(self.top_dates_with_stats()?.0)
    }

    pub fn top_dates_with_stats(&self) -> Result<(Vec<DateLeader>, PassStats)> {
        let (agg, stats) = self.aggregate::<DateActivity>()?;
        Ok((rank_dates(&agg, self.opts.top_k, self.opts.require_results)?, stats))
    }

    /// Most frequent emoji glyphs with their counts.
    pub fn top_emojis(&self) -> Result<Vec<KeyCount>> {
        Ok(self.top_emojis_with_stats()?.0)
    }

    pub fn top_emojis_with_stats(&self) -> Result<(Vec<KeyCount>, PassStats)> {
        let (agg, stats) = self.aggregate::<EmojiUsage>()?;
        Ok((rank_counts(&agg.glyphs, self.opts.top_k, self.opts.require_results)?, stats))
    }

    /// Most mentioned handles with their counts.
    pub fn top_mentions(&self) -> Result<Vec<KeyCount>> {
        Ok(self.top_mentions_with_stats()?.0)
    }

    pub fn top_mentions_with_stats(&self) -> Result<(Vec<KeyCount>, PassStats)> {
        let (agg, stats) = self.aggregate::<MentionCounts>()?;
        Ok((rank_counts(&agg.handles, self.opts.top_k, self.opts.require_results)?, stats))
    }

    /// All three statistics from a single pass.
    pub fn run_all(&self) -> Result<Report> {
        let (agg, stats) = self.aggregate::<AllStats>()?;
        let k = self.opts.top_k;
        let strict = self.opts.require_results;
        Ok(Report {
            dates: rank_dates(&agg.dates, k, strict)?,
            emojis: rank_counts(&agg.emojis.glyphs, k, strict)?,
            mentions: rank_counts(&agg.mentions.handles, k, strict)?,
            stats,
        })
    }

    /// Run one pass over the input, folding every decoded record into `A`.
    pub fn aggregate<A: Aggregator>(&self) -> Result<(A, PassStats)> {
        init_tracing_once();
        let input = self.input.as_deref().ok_or_else(|| anyhow!("input path is required"))?;
        let files = plan_inputs(input)?;
        tracing::info!("Planned {} input file(s) from {}", files.len(), input.display());

        let decoder = RecordDecoder::new(self.opts.fields.clone()).fold_case(self.opts.fold_handle_case);
        let pb = if self.opts.progress {
            Some(make_progress_bar_labeled(total_input_size(&files), self.opts.progress_label.as_deref()))
        } else {
            None
        };
        let mut mem = if self.opts.track_memory { Some(PeakMemory::new()) } else { None };
        let read_buf = self.opts.read_buffer_bytes;

        let started = Instant::now();
        let (agg, mut stats) = match self.opts.strategy {
            Strategy::Streaming => stream_pass::<A>(&files, &decoder, read_buf, pb.as_ref(), mem.as_mut())?,
            Strategy::Parallel => {
                if let Some(n) = self.opts.parallelism {
                    rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok();
                }
                // The global pool may predate this run; size waves by what it really has.
                let wave = rayon::current_num_threads().max(1);
                let batch = self.opts.batch_lines.max(1);
                parallel_pass::<A>(&files, &decoder, read_buf, batch, wave, pb.as_ref(), mem.as_mut())?
            }
        };
        stats.elapsed = started.elapsed();
        if let Some(m) = mem.as_mut() {
            m.sample_now();
            stats.peak_rss_bytes = m.peak_bytes();
        }
        if let Some(pb) = pb { pb.finish_with_message("done"); }

        tracing::info!(
            lines = stats.lines,
            records = stats.records,
            skipped = stats.skipped,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Pass complete"
        );
        Ok((agg, stats))
    }
}

// ----------------- Ranking -----------------

/// Top dates of `activity`, each resolved to its most active author.
pub fn rank_dates(activity: &DateActivity, k: usize, require_results: bool) -> Result<Vec<DateLeader>> {
    let top = if require_results { top_k_non_empty(&activity.dates, k)? } else { top_k(&activity.dates, k) };
    top.into_iter()
        .map(|d| -> Result<DateLeader> {
            let leader = top_one(&activity.authors_by_date, &d.key)?;
            Ok(DateLeader { date: d.key, author: leader.key, posts: d.count, author_posts: leader.count })
        })
        .collect()
}

/// Top keys of a string count table as `(key, count)` pairs.
pub fn rank_counts(table: &CountTable<String>, k: usize, require_results: bool) -> Result<Vec<KeyCount>> {
    let top: Vec<Ranked<String>> = if require_results { top_k_non_empty(table, k)? } else { top_k(table, k) };
    Ok(top.into_iter().map(|r| KeyCount { key: r.key, count: r.count }).collect())
}

// ----------------- Passes -----------------

#[inline]
fn ingest_line<A: Aggregator>(agg: &mut A, decoder: &RecordDecoder, raw: &[u8], line: u64, stats: &mut PassStats) {
    stats.lines += 1;
    match decoder.decode_bytes(raw) {
        Decoded::Record(rec) => {
            stats.records += 1;
            agg.ingest(&rec, line);
        }
        Decoded::Skip(SkipReason::Blank) => stats.skipped += 1,
        Decoded::Skip(reason) => {
            stats.skipped += 1;
            tracing::debug!(line, reason = reason.as_str(), "Skipping line");
        }
    }
}

fn stream_pass<A: Aggregator>(
    files: &[InputFile],
    decoder: &RecordDecoder,
    read_buf: usize,
    pb: Option<&ProgressBar>,
    mut mem: Option<&mut PeakMemory>,
) -> Result<(A, PassStats)> {
    let mut agg = A::default();
    let mut stats = PassStats::default();
    let mut line: u64 = 0;

    for file in files {
        for_each_line(
            file,
            read_buf,
            |delta| { if let Some(pb) = pb { pb.inc(delta); } },
            |raw| {
                ingest_line(&mut agg, decoder, raw, line, &mut stats);
                line += 1;
                if let Some(m) = mem.as_deref_mut() { m.sample(); }
                Ok(())
            },
        )
        .with_context(|| format!("processing {}", file.path.display()))?;
    }
    Ok((agg, stats))
}

/// Raw lines tagged with the global index of the first one.
struct Batch {
    start: u64,
    lines: Vec<Vec<u8>>,
}

/// Reads stay sequential; each full wave of batches is aggregated on rayon and merged.
/// At most `batch_lines * wave` raw lines are held at once.
fn parallel_pass<A: Aggregator>(
    files: &[InputFile],
    decoder: &RecordDecoder,
    read_buf: usize,
    batch_lines: usize,
    wave: usize,
    pb: Option<&ProgressBar>,
    mut mem: Option<&mut PeakMemory>,
) -> Result<(A, PassStats)> {
    let mut total = A::default();
    let mut stats = PassStats::default();
    let mut pending: Vec<Batch> = Vec::with_capacity(wave);
    let mut current = Batch { start: 0, lines: Vec::with_capacity(batch_lines) };
    let mut line: u64 = 0;

    for file in files {
        for_each_line(
            file,
            read_buf,
            |delta| { if let Some(pb) = pb { pb.inc(delta); } },
            |raw| {
                current.lines.push(raw.to_vec());
                line += 1;
                if current.lines.len() >= batch_lines {
                    let next = Batch { start: line, lines: Vec::with_capacity(batch_lines) };
                    pending.push(std::mem::replace(&mut current, next));
                    if pending.len() >= wave {
                        flush_wave(&mut total, &mut stats, &mut pending, decoder);
                        if let Some(m) = mem.as_deref_mut() { m.sample(); }
                    }
                }
                Ok(())
            },
        )
        .with_context(|| format!("processing {}", file.path.display()))?;
    }

    if !current.lines.is_empty() {
        pending.push(current);
    }
    flush_wave(&mut total, &mut stats, &mut pending, decoder);
    Ok((total, stats))
}

fn flush_wave<A: Aggregator>(total: &mut A, stats: &mut PassStats, pending: &mut Vec<Batch>, decoder: &RecordDecoder) {
    if pending.is_empty() {
        return;
    }
    let partials: Vec<(A, PassStats)> = pending
        .par_iter()
        .map(|batch| {
            let mut agg = A::default();
            let mut st = PassStats::default();
            for (i, raw) in batch.lines.iter().enumerate() {
                ingest_line(&mut agg, decoder, raw, batch.start + i as u64, &mut st);
            }
            (agg, st)
        })
        .collect();
    pending.clear();
    for (agg, st) in partials {
        total.merge(agg);
        stats.absorb(&st);
    }
}
