mod config;
mod date;
mod error;
mod paths;
mod source;
mod decode;
mod extract;

mod tally;
mod select;
mod aggregate;
mod pipeline;

mod progress;
mod mem;
mod util;

pub use crate::config::{AnalysisOptions, Strategy};
pub use crate::date::{format_date, parse_post_date};
pub use crate::error::{InputError, RankError};
pub use crate::paths::{plan_inputs, InputFile, InputKind};
pub use crate::pipeline::{rank_counts, rank_dates, DateLeader, KeyCount, PassStats, PostAnalyzer, Report};

// Line source and decoding, for callers driving their own passes.
pub use crate::source::for_each_line;
pub use crate::decode::{Decoded, FieldMap, Record, RecordDecoder, SkipReason};

// Extraction contracts and the aggregation core.
pub use crate::extract::{emoji_glyphs, DateAuthorKeys, EmojiKeys, KeyExtractor, MentionKeys};
pub use crate::tally::{CountTable, NestedCountTable, Position, Tally};
pub use crate::select::{top_k, top_k_non_empty, top_one, Ranked};
pub use crate::aggregate::{Aggregator, AllStats, DateActivity, EmojiUsage, MentionCounts};

// Expose memory sampling and logging bootstrap to the binary.
pub use crate::mem::{format_mib, PeakMemory};
pub use crate::util::init_tracing_once;
