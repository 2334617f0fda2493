use anyhow::Result;
use clap::{Parser, ValueEnum};
use postrank::{
    format_date, format_mib, init_tracing_once, DateLeader, KeyCount, PassStats, PostAnalyzer, Strategy,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Stat {
    /// Busiest dates and their most active author
    Dates,
    /// Most used emoji
    Emojis,
    /// Most mentioned handles
    Mentions,
    /// All three from a single pass
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Single-threaded sequential pass
    Streaming,
    /// Batches aggregated in parallel, then merged
    Parallel,
}

impl From<StrategyArg> for Strategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Streaming => Strategy::Streaming,
            StrategyArg::Parallel => Strategy::Parallel,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "postrank")]
#[command(about = "Top-K date, emoji and mention statistics over NDJSON post archives", long_about = None)]
#[command(version)]
struct Cli {
    /// NDJSON file (.json/.jsonl/.ndjson, optionally .zst) or a directory of them
    input: PathBuf,

    /// Statistic to compute
    #[arg(short, long, value_enum, default_value = "all")]
    stat: Stat,

    /// Number of entries per ranking
    #[arg(short = 'k', long = "top", default_value_t = 10, env = "POSTRANK_TOP")]
    top: usize,

    /// Execution strategy
    #[arg(long, value_enum, default_value = "streaming")]
    strategy: StrategyArg,

    /// Worker threads for the parallel strategy
    #[arg(long)]
    threads: Option<usize>,

    /// Lines per batch for the parallel strategy
    #[arg(long, default_value_t = 16 * 1024)]
    batch_lines: usize,

    /// Lowercase author and mention handles before counting
    #[arg(long)]
    fold_case: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,

    /// Report elapsed time and peak resident memory
    #[arg(long)]
    profile: bool,

    /// Rerun with the other strategy and check both agree
    #[arg(long)]
    verify: bool,

    /// Fail when a ranking comes back empty
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Serialize)]
struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    dates: Option<Vec<DateLeader>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    emojis: Option<Vec<KeyCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mentions: Option<Vec<KeyCount>>,
    stats: PassStats,
}

impl Output {
    fn same_rankings(&self, other: &Output) -> bool {
        self.dates == other.dates && self.emojis == other.emojis && self.mentions == other.mentions
    }
}

fn run(analyzer: &PostAnalyzer, stat: Stat) -> Result<Output> {
    let mut out = Output { dates: None, emojis: None, mentions: None, stats: PassStats::default() };
    match stat {
        Stat::Dates => {
            let (v, s) = analyzer.top_dates_with_stats()?;
            out.dates = Some(v);
            out.stats = s;
        }
        Stat::Emojis => {
            let (v, s) = analyzer.top_emojis_with_stats()?;
            out.emojis = Some(v);
            out.stats = s;
        }
        Stat::Mentions => {
            let (v, s) = analyzer.top_mentions_with_stats()?;
            out.mentions = Some(v);
            out.stats = s;
        }
        Stat::All => {
            let report = analyzer.run_all()?;
            out.dates = Some(report.dates);
            out.emojis = Some(report.emojis);
            out.mentions = Some(report.mentions);
            out.stats = report.stats;
        }
    }
    Ok(out)
}

fn print_text(out: &Output, k: usize) {
    if let Some(dates) = &out.dates {
        println!("Top {} dates (date, most active author)", k);
        for (i, d) in dates.iter().enumerate() {
            println!("  {:2}. {}  {}  (posts: {}, by author: {})", i + 1, format_date(d.date), d.author, d.posts, d.author_posts);
        }
    }
    if let Some(emojis) = &out.emojis {
        println!("Top {} emojis", k);
        for (i, e) in emojis.iter().enumerate() {
            println!("  {:2}. {}  {}", i + 1, e.key, e.count);
        }
    }
    if let Some(mentions) = &out.mentions {
        println!("Top {} mentioned handles", k);
        for (i, m) in mentions.iter().enumerate() {
            println!("  {:2}. {}  {}", i + 1, m.key, m.count);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_once();

    let mut analyzer = PostAnalyzer::new()
        .input(&cli.input)
        .top_k(cli.top)
        .strategy(cli.strategy.into())
        .batch_lines(cli.batch_lines)
        .fold_handle_case(cli.fold_case)
        .progress(cli.progress)
        .progress_label(format!("{:?}", cli.stat).to_lowercase())
        .track_memory(cli.profile)
        .require_results(cli.strict);
    if let Some(n) = cli.threads {
        analyzer = analyzer.parallelism(n);
    }

    let out = run(&analyzer, cli.stat)?;

    if cli.json {
        let s = if cli.pretty { serde_json::to_string_pretty(&out)? } else { serde_json::to_string(&out)? };
        println!("{}", s);
    } else {
        print_text(&out, cli.top);
    }

    if cli.profile {
        let peak = out.stats.peak_rss_bytes.map(format_mib).unwrap_or_else(|| "n/a".to_string());
        eprintln!(
            "lines: {}  records: {}  skipped: {}  elapsed: {:.3}s  peak rss: {}",
            out.stats.lines,
            out.stats.records,
            out.stats.skipped,
            out.stats.elapsed.as_secs_f64(),
            peak
        );
    }

    if cli.verify {
        let other = match analyzer.opts().strategy {
            Strategy::Streaming => Strategy::Parallel,
            Strategy::Parallel => Strategy::Streaming,
        };
        let check = run(&analyzer.clone().strategy(other).progress(false), cli.stat)?;
        if out.same_rankings(&check) {
            eprintln!("verify: {:?} and {:?} strategies produced identical rankings", analyzer.opts().strategy, other);
        } else {
            tracing::warn!("verify: rankings differ between {:?} and {:?} strategies", analyzer.opts().strategy, other);
            eprintln!("verify: MISMATCH between {:?} and {:?} strategies", analyzer.opts().strategy, other);
            std::process::exit(2);
        }
    }

    Ok(())
}
