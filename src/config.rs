use crate::decode::FieldMap;

/// How the pass is executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One thread, one sequential pass.
    #[default]
    Streaming,
    /// Sequential reads, batches aggregated on rayon and merged.
    Parallel,
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct AnalysisOptions {
    pub top_k: usize,
    pub strategy: Strategy,
    pub parallelism: Option<usize>, // Some(N) to set rayon threads, None to use default
    pub batch_lines: usize,         // lines per parallel batch
    pub read_buffer_bytes: usize,   // BufReader capacity
    pub progress: bool,
    pub progress_label: Option<String>,
    pub fold_handle_case: bool,     // lowercase author/mention handles
    pub track_memory: bool,         // sample resident memory during the pass
    pub require_results: bool,      // empty rankings become errors
    pub fields: FieldMap,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_k: 10,
            strategy: Strategy::Streaming,
            parallelism: None,
            batch_lines: 16 * 1024,
            read_buffer_bytes: 256 * 1024,
            progress: false,
            progress_label: None,
            fold_handle_case: false,
            track_memory: false,
            require_results: false,
            fields: FieldMap::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads.max(1));
        self
    }
    pub fn with_batch_lines(mut self, n: usize) -> Self {
        self.batch_lines = n.max(256);
        self
    }
    pub fn with_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_fold_handle_case(mut self, yes: bool) -> Self {
        self.fold_handle_case = yes;
        self
    }
    pub fn with_track_memory(mut self, yes: bool) -> Self {
        self.track_memory = yes;
        self
    }
    pub fn with_require_results(mut self, yes: bool) -> Self {
        self.require_results = yes;
        self
    }
    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }
}
