//! Record source: stream an input file (plain or zstd NDJSON) line by line.
//!
//! Lines are handed out as raw bytes so a single line with invalid UTF-8 can be skipped by
//! the decoder instead of failing the whole read. Any I/O or zstd error is fatal.

use crate::paths::{InputFile, InputKind};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

/// A `Read` wrapper that counts on-disk bytes read.
struct CountingReader<R: Read> {
    inner: R,
    counter: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

fn open_reader(input: &InputFile, counter: Arc<AtomicU64>, cap: usize) -> Result<Box<dyn BufRead>> {
    let file = File::open(&input.path).with_context(|| format!("open {}", input.path.display()))?;
    let counted = CountingReader { inner: file, counter };
    let inner: Box<dyn Read> = match input.kind {
        InputKind::Plain => Box::new(counted),
        InputKind::Zstd => {
            let mut decoder = Decoder::new(counted)
                .with_context(|| format!("zstd init {}", input.path.display()))?;
            // Large archives are commonly written with long windows.
            decoder.window_log_max(31)?;
            Box::new(decoder)
        }
    };
    Ok(Box::new(BufReader::with_capacity(cap.max(8 * 1024), inner)))
}

/// Call `on_line` for every line of `input` (trailing `\r?\n` stripped), and
/// `on_progress(delta)` with the number of on-disk bytes consumed since the last call.
pub fn for_each_line(
    input: &InputFile,
    read_buf_bytes: usize,
    mut on_progress: impl FnMut(u64),
    mut on_line: impl FnMut(&[u8]) -> Result<()>,
) -> Result<()> {
    let counter = Arc::new(AtomicU64::new(0));
    let mut reader = open_reader(input, counter.clone(), read_buf_bytes)?;

    let mut buf: Vec<u8> = Vec::with_capacity(16 * 1024);
    let mut last = 0u64;
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {}", input.path.display()))?;
        let cur = counter.load(Ordering::Relaxed);
        if cur > last {
            on_progress(cur - last);
            last = cur;
        }
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') { buf.pop(); }
        }
        on_line(&buf)?;
    }
    Ok(())
}
