use crate::error::InputError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// How an input file is encoded on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Plain, // .json / .jsonl / .ndjson (or any explicit file)
    Zstd,  // .zst
}

#[derive(Clone, Debug)]
pub struct InputFile {
    pub kind: InputKind,
    pub path: PathBuf,
}

fn kind_for(path: &Path) -> InputKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("zst") => InputKind::Zstd,
        _ => InputKind::Plain,
    }
}

fn is_input_name(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
        Some("json" | "jsonl" | "ndjson" | "zst")
    )
}

/// Resolve the input location into the ordered list of files making up the stream.
///
/// A file is taken as-is regardless of extension. A directory contributes every
/// `.json`/`.jsonl`/`.ndjson`/`.zst` file beneath it, in lexicographic path order, so the
/// global line numbering (and therefore tie-breaking) is stable across runs.
pub fn plan_inputs(input: &Path) -> Result<Vec<InputFile>> {
    if !input.exists() {
        return Err(InputError::NotFound { path: input.to_path_buf() }.into());
    }
    if input.is_file() {
        return Ok(vec![InputFile { kind: kind_for(input), path: input.to_path_buf() }]);
    }
    if !input.is_dir() {
        return Err(InputError::Unsupported { path: input.to_path_buf() }.into());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(input).min_depth(1).follow_links(true) {
        let ent = entry?;
        if ent.file_type().is_file() && is_input_name(ent.path()) {
            files.push(ent.path().to_path_buf());
        }
    }
    files.sort();
    if files.is_empty() {
        tracing::warn!(dir = %input.display(), "No .json/.jsonl/.ndjson/.zst files found in input directory");
    }
    Ok(files.into_iter().map(|p| InputFile { kind: kind_for(&p), path: p }).collect())
}
