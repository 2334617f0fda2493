#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One post in the archived-tweet layout the default `FieldMap` expects.
pub fn post(date: &str, author: &str, content: &str, mentions: &[&str]) -> String {
    let mentioned: Vec<Value> = mentions.iter().map(|m| json!({ "username": m, "id": 1 })).collect();
    json!({
        "url": "https://twitter.com/x/status/1",
        "date": date,
        "content": content,
        "renderedContent": content,
        "id": 1,
        "user": { "username": author, "displayname": author, "id": 7 },
        "mentionedUsers": if mentioned.is_empty() { Value::Null } else { Value::Array(mentioned) },
    })
    .to_string()
}

/// Write `lines` (newline-terminated) to `path`, creating parent dirs.
pub fn write_lines(path: &Path, lines: &[String]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Write a compressed `.zst` file containing the provided JSONL lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Fresh scratch directory kept alive for the test's duration.
pub fn scratch() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Write `lines` to `<dir>/posts.json` and return the path.
pub fn posts_file(dir: &Path, lines: &[String]) -> PathBuf {
    let p = dir.join("posts.json");
    write_lines(&p, lines);
    p
}

/// The 12-record date scenario:
///   D1 = 2021-02-12 x5 (a x3, b x2), D2 = 2021-02-13 x4, D3 = 2021-02-14 x3.
/// D2 authors: c x2, d x2 with c seen first; D3 authors: e x1, f x2.
pub fn date_scenario() -> Vec<String> {
    vec![
        post("2021-02-12T10:00:00+00:00", "a", "", &[]),
        post("2021-02-12T11:00:00+00:00", "b", "", &[]),
        post("2021-02-12T12:00:00+00:00", "a", "", &[]),
        post("2021-02-13T01:00:00+00:00", "c", "", &[]),
        post("2021-02-13T02:00:00+00:00", "d", "", &[]),
        post("2021-02-14T03:00:00+00:00", "e", "", &[]),
        post("2021-02-12T13:00:00+00:00", "b", "", &[]),
        post("2021-02-13T04:00:00+00:00", "d", "", &[]),
        post("2021-02-14T05:00:00+00:00", "f", "", &[]),
        post("2021-02-12T14:00:00+00:00", "a", "", &[]),
        post("2021-02-13T06:00:00+00:00", "c", "", &[]),
        post("2021-02-14T07:00:00+00:00", "f", "", &[]),
    ]
}

/// A larger deterministic corpus (`n` records) with skewed dates, authors, emoji and
/// mentions, sprinkled with malformed and blank lines.
pub fn synthetic_corpus(n: usize) -> Vec<String> {
    let emoji = ["🙏", "😊", "❤️", "🚜", "👨‍🌾", "🇮🇳", "😂"];
    let handles = ["narendramodi", "Kisanektamorcha", "RakeshTikaitBKU", "PMOIndia", "RahulGandhi"];
    let mut out = Vec::with_capacity(n + n / 50);
    for i in 0..n {
        let day = 1 + (i * 7 + i / 3) % 20;
        let author = format!("user{}", (i * 13) % 37);
        let mut content = format!("post {}", i);
        for j in 0..(i % 4) {
            content.push_str(emoji[(i + j * 3) % emoji.len()]);
        }
        let ms: Vec<&str> = (0..(i % 3)).map(|j| handles[(i + j * 2) % handles.len()]).collect();
        out.push(post(&format!("2021-02-{:02}T12:00:00+00:00", day), &author, &content, &ms));
        if i % 97 == 0 {
            out.push("{not json".to_string());
        }
        if i % 131 == 0 {
            out.push(String::new());
        }
    }
    out
}
