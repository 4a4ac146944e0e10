//! マッチ一覧・ブロックのテキスト表示

use crate::controller::Event;
use crate::search::{FileMatches, LineMatch};
use crossterm::style::Stylize;
use std::path::Path;
use unicode_width::UnicodeWidthChar;

/// 行テキストの最大表示幅
pub const DEFAULT_LINE_WIDTH: usize = 100;

/// 表示設定
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub line_width: usize,
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            color: false,
        }
    }
}

/// 表示幅 `width` に収まるよう切り詰める（末尾に `…`）
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            let rest: usize = text[out.len()..].chars().map(|c| c.width().unwrap_or(0)).sum();
            if used + rest <= width {
                out.push_str(&text[out.len()..]);
            } else {
                out.push('…');
            }
            return out;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// 1ファイル分の一覧（`selected` は一覧内の位置）
pub fn render_file(
    path: &Path,
    matches: &[LineMatch],
    selected: Option<usize>,
    options: &RenderOptions,
) -> String {
    let mut out = String::new();
    let header = path.display().to_string();
    if options.color {
        out.push_str(&format!("{}\n", header.bold()));
    } else {
        out.push_str(&format!("{}\n", header));
    }

    for (index, m) in matches.iter().enumerate() {
        let text = truncate_to_width(&m.text, options.line_width);
        let is_selected = selected == Some(index);
        let marker = if is_selected { '>' } else { ' ' };
        let line = format!("{} {:>5}: {}", marker, m.line + 1, text);
        if is_selected && options.color {
            out.push_str(&format!("{}\n", line.reverse()));
        } else {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// 検索結果全体（先頭ファイルの先頭マッチを選択中として表示）
pub fn render_results(results: &[FileMatches], options: &RenderOptions) -> String {
    let mut out = String::new();
    for (index, file) in results.iter().enumerate() {
        let selected = if index == 0 { Some(0) } else { None };
        out.push_str(&render_file(&file.path, &file.matches, selected, options));
    }
    out
}

fn render_block(title: &str, text: &str) -> String {
    let mut out = format!("--- {} ---\n", title);
    out.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// イベントを表示用テキストに変換
pub fn render_event(event: &Event, options: &RenderOptions) -> String {
    match event {
        Event::SearchResult(results) if results.is_empty() => "no matches\n".to_string(),
        Event::SearchResult(results) => render_results(results, options),
        Event::Before(text) => render_block("before", text),
        Event::After { text, failed } => {
            render_block(if *failed { "after (failed)" } else { "after" }, text)
        }
        Event::FileUpdated {
            path,
            matches,
            selected,
        } => render_file(path, matches, *selected, options),
        Event::FileExhausted(path) => format!("{}: no more matches\n", path.display()),
        Event::SweepFinished => "sweep finished\n".to_string(),
        Event::Error(message) => format!("error: {}\n", message),
    }
}
