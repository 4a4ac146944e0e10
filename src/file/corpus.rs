//! コーパス（対象ファイル集合）の列挙
//!
//! カンマ区切りのグロブをまとめて1つの `GlobSet` にし、ルート以下を走査する

use crate::error::{FileError, PatternError, Result, SweepError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// カンマ区切りのグロブ文字列を分割（前後の空白除去、空要素は無視）
pub fn split_globs(globs: &str) -> Vec<String> {
    globs
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// グロブ群をコンパイル
pub fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| PatternError::InvalidGlob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| {
        SweepError::Pattern(PatternError::InvalidGlob {
            pattern: patterns.join(","),
            message: e.to_string(),
        })
    })
}

/// ルート以下でグロブに一致するファイルを列挙
///
/// 戻り値はルートからの相対パスでソート済み。ドットで始まるエントリは対象外。
pub fn discover<P: AsRef<Path>>(root: P, globs: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(SweepError::File(FileError::InvalidPath {
            path: root.display().to_string(),
        }));
    }

    let patterns = split_globs(globs);
    let glob_set = build_glob_set(&patterns)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        // Windows でも `/` 区切りで照合する
        let normalized = relative.to_string_lossy().replace('\\', "/");
        if glob_set.is_match(&normalized) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    log::debug!(
        "discovered {} files under {} for '{}'",
        files.len(),
        root.display(),
        globs
    );
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
