//! ファイルI/O操作
//!
//! UTF-8テキストファイルの読み込みと全体上書き保存

use crate::error::{FileError, Result, SweepError};
use std::fs;
use std::path::Path;

/// ファイルからテキストを読み込み（UTF-8のみ対応）
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SweepError::File(FileError::NotFound {
            path: path.display().to_string(),
        }));
    }

    // ディレクトリではないことを確認
    if path.is_dir() {
        return Err(SweepError::File(FileError::InvalidPath {
            path: path.display().to_string(),
        }));
    }

    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        SweepError::File(FileError::Encoding {
            path: path.display().to_string(),
            message: e.utf8_error().to_string(),
        })
    })
}

/// テキストでファイル全体を上書き
///
/// 一時ファイルを経由しない。書き込み途中の失敗は呼び出し元へそのまま返す。
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, content.as_bytes()).map_err(|e| io_error(path, e))?;
    log::debug!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// 実行可能ファイルとして書き込み（ラッパースクリプト用）
pub fn write_executable<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    write_file(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| io_error(path, e))?;
    }

    Ok(())
}

/// 親ディレクトリを作成
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| io_error(path, e))?;
    }
    Ok(())
}

/// ファイルが存在すれば削除
pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

fn io_error(path: &Path, error: std::io::Error) -> SweepError {
    SweepError::File(FileError::Io {
        message: format!("{}: {}", path.display(), error),
    })
}
