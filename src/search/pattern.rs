//! 正規表現パターンのコンパイル

use crate::error::{PatternError, Result};
use regex::Regex;

/// 開始・終了パターンをコンパイル（失敗時はパターン文字列付きのエラー）
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| PatternError::from_regex(pattern, &e).into())
}

/// 空文字列なら `None`、それ以外はコンパイル
pub fn compile_optional(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        Ok(None)
    } else {
        compile(pattern).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweepError;

    #[test]
    fn compiles_valid_pattern() {
        let regex = compile(r"^fn \w+").unwrap();
        assert!(regex.is_match("fn main() {"));
    }

    #[test]
    fn reports_invalid_pattern() {
        match compile("a(b") {
            Err(SweepError::Pattern(PatternError::InvalidRegex { pattern, .. })) => {
                assert_eq!(pattern, "a(b");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_optional_pattern_is_none() {
        assert!(compile_optional("").unwrap().is_none());
        assert!(compile_optional("END").unwrap().is_some());
        assert!(compile_optional("[").is_err());
    }
}
