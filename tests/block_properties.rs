//! 行バッファ・マッチインデックス・終端決定の性質テスト

use blocksweep::buffer::{LineBuffer, LineEnding};
use blocksweep::search::{build_match_index, find_resumption, resolve_end, EndBoundary};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use regex::Regex;

fn short_line() -> impl Strategy<Value = String> {
    "[abx ]{0,4}"
}

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(short_line(), 0..24)
}

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof!["[a-z ]{0,6}", Just("\n".to_string()), Just("\r\n".to_string())], 0..16)
        .prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn split_and_join_reproduce_content(text in text_strategy()) {
        let buffer = LineBuffer::from_text(&text);
        prop_assert_eq!(buffer.to_text(), text.clone());
        if !text.contains('\n') {
            prop_assert_eq!(buffer.line_ending(), LineEnding::Lf);
            prop_assert_eq!(buffer.len(), 1);
        }
    }

    #[test]
    fn match_index_lists_exactly_the_matching_lines(lines in lines_strategy()) {
        let pattern = Regex::new("a").unwrap();
        let matches = build_match_index(&lines, &pattern);

        prop_assert!(matches.windows(2).all(|w| w[0].line < w[1].line));
        let listed: Vec<usize> = matches.iter().map(|m| m.line).collect();
        for (index, line) in lines.iter().enumerate() {
            prop_assert_eq!(listed.contains(&index), line.contains('a'));
        }
        for m in &matches {
            prop_assert_eq!(&m.text, &lines[m.line]);
        }
    }

    #[test]
    fn resumption_is_first_match_at_or_after(lines in lines_strategy(), from in 0usize..30) {
        let matches = build_match_index(&lines, &Regex::new("b").unwrap());
        let expected = matches.iter().position(|m| m.line >= from);
        prop_assert_eq!(find_resumption(&matches, from), expected);
    }

    #[test]
    fn window_end_is_clamped(lines in lines_strategy(), begin in 0usize..24, window in 0usize..12) {
        prop_assume!(begin < lines.len());
        let end = resolve_end(&lines, begin, &EndBoundary::Window(window));
        prop_assert_eq!(end, (begin + window).min(lines.len()));
    }

    #[test]
    fn pattern_end_is_first_match_after_begin(lines in lines_strategy(), begin in 0usize..24) {
        prop_assume!(begin < lines.len());
        let boundary = EndBoundary::parse("x", 10).unwrap();
        let end = resolve_end(&lines, begin, &boundary);

        let first = lines.iter().enumerate().skip(begin + 1).find(|(_, l)| l.contains('x'));
        match first {
            Some((index, _)) => prop_assert_eq!(end, index + 1),
            // 見つからなければ空ブロック
            None => prop_assert_eq!(end, begin),
        }
        prop_assert!(end == begin || end > begin + 1);
    }

    #[test]
    fn splice_keeps_surroundings(
        lines in lines_strategy(),
        begin in 0usize..24,
        len in 0usize..8,
        replacement in proptest::collection::vec(short_line(), 0..6),
    ) {
        prop_assume!(begin <= lines.len());
        let end = (begin + len).min(lines.len());
        let mut buffer = LineBuffer::from_lines(lines.clone(), LineEnding::Lf);

        let next = buffer.splice(begin, end, replacement.clone());
        prop_assert_eq!(next, begin + replacement.len());
        prop_assert_eq!(buffer.len(), lines.len() - (end - begin) + replacement.len());
        prop_assert_eq!(&buffer.lines()[..begin], &lines[..begin]);
        prop_assert_eq!(&buffer.lines()[begin..next], &replacement[..]);
        prop_assert_eq!(&buffer.lines()[next..], &lines[end..]);
    }
}
