//! Rank Extraction
//!
//! Finds where the promoted club sits in an answer's ranking. Only the first
//! line that mentions the marker is inspected: after trimming, it must start
//! with one of `1.` `1、` `2.` `2、` `3.` `3、` (checked in that order). Any other
//! shape yields rank 0, even if a later line would have matched.

use crate::constants::analyzer::RANK_PREFIXES;
use crate::types::Rank;

/// Extract the rank of `marker` from `answer_text`; 0 when no signal is found.
pub fn extract_rank(answer_text: &str, marker: &str) -> Rank {
    let Some(line) = answer_text.lines().find(|line| line.contains(marker)) else {
        return Rank::NONE;
    };

    let trimmed = line.trim();
    RANK_PREFIXES
        .iter()
        .find(|(prefix, _)| trimmed.starts_with(prefix))
        .and_then(|&(_, rank)| Rank::new(rank))
        .unwrap_or(Rank::NONE)
}

/// Rank extractor bound to a configured marker
#[derive(Debug, Clone)]
pub struct RankExtractor {
    marker: String,
}

impl RankExtractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn extract(&self, answer_text: &str) -> Rank {
        extract_rank(answer_text, &self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MARKER: &str = "物理研究部";

    fn rank_of(text: &str) -> u8 {
        extract_rank(text, MARKER).get()
    }

    #[test]
    fn test_first_place() {
        assert_eq!(rank_of("1. 物理研究部は..."), 1);
        assert_eq!(rank_of("1、物理研究部"), 1);
    }

    #[test]
    fn test_second_and_third_place() {
        let text = "ランキング\n1. 科学研究部\n2. 物理研究部（レゴ）\n3. 模型部";
        assert_eq!(rank_of(text), 2);
        assert_eq!(rank_of("  3、物理研究部  "), 3);
    }

    #[test]
    fn test_marker_absent() {
        assert_eq!(rank_of("1. 科学研究部\n2. 模型部"), 0);
        assert_eq!(rank_of(""), 0);
    }

    #[test]
    fn test_first_marker_line_wins() {
        assert_eq!(rank_of("物理研究部について\n2. ..."), 0);
        assert_eq!(rank_of("物理研究部について\n2. 物理研究部"), 0);
        assert_eq!(rank_of("1. 物理研究部\n物理研究部は最高"), 1);
    }

    #[test]
    fn test_non_matching_prefixes() {
        assert_eq!(rank_of("4. 物理研究部"), 0);
        assert_eq!(rank_of("10. 物理研究部"), 0);
        assert_eq!(rank_of("**1. 物理研究部**"), 0);
        assert_eq!(rank_of("1) 物理研究部"), 0);
    }

    #[test]
    fn test_crlf_lines() {
        assert_eq!(rank_of("intro\r\n  2. 物理研究部\r\n"), 2);
    }

    #[test]
    fn test_english_marker() {
        let extractor = RankExtractor::new("Physics Club");
        assert_eq!(extractor.extract("1. Physics Club: build robots").get(), 1);
        assert_eq!(extractor.marker(), "Physics Club");
    }

    proptest! {
        #[test]
        fn prop_rank_in_range(text in "\\PC*") {
            prop_assert!(extract_rank(&text, MARKER).get() <= 3);
        }

        #[test]
        fn prop_absent_marker_is_zero(text in "[a-z0-9.、 \n]*") {
            prop_assert_eq!(rank_of(&text), 0);
        }

        #[test]
        fn prop_leading_prefix_matches(n in 1u8..=3, sep in prop::sample::select(vec![".", "、"]), tail in "[a-z ]*") {
            let text = format!("intro\n  {}{}{}{}\nmore", n, sep, MARKER, tail);
            prop_assert_eq!(rank_of(&text), n);
        }
    }
}
