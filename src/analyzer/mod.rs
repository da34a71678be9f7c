//! Response Analyzer Module
//!
//! Extracts structured signals from free-text answers:
//! - Rank of the promoted club in the answer's enumerated ranking

pub mod rank;

pub use rank::{RankExtractor, extract_rank};
