//! Version-gated keyword check over raw source text.
//!
//! Matching is a plain substring search, not tokenization: a keyword inside a
//! string literal or a longer identifier (`rematch_case`) also trips the gate.

use tracing::warn;

use crate::config::{DialectVersion, KeywordRule};
use crate::error::UnsupportedKeywordError;

/// Fail on the first configured keyword that is newer than `target` and
/// occurs anywhere in `source`.
///
/// Rules and keywords are scanned in configuration order. Empty keywords are
/// ignored.
pub fn check_keywords(
    source: &str,
    target: DialectVersion,
    rules: &[KeywordRule],
) -> Result<(), UnsupportedKeywordError> {
    for rule in rules.iter().filter(|r| r.version > target) {
        for keyword in rule.keywords.iter().filter(|k| !k.is_empty()) {
            if source.contains(keyword.as_str()) {
                warn!(
                    keyword = %keyword,
                    introduced = %rule.version,
                    current = %target,
                    "source uses a keyword newer than the target version"
                );
                return Err(UnsupportedKeywordError {
                    keyword: keyword.clone(),
                    introduced: rule.version,
                    current: target,
                });
            }
        }
    }
    Ok(())
}
