//! Fingerprinting of rule snapshots using Blake3

use crate::rule::Rule;
use blake3::Hasher as Blake3Hasher;
use std::fmt;

/// Blake3 digest identifying an ordered rule sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleFingerprint(pub [u8; 32]);

impl fmt::Display for RuleFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Hashes the rule sequence a batch runs against.
///
/// Two reports with the same fingerprint were produced by the same rules in
/// the same order, so a dry run can be checked against the real run.
#[derive(Debug, Clone, Default)]
pub struct RuleSetHasher;

impl RuleSetHasher {
    pub fn new() -> Self {
        Self
    }

    /// Digest of `rules` in the given order
    pub fn fingerprint(&self, rules: &[Rule]) -> RuleFingerprint {
        let mut hasher = Blake3Hasher::new();
        hasher.update(&(rules.len() as u64).to_le_bytes());

        for rule in rules {
            hasher.update(rule.id.as_bytes());
            // Rules are plain strings, enums and integers, so encoding only
            // degrades to the id if bincode itself is broken
            hasher.update(&bincode::serialize(rule).unwrap_or_default());
        }

        RuleFingerprint(*hasher.finalize().as_bytes())
    }
}
