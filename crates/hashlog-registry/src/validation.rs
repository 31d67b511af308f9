use hashlog_types::{Entry, EntryIndex, DIGEST_CAPACITY};

use crate::log::EntryLog;

/// Result of a registry consistency check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Count the registry reports.
    pub count: u64,
    /// Number of records actually examined.
    pub records: u64,
    pub violations: Vec<Violation>,
}

impl ConsistencyReport {
    /// Returns `true` if all checks passed.
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty() && self.count == self.records
    }
}

/// A specific invariant violation found during verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub index: EntryIndex,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    IndexGap,
    SentinelStored,
    OversizedTriple,
    AnonymousWriter,
    CountMismatch,
}

/// Registry invariant checker.
pub struct RegistryVerifier;

impl RegistryVerifier {
    pub fn verify_log(log: &EntryLog) -> ConsistencyReport {
        Self::verify_entries(log.len(), log.iter())
    }

    /// Check `entries` against a claimed `count`.
    pub fn verify_entries<'a, I>(count: u64, entries: I) -> ConsistencyReport
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let mut violations = Vec::new();
        let mut records = 0u64;

        for (position, entry) in entries.into_iter().enumerate() {
            records += 1;
            let expected = EntryIndex(position as u64);
            if entry.index != expected {
                violations.push(Violation {
                    index: entry.index,
                    kind: ViolationKind::IndexGap,
                    description: format!("expected {expected}, found {}", entry.index),
                });
            }
            if entry.triple.is_sentinel() {
                violations.push(Violation {
                    index: entry.index,
                    kind: ViolationKind::SentinelStored,
                    description: "sentinel triple stored as an entry".into(),
                });
            }
            if entry.triple.size as usize > DIGEST_CAPACITY {
                violations.push(Violation {
                    index: entry.index,
                    kind: ViolationKind::OversizedTriple,
                    description: format!("size {} exceeds {DIGEST_CAPACITY}", entry.triple.size),
                });
            }
            if entry.writer.is_anonymous() {
                violations.push(Violation {
                    index: entry.index,
                    kind: ViolationKind::AnonymousWriter,
                    description: "entry has no identifiable writer".into(),
                });
            }
        }

        if count != records {
            violations.push(Violation {
                index: EntryIndex(count),
                kind: ViolationKind::CountMismatch,
                description: format!("count {count} but {records} records"),
            });
        }

        ConsistencyReport {
            count,
            records,
            violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashlog_types::{Triple, WriterId};

    fn entry(index: u64) -> Entry {
        Entry {
            index: EntryIndex(index),
            triple: Triple::new([index as u8 + 1; 32], 0x12, 32),
            writer: WriterId::account("alice"),
        }
    }

    #[test]
    fn clean_entries_are_consistent() {
        let entries = vec![entry(0), entry(1)];
        let report = RegistryVerifier::verify_entries(2, &entries);
        assert!(report.is_consistent());
        assert_eq!(report.records, 2);
    }

    #[test]
    fn detects_gap_and_count_mismatch() {
        let entries = vec![entry(0), entry(2)];
        let report = RegistryVerifier::verify_entries(3, &entries);
        assert!(!report.is_consistent());
        let kinds: Vec<_> = report.violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::IndexGap, ViolationKind::CountMismatch]);
    }

    #[test]
    fn detects_bad_triples_and_writers() {
        let mut bad = entry(0);
        bad.triple = Triple::SENTINEL;
        bad.writer = WriterId::ANONYMOUS;
        let mut oversized = entry(1);
        oversized.triple.size = 64;

        let entries = vec![bad, oversized];
        let report = RegistryVerifier::verify_entries(2, &entries);
        let kinds: Vec<_> = report.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::SentinelStored,
                ViolationKind::AnonymousWriter,
                ViolationKind::OversizedTriple,
            ]
        );
    }

    #[test]
    fn empty_log_is_consistent() {
        assert!(RegistryVerifier::verify_log(&EntryLog::new()).is_consistent());
    }
}
