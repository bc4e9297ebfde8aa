//! Recipient deduplication.
//!
//! Builds the eligible recipient set for a run from the raw record list.
//! Records are visited in source order so the first record carrying a given
//! phone number wins; later copies and numbers already delivered by a previous
//! run are counted as duplicates.

use std::collections::HashSet;

use blastline_common::types::{DedupCounts, NormalizedRecipient, RawRecord};

use crate::phone;

/// Eligible recipients plus the counters gathered while building them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleSet {
    pub recipients: Vec<NormalizedRecipient>,
    pub counts: DedupCounts,
}

pub struct RecipientDeduplicator;

impl RecipientDeduplicator {
    /// Build the ordered, duplicate-free recipient list.
    ///
    /// `already_sent` holds dedup keys of a previous run; matching records are
    /// skipped wherever they appear in `records`.
    pub fn build_eligible(records: &[RawRecord], already_sent: &HashSet<String>) -> EligibleSet {
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        let mut set = EligibleSet::default();

        for record in records {
            let canonical = match phone::normalize(record.raw_phone_text.as_deref()) {
                Ok(canonical) => canonical,
                Err(reason) => {
                    tracing::debug!(
                        name = %record.display_name,
                        %reason,
                        "Skipping record without a dialable phone"
                    );
                    set.counts.invalid += 1;
                    continue;
                }
            };

            let dedup_key = canonical.dedup_key();

            if already_sent.contains(&dedup_key) {
                tracing::debug!(name = %record.display_name, dedup_key = %dedup_key, "Skipping recipient sent by a previous run");
                set.counts.duplicates += 1;
                continue;
            }

            if !seen.insert(dedup_key.clone()) {
                tracing::debug!(name = %record.display_name, dedup_key = %dedup_key, "Skipping duplicate phone");
                set.counts.duplicates += 1;
                continue;
            }

            set.recipients.push(NormalizedRecipient {
                display_name: record.display_name.clone(),
                raw_phone_text: record.raw_phone_text.clone().unwrap_or_default(),
                canonical_phone: canonical.into_string(),
                dedup_key,
            });
        }

        set.counts.unique = set.recipients.len();
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(set: &EligibleSet) -> Vec<&str> {
        set.recipients.iter().map(|r| r.dedup_key.as_str()).collect()
    }

    #[test]
    fn test_scenario_duplicate_and_missing_phone() {
        let records = vec![
            RawRecord::new("Alice", Some("(404) 555-0100")),
            RawRecord::new("Bob", Some("4045550100")),
            RawRecord::new("Carol", None),
        ];

        let set = RecipientDeduplicator::build_eligible(&records, &HashSet::new());

        assert_eq!(set.recipients.len(), 1);
        assert_eq!(set.recipients[0].display_name, "Alice");
        assert_eq!(set.recipients[0].canonical_phone, "+14045550100");
        assert_eq!(set.recipients[0].raw_phone_text, "(404) 555-0100");
        assert_eq!(
            set.counts,
            DedupCounts {
                duplicates: 1,
                invalid: 1,
                unique: 1
            }
        );
    }

    #[test]
    fn test_first_seen_name_wins_across_formats() {
        let records = vec![
            RawRecord::new("Erin", Some("+1 404 555 0199")),
            RawRecord::new("Frank", Some("(404) 555-0123")),
            RawRecord::new("Erin B.", Some("404.555.0199")),
            RawRecord::new("Erin C.", Some("14045550199")),
        ];

        let set = RecipientDeduplicator::build_eligible(&records, &HashSet::new());

        assert_eq!(keys(&set), vec!["14045550199", "14045550123"]);
        assert_eq!(set.recipients[0].display_name, "Erin");
        assert_eq!(set.counts.duplicates, 2);
    }

    #[test]
    fn test_resume_skip_at_any_position() {
        let records = vec![
            RawRecord::new("A", Some("4045550101")),
            RawRecord::new("B", Some("4045550102")),
            RawRecord::new("C", Some("4045550103")),
        ];
        let sent: HashSet<String> = ["14045550101", "14045550103"]
            .into_iter()
            .map(String::from)
            .collect();

        let set = RecipientDeduplicator::build_eligible(&records, &sent);

        assert_eq!(keys(&set), vec!["14045550102"]);
        assert_eq!(set.counts.duplicates, 2);
        assert_eq!(set.counts.unique, 1);
    }

    #[test]
    fn test_resume_skip_counts_every_copy() {
        let records = vec![
            RawRecord::new("A", Some("4045550101")),
            RawRecord::new("A again", Some("(404) 555-0101")),
        ];
        let sent: HashSet<String> = ["14045550101".to_string()].into_iter().collect();

        let set = RecipientDeduplicator::build_eligible(&records, &sent);

        assert!(set.recipients.is_empty());
        assert_eq!(set.counts.duplicates, 2);
    }

    #[test]
    fn test_invalid_records_do_not_stop_processing() {
        let records = vec![
            RawRecord::new("Short", Some("555-0100")),
            RawRecord::new("Blank", Some("")),
            RawRecord::new("Good", Some("4045550100")),
        ];

        let set = RecipientDeduplicator::build_eligible(&records, &HashSet::new());

        assert_eq!(set.counts.invalid, 2);
        assert_eq!(keys(&set), vec!["14045550100"]);
    }

    #[test]
    fn test_empty_input() {
        let set = RecipientDeduplicator::build_eligible(&[], &HashSet::new());
        assert_eq!(set, EligibleSet::default());
    }
}
