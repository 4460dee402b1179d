//! Name transformer
//!
//! Splits "John and Jane" style first names, then runs the ordered name rules:
//! keep a usable primary, otherwise promote a usable spouse, otherwise flag
//! the record for review.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::types::{Flag, NameGroup, NameOutcome, WorkingRecord};

static CONJUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\band\b|&").expect("conjunction pattern should compile"));

/// Result of splitting FIRSTNAME on conjunctions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConjunctionSplit {
    /// No "and" or "&" present
    None,
    /// Exactly two names, trimmed
    Pair(String, String),
    /// Three or more names; left for a human
    Ambiguous,
}

pub fn has_conjunction(first: &str) -> bool {
    CONJUNCTION.is_match(first)
}

pub fn split_conjunction(first: &str) -> ConjunctionSplit {
    if !has_conjunction(first) {
        return ConjunctionSplit::None;
    }
    let parts: Vec<&str> = CONJUNCTION.split(first).collect();
    match parts.as_slice() {
        [primary, spouse] => ConjunctionSplit::Pair(primary.trim().to_string(), spouse.trim().to_string()),
        _ => ConjunctionSplit::Ambiguous,
    }
}

/// One row of the name decision table
pub struct NameRule {
    pub name: &'static str,
    pub applies: fn(&NameGroup, &NameGroup) -> bool,
    pub outcome: NameOutcome,
}

fn primary_well_formed(primary: &NameGroup, _spouse: &NameGroup) -> bool {
    primary.is_well_formed()
}

fn spouse_well_formed(primary: &NameGroup, spouse: &NameGroup) -> bool {
    primary.is_placeholder() && spouse.is_well_formed()
}

fn always(_primary: &NameGroup, _spouse: &NameGroup) -> bool {
    true
}

/// Evaluated top to bottom; the first matching rule decides.
pub const NAME_RULES: &[NameRule] = &[
    NameRule {
        name: "primary_well_formed",
        applies: primary_well_formed,
        outcome: NameOutcome::Keep,
    },
    NameRule {
        name: "spouse_well_formed",
        applies: spouse_well_formed,
        outcome: NameOutcome::Swap,
    },
    NameRule {
        name: "unusable",
        applies: always,
        outcome: NameOutcome::Flag,
    },
];

/// Pick the outcome for a primary/spouse pair. Pure; does not touch the record.
pub fn decide(primary: &NameGroup, spouse: &NameGroup) -> NameOutcome {
    NAME_RULES
        .iter()
        .find(|rule| (rule.applies)(primary, spouse))
        .map(|rule| rule.outcome)
        .unwrap_or(NameOutcome::Flag)
}

/// Apply the conjunction split and the decision table to one record
pub fn transform_names(record: &mut WorkingRecord) -> NameOutcome {
    record.had_and = Flag::from_bool(has_conjunction(&record.primary.first));

    match split_conjunction(&record.primary.first) {
        ConjunctionSplit::Pair(primary, spouse) => {
            record.primary.first = primary;
            record.spouse.first = spouse;
        }
        ConjunctionSplit::Ambiguous => {
            debug!(row_id = record.row_id, first = %record.primary.first, "Ambiguous multi-name first name");
            record.review.escalate();
            record.transformed = Flag::N;
            record.name_outcome = Some(NameOutcome::AmbiguousSplit);
            return NameOutcome::AmbiguousSplit;
        }
        ConjunctionSplit::None => {}
    }

    let outcome = decide(&record.primary, &record.spouse);
    match outcome {
        NameOutcome::Keep => {
            record.review.clear();
            record.transformed = Flag::N;
        }
        NameOutcome::Swap => {
            record.swap_name_groups();
            record.review.clear();
            record.transformed = Flag::Y;
        }
        NameOutcome::Flag | NameOutcome::AmbiguousSplit => {
            record.review.escalate();
            record.transformed = Flag::N;
        }
    }
    record.name_outcome = Some(outcome);
    outcome
}

/// Per-outcome counts for one stage run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NameStageSummary {
    pub kept: usize,
    pub swapped: usize,
    pub flagged: usize,
    pub ambiguous: usize,
}

#[instrument(skip(records), fields(records = records.len()))]
pub fn transform_all(records: &mut [WorkingRecord]) -> NameStageSummary {
    let mut summary = NameStageSummary::default();
    for record in records.iter_mut() {
        match transform_names(record) {
            NameOutcome::Keep => summary.kept += 1,
            NameOutcome::Swap => summary.swapped += 1,
            NameOutcome::Flag => summary.flagged += 1,
            NameOutcome::AmbiguousSplit => summary.ambiguous += 1,
        }
    }
    info!(
        "Name transformer: {} kept, {} swapped, {} flagged, {} ambiguous",
        summary.kept, summary.swapped, summary.flagged, summary.ambiguous
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(primary: NameGroup, spouse: NameGroup) -> WorkingRecord {
        WorkingRecord {
            primary,
            spouse,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_on_and_and_ampersand() {
        assert_eq!(
            split_conjunction("John and Jane"),
            ConjunctionSplit::Pair("John".into(), "Jane".into())
        );
        assert_eq!(
            split_conjunction("John & Jane"),
            ConjunctionSplit::Pair("John".into(), "Jane".into())
        );
        assert_eq!(
            split_conjunction("Bob AND Sue"),
            ConjunctionSplit::Pair("Bob".into(), "Sue".into())
        );
        assert_eq!(split_conjunction("Andrew"), ConjunctionSplit::None);
        assert_eq!(split_conjunction("Sandy"), ConjunctionSplit::None);
        assert_eq!(
            split_conjunction("Tom, Dick and Harry & Sally"),
            ConjunctionSplit::Ambiguous
        );
    }

    #[test]
    fn test_conjunction_split_sets_spouse_first_name() {
        let mut r = record(
            NameGroup::new("John and Jane", "", "Smith", ""),
            NameGroup::new("Janet", "", "", ""),
        );
        let outcome = transform_names(&mut r);
        assert_eq!(outcome, NameOutcome::Keep);
        assert_eq!(r.primary.first, "John");
        assert_eq!(r.spouse.first, "Jane");
        assert_eq!(r.had_and, Flag::Y);
        assert_eq!(r.review.flag(), Some(Flag::N));
        assert_eq!(r.transformed, Flag::N);
    }

    #[test]
    fn test_ambiguous_split_is_flagged_and_left_alone() {
        let mut r = record(
            NameGroup::new("Al and Bo and Cy", "", "Smith", ""),
            NameGroup::default(),
        );
        assert_eq!(transform_names(&mut r), NameOutcome::AmbiguousSplit);
        assert_eq!(r.primary.first, "Al and Bo and Cy");
        assert!(r.review.is_flagged());
        assert_eq!(r.transformed, Flag::N);
        assert_eq!(r.had_and, Flag::Y);
    }

    #[test]
    fn test_both_groups_well_formed_keeps_primary() {
        let primary = NameGroup::new("John", "Q", "Public", "Jr");
        let spouse = NameGroup::new("Jane", "", "Public", "");
        let mut r = record(primary.clone(), spouse.clone());
        assert_eq!(transform_names(&mut r), NameOutcome::Keep);
        assert_eq!(r.primary, primary);
        assert_eq!(r.spouse, spouse);
        assert_eq!(r.transformed, Flag::N);
    }

    #[test]
    fn test_only_spouse_well_formed_swaps_all_four_fields() {
        let primary = NameGroup::new("J", "", "", "III");
        let spouse = NameGroup::new("Mary", "Ann", "Jones", "PhD");
        let mut r = record(primary.clone(), spouse.clone());
        assert_eq!(transform_names(&mut r), NameOutcome::Swap);
        assert_eq!(r.primary, spouse);
        assert_eq!(r.spouse, primary);
        assert_eq!(r.transformed, Flag::Y);
        assert_eq!(r.review.flag(), Some(Flag::N));
    }

    #[test]
    fn test_initial_with_middle_name_counts_as_well_formed() {
        let mut r = record(
            NameGroup::new("J.", "Robert", "Oppen", ""),
            NameGroup::new("Kitty", "", "Oppen", ""),
        );
        assert_eq!(transform_names(&mut r), NameOutcome::Keep);
        assert_eq!(r.primary.first, "J.");
    }

    #[test]
    fn test_no_usable_group_is_flagged() {
        let mut r = record(NameGroup::new("J", "", "S", ""), NameGroup::new("K", "", "", ""));
        assert_eq!(transform_names(&mut r), NameOutcome::Flag);
        assert!(r.review.is_flagged());
        assert_eq!(r.transformed, Flag::N);
    }

    #[test]
    fn test_usable_middle_name_blocks_swap() {
        // first is blank but middle is a full name: not a placeholder, so no swap
        let primary = NameGroup::new("", "Robert", "Smith", "");
        let spouse = NameGroup::new("Mary", "", "Smith", "");
        assert_eq!(decide(&primary, &spouse), NameOutcome::Flag);
    }

    #[test]
    fn test_rule_order_is_keep_swap_flag() {
        let names: Vec<&str> = NAME_RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["primary_well_formed", "spouse_well_formed", "unusable"]);
    }

    #[test]
    fn test_decision_is_idempotent_after_swap() {
        let mut r = record(
            NameGroup::new("", "", "", ""),
            NameGroup::new("Mary", "", "Jones", ""),
        );
        transform_names(&mut r);
        assert_eq!(decide(&r.primary, &r.spouse), NameOutcome::Keep);
    }
}
