use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument};

use crate::types::{Flag, NameLengths, NameOutcome, WorkingRecord};

/// Honorific or generational token at the very start of FIRSTNAME
static LEADING_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\b(?:mr|ms|mrs|dr|prof|sr|jr)\b").expect("leading title pattern should compile")
});

static PREFIX_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:mr|ms|mrs|dr|rev|prof)\b").expect("prefix pattern should compile")
});

static SUFFIX_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:jr|sr|ii|iii|iv|v)\b").expect("suffix pattern should compile")
});

/// Surname found in the email address. Skipped for blank emails and for
/// records whose primary name was kept as is.
pub fn check_email(record: &WorkingRecord) -> Flag {
    if record.email.is_empty() || record.name_outcome == Some(NameOutcome::Keep) {
        return Flag::N;
    }
    let email = record.email.to_lowercase();
    let found = [&record.primary.last, &record.spouse.last]
        .iter()
        .any(|surname| surname.chars().count() > 1 && email.contains(&surname.to_lowercase()));
    Flag::from_bool(found)
}

/// "T.J." -> "T J". Returns None when FIRSTNAME is left alone.
pub fn convert_initials(first: &str) -> Option<String> {
    if first.matches('.').count() > 1 && !LEADING_TITLE.is_match(first) {
        Some(first.replace('.', " ").trim().to_string())
    } else {
        None
    }
}

pub fn prefix_suspect(first: &str) -> bool {
    PREFIX_TOKEN.is_match(first)
}

pub fn suffix_suspect(first: &str) -> bool {
    SUFFIX_TOKEN.is_match(first)
}

/// Run the annotation steps on one record, in order:
/// email check, initials, prefix/suffix suspicion, period cleanup, full name, lengths.
pub fn annotate(record: &mut WorkingRecord) {
    record.check_email = check_email(record);

    if let Some(converted) = convert_initials(&record.primary.first) {
        record.primary.first = converted;
        record.transformed = Flag::Y;
    }

    record.prefix_suspect = Flag::from_bool(prefix_suspect(&record.primary.first));
    record.suffix_suspect = Flag::from_bool(suffix_suspect(&record.primary.first));
    if record.prefix_suspect.is_yes() || record.suffix_suspect.is_yes() {
        record.review.escalate();
    }

    record.primary.strip_periods();
    record.spouse.strip_periods();

    record.full_name = record.primary.full_name();
    record.name_lengths = NameLengths {
        first: record.primary.first.chars().count(),
        middle: record.primary.middle.chars().count(),
        last: record.primary.last.chars().count(),
        spouse_first: record.spouse.first.chars().count(),
        spouse_middle: record.spouse.middle.chars().count(),
        spouse_last: record.spouse.last.chars().count(),
    };
}

#[instrument(skip(records), fields(records = records.len()))]
pub fn annotate_all(records: &mut [WorkingRecord]) {
    let mut suspects = 0;
    let mut email_hits = 0;
    for record in records.iter_mut() {
        annotate(record);
        if record.prefix_suspect.is_yes() || record.suffix_suspect.is_yes() {
            suspects += 1;
        }
        if record.check_email.is_yes() {
            email_hits += 1;
        }
    }
    info!(
        "Annotation pass: {} prefix/suffix suspects, {} email surname matches",
        suspects, email_hits
    );
}
