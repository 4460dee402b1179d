use tracing::{debug, info};

use crate::constants::{ORGANIZATION_MARKERS, ORGANIZATION_SCAN_COLUMNS};
use crate::types::WorkingRecord;

/// True when any scanned name column mentions "family" or "foundation".
///
/// Plain substring match: "The Smith Family" is caught, "Smith Charitable Trust" is not.
pub fn is_organization(record: &WorkingRecord) -> bool {
    ORGANIZATION_SCAN_COLUMNS.iter().any(|column| {
        let value = record.value(column).to_lowercase();
        ORGANIZATION_MARKERS
            .iter()
            .any(|marker| value.contains(*marker))
    })
}

/// Drop organizational donors. Returns the kept records and the number removed.
pub fn filter_organizations(records: Vec<WorkingRecord>) -> (Vec<WorkingRecord>, usize) {
    let before = records.len();
    let kept: Vec<WorkingRecord> = records
        .into_iter()
        .filter(|record| {
            let organization = is_organization(record);
            if organization {
                debug!(row_id = record.row_id, "Dropping organizational record");
            }
            !organization
        })
        .collect();
    let removed = before - kept.len();
    info!("Content filter removed {} organizational records", removed);
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NameGroup;

    fn record(primary: NameGroup, spouse: NameGroup) -> WorkingRecord {
        WorkingRecord {
            primary,
            spouse,
            ..Default::default()
        }
    }

    #[test]
    fn test_family_and_foundation_are_case_insensitive() {
        let family = record(
            NameGroup::new("The", "", "Smith FAMILY", ""),
            NameGroup::default(),
        );
        let foundation = record(
            NameGroup::default(),
            NameGroup::new("", "", "Gates Foundation", ""),
        );
        assert!(is_organization(&family));
        assert!(is_organization(&foundation));
    }

    #[test]
    fn test_middle_name_and_email_are_not_scanned() {
        let mut person = record(
            NameGroup::new("Ann", "Family", "Lee", ""),
            NameGroup::default(),
        );
        person.email = "family@example.com".to_string();
        assert!(!is_organization(&person));
    }

    #[test]
    fn test_filter_counts_removed_records() {
        let records = vec![
            record(NameGroup::new("Ann", "", "Lee", ""), NameGroup::default()),
            record(NameGroup::new("Lee", "", "Family", ""), NameGroup::default()),
            record(NameGroup::new("Jo", "", "Smith", "Foundation"), NameGroup::default()),
        ];
        let (kept, removed) = filter_organizations(records);
        assert_eq!(removed, 2);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].primary.first, "Ann");
    }
}
