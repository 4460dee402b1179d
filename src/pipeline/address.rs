use tracing::{debug, info, instrument};

use crate::constants::{is_excluded_territory, is_us_state};
use crate::types::{Flag, WorkingRecord};

/// Records after address shaping
#[derive(Debug, Default)]
pub struct AddressSplit {
    /// Domestic records with at least one address field; go on to validation
    pub records: Vec<WorkingRecord>,
    /// Domestic records with an entirely blank address; kept for audit only
    pub blank: Vec<WorkingRecord>,
    pub non_domestic: usize,
    pub territories: usize,
}

/// "# 4" and "#4" both become "Unit 4"
pub fn normalize_unit_marker(line: &str) -> String {
    line.replace("# ", "Unit ").replace('#', "Unit ")
}

fn clean_line(line: &str) -> &str {
    line.trim().trim_end_matches('.')
}

/// Classify one domestic record.
///
/// Blank detection runs first, so an all-blank address is never reported as
/// merely state-invalid. An invalid state does not stop the completeness check.
pub fn classify_address(record: &mut WorkingRecord) {
    let address1 = clean_line(&record.address.address1).to_string();
    let address2 = clean_line(&record.address.address2).to_string();
    let city = record.address.city.trim().to_string();
    let state = record.address.state.trim().to_uppercase();
    let zip = record.address.zip.trim().to_string();

    if [&address1, &address2, &city, &state, &zip]
        .iter()
        .all(|part| part.is_empty())
    {
        record.shape.blank = Flag::Y;
        record.shape.state_invalid = Flag::Y;
        return;
    }

    if !is_us_state(&state) {
        record.shape.state_invalid = Flag::Y;
        record.shape.incomplete = Flag::Y;
    }

    if address1.is_empty() || zip.is_empty() || state.is_empty() {
        record.shape.incomplete = Flag::Y;
    }

    if record.shape.incomplete.is_yes() {
        return;
    }

    record.shape.full_address = [&address1, &address2, &city, &state, &zip]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    record.address.address1 = address1;
    record.address.address2 = address2;
}

/// Keep domestic records, drop territories, and separate blank addresses
#[instrument(skip(records), fields(records = records.len()))]
pub fn shape_addresses(records: Vec<WorkingRecord>, domestic_country: &str) -> AddressSplit {
    let mut split = AddressSplit::default();

    for mut record in records {
        if record.address.country != domestic_country {
            split.non_domestic += 1;
            continue;
        }
        if is_excluded_territory(&record.address.state) {
            split.territories += 1;
            continue;
        }

        record.address.address2 = normalize_unit_marker(&record.address.address2);
        classify_address(&mut record);

        if record.shape.blank.is_yes() {
            debug!(row_id = record.row_id, "Blank address, moving to audit bucket");
            split.blank.push(record);
        } else {
            split.records.push(record);
        }
    }

    info!(
        "Address shaper: {} kept, {} blank, {} non-domestic, {} territory",
        split.records.len(),
        split.blank.len(),
        split.non_domestic,
        split.territories
    );
    split
}
