use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

use crate::constants::{CHECK_EMAIL, FIRSTNAME, LASTNAME, MIDDLENAME_INITIAL, OUTPUT_COLUMNS, REVIEW};
use crate::error::Result;
use crate::types::WorkingRecord;

fn output_order(a: &WorkingRecord, b: &WorkingRecord) -> Ordering {
    b.value(REVIEW)
        .cmp(&a.value(REVIEW))
        .then_with(|| b.value(CHECK_EMAIL).cmp(&a.value(CHECK_EMAIL)))
        .then_with(|| a.value(FIRSTNAME).cmp(&b.value(FIRSTNAME)))
        .then_with(|| a.value(MIDDLENAME_INITIAL).cmp(&b.value(MIDDLENAME_INITIAL)))
        .then_with(|| a.value(LASTNAME).cmp(&b.value(LASTNAME)))
}

/// Flagged rows first, then email matches, then by name. Stable.
pub fn sort_for_output(records: &mut [WorkingRecord]) {
    records.sort_by(output_order);
}

/// Write `records` as CSV in the fixed output schema, in the order given.
pub fn write_roster<W: Write>(writer: W, records: &[WorkingRecord]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(OUTPUT_COLUMNS)?;
    for record in records {
        out.write_record(OUTPUT_COLUMNS.iter().map(|column| record.value(column)).map(|v| v.into_owned()))?;
    }
    out.flush()?;
    Ok(())
}

#[instrument(skip(records), fields(records = records.len()))]
pub fn write_roster_file(path: &Path, records: &[WorkingRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_roster(std::io::BufWriter::new(file), records)?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
