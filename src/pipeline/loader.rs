use encoding_rs::{Encoding, UTF_8};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::constants::{DROPPED_COLUMNS, REQUIRED_COLUMNS};
use crate::error::{Result, RosterError};
use crate::types::WorkingRecord;

/// Roster as read from disk: trimmed headers plus one working record per non-blank row
#[derive(Debug)]
pub struct LoadedRoster {
    pub headers: Vec<String>,
    pub records: Vec<WorkingRecord>,
    /// Rows dropped because every cell was blank
    pub blank_rows: usize,
}

/// Decode raw bytes with the declared encoding label (e.g. "ISO-8859-1", "utf-8").
///
/// Legacy single-byte encodings map every byte, so only strict encodings such as
/// UTF-8 can fail here.
pub fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| RosterError::Encoding(format!("unknown encoding label '{}'", label)))?;

    if encoding == UTF_8 {
        let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        return UTF_8
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
            .ok_or_else(|| RosterError::Encoding("input is not valid UTF-8".to_string()));
    }

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(RosterError::Encoding(format!(
            "input contains bytes that are not valid {}",
            used.name()
        )));
    }
    Ok(text.into_owned())
}

/// Parse a decoded roster. Any malformed row or missing required column fails the whole load.
#[instrument(skip(bytes), fields(bytes = bytes.len(), encoding = %encoding_label))]
pub fn load_roster(bytes: &[u8], encoding_label: &str) -> Result<LoadedRoster> {
    let text = decode(bytes, encoding_label)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(RosterError::MissingColumns(missing));
    }

    let kept_headers: Vec<String> = headers
        .iter()
        .filter(|h| !DROPPED_COLUMNS.contains(&h.as_str()))
        .cloned()
        .collect();

    let mut records = Vec::new();
    let mut blank_rows = 0;
    for (row_id, row) in reader.records().enumerate() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            blank_rows += 1;
            continue;
        }

        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .filter(|(header, _)| !DROPPED_COLUMNS.contains(&header.as_str()))
            .map(|(header, cell)| (header.clone(), cell.trim().to_string()))
            .collect();
        records.push(WorkingRecord::from_fields(row_id, fields));
    }

    debug!("Dropped {} wholly blank rows", blank_rows);
    info!("Loaded {} roster rows ({} columns)", records.len(), kept_headers.len());

    Ok(LoadedRoster {
        headers: kept_headers,
        records,
        blank_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    const HEADER: &str = "ROI_ID,PREFIX,FIRSTNAME,MIDDLENAME_INITIAL,LASTNAME,SUFFIX,SPOUSEPREFIX,SPOUSEFIRSTNAME,SPOUSEMIDDLENAME_INITIAL,SPOUSELASTNAME,SPOUSESUFFIX,EMAIL,ADDRESS1,ADDRESS2,CITY,STATE_PROVINCE,ZIP_POSTALCODE,COUNTRY";

    /// Required columns not spelled out in `HEADER`, appended after it
    fn trailing_columns() -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !HEADER.split(',').any(|h| h == *c))
            .collect()
    }

    fn header() -> String {
        format!("{},{}", HEADER, trailing_columns().join(","))
    }

    /// Empty cells for the trailing columns
    fn padding() -> String {
        ",".repeat(trailing_columns().len())
    }

    fn row(cells: &str) -> String {
        format!("{}{}", cells, padding())
    }

    fn header_without(column: &str) -> String {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| **c != column)
            .copied()
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_load_trims_and_drops_prefix_columns() {
        let csv = format!(
            "{}\n{}\n",
            header(),
            row(" 7 ,Mr., John ,,Smith,,Mrs.,Jane,,Smith,,j@x.com,1 Main St,,Town,WA,98101,US")
        );
        let roster = load_roster(csv.as_bytes(), "utf-8").unwrap();
        assert_eq!(roster.records.len(), 1);
        assert!(!roster.headers.iter().any(|h| h == "PREFIX" || h == "SPOUSEPREFIX"));

        let record = &roster.records[0];
        assert_eq!(record.primary.first, "John");
        assert_eq!(record.value(ROI_ID), "7");
        assert_eq!(record.value("PREFIX"), "");
        assert_eq!(record.address.country, "US");
    }

    #[test]
    fn test_load_drops_wholly_blank_rows() {
        let csv = format!(
            "{}\n{}\n{}\n{}\n",
            header(),
            row(",,,,,,,,,,,,,,,,,"),
            row("1,,Ann,,Lee,,,,,,,,,,,,,US"),
            row("  ,, ,,,,,,,,,,,,,,,")
        );
        let roster = load_roster(csv.as_bytes(), "utf-8").unwrap();
        assert_eq!(roster.records.len(), 1);
        assert_eq!(roster.blank_rows, 2);
        assert_eq!(roster.records[0].row_id, 1);
    }

    #[test]
    fn test_load_decodes_latin1() {
        let mut bytes = format!("{}\n1,,Jos", header()).into_bytes();
        bytes.push(0xE9);
        bytes.extend_from_slice(b",,Garc\xEDa,,,,,,,,,,,,,US");
        bytes.extend_from_slice(padding().as_bytes());
        bytes.push(b'\n');
        let roster = load_roster(&bytes, "ISO-8859-1").unwrap();
        assert_eq!(roster.records[0].primary.first, "José");
        assert_eq!(roster.records[0].primary.last, "García");
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let mut bytes = format!("{}\n1,,Jos", header()).into_bytes();
        bytes.push(0xE9);
        bytes.extend_from_slice(b",,Smith,,,,,,,,,,,,,US");
        bytes.extend_from_slice(padding().as_bytes());
        bytes.push(b'\n');
        assert!(matches!(
            load_roster(&bytes, "utf-8"),
            Err(RosterError::Encoding(_))
        ));
    }

    #[test]
    fn test_unknown_encoding_label_is_fatal() {
        assert!(matches!(
            load_roster(header().as_bytes(), "klingon"),
            Err(RosterError::Encoding(_))
        ));
    }

    #[test]
    fn test_missing_required_columns_is_fatal() {
        let csv = "FIRSTNAME,LASTNAME\nJohn,Smith\n";
        match load_roster(csv.as_bytes(), "utf-8") {
            Err(RosterError::MissingColumns(missing)) => {
                assert!(missing.contains(&EMAIL.to_string()));
                assert!(missing.contains(&ROI_ID.to_string()));
                assert!(!missing.contains(&FIRSTNAME.to_string()));
            }
            other => panic!("expected missing columns error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_roi_id_is_fatal() {
        let csv = format!("{}\n", header_without(ROI_ID));
        match load_roster(csv.as_bytes(), "utf-8") {
            Err(RosterError::MissingColumns(missing)) => assert_eq!(missing, vec![ROI_ID.to_string()]),
            other => panic!("expected missing columns error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_dropped_or_passthrough_column_is_fatal() {
        for column in ["PREFIX", "SPOUSEPREFIX", "LARGESTGIFT", "BUSINESS"] {
            let csv = format!("{}\n", header_without(column));
            match load_roster(csv.as_bytes(), "utf-8") {
                Err(RosterError::MissingColumns(missing)) => assert_eq!(missing, vec![column.to_string()]),
                other => panic!("expected {} to be required, got {:?}", column, other),
            }
        }
    }

    #[test]
    fn test_ragged_row_is_fatal() {
        let csv = format!("{}\n1,2,3\n", header());
        assert!(matches!(
            load_roster(csv.as_bytes(), "utf-8"),
            Err(RosterError::Csv(_))
        ));
    }
}
