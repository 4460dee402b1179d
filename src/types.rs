use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::*;

/// Y/N marker as written to the output roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flag {
    Y,
    #[default]
    N,
}

impl Flag {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Flag::Y
        } else {
            Flag::N
        }
    }

    pub fn is_yes(self) -> bool {
        self == Flag::Y
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Y => "Y",
            Flag::N => "N",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The REVIEW marker. Starts unset; `clear` only decides an unset marker,
/// `escalate` always wins, so a Y can never go back to N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Review(Option<Flag>);

impl Review {
    pub fn escalate(&mut self) {
        self.0 = Some(Flag::Y);
    }

    pub fn clear(&mut self) {
        if self.0.is_none() {
            self.0 = Some(Flag::N);
        }
    }

    pub fn flag(&self) -> Option<Flag> {
        self.0
    }

    pub fn is_flagged(&self) -> bool {
        self.0 == Some(Flag::Y)
    }

    pub fn as_str(&self) -> &'static str {
        self.0.map(Flag::as_str).unwrap_or("")
    }
}

/// Tagged result of the name decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameOutcome {
    /// Primary group is usable as is
    Keep,
    /// Spouse group was promoted to primary
    Swap,
    /// Neither group is usable
    Flag,
    /// FIRSTNAME held more than one conjunction
    AmbiguousSplit,
}

/// Count of alphabetic characters, ignoring periods.
pub fn alpha_count(s: &str) -> usize {
    s.chars().filter(|c| *c != '.' && c.is_alphabetic()).count()
}

/// One person's name quadruple
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameGroup {
    pub first: String,
    pub middle: String,
    pub last: String,
    pub suffix: String,
}

impl NameGroup {
    pub fn new(first: &str, middle: &str, last: &str, suffix: &str) -> Self {
        Self {
            first: first.to_string(),
            middle: middle.to_string(),
            last: last.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// First and last usable, or a single initial carried by a usable middle name.
    pub fn is_well_formed(&self) -> bool {
        let first = alpha_count(&self.first);
        let middle = alpha_count(&self.middle);
        let last = alpha_count(&self.last);
        (first > 1 && last > 1) || (first == 1 && middle > 1 && last > 1)
    }

    /// First name and middle name are both at most an initial
    pub fn is_placeholder(&self) -> bool {
        alpha_count(&self.first) <= 1 && alpha_count(&self.middle) <= 1
    }

    pub fn strip_periods(&mut self) {
        for field in [
            &mut self.first,
            &mut self.middle,
            &mut self.last,
            &mut self.suffix,
        ] {
            if field.contains('.') {
                *field = field.replace('.', "");
            }
        }
    }

    pub fn full_name(&self) -> String {
        [&self.first, &self.middle, &self.last, &self.suffix]
            .iter()
            .flat_map(|part| part.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Character counts of the cleaned name fields, kept for spreadsheet sorting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameLengths {
    pub first: usize,
    pub middle: usize,
    pub last: usize,
    pub spouse_first: usize,
    pub spouse_middle: usize,
    pub spouse_last: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl PostalAddress {
    pub fn is_blank(&self) -> bool {
        [
            &self.address1,
            &self.address2,
            &self.city,
            &self.state,
            &self.zip,
        ]
        .iter()
        .all(|s| s.is_empty())
    }
}

/// Working fields of the address shaper; never emitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressShape {
    pub blank: Flag,
    pub state_invalid: Flag,
    pub incomplete: Flag,
    pub full_address: String,
}

/// V_* columns. All empty until a verification response is merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedAddress {
    pub street: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub zip5: String,
    pub zip4: String,
    pub validation_error: String,
}

/// One roster row as it moves through the pipeline
#[derive(Debug, Clone, Default)]
pub struct WorkingRecord {
    /// Position in the input file; merge key for verification results
    pub row_id: usize,
    pub primary: NameGroup,
    pub spouse: NameGroup,
    pub email: String,
    pub address: PostalAddress,
    /// Columns the pipeline does not interpret (ids, gift history, phone, ...)
    pub passthrough: BTreeMap<String, String>,

    pub review: Review,
    pub transformed: Flag,
    pub had_and: Flag,
    pub check_email: Flag,
    pub prefix_suspect: Flag,
    pub suffix_suspect: Flag,
    pub name_outcome: Option<NameOutcome>,
    pub full_name: String,
    pub name_lengths: NameLengths,

    pub shape: AddressShape,
    pub validated: ValidatedAddress,
}

impl WorkingRecord {
    /// Build a record from header/value pairs. Missing columns read as empty.
    pub fn from_fields(row_id: usize, mut fields: BTreeMap<String, String>) -> Self {
        let mut take = |column: &str| fields.remove(column).unwrap_or_default();

        let primary = NameGroup {
            first: take(FIRSTNAME),
            middle: take(MIDDLENAME_INITIAL),
            last: take(LASTNAME),
            suffix: take(SUFFIX),
        };
        let spouse = NameGroup {
            first: take(SPOUSEFIRSTNAME),
            middle: take(SPOUSEMIDDLENAME_INITIAL),
            last: take(SPOUSELASTNAME),
            suffix: take(SPOUSESUFFIX),
        };
        let email = take(EMAIL);
        let address = PostalAddress {
            address1: take(ADDRESS1),
            address2: take(ADDRESS2),
            city: take(CITY),
            state: take(STATE_PROVINCE),
            zip: take(ZIP_POSTALCODE),
            country: take(COUNTRY),
        };

        Self {
            row_id,
            primary,
            spouse,
            email,
            address,
            passthrough: fields,
            ..Default::default()
        }
    }

    /// Exchange the whole primary and spouse quadruples in one step.
    pub fn swap_name_groups(&mut self) {
        std::mem::swap(&mut self.primary, &mut self.spouse);
    }

    /// Value of an output column. Unknown or unset columns read as empty.
    pub fn value(&self, column: &str) -> Cow<'_, str> {
        let s: &str = match column {
            FIRSTNAME => &self.primary.first,
            MIDDLENAME_INITIAL => &self.primary.middle,
            LASTNAME => &self.primary.last,
            SUFFIX => &self.primary.suffix,
            SPOUSEFIRSTNAME => &self.spouse.first,
            SPOUSEMIDDLENAME_INITIAL => &self.spouse.middle,
            SPOUSELASTNAME => &self.spouse.last,
            SPOUSESUFFIX => &self.spouse.suffix,
            EMAIL => &self.email,
            FULLNAME => &self.full_name,
            ADDRESS1 => &self.address.address1,
            ADDRESS2 => &self.address.address2,
            CITY => &self.address.city,
            STATE_PROVINCE => &self.address.state,
            ZIP_POSTALCODE => &self.address.zip,
            COUNTRY => &self.address.country,
            REVIEW => self.review.as_str(),
            TRANSFORMED => self.transformed.as_str(),
            CHECK_EMAIL => self.check_email.as_str(),
            PREFIX_SUSPECT => self.prefix_suspect.as_str(),
            SUFFIX_SUSPECT => self.suffix_suspect.as_str(),
            HAD_AND => self.had_and.as_str(),
            V_VALIDATION_ERROR => &self.validated.validation_error,
            V_STREET => &self.validated.street,
            V_STREET2 => &self.validated.street2,
            V_CITY => &self.validated.city,
            V_STATE => &self.validated.state,
            V_ZIPCODE => &self.validated.zipcode,
            V_ZIP5 => &self.validated.zip5,
            V_ZIP4 => &self.validated.zip4,
            FIRSTNAME_LEN => return Cow::Owned(self.name_lengths.first.to_string()),
            MIDDLE_LEN => return Cow::Owned(self.name_lengths.middle.to_string()),
            LASTNAME_LEN => return Cow::Owned(self.name_lengths.last.to_string()),
            SPOUSE_FIRSTNAME_LEN => return Cow::Owned(self.name_lengths.spouse_first.to_string()),
            SPOUSE_MIDDLE_LEN => return Cow::Owned(self.name_lengths.spouse_middle.to_string()),
            SPOUSELASTNAME_LEN => return Cow::Owned(self.name_lengths.spouse_last.to_string()),
            other => self.passthrough.get(other).map(String::as_str).unwrap_or(""),
        };
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_count_ignores_periods_and_digits() {
        assert_eq!(alpha_count("T.J."), 2);
        assert_eq!(alpha_count("J."), 1);
        assert_eq!(alpha_count("3rd"), 2);
        assert_eq!(alpha_count(""), 0);
        assert_eq!(alpha_count("José"), 4);
    }

    #[test]
    fn test_well_formed_rules() {
        assert!(NameGroup::new("John", "", "Smith", "").is_well_formed());
        assert!(NameGroup::new("J", "Robert", "Smith", "").is_well_formed());
        assert!(!NameGroup::new("J", "R", "Smith", "").is_well_formed());
        assert!(!NameGroup::new("John", "", "S", "").is_well_formed());
        assert!(!NameGroup::new("", "Robert", "Smith", "").is_well_formed());
    }

    #[test]
    fn test_review_never_downgrades() {
        let mut review = Review::default();
        assert_eq!(review.as_str(), "");
        review.escalate();
        review.clear();
        assert!(review.is_flagged());

        let mut review = Review::default();
        review.clear();
        assert_eq!(review.flag(), Some(Flag::N));
        review.escalate();
        assert_eq!(review.as_str(), "Y");
    }

    #[test]
    fn test_full_name_collapses_empty_parts() {
        let group = NameGroup::new("Mary", "", "Jones", "Jr");
        assert_eq!(group.full_name(), "Mary Jones Jr");
        assert_eq!(NameGroup::default().full_name(), "");
    }

    #[test]
    fn test_from_fields_keeps_unknown_columns_as_passthrough() {
        let mut fields = BTreeMap::new();
        fields.insert(FIRSTNAME.to_string(), "Ann".to_string());
        fields.insert("LARGESTGIFT".to_string(), "500".to_string());
        let record = WorkingRecord::from_fields(3, fields);
        assert_eq!(record.row_id, 3);
        assert_eq!(record.value(FIRSTNAME), "Ann");
        assert_eq!(record.value("LARGESTGIFT"), "500");
        assert_eq!(record.value("LINE3"), "");
    }
}
