/// Column name constants shared by the loader, the stages and the projector.
/// Input columns keep the spelling of the roster export.

pub const ROI_ID: &str = "ROI_ID";
pub const ROI_FAMILY_ID: &str = "ROI_FAMILY_ID";

pub const FIRSTNAME: &str = "FIRSTNAME";
pub const MIDDLENAME_INITIAL: &str = "MIDDLENAME_INITIAL";
pub const LASTNAME: &str = "LASTNAME";
pub const SUFFIX: &str = "SUFFIX";
pub const SPOUSEFIRSTNAME: &str = "SPOUSEFIRSTNAME";
pub const SPOUSEMIDDLENAME_INITIAL: &str = "SPOUSEMIDDLENAME_INITIAL";
pub const SPOUSELASTNAME: &str = "SPOUSELASTNAME";
pub const SPOUSESUFFIX: &str = "SPOUSESUFFIX";
pub const EMAIL: &str = "EMAIL";

pub const ADDRESS1: &str = "ADDRESS1";
pub const ADDRESS2: &str = "ADDRESS2";
pub const CITY: &str = "CITY";
pub const STATE_PROVINCE: &str = "STATE_PROVINCE";
pub const ZIP_POSTALCODE: &str = "ZIP_POSTALCODE";
pub const COUNTRY: &str = "COUNTRY";

// Derived columns
pub const FULLNAME: &str = "FULLNAME";
pub const REVIEW: &str = "REVIEW";
pub const TRANSFORMED: &str = "TRANSFORMED";
pub const CHECK_EMAIL: &str = "CHECK_EMAIL";
pub const PREFIX_SUSPECT: &str = "PREFIX_SUSPECT";
pub const SUFFIX_SUSPECT: &str = "SUFFIX_SUSPECT";
pub const HAD_AND: &str = "HAD_AND";

pub const V_VALIDATION_ERROR: &str = "V_VALIDATION_ERROR";
pub const V_STREET: &str = "V_STREET";
pub const V_STREET2: &str = "V_STREET2";
pub const V_CITY: &str = "V_CITY";
pub const V_STATE: &str = "V_STATE";
pub const V_ZIPCODE: &str = "V_ZIPCODE";
pub const V_ZIP5: &str = "V_ZIP5";
pub const V_ZIP4: &str = "V_ZIP4";

pub const FIRSTNAME_LEN: &str = "FIRSTNAME_LEN";
pub const MIDDLE_LEN: &str = "MIDDLE_LEN";
pub const LASTNAME_LEN: &str = "LASTNAME_LEN";
pub const SPOUSE_FIRSTNAME_LEN: &str = "SPOUSE_FIRSTNAME_LEN";
pub const SPOUSE_MIDDLE_LEN: &str = "SPOUSE_MIDDLE_LEN";
pub const SPOUSELASTNAME_LEN: &str = "SPOUSELASTNAME_LEN";

/// Columns removed by the loader; never consumed downstream.
pub const DROPPED_COLUMNS: &[&str] = &["PREFIX", "SPOUSEPREFIX"];

/// Every input column the roster export carries. A roster missing any of them is rejected
/// before any stage runs.
pub const REQUIRED_COLUMNS: &[&str] = &[
    ROI_ID,
    ROI_FAMILY_ID,
    "PREFIX",
    FIRSTNAME,
    MIDDLENAME_INITIAL,
    LASTNAME,
    SUFFIX,
    "MAIDEN",
    "NICKNAME",
    "TITLE",
    "AGE",
    "PHONE",
    EMAIL,
    "SPOUSEPREFIX",
    SPOUSEFIRSTNAME,
    SPOUSEMIDDLENAME_INITIAL,
    SPOUSELASTNAME,
    SPOUSESUFFIX,
    "SPOUSEMAIDENNAME",
    "SPOUSENICKNAME",
    "LARGESTGIFT",
    "LARGESTGIFTDATE",
    "TOTALGIFTCOUNT",
    "TOTALGIFTAMOUNT",
    "LASTGIFTAMOUNT",
    "LASTGIFTDATE",
    "FIRSTGIFTAMOUNT",
    "FIRSTGIFTDATE",
    ADDRESS1,
    ADDRESS2,
    "LINE3",
    "LINE4",
    CITY,
    STATE_PROVINCE,
    ZIP_POSTALCODE,
    COUNTRY,
    "BUSINESS",
];

/// Output schema, in order. Anything not listed here is dropped by the projector.
pub const OUTPUT_COLUMNS: &[&str] = &[
    // household and individual ids
    ROI_ID,
    ROI_FAMILY_ID,
    // primary person
    FIRSTNAME,
    MIDDLENAME_INITIAL,
    LASTNAME,
    SUFFIX,
    FULLNAME,
    "MAIDEN",
    "NICKNAME",
    "TITLE",
    "AGE",
    "PHONE",
    EMAIL,
    // partner
    SPOUSEFIRSTNAME,
    SPOUSEMIDDLENAME_INITIAL,
    SPOUSELASTNAME,
    SPOUSESUFFIX,
    "SPOUSEMAIDENNAME",
    "SPOUSENICKNAME",
    // review flags
    REVIEW,
    TRANSFORMED,
    CHECK_EMAIL,
    PREFIX_SUSPECT,
    SUFFIX_SUSPECT,
    HAD_AND,
    // verified address
    V_VALIDATION_ERROR,
    V_STREET,
    V_STREET2,
    V_CITY,
    V_STATE,
    V_ZIPCODE,
    V_ZIP5,
    V_ZIP4,
    // gift history
    "LARGESTGIFT",
    "LARGESTGIFTDATE",
    "TOTALGIFTCOUNT",
    "TOTALGIFTAMOUNT",
    "LASTGIFTAMOUNT",
    "LASTGIFTDATE",
    "FIRSTGIFTAMOUNT",
    "FIRSTGIFTDATE",
    // original address
    ADDRESS1,
    ADDRESS2,
    "LINE3",
    "LINE4",
    CITY,
    STATE_PROVINCE,
    ZIP_POSTALCODE,
    COUNTRY,
    "BUSINESS",
    // name lengths
    FIRSTNAME_LEN,
    MIDDLE_LEN,
    LASTNAME_LEN,
    SPOUSE_FIRSTNAME_LEN,
    SPOUSE_MIDDLE_LEN,
    SPOUSELASTNAME_LEN,
];

/// Name columns checked by the content filter.
pub const ORGANIZATION_SCAN_COLUMNS: &[&str] = &[
    FIRSTNAME,
    LASTNAME,
    SUFFIX,
    SPOUSEFIRSTNAME,
    SPOUSELASTNAME,
    SPOUSESUFFIX,
];

/// Lower-case markers of organizational donors.
pub const ORGANIZATION_MARKERS: &[&str] = &["family", "foundation"];

pub const DEFAULT_DOMESTIC_COUNTRY: &str = "US";
pub const DEFAULT_ENCODING: &str = "ISO-8859-1";

/// Territory and APO state codes excluded before validation.
pub const EXCLUDED_TERRITORIES: &[&str] = &["VI", "PR", "GU", "AS"];

pub const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

/// Written to V_VALIDATION_ERROR when the service rejects an address.
pub const VALIDATION_ERROR_SENTINEL: &str = "Check original address for errors";

/// Check whether a state code is a valid domestic state (case-insensitive)
pub fn is_us_state(code: &str) -> bool {
    let upper = code.trim().to_uppercase();
    US_STATE_CODES.contains(&upper.as_str())
}

/// Check whether a state code is an excluded territory
pub fn is_excluded_territory(code: &str) -> bool {
    let upper = code.trim().to_uppercase();
    EXCLUDED_TERRITORIES.contains(&upper.as_str())
}
