/// Color sent to the repository when a record has no color set.
pub const DEFAULT_COLOR_ID: u8 = 8;

/// Valid repository color ids.
pub const COLOR_ID_RANGE: std::ops::RangeInclusive<u8> = 1..=11;

/// Number of days imported in each direction when no range is given.
pub const DEFAULT_IMPORT_DAYS: i64 = 30;
