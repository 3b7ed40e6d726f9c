mod movie;

pub use movie::Movie;

use chrono::{NaiveDate, ParseError};

/// Wire format of a movie's release date
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` release date. Blank input means "unknown" and yields None.
pub fn parse_release_date(value: &str) -> Result<Option<NaiveDate>, ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, RELEASE_DATE_FORMAT).map(Some)
}
