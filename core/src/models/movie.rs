use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::{parse_release_date, RELEASE_DATE_FORMAT};
use crate::{Error, Result};

/// A movie that can be marked as a favorite.
///
/// Field names match the movie feed's wire names (`poster_path`,
/// `backdrop_path`, `release_date`, `vote_average`), so the same mapping is
/// used when decoding feed payloads and when reading back the stored
/// favorites blob. Unknown feed fields are ignored.
///
/// Two movies are equal only when every field matches, including whether each
/// optional field is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(serialize_with = "serialize_vote_average")]
    pub vote_average: Option<f64>,
    #[serde(
        default,
        serialize_with = "serialize_release_date",
        deserialize_with = "deserialize_release_date"
    )]
    pub release_date: Option<NaiveDate>,
    pub id: i64,
}

impl Movie {
    /// Create a movie with only the required fields set
    pub fn new(id: i64, title: String, overview: String) -> Self {
        Self {
            title,
            overview,
            poster_path: None,
            backdrop_path: None,
            vote_average: None,
            release_date: None,
            id,
        }
    }

    pub fn with_poster_path(self, poster_path: impl Into<String>) -> Self {
        Self {
            poster_path: Some(poster_path.into()),
            ..self
        }
    }

    pub fn with_backdrop_path(self, backdrop_path: impl Into<String>) -> Self {
        Self {
            backdrop_path: Some(backdrop_path.into()),
            ..self
        }
    }

    pub fn with_vote_average(self, vote_average: f64) -> Self {
        Self {
            vote_average: Some(vote_average),
            ..self
        }
    }

    pub fn with_release_date(self, release_date: NaiveDate) -> Self {
        Self {
            release_date: Some(release_date),
            ..self
        }
    }

    /// Year of release, if the release date is known
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Encode this movie in the storage format
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::Encode)
    }

    /// Decode a movie from the storage format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::Decode)
    }
}

// JSON has no representation for NaN or infinity.
fn serialize_vote_average<S>(
    vote_average: &Option<f64>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match vote_average {
        Some(value) if !value.is_finite() => Err(serde::ser::Error::custom(format!(
            "vote_average must be finite, got {}",
            value
        ))),
        Some(value) => serializer.serialize_some(value),
        None => serializer.serialize_none(),
    }
}

fn serialize_release_date<S>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match date {
        Some(date) => serializer.collect_str(&date.format(RELEASE_DATE_FORMAT)),
        None => serializer.serialize_none(),
    }
}

// The feed sends "" for movies without a known release date.
fn deserialize_release_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => parse_release_date(&value).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
