//! Raw observation rows as returned by the cube API.

use serde_json::Value;
use thiserror::Error;

/// Cube dimension key carrying the brawler identifier.
pub const BRAWLER_DIMENSION: &str = "map.brawler_dimension";

/// Cube measure key carrying the pick count.
pub const PICKS_MEASURE: &str = "map.picks_measure";

/// Cube measure key carrying the win-rate fraction.
pub const WIN_RATE_MEASURE: &str = "map.winRate_measure";

/// Errors decoding a response row into an observation.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("field {field} is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },
}

/// One (trophy bracket, brawler) observation.
///
/// The same brawler appears once per bracket; rows are flattened across
/// brackets before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    /// Brawler identifier (upstream dimension value, e.g. "SHELLY").
    pub brawler: String,

    /// Number of recorded picks in this bracket.
    pub picks: f64,

    /// Fraction of those picks that won, in [0, 1].
    pub win_rate: f64,
}

impl RawObservation {
    pub fn new(brawler: impl Into<String>, picks: f64, win_rate: f64) -> Self {
        Self {
            brawler: brawler.into(),
            picks,
            win_rate,
        }
    }

    /// Decode a single cube response row.
    ///
    /// Measures arrive as JSON strings or numbers depending on the upstream
    /// serializer; both are coerced to f64. A row with a missing identifier
    /// or a non-numeric measure is rejected whole.
    pub fn from_row(row: &Value) -> Result<Self, DecodeError> {
        let brawler = row
            .get(BRAWLER_DIMENSION)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(DecodeError::MissingField(BRAWLER_DIMENSION))?;

        let picks = coerce_measure(row, PICKS_MEASURE)?;
        let win_rate = coerce_measure(row, WIN_RATE_MEASURE)?;

        Ok(Self::new(brawler, picks, win_rate))
    }
}

/// Pull a measure out of a row and coerce it to f64.
fn coerce_measure(row: &Value, field: &'static str) -> Result<f64, DecodeError> {
    let value = row.get(field).ok_or(DecodeError::MissingField(field))?;

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| DecodeError::NotNumeric {
            field,
            value: n.to_string(),
        }),
        Value::String(s) => s.trim().parse().map_err(|_| DecodeError::NotNumeric {
            field,
            value: s.clone(),
        }),
        other => Err(DecodeError::NotNumeric {
            field,
            value: other.to_string(),
        }),
    }
}
