//! WKT polygon parsing.
//!
//! Only the single outer ring form is understood:
//!
//! ```text
//! POLYGON ((lon1 lat1, lon2 lat2, ..., lonN latN))
//! ```
//!
//! Ring closure in the input is optional. Anything else (holes, MULTIPOLYGON,
//! Z/M coordinates) is rejected as malformed.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

use crate::models::ParsedRing;

/// Minimum number of vertices of a drawable polygon.
pub const MIN_RING_VERTICES: usize = 3;

static POLYGON_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*POLYGON\s*\(\s*\((.*)\)\s*\)\s*$").expect("polygon pattern is valid")
});

/// Reason a WKT string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WktError {
    /// Text does not have the `POLYGON ((...))` shape
    NotAPolygon,
    /// A coordinate entry is not two finite numbers
    InvalidPair {
        /// 0-based position of the entry in the coordinate list
        index: usize,
        /// The offending entry, trimmed
        text: String,
    },
    /// Fewer than three vertices
    TooFewVertices {
        /// Number of vertices found
        found: usize,
    },
}

impl fmt::Display for WktError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAPolygon => write!(f, "expected POLYGON ((lon lat, ...))"),
            Self::InvalidPair { index, text } => {
                write!(f, "coordinate {index} is not a numeric pair: '{text}'")
            }
            Self::TooFewVertices { found } => write!(
                f,
                "polygon needs at least {MIN_RING_VERTICES} vertices, found {found}"
            ),
        }
    }
}

impl std::error::Error for WktError {}

/// Parses a WKT polygon, reporting why it was rejected.
///
/// # Examples
///
/// ```
/// use riskgis::parser::wkt::{parse_wkt_strict, WktError};
///
/// let ring = parse_wkt_strict("POLYGON ((0 0, 1 0, 1 1))").unwrap();
/// assert_eq!(ring.len(), 3);
///
/// assert_eq!(parse_wkt_strict("POINT (1 2)"), Err(WktError::NotAPolygon));
/// ```
pub fn parse_wkt_strict(text: &str) -> Result<ParsedRing, WktError> {
    let captures = POLYGON_REGEX.captures(text).ok_or(WktError::NotAPolygon)?;
    let inner = captures.get(1).map_or("", |m| m.as_str());

    let mut vertices = Vec::new();
    for (index, entry) in inner.split(',').enumerate() {
        let entry = entry.trim();
        let pair = parse_pair(entry).ok_or_else(|| WktError::InvalidPair {
            index,
            text: entry.to_string(),
        })?;
        vertices.push(pair);
    }

    if vertices.len() < MIN_RING_VERTICES {
        return Err(WktError::TooFewVertices {
            found: vertices.len(),
        });
    }

    Ok(ParsedRing::new(vertices))
}

/// Parses a WKT polygon, returning an empty ring for malformed input.
///
/// Failures are logged at `warn` level and never propagate; callers treat the
/// empty ring as "no boundary to draw".
///
/// # Examples
///
/// ```
/// use riskgis::parser::parse_wkt;
///
/// assert_eq!(parse_wkt("POLYGON ((0 0, 1 0, 1 1, 0 0))").len(), 4);
/// assert!(parse_wkt("NOT A POLYGON").is_empty());
/// ```
#[must_use]
pub fn parse_wkt(text: &str) -> ParsedRing {
    match parse_wkt_strict(text) {
        Ok(ring) => ring,
        Err(err) => {
            warn!(error = %err, wkt = %truncate(text, 80), "ignoring malformed WKT boundary");
            ParsedRing::empty()
        }
    }
}

/// Splits `"<lon> <lat>"` on whitespace into two finite numbers.
fn parse_pair(entry: &str) -> Option<[f64; 2]> {
    let mut tokens = entry.split_whitespace();
    let x: f64 = tokens.next()?.parse().ok()?;
    let y: f64 = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some([x, y])
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
