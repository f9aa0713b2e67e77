//! Airport code type for the route kernel.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RouteError;

/// Canonical identifier for a node in the route graph.
///
/// Always uppercase. The only way to build one from user input is
/// [`AirportCode::parse`], so every graph, store, and cache operation
/// sees the same spelling regardless of how the caller typed it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode(String);

impl AirportCode {
    /// Parse and canonicalize an airport code.
    ///
    /// Returns [`RouteError::InvalidInput`] when the code is empty or
    /// whitespace-only. No other validation is applied.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        if raw.trim().is_empty() {
            return Err(RouteError::InvalidInput("airport code must not be empty".to_string()));
        }
        Ok(Self(raw.to_uppercase()))
    }

    /// Parse a pair of codes.
    ///
    /// Either side failing yields one combined "invalid airport codes"
    /// error, so callers report the pair rather than the first bad side.
    pub fn parse_pair(start: &str, end: &str) -> Result<(Self, Self), RouteError> {
        match (Self::parse(start), Self::parse(end)) {
            (Ok(start), Ok(end)) => Ok((start, end)),
            _ => Err(RouteError::InvalidInput("invalid airport codes".to_string())),
        }
    }

    /// Get the canonical code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AirportCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AirportCode {
    type Error = RouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases() {
        let code = AirportCode::parse("jfk").unwrap();
        assert_eq!(code.as_str(), "JFK");
        assert_eq!(code, AirportCode::parse("JfK").unwrap());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(AirportCode::parse(""), Err(RouteError::InvalidInput(_))));
        assert!(matches!(AirportCode::parse("   "), Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_pair_rejects_either_side() {
        let combined = RouteError::InvalidInput("invalid airport codes".to_string());
        assert_eq!(AirportCode::parse_pair("JFK", "").unwrap_err(), combined);
        assert_eq!(AirportCode::parse_pair(" ", "LAX").unwrap_err(), combined);
        let (a, b) = AirportCode::parse_pair("jfk", "lax").unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("JFK", "LAX"));
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let code: AirportCode = serde_json::from_str("\"sfo\"").unwrap();
        assert_eq!(code.as_str(), "SFO");
        assert!(serde_json::from_str::<AirportCode>("\"\"").is_err());
    }
}
