//! `address=value` filter expressions
//!
//! A filter decides whether a message should be processed at all: the
//! address side is resolved against the message and the filter matches when
//! any resolved value equals the right-hand side, case-insensitively.

use std::str::FromStr;

use crate::address::{Address, resolve};
use crate::error::PipehatError;
use crate::model::Message;
use crate::result::Result;

/// A parsed `address=value` expression.
#[derive(Debug, Clone)]
pub struct Filter {
    address: Address,
    value: String,
}

impl Filter {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True when any item the address resolves to carries the expected
    /// value (case-insensitive). Absent positions resolve to empty values,
    /// so `PID-99=` matches a message whose PID has fewer than 99 fields.
    pub fn matches(&self, message: &Message) -> bool {
        resolve(message, &self.address)
            .iter()
            .any(|path| message.value_at(path).eq_ignore_ascii_case(&self.value))
    }
}

impl FromStr for Filter {
    type Err = PipehatError;

    fn from_str(raw: &str) -> Result<Self> {
        let Some((address, value)) = raw.split_once('=') else {
            return Err(PipehatError::invalid_filter(
                raw,
                "expected ADDRESS=VALUE",
            ));
        };
        let address: Address = address
            .trim()
            .parse()
            .map_err(|err: PipehatError| PipehatError::invalid_filter(raw, err.to_string()))?;
        Ok(Self {
            address,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str =
        "MSH|^~\\&|A|B|C|D|1||ADT^A01|M|P|2.3\rPID|1||12345^^^MRN||DOE^JOHN\r";

    fn message() -> Message {
        Message::parse(TEXT).unwrap()
    }

    #[test]
    fn matches_on_equal_value() {
        let filter: Filter = "PID-5.1=DOE".parse().unwrap();
        assert!(filter.matches(&message()));
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let filter: Filter = "pid-5.1=doe".parse().unwrap();
        assert!(filter.matches(&message()));
    }

    #[test]
    fn rejects_different_value() {
        let filter: Filter = "PID-5.1=ROE".parse().unwrap();
        assert!(!filter.matches(&message()));
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let filter: Filter = "PID-5.1=A=B".parse().unwrap();
        assert_eq!(filter.value(), "A=B");
    }

    #[test]
    fn absent_position_matches_empty_value() {
        let filter: Filter = "PID-99=".parse().unwrap();
        assert!(filter.matches(&message()));
    }

    #[test]
    fn unmatched_segment_matches_nothing() {
        let filter: Filter = "ZZZ-1=".parse().unwrap();
        assert!(!filter.matches(&message()));
    }

    #[test]
    fn missing_equals_is_invalid() {
        let err = "PID-5.1".parse::<Filter>().unwrap_err();
        assert!(matches!(err, PipehatError::InvalidFilter { .. }));
    }

    #[test]
    fn bad_address_side_is_invalid() {
        let err = "P-5=X".parse::<Filter>().unwrap_err();
        assert!(matches!(err, PipehatError::InvalidFilter { .. }));
    }
}
