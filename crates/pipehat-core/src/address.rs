//! Item address grammar and resolution
//!
//! Addresses take the form `SEG[rep]-field[rep].component.subcomponent`
//! (case-insensitive): a 3-character segment name, an optional 1-based
//! repeat selector after the segment name or the field number, and optional
//! 1-based component and subcomponent positions. Validity is a pure
//! syntactic check, independent of any message.
//!
//! Resolution tolerates absence at every level: a position that is
//! syntactically valid but not present in a particular message resolves to
//! a synthesized empty item, never an error. Only a segment repeat beyond
//! the match count shrinks the result list.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::PipehatError;
use crate::model::Message;
use crate::result::Result;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([A-Z]{2}[A-Z0-9])(?:\[(\d+)\])?(?:-(\d+)(?:\[(\d+)\])?(?:\.(\d+)(?:\.(\d+))?)?)?$")
        .expect("address grammar regex is valid")
});

/// A parsed item address. Absent positions mean "all" (for the field
/// repeat) or "stop at this level" (for field, component, subcomponent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    segment: String,
    segment_repeat: Option<usize>,
    field: Option<usize>,
    field_repeat: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
}

impl Address {
    /// Pure syntactic validity check for a candidate address string.
    pub fn is_valid(text: &str) -> bool {
        text.parse::<Address>().is_ok()
    }

    /// Segment name, uppercased.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn field(&self) -> Option<usize> {
        self.field
    }
}

/// Parse one captured position, rejecting the explicit `0` (positions are
/// 1-based; absence is the only way to say "all").
fn position(
    capture: Option<regex::Match<'_>>,
    raw: &str,
    what: &str,
) -> Result<Option<usize>> {
    let Some(m) = capture else { return Ok(None) };
    let number: usize = m.as_str().parse().map_err(|_| {
        PipehatError::invalid_address(raw, format!("{what} number '{}' is too large", m.as_str()))
    })?;
    if number == 0 {
        return Err(PipehatError::invalid_address(
            raw,
            format!("{what} positions are 1-based; explicit 0 is not allowed"),
        ));
    }
    Ok(Some(number))
}

impl FromStr for Address {
    type Err = PipehatError;

    fn from_str(raw: &str) -> Result<Self> {
        let captures = ADDRESS_RE.captures(raw).ok_or_else(|| {
            PipehatError::invalid_address(
                raw,
                "expected SEG[rep]-field[rep].component.subcomponent",
            )
        })?;
        Ok(Self {
            segment: captures[1].to_ascii_uppercase(),
            segment_repeat: position(captures.get(2), raw, "segment repeat")?,
            field: position(captures.get(3), raw, "field")?,
            field_repeat: position(captures.get(4), raw, "field repeat")?,
            component: position(captures.get(5), raw, "component")?,
            subcomponent: position(captures.get(6), raw, "subcomponent")?,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment)?;
        if let Some(repeat) = self.segment_repeat {
            write!(f, "[{repeat}]")?;
        }
        if let Some(field) = self.field {
            write!(f, "-{field}")?;
            if let Some(repeat) = self.field_repeat {
                write!(f, "[{repeat}]")?;
            }
            if let Some(component) = self.component {
                write!(f, ".{component}")?;
                if let Some(subcomponent) = self.subcomponent {
                    write!(f, ".{subcomponent}")?;
                }
            }
        }
        Ok(())
    }
}

/// A resolved handle into a live message tree. All position numbers are
/// 1-based except `segment`, which indexes the message's segment list
/// directly. A handle may point at a position the message does not contain;
/// reading it yields the empty string and masking it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPath {
    pub segment: usize,
    pub field: Option<usize>,
    pub repeat: Option<usize>,
    pub component: Option<usize>,
    pub subcomponent: Option<usize>,
}

impl ItemPath {
    fn segment_only(segment: usize) -> Self {
        Self {
            segment,
            field: None,
            repeat: None,
            component: None,
            subcomponent: None,
        }
    }
}

/// Walk the tree collecting one handle per matched item.
///
/// A field index beyond a segment's field count still contributes one
/// (empty) item for that segment; out-of-range repeats, components, and
/// subcomponents likewise resolve to handles of empty items.
pub fn resolve(message: &Message, address: &Address) -> Vec<ItemPath> {
    let mut matched: Vec<usize> = message
        .segments()
        .iter()
        .enumerate()
        .filter(|(_, segment)| segment.is_named(&address.segment))
        .map(|(index, _)| index)
        .collect();

    if let Some(repeat) = address.segment_repeat {
        matched = match matched.get(repeat - 1) {
            Some(&index) => vec![index],
            None => Vec::new(),
        };
    }

    let Some(field_no) = address.field else {
        return matched.into_iter().map(ItemPath::segment_only).collect();
    };

    let mut paths = Vec::new();
    for segment_index in matched {
        let segment = &message.segments()[segment_index];
        let repeats: Vec<usize> = match (segment.field(field_no), address.field_repeat) {
            (_, Some(repeat)) => vec![repeat],
            (Some(field), None) => (1..=field.items().len()).collect(),
            (None, None) => vec![1],
        };
        for repeat in repeats {
            paths.push(ItemPath {
                segment: segment_index,
                field: Some(field_no),
                repeat: Some(repeat),
                component: address.component,
                subcomponent: address.subcomponent,
            });
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(text: &str) -> Address {
        text.parse().unwrap()
    }

    #[test]
    fn parses_full_form() {
        let address = addr("PID[2]-3[1].4.5");
        assert_eq!(address.segment(), "PID");
        assert_eq!(address.segment_repeat, Some(2));
        assert_eq!(address.field, Some(3));
        assert_eq!(address.field_repeat, Some(1));
        assert_eq!(address.component, Some(4));
        assert_eq!(address.subcomponent, Some(5));
    }

    #[test]
    fn parses_segment_only_form() {
        let address = addr("OBX");
        assert_eq!(address.segment(), "OBX");
        assert_eq!(address.field, None);
    }

    #[test]
    fn lowercase_is_accepted_and_uppercased() {
        assert_eq!(addr("pid-5.1").segment(), "PID");
    }

    #[test]
    fn digit_in_third_name_position_is_accepted() {
        assert_eq!(addr("NK1-2").segment(), "NK1");
        assert_eq!(addr("in1").segment(), "IN1");
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in [
            "", "PI", "PIDX", "1ID-3", "P1D-3", "PID-", "PID-3.", "PID-3..2", "PID 3",
            "PID-3[1", "PID[]-3", "PID-a", "PID-3.b",
        ] {
            assert!(!Address::is_valid(bad), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_explicit_zero_positions() {
        for bad in ["PID-0", "PID-3.0", "PID-3.1.0", "PID[0]-3", "PID-3[0]"] {
            let err = bad.parse::<Address>().unwrap_err();
            assert!(
                matches!(err, PipehatError::InvalidAddress { .. }),
                "wrong error for {bad:?}"
            );
        }
    }

    #[test]
    fn validity_check_is_pure() {
        assert!(Address::is_valid("ZZZ-9"));
        assert!(Address::is_valid("MSH-1"));
        assert!(!Address::is_valid("ZZZZ-9"));
    }

    #[test]
    fn display_matches_canonical_form() {
        for text in ["PID-3", "PID[2]-3[1].4.5", "OBX", "NK1-2.1"] {
            assert_eq!(addr(text).to_string(), text);
        }
    }

    mod resolution {
        use super::*;

        const TEXT: &str = "MSH|^~\\&|A|B|C|D|1||ADT^A01|M|P|2.3\r\
                            PID|1||111~222~333||DOE^JOHN\r\
                            OBX|1|TX|FIRST\r\
                            OBX|2|TX|SECOND\r";

        fn message() -> Message {
            Message::parse(TEXT).unwrap()
        }

        #[test]
        fn unmatched_segment_name_yields_empty_list() {
            let message = message();
            assert!(message.query("ZZZ-9").unwrap().is_empty());
        }

        #[test]
        fn segment_repeat_selects_one_occurrence() {
            let message = message();
            assert_eq!(message.query("OBX[2]-3").unwrap(), vec!["SECOND"]);
        }

        #[test]
        fn segment_repeat_beyond_matches_yields_empty_list() {
            let message = message();
            assert!(message.query("OBX[3]-3").unwrap().is_empty());
        }

        #[test]
        fn no_field_returns_whole_segments() {
            let message = message();
            let values = message.query("OBX").unwrap();
            assert_eq!(values, vec!["OBX|1|TX|FIRST", "OBX|2|TX|SECOND"]);
        }

        #[test]
        fn no_repeat_selector_expands_to_all_repeats() {
            let message = message();
            assert_eq!(message.query("PID-3").unwrap(), vec!["111", "222", "333"]);
        }

        #[test]
        fn repeat_selector_picks_exactly_one() {
            let message = message();
            assert_eq!(message.query("PID-3[2]").unwrap(), vec!["222"]);
        }

        #[test]
        fn out_of_range_repeat_is_an_empty_value() {
            let message = message();
            assert_eq!(message.query("PID-3[9]").unwrap(), vec![""]);
        }

        #[test]
        fn out_of_range_field_yields_one_empty_per_segment() {
            let message = message();
            assert_eq!(message.query("PID-99").unwrap(), vec![""]);
            assert_eq!(message.query("OBX-99").unwrap(), vec!["", ""]);
        }

        #[test]
        fn out_of_range_component_and_subcomponent_are_empty_values() {
            let message = message();
            assert_eq!(message.query("PID-5.9").unwrap(), vec![""]);
            assert_eq!(message.query("PID-5.1.9").unwrap(), vec![""]);
        }

        #[test]
        fn component_expansion_covers_every_repeat() {
            let message = message();
            assert_eq!(
                message.query("PID-3.1").unwrap(),
                vec!["111", "222", "333"]
            );
        }
    }
}
