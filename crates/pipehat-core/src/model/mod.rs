//! HL7 v2 message data model
//!
//! A message is a four-level tree below the segment list: Segment → Field →
//! FieldItem (repeat) → Component → SubComponent. Every level joins its
//! children with its own delimiter character when serializing, so a parsed
//! tree reproduces its input text exactly, sparse and malformed messages
//! included. The delimiter characters themselves are not fixed: each message
//! declares its own set in the MSH header and the whole tree is built with
//! that set.

mod component;
mod delimiters;
mod field;
mod message;
mod segment;
mod subcomponent;

pub use component::Component;
pub use delimiters::{Delimiters, SEGMENT_SEPARATOR};
pub use field::{Field, FieldItem};
pub use message::{Message, ValueChange};
pub use segment::Segment;
pub use subcomponent::{NULL_VALUE, SubComponent};

use std::fmt;

/// Shared capability of every level of the message tree.
///
/// `mask` and `set_value` compose recursively: masking a segment masks all
/// of its fields, masking a field masks all of its repeats, and so on down
/// to the subcomponent leaves.
pub trait Node {
    /// Serialized text of this item.
    fn value(&self) -> String;

    /// Replace this item's content. The text is re-split with the item's
    /// own delimiters at every level except the subcomponent leaf, which
    /// takes it verbatim.
    fn set_value(&mut self, text: &str);

    /// Overwrite the text content with the mask character, preserving
    /// structure and text length. The `""` null-field sentinel is exempt.
    fn mask(&mut self, mask: char);
}

/// Join a slice of displayable items with a single delimiter character.
pub(crate) fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    delimiter: char,
) -> fmt::Result {
    use fmt::Write;

    let mut first = true;
    for item in items {
        if !first {
            f.write_char(delimiter)?;
        }
        write!(f, "{item}")?;
        first = false;
    }
    Ok(())
}
