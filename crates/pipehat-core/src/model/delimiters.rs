//! The per-message delimiter set discovered from the MSH header

/// Record separator between segments after line-ending normalization.
pub const SEGMENT_SEPARATOR: char = '\r';

/// The four delimiter characters a message declares for itself.
///
/// The character immediately after the `MSH` token is the field delimiter;
/// of the four characters after that (conventionally `^~\&`) the first is
/// the component delimiter, the second the repeat delimiter, and the fourth
/// the subcomponent delimiter. The third, the escape character, is not
/// tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repeat: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repeat: '~',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// Read the delimiter set declared at `header_start` (the byte offset of
    /// the `MSH` token). Missing positions fall back to the standard set.
    pub(crate) fn discover(text: &str, header_start: usize) -> Self {
        let defaults = Self::default();
        let mut declared = text[header_start + 3..].chars();
        let field = declared.next().unwrap_or(defaults.field);
        let component = declared.next().unwrap_or(defaults.component);
        let repeat = declared.next().unwrap_or(defaults.repeat);
        let _escape = declared.next();
        let subcomponent = declared.next().unwrap_or(defaults.subcomponent);
        Self {
            field,
            component,
            repeat,
            subcomponent,
        }
    }
}
