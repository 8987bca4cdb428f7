//! Segment level: a named record of fields

use std::fmt;

use super::{Delimiters, Field, Node, write_joined};

/// A named ordered run of fields joined by the field delimiter.
///
/// The header segment stores its own field delimiter as a synthesized
/// Field-1 (the delimiter cannot be recovered by splitting on itself), so
/// external field numbering is uniform: `field(2)` of MSH is the encoding
/// characters, exactly as the standard numbers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: String,
    fields: Vec<Field>,
    delimiters: Delimiters,
}

impl Segment {
    pub fn parse(token: &str, delimiters: Delimiters) -> Self {
        let mut parts = token.split(delimiters.field);
        let head = parts.next().unwrap_or("");
        let name: String = head.chars().take(3).collect();
        let mut fields = Vec::new();
        if name.eq_ignore_ascii_case("MSH") {
            fields.push(Field::parse(&delimiters.field.to_string(), delimiters));
        }
        fields.extend(parts.map(|part| Field::parse(part, delimiters)));
        Self {
            name,
            fields,
            delimiters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name match.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn is_header(&self) -> bool {
        self.is_named("MSH")
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    /// 1-based field lookup.
    pub fn field(&self, index: usize) -> Option<&Field> {
        index.checked_sub(1).and_then(|i| self.fields.get(i))
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut Field> {
        index.checked_sub(1).and_then(|i| self.fields.get_mut(i))
    }
}

impl Node for Segment {
    fn value(&self) -> String {
        self.to_string()
    }

    fn set_value(&mut self, text: &str) {
        *self = Segment::parse(text, self.delimiters);
    }

    fn mask(&mut self, mask: char) {
        for field in &mut self.fields {
            field.mask(mask);
        }
    }
}

impl fmt::Display for Segment {
    /// The header's synthesized Field-1 is not re-emitted as
    /// delimiter+value: the name is followed directly by the field
    /// delimiter and then fields 2..N.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        let emitted = if self.is_header() && !self.fields.is_empty() {
            &self.fields[1..]
        } else {
            &self.fields[..]
        };
        if !emitted.is_empty() {
            use fmt::Write;
            f.write_char(self.delimiters.field)?;
            write_joined(f, emitted, self.delimiters.field)?;
        }
        Ok(())
    }
}
