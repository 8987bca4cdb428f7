//! Message level: parsing, addressing entry points, and serialization

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::{Delimiters, Node, SEGMENT_SEPARATOR, Segment};
use crate::address::{Address, ItemPath, resolve};
use crate::error::PipehatError;
use crate::result::Result;

/// Before/after value pair recorded by the mutation entry points, for
/// reporting what a mask or update actually touched.
#[derive(Debug, Clone, Serialize)]
pub struct ValueChange {
    /// Canonical rendering of the touched position, e.g. `PID[1]-5[1].1`.
    pub location: String,
    pub before: String,
    pub after: String,
}

/// A whole HL7 v2 message: an ordered list of segments plus the delimiter
/// set discovered from its MSH header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    segments: Vec<Segment>,
    delimiters: Delimiters,
}

/// Collapse CRLF and bare LF line endings to the record separator.
fn normalize_endings(text: &str) -> String {
    text.replace("\r\n", "\r").replace('\n', "\r")
}

impl Message {
    /// Parse message text of any line-ending convention. Fails with
    /// [`PipehatError::MissingHeader`] when no `MSH` token is present.
    pub fn parse(text: &str) -> Result<Self> {
        let normalized = normalize_endings(text);
        let header_start = normalized
            .find("MSH")
            .ok_or(PipehatError::MissingHeader)?;
        let delimiters = Delimiters::discover(&normalized, header_start);
        debug!(?delimiters, "discovered delimiter set");
        let segments = normalized
            .split(SEGMENT_SEPARATOR)
            .map(|token| Segment::parse(token, delimiters))
            .collect();
        Ok(Self {
            segments,
            delimiters,
        })
    }

    pub fn delimiters(&self) -> Delimiters {
        self.delimiters
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// All segments matching `name`, case-insensitively.
    pub fn segments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.segments.iter().filter(move |s| s.is_named(name))
    }

    /// Resolve an address string to live handles into this tree.
    ///
    /// Out-of-range positions resolve to handles of synthesized empty items
    /// rather than errors; only a malformed address string fails.
    pub fn locate(&self, address: &str) -> Result<Vec<ItemPath>> {
        let address: Address = address.parse()?;
        Ok(resolve(self, &address))
    }

    /// Resolve an address string to the string values of the matched items.
    pub fn query(&self, address: &str) -> Result<Vec<String>> {
        let paths = self.locate(address)?;
        Ok(paths.iter().map(|path| self.value_at(path)).collect())
    }

    /// Serialized text of the item a path points at; empty string when the
    /// position does not exist in this message.
    pub fn value_at(&self, path: &ItemPath) -> String {
        let Some(segment) = self.segments.get(path.segment) else {
            return String::new();
        };
        let Some(field_no) = path.field else {
            return segment.to_string();
        };
        let Some(field) = segment.field(field_no) else {
            return String::new();
        };
        let Some(item) = field.item(path.repeat.unwrap_or(1)) else {
            return String::new();
        };
        let Some(component_no) = path.component else {
            return item.to_string();
        };
        let Some(component) = item.component(component_no) else {
            return String::new();
        };
        let Some(subcomponent_no) = path.subcomponent else {
            return component.to_string();
        };
        component
            .subcomponent(subcomponent_no)
            .map(|s| s.value())
            .unwrap_or_default()
    }

    /// Mask the item a path points at. Absent positions are a no-op (their
    /// value is empty, and masking empty text is empty text).
    pub fn mask_at(&mut self, path: &ItemPath, mask: char) -> bool {
        let Some(segment) = self.segments.get_mut(path.segment) else {
            return false;
        };
        let Some(field_no) = path.field else {
            segment.mask(mask);
            return true;
        };
        let Some(field) = segment.field_mut(field_no) else {
            return false;
        };
        let Some(item) = field.item_mut(path.repeat.unwrap_or(1)) else {
            return false;
        };
        let Some(component_no) = path.component else {
            item.mask(mask);
            return true;
        };
        let Some(component) = item.component_mut(component_no) else {
            return false;
        };
        let Some(subcomponent_no) = path.subcomponent else {
            component.mask(mask);
            return true;
        };
        match component.subcomponent_mut(subcomponent_no) {
            Some(subcomponent) => {
                subcomponent.mask(mask);
                true
            }
            None => false,
        }
    }

    /// Assign text to the item a path points at, re-splitting with the
    /// item's own delimiters. Returns false when the position does not
    /// exist; absent positions are not materialized.
    pub fn set_value_at(&mut self, path: &ItemPath, text: &str) -> bool {
        let Some(segment) = self.segments.get_mut(path.segment) else {
            return false;
        };
        let Some(field_no) = path.field else {
            segment.set_value(text);
            return true;
        };
        let Some(field) = segment.field_mut(field_no) else {
            return false;
        };
        let Some(item) = field.item_mut(path.repeat.unwrap_or(1)) else {
            return false;
        };
        let Some(component_no) = path.component else {
            item.set_value(text);
            return true;
        };
        let Some(component) = item.component_mut(component_no) else {
            return false;
        };
        let Some(subcomponent_no) = path.subcomponent else {
            component.set_value(text);
            return true;
        };
        match component.subcomponent_mut(subcomponent_no) {
            Some(subcomponent) => {
                subcomponent.set_value(text);
                true
            }
            None => false,
        }
    }

    /// Mask every item an address resolves to, reporting what changed.
    pub fn mask_item(&mut self, address: &str, mask: char) -> Result<Vec<ValueChange>> {
        let paths = self.locate(address)?;
        let mut changes = Vec::with_capacity(paths.len());
        for path in paths {
            let before = self.value_at(&path);
            self.mask_at(&path, mask);
            let after = self.value_at(&path);
            changes.push(ValueChange {
                location: self.describe(&path),
                before,
                after,
            });
        }
        Ok(changes)
    }

    /// Assign a value to every item an address resolves to, reporting what
    /// changed.
    pub fn set_item(&mut self, address: &str, value: &str) -> Result<Vec<ValueChange>> {
        let paths = self.locate(address)?;
        let mut changes = Vec::with_capacity(paths.len());
        for path in paths {
            let before = self.value_at(&path);
            self.set_value_at(&path, value);
            let after = self.value_at(&path);
            changes.push(ValueChange {
                location: self.describe(&path),
                before,
                after,
            });
        }
        Ok(changes)
    }

    /// Fixed de-identification policy, applied to every occurrence of each
    /// segment type:
    /// - `PID`: fields 4.. masked, 1-3 preserved
    /// - `NK1`: everything except fields 1 and 3 masked
    /// - `IN1`, `IN2`: all fields masked
    ///
    /// Returns one [`ValueChange`] per field whose text actually changed.
    pub fn de_identify(&mut self, mask: char) -> Vec<ValueChange> {
        let mut changes = Vec::new();
        let mut occurrences: HashMap<String, usize> = HashMap::new();
        for segment in &mut self.segments {
            let name = segment.name().to_ascii_uppercase();
            let occurrence = occurrences.entry(name.clone()).or_insert(0);
            *occurrence += 1;
            let occurrence = *occurrence;
            // field vec index i holds 1-based field i + 1
            let keep = |index: usize| match name.as_str() {
                "PID" => index < 3,
                "NK1" => index == 0 || index == 2,
                "IN1" | "IN2" => false,
                _ => true,
            };
            for (index, field) in segment.fields_mut().iter_mut().enumerate() {
                if keep(index) {
                    continue;
                }
                let before = field.to_string();
                field.mask(mask);
                let after = field.to_string();
                if before != after {
                    changes.push(ValueChange {
                        location: format!("{}[{}]-{}", name, occurrence, index + 1),
                        before,
                        after,
                    });
                }
            }
        }
        changes
    }

    /// Canonical rendering of a path, with the segment occurrence counted
    /// among same-named segments.
    pub fn describe(&self, path: &ItemPath) -> String {
        let Some(segment) = self.segments.get(path.segment) else {
            return String::new();
        };
        let occurrence = self.segments[..=path.segment]
            .iter()
            .filter(|s| s.is_named(segment.name()))
            .count();
        let mut out = format!("{}[{}]", segment.name(), occurrence);
        if let Some(field) = path.field {
            out.push_str(&format!("-{field}"));
            if let Some(repeat) = path.repeat {
                out.push_str(&format!("[{repeat}]"));
            }
            if let Some(component) = path.component {
                out.push_str(&format!(".{component}"));
                if let Some(subcomponent) = path.subcomponent {
                    out.push_str(&format!(".{subcomponent}"));
                }
            }
        }
        out
    }
}

impl Node for Message {
    fn value(&self) -> String {
        self.to_string()
    }

    /// Re-splits the text into segments with the delimiters this message
    /// already carries; the header is not re-discovered.
    fn set_value(&mut self, text: &str) {
        let normalized = normalize_endings(text);
        self.segments = normalized
            .split(SEGMENT_SEPARATOR)
            .map(|token| Segment::parse(token, self.delimiters))
            .collect();
    }

    fn mask(&mut self, mask: char) {
        for segment in &mut self.segments {
            segment.mask(mask);
        }
    }
}

impl fmt::Display for Message {
    /// Non-empty segment strings joined by the record separator, one
    /// trailing separator after each content-bearing segment. Segments that
    /// serialize to nothing contribute nothing, not even a separator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for segment in &self.segments {
            let text = segment.to_string();
            if !text.is_empty() {
                f.write_str(&text)?;
                f.write_char(SEGMENT_SEPARATOR)?;
            }
        }
        Ok(())
    }
}
