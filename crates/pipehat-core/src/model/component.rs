//! Component level: an ordered run of subcomponents

use std::fmt;

use super::{Delimiters, Node, SubComponent, write_joined};

/// A group of subcomponents joined by the subcomponent delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    subcomponents: Vec<SubComponent>,
    delimiters: Delimiters,
}

impl Component {
    /// Split `text` on the subcomponent delimiter. Splitting an empty string
    /// yields a single empty leaf, so the round trip stays exact.
    pub fn parse(text: &str, delimiters: Delimiters) -> Self {
        let subcomponents = text
            .split(delimiters.subcomponent)
            .map(SubComponent::new)
            .collect();
        Self {
            subcomponents,
            delimiters,
        }
    }

    /// A component with no subcomponents; serializes to the empty string.
    pub fn empty(delimiters: Delimiters) -> Self {
        Self {
            subcomponents: Vec::new(),
            delimiters,
        }
    }

    pub fn subcomponents(&self) -> &[SubComponent] {
        &self.subcomponents
    }

    /// 1-based subcomponent lookup.
    pub fn subcomponent(&self, index: usize) -> Option<&SubComponent> {
        index
            .checked_sub(1)
            .and_then(|i| self.subcomponents.get(i))
    }

    pub fn subcomponent_mut(&mut self, index: usize) -> Option<&mut SubComponent> {
        index
            .checked_sub(1)
            .and_then(|i| self.subcomponents.get_mut(i))
    }
}

impl Node for Component {
    fn value(&self) -> String {
        self.to_string()
    }

    fn set_value(&mut self, text: &str) {
        self.subcomponents = text
            .split(self.delimiters.subcomponent)
            .map(SubComponent::new)
            .collect();
    }

    fn mask(&mut self, mask: char) {
        for subcomponent in &mut self.subcomponents {
            subcomponent.mask(mask);
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.subcomponents, self.delimiters.subcomponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_rejoins_subcomponents() {
        let component = Component::parse("A&B&C", Delimiters::default());
        assert_eq!(component.subcomponents().len(), 3);
        assert_eq!(component.subcomponent(2).unwrap().text(), "B");
        assert_eq!(component.to_string(), "A&B&C");
    }

    #[test]
    fn lookup_is_one_based() {
        let component = Component::parse("A&B", Delimiters::default());
        assert!(component.subcomponent(0).is_none());
        assert_eq!(component.subcomponent(1).unwrap().text(), "A");
        assert!(component.subcomponent(3).is_none());
    }

    #[test]
    fn empty_component_serializes_to_empty_string() {
        let component = Component::empty(Delimiters::default());
        assert_eq!(component.to_string(), "");
    }

    #[test]
    fn set_value_resplits_on_own_delimiter() {
        let mut component = Component::parse("A", Delimiters::default());
        component.set_value("X&Y");
        assert_eq!(component.subcomponents().len(), 2);
        assert_eq!(component.to_string(), "X&Y");
    }

    #[test]
    fn mask_skips_null_sentinel_leaves() {
        let mut component = Component::parse("SECRET&\"\"", Delimiters::default());
        component.mask('*');
        assert_eq!(component.to_string(), "******&\"\"");
    }
}
