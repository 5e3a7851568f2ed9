//! Content carried through unchanged

/// An element the engine does not model, kept as its exact source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    /// Qualified element name
    pub name: String,
    /// The element as it appeared in the source, tags included
    pub xml: String,
}

/// Vendor attributes and elements found next to modelled content
///
/// Attributes are written back after the known attributes of their element,
/// elements after its known children, both in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    /// Unknown attributes as (qualified name, value) pairs
    pub attributes: Vec<(String, String)>,
    /// Unknown child elements
    pub elements: Vec<RawElement>,
}

impl Extensions {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing was captured
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.elements.is_empty()
    }

    /// Value of a captured attribute by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Captured elements with the given qualified name
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawElement> {
        self.elements.iter().filter(move |e| e.name == name)
    }
}
