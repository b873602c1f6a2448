use std::collections::BTreeMap;
use std::fmt;

/// A tag's attributes, keyed by attribute name.
///
/// A sorted map is used so that serialization output is stable. HTML does not assign meaning to
/// attribute order.
pub type Attributes = BTreeMap<String, String>;

/// A freshly opened tag, such as `<p class="intro">`.
///
/// This is what a [`crate::TagObserver`] gets to see (and mutate) before the tag is attached to
/// the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    /// The tag's name, such as `"p"` or `"a"`.
    pub name: String,

    /// The tag's attributes.
    ///
    /// Duplicate attributes are dropped by the tokenizer, only the first one is kept.
    pub attributes: Attributes,
}

impl Tag {
    /// Create a tag without any attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute, builder-style.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }
}

/// Whether `name` can be written as an attribute name without changing what the markup means.
fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

impl fmt::Display for Tag {
    /// Format the tag as it would appear in a start tag, e.g. `<p class="intro">`.
    ///
    /// Attributes whose names cannot be represented in markup (such as names containing quotes or
    /// whitespace, which a callback could have inserted) are left out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (name, value) in &self.attributes {
            if !is_valid_attribute_name(name) {
                continue;
            }
            write!(f, " {}=\"", name)?;
            crate::serialize::write_escaped(f, value, true)?;
            f.write_str("\"")?;
        }
        f.write_str(">")
    }
}
