//! Batch attribute assignment shared by the frame host and the navigator.

use super::Element;

/// Value in an attribute bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Regular `name="value"` attribute
    Text(String),
    /// Boolean attribute: present when true, removed when false
    Flag(bool),
}

impl AttrValue {
    /// Pixel length, e.g. `640px`
    pub fn px(value: u32) -> Self {
        AttrValue::Text(format!("{value}px"))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}

/// Apply every `(name, value)` pair of `attributes` onto `element`.
///
/// Returns the element so calls can be chained into an insertion.
pub fn set_attributes<I, K, V>(element: &mut Element, attributes: I) -> &mut Element
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttrValue>,
{
    for (name, value) in attributes {
        let name = name.into();
        match value.into() {
            AttrValue::Text(text) => element.set_attr(name, text),
            AttrValue::Flag(true) => element.set_attr(name, ""),
            AttrValue::Flag(false) => {
                element.remove_attr(&name);
            }
        }
    }
    element
}
