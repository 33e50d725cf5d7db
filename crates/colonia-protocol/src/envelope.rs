//! The envelope: the one structure that travels on the wire.
//!
//! An envelope is a small tree. The root's `tag` says which message it is
//! (`buy`, `work`, `disbandUnit`, ...), the `attributes` carry that
//! message's scalar fields as strings, and `children` carry embedded
//! payloads such as a goods descriptor.
//!
//! ```text
//! buy  unit="unit:12" settlement="settlement:3" gold="300"
//! └── goods  type="CLOTH" amount="50" location="settlement:3"
//! ```
//!
//! Every attribute value is a string, even when it is semantically a
//! number. Readers parse on demand and treat garbage as invalid input.
//! A missing attribute (`None`) is deliberately different from one that is
//! present but empty (`Some("")`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// A named, attributed, tree-structured wire unit.
///
/// `BTreeMap` keeps attributes sorted, so two envelopes with the same
/// content always serialize to the same text regardless of the order in
/// which attributes were set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Identifies the message variant (or payload kind, for children).
    pub tag: String,

    /// Scalar fields, keyed by stable protocol attribute names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Nested payload elements, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Envelope>,
}

impl Envelope {
    /// Creates an envelope with the given tag and nothing else.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Adds (or replaces) an attribute, builder style.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds the attribute only when `value` is `Some`.
    ///
    /// Used for optional fields, so that "unset" stays absent on the wire
    /// instead of collapsing into an empty string.
    pub fn with_optional_attribute(
        self,
        key: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> Self {
        match value {
            Some(v) => self.with_attribute(key, v),
            None => self,
        }
    }

    /// Appends a child, builder style.
    pub fn with_child(mut self, child: Envelope) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children, builder style.
    pub fn with_children(
        mut self,
        children: impl IntoIterator<Item = Envelope>,
    ) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns the attribute value, or `None` if it is absent.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns `true` if the attribute is present (even if empty).
    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Returns the attribute value or a [`ProtocolError::MissingAttribute`].
    pub fn require_attribute(
        &self,
        key: &'static str,
    ) -> Result<&str, ProtocolError> {
        self.attribute(key).ok_or_else(|| ProtocolError::MissingAttribute {
            tag: self.tag.clone(),
            attribute: key,
        })
    }

    /// Returns the child at `index`, if any.
    pub fn child(&self, index: usize) -> Option<&Envelope> {
        self.children.get(index)
    }

    /// Returns the first child with the given tag, if any.
    pub fn child_by_tag(&self, tag: &str) -> Option<&Envelope> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Checks that this envelope (and every descendant) is well-formed.
    ///
    /// Tags and attribute keys must be identifiers: an ASCII letter
    /// followed by ASCII letters, digits or underscores. Values are free
    /// text.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if !is_identifier(&self.tag) {
            return Err(ProtocolError::MalformedEnvelope(format!(
                "invalid tag {:?}",
                self.tag
            )));
        }
        if let Some(key) = self.attributes.keys().find(|k| !is_identifier(k))
        {
            return Err(ProtocolError::MalformedEnvelope(format!(
                "invalid attribute name {key:?} in <{}>",
                self.tag
            )));
        }
        self.children.iter().try_for_each(Envelope::validate)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy_envelope() -> Envelope {
        Envelope::new("buy")
            .with_attribute("unit", "unit:12")
            .with_attribute("settlement", "settlement:3")
            .with_attribute("gold", "300")
            .with_child(
                Envelope::new("goods")
                    .with_attribute("type", "CLOTH")
                    .with_attribute("amount", "50"),
            )
    }

    #[test]
    fn test_attribute_absent_vs_empty() {
        let env = Envelope::new("work").with_attribute("unit", "");

        assert_eq!(env.attribute("unit"), Some(""));
        assert!(env.has_attribute("unit"));
        assert_eq!(env.attribute("workLocation"), None);
        assert!(!env.has_attribute("workLocation"));
    }

    #[test]
    fn test_with_optional_attribute_skips_none() {
        let env = Envelope::new("settlement")
            .with_optional_attribute("learnableSkill", None::<String>)
            .with_optional_attribute("visited", Some("true"));

        assert!(!env.has_attribute("learnableSkill"));
        assert_eq!(env.attribute("visited"), Some("true"));
    }

    #[test]
    fn test_require_attribute_reports_tag_and_key() {
        let env = Envelope::new("disbandUnit");
        let err = env.require_attribute("unit").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingAttribute { ref tag, attribute: "unit" }
                if tag == "disbandUnit"
        ));
    }

    #[test]
    fn test_children_preserve_order() {
        let env = Envelope::new("update")
            .with_child(Envelope::new("unit"))
            .with_child(Envelope::new("remove"))
            .with_child(Envelope::new("player"));

        let tags: Vec<_> = env.children.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, ["unit", "remove", "player"]);
        assert_eq!(env.child_by_tag("remove"), env.child(1));
    }

    #[test]
    fn test_validate_accepts_nested_envelope() {
        assert!(buy_envelope().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_tag() {
        let err = Envelope::new("").validate().unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_validate_rejects_bad_child_tag() {
        let env = Envelope::new("buy").with_child(Envelope::new("9goods"));
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_attribute_name() {
        let env = Envelope::new("buy").with_attribute("gold amount", "3");
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_json_omits_empty_collections() {
        let json = serde_json::to_value(Envelope::new("logout")).unwrap();
        assert_eq!(json, serde_json::json!({ "tag": "logout" }));
    }

    #[test]
    fn test_json_shape_of_nested_envelope() {
        let json = serde_json::to_value(buy_envelope()).unwrap();
        assert_eq!(json["tag"], "buy");
        assert_eq!(json["attributes"]["gold"], "300");
        assert_eq!(json["children"][0]["tag"], "goods");
        assert_eq!(json["children"][0]["attributes"]["type"], "CLOTH");
    }

    #[test]
    fn test_json_numeric_attribute_value_is_rejected() {
        // Attribute values are strings on the wire, always.
        let wrong = r#"{"tag":"buy","attributes":{"gold":300}}"#;
        assert!(serde_json::from_str::<Envelope>(wrong).is_err());
    }
}
