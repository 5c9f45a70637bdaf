use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::convert::Infallible;
use std::str::FromStr;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ItemLabel(String);

crate::impl_string_newtype!(ItemLabel);

/// Icon glyph shown next to the label, usually a single character.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct Glyph(String);

crate::impl_string_newtype!(Glyph);

/// Ordered selling points, written as `"Fast|Cheap|Good"` in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Default, DeserializeFromStr, Deref, From)]
pub struct UspList(Vec<String>);

impl FromStr for UspList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split('|')
                .map(str::trim)
                .filter(|usp| !usp.is_empty())
                .map(String::from)
                .collect(),
        ))
    }
}

/// One catalogue entry as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ItemSpec {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: Glyph,
    #[serde(default)]
    pub usps: UspList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    original_index: usize,
    pub label: ItemLabel,
    pub icon: Glyph,
    pub usps: UspList,
}

impl Item {
    pub fn new(original_index: usize, label: &str, icon: Glyph, usps: UspList) -> Self {
        let label = match label.trim() {
            "" => ItemLabel::new(format!("Service {}", original_index + 1)),
            trimmed => ItemLabel::from(trimmed),
        };
        Self {
            original_index,
            label,
            icon: Glyph::new(icon.trim()),
            usps,
        }
    }

    pub fn original_index(&self) -> usize {
        self.original_index
    }
}

/// Builds the immutable item list; indices follow catalogue order.
pub fn catalogue(specs: &[ItemSpec]) -> Vec<Item> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| Item::new(i, &spec.label, spec.icon.clone(), spec.usps.clone()))
        .collect()
}

/// A rendered copy of an [`Item`] on the replicated track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualItem {
    pub virtual_index: usize,
    pub original_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usp_parsing_drops_blank_segments() {
        let usps: UspList = " Strategy | |Design|| Launch ".parse().unwrap();
        assert_eq!(*usps, vec!["Strategy", "Design", "Launch"]);

        let empty: UspList = "".parse().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_item_spec_deserialization() {
        let spec: ItemSpec =
            serde_json::from_str(r#"{ "label": "Branding", "icon": "◆", "usps": "Logo|Voice" }"#)
                .unwrap();
        assert_eq!(spec.label, "Branding");
        assert_eq!(spec.icon.as_str(), "◆");
        assert_eq!(*spec.usps, vec!["Logo", "Voice"]);
    }

    #[test]
    fn test_catalogue_labels_fall_back_to_position() {
        let items = catalogue(&[
            ItemSpec {
                label: "  Web  ".into(),
                ..Default::default()
            },
            ItemSpec::default(),
        ]);
        assert_eq!(items[0].label.as_str(), "Web");
        assert_eq!(items[1].label.as_str(), "Service 2");
        assert_eq!(items[1].original_index(), 1);
    }
}
