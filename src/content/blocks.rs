//! Portable Text block tree
//!
//! Nodes are tagged by `_type`. Anything this site does not understand
//! deserializes to an `Unknown` variant instead of failing the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A top-level node in a rich-text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum BlockNode {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(rename = "image")]
    Image(ImageRef),
    #[serde(rename = "code")]
    Code(CodeBlock),
    #[serde(other)]
    Unknown,
}

/// A text block: paragraph, heading, quote or list item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    /// `None` when the payload carried something other than an array
    #[serde(default, deserialize_with = "lenient_children")]
    pub children: Option<Vec<InlineNode>>,
    /// Unreadable definitions are dropped one by one
    #[serde(default, deserialize_with = "lenient_list")]
    pub mark_defs: Vec<MarkDef>,
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
}

impl TextBlock {
    /// Block style, defaulting to `normal`
    pub fn style(&self) -> &str {
        self.style.as_deref().unwrap_or("normal")
    }

    /// Iterate over the spans that carry text
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.children.iter().flatten().filter_map(|child| match child {
            InlineNode::Span(span) if span.text.is_some() => Some(span),
            _ => None,
        })
    }

    /// Look up an annotation by its key
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }
}

/// Inline child of a text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum InlineNode {
    #[serde(rename = "span")]
    Span(Span),
    #[serde(other)]
    Unknown,
}

/// A run of text with decorators and annotation keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    /// `None` when the payload carried a non-string value
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub marks: Vec<String>,
}

impl Span {
    pub fn new(text: &str) -> Self {
        Self {
            key: None,
            text: Some(text.to_string()),
            marks: Vec::new(),
        }
    }

    pub fn with_marks(text: &str, marks: &[&str]) -> Self {
        Self {
            marks: marks.iter().map(|m| m.to_string()).collect(),
            ..Self::new(text)
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Annotation definition referenced from span marks (links)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// Image reference as stored by the CMS
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    pub fn from_ref(reference: &str) -> Self {
        Self {
            asset: Some(AssetRef {
                reference: Some(reference.to_string()),
                url: None,
            }),
            alt: None,
        }
    }

    /// Asset document id (`image-<id>-<w>x<h>-<ext>`), if any
    pub fn asset_ref(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.reference.as_deref())
            .filter(|r| !r.is_empty())
    }

    /// Non-empty alt text
    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref().filter(|a| !a.is_empty())
    }
}

/// Reference to an uploaded asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Code snippet block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Deserialize a body, turning unreadable nodes into `BlockNode::Unknown`
pub fn lenient_blocks<'de, D>(deserializer: D) -> Result<Option<Vec<BlockNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(None);
    };
    let blocks = items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                tracing::debug!("Skipping unreadable block: {}", e);
                BlockNode::Unknown
            })
        })
        .collect();
    Ok(Some(blocks))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// A list where `null`, a non-array or an unreadable item never fails the parent
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_children<'de, D>(deserializer: D) -> Result<Option<Vec<InlineNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(None);
    };
    let children = items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or(InlineNode::Unknown))
        .collect();
    Ok(Some(children))
}
