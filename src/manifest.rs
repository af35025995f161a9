//! Tour manifests: the on-disk description a host turns into an overlay root.
//!
//! A manifest names the document to embed and lists the step panels as blocks.
//! TOML, YAML and JSON are accepted, chosen by file extension.
//!
//! ```toml
//! load = "https://example.com/docs"
//!
//! [[steps]]
//! blocks = [
//!   { heading = "Intro" },
//!   { paragraph = "Welcome to the tour." },
//! ]
//! ```
//!
//! Manifests are not validated beyond parsing: a step without a heading is
//! rejected when the navigator is built from the resulting element.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dom::Element;
use crate::error::{Result, TourError};

/// Attribute on the overlay root naming the document to embed
pub const LOAD_ATTRIBUTE: &str = "data-load";
/// Class carried by every overlay root
pub const ROOT_CLASS: &str = "stepwise";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourManifest {
    /// URL of the embedded document
    pub load: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepManifest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepManifest {
    #[serde(default)]
    pub id: Option<String>,
    /// Blocks are single-key maps in every format (`heading: Intro` in YAML)
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub blocks: Vec<Block>,
}

/// Content block of a step panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Heading(String),
    Subheading(String),
    Paragraph(String),
    Code(String),
    List(Vec<String>),
    Note(String),
}

impl Block {
    fn to_element(&self) -> Element {
        match self {
            Block::Heading(text) => Element::new("h1").with_text(text.clone()),
            Block::Subheading(text) => Element::new("h2").with_text(text.clone()),
            Block::Paragraph(text) => Element::new("p").with_text(text.clone()),
            Block::Code(text) => {
                Element::new("pre").with_child(Element::new("code").with_text(text.clone()))
            }
            Block::List(items) => items.iter().fold(Element::new("ul"), |list, item| {
                list.with_child(Element::new("li").with_text(item.clone()))
            }),
            Block::Note(text) => Element::new("aside").with_text(text.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Format from a file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => ManifestFormat::Yaml,
            Some("json") => ManifestFormat::Json,
            _ => ManifestFormat::Toml,
        }
    }
}

impl TourManifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, ManifestFormat::from_path(path))
    }

    pub fn parse(text: &str, format: ManifestFormat) -> Result<Self> {
        let parsed: std::result::Result<Self, String> = match format {
            ManifestFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            ManifestFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            ManifestFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(TourError::Manifest)
    }

    /// Build the overlay root: `nav`, then a content section with one `article`
    /// per step.
    pub fn to_element(&self) -> Element {
        let mut root = Element::new("section")
            .with_attr("class", ROOT_CLASS)
            .with_attr(LOAD_ATTRIBUTE, self.load.clone());
        if let Some(title) = &self.title {
            root.set_attr("data-title", title.clone());
        }

        let nav = Element::new("nav")
            .with_child(Element::new("form").with_child(Element::new("input").with_attr("type", "search")));

        let content = self
            .steps
            .iter()
            .fold(Element::new("section").with_attr("class", "content"), |content, step| {
                let mut article = Element::new("article");
                if let Some(id) = &step.id {
                    article.set_attr("id", id.clone());
                }
                let article = step
                    .blocks
                    .iter()
                    .fold(article, |article, block| article.with_child(block.to_element()));
                content.with_child(article)
            });

        root.with_child(nav).with_child(content)
    }
}
