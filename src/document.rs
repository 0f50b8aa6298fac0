use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::content::{ContainerRole, ContentTree, ImageData, NodeId, NodeKind};

/// A portfolio document as produced by the upstream converters. The body is
/// already content-tree markup; this crate never parses markdown or
/// asciidoc itself.
#[derive(Debug, Deserialize)]
pub struct PortfolioDoc {
    pub title: String,
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

/// Serialized form of one content node.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSpec {
    Container {
        #[serde(default)]
        role: RoleSpec,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        classes: Vec<String>,
        #[serde(default)]
        attrs: HashMap<String, String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Image {
        source: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
        #[serde(default)]
        classes: Vec<String>,
        #[serde(default)]
        attrs: HashMap<String, String>,
    },
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSpec {
    #[default]
    Generic,
    Navigation,
    Header,
    Sidebar,
    Menu,
    Footer,
}

impl From<RoleSpec> for ContainerRole {
    fn from(role: RoleSpec) -> Self {
        match role {
            RoleSpec::Generic => ContainerRole::Generic,
            RoleSpec::Navigation => ContainerRole::Navigation,
            RoleSpec::Header => ContainerRole::Header,
            RoleSpec::Sidebar => ContainerRole::Sidebar,
            RoleSpec::Menu => ContainerRole::Menu,
            RoleSpec::Footer => ContainerRole::Footer,
        }
    }
}

pub fn load_document(path: &Path) -> Result<PortfolioDoc> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let doc: PortfolioDoc = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse document {}", path.display()))?;
    info!(
        "loaded document '{}' with {} top level nodes",
        doc.title,
        doc.body.len()
    );
    Ok(doc)
}

/// Materialize `specs` under `parent`. The caller decides when to
/// `commit()` so a whole section lands as one mutation batch.
pub fn instantiate(tree: &mut ContentTree, parent: NodeId, specs: &[NodeSpec]) {
    for spec in specs {
        instantiate_node(tree, parent, spec);
    }
}

fn instantiate_node(tree: &mut ContentTree, parent: NodeId, spec: &NodeSpec) {
    match spec {
        NodeSpec::Container {
            role,
            id,
            classes,
            attrs,
            children,
        } => {
            let node = tree.append_child(
                parent,
                NodeKind::Container {
                    role: (*role).into(),
                },
            );
            if let Some(anchor) = id {
                tree.set_attr(node, "id", anchor);
            }
            apply_decorations(tree, node, classes, attrs);
            instantiate(tree, node, children);
        }
        NodeSpec::Heading { level, text } => {
            tree.append_child(
                parent,
                NodeKind::Heading {
                    level: (*level).clamp(1, 6),
                    text: text.clone(),
                },
            );
        }
        NodeSpec::Paragraph { text } => {
            tree.append_child(parent, NodeKind::Paragraph { text: text.clone() });
        }
        NodeSpec::Image {
            source,
            alt,
            width,
            height,
            classes,
            attrs,
        } => {
            let node = tree.append_child(
                parent,
                NodeKind::Image(ImageData {
                    source: source.clone(),
                    alt_text: alt.clone(),
                    natural_width: *width,
                    natural_height: *height,
                }),
            );
            apply_decorations(tree, node, classes, attrs);
        }
    }
}

fn apply_decorations(
    tree: &mut ContentTree,
    node: NodeId,
    classes: &[String],
    attrs: &HashMap<String, String>,
) {
    for class in classes {
        tree.add_class(node, class);
    }
    for (name, value) in attrs {
        tree.set_attr(node, name, value);
    }
}
