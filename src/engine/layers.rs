//! Read-only layers loaded from serialized markup strings.

use bevy::log::{info, warn};
use thiserror::Error;

use crate::constants::MARKUP_DATA_VERSION;
use crate::history::EditAction;
use crate::shapes::{ELEMENT_TAG, METADATA_TAG, Markup, MetadataError};
use crate::surface::{NodeId, ParseError, XmlElement, parse_document};

use super::serialize::{DOCUMENT_TAG, DOCUMENT_VERSION_ATTR};
use super::{MarkupsCore, edit_context};

#[derive(Debug, Error)]
enum LoadError {
    #[error("invalid markup document: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid markup: {0}")]
    Metadata(#[from] MetadataError),
    #[error("unsupported data model version {0:?}")]
    UnsupportedVersion(String),
}

/// A named group of shapes displayed but not editable.
#[derive(Debug)]
pub struct Layer {
    id: String,
    node: NodeId,
    visible: bool,
    markups: Vec<Markup>,
}

impl Layer {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn markups(&self) -> &[Markup] {
        &self.markups
    }
}

/// Collect every `<markup_element>` under `element`, in document order.
fn collect_elements<'a>(element: &'a XmlElement, found: &mut Vec<&'a XmlElement>) {
    for child in element.elements() {
        if child.name == METADATA_TAG {
            found.extend(child.elements().filter(|e| e.name == ELEMENT_TAG));
        } else {
            collect_elements(child, found);
        }
    }
}

fn find_document_version(element: &XmlElement) -> Option<&str> {
    for child in element.elements() {
        if child.name == DOCUMENT_TAG {
            return child.attr(DOCUMENT_VERSION_ATTR);
        }
        if let Some(version) = find_document_version(child) {
            return Some(version);
        }
    }
    None
}

/// Parse a serialized document into shapes. All or nothing.
fn parse_markups(data: &str) -> Result<Vec<Markup>, LoadError> {
    let root = parse_document(data)?;
    if root.name != "svg" {
        return Err(ParseError::UnexpectedRoot {
            expected: "svg".to_string(),
            found: root.name,
        }
        .into());
    }
    if let Some(version) = find_document_version(&root) {
        match version.trim().parse::<u32>() {
            Ok(v) if v <= MARKUP_DATA_VERSION => {}
            _ => return Err(LoadError::UnsupportedVersion(version.to_string())),
        }
    }

    let mut elements = Vec::new();
    collect_elements(&root, &mut elements);
    elements
        .into_iter()
        .zip(1..)
        .map(|(element, id)| Markup::from_metadata(id, element).map_err(LoadError::from))
        .collect()
}

impl MarkupsCore {
    /// Load a serialized string as the read-only layer `layer_id`, replacing a
    /// layer with the same id. Returns false (and loads nothing) on malformed input.
    pub fn load_markups(&mut self, data: &str, layer_id: &str) -> bool {
        let mut markups = match parse_markups(data) {
            Ok(markups) => markups,
            Err(err) => {
                warn!("Failed to load markup layer '{}': {}", layer_id, err);
                return false;
            }
        };
        self.unload_markups(layer_id);

        let node = self.surface.create_node("g");
        self.surface.set_attribute(node, "class", "markups-layer");
        self.surface.set_attribute(node, "data-layer-id", layer_id);
        self.surface.append_child(self.view_node, node);
        // Editable shapes stay above every layer.
        self.surface.append_child(self.view_node, self.markups_node);
        for markup in &mut markups {
            markup.attach(self.surface.as_mut(), node);
        }

        info!("Loaded markup layer '{}' with {} markup(s)", layer_id, markups.len());
        self.layers.push(Layer {
            id: layer_id.to_string(),
            node,
            visible: true,
            markups,
        });
        true
    }

    /// Remove a loaded layer. Returns false when there is no such layer.
    pub fn unload_markups(&mut self, layer_id: &str) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.id == layer_id) else {
            return false;
        };
        let layer = self.layers.remove(index);
        self.surface.remove_node(layer.node);
        info!("Unloaded markup layer '{}'", layer_id);
        true
    }

    pub fn unload_all_layers(&mut self) {
        for layer in self.layers.drain(..) {
            self.surface.remove_node(layer.node);
        }
        info!("Unloaded all markup layers");
    }

    pub fn hide_markups(&mut self, layer_id: &str) -> bool {
        self.set_layer_visible(layer_id, false)
    }

    pub fn show_markups(&mut self, layer_id: &str) -> bool {
        self.set_layer_visible(layer_id, true)
    }

    pub fn layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    pub fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    /// Turn a loaded layer into editable shapes. The conversion is not recorded
    /// in history.
    pub fn edit_layer(&mut self, layer_id: &str) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.id == layer_id) else {
            return false;
        };
        let layer = self.layers.remove(index);
        self.surface.remove_node(layer.node);

        let count = layer.markups.len();
        for markup in &layer.markups {
            let mut copy = markup.clone_shape();
            copy.set_id(self.store.allocate_id());
            let action = EditAction::create(copy)
                .with_history(false)
                .with_selection(false);
            edit_context!(self).execute(action);
        }
        self.refresh();
        info!("Layer '{}' is now editable ({} markup(s))", layer_id, count);
        true
    }

    fn set_layer_visible(&mut self, layer_id: &str, visible: bool) -> bool {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == layer_id) else {
            return false;
        };
        layer.visible = visible;
        if visible {
            self.surface.remove_attribute(layer.node, "visibility");
        } else {
            self.surface.set_attribute(layer.node, "visibility", "hidden");
        }
        true
    }
}
