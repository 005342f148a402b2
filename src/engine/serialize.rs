//! Producing the portable markup string and painting onto a raster context.

use bevy::log::error;

use crate::constants::MARKUP_DATA_VERSION;
use crate::shapes::METADATA_TAG;
use crate::surface::{NodeId, RasterContext};

use super::MarkupsCore;

/// Element carrying document-level metadata.
pub const DOCUMENT_TAG: &str = "markup_document";
/// Attribute of [`DOCUMENT_TAG`] holding the data model version.
pub const DOCUMENT_VERSION_ATTR: &str = "data-model-version";

const SVG_OPEN: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" baseProfile="full">"#;

impl MarkupsCore {
    /// Serialize all editable shapes to an SVG string that [`load_markups`]
    /// accepts. The surface is left exactly as it was.
    ///
    /// [`load_markups`]: MarkupsCore::load_markups
    pub fn generate_data(&mut self) -> String {
        // Exported shapes carry no selection or hover styling.
        let selected = self.selected;
        let hovered = self.hovered;
        for id in [selected, hovered].into_iter().flatten() {
            if let Some(markup) = self.store.get_mut(id) {
                markup.set_selected(false);
                markup.set_highlighted(false);
            }
        }
        self.store.sync(self.surface.as_mut(), self.markups_node);

        let mut injected: Vec<NodeId> = Vec::with_capacity(self.store.len() + 1);
        let document = self.surface.create_node(METADATA_TAG);
        let header = self.surface.create_node(DOCUMENT_TAG);
        self.surface.set_attribute(
            header,
            DOCUMENT_VERSION_ATTR,
            &MARKUP_DATA_VERSION.to_string(),
        );
        self.surface.append_child(document, header);
        self.surface.append_child(self.markups_node, document);
        injected.push(document);

        for markup in self.store.iter() {
            match markup.node() {
                Some(node) => injected.push(markup.metadata().inject(self.surface.as_mut(), node)),
                None => error!("Markup {} has no surface node; not serialized", markup.id()),
            }
        }

        let body = self.surface.serialize(self.markups_node);
        for node in injected {
            self.surface.remove_node(node);
        }

        if let Some(id) = selected
            && let Some(markup) = self.store.get_mut(id)
        {
            markup.set_selected(true);
        }
        if let Some(id) = hovered
            && let Some(markup) = self.store.get_mut(id)
        {
            markup.set_highlighted(true);
        }
        self.store.sync(self.surface.as_mut(), self.markups_node);

        format!("{SVG_OPEN}{body}</svg>")
    }

    /// Paint visible layers, editable shapes and the edit frame in client pixels.
    pub fn render_to_canvas(&self, ctx: &mut dyn RasterContext) {
        if !self.visible {
            return;
        }
        let Some(affine) = self.mapper().markup_to_client_affine() else {
            return;
        };
        let x_axis = affine.matrix2.x_axis;
        let scale_x = x_axis.length();
        if scale_x <= f32::EPSILON || !scale_x.is_finite() {
            return;
        }
        let scale_y = affine.matrix2.determinant() / scale_x;
        let angle = x_axis.y.atan2(x_axis.x);

        ctx.save();
        ctx.translate(affine.translation.x, affine.translation.y);
        ctx.rotate(angle);
        ctx.scale(scale_x, scale_y);
        for layer in self.layers.iter().filter(|l| l.is_visible()) {
            for markup in layer.markups() {
                markup.render_to_canvas(ctx);
            }
        }
        for markup in self.store.iter() {
            markup.render_to_canvas(ctx);
        }
        ctx.restore();

        if let Some(frame) = self.frame_layout() {
            frame.render_to_canvas(ctx);
        }
    }
}
