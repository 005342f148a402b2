//! egui surfaces of the demo host: toolbar, style bar, label text and the
//! config reset notice.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::{ConfigResetNotification, MarkupsConfig, SaveConfigRequest};
use crate::engine::MarkupsCore;
use crate::shapes::MarkupKind;
use crate::shapes::style::{FILL_COLOR, FONT_SIZE, STROKE_COLOR, STROKE_WIDTH};
use crate::theme;

use super::CanvasLabels;
use super::input::shortcut_label;

fn tool_button_label(kind: MarkupKind) -> String {
    format!("{} ({})", kind.display_name(), shortcut_label(kind))
}

/// Main toolbar: edit toggle, shape kinds and history buttons
pub fn toolbar_ui(mut contexts: EguiContexts, mut core: ResMut<MarkupsCore>) -> Result {
    egui::TopBottomPanel::top("markups_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                let editing = core.is_editing();
                let edit_button = egui::Button::new(
                    egui::RichText::new(if editing { "Editing (E)" } else { "Edit (E)" })
                        .size(14.0)
                        .strong(),
                )
                .min_size(egui::vec2(0.0, 28.0))
                .selected(editing);
                if ui.add(edit_button).clicked() {
                    if editing {
                        core.leave_edit_mode();
                    } else {
                        core.enter_edit_mode();
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                ui.add_enabled_ui(core.is_editing(), |ui| {
                    for kind in MarkupKind::ALL {
                        let selected = core.edit_mode() == kind;
                        let button = egui::Button::new(
                            egui::RichText::new(kind.display_name()).size(14.0).strong(),
                        )
                        .min_size(egui::vec2(0.0, 28.0))
                        .selected(selected);

                        let response = ui.add(button);
                        if response.clicked() {
                            core.change_edit_mode(kind);
                        }
                        response.on_hover_text(tool_button_label(kind));
                    }
                });

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add_enabled(!core.is_undo_stack_empty(), egui::Button::new("Undo"))
                    .clicked()
                {
                    core.undo();
                }
                if ui
                    .add_enabled(!core.is_redo_stack_empty(), egui::Button::new("Redo"))
                    .clicked()
                {
                    core.redo();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mut visible = core.is_visible();
                    if ui.checkbox(&mut visible, "Visible (H)").changed() {
                        if visible {
                            core.show();
                        } else {
                            core.hide();
                        }
                    }
                });
            });
        });
    Ok(())
}

/// Style settings for the active edit mode
pub fn style_settings_ui(
    mut contexts: EguiContexts,
    mut core: ResMut<MarkupsCore>,
    mut config: ResMut<MarkupsConfig>,
    mut save_requests: MessageWriter<SaveConfigRequest>,
) -> Result {
    if !core.is_editing() {
        return Ok(());
    }

    egui::TopBottomPanel::top("markups_style")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6))
                .fill(theme::ui::PANEL_BACKGROUND),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;

                let kind = core.edit_mode();
                ui.label(
                    egui::RichText::new(format!("{} Style:", kind.display_name()))
                        .color(theme::ui::LABEL_TEXT),
                );
                ui.add_space(8.0);

                let style = core.get_style();
                let keys = core.style_keys();
                let color_key = if keys.contains(&FILL_COLOR) && kind == MarkupKind::Text {
                    FILL_COLOR
                } else {
                    STROKE_COLOR
                };

                ui.label("Color:");
                let current = style.get(color_key).unwrap_or_default().to_string();
                for (value, name, egui_color) in theme::markup_colors() {
                    let is_selected = current.eq_ignore_ascii_case(value);
                    let button = egui::Button::new("")
                        .fill(egui_color)
                        .min_size(egui::vec2(18.0, 18.0))
                        .stroke(if is_selected {
                            egui::Stroke::new(2.0, theme::ui::SELECTED_BORDER)
                        } else {
                            egui::Stroke::new(1.0, theme::ui::UNSELECTED_BORDER)
                        });
                    if ui.add(button).on_hover_text(name).clicked() {
                        core.set_style_value(color_key, value);
                    }
                }

                ui.add_space(12.0);
                let size_key = if keys.contains(&STROKE_WIDTH) {
                    Some((STROKE_WIDTH, "Width:", 0.5..=50.0))
                } else if keys.contains(&FONT_SIZE) {
                    Some((FONT_SIZE, "Size:", 4.0..=200.0))
                } else {
                    None
                };
                if let Some((key, label, range)) = size_key {
                    ui.label(label);
                    let mut value = style.number(key).unwrap_or(1.0);
                    let response = ui.add(egui::DragValue::new(&mut value).range(range).speed(0.5));
                    if response.changed() {
                        core.set_style_value(key, &crate::shapes::fmt_num(value));
                    }
                }

                ui.add_space(12.0);
                ui.separator();
                ui.label("Snap:");
                let mut snap = config.rotation_snap_degrees;
                let response = ui.add(
                    egui::DragValue::new(&mut snap)
                        .range(1.0..=90.0)
                        .suffix("°"),
                );
                if snap != config.rotation_snap_degrees {
                    config.rotation_snap_degrees = snap;
                }
                if response.drag_stopped() || response.lost_focus() {
                    save_requests.write(SaveConfigRequest);
                }

                ui.add_space(12.0);
                ui.label(
                    egui::RichText::new("Shift: constrain  Ctrl+S/O: save/load")
                        .color(theme::ui::HINT_TEXT)
                        .size(11.0),
                );
            });
        });
    Ok(())
}

/// Draw label text queued by the gizmo canvas
pub fn render_labels(mut contexts: EguiContexts, labels: Res<CanvasLabels>) -> Result {
    let ctx = contexts.ctx_mut()?;
    for (index, label) in labels.0.iter().enumerate() {
        if label.text.is_empty() || label.font_size <= 0.0 {
            continue;
        }
        egui::Area::new(egui::Id::new(("markup_label", index)))
            .fixed_pos(egui::pos2(label.position.x, label.position.y))
            .pivot(egui::Align2::LEFT_TOP)
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(&label.text)
                        .color(theme::bevy_to_egui(label.color))
                        .size(label.font_size),
                );
            });
    }
    Ok(())
}

/// Tell the user their config file was replaced by defaults
pub fn config_reset_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }
    let mut open = true;
    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .open(&mut open)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be read and were reset to defaults.");
            if let Some(reason) = &notification.reason {
                ui.label(egui::RichText::new(reason).color(theme::ui::HINT_TEXT));
            }
        });
    if !open {
        notification.show = false;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_button_label_includes_shortcut() {
        assert_eq!(tool_button_label(MarkupKind::Rectangle), "Rectangle (R)");
        assert_eq!(tool_button_label(MarkupKind::Text), "Text (T)");
    }
}
