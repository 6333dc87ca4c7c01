//! Selection panel using bevy_egui

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use javis_core::{CategoryOptions, CompositionEngine, DocumentPhase, SlotStatus};

use crate::catalog::CatalogState;
use crate::idle::Idle;
use crate::parts::Composition;
use crate::{SelectionRequest, ViewerStatus};

const PANEL_WIDTH: f32 = 260.0;

/// Grouped system parameters for the selection panel
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub catalog: Res<'w, CatalogState>,
    pub composition: Res<'w, Composition>,
    pub idle: Res<'w, Idle>,
    pub status: Res<'w, ViewerStatus>,
    pub requests: MessageWriter<'w, SelectionRequest>,
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Main UI system runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
        app.add_systems(EguiPrimaryContextPass, ui_system);
    }
}

fn ui_system(mut params: UiParams) {
    let Ok(ctx) = params.contexts.ctx_mut() else { return };

    egui::SidePanel::left("selection_panel")
        .default_width(PANEL_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Javis 3D");
            ui.separator();

            let mut selections = Vec::new();
            render_catalog(ui, &params.catalog, &params.composition, &mut selections);

            if let Some(document) = params.composition.document() {
                ui.separator();
                for group in document.grouped() {
                    render_category(ui, &group, &params.composition, &mut selections);
                }

                if params.composition.base_status() == SlotStatus::Unloaded
                    && ui.button("Reload base part").clicked()
                {
                    selections.push(SelectionRequest::ReloadBase);
                }
            }

            ui.separator();
            render_status(ui, &params.composition, &params.status);
            if params.idle.state() == javis_core::InteractionState::AutoRotating {
                ui.label(egui::RichText::new("Auto-rotating").small().color(egui::Color32::GRAY));
            }

            for request in selections {
                params.requests.write(request);
            }
        });
}

/// Catalog dropdown
fn render_catalog(
    ui: &mut egui::Ui,
    catalog: &CatalogState,
    composition: &CompositionEngine<Entity>,
    selections: &mut Vec<SelectionRequest>,
) {
    let current = composition.entry().map(|e| e.as_str());
    ui.label("Model");
    egui::ComboBox::from_id_salt("catalog_entry")
        .width(PANEL_WIDTH - 20.0)
        .selected_text(current.unwrap_or("Select a model"))
        .show_ui(ui, |ui| {
            for entry in &catalog.entries {
                let selected = current == Some(entry.as_str());
                if ui.selectable_label(selected, entry.as_str()).clicked() && !selected {
                    selections.push(SelectionRequest::Document(entry.clone()));
                }
            }
        });

    if catalog.entries.is_empty() && catalog.listing_pending() {
        ui.label(egui::RichText::new("Loading catalog...").small());
    }
}

/// One dropdown per category; singleton categories of uncategorized parts are checkboxes
fn render_category(
    ui: &mut egui::Ui,
    group: &CategoryOptions<'_>,
    composition: &CompositionEngine<Entity>,
    selections: &mut Vec<SelectionRequest>,
) {
    let category = group.category;
    let selected = composition.selected(category);
    let loading = composition.attachment_status(category) == SlotStatus::Loading;

    if let [only] = group.options[..] {
        if only.asset_reference == category {
            let mut checked = selected.is_some();
            let label = if loading {
                format!("{} (loading)", only.display_name)
            } else {
                only.display_name.clone()
            };
            if ui.checkbox(&mut checked, label).changed() {
                selections.push(SelectionRequest::Attachment {
                    category: category.to_string(),
                    reference: checked.then(|| only.asset_reference.clone()),
                });
            }
            return;
        }
    }

    let selected_name = selected
        .and_then(|reference| group.options.iter().find(|o| o.asset_reference == reference))
        .map(|o| o.display_name.as_str())
        .unwrap_or("None");

    ui.horizontal(|ui| {
        ui.label(category);
        if loading {
            ui.spinner();
        }
    });
    egui::ComboBox::from_id_salt(("category", category))
        .width(PANEL_WIDTH - 20.0)
        .selected_text(selected_name)
        .show_ui(ui, |ui| {
            if ui.selectable_label(selected.is_none(), "None").clicked() && selected.is_some() {
                selections.push(SelectionRequest::Attachment {
                    category: category.to_string(),
                    reference: None,
                });
            }
            for option in &group.options {
                let is_selected = selected == Some(option.asset_reference.as_str());
                if ui.selectable_label(is_selected, option.display_name.as_str()).clicked() && !is_selected {
                    selections.push(SelectionRequest::Attachment {
                        category: category.to_string(),
                        reference: Some(option.asset_reference.clone()),
                    });
                }
            }
        });
}

fn render_status(ui: &mut egui::Ui, composition: &CompositionEngine<Entity>, status: &ViewerStatus) {
    let phase = match composition.phase() {
        DocumentPhase::Empty => "No model selected",
        DocumentPhase::DocumentLoading => "Fetching configuration...",
        DocumentPhase::DocumentReady => match composition.base_status() {
            SlotStatus::Loading => "Loading base part...",
            SlotStatus::Loaded => "Ready",
            SlotStatus::Unloaded => "Base part unavailable",
        },
    };
    ui.label(egui::RichText::new(phase).small());

    if let Some(message) = &status.message {
        let color = if status.is_error {
            egui::Color32::from_rgb(200, 60, 60)
        } else {
            egui::Color32::GRAY
        };
        ui.label(egui::RichText::new(message).small().color(color));
    }
}
