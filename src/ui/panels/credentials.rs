// SolSleuth - ui/panels/credentials.rs
//
// Credential detail pane (central panel). Shows the extracted values
// for the selected save file, one row per label, each with a Copy
// button. Values are rendered monospace and are never logged.

use crate::app::state::{AppState, FileOutcome};
use crate::ui::theme;
use crate::util::constants;

/// Render the credentials panel for the currently selected file.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let Some(file) = state.selected_file().cloned() else {
        ui.centered_and_justified(|ui| {
            ui.label("Select a save file to view its contents.");
        });
        return;
    };

    ui.heading(file.display_name());
    ui.label(
        egui::RichText::new(file.path.display().to_string())
            .color(theme::DIM_TEXT)
            .small(),
    );
    if let Some(modified) = file.modified {
        ui.label(
            egui::RichText::new(format!(
                "{} bytes, modified {}",
                file.size,
                modified.format("%Y-%m-%d %H:%M:%S UTC")
            ))
            .color(theme::DIM_TEXT)
            .small(),
        );
    }
    ui.separator();

    let outcome = state.outcomes.get(&file.path).cloned();
    match outcome {
        None => {
            ui.label(if state.scan_in_progress {
                "Scanning..."
            } else {
                "Not scanned yet."
            });
        }
        Some(FileOutcome::Error(message)) => {
            ui.colored_label(theme::ERROR_COLOUR, message);
        }
        Some(FileOutcome::Extracted(extraction)) => {
            if extraction.hit_deadline {
                ui.colored_label(
                    theme::INCOMPLETE_COLOUR,
                    format!(
                        "Scan stopped early after {} bytes; results may be incomplete.",
                        extraction.bytes_scanned
                    ),
                );
                ui.separator();
            }

            let now = ui.input(|i| i.time);

            egui::Grid::new("credentials_grid")
                .num_columns(3)
                .spacing([12.0, 8.0])
                .min_col_width(theme::VALUE_COLUMN_MIN_WIDTH / 3.0)
                .show(ui, |ui| {
                    for label in constants::DEFAULT_LABELS {
                        ui.label(format!("{label}:"));

                        match extraction.value_for(label) {
                            Some(value) => {
                                ui.label(egui::RichText::new(value).monospace().strong());

                                ui.horizontal(|ui| {
                                    if ui.button("Copy").clicked() {
                                        ui.ctx().copy_text(value.to_string());
                                        state.copied = Some(((*label).to_string(), now));
                                        tracing::debug!(label = *label, "Value copied to clipboard");
                                    }
                                    // Transient indicator next to the button
                                    // that was clicked most recently.
                                    if let Some((ref copied_label, at)) = state.copied {
                                        if copied_label.as_str() == *label
                                            && now - at < constants::COPIED_FEEDBACK_SECS
                                        {
                                            ui.colored_label(theme::HIT_COLOUR, "Copied");
                                            ui.ctx().request_repaint();
                                        }
                                    }
                                });
                            }
                            None => {
                                ui.colored_label(theme::DIM_TEXT, "Not found");
                                ui.label("");
                            }
                        }
                        ui.end_row();
                    }
                });

            if extraction.pairs.is_empty() && !extraction.hit_deadline {
                ui.separator();
                ui.label(
                    egui::RichText::new("No credentials were found in this file.")
                        .color(theme::DIM_TEXT),
                );
            }
        }
    }
}
