// SolSleuth - ui/panels/files.rs
//
// Save-file list (left sidebar). One selectable row per discovered
// file, with a status glyph once its extraction outcome is known.

use crate::app::state::{AppState, FileOutcome};
use crate::ui::theme;

/// Render the file list panel.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Save Files");

    if state.discovered_files.is_empty() {
        let msg = if state.scan_in_progress {
            format!("Searching... ({} found)", state.files_found)
        } else {
            "No save files found.\nUse File > Open Directory to choose where to look.".to_string()
        };
        ui.label(msg);
        return;
    }

    ui.label(
        egui::RichText::new(format!("{} file(s)", state.discovered_files.len()))
            .color(theme::DIM_TEXT)
            .small(),
    );
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for idx in 0..state.discovered_files.len() {
                let selected = state.selected_index == Some(idx);

                // Row text is computed up front so the file borrow ends
                // before the selection is mutated below.
                let (text, hover) = {
                    let file = &state.discovered_files[idx];
                    let (glyph, colour) = match state.outcomes.get(&file.path) {
                        Some(FileOutcome::Extracted(ex)) if !ex.pairs.is_empty() => {
                            ("\u{25cf}", Some(theme::HIT_COLOUR))
                        }
                        Some(FileOutcome::Extracted(ex)) if ex.hit_deadline => {
                            ("\u{25d0}", Some(theme::INCOMPLETE_COLOUR))
                        }
                        Some(FileOutcome::Extracted(_)) => ("\u{25cb}", None),
                        Some(FileOutcome::Error(_)) => ("\u{2715}", Some(theme::ERROR_COLOUR)),
                        None => ("\u{22ef}", None),
                    };
                    let mut text = egui::RichText::new(format!("{glyph} {}", file.display_name()));
                    if let Some(c) = colour {
                        text = text.color(c);
                    }
                    (text, file.path.display().to_string())
                };

                let response = ui.selectable_label(selected, text);
                if response.clicked() {
                    state.selected_index = Some(idx);
                }
                response.on_hover_text(hover);
            }
        });
}
