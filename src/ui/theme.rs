// SolSleuth - ui/theme.rs
//
// Colour scheme and layout constants.
// No dependencies on app state or business logic.

use egui::Color32;

/// Colour for a file that yielded at least one credential pair.
pub const HIT_COLOUR: Color32 = Color32::from_rgb(34, 197, 94); // Green 500

/// Colour for a file whose scan hit the deadline (partial result).
pub const INCOMPLETE_COLOUR: Color32 = Color32::from_rgb(217, 119, 6); // Amber 600

/// Colour for a file that could not be read.
pub const ERROR_COLOUR: Color32 = Color32::from_rgb(220, 38, 38); // Red 600

/// Colour for secondary metadata text.
pub const DIM_TEXT: Color32 = Color32::from_rgb(107, 114, 128); // Gray 500

/// Layout constants.
pub const SIDEBAR_WIDTH: f32 = 280.0;
pub const VALUE_COLUMN_MIN_WIDTH: f32 = 220.0;

/// Apply theme and font-size settings to the egui context.
pub fn apply(ctx: &egui::Context, dark_mode: bool, font_size: f32) {
    if dark_mode {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }

    let mut style = (*ctx.style()).clone();
    for (text_style, font_id) in style.text_styles.iter_mut() {
        match text_style {
            egui::TextStyle::Heading => font_id.size = font_size + 4.0,
            egui::TextStyle::Small => font_id.size = (font_size - 2.0).max(8.0),
            _ => font_id.size = font_size,
        }
    }
    ctx.set_style(style);
}
