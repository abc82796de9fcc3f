// SolSleuth - ui/mod.rs
//
// UI layer: egui panels and theme. Renders app state; owns no business
// logic and no threads.

pub mod panels;
pub mod theme;
