// SolSleuth - app/mod.rs
//
// Application layer: scan orchestration and UI-facing state. Bridges
// the pure core layer to the egui front-end.

pub mod scan;
pub mod state;
