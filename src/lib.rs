// SolSleuth - lib.rs
//
// Library crate root. The binary (main.rs) wires these layers together:
//   util     -> constants, errors, logging (no internal deps)
//   core     -> discovery, scanner, model (pure logic)
//   platform -> OS paths, config.toml
//   app      -> scan orchestration, UI state
//   ui       -> egui panels and theme

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
