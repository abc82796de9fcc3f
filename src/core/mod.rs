// SolSleuth - core/mod.rs
//
// Core layer: file discovery, save-file scanning, and the shared data
// model. This layer is pure logic -- it performs no UI work and owns no
// threads. The app layer drives it and the ui layer renders its output.

pub mod discovery;
pub mod model;
pub mod scanner;
