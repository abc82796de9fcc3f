// SolSleuth - platform/mod.rs
//
// Platform layer: OS-specific path resolution and configuration
// loading. The only layer allowed to branch on `target_os`.

pub mod config;
