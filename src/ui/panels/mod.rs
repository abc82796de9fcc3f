// SolSleuth - ui/panels/mod.rs

pub mod credentials;
pub mod files;
