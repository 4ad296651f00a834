// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod accumulator;
pub mod app_dirs;
pub mod config;
pub mod cue;
pub mod feedback;
pub mod logging;
pub mod rate;
pub mod runtime;
pub mod session;
