// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod elapsed;
pub mod feedback;
pub mod logging;
pub mod lookup;
pub mod navigation;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod summary;
pub mod util;
pub mod validation;
pub mod workout;
pub mod workout_screen;
