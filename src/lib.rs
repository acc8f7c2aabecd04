pub mod camera;
pub mod cli;
pub mod error;
pub mod export;
pub mod font;
pub mod geometry;
pub mod math;
pub mod params;
pub mod scene;
pub mod session;
pub mod texture;
pub mod updater;
pub mod viewfit;

// Re-export the session-level API most callers drive
pub use error::{Error, Result};
pub use params::{FontId, MaterialParams, TextParams, UpdateKind};
pub use session::{CommitOutcome, MeshHandle, RegenTicket, RegenToken, ViewerSession};
pub use updater::MeshUpdater;
pub use viewfit::{fit_view, fitting_distance};
