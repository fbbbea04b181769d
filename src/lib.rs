#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod layout;
pub mod protocol;

pub use config::{LayoutConfig, load_config};
pub use engine::{detect_overlaps, organize, run_pipeline};
pub use error::EngineError;
pub use layout::{LayoutMode, LayoutResult, compute_layout, resolve_overlaps};

#[cfg(feature = "cli")]
pub use cli::run;
