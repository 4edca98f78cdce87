pub mod cache;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use loader::{PreloadReport, TileFetcher, TilePreloader};
pub use source::{TemplateSource, TileSource};
