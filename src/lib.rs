pub mod config;
pub mod import;
pub mod input;
pub mod parser;
pub mod remap;
pub mod source;
pub mod store;
pub mod translate;

pub use config::ImportConfig;
pub use import::{import_dump, ImportCounts, ImportSummary, Importer, Stage};
