//! chinese-reader
//!
//! Static site generator for graded Chinese reading. Each day's story is
//! annotated with `reader_core::segment` and rendered to an HTML page whose
//! vocabulary spans show pinyin and an English gloss on hover; words outside
//! the learner's HSK level are highlighted.
//!
//! Public API:
//! - `ReaderConfig` - Output, corpus and vocabulary settings (TOML)
//! - `Site` - Loads vocabulary + stories and writes the pages for a date
//! - `render` - HTML templates for articles, sidebar and index

pub mod config;
pub use config::ReaderConfig;

pub mod render;
pub use render::ArticleRef;

pub mod site;
pub use site::{GenerationReport, Site};
