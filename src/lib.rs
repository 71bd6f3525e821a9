// Library exports for the CLI and for other tools

pub mod align;
pub mod book;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod repair;
pub mod segment;
pub mod utils;
pub mod validate;

// Re-export commonly used types
pub use align::{AlignmentReport, ParagraphAligner};
pub use book::{Chapter, ChapterMeta, PageRange, ParagraphRecord};
pub use config::{AlignmentPolicy, BookConfig};
pub use error::BookError;
