mod book_loader;
mod chapter_slicer;

pub use book_loader::{SourceDocument, SourceKind};
pub use chapter_slicer::{page_marker_line, slice_chapter};
