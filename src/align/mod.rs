mod aligner;
mod similarity;

pub use aligner::{AlignmentEvent, AlignmentReport, AlignmentResult, ParagraphAligner};
pub use similarity::{
    normalize_text, sequence_ratio, similarity_score, MatchingBlock, SequenceMatcher,
};
