//! PPTX (Office Open XML) slide text extraction.
//!
//! Reads .pptx files, which are ZIP archives containing one XML part per
//! slide, and concatenates the visible text runs in slide order.

pub mod parser;

pub use parser::SlideTextExtractor;
