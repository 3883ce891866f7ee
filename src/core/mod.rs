pub mod analyzer;
pub mod context_generator;
pub mod exclusion;
pub mod file_selector;
pub mod generation;
pub mod merge;
