pub mod colors;
pub mod dataset;
pub mod normalizer;
pub mod summary;
