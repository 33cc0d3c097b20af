// Pipeline processing: decoding the packed categories column and deduplication

pub mod categories;
pub mod clean;

pub use categories::{CategorySchema, DecodedRow};
pub use clean::{clean_data, CleanOutcome};
