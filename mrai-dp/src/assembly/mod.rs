//! Final dataset assembly

pub mod dataset_assembler;

pub use dataset_assembler::{DatasetAssembler, AGGREGATE_STATS};
