pub mod fasta;
pub mod fastq;
pub mod format;
pub mod record;

pub use format::{Format, RecordReader};
pub use record::{Record, RecordSpan};
