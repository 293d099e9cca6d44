pub mod record;
pub mod scan;

pub use record::{DuplicateKeys, IndexMeta, IndexOptions, RecordIndex};
pub use scan::scan_lookup;
