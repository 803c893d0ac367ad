pub mod certificate;
pub mod project;
pub mod records;

pub use certificate::Certificate;
pub use project::Project;
pub use records::{parse_records, Record, RecordSet, SchemaError};
