pub mod parser;
pub mod pipeline;
pub mod record;

pub use record::SubmissionRecord;
