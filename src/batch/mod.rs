pub mod driver;
pub mod job;

pub use driver::BatchDriver;
pub use job::{build_jobs, Job, JobStatus, RunSummary};
