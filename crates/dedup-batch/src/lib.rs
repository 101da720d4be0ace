//! Batch orchestration: resumable, pageable deduplication jobs over an
//! external record repository.

pub mod error;
pub mod memory;
pub mod repository;
pub mod runner;
pub mod service;

pub use error::{JobError, RepositoryError};
pub use memory::InMemoryRepository;
pub use repository::{MergeOutcome, RecordPage, RecordRepository};
pub use runner::{AbortHandle, JobReport, JobRunner};
pub use service::JobService;
