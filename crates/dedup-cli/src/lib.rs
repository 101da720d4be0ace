//! Library surface of the deduplication CLI: CSV ingestion and logging
//! setup, reusable from integration tests.

pub mod ingest;
pub mod logging;
