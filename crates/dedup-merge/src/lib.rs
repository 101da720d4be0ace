//! Master selection and conflict-preserving merge resolution.

pub mod error;
pub mod master;
pub mod resolver;

pub use error::MergeError;
pub use master::select_master;
pub use resolver::{build_conflict_report, resolve};
