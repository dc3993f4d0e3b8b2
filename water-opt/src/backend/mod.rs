//! QP solver backends.
//!
//! The optimizer talks to solvers only through [`QpBackend`], so the
//! solver can be swapped (or mocked in tests) without touching problem
//! construction or solution mapping.

mod active_set;
mod backend;

pub use active_set::ActiveSetBackend;
pub use backend::{BackendResult, BackendStatus, QpBackend};
