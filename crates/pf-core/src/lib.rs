//! pf-core: stable foundation for procflow.
//!
//! Contains:
//! - units (uom SI types + constructors for process engineering units)
//! - numeric (Real + tolerances + float helpers)
//! - ids (calculation identifiers stamped on equipment runs)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PfError, PfResult};
pub use ids::CalcId;
pub use numeric::*;
pub use units::*;
