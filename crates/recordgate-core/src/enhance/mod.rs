//! Record enhancement.
//!
//! [`RecordEnhancer`] derives the action set of one record for one caller,
//! redacts parts the caller may not read and flags every link with whether
//! its target is readable. Link decisions are memoized in a cache owned by
//! each call.

mod cache;
mod enhancer;

pub use enhancer::RecordEnhancer;
