//! Transfer functions with precomputed tables.
pub mod srgb;
