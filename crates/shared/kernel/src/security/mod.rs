//! Access control primitives.

pub mod access;
