//! Package sources.
//!
//! A source turns a requirement into wheel archives on the online machine.

pub mod pip;
pub mod source;

pub use pip::PipFetcher;
pub use source::{FetchError, PackageFetcher};
