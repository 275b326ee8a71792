//! Core pipeline orchestration for moddoc.
//!
//! This crate ties together enumeration, namespace grouping, fetching,
//! normalization, and file output into the end-to-end [`pipeline::export`]
//! workflow.

pub mod fetch;
pub mod grouping;
pub mod pipeline;
pub mod writer;
