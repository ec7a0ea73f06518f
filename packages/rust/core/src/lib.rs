//! Core pipeline orchestration for kmimport.
//!
//! This crate ties together knowledge model loading, graph parsing, crawling
//! and reply output into one end-to-end workflow ([`pipeline::import`]).

pub mod pipeline;
