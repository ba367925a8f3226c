//! Integration tests that run the whole fit pipeline.

mod pipeline;
mod scenarios;
