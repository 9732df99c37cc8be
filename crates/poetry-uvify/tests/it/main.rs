//! Integration tests for poetry-uvify.
//!
//! Following the single-integration-test pattern from:
//! <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>

pub(crate) mod common;

mod project_parse;
mod rewrite;
mod verbosity;
mod version;
