//! Test suites for the recolor service.

mod support;
