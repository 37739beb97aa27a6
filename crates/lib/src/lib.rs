//! wrangle-lib: bottle resolution for formula-based build pipelines
//!
//! This crate provides the pieces used to avoid rebuilding packages that
//! already have a prebuilt bottle:
//! - `formula`: scanning formula definitions into a `FormulaIndex`
//! - `bottle`: canonical bottle filenames and the hosted bottle manifest
//! - `cache` / `fetch`: local cache lookup and bottle downloads
//! - `resolve`: the per-formula cached / downloaded / missing state machine
//! - `fallback`: handing missing formulas to a source build
//! - `audit`: checking declared bottles against a bucket listing

pub mod audit;
pub mod bottle;
pub mod cache;
pub mod consts;
pub mod fallback;
pub mod fetch;
pub mod formula;
pub mod platform;
pub mod resolve;
pub mod util;
