//! Assistant trees for search aggregations: declare a tree of named nodes
//! once, build the aggregation request from it, then collect the engine's
//! aggregation response back into typed, nested values.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod assistant;
pub mod config;
pub mod error;
pub mod fragment;
pub mod response;

///
/// CONSTANTS
///

/// Reserved row-context key holding a bucket's document count.
///
/// Node names must not reuse it; nothing enforces this.
pub const DOC_COUNT_KEY: &str = "docCount";

/// Bucket cap requested by every terms fragment.
///
/// Fields with more distinct values than this are silently truncated by the
/// engine.
pub const DEFAULT_TERMS_SIZE: u32 = 1000;

/// Language used for inline scripts unless one is given.
pub const DEFAULT_SCRIPT_LANG: &str = "painless";

///
/// Prelude
///
/// Node kinds, the capability trait and the result tree.
/// Errors and configuration stay in their modules.
///

pub mod prelude {
    pub use crate::{
        assistant::{AggList, AggValue, Assistant, Child, RowContext, get_doc_count},
        fragment::{Fragment, Script, build_request},
        response::{AggregationResult, AggregationResults, Bucket, BucketKey},
    };
}
