//! Assistant nodes: the shared capability every node kind implements, and
//! the concrete list and metric kinds.
//!
//! One tree drives both directions. `build_fragment` nests each child's
//! request under the child's name; `collect` looks each child's result up
//! under that same name.

mod child;
mod context;
mod list;
mod value;


use crate::{
    error::InternalError,
    fragment::{AggregationRequest, Fragment},
    response::{AggregationResult, AggregationResults},
};
use std::any::Any;

// re-exports
pub use child::Child;
pub use context::{RowContext, get_doc_count};
pub use list::{AggList, FragmentBuilder, RowFactory};
pub use value::AggValue;

///
/// Assistant
///
/// A named node in an assistant tree.
///
/// Implementors supply their own request body and result extraction;
/// fragment nesting, root lookup and typed reads from a row context are
/// provided. Nodes are immutable once built and may be shared across
/// threads and reused for any number of collect calls.
///

pub trait Assistant: Send + Sync {
    /// Value produced by [`Assistant::collect`].
    type Output: Any + Send;

    /// Identity key; the name this node's fragment and result live under.
    fn name(&self) -> &str;

    /// Ordered children. Empty for leaf kinds.
    fn children(&self) -> &[Child] {
        &[]
    }

    /// This node's own request body, without sub-aggregations.
    fn fragment(&self) -> AggregationRequest;

    /// Convert this node's raw result into its typed output.
    fn collect(&self, raw: &AggregationResult) -> Result<Self::Output, InternalError>;

    /// Build this node's fragment with every child fragment attached under
    /// the child's name, recursively.
    fn build_fragment(&self) -> Result<Fragment, InternalError> {
        let mut fragment = Fragment::new(self.fragment());
        for child in self.children() {
            fragment.attach(child.name(), child.build_fragment()?)?;
        }

        Ok(fragment)
    }

    /// Look up this node's result by name in a set of results and collect it.
    fn collect_from(&self, results: &AggregationResults) -> Result<Self::Output, InternalError> {
        let raw = results
            .get(self.name())
            .ok_or_else(|| InternalError::response_not_found(self.name()))?;

        self.collect(raw)
    }

    /// Move this node's collected value out of a row context.
    /// Fails when the value is absent or of another type.
    fn read_value(&self, ctx: &mut RowContext) -> Result<Self::Output, InternalError> {
        ctx.take(self.name())
    }

    /// Like [`Assistant::read_value`], but yields `default` when absent.
    fn read_value_or(
        &self,
        ctx: &mut RowContext,
        default: Self::Output,
    ) -> Result<Self::Output, InternalError> {
        ctx.take_or(self.name(), default)
    }
}
