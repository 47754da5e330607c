use crate::{
    assistant::Assistant, error::InternalError, fragment::Fragment, response::AggregationResult,
};
use std::{any::Any, fmt, sync::Arc};

///
/// ErasedAssistant
///
/// Object-safe view of an [`Assistant`] whose output is boxed.
///

trait ErasedAssistant: Send + Sync {
    fn name(&self) -> &str;

    fn build_fragment(&self) -> Result<Fragment, InternalError>;

    fn collect_boxed(&self, raw: &AggregationResult) -> Result<Box<dyn Any + Send>, InternalError>;
}

struct Erased<A>(A);

impl<A: Assistant> ErasedAssistant for Erased<A> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn build_fragment(&self) -> Result<Fragment, InternalError> {
        self.0.build_fragment()
    }

    fn collect_boxed(&self, raw: &AggregationResult) -> Result<Box<dyn Any + Send>, InternalError> {
        let value = self.0.collect(raw)?;

        Ok(Box::new(value))
    }
}

///
/// Child
///
/// Shared handle to a child node of any kind. Children of one parent may
/// produce different output types; their values meet again in the
/// parent's row context.
///

#[derive(Clone)]
pub struct Child {
    inner: Arc<dyn ErasedAssistant>,
}

impl Child {
    pub fn new<A>(assistant: A) -> Self
    where
        A: Assistant + 'static,
    {
        Self {
            inner: Arc::new(Erased(assistant)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn build_fragment(&self) -> Result<Fragment, InternalError> {
        self.inner.build_fragment()
    }

    pub(crate) fn collect_boxed(
        &self,
        raw: &AggregationResult,
    ) -> Result<Box<dyn Any + Send>, InternalError> {
        self.inner.collect_boxed(raw)
    }
}

impl<A> From<A> for Child
where
    A: Assistant + 'static,
{
    fn from(assistant: A) -> Self {
        Self::new(assistant)
    }
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Child").field(&self.name()).finish()
    }
}
