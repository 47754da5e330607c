use crate::{
    DOC_COUNT_KEY,
    error::{ContextError, InternalError},
};
use std::{
    any::{Any, type_name},
    collections::BTreeMap,
    fmt,
};

///
/// RowContext
///
/// Per-bucket values handed to a row factory: the bucket's document count
/// under [`DOC_COUNT_KEY`] plus one entry per child that produced a value.
///
/// A fresh context is built for every bucket and moved into the factory,
/// so it is never observed after the factory returns.
///

#[derive(Default)]
pub struct RowContext {
    values: BTreeMap<String, Box<dyn Any + Send>>,
}

impl RowContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with a bucket's document count.
    #[must_use]
    pub fn for_bucket(doc_count: u64) -> Self {
        let mut ctx = Self::new();
        ctx.insert(DOC_COUNT_KEY, doc_count);

        ctx
    }

    pub(crate) fn insert<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: Any + Send,
    {
        self.values.insert(key.into(), Box::new(value));
    }

    pub(crate) fn insert_boxed(&mut self, key: impl Into<String>, value: Box<dyn Any + Send>) {
        self.values.insert(key.into(), value);
    }

    /// Document count of the bucket, or 0 when the key is absent.
    #[must_use]
    pub fn doc_count(&self) -> u64 {
        self.get::<u64>(DOC_COUNT_KEY).copied().unwrap_or(0)
    }

    /// Borrow the value under `key` if present and of type `V`.
    #[must_use]
    pub fn get<V: Any>(&self, key: &str) -> Option<&V> {
        self.values.get(key).and_then(|value| value.downcast_ref())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Move the value under `key` out of the context.
    ///
    /// A value of the wrong type is left in place and reported as a
    /// mismatch.
    pub fn take<V: Any>(&mut self, key: &str) -> Result<V, InternalError> {
        let value = self.values.remove(key).ok_or_else(|| ContextError::Missing {
            key: key.to_string(),
        })?;

        match value.downcast::<V>() {
            Ok(value) => Ok(*value),
            Err(value) => {
                self.values.insert(key.to_string(), value);

                Err(ContextError::TypeMismatch {
                    key: key.to_string(),
                    expected: type_name::<V>(),
                }
                .into())
            }
        }
    }

    /// Like [`RowContext::take`], but yields `default` when `key` is absent.
    pub fn take_or<V: Any>(&mut self, key: &str, default: V) -> Result<V, InternalError> {
        if self.contains(key) {
            self.take(key)
        } else {
            Ok(default)
        }
    }
}

impl fmt::Debug for RowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowContext")
            .field("doc_count", &self.doc_count())
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Document count carried by a row context, or 0 when absent.
#[must_use]
pub fn get_doc_count(ctx: &RowContext) -> u64 {
    ctx.doc_count()
}
