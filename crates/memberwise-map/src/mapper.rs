//! Mapping entry points.
//!
//! A [`Mapper`] is a cheap handle on a cached [`CompiledMapping`]. Cloning it
//! shares the compiled transformation.

use std::fmt;
use std::sync::Arc;

use memberwise_model::Reflect;

use crate::cache::MappingCache;
use crate::compiler::CompiledMapping;
use crate::error::{MapError, Result};
use crate::mapping::MemberMapping;

/// Applies a validated, compiled mapping from `S` into `T`.
pub struct Mapper<S, T> {
    compiled: Arc<CompiledMapping<S, T>>,
}

impl<S: 'static, T: 'static> Mapper<S, T> {
    pub(crate) fn new(compiled: Arc<CompiledMapping<S, T>>) -> Self {
        Self { compiled }
    }

    /// Copies every mapped member of `source` into `target`.
    ///
    /// # Errors
    ///
    /// [`MapError::Transform`] when a value cannot be read, converted or
    /// written. The target is left untouched when conversion fails.
    pub fn map<'t>(&self, source: &S, target: &'t mut T) -> Result<&'t mut T> {
        self.compiled.apply(source, target)?;
        Ok(target)
    }

    /// Like [`Mapper::map`] for callers holding optional references.
    ///
    /// # Errors
    ///
    /// [`MapError::ArgumentNull`] naming the absent argument, then anything
    /// [`Mapper::map`] reports.
    pub fn map_optional<'t>(
        &self,
        source: Option<&S>,
        target: Option<&'t mut T>,
    ) -> Result<&'t mut T> {
        let source = source.ok_or(MapError::ArgumentNull("source"))?;
        let target = target.ok_or(MapError::ArgumentNull("target"))?;
        self.map(source, target)
    }

    /// Maps into a fresh default target.
    pub fn map_new(&self, source: &S) -> Result<T>
    where
        T: Default,
    {
        let mut target = T::default();
        self.map(source, &mut target)?;
        Ok(target)
    }

    pub fn mappings(&self) -> &[MemberMapping<S, T>] {
        self.compiled.mappings()
    }

    pub fn compiled(&self) -> &Arc<CompiledMapping<S, T>> {
        &self.compiled
    }

    /// Whether both mappers run the same compiled transformation.
    pub fn shares_compiled(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.compiled, &other.compiled)
    }
}

impl<S, T> Clone for Mapper<S, T> {
    fn clone(&self) -> Self {
        Self {
            compiled: Arc::clone(&self.compiled),
        }
    }
}

impl<S, T> fmt::Debug for Mapper<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("compiled", &self.compiled)
            .finish()
    }
}

/// The cached default mapper between two reflected types.
pub fn default_mapper<S: Reflect, T: Reflect>() -> Result<Mapper<S, T>> {
    MappingCache::global().default_mapper()
}

/// Maps `source` into `target` with the default mapper for the pair.
pub fn map_default<'t, S: Reflect, T: Reflect>(source: &S, target: &'t mut T) -> Result<&'t mut T> {
    default_mapper::<S, T>()?.map(source, target)
}

/// A new `T` with every registered member copied from `value`.
///
/// Strings are cloned; nothing deeper than the members themselves is copied.
pub fn shallow_clone<T: Reflect + Default>(value: &T) -> Result<T> {
    default_mapper::<T, T>()?.map_new(value)
}
