//! Process-wide cache of compiled mappings.
//!
//! Compiled mappings are keyed by their (source type, target type) pair and
//! then by the structural identity of the mapping list. Two configurations
//! that validate to equal lists share one [`CompiledMapping`], so each
//! transformation is built at most once per distinct list.
//!
//! Default mappers for reflected types are cached per pair as well. A failed
//! default build is returned to the caller and not cached.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use memberwise_model::{Reflect, short_type_name};

use crate::compiler::CompiledMapping;
use crate::config::MappingConfiguration;
use crate::error::Result;
use crate::mapper::Mapper;
use crate::mapping::MemberMapping;

type PairKey = (TypeId, TypeId);

static GLOBAL: OnceLock<MappingCache> = OnceLock::new();

/// Compiled mappings for one (source, target) pair, keyed by mapping list.
struct Memo<S, T>(HashMap<Arc<[MemberMapping<S, T>]>, Arc<CompiledMapping<S, T>>>);

trait ErasedMemo: Send + Sync {
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: 'static, T: 'static> ErasedMemo for Memo<S, T> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Shared store of compiled mappings and default mappers.
#[derive(Default)]
pub struct MappingCache {
    compiled: RwLock<HashMap<PairKey, Box<dyn ErasedMemo>>>,
    defaults: RwLock<HashMap<PairKey, Box<dyn Any + Send + Sync>>>,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`MappingConfiguration::build`].
    pub fn global() -> &'static MappingCache {
        GLOBAL.get_or_init(MappingCache::new)
    }

    /// Returns the compiled mapping for `mappings`, creating it when no
    /// structurally equal list has been seen for this pair.
    pub fn compile<S: 'static, T: 'static>(
        &self,
        mappings: Vec<MemberMapping<S, T>>,
    ) -> Arc<CompiledMapping<S, T>> {
        let key = pair_key::<S, T>();
        {
            let compiled = self.compiled.read().unwrap_or_else(PoisonError::into_inner);
            let hit = compiled
                .get(&key)
                .and_then(|memo| memo.as_any().downcast_ref::<Memo<S, T>>())
                .and_then(|memo| memo.0.get(mappings.as_slice()));
            if let Some(hit) = hit {
                tracing::trace!(
                    source_type = short_type_name(type_name::<S>()),
                    target_type = short_type_name(type_name::<T>()),
                    "Compiled mapping cache hit"
                );
                return Arc::clone(hit);
            }
        }

        let mut compiled = self
            .compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let memo = compiled
            .entry(key)
            .or_insert_with(|| Box::new(Memo::<S, T>(HashMap::new())));
        let Some(memo) = memo.as_any_mut().downcast_mut::<Memo<S, T>>() else {
            return Arc::new(CompiledMapping::new(mappings));
        };
        let list: Arc<[MemberMapping<S, T>]> = mappings.into();
        let entry = memo
            .0
            .entry(Arc::clone(&list))
            .or_insert_with(|| {
                tracing::debug!(
                    source_type = short_type_name(type_name::<S>()),
                    target_type = short_type_name(type_name::<T>()),
                    mappings = list.len(),
                    "Caching new mapping list"
                );
                Arc::new(CompiledMapping::new(list))
            });
        Arc::clone(entry)
    }

    /// The default mapper between two reflected types: same-named members,
    /// default options.
    ///
    /// # Errors
    ///
    /// Whatever validating the default configuration reports. Failures are
    /// not cached, so a later call validates again.
    pub fn default_mapper<S, T>(&self) -> Result<Mapper<S, T>>
    where
        S: Reflect,
        T: Reflect,
    {
        let key = pair_key::<S, T>();
        {
            let defaults = self.defaults.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(mapper) = defaults
                .get(&key)
                .and_then(|mapper| mapper.downcast_ref::<Mapper<S, T>>())
            {
                return Ok(mapper.clone());
            }
        }

        let mapper = MappingConfiguration::<S, T>::reflect().build_in(self)?;
        let mut defaults = self
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let cached = defaults
            .entry(key)
            .or_insert_with(|| Box::new(mapper.clone()));
        Ok(cached
            .downcast_ref::<Mapper<S, T>>()
            .cloned()
            .unwrap_or(mapper))
    }

    /// Whether a default mapper for the pair has been cached.
    pub fn contains_default<S: 'static, T: 'static>(&self) -> bool {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&pair_key::<S, T>())
    }

    /// Number of distinct compiled mappings held.
    pub fn len(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|memo| memo.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached entry. Mappers already handed out keep working.
    pub fn clear(&self) {
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("Cleared mapping cache");
    }
}

impl std::fmt::Debug for MappingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingCache")
            .field("compiled", &self.len())
            .finish_non_exhaustive()
    }
}

fn pair_key<S: 'static, T: 'static>() -> PairKey {
    (TypeId::of::<S>(), TypeId::of::<T>())
}
