//! Fluent mapping configuration.
//!
//! A [`MappingConfiguration`] collects everything the validator needs for one
//! (source, target) pair: both member lists, ignore sets, explicit overrides
//! and the [`MappingOptions`]. Setters mutate in place and return `&mut Self`
//! so calls chain; names are resolved only when the configuration is
//! validated, which is where unknown names are reported.
//!
//! # Example
//!
//! ```
//! use memberwise_map::{MappingConfiguration, MappingMode, NameComparer};
//! use memberwise_model::reflect;
//!
//! #[derive(Default, Clone)]
//! struct Source { id: i32, value: String }
//! #[derive(Default, Clone)]
//! struct Target { id: i32, value: String }
//!
//! reflect!(Source { "ID" => id, "Value" => value });
//! reflect!(Target { "id" => id, "value" => value });
//!
//! let mut config = MappingConfiguration::<Source, Target>::reflect();
//! config
//!     .mode(MappingMode::AllTargetMembers)
//!     .name_comparer(NameComparer::IgnoreCase);
//! let mapper = config.build().unwrap();
//!
//! let source = Source { id: 5, value: "Test".to_string() };
//! let target = mapper.map_new(&source).unwrap();
//! assert_eq!((target.id, target.value.as_str()), (5, "Test"));
//! ```

use std::fmt;

use memberwise_model::{Member, MemberProvider, MemberValue, Reflect, Reflected};

use crate::cache::MappingCache;
use crate::error::Result;
use crate::expr::Expr;
use crate::mapper::Mapper;
use crate::mapping::{Binding, Delegate, MemberMapping};
use crate::options::{MappingMode, MappingOptions, NameComparer, NullableBehavior};
use crate::validator;

/// One recorded configuration call. Names stay raw until validation, which
/// replays the calls in order under the comparer active at that point.
pub(crate) enum Directive<S> {
    IgnoreSource(String),
    IgnoreTarget(String),
    Bind(String, Binding<S>),
    Reset(String),
}

impl<S> fmt::Debug for Directive<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IgnoreSource(name) => f.debug_tuple("IgnoreSource").field(name).finish(),
            Self::IgnoreTarget(name) => f.debug_tuple("IgnoreTarget").field(name).finish(),
            Self::Bind(name, binding) => f.debug_tuple("Bind").field(name).field(binding).finish(),
            Self::Reset(name) => f.debug_tuple("Reset").field(name).finish(),
        }
    }
}

/// Mapping setup for one (source, target) pair.
pub struct MappingConfiguration<S, T> {
    pub(crate) source_members: Vec<Member<S>>,
    pub(crate) target_members: Vec<Member<T>>,
    /// Ignores, overrides and resets in call order.
    pub(crate) directives: Vec<Directive<S>>,
    pub(crate) options: MappingOptions,
}

impl<S: 'static, T: 'static> MappingConfiguration<S, T> {
    pub fn new(source_members: Vec<Member<S>>, target_members: Vec<Member<T>>) -> Self {
        Self {
            source_members,
            target_members,
            directives: Vec::new(),
            options: MappingOptions::default(),
        }
    }

    pub fn from_providers(
        source: &impl MemberProvider<S>,
        target: &impl MemberProvider<T>,
    ) -> Self {
        Self::new(source.members(), target.members())
    }

    /// Configuration over the registered members of both types.
    pub fn reflect() -> Self
    where
        S: Reflect,
        T: Reflect,
    {
        Self::from_providers(&Reflected::<S>::new(), &Reflected::<T>::new())
    }

    /// Excludes a source member from auto-pairing. Overrides may still read it.
    pub fn ignore_source(&mut self, name: impl Into<String>) -> &mut Self {
        self.directives.push(Directive::IgnoreSource(name.into()));
        self
    }

    /// Excludes a target member from auto-pairing and from the completeness
    /// checks of the mapping mode. Clears any earlier override of the member.
    pub fn ignore_target(&mut self, name: impl Into<String>) -> &mut Self {
        self.directives.push(Directive::IgnoreTarget(name.into()));
        self
    }

    /// Ignores a target member and the same-named source member.
    pub fn ignore_target_cascading(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.ignore_source(name.clone());
        self.ignore_target(name)
    }

    /// Restores default eligibility of a member on both sides, dropping any
    /// earlier ignore and override.
    pub fn reset(&mut self, name: impl Into<String>) -> &mut Self {
        self.directives.push(Directive::Reset(name.into()));
        self
    }

    /// Binds a target member to a source computation, replacing any earlier
    /// override of the same member and lifting any earlier ignore on it.
    pub fn bind(&mut self, target: impl Into<String>, binding: Binding<S>) -> &mut Self {
        self.directives.push(Directive::Bind(target.into(), binding));
        self
    }

    /// Binds a target member to a named source member.
    pub fn map_member(
        &mut self,
        target: impl Into<String>,
        source: impl Into<String>,
    ) -> &mut Self {
        self.bind(target, Binding::Member(source.into()))
    }

    /// Binds a target member to an expression over source members.
    pub fn map_expr(&mut self, target: impl Into<String>, expr: Expr) -> &mut Self {
        self.bind(target, Binding::Expression(expr))
    }

    /// Binds a target member to an opaque closure over the source.
    pub fn map_with<V, F>(&mut self, target: impl Into<String>, compute: F) -> &mut Self
    where
        V: MemberValue,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.bind(target, Binding::Delegate(Delegate::typed(compute)))
    }

    /// Sets the mapping mode.
    pub fn mode(&mut self, mode: MappingMode) -> &mut Self {
        self.options.mode = mode;
        self
    }

    /// Sets the name comparer. It applies to every name given to this
    /// configuration, including names recorded before this call.
    pub fn name_comparer(&mut self, name_comparer: NameComparer) -> &mut Self {
        self.options.name_comparer = name_comparer;
        self
    }

    pub fn nullable_behavior(&mut self, nullable_behavior: NullableBehavior) -> &mut Self {
        self.options.nullable_behavior = nullable_behavior;
        self
    }

    /// Replaces all three policies at once.
    pub fn options(&mut self, options: MappingOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn current_options(&self) -> MappingOptions {
        self.options
    }

    pub fn source_members(&self) -> &[Member<S>] {
        &self.source_members
    }

    pub fn target_members(&self) -> &[Member<T>] {
        &self.target_members
    }

    /// Runs the auto-mapping validator over the current state.
    ///
    /// # Errors
    ///
    /// Any configuration error: ambiguous or unknown members, unmapped
    /// members required by the mode, or members without a viable coercion.
    pub fn validate(&self) -> Result<Vec<MemberMapping<S, T>>> {
        validator::validate(self)
    }

    /// Validates and compiles through the process-wide cache.
    pub fn build(&self) -> Result<Mapper<S, T>> {
        self.build_in(MappingCache::global())
    }

    /// Validates and compiles through `cache`.
    pub fn build_in(&self, cache: &MappingCache) -> Result<Mapper<S, T>> {
        let mappings = self.validate()?;
        Ok(Mapper::new(cache.compile(mappings)))
    }
}

impl<S, T> fmt::Debug for MappingConfiguration<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingConfiguration")
            .field("source_members", &self.source_members)
            .field("target_members", &self.target_members)
            .field("directives", &self.directives)
            .field("options", &self.options)
            .finish()
    }
}
