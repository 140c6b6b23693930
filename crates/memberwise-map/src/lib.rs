//! Validated member-to-member mapping.
//!
//! Given the members of a source and a target type, this crate pairs them by
//! name, lets callers override or ignore individual members, checks the
//! result against a [`MappingMode`], and compiles the validated pairs into a
//! single cached transformation.
//!
//! - **Configuration**: [`MappingConfiguration`] with fluent ignores and
//!   overrides
//! - **Validation**: deterministic auto-pairing with completeness checks
//! - **Coercion**: per-pair conversion chosen once at validation time
//! - **Compilation**: lazily built, shared transformations in a
//!   [`MappingCache`]
//!
//! # Module Organization
//!
//! - [`options`]: mapping mode, name comparison and nullable policy
//! - [`coercion`]: the conversion matrix between value types
//! - [`expr`]: expressions over source members
//! - [`mapping`]: bindings, source computations and [`MemberMapping`]
//! - [`config`]: [`MappingConfiguration`]
//! - [`compiler`]: [`CompiledMapping`] and the two-phase transformation
//! - [`cache`]: [`MappingCache`]
//! - [`mapper`]: [`Mapper`] and the default-mapping helpers
//! - [`error`]: [`MapError`]

#![deny(unsafe_code)]

pub mod cache;
pub mod coercion;
pub mod compiler;
pub mod config;
pub mod error;
pub mod expr;
pub mod mapper;
pub mod mapping;
pub mod options;
mod validator;

// === Configuration ===
pub use config::MappingConfiguration;
pub use options::{MappingMode, MappingOptions, NameComparer, NullableBehavior};

// === Mappings ===
pub use coercion::{CoerceFn, Coercion, CoercionFailure};
pub use expr::{Expr, Function, SourceExpr, SourceFn};
pub use mapping::{Binding, Delegate, MemberMapping, SourceComputation};

// === Compilation ===
pub use cache::MappingCache;
pub use compiler::{CompiledMapping, Transform, compile};
pub use mapper::{Mapper, default_mapper, map_default, shallow_clone};

// === Errors ===
pub use error::{MapError, Result};
