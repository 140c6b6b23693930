//! Member model for memberwise mapping.
//!
//! This crate describes the members of an owner type independently of how the
//! owner stores them:
//! - **Values**: a small closed type system ([`ValueType`], [`Value`]) that the
//!   mapping layer reasons about when it resolves coercions
//! - **Members**: named, typed slots with independent read and write
//!   capability ([`Member`])
//! - **Providers**: sources of member lists for plain structs, key/value
//!   records, positional rows and hand-declared accessor pairs
//!
//! # Module Organization
//!
//! - [`types`]: declared member types and enum descriptors
//! - [`value`]: dynamically typed values
//! - [`bridge`]: [`MemberValue`]/[`MemberEnum`] bridging Rust types into values
//! - [`member`]: the [`Member`] slot
//! - [`provider`]: [`MemberProvider`], [`Reflect`] and [`MemberSet`]
//! - [`record`]: [`Record`]/[`Row`] owners and their schemas

#![deny(unsafe_code)]

pub mod bridge;
pub mod error;
pub mod member;
pub mod provider;
pub mod record;
pub mod types;
pub mod value;

// === Values ===
pub use bridge::{MemberEnum, MemberValue};
pub use types::{EnumType, ValueType};
pub use value::Value;

// === Members ===
pub use member::{Getter, Member, MemberKind, Setter, Slot, short_type_name};

// === Providers ===
pub use provider::{MemberProvider, MemberSet, Reflect, Reflected};
pub use record::{Column, Record, RecordSchema, Row, RowSchema};

// === Errors ===
pub use error::{ModelError, Operation, Result};
