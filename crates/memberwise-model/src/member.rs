//! Named, typed member slots.
//!
//! A [`Member`] is one slot of an owner type that may be readable, writable
//! or both. Three backing strategies exist, distinguished by [`MemberKind`]:
//!
//! - **Field**: a typed accessor over a plain struct field, registered through
//!   [`Reflect`](crate::Reflect).
//! - **Accessor**: explicit getter/setter delegates, used for map- and
//!   row-like owners whose members are only known at runtime.
//! - **Computed**: a read-only value derived from the owner.
//!
//! The mapping layer only ever talks to the [`Member`] surface and never
//! branches on the backing strategy.
//!
//! Every member also carries a [`Slot`] naming the storage it reads and
//! writes. Members built from hand-written closures are identified by the
//! closures themselves, so two members only compare equal when they behave
//! the same.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::bridge::MemberValue;
use crate::error::{ModelError, Operation, Result};
use crate::types::ValueType;
use crate::value::Value;

/// Type-erased read delegate.
pub type Getter<O> = Arc<dyn Fn(&O) -> Result<Value> + Send + Sync>;

/// Type-erased write delegate.
pub type Setter<O> = Arc<dyn Fn(&mut O, Value) -> Result<()> + Send + Sync>;

/// Backing strategy of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Typed struct field.
    Field,
    /// Explicit getter/setter delegates.
    Accessor,
    /// Read-only derived value.
    Computed,
}

/// Storage a member reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// A struct field, by its Rust name.
    Field(&'static str),
    /// A key of a key/value owner.
    Key(String),
    /// A positional cell.
    Index(usize),
    /// Hand-written delegates, by the addresses of their getter and setter
    /// (0 when absent).
    Delegates(usize, usize),
}

impl Slot {
    fn of_delegates<O>(getter: Option<&Getter<O>>, setter: Option<&Setter<O>>) -> Self {
        Self::Delegates(
            getter.map_or(0, |get| Arc::as_ptr(get).cast::<()>().addr()),
            setter.map_or(0, |set| Arc::as_ptr(set).cast::<()>().addr()),
        )
    }
}

/// A named, typed slot on owner type `O`.
///
/// Equality and hashing cover kind, name, value type, capabilities and the
/// backing [`Slot`]. Clones of one member are equal; members built from
/// distinct closures are not, unless they were given the same slot.
pub struct Member<O> {
    owner: Cow<'static, str>,
    name: String,
    value_type: ValueType,
    kind: MemberKind,
    slot: Slot,
    getter: Option<Getter<O>>,
    setter: Option<Setter<O>>,
}

fn getter<O, F>(f: F) -> Getter<O>
where
    F: Fn(&O) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn setter<O, F>(f: F) -> Setter<O>
where
    F: Fn(&mut O, Value) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

impl<O: 'static> Member<O> {
    /// A readable and writable struct field.
    pub fn field<V, G, S>(name: impl Into<String>, get: G, set: S) -> Self
    where
        V: MemberValue,
        G: Fn(&O) -> V + Send + Sync + 'static,
        S: Fn(&mut O, V) + Send + Sync + 'static,
    {
        Self::build(
            name.into(),
            V::value_type(),
            MemberKind::Field,
            Some(getter(move |owner: &O| Ok(get(owner).into_value()))),
            Some(setter(move |owner: &mut O, value| {
                set(owner, V::from_value(value)?);
                Ok(())
            })),
        )
    }

    /// A struct field that can only be read.
    pub fn read_only<V, G>(name: impl Into<String>, get: G) -> Self
    where
        V: MemberValue,
        G: Fn(&O) -> V + Send + Sync + 'static,
    {
        Self::build(
            name.into(),
            V::value_type(),
            MemberKind::Field,
            Some(getter(move |owner: &O| Ok(get(owner).into_value()))),
            None,
        )
    }

    /// A struct field that can only be written.
    pub fn write_only<V, S>(name: impl Into<String>, set: S) -> Self
    where
        V: MemberValue,
        S: Fn(&mut O, V) + Send + Sync + 'static,
    {
        Self::build(
            name.into(),
            V::value_type(),
            MemberKind::Field,
            None,
            Some(setter(move |owner: &mut O, value| {
                set(owner, V::from_value(value)?);
                Ok(())
            })),
        )
    }

    /// A member backed by explicit, untyped delegates.
    ///
    /// The delegates are trusted to produce and accept values conforming to
    /// `value_type`.
    pub fn accessor(
        name: impl Into<String>,
        value_type: ValueType,
        get: Option<Getter<O>>,
        set: Option<Setter<O>>,
    ) -> Self {
        Self::build(name.into(), value_type, MemberKind::Accessor, get, set)
    }

    /// A read-only member computed from the owner.
    pub fn computed<V, G>(name: impl Into<String>, compute: G) -> Self
    where
        V: MemberValue,
        G: Fn(&O) -> V + Send + Sync + 'static,
    {
        Self::build(
            name.into(),
            V::value_type(),
            MemberKind::Computed,
            Some(getter(move |owner: &O| Ok(compute(owner).into_value()))),
            None,
        )
    }

    fn build(
        name: String,
        value_type: ValueType,
        kind: MemberKind,
        getter: Option<Getter<O>>,
        setter: Option<Setter<O>>,
    ) -> Self {
        Self {
            owner: Cow::Borrowed(type_name::<O>()),
            name,
            value_type,
            kind,
            slot: Slot::of_delegates(getter.as_ref(), setter.as_ref()),
            getter,
            setter,
        }
    }

    /// Replaces the owner label used in diagnostics.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<Cow<'static, str>>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Declares the storage behind the delegates.
    ///
    /// Only name a slot the delegates really read and write: members with
    /// equal slots and declarations are treated as interchangeable.
    #[must_use]
    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slot = slot;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    /// Reads the member from `owner`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnsupportedOperation`] for write-only members, or any
    /// error raised by the backing delegate.
    pub fn read(&self, owner: &O) -> Result<Value> {
        match &self.getter {
            Some(get) => get(owner),
            None => Err(self.unsupported(Operation::Read)),
        }
    }

    /// Writes `value` into the member on `owner`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnsupportedOperation`] for read-only members, or a
    /// conversion error when `value` does not fit the declared type.
    pub fn write(&self, owner: &mut O, value: Value) -> Result<()> {
        match &self.setter {
            Some(set) => set(owner, value),
            None => Err(self.unsupported(Operation::Write)),
        }
    }

    /// The error a missing capability produces.
    pub fn unsupported(&self, operation: Operation) -> ModelError {
        ModelError::UnsupportedOperation {
            owner: self.owner.to_string(),
            member: self.name.clone(),
            operation,
        }
    }
}

impl<O> Clone for Member<O> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            name: self.name.clone(),
            value_type: self.value_type.clone(),
            kind: self.kind,
            slot: self.slot.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<O> PartialEq for Member<O> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.value_type == other.value_type
            && self.slot == other.slot
            && self.getter.is_some() == other.getter.is_some()
            && self.setter.is_some() == other.setter.is_some()
    }
}

impl<O> Eq for Member<O> {}

impl<O> Hash for Member<O> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.name.hash(state);
        self.value_type.hash(state);
        self.slot.hash(state);
        self.getter.is_some().hash(state);
        self.setter.is_some().hash(state);
    }
}

impl<O> fmt::Debug for Member<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("kind", &self.kind)
            .field("slot", &self.slot)
            .field("can_read", &self.getter.is_some())
            .field("can_write", &self.setter.is_some())
            .finish()
    }
}

impl<O> fmt::Display for Member<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", short_type_name(&self.owner), self.name)
    }
}

/// Last path segment of a type name, keeping generic arguments intact.
pub fn short_type_name(name: &str) -> &str {
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(idx) => &name[idx + 2..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Account {
        id: i32,
        label: String,
    }

    #[test]
    fn test_field_reads_and_writes() {
        let member = Member::field("Id", |a: &Account| a.id, |a: &mut Account, v| a.id = v);
        let mut account = Account::default();
        member.write(&mut account, Value::I32(7)).unwrap();
        assert_eq!(member.read(&account).unwrap(), Value::I32(7));
        assert_eq!(member.value_type(), &ValueType::I32);
        assert_eq!(account.id, 7);
    }

    #[test]
    fn test_read_only_rejects_write() {
        let member = Member::read_only("Label", |a: &Account| a.label.clone());
        let mut account = Account::default();
        let err = member.write(&mut account, Value::Str("x".into())).unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnsupportedOperation {
                operation: Operation::Write,
                ..
            }
        ));
        assert!(err.to_string().contains("'Label'"));
    }

    #[test]
    fn test_write_only_rejects_read() {
        let member = Member::write_only("Label", |a: &mut Account, v: String| a.label = v);
        let err = member.read(&Account::default()).unwrap_err();
        assert!(err.to_string().ends_with("does not support read"));
    }

    #[test]
    fn test_equality_follows_backing_slot() {
        let a = Member::field("Id", |a: &Account| a.id, |a: &mut Account, v| a.id = v);
        let b = Member::field("Id", |a: &Account| a.id + 1, |a: &mut Account, v| a.id = v);
        let c = Member::read_only("Id", |a: &Account| a.id);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a, c);

        let a = a.with_slot(Slot::Field("id"));
        let b = b.with_slot(Slot::Field("id"));
        assert_eq!(a, b);
        assert_eq!(a.slot(), &Slot::Field("id"));
    }

    #[test]
    fn test_read_only_members_with_different_closures_differ() {
        let plain = Member::read_only("Id", |a: &Account| a.id);
        let scaled = Member::read_only("Id", |a: &Account| a.id * 100);
        assert_ne!(plain, scaled);
        assert!(matches!(plain.slot(), Slot::Delegates(get, 0) if *get != 0));
    }

    #[test]
    fn test_display_uses_short_owner() {
        let member = Member::read_only("Id", |a: &Account| a.id);
        assert_eq!(member.to_string(), "Account.Id");
        assert_eq!(short_type_name("a::b::Pair<x::Y>"), "Pair<x::Y>");
    }
}
