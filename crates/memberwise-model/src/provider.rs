//! Member providers.
//!
//! A [`MemberProvider`] yields the member list of an owner type. Plain structs
//! register their members once through [`Reflect`] (usually via
//! [`reflect!`](crate::reflect)); map- and row-like owners describe their
//! members with a schema (see [`crate::record`]); anything else can declare
//! accessor pairs by hand with a [`MemberSet`].

use std::fmt;
use std::marker::PhantomData;

use crate::member::{Getter, Member, Setter};
use crate::types::ValueType;

/// Source of the member list for owner type `O`.
pub trait MemberProvider<O> {
    /// Members in declaration order.
    fn members(&self) -> Vec<Member<O>>;
}

/// Statically registered members of a plain struct.
///
/// ```
/// use memberwise_model::{reflect, Reflect};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// reflect!(Point { "X" => x, "Y" => y });
///
/// let names: Vec<_> = Point::members().iter().map(|m| m.name().to_string()).collect();
/// assert_eq!(names, ["X", "Y"]);
/// ```
pub trait Reflect: Sized + 'static {
    /// Members in declaration order.
    fn members() -> Vec<Member<Self>>;
}

/// Implements [`Reflect`] for a struct from `"Name" => field` pairs.
///
/// Every listed field becomes a readable and writable
/// [`MemberKind::Field`](crate::MemberKind::Field) member backed by
/// [`Slot::Field`](crate::Slot::Field); the field type must implement
/// [`MemberValue`](crate::MemberValue) and `Clone`.
#[macro_export]
macro_rules! reflect {
    ($owner:ty { $($name:literal => $field:ident),* $(,)? }) => {
        impl $crate::Reflect for $owner {
            fn members() -> ::std::vec::Vec<$crate::Member<Self>> {
                ::std::vec![
                    $(
                        $crate::Member::field(
                            $name,
                            |owner: &Self| ::std::clone::Clone::clone(&owner.$field),
                            |owner: &mut Self, value| owner.$field = value,
                        )
                        .with_slot($crate::Slot::Field(::std::stringify!($field)))
                    ),*
                ]
            }
        }
    };
}

/// [`MemberProvider`] over a [`Reflect`] type.
pub struct Reflected<O>(PhantomData<fn() -> O>);

impl<O> Reflected<O> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<O> Default for Reflected<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Debug for Reflected<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reflected")
    }
}

impl<O: Reflect> MemberProvider<O> for Reflected<O> {
    fn members(&self) -> Vec<Member<O>> {
        O::members()
    }
}

/// Explicitly declared members.
pub struct MemberSet<O> {
    members: Vec<Member<O>>,
}

impl<O: 'static> MemberSet<O> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Adds a member, builder style.
    #[must_use]
    pub fn with(mut self, member: Member<O>) -> Self {
        self.members.push(member);
        self
    }

    /// Adds an accessor pair, builder style.
    #[must_use]
    pub fn accessor(
        self,
        name: impl Into<String>,
        value_type: ValueType,
        get: Option<Getter<O>>,
        set: Option<Setter<O>>,
    ) -> Self {
        self.with(Member::accessor(name, value_type, get, set))
    }

    pub fn push(&mut self, member: Member<O>) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<O: 'static> Default for MemberSet<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for MemberSet<O> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
        }
    }
}

impl<O> fmt::Debug for MemberSet<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.members).finish()
    }
}

impl<O> MemberProvider<O> for MemberSet<O> {
    fn members(&self) -> Vec<Member<O>> {
        self.members.clone()
    }
}

impl<O> From<Vec<Member<O>>> for MemberSet<O> {
    fn from(members: Vec<Member<O>>) -> Self {
        Self { members }
    }
}
