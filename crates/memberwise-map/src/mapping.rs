//! Validated member-to-member bindings.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use memberwise_model::{Member, MemberValue, Operation, Value, ValueType, short_type_name};

use crate::coercion::{CoerceFn, Coercion, CoercionFailure};
use crate::error::{MapError, Result};
use crate::expr::{Expr, SourceExpr, SourceFn};
use crate::options::NullableBehavior;

/// Opaque caller-supplied computation over the source.
///
/// Delegates declare their output type but read nothing statically, so the
/// validator never treats a source member as consumed by one.
pub struct Delegate<S> {
    output: ValueType,
    compute: SourceFn<S>,
}

impl<S: 'static> Delegate<S> {
    /// An untyped delegate producing values of `output`.
    pub fn new<F>(output: ValueType, compute: F) -> Self
    where
        F: Fn(&S) -> memberwise_model::Result<Value> + Send + Sync + 'static,
    {
        Self {
            output,
            compute: Arc::new(compute),
        }
    }

    /// A delegate whose output type follows from its return type.
    pub fn typed<V, F>(compute: F) -> Self
    where
        V: MemberValue,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        Self {
            output: V::value_type(),
            compute: Arc::new(move |source: &S| Ok(compute(source).into_value())),
        }
    }

    pub fn output(&self) -> &ValueType {
        &self.output
    }
}

impl<S> Clone for Delegate<S> {
    fn clone(&self) -> Self {
        Self {
            output: self.output.clone(),
            compute: Arc::clone(&self.compute),
        }
    }
}

impl<S> PartialEq for Delegate<S> {
    fn eq(&self, other: &Self) -> bool {
        self.output == other.output
            && std::ptr::addr_eq(Arc::as_ptr(&self.compute), Arc::as_ptr(&other.compute))
    }
}

impl<S> Eq for Delegate<S> {}

impl<S> Hash for Delegate<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.output.hash(state);
        Arc::as_ptr(&self.compute).cast::<()>().hash(state);
    }
}

impl<S> fmt::Debug for Delegate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Unbound source side of an explicit override.
pub enum Binding<S> {
    /// A source member, by name.
    Member(String),
    /// An inspectable expression over source members.
    Expression(Expr),
    /// An opaque computation.
    Delegate(Delegate<S>),
}

impl<S> Binding<S> {
    /// Source member names the binding reads statically.
    pub fn reads(&self) -> Vec<&str> {
        match self {
            Self::Member(name) => vec![name.as_str()],
            Self::Expression(expr) => expr.reads(),
            Self::Delegate(_) => Vec::new(),
        }
    }
}

impl<S> Clone for Binding<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Member(name) => Self::Member(name.clone()),
            Self::Expression(expr) => Self::Expression(expr.clone()),
            Self::Delegate(delegate) => Self::Delegate(delegate.clone()),
        }
    }
}

impl<S> fmt::Debug for Binding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(name) => f.debug_tuple("Member").field(name).finish(),
            Self::Expression(expr) => f.debug_tuple("Expression").field(expr).finish(),
            Self::Delegate(delegate) => f.debug_tuple("Delegate").field(delegate).finish(),
        }
    }
}

/// Bound source side of a [`MemberMapping`].
pub enum SourceComputation<S> {
    Member(Member<S>),
    Expression(SourceExpr<S>),
    Delegate(Delegate<S>),
}

impl<S: 'static> SourceComputation<S> {
    pub fn value_type(&self) -> &ValueType {
        match self {
            Self::Member(member) => member.value_type(),
            Self::Expression(expr) => expr.value_type(),
            Self::Delegate(delegate) => delegate.output(),
        }
    }

    /// Source members read statically.
    pub fn reads(&self) -> Vec<&Member<S>> {
        match self {
            Self::Member(member) => vec![member],
            Self::Expression(expr) => expr.members(),
            Self::Delegate(_) => Vec::new(),
        }
    }

    fn compile(&self) -> SourceFn<S> {
        match self {
            Self::Member(member) => {
                let member = member.clone();
                Arc::new(move |source: &S| member.read(source))
            }
            Self::Expression(expr) => expr.compile(),
            Self::Delegate(delegate) => Arc::clone(&delegate.compute),
        }
    }
}

impl<S> Clone for SourceComputation<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Member(member) => Self::Member(member.clone()),
            Self::Expression(expr) => Self::Expression(expr.clone()),
            Self::Delegate(delegate) => Self::Delegate(delegate.clone()),
        }
    }
}

impl<S> PartialEq for SourceComputation<S> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Member(a), Self::Member(b)) => a == b,
            (Self::Expression(a), Self::Expression(b)) => a == b,
            (Self::Delegate(a), Self::Delegate(b)) => a == b,
            _ => false,
        }
    }
}

impl<S> Eq for SourceComputation<S> {}

impl<S> Hash for SourceComputation<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Member(member) => member.hash(state),
            Self::Expression(expr) => expr.hash(state),
            Self::Delegate(delegate) => delegate.hash(state),
        }
    }
}

impl<S> fmt::Display for SourceComputation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(member) => write!(f, "{member}"),
            Self::Expression(expr) => write!(f, "{expr}"),
            Self::Delegate(delegate) => write!(f, "<delegate {}>", delegate.output),
        }
    }
}

/// One validated binding from a source computation to a target member.
///
/// The coercion between the two is resolved when the mapping is built and
/// never changes afterwards. Equality and hashing are structural, so equal
/// mapping lists built from independent configurations share one compiled
/// transformation.
pub struct MemberMapping<S, T> {
    source: SourceComputation<S>,
    target: Member<T>,
    coercion: Coercion,
}

impl<S: 'static, T: 'static> MemberMapping<S, T> {
    /// Binds `source` to `target`.
    ///
    /// # Errors
    ///
    /// - [`MapError::Model`] with `UnsupportedOperation` when the target is
    ///   not writable or a source member read by the computation is not
    ///   readable
    /// - [`MapError::IncompatibleMemberTypes`] when no coercion exists
    /// - [`MapError::NullableCoercion`] when `behavior` forbids the pairing
    pub fn new(
        source: SourceComputation<S>,
        target: Member<T>,
        behavior: NullableBehavior,
    ) -> Result<Self> {
        if !target.can_write() {
            return Err(target.unsupported(Operation::Write).into());
        }
        if let Some(unreadable) = source.reads().into_iter().find(|m| !m.can_read()) {
            return Err(unreadable.unsupported(Operation::Read).into());
        }

        let coercion = Coercion::resolve(source.value_type(), target.value_type(), behavior)
            .map_err(|failure| match failure {
                CoercionFailure::Incompatible => MapError::IncompatibleMemberTypes {
                    source_owner: source_owner(&source),
                    source_member: source_label(&source),
                    source_type: source.value_type().clone(),
                    target_owner: short_type_name(target.owner()).to_string(),
                    target_member: target.name().to_string(),
                    target_type: target.value_type().clone(),
                },
                CoercionFailure::NullableDisallowed => MapError::NullableCoercion {
                    owner: short_type_name(target.owner()).to_string(),
                    member: target.name().to_string(),
                    source_type: source.value_type().clone(),
                },
            })?;

        Ok(Self {
            source,
            target,
            coercion,
        })
    }

    /// Binds a source member to a same-shaped target member.
    pub fn between(
        source: Member<S>,
        target: Member<T>,
        behavior: NullableBehavior,
    ) -> Result<Self> {
        Self::new(SourceComputation::Member(source), target, behavior)
    }

    pub fn source(&self) -> &SourceComputation<S> {
        &self.source
    }

    pub fn target(&self) -> &Member<T> {
        &self.target
    }

    pub fn coercion(&self) -> &Coercion {
        &self.coercion
    }

    /// Read-and-coerce function for this mapping.
    pub(crate) fn compile_read(&self) -> SourceFn<S> {
        let read = self.source.compile();
        let coerce: CoerceFn = self.coercion.compile();
        if self.coercion.is_identity() {
            return read;
        }
        Arc::new(move |source: &S| coerce(read(source)?))
    }
}

/// Owner label of a source computation: the member owner for member reads,
/// else the source type name.
fn source_owner<S: 'static>(source: &SourceComputation<S>) -> String {
    match source {
        SourceComputation::Member(member) => short_type_name(member.owner()).to_string(),
        _ => short_type_name(std::any::type_name::<S>()).to_string(),
    }
}

fn source_label<S: 'static>(source: &SourceComputation<S>) -> String {
    match source {
        SourceComputation::Member(member) => member.name().to_string(),
        other => other.to_string(),
    }
}

impl<S, T> Clone for MemberMapping<S, T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            target: self.target.clone(),
            coercion: self.coercion.clone(),
        }
    }
}

impl<S, T> PartialEq for MemberMapping<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.source == other.source
            && self.coercion == other.coercion
    }
}

impl<S, T> Eq for MemberMapping<S, T> {}

impl<S, T> Hash for MemberMapping<S, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.source.hash(state);
        self.coercion.hash(state);
    }
}

impl<S, T> fmt::Debug for MemberMapping<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberMapping")
            .field("source", &self.source.to_string())
            .field("target", &self.target)
            .field("coercion", &self.coercion)
            .finish()
    }
}

impl<S, T> fmt::Display for MemberMapping<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)?;
        if !self.coercion.is_identity() {
            write!(f, " [{}]", self.coercion)?;
        }
        Ok(())
    }
}
