//! Inspectable source expressions.
//!
//! An [`Expr`] computes a target value from source members. Unlike an opaque
//! closure, the tree can be inspected: [`Expr::reads`] lists the source
//! members it reads, which lets the validator treat those members as
//! consumed.
//!
//! ```
//! use memberwise_map::Expr;
//!
//! let full_name = Expr::call2(
//!     "concat",
//!     |first: String, last: String| format!("{first} {last}"),
//!     Expr::member("First"),
//!     Expr::member("Last"),
//! );
//! assert_eq!(full_name.reads(), ["First", "Last"]);
//! ```

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use memberwise_model::{Member, MemberValue, Value, ValueType, short_type_name};

use crate::coercion::{CoerceFn, Coercion, CoercionFailure};
use crate::error::{MapError, Result};
use crate::options::NullableBehavior;

type Body = Arc<dyn Fn(Vec<Value>) -> memberwise_model::Result<Value> + Send + Sync>;

/// Compiled read of a value from a source instance.
pub type SourceFn<S> = Arc<dyn Fn(&S) -> memberwise_model::Result<Value> + Send + Sync>;

/// A named callee with declared parameter and output types.
pub struct Function {
    name: String,
    params: Vec<ValueType>,
    output: ValueType,
    body: Body,
}

impl Function {
    /// An untyped callee. `body` receives one value per parameter, each
    /// already coerced to the declared parameter type.
    pub fn new<F>(
        name: impl Into<String>,
        params: Vec<ValueType>,
        output: ValueType,
        body: F,
    ) -> Self
    where
        F: Fn(Vec<Value>) -> memberwise_model::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params,
            output,
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn output(&self) -> &ValueType {
        &self.output
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

/// Expression over source members.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Reads the named source member.
    Member(String),
    /// A constant of the given type.
    Constant(Value, ValueType),
    /// Applies a function to argument expressions.
    Call(Arc<Function>, Vec<Expr>),
}

impl Expr {
    pub fn member(name: impl Into<String>) -> Self {
        Self::Member(name.into())
    }

    pub fn constant<V: MemberValue>(value: V) -> Self {
        Self::Constant(value.into_value(), V::value_type())
    }

    /// Applies a typed unary function.
    pub fn call1<A, R, F>(name: impl Into<String>, f: F, arg: Expr) -> Self
    where
        A: MemberValue,
        R: MemberValue,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let function = Function::new(name, vec![A::value_type()], R::value_type(), move |args| {
            let mut args = args.into_iter();
            let a = A::from_value(args.next().unwrap_or_default())?;
            Ok(f(a).into_value())
        });
        Self::Call(Arc::new(function), vec![arg])
    }

    /// Applies a typed binary function.
    pub fn call2<A, B, R, F>(name: impl Into<String>, f: F, left: Expr, right: Expr) -> Self
    where
        A: MemberValue,
        B: MemberValue,
        R: MemberValue,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        let params = vec![A::value_type(), B::value_type()];
        let function = Function::new(name, params, R::value_type(), move |args| {
            let mut args = args.into_iter();
            let a = A::from_value(args.next().unwrap_or_default())?;
            let b = B::from_value(args.next().unwrap_or_default())?;
            Ok(f(a, b).into_value())
        });
        Self::Call(Arc::new(function), vec![left, right])
    }

    /// Applies an untyped function to any number of arguments.
    pub fn call(function: impl Into<Arc<Function>>, args: Vec<Expr>) -> Self {
        Self::Call(function.into(), args)
    }

    /// Names of the source members read, in first-read order.
    pub fn reads(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_reads(&mut names);
        names
    }

    fn collect_reads<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Member(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::Constant(..) => {}
            Self::Call(_, args) => {
                for arg in args {
                    arg.collect_reads(names);
                }
            }
        }
    }

    /// Binds member names to source members, checking every call argument
    /// against its declared parameter type.
    pub(crate) fn bind<S: 'static>(
        &self,
        lookup: &mut dyn FnMut(&str) -> Result<Member<S>>,
    ) -> Result<SourceExpr<S>> {
        match self {
            Self::Member(name) => Ok(SourceExpr::Member(lookup(name)?)),
            Self::Constant(value, value_type) => {
                Ok(SourceExpr::Constant(value.clone(), value_type.clone()))
            }
            Self::Call(function, args) => {
                if args.len() != function.params.len() {
                    return Err(MapError::ArityMismatch {
                        function: function.name.clone(),
                        expected: function.params.len(),
                        actual: args.len(),
                    });
                }
                let mut bound = Vec::with_capacity(args.len());
                for (index, (arg, param)) in args.iter().zip(&function.params).enumerate() {
                    let arg = arg.bind(lookup)?;
                    let coercion = Coercion::resolve(
                        arg.value_type(),
                        param,
                        NullableBehavior::AssignDefaultAsIs,
                    )
                    .map_err(|_: CoercionFailure| MapError::IncompatibleMemberTypes {
                        source_owner: short_type_name(type_name::<S>()).to_string(),
                        source_member: arg.to_string(),
                        source_type: arg.value_type().clone(),
                        target_owner: function.name.clone(),
                        target_member: format!("#{index}"),
                        target_type: param.clone(),
                    })?;
                    bound.push((arg, coercion));
                }
                Ok(SourceExpr::Call {
                    function: Arc::clone(function),
                    args: bound,
                })
            }
        }
    }
}

/// An [`Expr`] bound to the members of source type `S`.
pub enum SourceExpr<S> {
    Member(Member<S>),
    Constant(Value, ValueType),
    Call {
        function: Arc<Function>,
        /// Bound arguments with the coercion into each parameter type.
        args: Vec<(SourceExpr<S>, Coercion)>,
    },
}

impl<S: 'static> SourceExpr<S> {
    /// Declared type of the produced value.
    pub fn value_type(&self) -> &ValueType {
        match self {
            Self::Member(member) => member.value_type(),
            Self::Constant(_, value_type) => value_type,
            Self::Call { function, .. } => &function.output,
        }
    }

    /// Source members read by the expression.
    pub fn members(&self) -> Vec<&Member<S>> {
        let mut members = Vec::new();
        self.collect_members(&mut members);
        members
    }

    fn collect_members<'a>(&'a self, members: &mut Vec<&'a Member<S>>) {
        match self {
            Self::Member(member) => members.push(member),
            Self::Constant(..) => {}
            Self::Call { args, .. } => {
                for (arg, _) in args {
                    arg.collect_members(members);
                }
            }
        }
    }

    /// Compiles the expression into a single read function.
    pub fn compile(&self) -> SourceFn<S> {
        match self {
            Self::Member(member) => {
                let member = member.clone();
                Arc::new(move |source: &S| member.read(source))
            }
            Self::Constant(value, _) => {
                let value = value.clone();
                Arc::new(move |_: &S| Ok(value.clone()))
            }
            Self::Call { function, args } => {
                let body = Arc::clone(&function.body);
                let args: Vec<(SourceFn<S>, CoerceFn)> = args
                    .iter()
                    .map(|(arg, coercion)| (arg.compile(), coercion.compile()))
                    .collect();
                Arc::new(move |source: &S| {
                    let mut values = Vec::with_capacity(args.len());
                    for (read, coerce) in &args {
                        values.push(coerce(read(source)?)?);
                    }
                    body(values)
                })
            }
        }
    }
}

impl<S> Clone for SourceExpr<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Member(member) => Self::Member(member.clone()),
            Self::Constant(value, value_type) => Self::Constant(value.clone(), value_type.clone()),
            Self::Call { function, args } => Self::Call {
                function: Arc::clone(function),
                args: args.clone(),
            },
        }
    }
}

impl<S> PartialEq for SourceExpr<S> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Member(a), Self::Member(b)) => a == b,
            (Self::Constant(a, a_type), Self::Constant(b, b_type)) => {
                a_type == b_type && a.identical(b)
            }
            (
                Self::Call { function, args },
                Self::Call {
                    function: other_function,
                    args: other_args,
                },
            ) => Arc::ptr_eq(function, other_function) && args == other_args,
            _ => false,
        }
    }
}

impl<S> Eq for SourceExpr<S> {}

impl<S> Hash for SourceExpr<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Member(member) => member.hash(state),
            Self::Constant(value, value_type) => {
                value.hash_identity(state);
                value_type.hash(state);
            }
            Self::Call { function, args } => {
                Arc::as_ptr(function).hash(state);
                args.hash(state);
            }
        }
    }
}

impl<S> fmt::Debug for SourceExpr<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<S> fmt::Display for SourceExpr<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(member) => write!(f, "{member}"),
            Self::Constant(Value::Str(s), _) => write!(f, "{s:?}"),
            Self::Constant(value, _) => write!(f, "{value}"),
            Self::Call { function, args } => {
                write!(f, "{}(", function.name)?;
                for (index, (arg, _)) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
