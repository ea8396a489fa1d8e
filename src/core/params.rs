//! Boxed, positionally indexed parameter storage.
//!
//! States carry 0 to 4 typed parameters. Inside the engine those parameters
//! travel as a list of type-erased [`Value`]s; the typed view is recovered on
//! read, where every position is checked against the type the reader asks
//! for. The [`Params`] trait connects the two worlds: it is implemented for
//! the tuples `()`, `(A,)`, `(A, B)`, `(A, B, C)` and `(A, B, C, D)`.
//!
//! Rust has no subtyping, so assignability between a stored value and a
//! declared parameter type means one of two things: the types are identical,
//! or the declared type is [`AnyValue`], which accepts any value.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Largest number of parameters a state, mapping or trigger can carry.
pub const MAX_ARITY: usize = 4;

/// Errors raised when reading typed values out of a parameter list.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParameterError {
    #[error("Parameter {index} is missing (only {len} present)")]
    Missing { index: usize, len: usize },

    #[error("Parameter {index} has type {found}, expected {expected}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Trigger arguments {found} do not match declared arguments {expected}")]
    Arguments { expected: String, found: String },
}

/// Marker trait for types that can be carried as a parameter.
pub trait Parameter: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Parameter for T {}

/// Runtime description of a parameter type.
#[derive(Clone, Copy)]
pub struct ParamType {
    id: TypeId,
    name: &'static str,
}

impl ParamType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a value of type `other` may be stored where `self` is declared.
    pub fn accepts(&self, other: &ParamType) -> bool {
        self.id == other.id || self.id == TypeId::of::<AnyValue>()
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ParamType {}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Ordered list of parameter types.
///
/// Every state declares one; handlers, guards and mappings carry the
/// signature they were written against so the model can be checked when the
/// machine is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature(Vec<ParamType>);

impl Signature {
    /// The empty signature of a state without parameters.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Signature of a parameter tuple.
    pub fn of<P: Params>() -> Self {
        P::signature()
    }

    /// Runtime signature of a list of stored values.
    pub fn of_values(values: &[Value]) -> Self {
        Self(values.iter().map(Value::param_type).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn types(&self) -> &[ParamType] {
        &self.0
    }

    /// Whether values with signature `other` may be stored under `self`.
    pub fn accepts(&self, other: &Signature) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(declared, actual)| declared.accepts(actual))
    }

    /// Signature made of `self` followed by `tail`.
    pub fn concat(&self, tail: &Signature) -> Signature {
        let mut types = self.0.clone();
        types.extend_from_slice(&tail.0);
        Self(types)
    }

    /// The part of `self` that follows the first `len` types.
    pub fn skip(&self, len: usize) -> Signature {
        Self(self.0.iter().skip(len).copied().collect())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(ty.name)?;
        }
        f.write_str(")")
    }
}

/// A single type-erased parameter value.
///
/// Values are reference counted, so cloning a parameter list never clones the
/// underlying data.
#[derive(Clone)]
pub struct Value {
    ty: ParamType,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Value {
    /// Box a typed value. Wrapping an [`AnyValue`] yields the value it holds.
    pub fn new<T: Parameter>(value: T) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        match boxed.downcast::<AnyValue>() {
            Ok(any) => any.0,
            Err(boxed) => Self {
                ty: ParamType::of::<T>(),
                inner: Arc::from(boxed),
            },
        }
    }

    /// Runtime type of the stored value.
    pub fn param_type(&self) -> ParamType {
        self.ty
    }

    pub fn type_name(&self) -> &'static str {
        self.ty.name
    }

    pub fn is<T: 'static>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Read the value as `T`, reporting `index` on a type mismatch.
    pub fn read<T: Parameter>(&self, index: usize) -> Result<T, ParameterError> {
        if let Some(value) = self.downcast_ref::<T>() {
            return Ok(value.clone());
        }

        if TypeId::of::<T>() == TypeId::of::<AnyValue>() {
            let wrapped: Box<dyn Any> = Box::new(AnyValue(self.clone()));
            if let Ok(value) = wrapped.downcast::<T>() {
                return Ok(*value);
            }
        }

        Err(ParameterError::TypeMismatch {
            index,
            expected: type_name::<T>(),
            found: self.ty.name,
        })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.ty.name)
    }
}

/// The broadest parameter type: a state declared over `AnyValue` accepts a
/// value of any type.
///
/// # Example
///
/// ```rust
/// use parastate::core::{AnyValue, Value};
///
/// let value = Value::new(42_i32);
/// let any: AnyValue = value.read(0).unwrap();
///
/// assert!(any.is::<i32>());
/// assert_eq!(any.downcast_ref::<i32>(), Some(&42));
/// ```
#[derive(Clone, Debug)]
pub struct AnyValue(Value);

impl AnyValue {
    pub fn new<T: Parameter>(value: T) -> Self {
        Self(Value::new(value))
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

fn read_at<T: Parameter>(values: &[Value], index: usize) -> Result<T, ParameterError> {
    values
        .get(index)
        .ok_or(ParameterError::Missing {
            index,
            len: values.len(),
        })?
        .read(index)
}

/// A typed parameter tuple of arity 0 to 4.
///
/// `from_values` reads exactly the first `ARITY` positions, each checked
/// against the tuple's element type.
pub trait Params: Sized + Send + 'static {
    const ARITY: usize;

    fn signature() -> Signature;

    fn into_values(self) -> Vec<Value>;

    fn from_values(values: &[Value]) -> Result<Self, ParameterError>;
}

macro_rules! impl_params {
    ($arity:expr; $($ty:ident => $idx:tt),*) => {
        impl<$($ty: Parameter),*> Params for ($($ty,)*) {
            const ARITY: usize = $arity;

            fn signature() -> Signature {
                Signature(vec![$(ParamType::of::<$ty>()),*])
            }

            fn into_values(self) -> Vec<Value> {
                vec![$(Value::new(self.$idx)),*]
            }

            #[allow(unused_variables)]
            fn from_values(values: &[Value]) -> Result<Self, ParameterError> {
                Ok(($(read_at::<$ty>(values, $idx)?,)*))
            }
        }
    };
}

impl_params!(0;);
impl_params!(1; A => 0);
impl_params!(2; A => 0, B => 1);
impl_params!(3; A => 0, B => 1, C => 2);
impl_params!(4; A => 0, B => 1, C => 2, D => 3);

/// Appends trigger argument tuple `A` to a state's parameter tuple.
///
/// The combined tuple is what pre-mapping guards and mapping functions read
/// when a trigger carries arguments. Implemented for every pair whose combined
/// arity stays within [`MAX_ARITY`].
pub trait Concat<A: Params>: Params {
    type Output: Params;
}

macro_rules! impl_concat {
    ($([$($p:ident),*] + [$($a:ident),*]);* $(;)?) => {
        $(
            impl<$($p: Parameter,)* $($a: Parameter,)*> Concat<($($a,)*)> for ($($p,)*) {
                type Output = ($($p,)* $($a,)*);
            }
        )*
    };
}

impl_concat! {
    [] + [];
    [] + [A1];
    [] + [A1, A2];
    [] + [A1, A2, A3];
    [] + [A1, A2, A3, A4];
    [P1] + [];
    [P1] + [A1];
    [P1] + [A1, A2];
    [P1] + [A1, A2, A3];
    [P1, P2] + [];
    [P1, P2] + [A1];
    [P1, P2] + [A1, A2];
    [P1, P2, P3] + [];
    [P1, P2, P3] + [A1];
    [P1, P2, P3, P4] + [];
}

/// Parameter values of the current state.
#[derive(Clone, Debug, Default)]
pub struct ParameterStore {
    values: Vec<Value>,
}

impl ParameterStore {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn from_params<P: Params>(params: P) -> Self {
        Self::new(params.into_values())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a single value by position.
    pub fn get<T: Parameter>(&self, index: usize) -> Result<T, ParameterError> {
        read_at(&self.values, index)
    }

    /// Read the whole store as a typed tuple.
    pub fn read<P: Params>(&self) -> Result<P, ParameterError> {
        P::from_values(&self.values)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn signature(&self) -> Signature {
        Signature::of_values(&self.values)
    }

    pub(crate) fn replace(&mut self, values: Vec<Value>) {
        self.values = values;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_lists_tuple_types_in_order() {
        let signature = Signature::of::<(i32, String)>();

        assert_eq!(signature.len(), 2);
        assert_eq!(signature.types()[0], ParamType::of::<i32>());
        assert_eq!(signature.types()[1], ParamType::of::<String>());
        assert!(Signature::of::<()>().is_empty());
    }

    #[test]
    fn store_reads_typed_tuple() {
        let store = ParameterStore::from_params((42_i32, "42".to_string()));

        let (number, text): (i32, String) = store.read().unwrap();
        assert_eq!(number, 42);
        assert_eq!(text, "42");
        assert_eq!(store.get::<i32>(0).unwrap(), 42);
    }

    #[test]
    fn read_rejects_wrong_type() {
        let store = ParameterStore::from_params((42_i32,));

        let result = store.get::<String>(0);
        assert!(matches!(
            result,
            Err(ParameterError::TypeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn read_reports_missing_position() {
        let store = ParameterStore::from_params((1_u8,));

        let result = store.read::<(u8, u8)>();
        assert_eq!(result, Err(ParameterError::Missing { index: 1, len: 1 }));
    }

    #[test]
    fn any_value_accepts_every_type() {
        let declared = Signature::of::<(AnyValue,)>();

        assert!(declared.accepts(&Signature::of::<(i32,)>()));
        assert!(declared.accepts(&Signature::of::<(String,)>()));
        assert!(!Signature::of::<(i32,)>().accepts(&declared));
    }

    #[test]
    fn any_value_wraps_stored_value() {
        let store = ParameterStore::from_params(("hello".to_string(),));

        let any: AnyValue = store.get(0).unwrap();
        assert!(any.is::<String>());
        assert_eq!(any.downcast_ref::<String>().map(String::as_str), Some("hello"));
    }

    #[test]
    fn boxing_any_value_does_not_nest() {
        let value = Value::new(AnyValue::new(7_u64));

        assert!(value.is::<u64>());
        assert_eq!(value.param_type(), ParamType::of::<u64>());
    }

    #[test]
    fn signature_display_is_readable() {
        let signature = Signature::of::<(i32, bool)>();

        assert_eq!(signature.to_string(), "(i32, bool)");
        assert_eq!(Signature::empty().to_string(), "()");
    }

    #[test]
    fn concat_appends_argument_types() {
        type Input = <(i32,) as Concat<(String,)>>::Output;

        assert_eq!(
            Signature::of::<Input>(),
            Signature::of::<(i32,)>().concat(&Signature::of::<(String,)>())
        );
    }
}
