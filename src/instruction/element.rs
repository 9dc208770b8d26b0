// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-step value schema and single values.
//!
//! An [`ElementType`] is either one scalar channel or a record of named
//! scalar channels. The number of channels is the instruction width.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// Primitive type of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ScalarType {
    /// Short lowercase name, matching the Rust primitive.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
        }
    }

    /// Whether values of this type can be non-finite.
    pub fn is_float(&self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named channel inside a record element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub scalar_type: ScalarType,
}

impl Field {
    pub fn new(name: impl Into<String>, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar_type,
        }
    }
}

/// Schema of the value emitted at every time step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// One unnamed channel.
    Scalar(ScalarType),
    /// One or more named channels, in order.
    Record(Vec<Field>),
}

impl ElementType {
    /// Build a record type, rejecting empty and duplicated field lists.
    pub fn record(fields: Vec<Field>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::ElementTypeMismatch(
                "record must have at least one field".into(),
            ));
        }
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(Error::ElementTypeMismatch(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
        }
        Ok(ElementType::Record(fields))
    }

    /// Number of channels.
    pub fn width(&self) -> usize {
        match self {
            ElementType::Scalar(_) => 1,
            ElementType::Record(fields) => fields.len(),
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, ElementType::Record(_))
    }

    /// Scalar type of every channel, in storage order.
    pub fn scalar_types(&self) -> Vec<ScalarType> {
        match self {
            ElementType::Scalar(ty) => vec![*ty],
            ElementType::Record(fields) => fields.iter().map(|f| f.scalar_type).collect(),
        }
    }

    /// Position and definition of a named field.
    pub fn field(&self, name: &str) -> Option<(usize, &Field)> {
        match self {
            ElementType::Scalar(_) => None,
            ElementType::Record(fields) => fields.iter().enumerate().find(|(_, f)| f.name == name),
        }
    }

    /// Channels in storage order; `None` marks a channel without an explicit
    /// name.
    fn channels(&self) -> Vec<(Option<&str>, ScalarType)> {
        match self {
            ElementType::Scalar(ty) => vec![(None, *ty)],
            ElementType::Record(fields) => fields
                .iter()
                .map(|f| (Some(f.name.as_str()), f.scalar_type))
                .collect(),
        }
    }

    /// Disjoint union of two schemas: `self`'s channels first.
    ///
    /// Scalar operands and fields named `f{k}` are positional: they are
    /// (re)named after their index in the merged record, so nested merges
    /// name channels the same way however they are grouped.
    pub fn merged(&self, other: &ElementType) -> Result<ElementType> {
        let fields = self
            .channels()
            .into_iter()
            .chain(other.channels())
            .enumerate()
            .map(|(index, (name, ty))| match name {
                Some(name) if !is_positional(name) => Field::new(name, ty),
                _ => Field::new(format!("f{index}"), ty),
            })
            .collect();
        ElementType::record(fields)
    }

    /// Check that `self` can be reinterpreted as `target` channel by channel.
    pub(crate) fn check_cast(&self, target: &ElementType) -> Result<()> {
        match (self, target) {
            (ElementType::Scalar(_), ElementType::Scalar(_)) => Ok(()),
            (ElementType::Record(from), ElementType::Record(to))
                if from.len() == to.len()
                    && from.iter().zip(to).all(|(a, b)| a.name == b.name) =>
            {
                Ok(())
            }
            _ => Err(Error::ElementTypeMismatch(format!(
                "cannot cast {self} to {target}"
            ))),
        }
    }
}

/// Whether `name` has the `f{k}` form given to unnamed channels.
fn is_positional(name: &str) -> bool {
    name.strip_prefix('f').is_some_and(|digits| {
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    })
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Scalar(ty) => write!(f, "{ty}"),
            ElementType::Record(fields) => {
                let inner: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{}: {}", field.name, field.scalar_type))
                    .collect();
                write!(f, "{{{}}}", inner.join(", "))
            }
        }
    }
}

impl From<ScalarType> for ElementType {
    fn from(ty: ScalarType) -> Self {
        ElementType::Scalar(ty)
    }
}

/// A single channel value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

/// Numeric `as` conversion of any scalar into a numeric primitive.
macro_rules! scalar_as {
    ($value:expr, $target:ty) => {
        match $value {
            Scalar::Bool(v) => u8::from(v) as $target,
            Scalar::U8(v) => v as $target,
            Scalar::U16(v) => v as $target,
            Scalar::U32(v) => v as $target,
            Scalar::U64(v) => v as $target,
            Scalar::I8(v) => v as $target,
            Scalar::I16(v) => v as $target,
            Scalar::I32(v) => v as $target,
            Scalar::I64(v) => v as $target,
            Scalar::F32(v) => v as $target,
            Scalar::F64(v) => v as $target,
        }
    };
}

pub(crate) use scalar_as;

impl Scalar {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Bool(_) => ScalarType::Bool,
            Scalar::U8(_) => ScalarType::U8,
            Scalar::U16(_) => ScalarType::U16,
            Scalar::U32(_) => ScalarType::U32,
            Scalar::U64(_) => ScalarType::U64,
            Scalar::I8(_) => ScalarType::I8,
            Scalar::I16(_) => ScalarType::I16,
            Scalar::I32(_) => ScalarType::I32,
            Scalar::I64(_) => ScalarType::I64,
            Scalar::F32(_) => ScalarType::F32,
            Scalar::F64(_) => ScalarType::F64,
        }
    }

    /// Truthiness: `false` and numeric zero are false.
    pub fn is_truthy(&self) -> bool {
        match *self {
            Scalar::Bool(v) => v,
            Scalar::F32(v) => v != 0.0,
            Scalar::F64(v) => v != 0.0,
            other => scalar_as!(other, i128) != 0,
        }
    }

    /// Convert with Rust `as` semantics; `bool` maps to and from 0/1.
    pub fn cast(self, ty: ScalarType) -> Scalar {
        match ty {
            ScalarType::Bool => Scalar::Bool(self.is_truthy()),
            ScalarType::U8 => Scalar::U8(scalar_as!(self, u8)),
            ScalarType::U16 => Scalar::U16(scalar_as!(self, u16)),
            ScalarType::U32 => Scalar::U32(scalar_as!(self, u32)),
            ScalarType::U64 => Scalar::U64(scalar_as!(self, u64)),
            ScalarType::I8 => Scalar::I8(scalar_as!(self, i8)),
            ScalarType::I16 => Scalar::I16(scalar_as!(self, i16)),
            ScalarType::I32 => Scalar::I32(scalar_as!(self, i32)),
            ScalarType::I64 => Scalar::I64(scalar_as!(self, i64)),
            ScalarType::F32 => Scalar::F32(scalar_as!(self, f32)),
            ScalarType::F64 => Scalar::F64(scalar_as!(self, f64)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::U8(v) => write!(f, "{v}"),
            Scalar::U16(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
        }
    }
}

/// The value of every channel at one time step.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Record(Vec<(String, Scalar)>),
}

impl Value {
    /// Value of a named channel, if this is a record.
    pub fn field(&self, name: &str) -> Option<Scalar> {
        match self {
            Value::Scalar(_) => None,
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| *v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(v) => write!(f, "{v}"),
            Value::Record(fields) => {
                let inner: Vec<String> =
                    fields.iter().map(|(name, v)| format!("{name}={v}")).collect();
                write!(f, "({})", inner.join(", "))
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(v))
                }
            }
        )*
    };
}

impl_from_primitive!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);
