// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Typed channel buffers.
//!
//! A [`Column`] holds the values of one channel as a reference-counted
//! `ndarray` buffer. Slicing shares the buffer; only [`Column::tile`] and
//! [`Column::concat`] allocate, and they allocate exactly the output.

use ndarray::{s, Array1, ArcArray1};

use super::element::{scalar_as, Scalar, ScalarType};

/// Rust primitive usable as a channel value.
pub trait Element: Copy + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    const SCALAR_TYPE: ScalarType;

    /// Convert from any scalar with `as` semantics.
    fn from_scalar(value: Scalar) -> Self;

    fn into_scalar(self) -> Scalar;

    fn into_column(array: ArcArray1<Self>) -> Column;

    /// Borrow the buffer if `column` holds this type.
    fn array_of(column: &Column) -> Option<&ArcArray1<Self>>;

    fn is_finite(self) -> bool;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident, $from:expr, $finite:expr) => {
        impl Element for $ty {
            const SCALAR_TYPE: ScalarType = ScalarType::$variant;

            fn from_scalar(value: Scalar) -> Self {
                ($from)(value)
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn into_column(array: ArcArray1<Self>) -> Column {
                Column::$variant(array)
            }

            fn array_of(column: &Column) -> Option<&ArcArray1<Self>> {
                match column {
                    Column::$variant(array) => Some(array),
                    _ => None,
                }
            }

            fn is_finite(self) -> bool {
                ($finite)(self)
            }
        }
    };
    ($ty:ty, $variant:ident) => {
        impl_element!($ty, $variant, |v: Scalar| scalar_as!(v, $ty), |_: $ty| true);
    };
}

impl_element!(bool, Bool, |v: Scalar| v.is_truthy(), |_: bool| true);
impl_element!(u8, U8);
impl_element!(u16, U16);
impl_element!(u32, U32);
impl_element!(u64, U64);
impl_element!(i8, I8);
impl_element!(i16, I16);
impl_element!(i32, I32);
impl_element!(i64, I64);
impl_element!(f32, F32, |v: Scalar| scalar_as!(v, f32), f32::is_finite);
impl_element!(f64, F64, |v: Scalar| scalar_as!(v, f64), f64::is_finite);

/// One channel's values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Bool(ArcArray1<bool>),
    U8(ArcArray1<u8>),
    U16(ArcArray1<u16>),
    U32(ArcArray1<u32>),
    U64(ArcArray1<u64>),
    I8(ArcArray1<i8>),
    I16(ArcArray1<i16>),
    I32(ArcArray1<i32>),
    I64(ArcArray1<i64>),
    F32(ArcArray1<f32>),
    F64(ArcArray1<f64>),
}

/// Evaluate `$body` with `$array` bound to the typed buffer.
macro_rules! with_column {
    ($column:expr, $array:ident => $body:expr) => {
        match $column {
            Column::Bool($array) => $body,
            Column::U8($array) => $body,
            Column::U16($array) => $body,
            Column::U32($array) => $body,
            Column::U64($array) => $body,
            Column::I8($array) => $body,
            Column::I16($array) => $body,
            Column::I32($array) => $body,
            Column::I64($array) => $body,
            Column::F32($array) => $body,
            Column::F64($array) => $body,
        }
    };
}

/// Like `with_column!`, rewrapping the result in the same variant.
macro_rules! map_column {
    ($column:expr, $array:ident => $body:expr) => {
        match $column {
            Column::Bool($array) => Column::Bool($body),
            Column::U8($array) => Column::U8($body),
            Column::U16($array) => Column::U16($body),
            Column::U32($array) => Column::U32($body),
            Column::U64($array) => Column::U64($body),
            Column::I8($array) => Column::I8($body),
            Column::I16($array) => Column::I16($body),
            Column::I32($array) => Column::I32($body),
            Column::I64($array) => Column::I64($body),
            Column::F32($array) => Column::F32($body),
            Column::F64($array) => Column::F64($body),
        }
    };
}

/// Dispatch a generic function on a runtime scalar type.
macro_rules! for_scalar_type {
    ($ty:expr, $func:ident ( $($arg:expr),* )) => {
        match $ty {
            ScalarType::Bool => Column::Bool($func::<bool>($($arg),*)),
            ScalarType::U8 => Column::U8($func::<u8>($($arg),*)),
            ScalarType::U16 => Column::U16($func::<u16>($($arg),*)),
            ScalarType::U32 => Column::U32($func::<u32>($($arg),*)),
            ScalarType::U64 => Column::U64($func::<u64>($($arg),*)),
            ScalarType::I8 => Column::I8($func::<i8>($($arg),*)),
            ScalarType::I16 => Column::I16($func::<i16>($($arg),*)),
            ScalarType::I32 => Column::I32($func::<i32>($($arg),*)),
            ScalarType::I64 => Column::I64($func::<i64>($($arg),*)),
            ScalarType::F32 => Column::F32($func::<f32>($($arg),*)),
            ScalarType::F64 => Column::F64($func::<f64>($($arg),*)),
        }
    };
}

impl Column {
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        T::into_column(Array1::from_vec(values).into_shared())
    }

    /// Zero-length column of the given type.
    pub fn empty(ty: ScalarType) -> Self {
        Column::concat(ty, &[])
    }

    pub fn len(&self) -> usize {
        with_column!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Column::Bool(_) => ScalarType::Bool,
            Column::U8(_) => ScalarType::U8,
            Column::U16(_) => ScalarType::U16,
            Column::U32(_) => ScalarType::U32,
            Column::U64(_) => ScalarType::U64,
            Column::I8(_) => ScalarType::I8,
            Column::I16(_) => ScalarType::I16,
            Column::I32(_) => ScalarType::I32,
            Column::I64(_) => ScalarType::I64,
            Column::F32(_) => ScalarType::F32,
            Column::F64(_) => ScalarType::F64,
        }
    }

    /// Value at `index`. The caller guarantees `index < len`.
    pub(crate) fn get(&self, index: usize) -> Scalar {
        with_column!(self, array => array[index].into_scalar())
    }

    /// Borrow the typed buffer.
    pub fn as_array<T: Element>(&self) -> Option<&ArcArray1<T>> {
        T::array_of(self)
    }

    /// Copy out the values, converting to `T` if needed.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        self.extend_into(&mut out);
        out
    }

    /// Index of the first non-finite value, if any.
    pub(crate) fn first_non_finite(&self) -> Option<usize> {
        with_column!(self, array => array.iter().position(|&v| !Element::is_finite(v)))
    }

    /// View over `[start, stop)` sharing this buffer.
    pub(crate) fn slice(&self, start: usize, stop: usize) -> Column {
        map_column!(self, array => array.clone().slice_move(s![start..stop]))
    }

    /// This column played back `count` times.
    pub(crate) fn tile(&self, count: usize) -> Column {
        map_column!(self, array => tile_array(array, count))
    }

    pub(crate) fn cast(&self, ty: ScalarType) -> Column {
        if self.scalar_type() == ty {
            return self.clone();
        }
        for_scalar_type!(ty, convert_array(self))
    }

    /// Join `parts` into one buffer of type `ty`, converting parts of
    /// another type.
    pub(crate) fn concat(ty: ScalarType, parts: &[Column]) -> Column {
        for_scalar_type!(ty, concat_arrays(parts))
    }

    fn extend_into<T: Element>(&self, out: &mut Vec<T>) {
        match T::array_of(self) {
            Some(array) => out.extend(array.iter().copied()),
            None => with_column!(
                self,
                array => out.extend(array.iter().map(|&v| T::from_scalar(v.into_scalar())))
            ),
        }
    }
}

fn tile_array<T: Copy>(array: &ArcArray1<T>, count: usize) -> ArcArray1<T> {
    let mut out = Vec::with_capacity(array.len() * count);
    for _ in 0..count {
        out.extend(array.iter().copied());
    }
    Array1::from_vec(out).into_shared()
}

fn convert_array<T: Element>(column: &Column) -> ArcArray1<T> {
    Array1::from_vec(column.to_vec::<T>()).into_shared()
}

fn concat_arrays<T: Element>(parts: &[Column]) -> ArcArray1<T> {
    let total = parts.iter().map(Column::len).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        part.extend_into(&mut out);
    }
    Array1::from_vec(out).into_shared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_shares_buffer() {
        let column = Column::from_vec(vec![1i32, 2, 3, 4, 5]);
        let sliced = column.slice(1, 4);
        assert_eq!(sliced.to_vec::<i32>(), vec![2, 3, 4]);
        let (Column::I32(a), Column::I32(b)) = (&column, &sliced) else {
            panic!("expected i32 columns");
        };
        assert!(std::ptr::eq(&a[1], &b[0]));
    }

    #[test]
    fn test_tile() {
        let column = Column::from_vec(vec![true, false]);
        assert_eq!(
            column.tile(3).to_vec::<bool>(),
            vec![true, false, true, false, true, false]
        );
    }

    #[test]
    fn test_tile_zero_is_empty() {
        let column = Column::from_vec(vec![1u8, 2]);
        assert!(column.tile(0).is_empty());
    }

    #[test]
    fn test_concat_converts_parts() {
        let a = Column::from_vec(vec![1u8, 2]);
        let b = Column::from_vec(vec![3i64]);
        let joined = Column::concat(ScalarType::I64, &[a, b]);
        assert_eq!(joined.scalar_type(), ScalarType::I64);
        assert_eq!(joined.to_vec::<i64>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_cast_same_type_is_shared() {
        let a = Column::from_vec(vec![0.5f64, 1.5]);
        assert_eq!(a.cast(ScalarType::F64), a);
    }

    #[test]
    fn test_cast_float_to_int() {
        let a = Column::from_vec(vec![0.5f64, 1.5, -2.7]);
        assert_eq!(a.cast(ScalarType::I16).to_vec::<i16>(), vec![0, 1, -2]);
    }

    #[test]
    fn test_first_non_finite() {
        let a = Column::from_vec(vec![0.0f32, f32::NAN]);
        assert_eq!(a.first_non_finite(), Some(1));
        let b = Column::from_vec(vec![1u32, 2]);
        assert_eq!(b.first_non_finite(), None);
    }

    #[test]
    fn test_empty_column() {
        let e = Column::empty(ScalarType::Bool);
        assert_eq!(e.len(), 0);
        assert_eq!(e.scalar_type(), ScalarType::Bool);
    }
}
