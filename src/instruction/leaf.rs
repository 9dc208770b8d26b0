// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Explicit per-step values.
//!
//! A [`Leaf`] is the only node that stores data. Values are kept columnar:
//! one [`Column`] per channel, all of the same length.

use std::collections::HashSet;
use std::fmt;

use super::column::{Column, Element};
use super::element::{ElementType, Field, Value};
use crate::error::{Error, Result};

/// An explicit array of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    element_type: ElementType,
    columns: Vec<Column>,
}

impl Leaf {
    /// Single-channel leaf from a vector of primitives.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if a float value is NaN or infinite.
    pub fn new<T: Element>(values: Vec<T>) -> Result<Self> {
        Self::from_column(Column::from_vec(values))
    }

    /// Single-channel leaf from an existing column.
    pub fn from_column(column: Column) -> Result<Self> {
        check_finite(&column, None)?;
        Ok(Self {
            element_type: ElementType::Scalar(column.scalar_type()),
            columns: vec![column],
        })
    }

    /// Record leaf from named columns of equal length.
    ///
    /// # Errors
    ///
    /// - `ElementTypeMismatch` if there are no fields or a name repeats
    /// - `LengthMismatch` if the columns differ in length
    /// - `InvalidValue` if a float value is NaN or infinite
    pub fn record(fields: Vec<(String, Column)>) -> Result<Self> {
        let mut names = HashSet::with_capacity(fields.len());
        let mut schema = Vec::with_capacity(fields.len());
        let mut columns = Vec::with_capacity(fields.len());
        let length = fields.first().map(|(_, c)| c.len());
        for (name, column) in fields {
            if !names.insert(name.clone()) {
                return Err(Error::ElementTypeMismatch(format!(
                    "duplicate field '{name}'"
                )));
            }
            if let Some(length) = length {
                if column.len() != length {
                    return Err(Error::LengthMismatch {
                        left: length,
                        right: column.len(),
                    });
                }
            }
            check_finite(&column, Some(&name))?;
            schema.push(Field::new(name, column.scalar_type()));
            columns.push(column);
        }
        Ok(Self {
            element_type: ElementType::record(schema)?,
            columns,
        })
    }

    /// Zero-length leaf of the given type.
    pub fn empty(element_type: &ElementType) -> Self {
        let columns = element_type
            .scalar_types()
            .into_iter()
            .map(Column::empty)
            .collect();
        Self {
            element_type: element_type.clone(),
            columns,
        }
    }

    /// Assemble without checks. Columns must match `element_type` in count,
    /// type and length.
    pub(crate) fn from_parts(element_type: ElementType, columns: Vec<Column>) -> Self {
        debug_assert_eq!(element_type.width(), columns.len());
        Self {
            element_type,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    pub fn width(&self) -> usize {
        self.element_type.width()
    }

    /// Channel buffers in storage order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Buffer of a named channel.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.element_type
            .field(name)
            .map(|(index, _)| &self.columns[index])
    }

    /// `(name, buffer)` for every record channel; empty for a scalar leaf.
    pub fn fields(&self) -> Vec<(&str, &Column)> {
        match &self.element_type {
            ElementType::Scalar(_) => Vec::new(),
            ElementType::Record(fields) => fields
                .iter()
                .map(|f| f.name.as_str())
                .zip(&self.columns)
                .collect(),
        }
    }

    /// Value at an already normalized index.
    pub(crate) fn value_at(&self, index: usize) -> Value {
        match &self.element_type {
            ElementType::Scalar(_) => Value::Scalar(self.columns[0].get(index)),
            ElementType::Record(fields) => Value::Record(
                fields
                    .iter()
                    .zip(&self.columns)
                    .map(|(f, c)| (f.name.clone(), c.get(index)))
                    .collect(),
            ),
        }
    }

    /// All values, in order.
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|i| self.value_at(i)).collect()
    }

    /// View over `[start, stop)`; bounds are already normalized.
    pub(crate) fn slice(&self, start: usize, stop: usize) -> Leaf {
        Leaf::from_parts(
            self.element_type.clone(),
            self.columns.iter().map(|c| c.slice(start, stop)).collect(),
        )
    }

    /// Values played back `count` times.
    pub(crate) fn tile(&self, count: usize) -> Leaf {
        Leaf::from_parts(
            self.element_type.clone(),
            self.columns.iter().map(|c| c.tile(count)).collect(),
        )
    }

    /// Join leaves of type `element_type` end to end.
    pub(crate) fn concat(element_type: &ElementType, parts: &[Leaf]) -> Leaf {
        let columns = element_type
            .scalar_types()
            .into_iter()
            .enumerate()
            .map(|(index, ty)| {
                let pieces: Vec<Column> = parts.iter().map(|p| p.columns[index].clone()).collect();
                Column::concat(ty, &pieces)
            })
            .collect();
        Leaf::from_parts(element_type.clone(), columns)
    }

    /// Cast channel values to `target`.
    ///
    /// # Errors
    ///
    /// - `ElementTypeMismatch` if the shapes are incompatible
    /// - `InvalidValue` if a value overflows a float target
    pub fn as_type(&self, target: &ElementType) -> Result<Leaf> {
        self.element_type.check_cast(target)?;
        let mut columns = Vec::with_capacity(self.columns.len());
        let targets = self.columns.iter().zip(target.scalar_types());
        for (index, (column, ty)) in targets.enumerate() {
            let cast = column.cast(ty);
            let name = match target {
                ElementType::Record(fields) => Some(fields[index].name.as_str()),
                ElementType::Scalar(_) => None,
            };
            check_finite(&cast, name)?;
            columns.push(cast);
        }
        Ok(Leaf::from_parts(target.clone(), columns))
    }

    /// Single-channel leaf holding one named field.
    pub fn get_field(&self, name: &str) -> Result<Leaf> {
        let (index, field) = self.element_type.field(name).ok_or_else(|| {
            Error::ElementTypeMismatch(format!(
                "no field '{name}' in {}",
                self.element_type
            ))
        })?;
        Ok(Leaf::from_parts(
            ElementType::Scalar(field.scalar_type),
            vec![self.columns[index].clone()],
        ))
    }

    /// One-field record leaf wrapping this scalar leaf.
    pub fn with_name(&self, name: &str) -> Result<Leaf> {
        match &self.element_type {
            ElementType::Scalar(ty) => Ok(Leaf::from_parts(
                ElementType::Record(vec![Field::new(name, *ty)]),
                self.columns.clone(),
            )),
            other => Err(Error::ElementTypeMismatch(format!(
                "cannot name a record instruction of type {other}"
            ))),
        }
    }

    /// Field-wise zip of two equal-length leaves.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch` if the lengths differ
    /// - `ElementTypeMismatch` if the channel names collide
    pub fn merge_channels(&self, other: &Leaf) -> Result<Leaf> {
        if self.len() != other.len() {
            return Err(Error::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        let element_type = self.element_type.merged(&other.element_type)?;
        let columns = self.columns.iter().chain(&other.columns).cloned().collect();
        Ok(Leaf::from_parts(element_type, columns))
    }

    /// Map the buffers through `f`, which must preserve the length.
    pub fn apply<F>(&self, f: F) -> Result<Leaf>
    where
        F: Fn(&Leaf) -> Result<Leaf>,
    {
        let result = f(self)?;
        if result.len() != self.len() {
            return Err(Error::LengthMismatch {
                left: self.len(),
                right: result.len(),
            });
        }
        Ok(result)
    }
}

fn check_finite(column: &Column, field: Option<&str>) -> Result<()> {
    if !column.scalar_type().is_float() {
        return Ok(());
    }
    if let Some(index) = column.first_non_finite() {
        let location = field.map_or(String::new(), |name| format!(" in field '{name}'"));
        return Err(Error::InvalidValue(format!(
            "non-finite value at index {index}{location}"
        )));
    }
    Ok(())
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values().iter().map(Value::to_string).collect();
        write!(f, "[{}]", values.join(", "))
    }
}
