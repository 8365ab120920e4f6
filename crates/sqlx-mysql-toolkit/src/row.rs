//! Typed access to result rows

use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{Column, Decode, Row as _, Type};

use crate::{Error, Nullable, Result};

/// One row of a result set.
///
/// Columns are read in the order they were selected. Decoding failures are
/// reported as [`Error::Decode`] with the column name filled in.
pub struct Row {
   inner: MySqlRow,
}

impl Row {
   pub(crate) fn new(inner: MySqlRow) -> Self {
      Self { inner }
   }

   /// Number of columns
   pub fn len(&self) -> usize {
      self.inner.len()
   }

   pub fn is_empty(&self) -> bool {
      self.inner.is_empty()
   }

   /// Column names in select order
   pub fn column_names(&self) -> Vec<&str> {
      self.inner.columns().iter().map(|c| c.name()).collect()
   }

   /// Decode the column at `index`.
   ///
   /// A SQL `NULL` read into a non-`Option` type is a decode error; use
   /// [`get_nullable`](Self::get_nullable) for nullable columns.
   pub fn get<'r, T>(&'r self, index: usize) -> Result<T>
   where
      T: Decode<'r, MySql> + Type<MySql>,
   {
      self
         .inner
         .try_get(index)
         .map_err(|source| self.decode_error(index, source))
   }

   /// Decode a nullable column at `index` into [`Nullable`].
   pub fn get_nullable<'r, T>(&'r self, index: usize) -> Result<Nullable<T>>
   where
      T: Decode<'r, MySql> + Type<MySql>,
   {
      self.get::<Option<T>>(index).map(Nullable::from)
   }

   /// Decode the column named `column`.
   pub fn get_by_name<'r, T>(&'r self, column: &str) -> Result<T>
   where
      T: Decode<'r, MySql> + Type<MySql>,
   {
      self.inner.try_get(column).map_err(|source| Error::Decode {
         column: column.to_string(),
         source,
      })
   }

   /// Decode the nullable column named `column`.
   pub fn get_nullable_by_name<'r, T>(&'r self, column: &str) -> Result<Nullable<T>>
   where
      T: Decode<'r, MySql> + Type<MySql>,
   {
      self.get_by_name::<Option<T>>(column).map(Nullable::from)
   }

   /// The driver row, for anything not covered above
   pub fn into_inner(self) -> MySqlRow {
      self.inner
   }

   fn decode_error(&self, index: usize, source: sqlx::Error) -> Error {
      let column = self
         .inner
         .columns()
         .get(index)
         .map(|c| c.name().to_string())
         .unwrap_or_else(|| index.to_string());

      Error::Decode { column, source }
   }
}

impl std::fmt::Debug for Row {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("Row")
         .field("columns", &self.column_names())
         .finish()
   }
}
