//! Tri-state values for nullable columns

use std::fmt;

/// A value read from a nullable column.
///
/// Unlike a zero-value default, `Absent` keeps SQL `NULL` distinguishable
/// from an empty string, `0` or `false`, so callers have to branch on it
/// before they can reach the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nullable<T> {
   /// The column was SQL `NULL`
   Absent,
   /// The column held a value
   Present(T),
}

impl<T> Nullable<T> {
   pub fn is_present(&self) -> bool {
      matches!(self, Nullable::Present(_))
   }

   pub fn is_absent(&self) -> bool {
      matches!(self, Nullable::Absent)
   }

   pub fn as_ref(&self) -> Nullable<&T> {
      match self {
         Nullable::Present(value) => Nullable::Present(value),
         Nullable::Absent => Nullable::Absent,
      }
   }

   /// Borrow the value if present
   pub fn present(&self) -> Option<&T> {
      match self {
         Nullable::Present(value) => Some(value),
         Nullable::Absent => None,
      }
   }

   pub fn into_option(self) -> Option<T> {
      self.into()
   }

   pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Nullable<U> {
      match self {
         Nullable::Present(value) => Nullable::Present(f(value)),
         Nullable::Absent => Nullable::Absent,
      }
   }

   pub fn unwrap_or(self, default: T) -> T {
      match self {
         Nullable::Present(value) => value,
         Nullable::Absent => default,
      }
   }
}

impl<T> From<Option<T>> for Nullable<T> {
   fn from(value: Option<T>) -> Self {
      match value {
         Some(value) => Nullable::Present(value),
         None => Nullable::Absent,
      }
   }
}

impl<T> From<Nullable<T>> for Option<T> {
   fn from(value: Nullable<T>) -> Self {
      match value {
         Nullable::Present(value) => Some(value),
         Nullable::Absent => None,
      }
   }
}

impl<T: fmt::Display> fmt::Display for Nullable<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Nullable::Present(value) => value.fmt(f),
         Nullable::Absent => f.write_str("NULL"),
      }
   }
}
