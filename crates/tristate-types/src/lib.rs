//! Tri-state JSON field wrappers.
//!
//! A plain `Option<T>` collapses "the key was missing" and "the key was
//! `null`" into the same `None`. Partial updates need the difference: an
//! absent key means *leave it alone*, `null` means *clear it*, and a value
//! means *set it*. [`Field`] keeps all three apart.
//!
//! # Key Types
//!
//! - [`Field`] — Generic wrapper holding `value`, `valid` and `present`
//! - [`Presence`] — The three states as an enum, for `match`-based branching
//! - [`Bool`], [`Float64`], [`Int`], [`Text`], [`Timestamp`] — Primitive kinds
//! - [`FieldError`] — Decode and encode failures
//!
//! # Embedding in records
//!
//! ```
//! use serde::Deserialize;
//! use tristate_types::{Int, Text};
//!
//! #[derive(Deserialize)]
//! struct UserPatch {
//!     #[serde(default)]
//!     name: Text,
//!     #[serde(default)]
//!     age: Int,
//! }
//!
//! let patch: UserPatch = serde_json::from_str(r#"{"age": null}"#).unwrap();
//! assert!(patch.name.is_absent());
//! assert!(patch.age.is_null());
//! ```
//!
//! The `#[serde(default)]` attribute is required: serde hands a missing key to
//! the field as `None`, which would otherwise read as an explicit `null`.

pub mod error;
pub mod field;
pub mod kinds;
pub mod presence;

pub use error::{FieldError, FieldResult};
pub use field::{Field, NULL_LITERAL};
pub use kinds::{Bool, Float64, Int, Text, Timestamp};
pub use presence::Presence;
