//! Primitive field kinds.
//!
//! Each kind is [`Field`] specialised to one scalar type. Timestamps travel as
//! RFC 3339 strings and are normalised to UTC on decode.

use chrono::{DateTime, Utc};

use crate::field::Field;

/// A boolean that may be null or absent.
pub type Bool = Field<bool>;

/// A 64-bit float that may be null or absent.
pub type Float64 = Field<f64>;

/// A signed 64-bit integer that may be null or absent.
pub type Int = Field<i64>;

/// A string that may be null or absent.
pub type Text = Field<String>;

/// A UTC timestamp that may be null or absent.
pub type Timestamp = Field<DateTime<Utc>>;
