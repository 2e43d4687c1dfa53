//! The generic tri-state wrapper.
//!
//! [`Field`] is decoded from the raw bytes of one JSON value, as handed over
//! by the record decoder for a single key. The record decoder only calls
//! [`Field::decode`] when the key occurs, so a wrapper that was never decoded
//! keeps `present == false`.
//!
//! # Invariants
//!
//! - `valid` implies `present`.
//! - A successful decode always sets `present`.
//! - A failed decode leaves all three fields untouched.

use std::any::type_name;
use std::{fmt, io};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::ser::{CompactFormatter, Formatter};
use tracing::{debug, warn};

use crate::error::{FieldError, FieldResult};
use crate::presence::Presence;

/// The JSON `null` literal, matched byte-for-byte by [`Field::decode`].
pub const NULL_LITERAL: &[u8] = b"null";

/// Largest magnitude below which an integral `f64` is written without a
/// fraction. Above it the shortest float form already has an exponent.
const INTEGRAL_FLOAT_LIMIT: f64 = 1e16;

/// Compact JSON output that writes integral floats as `4`, not `4.0`.
struct WireFormatter;

impl Formatter for WireFormatter {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if value.fract() == 0.0 && value.abs() < INTEGRAL_FLOAT_LIMIT {
            write!(writer, "{}", value as i64)
        } else {
            CompactFormatter.write_f64(writer, value)
        }
    }
}

fn to_wire_bytes<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(64);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, WireFormatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// A value that may be absent, explicitly null, or present.
///
/// | state    | `valid` | `present` | `value`        |
/// |----------|---------|-----------|----------------|
/// | absent   | false   | false     | `T::default()` |
/// | null     | false   | true      | `T::default()` |
/// | value    | true    | true      | decoded value  |
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Field<T> {
    /// The decoded value. Meaningless unless `valid` is set.
    pub value: T,
    /// `true` if the field was present and not `null`.
    pub valid: bool,
    /// `true` if the field appeared in the input at all.
    pub present: bool,
}

impl<T> Field<T> {
    /// A present, non-null field holding `value`.
    pub const fn new(value: T) -> Self {
        Self {
            value,
            valid: true,
            present: true,
        }
    }

    /// The state of this field as a [`Presence`].
    pub fn presence(&self) -> Presence {
        match (self.present, self.valid) {
            (false, _) => Presence::Absent,
            (true, false) => Presence::Null,
            (true, true) => Presence::Value,
        }
    }

    /// Returns `true` if the field was never decoded.
    pub fn is_absent(&self) -> bool {
        !self.present
    }

    /// Returns `true` if the field was decoded from an explicit `null`.
    pub fn is_null(&self) -> bool {
        self.present && !self.valid
    }

    /// Returns `true` if the field holds a concrete value.
    pub fn is_valid(&self) -> bool {
        self.present && self.valid
    }

    pub fn get(&self) -> Option<&T> {
        self.is_valid().then_some(&self.value)
    }

    pub fn into_option(self) -> Option<T> {
        if self.is_valid() {
            Some(self.value)
        } else {
            None
        }
    }
}

impl<T: Default> Field<T> {
    /// A field that never appeared in the input. Same as `Default`.
    pub fn absent() -> Self {
        Self::default()
    }

    /// A field that appeared as an explicit `null`.
    pub fn null() -> Self {
        Self {
            value: T::default(),
            valid: false,
            present: true,
        }
    }
}

impl<T: DeserializeOwned + Default> Field<T> {
    /// Decode the raw bytes of one JSON value into this field.
    ///
    /// `null` (exactly those four bytes) yields the null state without
    /// touching the decoder. Anything else is decoded as `Option<T>`, so a
    /// whitespace-padded `null` is still the null state even when `T` itself
    /// accepts `null`. On error the previous state is kept.
    pub fn decode(&mut self, raw: &[u8]) -> FieldResult<()> {
        if raw == NULL_LITERAL {
            *self = Self::null();
            return Ok(());
        }
        let expected = type_name::<T>();
        if raw.is_empty() {
            debug!(expected, "no bytes to decode");
            return Err(FieldError::Empty { expected });
        }
        let value = serde_json::from_slice::<Option<T>>(raw).map_err(|source| {
            debug!(expected, error = %source, "field decode failed");
            FieldError::Decode { expected, source }
        })?;
        *self = Self::from(value);
        Ok(())
    }
}

impl<T: Serialize> Field<T> {
    /// Encode this field, surfacing serializer failures of `T`.
    pub fn try_encode(&self) -> FieldResult<Vec<u8>> {
        if !self.is_valid() {
            return Ok(NULL_LITERAL.to_vec());
        }
        to_wire_bytes(&self.value).map_err(|source| FieldError::Encode {
            kind: type_name::<T>(),
            source,
        })
    }

    /// Encode this field as JSON bytes.
    ///
    /// Absent and null fields both encode to `null`. If `T` itself cannot be
    /// serialized the failure is logged and `null` is emitted; this never
    /// happens for the primitive kinds.
    pub fn encode(&self) -> Vec<u8> {
        self.try_encode().unwrap_or_else(|err| {
            warn!(error = %err, "field encode failed, emitting null");
            NULL_LITERAL.to_vec()
        })
    }
}

impl<T: Default> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::new(value),
            None => Self::null(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.presence() {
            Presence::Absent => f.write_str("Field::Absent"),
            Presence::Null => f.write_str("Field::Null"),
            Presence::Value => f.debug_tuple("Field").field(&self.value).finish(),
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_valid() {
            serializer.serialize_some(&self.value)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}
