//! Dynamic value model shared by the scripting layer and the LLSD codecs
//!
//! `Value` is a closed tagged union; every coercion is an exhaustive match so
//! the "no meaningful coercion" cases are visible default branches rather
//! than inherited no-ops. Coercions follow weak scripting-language
//! semantics: any numeric casts to boolean truthiness, the empty string is
//! false, `Undef` is false/zero everywhere, and only explicit text parsing
//! can fail. Formatting is culture-invariant so text round-trips are stable.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use url::Url;
use uuid::Uuid;

use crate::error::{CodecError, CodecResult, ValueError, ValueResult};
use crate::types::containers::{ValueArray, ValueMap};
use crate::types::date::{ensure, Date};
use crate::types::id::UuidExt;
use crate::types::math::{Quaternion, Vector3};

/// Primary type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Unknown,
    Undef,
    Boolean,
    Integer,
    LongInteger,
    Real,
    String,
    Uuid,
    Date,
    Uri,
    Vector,
    Rotation,
    Map,
    Array,
    BinaryData,
}

/// Secondary discriminant used by the scripting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LslType {
    Invalid,
    Integer,
    Float,
    String,
    Key,
    Vector,
    Rotation,
    List,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undef,
    Boolean(bool),
    Integer(i32),
    LongInteger(i64),
    Real(f64),
    String(String),
    Uuid(Uuid),
    Date(Date),
    Uri(Url),
    Binary(Vec<u8>),
    Vector(Vector3),
    Rotation(Quaternion),
    Array(ValueArray),
    Map(ValueMap),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Undef => ValueType::Undef,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::LongInteger(_) => ValueType::LongInteger,
            Value::Real(_) => ValueType::Real,
            Value::String(_) => ValueType::String,
            Value::Uuid(_) => ValueType::Uuid,
            Value::Date(_) => ValueType::Date,
            Value::Uri(_) => ValueType::Uri,
            Value::Binary(_) => ValueType::BinaryData,
            Value::Vector(_) => ValueType::Vector,
            Value::Rotation(_) => ValueType::Rotation,
            Value::Array(_) => ValueType::Array,
            Value::Map(_) => ValueType::Map,
        }
    }

    pub fn lsl_type(&self) -> LslType {
        match self {
            Value::Boolean(_) | Value::Integer(_) | Value::LongInteger(_) => LslType::Integer,
            Value::Real(_) => LslType::Float,
            Value::String(_) | Value::Uri(_) => LslType::String,
            Value::Uuid(_) => LslType::Key,
            Value::Vector(_) => LslType::Vector,
            Value::Rotation(_) => LslType::Rotation,
            Value::Array(_) => LslType::List,
            Value::Undef | Value::Date(_) | Value::Binary(_) | Value::Map(_) => LslType::Invalid,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.value_type() {
            ValueType::Unknown => "unknown",
            ValueType::Undef => "undef",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::LongInteger => "longinteger",
            ValueType::Real => "real",
            ValueType::String => "string",
            ValueType::Uuid => "uuid",
            ValueType::Date => "date",
            ValueType::Uri => "uri",
            ValueType::Vector => "vector",
            ValueType::Rotation => "rotation",
            ValueType::Map => "map",
            ValueType::Array => "array",
            ValueType::BinaryData => "binary",
        }
    }

    /// Scripting truthiness. Never fails.
    pub fn as_boolean(&self) -> bool {
        match self {
            Value::Undef => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::LongInteger(i) => *i != 0,
            Value::Real(r) => *r != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Uuid(u) => !u.is_nil(),
            Value::Date(d) => d.as_unix_time() != 0,
            Value::Uri(_) => true,
            Value::Binary(b) => !b.is_empty(),
            Value::Vector(v) => v.length_squared() != 0.0,
            Value::Rotation(q) => *q != Quaternion::IDENTITY,
            Value::Array(a) => !a.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// Integer coercion. Only text parsing can fail; every no-mapping pair
    /// yields zero.
    pub fn as_integer(&self) -> ValueResult<i32> {
        match self {
            Value::Boolean(b) => Ok(*b as i32),
            Value::Integer(i) => Ok(*i),
            Value::LongInteger(i) => Ok(*i as i32),
            Value::Real(r) => Ok(*r as i32),
            Value::String(s) => parse_number(s, "integer"),
            Value::Date(d) => Ok(d.as_unix_time() as i32),
            // No meaningful integer mapping.
            Value::Undef
            | Value::Uuid(_)
            | Value::Uri(_)
            | Value::Binary(_)
            | Value::Vector(_)
            | Value::Rotation(_)
            | Value::Array(_)
            | Value::Map(_) => Ok(0),
        }
    }

    pub fn as_int(&self) -> ValueResult<i32> {
        self.as_integer()
    }

    pub fn as_uint(&self) -> ValueResult<u32> {
        match self {
            Value::Boolean(b) => Ok(*b as u32),
            Value::Integer(i) => Ok(*i as u32),
            Value::LongInteger(i) => Ok(*i as u32),
            Value::Real(r) => Ok(*r as u32),
            Value::String(s) => parse_number(s, "uint"),
            Value::Date(d) => Ok(d.as_unix_time() as u32),
            _ => Ok(0),
        }
    }

    pub fn as_long(&self) -> ValueResult<i64> {
        match self {
            Value::Boolean(b) => Ok(*b as i64),
            Value::Integer(i) => Ok(*i as i64),
            Value::LongInteger(i) => Ok(*i),
            Value::Real(r) => Ok(*r as i64),
            Value::String(s) => parse_number(s, "long"),
            Value::Date(d) => Ok(d.as_unix_time()),
            _ => Ok(0),
        }
    }

    pub fn as_ulong(&self) -> ValueResult<u64> {
        match self {
            Value::Boolean(b) => Ok(*b as u64),
            Value::Integer(i) => Ok(*i as u64),
            Value::LongInteger(i) => Ok(*i as u64),
            Value::Real(r) => Ok(*r as u64),
            Value::String(s) => parse_number(s, "ulong"),
            Value::Date(d) => Ok(d.as_unix_time() as u64),
            _ => Ok(0),
        }
    }

    pub fn as_real(&self) -> ValueResult<f64> {
        match self {
            Value::Boolean(b) => Ok(*b as i32 as f64),
            Value::Integer(i) => Ok(*i as f64),
            Value::LongInteger(i) => Ok(*i as f64),
            Value::Real(r) => Ok(*r),
            Value::String(s) => parse_number(s, "real"),
            Value::Date(d) => Ok(d.as_unix_time() as f64),
            _ => Ok(0.0),
        }
    }

    /// Text form. Never fails; containers render empty.
    pub fn as_string(&self) -> String {
        match self {
            Value::Undef => String::new(),
            Value::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::LongInteger(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::String(s) => s.clone(),
            Value::Uuid(u) => u.to_string(),
            Value::Date(d) => d.iso8601(),
            Value::Uri(u) => u.to_string(),
            Value::Binary(b) => {
                use base64::{engine::general_purpose::STANDARD, Engine as _};
                STANDARD.encode(b)
            }
            Value::Vector(v) => v.to_string(),
            Value::Rotation(q) => q.to_string(),
            Value::Array(_) | Value::Map(_) => String::new(),
        }
    }

    /// UUID coercion; text parsing can fail, everything else without a
    /// mapping yields the nil sentinel.
    pub fn as_uuid(&self) -> ValueResult<Uuid> {
        match self {
            Value::Uuid(u) => Ok(*u),
            Value::String(s) => Uuid::parse_str(s.trim()).map_err(|_| ValueError::ParseFailed {
                target: "uuid",
                input: s.clone(),
            }),
            _ => Ok(Uuid::nil()),
        }
    }

    pub fn as_vector3(&self) -> Vector3 {
        match self {
            Value::Vector(v) => *v,
            Value::Rotation(q) => Vector3::new(q.x, q.y, q.z),
            _ => Vector3::ZERO,
        }
    }

    pub fn as_quaternion(&self) -> Quaternion {
        match self {
            Value::Rotation(q) => *q,
            _ => Quaternion::IDENTITY,
        }
    }

    /// Writes the fixed-width wire form at `pos`, returning the byte count.
    /// Variable-width variants have no fixed form and fail.
    pub fn write_scalar(&self, buf: &mut [u8], pos: usize) -> CodecResult<usize> {
        match self {
            Value::Boolean(b) => {
                ensure(buf.len(), pos, 1)?;
                buf[pos] = *b as u8;
                Ok(1)
            }
            Value::Integer(i) => {
                ensure(buf.len(), pos, 4)?;
                LittleEndian::write_i32(&mut buf[pos..], *i);
                Ok(4)
            }
            Value::LongInteger(i) => {
                ensure(buf.len(), pos, 8)?;
                LittleEndian::write_i64(&mut buf[pos..], *i);
                Ok(8)
            }
            Value::Real(r) => {
                ensure(buf.len(), pos, 8)?;
                LittleEndian::write_f64(&mut buf[pos..], *r);
                Ok(8)
            }
            Value::Date(d) => {
                d.to_bytes(buf, pos)?;
                Ok(8)
            }
            Value::Uuid(u) => {
                u.write_to(buf, pos)?;
                Ok(16)
            }
            Value::Vector(v) => {
                v.to_bytes(buf, pos)?;
                Ok(12)
            }
            Value::Rotation(q) => {
                q.to_bytes_normalized(buf, pos)?;
                Ok(12)
            }
            other => Err(CodecError::MessageEncode {
                reason: format!("{} has no fixed-width wire form", other.type_name()),
            }),
        }
    }

    /// Reads the fixed-width wire form of `ty` at `pos`, returning the value
    /// and the byte count consumed.
    pub fn read_scalar(ty: ValueType, buf: &[u8], pos: usize) -> CodecResult<(Value, usize)> {
        match ty {
            ValueType::Boolean => {
                ensure(buf.len(), pos, 1)?;
                Ok((Value::Boolean(buf[pos] != 0), 1))
            }
            ValueType::Integer => {
                ensure(buf.len(), pos, 4)?;
                Ok((Value::Integer(LittleEndian::read_i32(&buf[pos..])), 4))
            }
            ValueType::LongInteger => {
                ensure(buf.len(), pos, 8)?;
                Ok((Value::LongInteger(LittleEndian::read_i64(&buf[pos..])), 8))
            }
            ValueType::Real => {
                ensure(buf.len(), pos, 8)?;
                Ok((Value::Real(LittleEndian::read_f64(&buf[pos..])), 8))
            }
            ValueType::Date => Ok((Value::Date(Date::from_bytes(buf, pos)?), 8)),
            ValueType::Uuid => Ok((Value::Uuid(Uuid::read_from(buf, pos)?), 16)),
            ValueType::Vector => Ok((Value::Vector(Vector3::from_bytes(buf, pos)?), 12)),
            ValueType::Rotation => Ok((
                Value::Rotation(Quaternion::from_bytes(buf, pos, true)?),
                12,
            )),
            other => Err(CodecError::MessageDecode {
                reason: format!("{other:?} has no fixed-width wire form"),
            }),
        }
    }
}

fn parse_number<T: std::str::FromStr>(s: &str, target: &'static str) -> ValueResult<T> {
    s.trim().parse().map_err(|_| ValueError::ParseFailed {
        target,
        input: s.to_string(),
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i32)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::LongInteger(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}

impl From<Url> for Value {
    fn from(v: Url) -> Self {
        Value::Uri(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<Vector3> for Value {
    fn from(v: Vector3) -> Self {
        Value::Vector(v)
    }
}

impl From<Quaternion> for Value {
    fn from(v: Quaternion) -> Self {
        Value::Rotation(v)
    }
}

impl From<ValueArray> for Value {
    fn from(v: ValueArray) -> Self {
        Value::Array(v)
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Value::Map(v)
    }
}
