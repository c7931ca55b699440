//! LLSD-Binary codec
//!
//! Marker-byte format: `!` undef, `1`/`0` boolean, `i` i32, `r` f64, `s`
//! string, `u` UUID, `d` date (f64 epoch seconds), `l` URI, `b` binary,
//! `[`/`]` array, `{`/`}` map with `k`-prefixed keys. Sizes and scalars are
//! network byte order. Vector and Rotation lower to arrays of reals, the
//! same as the XML form.

use byteorder::{BigEndian, ByteOrder};
use url::Url;
use uuid::Uuid;

use crate::error::LlsdError;
use crate::types::{Date, Value, ValueArray, ValueMap};

pub fn serialize(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(&mut out, value);
    out
}

pub fn deserialize(data: &[u8]) -> Result<Value, LlsdError> {
    let mut cursor = Cursor { data, pos: 0 };
    let value = cursor.read_value()?;
    Ok(value)
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Undef => out.push(b'!'),
        Value::Boolean(true) => out.push(b'1'),
        Value::Boolean(false) => out.push(b'0'),
        Value::Integer(i) => {
            out.push(b'i');
            out.extend_from_slice(&i.to_be_bytes());
        }
        // LLSD has no 64-bit integer; out-of-range longs degrade to reals,
        // in-range ones travel as integers.
        Value::LongInteger(i) => match i32::try_from(*i) {
            Ok(small) => {
                out.push(b'i');
                out.extend_from_slice(&small.to_be_bytes());
            }
            Err(_) => {
                out.push(b'r');
                out.extend_from_slice(&(*i as f64).to_be_bytes());
            }
        },
        Value::Real(r) => {
            out.push(b'r');
            out.extend_from_slice(&r.to_be_bytes());
        }
        Value::String(s) => {
            out.push(b's');
            write_sized(out, s.as_bytes());
        }
        Value::Uuid(u) => {
            out.push(b'u');
            out.extend_from_slice(u.as_bytes());
        }
        Value::Date(d) => {
            out.push(b'd');
            out.extend_from_slice(&(d.as_unix_time() as f64).to_be_bytes());
        }
        Value::Uri(u) => {
            out.push(b'l');
            write_sized(out, u.as_str().as_bytes());
        }
        Value::Binary(b) => {
            out.push(b'b');
            write_sized(out, b);
        }
        Value::Vector(v) => {
            write_real_array(out, &[v.x, v.y, v.z]);
        }
        Value::Rotation(q) => {
            write_real_array(out, &[q.x, q.y, q.z, q.w]);
        }
        Value::Array(arr) => {
            out.push(b'[');
            out.extend_from_slice(&(arr.len() as u32).to_be_bytes());
            for item in arr.iter() {
                write_value(out, item);
            }
            out.push(b']');
        }
        Value::Map(map) => {
            out.push(b'{');
            out.extend_from_slice(&(map.len() as u32).to_be_bytes());
            for (key, item) in map.iter() {
                out.push(b'k');
                write_sized(out, key.as_bytes());
                write_value(out, item);
            }
            out.push(b'}');
        }
    }
}

fn write_sized(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn write_real_array(out: &mut Vec<u8>, components: &[f64]) {
    out.push(b'[');
    out.extend_from_slice(&(components.len() as u32).to_be_bytes());
    for c in components {
        out.push(b'r');
        out.extend_from_slice(&c.to_be_bytes());
    }
    out.push(b']');
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], LlsdError> {
        if self.pos + n > self.data.len() {
            return Err(LlsdError::Truncated(self.pos));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_marker(&mut self) -> Result<u8, LlsdError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, LlsdError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    fn read_sized(&mut self) -> Result<&'a [u8], LlsdError> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    fn read_value(&mut self) -> Result<Value, LlsdError> {
        let marker = self.read_marker()?;
        match marker {
            b'!' => Ok(Value::Undef),
            b'1' => Ok(Value::Boolean(true)),
            b'0' => Ok(Value::Boolean(false)),
            b'i' => Ok(Value::Integer(BigEndian::read_i32(self.take(4)?))),
            b'r' => Ok(Value::Real(BigEndian::read_f64(self.take(8)?))),
            b's' => {
                let bytes = self.read_sized()?;
                Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
            }
            b'u' => {
                let bytes = self.take(16)?;
                let mut arr = [0u8; 16];
                arr.copy_from_slice(bytes);
                Ok(Value::Uuid(Uuid::from_bytes(arr)))
            }
            b'd' => {
                let secs = BigEndian::read_f64(self.take(8)?);
                Ok(Value::Date(Date::from_unix_time(secs as i64)))
            }
            b'l' => {
                let bytes = self.read_sized()?;
                let text = String::from_utf8_lossy(bytes);
                let url = Url::parse(&text).map_err(|_| LlsdError::MalformedScalar {
                    kind: "uri",
                    reason: text.into_owned(),
                })?;
                Ok(Value::Uri(url))
            }
            b'b' => Ok(Value::Binary(self.read_sized()?.to_vec())),
            b'[' => {
                let count = self.read_u32()? as usize;
                let mut arr = ValueArray::with_capacity(count);
                for _ in 0..count {
                    arr.push(self.read_value()?);
                }
                self.expect(b']')?;
                Ok(Value::Array(arr))
            }
            b'{' => {
                let count = self.read_u32()? as usize;
                let mut map = ValueMap::new();
                for _ in 0..count {
                    self.expect(b'k').map_err(|_| LlsdError::KeyExpected)?;
                    let key = String::from_utf8_lossy(self.read_sized()?).into_owned();
                    map.insert(key, self.read_value()?);
                }
                self.expect(b'}')?;
                Ok(Value::Map(map))
            }
            other => Err(LlsdError::UnknownMarker(other)),
        }
    }

    fn expect(&mut self, marker: u8) -> Result<(), LlsdError> {
        let found = self.read_marker()?;
        if found != marker {
            return Err(LlsdError::UnknownMarker(found));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UuidExt;

    fn binary_round_trip(v: &Value) -> Value {
        deserialize(&serialize(v)).unwrap()
    }

    #[test]
    fn test_scalar_round_trips() {
        for v in [
            Value::Undef,
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Integer(i32::MIN),
            Value::Real(-0.125),
            Value::String("κόσμε".to_string()),
            Value::Uuid(Uuid::random()),
            Value::Date(Date::from_unix_time(1_173_983_418)),
            Value::Uri(Url::parse("http://grid.example.com/").unwrap()),
            Value::Binary(vec![1, 2, 3]),
        ] {
            assert_eq!(binary_round_trip(&v), v);
        }
    }

    #[test]
    fn test_integer_is_network_order() {
        let bytes = serialize(&Value::Integer(1));
        assert_eq!(bytes, vec![b'i', 0, 0, 0, 1]);
    }

    #[test]
    fn test_map_layout() {
        let mut map = ValueMap::new();
        map.insert("a", 1i32);
        let bytes = serialize(&Value::Map(map));
        // '{' count 'k' keylen key 'i' value '}'
        assert_eq!(bytes[0], b'{');
        assert_eq!(&bytes[1..5], &1u32.to_be_bytes());
        assert_eq!(bytes[5], b'k');
        assert_eq!(&bytes[5 + 5..5 + 6], b"a");
        assert_eq!(*bytes.last().unwrap(), b'}');
    }

    #[test]
    fn test_nested_round_trip() {
        let mut inner = ValueMap::new();
        inner.insert("id", Uuid::random());
        inner.insert("score", 1.5f64);
        let mut arr = ValueArray::new();
        arr.push(Value::Map(inner));
        arr.push(Value::Undef);
        let mut root = ValueMap::new();
        root.insert("entries", Value::Array(arr));
        let v = Value::Map(root);
        assert_eq!(binary_round_trip(&v), v);
    }

    #[test]
    fn test_truncated_rejected() {
        let bytes = serialize(&Value::String("hello".to_string()));
        assert!(matches!(
            deserialize(&bytes[..bytes.len() - 1]),
            Err(LlsdError::Truncated(_))
        ));
    }

    #[test]
    fn test_unknown_marker_rejected() {
        assert!(matches!(
            deserialize(b"zzz"),
            Err(LlsdError::UnknownMarker(b'z'))
        ));
    }
}
