//! LLSD-XML codec
//!
//! `<llsd>` wraps a single value. Scalars carry their text form, binary is
//! base64, dates are ISO 8601 UTC. Vector and Rotation values have no LLSD
//! type of their own and are lowered to arrays of reals on output; they come
//! back as arrays, which is what the capability consumers expect.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use url::Url;
use uuid::Uuid;

use crate::error::LlsdError;
use crate::types::{Date, Value, ValueArray, ValueMap};

pub fn serialize(value: &Value) -> Result<Vec<u8>, LlsdError> {
    let mut writer = Writer::new(Vec::new());
    write_event(&mut writer, Event::Start(BytesStart::new("llsd")))?;
    write_value(&mut writer, value)?;
    write_event(&mut writer, Event::End(BytesEnd::new("llsd")))?;
    Ok(writer.into_inner())
}

pub fn deserialize(data: &[u8]) -> Result<Value, LlsdError> {
    let mut reader = Reader::from_reader(data);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match next_event(&mut reader, &mut buf)? {
            Ev::Start(name) if name == b"llsd" => break,
            Ev::Eof => return Err(LlsdError::MissingRoot),
            Ev::Start(name) | Ev::Empty(name) | Ev::End(name) => {
                return Err(LlsdError::UnexpectedElement(latin1(&name)))
            }
            Ev::Text(_) => return Err(LlsdError::MissingRoot),
        }
    }

    let ev = next_event(&mut reader, &mut buf)?;
    read_value_from(ev, &mut reader, &mut buf)
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), LlsdError> {
    writer
        .write_event(event)
        .map_err(quick_xml::Error::from)?;
    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), LlsdError> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    if !text.is_empty() {
        write_event(writer, Event::Text(BytesText::new(text)))?;
    }
    write_event(writer, Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<(), LlsdError> {
    match value {
        Value::Undef => write_event(writer, Event::Empty(BytesStart::new("undef"))),
        Value::Boolean(b) => {
            write_text_element(writer, "boolean", if *b { "true" } else { "false" })
        }
        Value::Integer(i) => write_text_element(writer, "integer", &i.to_string()),
        Value::LongInteger(i) => write_text_element(writer, "integer", &i.to_string()),
        Value::Real(r) => write_text_element(writer, "real", &r.to_string()),
        Value::String(s) => write_text_element(writer, "string", s),
        Value::Uuid(u) => write_text_element(writer, "uuid", &u.to_string()),
        Value::Date(d) => write_text_element(writer, "date", &d.iso8601()),
        Value::Uri(u) => write_text_element(writer, "uri", u.as_str()),
        Value::Binary(b) => {
            use base64::{engine::general_purpose::STANDARD, Engine as _};
            write_text_element(writer, "binary", &STANDARD.encode(b))
        }
        Value::Vector(v) => {
            write_event(writer, Event::Start(BytesStart::new("array")))?;
            for c in [v.x, v.y, v.z] {
                write_text_element(writer, "real", &c.to_string())?;
            }
            write_event(writer, Event::End(BytesEnd::new("array")))
        }
        Value::Rotation(q) => {
            write_event(writer, Event::Start(BytesStart::new("array")))?;
            for c in [q.x, q.y, q.z, q.w] {
                write_text_element(writer, "real", &c.to_string())?;
            }
            write_event(writer, Event::End(BytesEnd::new("array")))
        }
        Value::Array(arr) => {
            write_event(writer, Event::Start(BytesStart::new("array")))?;
            for item in arr.iter() {
                write_value(writer, item)?;
            }
            write_event(writer, Event::End(BytesEnd::new("array")))
        }
        Value::Map(map) => {
            write_event(writer, Event::Start(BytesStart::new("map")))?;
            for (key, item) in map.iter() {
                write_text_element(writer, "key", key)?;
                write_value(writer, item)?;
            }
            write_event(writer, Event::End(BytesEnd::new("map")))
        }
    }
}

/// Owned, simplified event stream; quick-xml events borrow the scratch
/// buffer, which recursion cannot hold across calls.
enum Ev {
    Start(Vec<u8>),
    Empty(Vec<u8>),
    End(Vec<u8>),
    Text(String),
    Eof,
}

fn next_event(reader: &mut Reader<&[u8]>, buf: &mut Vec<u8>) -> Result<Ev, LlsdError> {
    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Start(e) => return Ok(Ev::Start(e.name().as_ref().to_vec())),
            Event::Empty(e) => return Ok(Ev::Empty(e.name().as_ref().to_vec())),
            Event::End(e) => return Ok(Ev::End(e.name().as_ref().to_vec())),
            Event::Text(e) => return Ok(Ev::Text(e.unescape()?.into_owned())),
            Event::CData(e) => {
                return Ok(Ev::Text(
                    String::from_utf8_lossy(e.into_inner().as_ref()).into_owned(),
                ))
            }
            Event::Eof => return Ok(Ev::Eof),
            // Declarations, comments and processing instructions are noise.
            _ => {}
        }
    }
}

fn read_value_from(
    ev: Ev,
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
) -> Result<Value, LlsdError> {
    match ev {
        Ev::Start(name) => read_element(reader, buf, name),
        Ev::Empty(name) => empty_value(&name),
        Ev::End(_) | Ev::Eof => Err(LlsdError::UnexpectedEof),
        Ev::Text(t) => Err(LlsdError::UnexpectedElement(t)),
    }
}

fn read_element(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    name: Vec<u8>,
) -> Result<Value, LlsdError> {
    match name.as_slice() {
        b"map" => {
            let mut map = ValueMap::new();
            loop {
                match next_event(reader, buf)? {
                    Ev::End(n) if n == b"map" => return Ok(Value::Map(map)),
                    Ev::Start(n) if n == b"key" => {
                        let key = read_text_until_end(reader, buf, b"key")?;
                        let ev = next_event(reader, buf)?;
                        let value = read_value_from(ev, reader, buf)?;
                        map.insert(key, value);
                    }
                    Ev::Empty(n) if n == b"key" => {
                        let ev = next_event(reader, buf)?;
                        let value = read_value_from(ev, reader, buf)?;
                        map.insert("", value);
                    }
                    Ev::Eof => return Err(LlsdError::UnexpectedEof),
                    _ => return Err(LlsdError::KeyExpected),
                }
            }
        }
        b"array" => {
            let mut arr = ValueArray::new();
            loop {
                match next_event(reader, buf)? {
                    Ev::End(n) if n == b"array" => return Ok(Value::Array(arr)),
                    Ev::Eof => return Err(LlsdError::UnexpectedEof),
                    ev => arr.push(read_value_from(ev, reader, buf)?),
                }
            }
        }
        _ => {
            let text = read_text_until_end(reader, buf, &name)?;
            scalar_from_text(&name, &text)
        }
    }
}

fn read_text_until_end(
    reader: &mut Reader<&[u8]>,
    buf: &mut Vec<u8>,
    name: &[u8],
) -> Result<String, LlsdError> {
    let mut out = String::new();
    loop {
        match next_event(reader, buf)? {
            Ev::Text(t) => out.push_str(&t),
            Ev::End(n) if n == name => return Ok(out),
            Ev::Eof => return Err(LlsdError::UnexpectedEof),
            Ev::Start(n) | Ev::Empty(n) | Ev::End(n) => {
                return Err(LlsdError::UnexpectedElement(latin1(&n)))
            }
        }
    }
}

fn empty_value(name: &[u8]) -> Result<Value, LlsdError> {
    // Writers commonly collapse empty containers to self-closing tags.
    match name {
        b"map" => Ok(Value::Map(ValueMap::new())),
        b"array" => Ok(Value::Array(ValueArray::new())),
        _ => scalar_from_text(name, ""),
    }
}

fn scalar_from_text(name: &[u8], text: &str) -> Result<Value, LlsdError> {
    let trimmed = text.trim();
    match name {
        b"undef" => Ok(Value::Undef),
        b"boolean" => Ok(Value::Boolean(matches!(trimmed, "1" | "true" | "TRUE"))),
        b"integer" => {
            if trimmed.is_empty() {
                return Ok(Value::Integer(0));
            }
            let n: i64 = trimmed.parse().map_err(|_| LlsdError::MalformedScalar {
                kind: "integer",
                reason: text.to_string(),
            })?;
            Ok(match i32::try_from(n) {
                Ok(small) => Value::Integer(small),
                Err(_) => Value::LongInteger(n),
            })
        }
        b"real" => {
            if trimmed.is_empty() {
                return Ok(Value::Real(0.0));
            }
            let r: f64 = trimmed.parse().map_err(|_| LlsdError::MalformedScalar {
                kind: "real",
                reason: text.to_string(),
            })?;
            Ok(Value::Real(r))
        }
        b"string" => Ok(Value::String(text.to_string())),
        b"uuid" => {
            if trimmed.is_empty() {
                return Ok(Value::Uuid(Uuid::nil()));
            }
            let u = Uuid::parse_str(trimmed).map_err(|_| LlsdError::MalformedScalar {
                kind: "uuid",
                reason: text.to_string(),
            })?;
            Ok(Value::Uuid(u))
        }
        b"date" => {
            if trimmed.is_empty() {
                return Ok(Value::Date(Date::UNIX_EPOCH));
            }
            let d: Date = trimmed.parse().map_err(|_| LlsdError::MalformedScalar {
                kind: "date",
                reason: text.to_string(),
            })?;
            Ok(Value::Date(d))
        }
        b"uri" => {
            let u = Url::parse(trimmed).map_err(|_| LlsdError::MalformedScalar {
                kind: "uri",
                reason: text.to_string(),
            })?;
            Ok(Value::Uri(u))
        }
        b"binary" => {
            use base64::{engine::general_purpose::STANDARD, Engine as _};
            let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD
                .decode(compact)
                .map_err(|e| LlsdError::MalformedScalar {
                    kind: "binary",
                    reason: e.to_string(),
                })?;
            Ok(Value::Binary(bytes))
        }
        other => Err(LlsdError::UnexpectedElement(latin1(other))),
    }
}

fn latin1(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
