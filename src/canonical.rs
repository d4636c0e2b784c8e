//! Deterministic JSON rendering of structured state
//!
//! Two records with the same content always render to the same text,
//! regardless of the order their fields were inserted in. Object keys are
//! sorted by code point at every nesting level.

use crate::{Error, Result};
use serde::{ser, Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io;

/// Whitespace and escaping convention for canonical output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonStyle {
    /// `", "` between items, `": "` after keys, non-ASCII escaped as `\uXXXX`.
    /// Matches the rendering existing leaf digests were computed over.
    #[default]
    Spaced,
    /// No whitespace, UTF-8 passthrough.
    Compact,
}

/// Convert any serializable state into a JSON value
///
/// Non-finite floats are rejected rather than rendered as `null`, so a
/// state holding `NaN` never shares a digest with one holding `null`.
pub fn to_value<T: Serialize + ?Sized>(state: &T) -> Result<Value> {
    state
        .serialize(FiniteCheck)
        .map_err(|e| Error::InvalidState(e.to_string()))?;
    serde_json::to_value(state).map_err(|e| Error::InvalidState(e.to_string()))
}

/// Render a value canonically
pub fn canonicalize(value: &Value, style: JsonStyle) -> Result<String> {
    let sorted = sort_keys(value);
    let mut out = Vec::with_capacity(128);
    match style {
        JsonStyle::Compact => {
            let mut ser = serde_json::Serializer::new(&mut out);
            sorted
                .serialize(&mut ser)
                .map_err(|e| Error::InvalidState(e.to_string()))?;
        }
        JsonStyle::Spaced => {
            let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
            sorted
                .serialize(&mut ser)
                .map_err(|e| Error::InvalidState(e.to_string()))?;
        }
    }
    String::from_utf8(out).map_err(|e| Error::InvalidState(e.to_string()))
}

/// Length of canonical text in Unicode scalar values
pub fn canonical_len(text: &str) -> usize {
    text.chars().count()
}

// Rebuilds objects in sorted key order so the result does not depend on
// whether serde_json was compiled with `preserve_order`.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k.clone(), sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Walks a value without producing output, failing on `NaN` or `±inf`
#[derive(Clone, Copy)]
struct FiniteCheck;

fn check_float(value: f64) -> std::result::Result<(), serde_json::Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ser::Error::custom(format!(
            "non-finite float {} has no JSON form",
            value
        )))
    }
}

impl ser::Serializer for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> CheckResult {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> CheckResult {
        check_float(v)
    }

    fn serialize_bool(self, _: bool) -> CheckResult {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> CheckResult {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> CheckResult {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> CheckResult {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> CheckResult {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> CheckResult {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> CheckResult {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> CheckResult {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> CheckResult {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> CheckResult {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> CheckResult {
        Ok(())
    }

    fn serialize_char(self, _: char) -> CheckResult {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> CheckResult {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> CheckResult {
        Ok(())
    }

    fn serialize_none(self) -> CheckResult {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> CheckResult {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> CheckResult {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> CheckResult {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, Self::Error> {
        Ok(self)
    }
}

type CheckResult = std::result::Result<(), serde_json::Error>;

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> CheckResult {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(*self)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if (' '..='~').contains(&c) {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(repr_f64(value).as_bytes())
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }
}

/// Shortest round-trip float text, fixed notation for decimal exponents in
/// `-4..16`, otherwise `d.ddde+XX`.
fn repr_f64(value: f64) -> String {
    let sci = format!("{:e}", value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return sci,
    };
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let sign = if negative { "-" } else { "" };

    if (-4..16).contains(&exp) {
        let point = exp + 1;
        let body = if point <= 0 {
            format!("0.{}{}", "0".repeat((-point) as usize), digits)
        } else if point as usize >= digits.len() {
            format!(
                "{}{}.0",
                digits,
                "0".repeat(point as usize - digits.len())
            )
        } else {
            let (int, frac) = digits.split_at(point as usize);
            format!("{}.{}", int, frac)
        };
        format!("{}{}", sign, body)
    } else {
        let (lead, rest) = digits.split_at(1);
        let mant = if rest.is_empty() {
            lead.to_string()
        } else {
            format!("{}.{}", lead, rest)
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mant, exp_sign, exp.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_spaced_sorted_output() {
        let v = json!({"url": "https://phi.chain", "content": "AB", "n": [1, 2]});
        let text = canonicalize(&v, JsonStyle::Spaced).unwrap();
        assert_eq!(
            text,
            r#"{"content": "AB", "n": [1, 2], "url": "https://phi.chain"}"#
        );
    }

    #[test]
    fn test_compact_sorted_output() {
        let v = json!({"b": {"y": true, "x": null}, "a": 1});
        let text = canonicalize(&v, JsonStyle::Compact).unwrap();
        assert_eq!(text, r#"{"a":1,"b":{"x":null,"y":true}}"#);
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let mut first = HashMap::new();
        first.insert("zeta", 1);
        first.insert("alpha", 2);
        let mut second = HashMap::new();
        second.insert("alpha", 2);
        second.insert("zeta", 1);

        for style in [JsonStyle::Spaced, JsonStyle::Compact] {
            let a = canonicalize(&to_value(&first).unwrap(), style).unwrap();
            let b = canonicalize(&to_value(&second).unwrap(), style).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_spaced_escapes_non_ascii() {
        let v = json!({"k": "caf\u{e9} \u{1F600}"});
        let text = canonicalize(&v, JsonStyle::Spaced).unwrap();
        assert_eq!(text, r#"{"k": "caf\u00e9 \ud83d\ude00"}"#);
        assert!(text.is_ascii());
    }

    #[test]
    fn test_compact_keeps_utf8_and_counts_chars() {
        let v = json!("é");
        let text = canonicalize(&v, JsonStyle::Compact).unwrap();
        assert_eq!(text, "\"é\"");
        assert_eq!(canonical_len(&text), 3);
    }

    #[test]
    fn test_float_repr() {
        assert_eq!(repr_f64(1.0), "1.0");
        assert_eq!(repr_f64(1.618), "1.618");
        assert_eq!(repr_f64(-0.5), "-0.5");
        assert_eq!(repr_f64(0.0001), "0.0001");
        assert_eq!(repr_f64(0.00001), "1e-05");
        assert_eq!(repr_f64(1.5e16), "1.5e+16");
        assert_eq!(repr_f64(123456.0), "123456.0");
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let state = BTreeMap::from([("x", bad)]);
            assert!(matches!(to_value(&state), Err(Error::InvalidState(_))));
            assert!(matches!(to_value(&vec![Some(bad)]), Err(Error::InvalidState(_))));
        }
        assert!(matches!(to_value(&f32::NAN), Err(Error::InvalidState(_))));

        let finite = to_value(&BTreeMap::from([("x", 1.5f64)])).unwrap();
        assert_eq!(canonicalize(&finite, JsonStyle::Spaced).unwrap(), r#"{"x": 1.5}"#);
    }

    #[test]
    fn test_non_string_keys_rejected() {
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        assert!(matches!(to_value(&bad), Err(Error::InvalidState(_))));
    }
}
