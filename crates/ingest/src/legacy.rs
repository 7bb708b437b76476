//! Decoder for legacy PHP `serialize()` metadata blobs.
//!
//! Older MediaWiki rows store `img_metadata` in PHP's native serialization
//! format. Only the subset MediaWiki writes is supported:
//!
//! | Token | Meaning | JSON result |
//! |-------|---------|-------------|
//! | `N;` | null | `null` |
//! | `b:0;` / `b:1;` | boolean | `false` / `true` |
//! | `i:42;` | integer | number |
//! | `d:1.5;` | float | number (`null` when not finite) |
//! | `s:3:"abc";` | byte string | string |
//! | `a:2:{...}` | array | array when keys are `0..n-1`, else object |
//! | `O:8:"stdClass":1:{...}` | object | object |
//!
//! The whole input must be consumed; a blob with trailing bytes is rejected
//! so that a JSON document which happens to start like a legacy token is
//! never half-decoded.
use serde_json::{Map, Number, Value};

use crate::error::MetadataError;

/// Deepest array nesting the decoder accepts.
pub(crate) const MAX_DEPTH: usize = 64;

/// Decodes a complete legacy blob into a JSON value.
pub(crate) fn unserialize(input: &str) -> Result<Value, MetadataError> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let value = parser.value(0)?;
    if parser.pos != parser.bytes.len() {
        return Err(MetadataError::TrailingData(parser.pos));
    }
    Ok(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Result<u8, MetadataError> {
        let byte = self
            .bytes
            .get(self.pos)
            .copied()
            .ok_or(MetadataError::UnexpectedEnd(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, want: u8) -> Result<(), MetadataError> {
        let pos = self.pos;
        let found = self.next()?;
        if found == want {
            Ok(())
        } else {
            Err(MetadataError::UnexpectedByte {
                pos,
                found: found as char,
            })
        }
    }

    /// Reads up to (and consumes) `stop`, returning the text before it.
    fn until(&mut self, stop: u8, what: &'static str) -> Result<&'a str, MetadataError> {
        let start = self.pos;
        let offset = self.bytes[start..]
            .iter()
            .position(|&b| b == stop)
            .ok_or(MetadataError::UnexpectedEnd(self.bytes.len()))?;
        self.pos = start + offset + 1;
        std::str::from_utf8(&self.bytes[start..start + offset])
            .map_err(|_| MetadataError::Malformed { what, pos: start })
    }

    fn parsed<T: std::str::FromStr>(&mut self, stop: u8, what: &'static str) -> Result<T, MetadataError> {
        let pos = self.pos;
        self.until(stop, what)?
            .parse()
            .map_err(|_| MetadataError::Malformed { what, pos })
    }

    fn value(&mut self, depth: usize) -> Result<Value, MetadataError> {
        let pos = self.pos;
        match self.next()? {
            b'N' => {
                self.expect(b';')?;
                Ok(Value::Null)
            }
            b'b' => {
                self.expect(b':')?;
                let start = self.pos;
                match self.until(b';', "boolean")? {
                    "0" => Ok(Value::Bool(false)),
                    "1" => Ok(Value::Bool(true)),
                    _ => Err(MetadataError::Malformed {
                        what: "boolean",
                        pos: start,
                    }),
                }
            }
            b'i' => {
                self.expect(b':')?;
                let n: i64 = self.parsed(b';', "integer")?;
                Ok(Value::from(n))
            }
            b'd' => {
                self.expect(b':')?;
                let f: f64 = self.parsed(b';', "float")?;
                Ok(Number::from_f64(f).map_or(Value::Null, Value::Number))
            }
            b's' => {
                self.expect(b':')?;
                let s = self.string()?;
                self.expect(b';')?;
                Ok(Value::String(s))
            }
            b'a' => {
                self.expect(b':')?;
                let count: usize = self.parsed(b':', "array length")?;
                self.entries(count, depth, false)
            }
            b'O' => {
                self.expect(b':')?;
                let _class = self.string()?;
                self.expect(b':')?;
                let count: usize = self.parsed(b':', "property count")?;
                self.entries(count, depth, true)
            }
            other => Err(MetadataError::UnexpectedByte {
                pos,
                found: other as char,
            }),
        }
    }

    /// `<len>:"<bytes>"`, positioned just after the type tag and colon.
    fn string(&mut self) -> Result<String, MetadataError> {
        let len: usize = self.parsed(b':', "string length")?;
        self.expect(b'"')?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(MetadataError::UnexpectedEnd(self.bytes.len()))?;
        let s = String::from_utf8_lossy(&self.bytes[self.pos..end]).into_owned();
        self.pos = end;
        self.expect(b'"')?;
        Ok(s)
    }

    /// `{key value ...}` for arrays and objects.
    fn entries(&mut self, count: usize, depth: usize, object: bool) -> Result<Value, MetadataError> {
        if depth >= MAX_DEPTH {
            return Err(MetadataError::TooDeep(MAX_DEPTH));
        }
        self.expect(b'{')?;

        let mut pairs = Vec::with_capacity(count.min(1024));
        let mut sequential = !object;
        for index in 0..count {
            let key_pos = self.pos;
            let key = match self.value(depth + 1)? {
                Value::Number(n) => {
                    if n.as_u64() != Some(index as u64) {
                        sequential = false;
                    }
                    n.to_string()
                }
                Value::String(s) => {
                    sequential = false;
                    property_name(s)
                }
                _ => {
                    return Err(MetadataError::Malformed {
                        what: "array key",
                        pos: key_pos,
                    })
                }
            };
            let value = self.value(depth + 1)?;
            pairs.push((key, value));
        }
        self.expect(b'}')?;

        if sequential {
            Ok(Value::Array(pairs.into_iter().map(|(_, v)| v).collect()))
        } else {
            Ok(Value::Object(pairs.into_iter().collect::<Map<String, Value>>()))
        }
    }
}

/// Strips the NUL-delimited visibility prefix PHP adds to protected and
/// private property names.
fn property_name(raw: String) -> String {
    if let Some(rest) = raw.strip_prefix('\0') {
        if let Some((_, name)) = rest.split_once('\0') {
            return name.to_string();
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert_eq!(unserialize("N;"), Ok(Value::Null));
        assert_eq!(unserialize("b:1;"), Ok(json!(true)));
        assert_eq!(unserialize("i:-12;"), Ok(json!(-12)));
        assert_eq!(unserialize("d:0.5;"), Ok(json!(0.5)));
        assert_eq!(unserialize("d:INF;"), Ok(Value::Null));
        assert_eq!(unserialize(r#"s:5:"Canon";"#), Ok(json!("Canon")));
    }

    #[test]
    fn string_length_counts_bytes() {
        assert_eq!(unserialize("s:2:\"\u{e9}\";"), Ok(json!("\u{e9}")));
        assert!(unserialize("s:1:\"\u{e9}\";").is_err());
    }

    #[test]
    fn sequential_array_becomes_list() {
        let blob = r#"a:3:{i:0;s:4:"51/1";i:1;s:4:"30/1";i:2;s:3:"0/1";}"#;
        assert_eq!(unserialize(blob), Ok(json!(["51/1", "30/1", "0/1"])));
    }

    #[test]
    fn keyed_array_becomes_object() {
        let blob = r#"a:2:{s:4:"Make";s:5:"Canon";s:5:"Model";s:12:"Canon EOS 5D";}"#;
        assert_eq!(
            unserialize(blob),
            Ok(json!({"Make": "Canon", "Model": "Canon EOS 5D"}))
        );
        let sparse = r#"a:2:{i:0;s:1:"a";i:5;s:1:"b";}"#;
        assert_eq!(unserialize(sparse), Ok(json!({"0": "a", "5": "b"})));
    }

    #[test]
    fn objects_drop_visibility_prefix() {
        let blob = "O:8:\"stdClass\":2:{s:1:\"a\";i:1;s:4:\"\0*\0b\";i:2;}";
        assert_eq!(unserialize(blob), Ok(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn trailing_bytes_rejected() {
        assert_eq!(unserialize("i:1;x"), Err(MetadataError::TrailingData(4)));
    }

    #[test]
    fn truncated_and_malformed_input_rejected() {
        assert!(matches!(
            unserialize(r#"a:2:{i:0;i:1;"#),
            Err(MetadataError::UnexpectedEnd(_))
        ));
        assert!(matches!(
            unserialize("i:abc;"),
            Err(MetadataError::Malformed { what: "integer", .. })
        ));
        assert!(matches!(
            unserialize("{\"a\":1}"),
            Err(MetadataError::UnexpectedByte { pos: 0, found: '{' })
        ));
        assert!(matches!(
            unserialize(r#"s:99:"short";"#),
            Err(MetadataError::UnexpectedEnd(_))
        ));
    }

    #[test]
    fn nesting_is_bounded() {
        let depth = MAX_DEPTH + 1;
        let blob = format!("{}i:1;{}", "a:1:{i:0;".repeat(depth), "}".repeat(depth));
        assert_eq!(unserialize(&blob), Err(MetadataError::TooDeep(MAX_DEPTH)));

        let ok = format!("{}i:1;{}", "a:1:{i:0;".repeat(4), "}".repeat(4));
        assert_eq!(unserialize(&ok), Ok(json!([[[[1]]]])));
    }
}
