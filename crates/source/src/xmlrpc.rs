//! Minimal XML-RPC wire codec.
//!
//! Covers the subset of the protocol an Odoo-style endpoint speaks:
//! scalar values, arrays, structs and `<nil/>` (the server is asked to
//! allow nulls). Requests are written as strings, responses parsed with a
//! `quick_xml` event loop.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlRpcError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML-RPC payload: {0}")]
    Malformed(String),

    /// `<fault>` response from the server.
    #[error("server fault {code}: {message}")]
    Fault { code: i64, message: String },
}

/// An XML-RPC value.
///
/// Struct fields keep wire order; Odoo's property bags are lists of small
/// structs where order is meaningful to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Double(f64),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Nil,
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Struct field access by name (first occurrence).
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Serialize a `<methodCall>` document.
pub fn write_call(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(r#"<?xml version="1.0"?>"#);
    out.push_str("<methodCall><methodName>");
    out.push_str(&quick_xml::escape::escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(n) => {
            out.push_str("<int>");
            out.push_str(&n.to_string());
            out.push_str("</int>");
        }
        Value::Bool(b) => {
            out.push_str("<boolean>");
            out.push(if *b { '1' } else { '0' });
            out.push_str("</boolean>");
        }
        Value::Str(s) => {
            out.push_str("<string>");
            out.push_str(&quick_xml::escape::escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Double(d) => {
            out.push_str("<double>");
            out.push_str(&d.to_string());
            out.push_str("</double>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(fields) => {
            out.push_str("<struct>");
            for (name, field) in fields {
                out.push_str("<member><name>");
                out.push_str(&quick_xml::escape::escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, field);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

/// Parse a `<methodResponse>` document into its single result value.
///
/// A `<fault>` response surfaces as [`XmlRpcError::Fault`].
pub fn parse_response(xml: &str) -> Result<Value, XmlRpcError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"methodResponse" | b"params" | b"param" => {}
                b"value" => return parse_value(&mut reader),
                b"fault" => return Err(parse_fault(&mut reader)),
                other => return Err(unexpected_tag(other)),
            },
            Event::Eof => {
                return Err(XmlRpcError::Malformed(
                    "response ended before a value".into(),
                ));
            }
            _ => {}
        }
    }
}

fn unexpected_tag(name: &[u8]) -> XmlRpcError {
    XmlRpcError::Malformed(format!(
        "unexpected element <{}>",
        String::from_utf8_lossy(name)
    ))
}

/// Parse the contents of a `<value>` element; the reader is positioned
/// just past the opening tag.
fn parse_value(reader: &mut Reader<&[u8]>) -> Result<Value, XmlRpcError> {
    let mut value: Option<Value> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let parsed = match e.local_name().as_ref() {
                    b"int" | b"i4" | b"i8" => {
                        let text = text_until(reader, b"int", b"i4", b"i8")?;
                        Value::Int(text.trim().parse().map_err(|_| {
                            XmlRpcError::Malformed(format!("bad integer '{text}'"))
                        })?)
                    }
                    b"boolean" => {
                        let text = text_until(reader, b"boolean", b"", b"")?;
                        match text.trim() {
                            "1" | "true" => Value::Bool(true),
                            "0" | "false" => Value::Bool(false),
                            other => {
                                return Err(XmlRpcError::Malformed(format!(
                                    "bad boolean '{other}'"
                                )));
                            }
                        }
                    }
                    b"double" => {
                        let text = text_until(reader, b"double", b"", b"")?;
                        Value::Double(text.trim().parse().map_err(|_| {
                            XmlRpcError::Malformed(format!("bad double '{text}'"))
                        })?)
                    }
                    b"string" => Value::Str(text_until(reader, b"string", b"", b"")?),
                    // Passed through as text; nothing downstream consumes
                    // timestamps or binary payloads.
                    b"dateTime.iso8601" => {
                        Value::Str(text_until(reader, b"dateTime.iso8601", b"", b"")?)
                    }
                    b"base64" => Value::Str(text_until(reader, b"base64", b"", b"")?),
                    b"array" => parse_array(reader)?,
                    b"struct" => parse_struct(reader)?,
                    b"nil" => {
                        expect_end(reader, b"nil")?;
                        Value::Nil
                    }
                    other => return Err(unexpected_tag(other)),
                };
                value = Some(parsed);
            }
            Event::Empty(e) => {
                let parsed = match e.local_name().as_ref() {
                    b"nil" => Value::Nil,
                    b"string" => Value::Str(String::new()),
                    other => return Err(unexpected_tag(other)),
                };
                value = Some(parsed);
            }
            // Untyped value content is a string.
            Event::Text(t) => {
                value = Some(Value::Str(t.unescape()?.into_owned()));
            }
            Event::End(e) if e.local_name().as_ref() == b"value" => {
                return Ok(value.unwrap_or_else(|| Value::Str(String::new())));
            }
            Event::Eof => {
                return Err(XmlRpcError::Malformed("unterminated <value>".into()));
            }
            _ => {}
        }
    }
}

fn parse_array(reader: &mut Reader<&[u8]>) -> Result<Value, XmlRpcError> {
    let mut items = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"data" => {}
                b"value" => items.push(parse_value(reader)?),
                other => return Err(unexpected_tag(other)),
            },
            Event::Empty(e) if e.local_name().as_ref() == b"data" => {}
            Event::End(e) => match e.local_name().as_ref() {
                b"data" => {}
                b"array" => return Ok(Value::Array(items)),
                other => return Err(unexpected_tag(other)),
            },
            Event::Eof => {
                return Err(XmlRpcError::Malformed("unterminated <array>".into()));
            }
            _ => {}
        }
    }
}

fn parse_struct(reader: &mut Reader<&[u8]>) -> Result<Value, XmlRpcError> {
    let mut fields = Vec::new();
    let mut pending_name: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"member" => pending_name = None,
                b"name" => pending_name = Some(text_until(reader, b"name", b"", b"")?),
                b"value" => {
                    let name = pending_name.take().ok_or_else(|| {
                        XmlRpcError::Malformed("struct member value before name".into())
                    })?;
                    fields.push((name, parse_value(reader)?));
                }
                other => return Err(unexpected_tag(other)),
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"member" => {}
                b"struct" => return Ok(Value::Struct(fields)),
                other => return Err(unexpected_tag(other)),
            },
            Event::Eof => {
                return Err(XmlRpcError::Malformed("unterminated <struct>".into()));
            }
            _ => {}
        }
    }
}

/// A fault body is a struct value carrying `faultCode` and `faultString`.
fn parse_fault(reader: &mut Reader<&[u8]>) -> XmlRpcError {
    let value = loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"value" => {
                match parse_value(reader) {
                    Ok(v) => break v,
                    Err(e) => return e,
                }
            }
            Ok(Event::Eof) | Err(_) => {
                return XmlRpcError::Malformed("unterminated <fault>".into());
            }
            Ok(_) => {}
        }
    };

    let code = value
        .get("faultCode")
        .and_then(Value::as_i64)
        .unwrap_or_default();
    let message = value
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or("unknown fault")
        .to_string();
    XmlRpcError::Fault { code, message }
}

/// Collect text up to the closing tag named by any of the candidates.
fn text_until(
    reader: &mut Reader<&[u8]>,
    end_a: &[u8],
    end_b: &[u8],
    end_c: &[u8],
) -> Result<String, XmlRpcError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if name == end_a || name == end_b || name == end_c {
                    return Ok(text);
                }
                return Err(unexpected_tag(name));
            }
            Event::Eof => {
                return Err(XmlRpcError::Malformed("unterminated scalar element".into()));
            }
            _ => {}
        }
    }
}

fn expect_end(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<(), XmlRpcError> {
    loop {
        match reader.read_event()? {
            Event::End(e) if e.local_name().as_ref() == end => return Ok(()),
            Event::Eof => {
                return Err(XmlRpcError::Malformed("unterminated element".into()));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_an_escaped_call() {
        let xml = write_call(
            "authenticate",
            &[
                Value::from("db"),
                Value::from("user <admin>"),
                Value::from("p&ss"),
                Value::Struct(vec![]),
            ],
        );
        assert!(xml.starts_with(r#"<?xml version="1.0"?><methodCall>"#));
        assert!(xml.contains("<methodName>authenticate</methodName>"));
        assert!(xml.contains("<string>user &lt;admin&gt;</string>"));
        assert!(xml.contains("<string>p&amp;ss</string>"));
        assert!(xml.contains("<struct></struct>"));
    }

    #[test]
    fn parses_scalar_response() {
        let xml = r#"<?xml version="1.0"?>
            <methodResponse><params><param>
                <value><int>7</int></value>
            </param></params></methodResponse>"#;
        assert_eq!(parse_response(xml).unwrap(), Value::Int(7));
    }

    #[test]
    fn parses_boolean_false_result() {
        // What the ERP returns for a failed authentication.
        let xml = "<methodResponse><params><param>\
                   <value><boolean>0</boolean></value>\
                   </param></params></methodResponse>";
        assert_eq!(parse_response(xml).unwrap(), Value::Bool(false));
    }

    #[test]
    fn parses_search_read_shape() {
        // One stock.quant record: many-to-one fields arrive as [id, label].
        let xml = r#"<methodResponse><params><param><value>
            <array><data>
                <value><struct>
                    <member><name>id</name><value><int>11</int></value></member>
                    <member><name>location_id</name><value><array><data>
                        <value><int>4</int></value>
                        <value><string>WH/LA3/Shelf 1</string></value>
                    </data></array></value></member>
                    <member><name>lot_id</name><value><boolean>0</boolean></value></member>
                </struct></value>
            </data></array>
        </value></param></params></methodResponse>"#;

        let value = parse_response(xml).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 1);
        let quant = &records[0];
        assert_eq!(quant.get("id").and_then(Value::as_i64), Some(11));
        let location = quant.get("location_id").unwrap().as_array().unwrap();
        assert_eq!(location[1].as_str(), Some("WH/LA3/Shelf 1"));
        assert_eq!(quant.get("lot_id").and_then(Value::as_bool), Some(false));
    }

    #[test]
    fn untyped_value_is_a_string() {
        let xml = "<methodResponse><params><param>\
                   <value>plain</value>\
                   </param></params></methodResponse>";
        assert_eq!(parse_response(xml).unwrap(), Value::Str("plain".into()));
    }

    #[test]
    fn parses_nil_and_empty_string() {
        let xml = "<methodResponse><params><param>\
                   <value><array><data>\
                   <value><nil/></value>\
                   <value><string/></value>\
                   </data></array></value>\
                   </param></params></methodResponse>";
        assert_eq!(
            parse_response(xml).unwrap(),
            Value::Array(vec![Value::Nil, Value::Str(String::new())])
        );
    }

    #[test]
    fn surfaces_faults_as_errors() {
        let xml = r#"<methodResponse><fault><value><struct>
            <member><name>faultCode</name><value><int>3</int></value></member>
            <member><name>faultString</name><value><string>Access Denied</string></value></member>
        </struct></value></fault></methodResponse>"#;

        match parse_response(xml) {
            Err(XmlRpcError::Fault { code, message }) => {
                assert_eq!(code, 3);
                assert_eq!(message, "Access Denied");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn rejects_truncated_documents() {
        let xml = "<methodResponse><params><param><value><array>";
        assert!(parse_response(xml).is_err());
    }
}
