//! Order-preserving XML trees built on [`LinkedHashMap`].
//!
//! A document becomes a map from element name to [`XmlValue`]. Inside an
//! element's map:
//! - attributes are `Text` entries under the attribute name;
//! - child elements are `Element` entries under the child's name;
//! - character data is a `Text` entry under the element's own name.
//!
//! Every map keeps document order, so writing a parsed tree back emits
//! attributes and children in the order they were read. Repeated sibling
//! elements with the same name fold into one map, and repeated text inside an
//! element is joined with a separator (`"\n"` unless one is given).
//!
//! ```
//! use chained_hashmap::xml::{self, XmlValue};
//!
//! let doc = xml::parse_str(r#"<book id="7"><title>Dune</title><year>1965</year></book>"#).unwrap();
//! let book = doc.peek("book").and_then(XmlValue::as_element).unwrap();
//! assert_eq!(book.keys().map(String::as_str).collect::<Vec<_>>(), ["id", "title", "year"]);
//!
//! let mut out = Vec::new();
//! xml::write(&doc, &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().ends_with(
//!     r#"<book id="7"><title>Dune</title><year>1965</year></book>"#
//! ));
//! ```

use crate::LinkedHashMap;
use core::fmt;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::{BufRead, Write};

/// Text joined between repeated character data of one element.
pub const DEFAULT_TEXT_SEPARATOR: &str = "\n";

/// An element's contents, keyed by attribute or child name.
pub type XmlMap = LinkedHashMap<String, XmlValue>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlValue {
    /// An attribute value or an element's character data.
    Text(String),
    Element(XmlMap),
}

impl XmlValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(t) => Some(t),
            XmlValue::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&XmlMap> {
        match self {
            XmlValue::Element(m) => Some(m),
            XmlValue::Text(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum XmlError {
    /// Malformed markup reported by the underlying reader.
    Syntax(quick_xml::Error),
    Io(std::io::Error),
    /// A name was not valid UTF-8.
    Utf8(std::str::Utf8Error),
    /// The document ended with this element still open.
    Unclosed(String),
    /// A top-level `Text` entry has no element to live in.
    TopLevelText(String),
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlError::Syntax(e) => write!(f, "malformed xml: {e}"),
            XmlError::Io(e) => write!(f, "xml i/o failed: {e}"),
            XmlError::Utf8(e) => write!(f, "xml name is not utf-8: {e}"),
            XmlError::Unclosed(name) => write!(f, "element <{name}> is never closed"),
            XmlError::TopLevelText(key) => write!(f, "text entry {key:?} outside any element"),
        }
    }
}

impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XmlError::Syntax(e) => Some(e),
            XmlError::Io(e) => Some(e),
            XmlError::Utf8(e) => Some(e),
            XmlError::Unclosed(_) | XmlError::TopLevelText(_) => None,
        }
    }
}

impl From<quick_xml::Error> for XmlError {
    fn from(e: quick_xml::Error) -> Self {
        XmlError::Syntax(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        XmlError::Syntax(e.into())
    }
}

impl From<std::io::Error> for XmlError {
    fn from(e: std::io::Error) -> Self {
        XmlError::Io(e)
    }
}

impl From<std::str::Utf8Error> for XmlError {
    fn from(e: std::str::Utf8Error) -> Self {
        XmlError::Utf8(e)
    }
}

pub fn parse_str(s: &str) -> Result<XmlMap, XmlError> {
    parse_with(s.as_bytes(), DEFAULT_TEXT_SEPARATOR)
}

pub fn parse<R: BufRead>(reader: R) -> Result<XmlMap, XmlError> {
    parse_with(reader, DEFAULT_TEXT_SEPARATOR)
}

/// Parse a document, joining repeated text of an element with `separator`.
/// Whitespace-only text is dropped; other text is kept as written.
pub fn parse_with<R: BufRead>(reader: R, separator: &str) -> Result<XmlMap, XmlError> {
    let mut reader = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut root = XmlMap::new();
    // Open elements, innermost last.
    let mut open: Vec<(String, XmlMap)> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => open.push(start_element(&e)?),
            Event::Empty(e) => {
                let (name, map) = start_element(&e)?;
                close_element(&mut open, &mut root, name, map, separator);
            }
            Event::End(_) => {
                // The reader checks that end tags match.
                if let Some((name, map)) = open.pop() {
                    close_element(&mut open, &mut root, name, map, separator);
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                add_text(&mut open, text, separator);
            }
            Event::CData(c) => {
                let text = std::str::from_utf8(&c)?.to_owned();
                add_text(&mut open, text, separator);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match open.pop() {
        Some((name, _)) => Err(XmlError::Unclosed(name)),
        None => Ok(root),
    }
}

fn start_element(e: &BytesStart<'_>) -> Result<(String, XmlMap), XmlError> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_owned();
    let mut map = XmlMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_owned();
        let value = attr.unescape_value()?.into_owned();
        map.put(key, XmlValue::Text(value));
    }
    Ok((name, map))
}

fn close_element(open: &mut [(String, XmlMap)], root: &mut XmlMap, name: String, map: XmlMap, separator: &str) {
    let parent = match open.last_mut() {
        Some((_, parent)) => parent,
        None => root,
    };
    if let Some(XmlValue::Element(existing)) = parent.get_mut(&name) {
        merge(existing, map, &name, separator);
        return;
    }
    parent.put(name, XmlValue::Element(map));
}

/// Fold a repeated element into the map of its first occurrence. Text under
/// the element's own name is joined; everything else follows `put`.
fn merge(dst: &mut XmlMap, src: XmlMap, name: &str, separator: &str) {
    for (key, value) in src {
        let value = match (dst.get_mut(&key), value) {
            (Some(XmlValue::Text(old)), XmlValue::Text(new)) if key == name => {
                old.push_str(separator);
                old.push_str(&new);
                continue;
            }
            (Some(XmlValue::Element(old)), XmlValue::Element(new)) => {
                merge(old, new, &key, separator);
                continue;
            }
            (_, value) => value,
        };
        dst.put(key, value);
    }
}

fn add_text(open: &mut [(String, XmlMap)], text: String, separator: &str) {
    if text.trim().is_empty() {
        return;
    }
    let Some((name, map)) = open.last_mut() else {
        return;
    };
    if let Some(XmlValue::Text(old)) = map.get_mut(name.as_str()) {
        old.push_str(separator);
        old.push_str(&text);
        return;
    }
    map.put(name.clone(), XmlValue::Text(text));
}

/// Write `doc` as a UTF-8 document, every map in list order. `Text` entries
/// keyed by their element's name become character data; the rest become
/// attributes.
pub fn write<W: Write>(doc: &XmlMap, out: W) -> Result<(), XmlError> {
    let mut writer = Writer::new(out);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    for (name, value) in doc {
        match value {
            XmlValue::Element(map) => write_element(&mut writer, name, map)?,
            XmlValue::Text(_) => return Err(XmlError::TopLevelText(name.clone())),
        }
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, name: &str, map: &XmlMap) -> Result<(), XmlError> {
    let mut start = BytesStart::new(name);
    for (key, value) in map {
        if let XmlValue::Text(text) = value {
            if key != name {
                start.push_attribute((key.as_str(), text.as_str()));
            }
        }
    }
    writer.write_event(Event::Start(start))?;
    for (key, value) in map {
        match value {
            XmlValue::Text(text) if key == name => writer.write_event(Event::Text(BytesText::new(text)))?,
            XmlValue::Text(_) => {}
            XmlValue::Element(child) => write_element(writer, key, child)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element<'a>(map: &'a XmlMap, name: &str) -> &'a XmlMap {
        map.peek(name).and_then(XmlValue::as_element).unwrap()
    }

    fn keys(map: &XmlMap) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    fn written(doc: &XmlMap) -> String {
        let mut out = Vec::new();
        write(doc, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    const PERSONS: &str = r#"<?xml version="1.0" encoding="UTF-8"?><persons><person id="2" sex="f"><name>Zoe</name><age>31</age></person><note>kept</note></persons>"#;

    #[test]
    fn parse_keeps_document_order() {
        let doc = parse_str("<r><z/><a/><m k='1'/></r>").unwrap();
        let r = element(&doc, "r");
        assert_eq!(keys(r), ["z", "a", "m"]);
        assert_eq!(element(r, "m").peek("k"), Some(&XmlValue::Text("1".into())));
    }

    #[test]
    fn attributes_then_children_then_text() {
        let doc = parse_str(PERSONS).unwrap();
        let person = element(element(&doc, "persons"), "person");
        assert_eq!(keys(person), ["id", "sex", "name", "age"]);
        assert_eq!(element(person, "name").peek("name").and_then(XmlValue::as_text), Some("Zoe"));
    }

    #[test]
    fn write_round_trips_order() {
        let doc = parse_str(PERSONS).unwrap();
        let text = written(&doc);
        assert_eq!(text, PERSONS);
        assert_eq!(parse_str(&text).unwrap(), doc);
    }

    #[test]
    fn repeated_text_is_joined() {
        let doc = parse_str("<p>one<b/>two</p>").unwrap();
        let p = element(&doc, "p");
        assert_eq!(keys(p), ["p", "b"]);
        assert_eq!(p.peek("p").and_then(XmlValue::as_text), Some("one\ntwo"));

        let mut custom = parse_with("<p>one<b/>two</p>".as_bytes(), " | ").unwrap();
        let p = custom.get_mut("p").unwrap();
        let XmlValue::Element(p) = p else { panic!("element") };
        assert_eq!(p.peek("p").and_then(XmlValue::as_text), Some("one | two"));
    }

    #[test]
    fn repeated_siblings_fold_into_first() {
        let doc = parse_str(r#"<r><v a="1">x</v><w/><v b="2">y</v></r>"#).unwrap();
        let r = element(&doc, "r");
        assert_eq!(keys(r), ["v", "w"]);
        let v = element(r, "v");
        assert_eq!(keys(v), ["a", "v", "b"]);
        assert_eq!(v.peek("v").and_then(XmlValue::as_text), Some("x\ny"));
    }

    #[test]
    fn whitespace_text_is_dropped_and_entities_decoded() {
        let doc = parse_str("<a>\n  <b>x &amp; y</b>\n</a>").unwrap();
        let a = element(&doc, "a");
        assert_eq!(keys(a), ["b"]);
        assert_eq!(element(a, "b").peek("b").and_then(XmlValue::as_text), Some("x & y"));
        assert!(written(&doc).ends_with("<a><b>x &amp; y</b></a>"));
    }

    #[test]
    fn cdata_counts_as_text() {
        let doc = parse_str("<a><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(element(&doc, "a").peek("a").and_then(XmlValue::as_text), Some("<raw>"));
    }

    #[test]
    fn built_tree_writes_in_list_order() {
        let mut item = XmlMap::new();
        item.put("b".into(), XmlValue::Text("2".into()));
        item.put("item".into(), XmlValue::Text("body".into()));
        item.put("a".into(), XmlValue::Text("1".into()));
        let mut doc = XmlMap::new();
        doc.put("item".into(), XmlValue::Element(item));
        assert!(written(&doc).ends_with(r#"<item b="2" a="1">body</item>"#));
    }

    #[test]
    fn errors() {
        assert!(matches!(parse_str("<a><b></a>"), Err(XmlError::Syntax(_))));
        assert!(parse_str("<a><b>").is_err());

        let mut doc = XmlMap::new();
        doc.put("loose".into(), XmlValue::Text("t".into()));
        let err = write(&doc, Vec::new()).unwrap_err();
        assert!(matches!(err, XmlError::TopLevelText(ref k) if k == "loose"));
        assert!(err.to_string().contains("outside any element"));
    }
}
