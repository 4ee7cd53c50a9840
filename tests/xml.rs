#![cfg(feature = "xml")]

use chained_hashmap::xml::{self, XmlValue};
use std::io::BufReader;

const CATALOG: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<catalog owner="lib"><shelf n="3"><book>Zed</book><book>Alpha</book></shelf>"#,
    r#"<shelf n="1"><dvd>Moby</dvd></shelf><summary>two shelves</summary></catalog>"#,
);

#[test]
fn reader_input_round_trips_in_document_order() {
    let doc = xml::parse(BufReader::new(CATALOG.as_bytes())).unwrap();
    let catalog = doc.peek("catalog").and_then(XmlValue::as_element).unwrap();
    assert_eq!(
        catalog.keys().map(String::as_str).collect::<Vec<_>>(),
        ["owner", "shelf", "summary"]
    );

    // Both shelves fold into the first; the later `n` overwrites in place.
    let shelf = catalog.peek("shelf").and_then(XmlValue::as_element).unwrap();
    assert_eq!(shelf.keys().map(String::as_str).collect::<Vec<_>>(), ["n", "book", "dvd"]);
    assert_eq!(shelf.peek("n").and_then(XmlValue::as_text), Some("1"));
    let book = shelf.peek("book").and_then(XmlValue::as_element).unwrap();
    assert_eq!(book.peek("book").and_then(XmlValue::as_text), Some("Zed\nAlpha"));

    let mut out = Vec::new();
    xml::write(&doc, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<catalog owner="lib"><shelf n="1"><book>Zed"#,
            "\n",
            r#"Alpha</book><dvd>Moby</dvd></shelf><summary>two shelves</summary></catalog>"#,
        )
    );
    assert_eq!(xml::parse_str(&text).unwrap(), doc);
}
