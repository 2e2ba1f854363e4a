//! Byte encoding of nodes, shared by the dictionary and the persisted
//! store.
//!
//! Every node encodes to a one-byte type tag followed by a type-specific
//! payload:
//!
//! | tag    | node                          | payload                              |
//! |--------|-------------------------------|--------------------------------------|
//! | `0x00` | named node under the base IRI | IRI suffix                           |
//! | `0x01` | named node, absolute          | full IRI                             |
//! | `0x02` | blank node                    | `u32` big-endian internal number     |
//! | `0x03` | `xsd:string` literal          | value                                |
//! | `0x04` | language-tagged literal       | `u8` tag length, tag, value          |
//! | `0x05` | `xsd:integer` literal         | lexical form                         |
//! | `0x06` | `xsd:boolean` literal         | lexical form                         |
//! | `0x07` | `xsd:double` literal          | lexical form                         |
//! | `0x08` | `xsd:dateTime` literal        | lexical form                         |
//! | `0x09` | any other datatype            | `u16` BE IRI length, IRI, value      |
//!
//! Blank-node identity inside the encoded form is store-local: the payload
//! is the node's own dictionary ID, and decoding yields the label `b<ID>`.
//! A caller-supplied blank label therefore only resolves for lookup when it
//! is exactly that internal form.
//!
//! Decoding is total over encoder output and mutually inverse with
//! [`encode`]. Bytes this codec never produced are not defensively
//! interpreted: decoding them reports [`StoreError::DecodeCorruption`].

use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode, Term};

use crate::error::StoreError;

const TAG_IRI_BASED: u8 = 0x00;
const TAG_IRI_ABS: u8 = 0x01;
const TAG_BLANK: u8 = 0x02;
const TAG_STRING: u8 = 0x03;
const TAG_LANG_STRING: u8 = 0x04;
const TAG_INTEGER: u8 = 0x05;
const TAG_BOOLEAN: u8 = 0x06;
const TAG_DOUBLE: u8 = 0x07;
const TAG_DATE_TIME: u8 = 0x08;
const TAG_OTHER: u8 = 0x09;

/// Internal label for the blank node with dictionary ID `id`.
pub(crate) fn blank_label(id: u32) -> String {
    format!("b{id}")
}

/// Parse a store-internal blank label back into its dictionary ID.
///
/// Rejects anything that [`blank_label`] cannot have produced, including
/// leading zeros, so labels and IDs stay in bijection.
pub(crate) fn parse_blank_label(label: &str) -> Option<u32> {
    let digits = label.strip_prefix('b')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// Tags naming a node usable in subject position (IRIs and blanks).
pub(crate) fn is_subject_tag(tag: u8) -> bool {
    tag <= TAG_BLANK
}

/// Tags naming a named node (usable in predicate position).
pub(crate) fn is_named_tag(tag: u8) -> bool {
    tag == TAG_IRI_BASED || tag == TAG_IRI_ABS
}

/// Encoded form of the blank node with dictionary ID `id`.
pub(crate) fn blank_bytes(id: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(5);
    out.push(TAG_BLANK);
    out.extend_from_slice(&id.to_be_bytes());
    out
}

/// Encode a node.
///
/// Returns `None` only for blank nodes whose label is not a store-internal
/// identity; such a node has no encoded form and is by definition absent
/// from the store. (Mutation paths allocate internal identities before
/// encoding, so they never observe `None`.)
pub fn encode(term: &Term, base: &str) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    match term {
        Term::NamedNode(n) => {
            let iri = n.as_str();
            if !base.is_empty() && iri.len() > base.len() && iri.starts_with(base) {
                out.push(TAG_IRI_BASED);
                out.extend_from_slice(iri[base.len()..].as_bytes());
            } else {
                out.push(TAG_IRI_ABS);
                out.extend_from_slice(iri.as_bytes());
            }
        }
        Term::BlankNode(b) => {
            let id = parse_blank_label(b.as_str())?;
            return Some(blank_bytes(id));
        }
        Term::Literal(lit) => {
            if let Some(lang) = lit.language() {
                out.push(TAG_LANG_STRING);
                out.push(lang.len() as u8);
                out.extend_from_slice(lang.as_bytes());
                out.extend_from_slice(lit.value().as_bytes());
            } else {
                let dt = lit.datatype();
                let tag = if dt == xsd::STRING {
                    TAG_STRING
                } else if dt == xsd::INTEGER {
                    TAG_INTEGER
                } else if dt == xsd::BOOLEAN {
                    TAG_BOOLEAN
                } else if dt == xsd::DOUBLE {
                    TAG_DOUBLE
                } else if dt == xsd::DATE_TIME {
                    TAG_DATE_TIME
                } else {
                    TAG_OTHER
                };
                out.push(tag);
                if tag == TAG_OTHER {
                    let iri = dt.as_str().as_bytes();
                    out.extend_from_slice(&(iri.len() as u16).to_be_bytes());
                    out.extend_from_slice(iri);
                }
                out.extend_from_slice(lit.value().as_bytes());
            }
        }
    }
    Some(out)
}

/// Decode a byte sequence produced by [`encode`].
pub fn decode(bytes: &[u8], base: &str) -> Result<Term, StoreError> {
    let (&tag, payload) = bytes
        .split_first()
        .ok_or_else(|| StoreError::DecodeCorruption("empty node encoding".into()))?;
    match tag {
        TAG_IRI_BASED => {
            let suffix = utf8(payload)?;
            Ok(NamedNode::new_unchecked(format!("{base}{suffix}")).into())
        }
        TAG_IRI_ABS => Ok(NamedNode::new_unchecked(utf8(payload)?.to_owned()).into()),
        TAG_BLANK => {
            let raw: [u8; 4] = payload
                .try_into()
                .map_err(|_| StoreError::DecodeCorruption("bad blank node payload".into()))?;
            let id = u32::from_be_bytes(raw);
            Ok(BlankNode::new_unchecked(blank_label(id)).into())
        }
        TAG_STRING => Ok(Literal::new_simple_literal(utf8(payload)?).into()),
        TAG_LANG_STRING => {
            let (&len, rest) = payload
                .split_first()
                .ok_or_else(|| StoreError::DecodeCorruption("truncated language tag".into()))?;
            let len = len as usize;
            if rest.len() < len {
                return Err(StoreError::DecodeCorruption("truncated language tag".into()));
            }
            let lang = utf8(&rest[..len])?;
            let value = utf8(&rest[len..])?;
            Ok(Literal::new_language_tagged_literal_unchecked(value, lang).into())
        }
        TAG_INTEGER => Ok(Literal::new_typed_literal(utf8(payload)?, xsd::INTEGER).into()),
        TAG_BOOLEAN => Ok(Literal::new_typed_literal(utf8(payload)?, xsd::BOOLEAN).into()),
        TAG_DOUBLE => Ok(Literal::new_typed_literal(utf8(payload)?, xsd::DOUBLE).into()),
        TAG_DATE_TIME => Ok(Literal::new_typed_literal(utf8(payload)?, xsd::DATE_TIME).into()),
        TAG_OTHER => {
            if payload.len() < 2 {
                return Err(StoreError::DecodeCorruption("truncated datatype IRI".into()));
            }
            let len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
            let rest = &payload[2..];
            if rest.len() < len {
                return Err(StoreError::DecodeCorruption("truncated datatype IRI".into()));
            }
            let dt = NamedNode::new_unchecked(utf8(&rest[..len])?.to_owned());
            let value = utf8(&rest[len..])?;
            Ok(Literal::new_typed_literal(value, dt).into())
        }
        other => Err(StoreError::DecodeCorruption(format!(
            "unknown node tag 0x{other:02x}"
        ))),
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, StoreError> {
    std::str::from_utf8(bytes)
        .map_err(|_| StoreError::DecodeCorruption("invalid utf-8 in node payload".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://example.org/";

    fn round_trip(term: Term) {
        let bytes = encode(&term, BASE).expect("encodable");
        assert_eq!(decode(&bytes, BASE).unwrap(), term);
    }

    #[test]
    fn named_node_under_base_uses_suffix_tag() {
        let term: Term = NamedNode::new_unchecked("http://example.org/alice").into();
        let bytes = encode(&term, BASE).unwrap();
        assert_eq!(bytes[0], TAG_IRI_BASED);
        assert_eq!(&bytes[1..], b"alice");
        round_trip(term);
    }

    #[test]
    fn named_node_outside_base_is_absolute() {
        let term: Term = NamedNode::new_unchecked("http://other.org/x").into();
        let bytes = encode(&term, BASE).unwrap();
        assert_eq!(bytes[0], TAG_IRI_ABS);
        round_trip(term);
    }

    #[test]
    fn bare_base_iri_is_absolute() {
        // The suffix form requires a non-empty suffix.
        let term: Term = NamedNode::new_unchecked(BASE).into();
        let bytes = encode(&term, BASE).unwrap();
        assert_eq!(bytes[0], TAG_IRI_ABS);
        round_trip(term);
    }

    #[test]
    fn blank_node_payload_is_the_internal_id() {
        let term: Term = BlankNode::new_unchecked(blank_label(7042)).into();
        let bytes = encode(&term, BASE).unwrap();
        assert_eq!(bytes, blank_bytes(7042));
        round_trip(term);
    }

    #[test]
    fn foreign_blank_label_has_no_encoding() {
        let term: Term = BlankNode::new_unchecked("alice").into();
        assert_eq!(encode(&term, BASE), None);
        // Leading zeros would break the label/ID bijection.
        let term: Term = BlankNode::new_unchecked("b007").into();
        assert_eq!(encode(&term, BASE), None);
    }

    #[test]
    fn literal_round_trips() {
        round_trip(Literal::new_simple_literal("hello world").into());
        round_trip(Literal::new_language_tagged_literal_unchecked("hei", "nb").into());
        round_trip(Literal::new_typed_literal("42", xsd::INTEGER).into());
        round_trip(Literal::new_typed_literal("true", xsd::BOOLEAN).into());
        round_trip(Literal::new_typed_literal("1.5e3", xsd::DOUBLE).into());
        round_trip(Literal::new_typed_literal("2026-08-06T12:00:00Z", xsd::DATE_TIME).into());
        round_trip(
            Literal::new_typed_literal(
                "P1Y",
                NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#duration"),
            )
            .into(),
        );
    }

    #[test]
    fn empty_string_literal_round_trips() {
        round_trip(Literal::new_simple_literal("").into());
    }

    #[test]
    fn foreign_bytes_are_corruption() {
        assert!(matches!(
            decode(&[], BASE),
            Err(StoreError::DecodeCorruption(_))
        ));
        assert!(matches!(
            decode(&[0xfe, 1, 2], BASE),
            Err(StoreError::DecodeCorruption(_))
        ));
        assert!(matches!(
            decode(&[TAG_BLANK, 1], BASE),
            Err(StoreError::DecodeCorruption(_))
        ));
        assert!(matches!(
            decode(&[TAG_LANG_STRING, 9, b'x'], BASE),
            Err(StoreError::DecodeCorruption(_))
        ));
    }
}
