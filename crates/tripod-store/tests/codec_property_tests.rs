//! Property tests for the node codec: decode(encode(n)) == n for every
//! node the store can produce.

use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use proptest::prelude::*;
use tripod_store::codec::{decode, encode};

const BASE: &str = "http://example.org/";

fn iri_suffix() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,24}"
}

fn named_node() -> impl Strategy<Value = Term> {
    prop_oneof![
        iri_suffix().prop_map(|s| NamedNode::new_unchecked(format!("{BASE}{s}")).into()),
        iri_suffix().prop_map(|s| NamedNode::new_unchecked(format!("http://other.org/{s}")).into()),
        iri_suffix().prop_map(|s| NamedNode::new_unchecked(format!("urn:x:{s}")).into()),
    ]
}

fn blank_node() -> impl Strategy<Value = Term> {
    // Only store-internal identities have an encoded form.
    any::<u32>().prop_map(|id| BlankNode::new_unchecked(format!("b{id}")).into())
}

fn literal() -> impl Strategy<Value = Term> {
    prop_oneof![
        ".{0,40}".prop_map(|v| Literal::new_simple_literal(v).into()),
        (".{0,40}", "[a-z]{2,3}(-[a-z0-9]{1,8})?").prop_map(|(v, lang)| {
            Literal::new_language_tagged_literal_unchecked(v, lang).into()
        }),
        any::<i64>().prop_map(|n| Literal::new_typed_literal(n.to_string(), xsd::INTEGER).into()),
        any::<bool>().prop_map(|b| Literal::new_typed_literal(b.to_string(), xsd::BOOLEAN).into()),
        any::<f64>().prop_map(|f| Literal::new_typed_literal(f.to_string(), xsd::DOUBLE).into()),
        (".{0,40}", iri_suffix()).prop_map(|(v, dt)| {
            Literal::new_typed_literal(v, NamedNode::new_unchecked(format!("urn:dt:{dt}"))).into()
        }),
    ]
}

fn any_term() -> impl Strategy<Value = Term> {
    prop_oneof![named_node(), blank_node(), literal()]
}

proptest! {
    #[test]
    fn round_trip(term in any_term()) {
        let bytes = encode(&term, BASE).expect("every generated term is encodable");
        prop_assert_eq!(decode(&bytes, BASE).unwrap(), term);
    }

    #[test]
    fn encoding_is_injective(a in any_term(), b in any_term()) {
        let ea = encode(&a, BASE).unwrap();
        let eb = encode(&b, BASE).unwrap();
        prop_assert_eq!(a == b, ea == eb);
    }

    #[test]
    fn decode_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        // Foreign bytes must either decode to some term or report
        // corruption; they must not panic.
        let _ = decode(&bytes, BASE);
    }
}
