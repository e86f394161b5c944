//! Property tests over randomly wired graphs (shared children, self loops,
//! back edges and unreachable containers included).

use proptest::prelude::*;

use reftable_core::text::{JsonCodec, TextCodec};
use reftable_core::{decode, encode, Entry, ObjectGraph, ObjectId, Value};

#[derive(Debug, Clone)]
enum Child {
    Int(i64),
    Text(String),
    Flag(bool),
    Null,
    /// Reference to another container, taken modulo the container count.
    Ref(usize),
}

fn child() -> impl Strategy<Value = Child> {
    prop_oneof![
        any::<i64>().prop_map(Child::Int),
        "[a-z]{0,4}".prop_map(Child::Text),
        any::<bool>().prop_map(Child::Flag),
        Just(Child::Null),
        (0usize..16).prop_map(Child::Ref),
    ]
}

/// One `(is_sequence, children)` pair per container; container 0 is the root.
fn graph_layout() -> impl Strategy<Value = Vec<(bool, Vec<Child>)>> {
    prop::collection::vec((any::<bool>(), prop::collection::vec(child(), 0..5)), 1..12)
}

fn build(layout: &[(bool, Vec<Child>)]) -> (ObjectGraph, ObjectId) {
    let mut graph = ObjectGraph::new();
    let ids: Vec<ObjectId> = layout
        .iter()
        .map(|(is_sequence, _)| {
            if *is_sequence {
                graph.alloc_sequence()
            } else {
                graph.alloc_record()
            }
        })
        .collect();

    for ((is_sequence, children), id) in layout.iter().zip(&ids) {
        for (n, c) in children.iter().enumerate() {
            let value = match c {
                Child::Int(i) => Value::from(*i),
                Child::Text(s) => Value::from(s.as_str()),
                Child::Flag(b) => Value::from(*b),
                Child::Null => Value::NULL,
                Child::Ref(r) => Value::Object(ids[r % ids.len()]),
            };
            if *is_sequence {
                graph.push(*id, value).unwrap();
            } else {
                graph.insert(*id, format!("k{}", n), value).unwrap();
            }
        }
    }
    (graph, ids[0])
}

proptest! {
    #[test]
    fn roundtrip_preserves_structure_and_sharing(layout in graph_layout()) {
        let (graph, root) = build(&layout);
        let table = encode(&graph, &root.into()).unwrap();
        let decoded = decode(&table).unwrap();
        prop_assert!(graph.same_shape(&root.into(), &decoded.graph, &decoded.root));
    }

    #[test]
    fn encoded_indices_are_in_range(layout in graph_layout()) {
        let (graph, root) = build(&layout);
        let table = encode(&graph, &root.into()).unwrap();
        prop_assert_eq!(table.root, 0);
        for entry in &table.entries {
            for index in entry.references() {
                prop_assert!(index < table.len());
            }
        }
        prop_assert!(table.validate().is_ok());
    }

    #[test]
    fn encoding_is_deterministic_and_canonical(layout in graph_layout()) {
        let (graph, root) = build(&layout);
        let first = encode(&graph, &root.into()).unwrap();
        let second = encode(&graph, &root.into()).unwrap();
        prop_assert_eq!(&first, &second);

        // A decoded graph walks in the same order, so it encodes identically.
        let decoded = decode(&first).unwrap();
        let again = encode(&decoded.graph, &decoded.root).unwrap();
        prop_assert_eq!(&first, &again);
    }

    #[test]
    fn one_container_per_reachable_identity(layout in graph_layout()) {
        let (graph, root) = build(&layout);
        let table = encode(&graph, &root.into()).unwrap();
        let containers = table.entries.iter().filter(|e| !matches!(e, Entry::Scalar(_))).count();
        let decoded = decode(&table).unwrap();
        prop_assert_eq!(decoded.graph.len(), containers);
        prop_assert!(containers <= graph.len());
    }

    #[test]
    fn json_codec_is_lossless(layout in graph_layout(), pretty in any::<bool>()) {
        let (graph, root) = build(&layout);
        let table = encode(&graph, &root.into()).unwrap();
        let codec = JsonCodec { pretty };
        let text = codec.encode(&table).unwrap();
        prop_assert_eq!(codec.decode(&text).unwrap(), table);
    }
}
