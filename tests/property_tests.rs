//! Property-based tests over generated well-typed type/value trees.
//!
//! The generators produce a `CompoundType` first, then a `Value` that
//! conforms to it, so every case exercises the encoder on input it promises
//! to be total over.

use proptest::prelude::*;
use rowtext::{
    parse_type, parse_value, type_to_string, value_to_string, CompoundType, Field, Scalar,
    StructuralWriter, TextOptions, Value,
};

fn balanced(text: &str) -> bool {
    let mut in_quote = false;
    let mut opens = 0i64;
    let mut closes = 0i64;
    for ch in text.chars() {
        match ch {
            '\'' => in_quote = !in_quote,
            '(' | '<' if !in_quote => opens += 1,
            ')' | '>' if !in_quote => closes += 1,
            _ => {}
        }
    }
    opens == closes
}

fn arb_primitive() -> impl Strategy<Value = CompoundType> {
    prop::sample::select(vec![
        "BOOLEAN", "INTEGER", "BIGINT", "UBIGINT", "DOUBLE", "VARCHAR",
    ])
    .prop_map(CompoundType::primitive)
}

fn arb_field_name() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        4 => "[a-z][a-z0-9_]{0,5}",
    ]
}

fn arb_type() -> impl Strategy<Value = CompoundType> {
    let leaf = prop_oneof![
        4 => arb_primitive(),
        1 => (1u8..=38, 0u8..=10).prop_map(|(width, scale)| CompoundType::Decimal { width, scale }),
        1 => prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(CompoundType::Enum),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(CompoundType::list),
            (inner.clone(), 0usize..4).prop_map(|(t, n)| CompoundType::array(t, n)),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| CompoundType::map(k, v)),
            prop::collection::vec((arb_field_name(), inner.clone()), 0..4).prop_map(|fields| {
                CompoundType::struct_of(
                    fields
                        .into_iter()
                        .map(|(name, ty)| Field::new(name, ty))
                        .collect(),
                )
            }),
            prop::collection::vec(("[a-z][a-z0-9_]{0,5}", inner), 1..4).prop_map(|members| {
                CompoundType::union_of(
                    members
                        .into_iter()
                        .map(|(name, ty)| Field::new(name, ty))
                        .collect(),
                )
            }),
        ]
    })
}

fn arb_value_for(ty: &CompoundType) -> BoxedStrategy<Value> {
    let non_null: BoxedStrategy<Value> = match ty {
        CompoundType::Primitive(keyword) => match keyword.as_str() {
            "BOOLEAN" => any::<bool>().prop_map(Value::from).boxed(),
            "INTEGER" | "BIGINT" => any::<i64>().prop_map(Value::from).boxed(),
            "UBIGINT" => any::<u64>().prop_map(Value::from).boxed(),
            "DOUBLE" => any::<f64>()
                .prop_filter("finite", |x| x.is_finite())
                .prop_map(Value::from)
                .boxed(),
            "VARCHAR" => any::<String>().prop_map(Value::from).boxed(),
            other => panic!("generator produced unexpected keyword {other}"),
        },
        CompoundType::Decimal { .. } => any::<i64>()
            .prop_map(|v| Value::Scalar(Scalar::Numeric(v.to_string())))
            .boxed(),
        CompoundType::Struct(fields) => fields
            .iter()
            .map(|f| arb_value_for(&f.ty))
            .collect::<Vec<_>>()
            .prop_map(Value::Struct)
            .boxed(),
        CompoundType::Map(key_ty, value_ty) => {
            prop::collection::vec((arb_value_for(key_ty), arb_value_for(value_ty)), 0..4)
                .prop_map(Value::Map)
                .boxed()
        }
        CompoundType::List(elem) => prop::collection::vec(arb_value_for(elem), 0..4)
            .prop_map(Value::List)
            .boxed(),
        CompoundType::Array(elem, len) => prop::collection::vec(arb_value_for(elem), *len..=*len)
            .prop_map(Value::Array)
            .boxed(),
        CompoundType::Enum(tags) => (0..tags.len() as u32).prop_map(Value::Enum).boxed(),
        CompoundType::Union(members) => {
            let members = members.clone();
            (0..members.len())
                .prop_flat_map(move |i| {
                    let tag = i as u32;
                    arb_value_for(&members[i].ty).prop_map(move |v| Value::Union {
                        tag,
                        value: Box::new(v),
                    })
                })
                .boxed()
        }
    };
    prop_oneof![
        9 => non_null,
        1 => Just(Value::Null),
    ]
    .boxed()
}

fn arb_typed_value() -> impl Strategy<Value = (CompoundType, Value)> {
    arb_type().prop_flat_map(|ty| {
        let values = arb_value_for(&ty);
        values.prop_map(move |v| (ty.clone(), v))
    })
}

proptest! {
    // Every well-typed tree passes the conformance check, encodes without
    // error, and produces balanced delimiters.
    #[test]
    fn prop_encode_terminates_and_balances((ty, v) in arb_typed_value()) {
        prop_assert!(ty.check(&v).is_ok());
        let text = value_to_string(&v).unwrap();
        prop_assert!(balanced(&text), "unbalanced: {}", text);
    }

    // Round-trip law: decoding under the announced type reconstructs the
    // same variant/arity tree.
    #[test]
    fn prop_value_round_trip((ty, v) in arb_typed_value()) {
        let text = value_to_string(&v).unwrap();
        let back = parse_value(&text, &ty).unwrap();
        prop_assert_eq!(back, v);
    }

    #[test]
    fn prop_type_round_trip(ty in arb_type()) {
        let text = type_to_string(&ty).unwrap();
        prop_assert!(balanced(&text), "unbalanced: {}", text);
        prop_assert_eq!(parse_type(&text).unwrap(), ty);
    }

    // For n pairs, the unzipped key list and value list each hold exactly n
    // elements, in the same order.
    #[test]
    fn prop_map_unzip_counts(pairs in prop::collection::vec((any::<i64>(), any::<i64>()), 0..8)) {
        let n = pairs.len();
        let v = Value::Map(
            pairs.iter().map(|(k, val)| (Value::from(*k), Value::from(*val))).collect(),
        );
        let text = value_to_string(&v).unwrap();
        let ty = CompoundType::map(
            CompoundType::primitive("BIGINT"),
            CompoundType::primitive("BIGINT"),
        );
        match parse_value(&text, &ty).unwrap() {
            Value::Map(back) => {
                prop_assert_eq!(back.len(), n);
                for ((k0, v0), (k1, v1)) in pairs.iter().zip(&back) {
                    prop_assert_eq!(&Value::from(*k0), k1);
                    prop_assert_eq!(&Value::from(*v0), v1);
                }
            }
            other => prop_assert!(false, "expected map, got {:?}", other),
        }
    }

    // Re-running the same token sequence through a fresh writer yields
    // byte-identical output.
    #[test]
    fn prop_writer_idempotent(
        tokens in prop::collection::vec(
            prop::sample::select(vec!["STRUCT<", "ROW<", "(", ")", ">", ",", "a", "NULL", "17"]),
            0..24,
        )
    ) {
        let run = |tokens: &[&str]| {
            let mut out = Vec::new();
            let mut w = StructuralWriter::with_options(&mut out, TextOptions::pretty());
            for t in tokens {
                w.write(t).unwrap();
            }
            out
        };
        prop_assert_eq!(run(&tokens), run(&tokens));
    }
}
