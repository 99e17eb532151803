use attrwalk::operators::{equals, greater_than};
use attrwalk::{AttrPath, AttributesExt, Collection, Record, Value};
use proptest::prelude::*;

fn separator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["__", ".", "/"])
}

fn counters(values: Vec<i64>) -> Collection<Record> {
    values
        .into_iter()
        .map(|c| Record::new("Counter").with("c", c))
        .collect()
}

proptest! {
    #[test]
    fn render_then_parse_keeps_tokens(
        tokens in prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..6),
        sep in separator(),
    ) {
        let path = AttrPath::from_parts(tokens.clone(), sep);
        let reparsed = AttrPath::parse(&path.render(), sep);
        prop_assert_eq!(reparsed.iter().collect::<Vec<_>>(), tokens.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn parse_then_render_is_identity(text in "[a-z_./]{0,24}", sep in separator()) {
        prop_assert_eq!(AttrPath::parse(&text, sep).render(), text);
    }

    #[test]
    fn null_stops_resolution(tail in prop::collection::vec("[a-z]{1,6}", 0..5)) {
        let record = Record::new("Holder").with("x", Value::Null);
        let mut path = String::from("x");
        for token in &tail {
            path.push_str("__");
            path.push_str(token);
        }
        prop_assert_eq!(record.get_path(&path).unwrap(), Value::Null);
    }

    #[test]
    fn defaulted_lookup_never_fails(path in "[a-z_]{0,16}") {
        let record = Record::new("Holder")
            .with("a", Record::new("Inner").with("b", 1))
            .with("n", Value::Null);
        let resolved = record.get_path_with(&path, "__", Some(Value::Int(7)));
        prop_assert!(resolved.is_ok());
    }

    #[test]
    fn filtering_only_narrows(
        values in prop::collection::vec(-50i64..50, 0..20),
        low in -50i64..50,
        high in -50i64..50,
    ) {
        let items = counters(values.clone());
        let above = items.filter([("c__gt", low)]).unwrap();
        prop_assert!(above.len() <= items.len());
        prop_assert!(above.iter().all(|r| r.get("c").and_then(Value::as_i64).is_some_and(|c| c > low)));

        let both = items.filter([("c__gt", low), ("c__lte", high)]).unwrap();
        prop_assert!(both.len() <= above.len());

        let expected: Vec<i64> = values.into_iter().filter(|c| *c > low).collect();
        let kept: Vec<i64> = above.iter().filter_map(|r| r.get("c").and_then(Value::as_i64)).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn float_equality_matches_native(
        a in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO,
        b in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO,
    ) {
        prop_assert_eq!(equals(&Value::Float(a), &Value::Float(b)).unwrap(), a == b);
        prop_assert!(equals(&Value::Float(a), &Value::Float(a)).unwrap());
        prop_assert_eq!(greater_than(&Value::Float(a), &Value::Float(b)).unwrap(), a > b);
    }

    #[test]
    fn exclude_complements_filter(
        values in prop::collection::vec(-20i64..20, 0..20),
        pivot in -20i64..20,
    ) {
        let items = counters(values);
        let kept = items.filter([("c__gte", pivot)]).unwrap();
        let dropped = items.exclude([("c__gte", pivot)]).unwrap();
        prop_assert_eq!(kept.len() + dropped.len(), items.len());
    }
}
