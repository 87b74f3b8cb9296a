//! Cross-module checks of the language surface: the parsers agree on
//! path syntax, limits apply everywhere, and the two DSLs compose
//! through the embedded-condition forms.

use marq_core::{
    parse_action, parse_action_with, parse_condition, parse_condition_with, Action, Condition,
    Limits, Path, Value,
};

#[test]
fn paths_parse_identically_in_both_dsls() {
    let cond = parse_condition("a.b[0].c[-1] exists").unwrap();
    let Condition::Existence { path, .. } = cond else {
        panic!("expected existence predicate");
    };
    let act = parse_action("DELETE a.b[0].c[-1]").unwrap();
    let Action::Delete { path: act_path } = act else {
        panic!("expected delete");
    };
    assert_eq!(path, act_path);
    assert_eq!(path, Path::parse("a.b[0].c[-1]").unwrap());
}

#[test]
fn every_operation_keyword_parses() {
    let samples = [
        r#"SET a 1"#,
        r#"ADD a 1"#,
        r#"DELETE a"#,
        r#"CLEAR a"#,
        r#"RENAME a b"#,
        r#"APPEND xs 1"#,
        r#"PREPEND xs 1"#,
        r#"INSERT_AT xs 1 AT 0"#,
        r#"INSERT_AFTER xs 1 AFTER 2"#,
        r#"INSERT_BEFORE xs 1 BEFORE 2"#,
        r#"REMOVE xs 1"#,
        r#"REMOVE_ALL xs 1"#,
        r#"REMOVE_AT xs 0"#,
        r#"REPLACE xs 1 WITH 2"#,
        r#"REPLACE_ALL xs 1 WITH 2"#,
        r#"DEDUPLICATE xs"#,
        r#"SORT xs"#,
        r#"SORT xs DESC"#,
        r#"SORT_BY xs BY f"#,
        r#"SORT_BY xs BY f DESC"#,
        r#"MOVE xs FROM 0 TO 1"#,
        r#"MOVE_WHERE xs WHERE f = 1 TO START"#,
        r#"MOVE_WHERE xs WHERE f = 1 AFTER g = 2"#,
        r#"MOVE_WHERE xs WHERE f = 1 BEFORE g = 2"#,
        r#"UPDATE_WHERE xs WHERE f = 1 SET g 2"#,
        r#"MERGE m {"k":1}"#,
        r#"MERGE_OVERWRITE m {"k":1}"#,
    ];
    for sample in samples {
        assert!(parse_action(sample).is_ok(), "failed to parse: {}", sample);
    }
}

#[test]
fn custom_limits_thread_through_both_parsers() {
    let tight = Limits {
        max_path_depth: 2,
        ..Limits::default()
    };
    assert!(parse_condition_with("a.b exists", &tight).is_ok());
    assert!(parse_condition_with("a.b.c exists", &tight).is_err());
    assert!(parse_action_with("SET a.b 1", &tight).is_ok());
    assert!(parse_action_with("SET a.b.c 1", &tight).is_err());
}

#[test]
fn embedded_conditions_support_the_full_predicate_grammar() {
    let action = parse_action(
        r#"MOVE_WHERE tasks WHERE (done = true OR status ~ /archived/i) AND priority < 3 TO END"#,
    )
    .unwrap();
    let Action::MoveWhere { condition, .. } = action else {
        panic!("expected MOVE_WHERE");
    };
    assert!(matches!(condition, Condition::And(_, _)));
}

#[test]
fn json_literals_carry_typed_values() {
    let action = parse_action(r#"APPEND xs {"nested":{"n":1.5},"flag":true}"#).unwrap();
    let Action::Append { value, .. } = action else {
        panic!("expected APPEND");
    };
    let map = value.as_map().unwrap();
    assert_eq!(map["flag"], Value::Bool(true));
    assert_eq!(
        map["nested"].as_map().unwrap()["n"],
        Value::Float(1.5)
    );
}

#[test]
fn condition_text_round_trips_numbers_and_null() {
    let cond = parse_condition("a = null OR b = -2.5 OR c = true").unwrap();
    let mut found_null = false;
    let mut found_float = false;
    fn walk(c: &Condition, found_null: &mut bool, found_float: &mut bool) {
        match c {
            Condition::Or(l, r) | Condition::And(l, r) => {
                walk(l, found_null, found_float);
                walk(r, found_null, found_float);
            }
            Condition::Comparison { right, .. } => {
                if let marq_core::CondLiteral::Scalar(v) = right {
                    if v.is_null() {
                        *found_null = true;
                    }
                    if matches!(v, Value::Float(_)) {
                        *found_float = true;
                    }
                }
            }
            _ => {}
        }
    }
    walk(&cond, &mut found_null, &mut found_float);
    assert!(found_null && found_float);
}
