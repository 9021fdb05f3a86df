use proptest::prelude::*;
use ynab_rules::{
    Action, ActionField, Condition, ConditionField, ConditionOperator, IdGenerator, LogicOperator,
    Rule, RuleDraft, SeededIds, TransactionRecord,
};

fn transaction(payee: &str, outflow: f64) -> TransactionRecord {
    let mut t = TransactionRecord::new();
    t.insert("id", "t1");
    t.insert("payee_name", payee);
    t.insert("outflow", outflow);
    t
}

fn uber_rule(logic: LogicOperator) -> Rule {
    RuleDraft::new("Uber rides")
        .logic(logic)
        .condition(Condition::new(ConditionField::PayeeName, ConditionOperator::Contains, "uber"))
        .condition(Condition::new(ConditionField::Outflow, ConditionOperator::GreaterThan, "20"))
        .action(Action::set(ActionField::CategoryName, "Transport"))
        .build(&mut SeededIds::new(7))
        .unwrap()
}

#[test]
fn test_and_requires_every_condition() {
    let rule = uber_rule(LogicOperator::And);

    assert!(rule.evaluate(&transaction("UBER TRIP", 25.0)));
    assert!(!rule.evaluate(&transaction("UBER TRIP", 10.0)));
    assert!(!rule.evaluate(&transaction("Lyft", 25.0)));
}

#[test]
fn test_or_needs_any_condition() {
    let rule = uber_rule(LogicOperator::Or);

    assert!(rule.evaluate(&transaction("UBER TRIP", 10.0)));
    assert!(rule.evaluate(&transaction("Lyft", 25.0)));
    assert!(!rule.evaluate(&transaction("Lyft", 10.0)));
}

#[test]
fn test_actions_run_in_order() {
    let rule = RuleDraft::new("tidy")
        .condition(Condition::new(ConditionField::PayeeName, ConditionOperator::Contains, "amzn"))
        .action(Action::set(ActionField::PayeeName, "Amazon"))
        .action(Action::new(ActionField::Memo, ynab_rules::ActionOperation::Append, "online"))
        .action(Action::new(ActionField::Memo, ynab_rules::ActionOperation::Prepend, "[shop]"))
        .build(&mut SeededIds::new(1))
        .unwrap();

    let out = rule.apply(&transaction("AMZN Mktp", 12.0));
    assert_eq!(out.text_or_empty("payee_name"), "Amazon");
    assert_eq!(out.text_or_empty("memo"), "[shop] online");
}

#[test]
fn test_build_uses_generator_ids() {
    let mut ids = SeededIds::new(99);
    let mut replay = ids.clone();

    let rule = RuleDraft::new("seeded").build(&mut ids).unwrap();
    assert_eq!(rule.id, replay.next_id());
}

#[test]
fn test_persisted_shape() {
    let rule = uber_rule(LogicOperator::Or);
    let json = serde_json::to_value(&rule).unwrap();

    assert_eq!(json["logic_operator"], "or");
    assert_eq!(json["enabled"], true);
    assert_eq!(json["priority"], 0);
    assert_eq!(json["conditions"][1]["operator"], "greater_than");
    assert_eq!(json["actions"][0]["operation"], "set");
    assert_eq!(json["actions"][0]["field"], "category_name");

    let back: Rule = serde_json::from_value(json).unwrap();
    assert_eq!(back, rule);
}

#[test]
fn test_unknown_logic_operator_rejected() {
    let json = r#"{"name": "x", "conditions": [], "actions": [], "logic_operator": "xor"}"#;
    assert!(Rule::from_json(json).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A rule without conditions matches nothing and changes nothing
    #[test]
    fn property_empty_conditions_never_match(
        payee in "[A-Za-z ]{0,16}",
        outflow in 0.0f64..500.0,
        or in any::<bool>(),
    ) {
        let logic = if or { LogicOperator::Or } else { LogicOperator::And };
        let rule = RuleDraft::new("no conditions")
            .logic(logic)
            .action(Action::set(ActionField::Memo, "touched"))
            .build(&mut SeededIds::new(3))
            .unwrap();

        let t = transaction(&payee, outflow);
        prop_assert!(!rule.evaluate(&t));
        prop_assert_eq!(rule.apply(&t), t);
    }
}
