use proptest::prelude::*;
use ynab_rules::{Condition, ConditionField, ConditionOperator, FieldValue, TransactionRecord};

fn record(pairs: &[(&str, FieldValue)]) -> TransactionRecord {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn arb_field() -> impl Strategy<Value = ConditionField> {
    prop::sample::select(ConditionField::ALL.to_vec())
}

fn arb_operator() -> impl Strategy<Value = ConditionOperator> {
    prop::sample::select(ConditionOperator::ALL.to_vec())
}

#[test]
fn test_string_operators_ignore_case() {
    let t = record(&[("payee_name", "UBER *TRIP".into())]);

    assert!(Condition::new(ConditionField::PayeeName, ConditionOperator::Contains, "uber").evaluate(&t));
    assert!(Condition::new(ConditionField::PayeeName, ConditionOperator::StartsWith, "Uber").evaluate(&t));
    assert!(Condition::new(ConditionField::PayeeName, ConditionOperator::EndsWith, "trip").evaluate(&t));
    assert!(Condition::new(ConditionField::PayeeName, ConditionOperator::Equals, "uber *trip").evaluate(&t));
    assert!(!Condition::new(ConditionField::PayeeName, ConditionOperator::Equals, "uber").evaluate(&t));
}

#[test]
fn test_numeric_comparisons() {
    let t = record(&[("outflow", FieldValue::Number(150.0)), ("inflow", "12.5".into())]);

    assert!(Condition::new(ConditionField::Outflow, ConditionOperator::GreaterThan, "100").evaluate(&t));
    assert!(!Condition::new(ConditionField::Outflow, ConditionOperator::LessThan, "100").evaluate(&t));
    assert!(Condition::new(ConditionField::Inflow, ConditionOperator::LessThan, "13").evaluate(&t));
    assert!(!Condition::new(ConditionField::Outflow, ConditionOperator::GreaterThan, "150").evaluate(&t));
}

#[test]
fn test_non_numeric_comparison_is_false() {
    let t = record(&[("outflow", "abc".into())]);
    assert!(!Condition::new(ConditionField::Outflow, ConditionOperator::GreaterThan, "100").evaluate(&t));

    let t = record(&[("outflow", FieldValue::Number(150.0))]);
    assert!(!Condition::new(ConditionField::Outflow, ConditionOperator::GreaterThan, "lots").evaluate(&t));
}

#[test]
fn test_regex_is_case_insensitive() {
    let t = record(&[("memo", "Invoice #4411".into())]);

    assert!(Condition::new(ConditionField::Memo, ConditionOperator::Regex, r"^invoice #\d+$").evaluate(&t));
    assert!(!Condition::new(ConditionField::Memo, ConditionOperator::Regex, r"^receipt").evaluate(&t));
}

#[test]
fn test_invalid_regex_is_false() {
    let t = record(&[("memo", "anything".into())]);
    assert!(!Condition::new(ConditionField::Memo, ConditionOperator::Regex, "([unclosed").evaluate(&t));
}

#[test]
fn test_null_field_counts_as_absent() {
    let t = record(&[("memo", FieldValue::Null)]);
    assert!(!Condition::new(ConditionField::Memo, ConditionOperator::Contains, "").evaluate(&t));
}

#[test]
fn test_parse_rejects_unknown_names() {
    assert!(Condition::parse("payee_name", "contains", "x").is_ok());
    assert!(Condition::parse("payee", "contains", "x").is_err());
    assert!(Condition::parse("payee_name", "like", "x").is_err());
}

#[test]
fn test_serialized_shape() {
    let condition = Condition::new(ConditionField::PayeeName, ConditionOperator::StartsWith, "Amz");
    let json = serde_json::to_value(&condition).unwrap();

    assert_eq!(
        json,
        serde_json::json!({"field": "payee_name", "operator": "starts_with", "value": "Amz"})
    );

    let back: Condition = serde_json::from_value(json).unwrap();
    assert_eq!(back, condition);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// An absent field never satisfies any condition
    #[test]
    fn property_absent_field_never_matches(
        field in arb_field(),
        operator in arb_operator(),
        value in ".{0,12}",
    ) {
        let condition = Condition::new(field, operator, value);
        prop_assert!(!condition.evaluate(&TransactionRecord::new()));
    }

    /// String comparisons agree regardless of letter case on either side
    #[test]
    fn property_contains_ignores_case(
        prefix in "[a-z ]{0,6}",
        needle in "[a-z]{1,6}",
        suffix in "[a-z ]{0,6}",
    ) {
        let payee = format!("{}{}{}", prefix, needle.to_uppercase(), suffix);
        let t = record(&[("payee_name", payee.into())]);
        let condition = Condition::new(ConditionField::PayeeName, ConditionOperator::Contains, needle);

        prop_assert!(condition.evaluate(&t));
    }

    /// Non-numeric text never satisfies a numeric comparison
    #[test]
    fn property_non_numeric_never_compares(
        text in "[g-m]{1,8}",
        threshold in -1000.0f64..1000.0,
    ) {
        let t = record(&[("outflow", text.into())]);
        for operator in [ConditionOperator::GreaterThan, ConditionOperator::LessThan] {
            let condition = Condition::new(ConditionField::Outflow, operator, threshold.to_string());
            prop_assert!(!condition.evaluate(&t));
        }
    }

    /// Numeric comparisons follow f64 ordering
    #[test]
    fn property_greater_than_matches_ordering(
        amount in -10_000.0f64..10_000.0,
        threshold in -10_000.0f64..10_000.0,
    ) {
        let t = record(&[("outflow", FieldValue::Number(amount))]);
        let condition = Condition::new(ConditionField::Outflow, ConditionOperator::GreaterThan, threshold.to_string());

        prop_assert_eq!(condition.evaluate(&t), amount > threshold);
    }
}
