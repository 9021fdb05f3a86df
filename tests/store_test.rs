use std::fs;
use tempfile::tempdir;
use ynab_rules::{
    Action, ActionField, Condition, ConditionField, ConditionOperator, JsonFileStore, RuleDraft,
    RuleStore, SeededIds, StoreError,
};

fn sample(ids: &mut SeededIds, name: &str, priority: i64) -> ynab_rules::Rule {
    RuleDraft::new(name)
        .priority(priority)
        .condition(Condition::new(ConditionField::PayeeName, ConditionOperator::Contains, name))
        .action(Action::set(ActionField::CategoryName, "Misc"))
        .build(ids)
        .unwrap()
}

#[test]
fn test_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("rules.json"));

    assert!(store.get_all_rules().is_empty());
    assert!(store.try_get_all_rules().unwrap().is_empty());
}

#[test]
fn test_save_creates_file_and_parent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("rules.json");
    let mut store = JsonFileStore::new(&path);
    let rule = sample(&mut SeededIds::new(1), "uber", 10);

    assert!(store.save_rule(&rule));
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.get_all_rules(), vec![rule]);
}

#[test]
fn test_save_existing_id_replaces_in_place() {
    let dir = tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("rules.json"));
    let mut ids = SeededIds::new(2);
    let a = sample(&mut ids, "a", 1);
    let b = sample(&mut ids, "b", 2);

    assert!(store.save_rule(&a));
    assert!(store.save_rule(&b));

    let edited = a.revise(a.to_draft().priority(50)).unwrap();
    assert!(store.save_rule(&edited));

    let all = store.get_all_rules();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, a.id);
    assert_eq!(all[0].priority, 50);
    assert_eq!(all[1], b);
}

#[test]
fn test_delete_reports_presence() {
    let dir = tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("rules.json"));
    let rule = sample(&mut SeededIds::new(3), "gym", 0);

    assert!(!store.delete_rule(&rule.id));
    assert!(store.save_rule(&rule));
    assert!(store.delete_rule(&rule.id));
    assert!(store.get_rule_by_id(&rule.id).is_none());
    assert!(!store.delete_rule(&rule.id));
}

#[test]
fn test_corrupt_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(&path, "{not json").unwrap();
    let store = JsonFileStore::new(&path);

    assert!(store.get_all_rules().is_empty());
    assert!(matches!(store.try_get_all_rules(), Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_save_over_corrupt_file_fails_and_keeps_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(&path, "[{\"name\": 1}]").unwrap();
    let mut store = JsonFileStore::new(&path);
    let rule = sample(&mut SeededIds::new(4), "rent", 0);

    assert!(!store.save_rule(&rule));
    assert!(!store.delete_rule("anything"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"name\": 1}]");
}

#[test]
fn test_one_bad_record_blocks_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    let mut store = JsonFileStore::new(&path);
    let mut ids = SeededIds::new(8);
    let rules: Vec<_> = ["a", "b", "c"].iter().map(|n| sample(&mut ids, n, 0)).collect();
    for rule in &rules {
        assert!(store.save_rule(rule));
    }

    // Hand edit with a misspelled operator in one rule
    let edited = fs::read_to_string(&path).unwrap().replacen("\"contains\"", "\"contain\"", 1);
    fs::write(&path, &edited).unwrap();

    let extra = sample(&mut ids, "d", 0);
    assert!(!store.save_rule(&extra));
    assert!(!store.delete_rule(&rules[1].id));
    assert!(matches!(store.try_save_rule(&extra), Err(StoreError::Corrupt { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), edited);
}

#[test]
fn test_rules_path_is_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    fs::create_dir(&path).unwrap();
    let mut store = JsonFileStore::new(&path);
    let rule = sample(&mut SeededIds::new(9), "gym", 0);

    assert!(store.get_all_rules().is_empty());
    assert!(matches!(store.try_get_all_rules(), Err(StoreError::Io { .. })));
    assert!(!store.save_rule(&rule));
    assert!(!store.delete_rule(&rule.id));
    assert!(path.is_dir());
}

#[test]
fn test_failed_write_reports_false() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    let mut store = JsonFileStore::new(&path);
    let mut ids = SeededIds::new(10);
    let kept = sample(&mut ids, "kept", 0);
    assert!(store.save_rule(&kept));
    let before = fs::read_to_string(&path).unwrap();

    // Block the staging file so the write itself fails
    fs::create_dir(path.with_extension("json.tmp")).unwrap();

    assert!(!store.save_rule(&sample(&mut ids, "new", 0)));
    assert!(!store.delete_rule(&kept.id));
    assert!(matches!(store.try_delete_rule(&kept.id), Err(StoreError::Io { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.get_all_rules(), vec![kept]);
}

#[test]
fn test_unknown_operation_in_file_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(
        &path,
        r#"[{"id": "r1", "name": "bad", "conditions": [],
             "actions": [{"field": "memo", "operation": "shout", "value": "x"}]}]"#,
    )
    .unwrap();
    let store = JsonFileStore::new(&path);

    assert!(store.get_all_rules().is_empty());
    assert!(store.get_rule_by_id("r1").is_none());
}

#[test]
fn test_decoding_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(
        &path,
        r#"[{"name": "minimal",
             "conditions": [{"field": "memo", "operator": "contains", "value": "x"}],
             "actions": [{"field": "memo", "operation": "clear"}]}]"#,
    )
    .unwrap();

    let rules = JsonFileStore::new(&path).get_all_rules();
    assert_eq!(rules.len(), 1);
    assert!(rules[0].enabled);
    assert!(!rules[0].id.is_empty());
    assert_eq!(rules[0].description, "");
}
