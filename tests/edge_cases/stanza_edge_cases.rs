//! Edge case tests for diff output parsing

use snapdiff::parser::{parse_diff_output, split_stanzas};
use snapdiff::DiffRecord;

#[test]
fn test_crlf_output() {
    let records = parse_diff_output("spec.replicas\r\n  ± value change\r\n\r\n", "a.yaml", "s2", "\n");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].field.as_deref(), Some("spec.replicas"));
    assert_eq!(records[0].operation.as_deref(), Some("± value change"));
}

#[test]
fn test_leading_and_trailing_blank_lines() {
    let stanzas = split_stanzas("\n\n+ added new file\n\n\n");
    assert_eq!(stanzas.len(), 1);
}

#[test]
fn test_unicode_detail_preserved() {
    let output = "data.greeting\n  ± value change\n    - héllo\n    + 你好 🚀\n";
    let records = parse_diff_output(output, "i18n.yaml", "s9", "\n");
    assert_eq!(records[0].diff, "    - héllo\n    + 你好 🚀");

    let line = serde_json::to_string(&records[0]).unwrap();
    let back: DiffRecord = serde_json::from_str(&line).unwrap();
    assert_eq!(back, records[0]);
    assert!(!line.contains('\n'));
}

#[test]
fn test_record_key_order() {
    let record = DiffRecord::structured("a.yaml", "s2", "a.b", "- removed", "detail");
    let line = serde_json::to_string(&record).unwrap();
    assert_eq!(
        line,
        r#"{"file":"a.yaml","snapshot":"s2","field":"a.b","operation":"- removed","diff":"detail"}"#
    );
}

#[test]
fn test_many_stanzas() {
    let output: String = (0..50)
        .map(|i| format!("items.{}\n  + one list entry added\n\n", i))
        .collect();
    let records = parse_diff_output(&output, "list.json", "s2", "\n");
    assert_eq!(records.len(), 50);
    assert_eq!(records[49].field.as_deref(), Some("items.49"));
}

#[test]
fn test_single_line_stanza_kept_verbatim() {
    let records = parse_diff_output("  + added new file  \n", "a.yaml", "s2", "\n");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].diff, "  + added new file  ");
    assert!(!records[0].is_structured());
}
