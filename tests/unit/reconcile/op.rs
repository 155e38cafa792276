use super::*;
use serde_json::json;

#[test]
fn ops_use_op_tag() {
    let ops: Vec<HostOp> = serde_json::from_value(json!([
        {"op": "begin_commit"},
        {"op": "create", "key": 1, "variant": "root", "props": {"type": "root"}},
        {"op": "create", "key": 2, "variant": "box", "props": {"type": "box"}},
        {"op": "append", "parent": 1, "child": 2},
        {"op": "attach_root", "key": 1},
        {"op": "end_commit"},
    ]))
    .expect("parse");
    assert_eq!(ops.len(), 6);
    assert_eq!(
        ops[3],
        HostOp::Append {
            parent: ElementKey(1),
            child: ElementKey(2)
        }
    );
    assert_eq!(ops[4].name(), "attach_root");

    let detach: HostOp = serde_json::from_value(json!({"op": "attach_root"})).expect("parse");
    assert_eq!(detach, HostOp::AttachRoot { key: None });
}

#[test]
fn unknown_op_is_a_serde_error() {
    let err = serde_json::from_value::<HostOp>(json!({"op": "explode"})).unwrap_err();
    assert!(err.to_string().contains("explode"));
}

#[test]
fn commit_count_tracks_outer_boundaries() {
    let log = OpLog {
        ops: vec![
            HostOp::BeginCommit,
            HostOp::BeginCommit,
            HostOp::EndCommit,
            HostOp::EndCommit,
            HostOp::BeginCommit,
            HostOp::Clear,
            HostOp::EndCommit,
        ],
    };
    assert_eq!(log.commit_count(), 2);
}

#[test]
fn missing_file_carries_path_context() {
    let err = OpLog::from_path("/nonexistent/ops.json").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/ops.json"));
}

#[test]
fn reader_round_trips() {
    let log = OpLog {
        ops: vec![HostOp::BeginCommit, HostOp::EndCommit],
    };
    let text = serde_json::to_string(&log).expect("serialize");
    assert_eq!(text, r#"[{"op":"begin_commit"},{"op":"end_commit"}]"#);
    assert_eq!(OpLog::from_reader(text.as_bytes()).expect("parse"), log);
}
