//! Per-verb dispatch and semantics.

use crate::common::*;
use tidemark::Reply;

#[test]
fn add_then_get_with_labels() {
    let mut ex = create_executor();
    run(
        &mut ex,
        &[
            "orders",
            "add",
            "1564632000000",
            "item_id",
            "cat-987H1",
            "cust_id",
            "9A12YK2",
            "amount",
            "2500",
        ],
    );

    let reply = run(
        &mut ex,
        &[
            "orders",
            "get",
            "1564632000000",
            "LABELS",
            "item_id",
            "amount",
        ],
    );
    assert_eq!(
        reply,
        Reply::Array(vec![
            Reply::Str("amount".into()),
            Reply::Int(2500),
            Reply::Str("item_id".into()),
            Reply::Str("cat-987H1".into()),
        ])
    );
}

#[test]
fn get_with_redact_and_json_format() {
    let mut ex = create_executor();
    run(
        &mut ex,
        &["orders", "add", "7", "item_id", "x1", "amount", "3", "noise", "9"],
    );

    let reply = run(
        &mut ex,
        &["orders", "get", "7", "REDACT", "noise", "FORMAT", "json"],
    );
    assert_eq!(text(&reply), "{\"amount\":3,\"item_id\":\"x1\"}");
}

#[test]
fn add_returns_timestamp_and_overwrites() {
    let mut ex = create_executor();
    assert_eq!(run(&mut ex, &["s", "add", "1000", "value", "20"]), Reply::Int(1000));
    run(&mut ex, &["s", "add", "1000", "value", "20"]);

    // the second add overwrote the first entry
    assert_eq!(int(&run(&mut ex, &["s", "size"])), 1);
}

#[test]
fn incrby_reports_new_values_stringified() {
    let mut ex = create_executor();
    run(&mut ex, &["jobs", "add", "1000", "active", "1", "failed", "4"]);

    let reply = run(
        &mut ex,
        &["jobs", "incrBy", "1000", "active", "2.5", "failed", "1.5"],
    );
    assert_eq!(
        reply,
        Reply::Array(vec![Reply::Str("3.5".into()), Reply::Str("5.5".into())])
    );

    // stored values reflect the increments
    let record = run(&mut ex, &["jobs", "get", "1000"]);
    assert_eq!(
        record,
        Reply::Array(vec![
            Reply::Str("active".into()),
            Reply::Str("3.5".into()),
            Reply::Str("failed".into()),
            Reply::Str("5.5".into()),
        ])
    );
}

#[test]
fn incrby_creates_missing_entries_and_fields() {
    let mut ex = create_executor();
    let reply = run(&mut ex, &["jobs", "incrBy", "5", "active", "2"]);
    assert_eq!(reply, Reply::Array(vec![Reply::Int(2)]));
    assert_eq!(int(&run(&mut ex, &["jobs", "exists", "5"])), 1);
}

#[test]
fn incrby_against_a_string_is_a_type_error() {
    let mut ex = create_executor();
    run(&mut ex, &["jobs", "add", "1", "state", "done"]);
    let err = ex.dispatch(&["jobs", "incrBy", "1", "state", "1"]).unwrap_err();
    assert_eq!(err.to_string(), "incrBy: field state is not a number");
}

#[test]
fn set_merges_fields() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", "10", "a", "1", "b", "2"]);
    assert_eq!(run(&mut ex, &["s", "set", "10", "b", "9", "c", "3"]), Reply::Str("OK".into()));

    let record = run(&mut ex, &["s", "get", "10"]);
    assert_eq!(
        record,
        Reply::Array(vec![
            Reply::Str("a".into()),
            Reply::Int(1),
            Reply::Str("b".into()),
            Reply::Int(9),
            Reply::Str("c".into()),
            Reply::Int(3),
        ])
    );

    // setting a field to null drops it
    run(&mut ex, &["s", "set", "10", "a", "null"]);
    let record = run(&mut ex, &["s", "get", "10"]);
    assert_eq!(array(record).len(), 4);
}

#[test]
fn del_counts_removed_entries() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", "1", "v", "1"]);
    run(&mut ex, &["s", "add", "2", "v", "2"]);

    assert_eq!(int(&run(&mut ex, &["s", "del", "1", "2", "3"])), 2);
    assert_eq!(int(&run(&mut ex, &["s", "size"])), 0);
}

#[test]
fn get_and_pop_on_missing_points_return_nil() {
    let mut ex = create_executor();
    assert_eq!(run(&mut ex, &["s", "get", "404"]), Reply::Nil);
    assert_eq!(run(&mut ex, &["s", "pop", "404"]), Reply::Nil);
}

#[test]
fn pop_removes_after_materializing() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", "10", "v", "1"]);

    let reply = run(&mut ex, &["s", "pop", "10"]);
    assert_eq!(reply, Reply::Array(vec![Reply::Str("v".into()), Reply::Int(1)]));
    assert_eq!(int(&run(&mut ex, &["s", "exists", "10"])), 0);
}

#[test]
fn exists_replies_zero_or_one() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", "10", "v", "1"]);
    assert_eq!(int(&run(&mut ex, &["s", "exists", "10"])), 1);
    assert_eq!(int(&run(&mut ex, &["s", "exists", "11"])), 0);
}

#[test]
fn span_and_times() {
    let mut ex = create_executor();
    assert_eq!(run(&mut ex, &["s", "span"]), Reply::Array(vec![]));

    for ts in ["15", "13", "47"] {
        run(&mut ex, &["s", "add", ts, "v", "1"]);
    }
    assert_eq!(
        run(&mut ex, &["s", "span"]),
        Reply::Array(vec![Reply::Int(13), Reply::Int(47)])
    );
    assert_eq!(
        run(&mut ex, &["s", "times", "14", "47"]),
        Reply::Array(vec![Reply::Int(15), Reply::Int(47)])
    );
}

#[test]
fn range_lists_entries_in_timestamp_order() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", "20", "v", "2"]);
    run(&mut ex, &["s", "add", "10", "v", "1"]);

    let rows = array(run(&mut ex, &["s", "range", "-", "+"]));
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        Reply::Array(vec![
            Reply::Int(10),
            Reply::Array(vec![Reply::Str("v".into()), Reply::Int(1)])
        ])
    );
}

#[test]
fn range_limit_paginates() {
    let mut ex = create_executor();
    for i in 0..10 {
        run(&mut ex, &["s", "add", &i.to_string(), "v", &i.to_string()]);
    }
    let rows = array(run(&mut ex, &["s", "range", "-", "+", "LIMIT", "3", "2"]));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].as_array().unwrap()[0], Reply::Int(3));

    // negative count means everything remaining
    let rest = array(run(&mut ex, &["s", "range", "-", "+", "LIMIT", "8", "-1"]));
    assert_eq!(rest.len(), 2);
}

#[test]
fn poprange_consumes_what_it_returns() {
    let mut ex = create_executor();
    for i in 0..5 {
        run(&mut ex, &["s", "add", &i.to_string(), "v", &i.to_string()]);
    }
    let rows = array(run(&mut ex, &["s", "poprange", "1", "3"]));
    assert_eq!(rows.len(), 3);
    assert_eq!(int(&run(&mut ex, &["s", "size"])), 2);
    assert_eq!(
        run(&mut ex, &["s", "times", "-", "+"]),
        Reply::Array(vec![Reply::Int(0), Reply::Int(4)])
    );
}

#[test]
fn remrange_fast_path_and_filtered() {
    let mut ex = create_executor();
    for i in 0..6 {
        let state = if i % 2 == 0 { "done" } else { "busy" };
        run(&mut ex, &["s", "add", &i.to_string(), "state", state]);
    }

    // filtered removal targets exactly the matching keys
    assert_eq!(
        int(&run(&mut ex, &["s", "remrange", "-", "+", "FILTER", "state=busy"])),
        3
    );
    assert_eq!(int(&run(&mut ex, &["s", "size"])), 3);

    // fast path removes the whole bound pair in one call
    assert_eq!(int(&run(&mut ex, &["s", "remrange", "0", "2"])), 2);
    assert_eq!(int(&run(&mut ex, &["s", "size"])), 1);
}

#[test]
fn star_bound_uses_the_injected_clock() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", &TEST_NOW.to_string(), "v", "1"]);
    run(&mut ex, &["s", "add", &(TEST_NOW + 10).to_string(), "v", "2"]);

    // `*` resolves to the pinned second, so only the first entry is in
    let rows = array(run(&mut ex, &["s", "range", "-", "*"]));
    assert_eq!(rows.len(), 1);
}

#[test]
fn unknown_command_diagnostic() {
    let mut ex = create_executor();
    let err = ex.dispatch(&["s", "frobnicate"]).unwrap_err();
    assert_eq!(err.to_string(), "Timeseries: unknown command frobnicate");
}

#[test]
fn option_errors_surface_verbatim() {
    let mut ex = create_executor();
    let err = ex
        .dispatch(&["s", "range", "-", "+", "LIMIT", "x", "2"])
        .unwrap_err();
    assert_eq!(err.to_string(), "LIMIT: offset value must be a number");

    let err = ex
        .dispatch(&["s", "range", "-", "+", "FORMAT", "xml"])
        .unwrap_err();
    assert_eq!(err.to_string(), "FORMAT: unknown format xml");
}

#[test]
fn failed_destructive_verbs_leave_the_store_unchanged() {
    let mut ex = create_executor();
    for i in 0..4 {
        run(&mut ex, &["s", "add", &i.to_string(), "v", "1"]);
    }
    // parse failure happens before any deletion
    assert!(ex
        .dispatch(&["s", "poprange", "-", "+", "FILTER", "v~1"])
        .is_err());
    assert_eq!(int(&run(&mut ex, &["s", "size"])), 4);
}
