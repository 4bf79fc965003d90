//! Tumbling-window aggregation through the query surface.

use crate::common::*;
use tidemark::Reply;

/// Pull `bucket[field][kind]` out of a native aggregated reply row.
fn kind_value(row: &Reply, field: &str, kind: &str) -> Reply {
    let row = row.as_array().expect("bucket row");
    let fields = row[1].as_array().expect("field pairs");
    let mut i = 0;
    while i < fields.len() {
        if fields[i].as_str() == Some(field) {
            let kinds = fields[i + 1].as_array().expect("kind pairs");
            let mut j = 0;
            while j < kinds.len() {
                if kinds[j].as_str() == Some(kind) {
                    return kinds[j + 1].clone();
                }
                j += 2;
            }
        }
        i += 2;
    }
    panic!("missing {field}/{kind} in {row:?}");
}

fn bucket_ts(row: &Reply) -> i64 {
    match row.as_array().expect("bucket row")[0] {
        Reply::Int(ts) => ts,
        ref other => panic!("Expected Int bucket ts, got {other:?}"),
    }
}

#[test]
fn avg_per_ten_unit_bucket() {
    let mut ex = create_executor();
    seed_table(&mut ex, "m");

    let rows = array(run(
        &mut ex,
        &["m", "range", "10", "50", "AGGREGATION", "10", "avg(value)"],
    ));
    assert_eq!(rows.len(), 4);
    let expected = [(10, "156.5"), (20, "256.5"), (30, "356.5"), (40, "456.5")];
    for (row, (ts, avg)) in rows.iter().zip(expected) {
        assert_eq!(bucket_ts(row), ts);
        assert_eq!(kind_value(row, "value", "avg"), Reply::Str(avg.into()));
    }
}

#[test]
fn count_sum_min_and_spread_per_bucket() {
    let mut ex = create_executor();
    seed_table(&mut ex, "m");

    let rows = array(run(
        &mut ex,
        &[
            "m",
            "range",
            "10",
            "50",
            "AGGREGATION",
            "10",
            "count(value)",
            "sum(value)",
            "min(value)",
            "range(value)",
        ],
    ));
    assert_eq!(rows.len(), 4);

    let sums = [1565, 2565, 3565, 4565];
    let mins = [123, 223, 323, 423];
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(kind_value(row, "value", "count"), Reply::Int(10));
        assert_eq!(kind_value(row, "value", "sum"), Reply::Int(sums[i]));
        assert_eq!(kind_value(row, "value", "min"), Reply::Int(mins[i]));
        assert_eq!(kind_value(row, "value", "range"), Reply::Int(74));
    }
}

#[test]
fn legacy_syntax_matches_functional_syntax() {
    let mut ex = create_executor();
    seed_table(&mut ex, "m");

    let legacy = run(
        &mut ex,
        &["m", "range", "10", "50", "AGGREGATION", "count", "10"],
    );
    let functional = run(
        &mut ex,
        &["m", "range", "10", "50", "AGGREGATION", "10", "count(value)"],
    );
    assert_eq!(legacy, functional);
}

#[test]
fn wide_buckets_align_to_bucket_width() {
    let mut ex = create_executor();
    let base = 1488823384i64;
    for i in 0..1500 {
        run(&mut ex, &["m", "add", &(base + i).to_string(), "value", "7"]);
    }

    let rows = array(run(
        &mut ex,
        &["m", "range", "-", "+", "AGGREGATION", "500", "count(value)"],
    ));
    let got: Vec<(i64, Reply)> = rows
        .iter()
        .map(|row| (bucket_ts(row), kind_value(row, "value", "count")))
        .collect();
    assert_eq!(
        got,
        vec![
            (1488823000, Reply::Int(116)),
            (1488823500, Reply::Int(500)),
            (1488824000, Reply::Int(500)),
            (1488824500, Reply::Int(384)),
        ]
    );
}

#[test]
fn distinct_yields_sorted_unique_values() {
    let mut ex = create_executor();
    let states = ["idle", "busy", "done"];
    let jobs = ["reader", "writer", "cleaner", "mapper"];
    for i in 0..20i64 {
        run(
            &mut ex,
            &[
                "m",
                "add",
                &(10 + i).to_string(),
                "state",
                states[(i % 3) as usize],
                "job",
                jobs[(i % 4) as usize],
            ],
        );
    }

    let rows = array(run(
        &mut ex,
        &["m", "range", "10", "29", "AGGREGATION", "10", "distinct(job)"],
    ));
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(
            kind_value(row, "job", "distinct"),
            Reply::Array(vec![
                Reply::Str("cleaner".into()),
                Reply::Str("mapper".into()),
                Reply::Str("reader".into()),
                Reply::Str("writer".into()),
            ])
        );
    }
}

#[test]
fn count_distinct_maps_values_to_frequencies() {
    let mut ex = create_executor();
    let jobs = ["reader", "writer", "reader", "reader"];
    for (i, job) in jobs.iter().enumerate() {
        run(&mut ex, &["m", "add", &(10 + i as i64).to_string(), "job", job]);
    }

    let rows = array(run(
        &mut ex,
        &["m", "range", "-", "+", "AGGREGATION", "10", "count_distinct(job)"],
    ));
    assert_eq!(
        kind_value(&rows[0], "job", "count_distinct"),
        Reply::Array(vec![
            Reply::Str("reader".into()),
            Reply::Int(3),
            Reply::Str("writer".into()),
            Reply::Int(1),
        ])
    );
}

#[test]
fn stats_shape_in_json() {
    let mut ex = create_executor();
    for (ts, v) in [("10", "2"), ("11", "4"), ("12", "9")] {
        run(&mut ex, &["m", "add", ts, "value", v]);
    }

    let reply = run(
        &mut ex,
        &[
            "m", "range", "-", "+", "AGGREGATION", "10", "stats(value)", "FORMAT", "json",
        ],
    );
    let parsed: serde_json::Value = serde_json::from_str(text(&reply)).unwrap();
    let stats = &parsed[0][1]["value"]["stats"];
    assert_eq!(stats["count"], serde_json::json!(3));
    assert_eq!(stats["sum"], serde_json::json!(15));
    assert_eq!(stats["min"], serde_json::json!(2));
    assert_eq!(stats["max"], serde_json::json!(9));
    assert_eq!(stats["mean"], serde_json::json!(5));
    let std = stats["std"].as_f64().unwrap();
    assert!((std - (13.0f64).sqrt()).abs() < 1e-12);
}

#[test]
fn first_and_last_differ_on_nulls() {
    let mut ex = create_executor();
    run(&mut ex, &["m", "add", "10", "other", "1"]);
    run(&mut ex, &["m", "add", "11", "job", "reader"]);
    run(&mut ex, &["m", "add", "12", "other", "2"]);

    let rows = array(run(
        &mut ex,
        &["m", "range", "-", "+", "AGGREGATION", "10", "first(job)", "last(job)"],
    ));
    assert_eq!(
        kind_value(&rows[0], "job", "first"),
        Reply::Str("reader".into())
    );
    // the final point has no job field, and last accepts nulls
    assert_eq!(kind_value(&rows[0], "job", "last"), Reply::Nil);
}

#[test]
fn aggregated_revrange_reverses_buckets() {
    let mut ex = create_executor();
    seed_table(&mut ex, "m");

    let forward = array(run(
        &mut ex,
        &["m", "range", "10", "50", "AGGREGATION", "10", "count(value)"],
    ));
    let backward = array(run(
        &mut ex,
        &["m", "revrange", "10", "50", "AGGREGATION", "10", "count(value)"],
    ));
    let mut reversed = backward;
    reversed.reverse();
    assert_eq!(forward, reversed);
}

#[test]
fn aggregation_over_filtered_entries() {
    let mut ex = create_executor();
    seed_table(&mut ex, "m");

    let rows = array(run(
        &mut ex,
        &[
            "m", "range", "10", "50", "FILTER", "value>=200", "AGGREGATION", "10",
            "count(value)",
        ],
    ));
    // bucket 10 is filtered out entirely
    assert_eq!(rows.len(), 3);
    assert_eq!(bucket_ts(&rows[0]), 20);
}

#[test]
fn rate_is_count_over_bucket_width() {
    let mut ex = create_executor();
    for i in 0..5i64 {
        run(&mut ex, &["m", "add", &(10 + i).to_string(), "value", "1"]);
    }
    let rows = array(run(
        &mut ex,
        &["m", "range", "-", "+", "AGGREGATION", "10", "rate(value)"],
    ));
    assert_eq!(kind_value(&rows[0], "value", "rate"), Reply::Str("0.5".into()));
}
