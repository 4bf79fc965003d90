//! The filter mini-language, exercised through the query surface.

use crate::common::*;

fn seed_jobs(ex: &mut tidemark::Executor<tidemark::MemoryStore>) {
    // ts 10..30, state flips every entry, amount climbs by 100
    for i in 10..30i64 {
        let state = if i % 2 == 0 { "done" } else { "busy" };
        let amount = (i * 100).to_string();
        let ts = i.to_string();
        run(
            ex,
            &["jobs", "add", &ts, "state", state, "amount", &amount],
        );
    }
}

#[test]
fn equality_and_ordering() {
    let mut ex = create_executor();
    seed_jobs(&mut ex);

    assert_eq!(
        int(&run(&mut ex, &["jobs", "count", "-", "+", "FILTER", "state=done"])),
        10
    );
    assert_eq!(
        int(&run(&mut ex, &["jobs", "count", "-", "+", "FILTER", "amount>=2500"])),
        5
    );
    assert_eq!(
        int(&run(&mut ex, &["jobs", "count", "-", "+", "FILTER", "amount<1200"])),
        2
    );
}

#[test]
fn numeric_coercion_of_stored_strings() {
    let mut ex = create_executor();
    // the value arrives as a string token but compares numerically
    run(&mut ex, &["s", "add", "1", "amount", "2500"]);
    assert_eq!(
        int(&run(&mut ex, &["s", "count", "-", "+", "FILTER", "amount>999"])),
        1
    );
    // a numeric filter against a 4-digit string would fail
    // lexicographically ("2500" < "999"); numeric coercion is what makes
    // this hold
    assert_eq!(
        int(&run(&mut ex, &["s", "count", "-", "+", "FILTER", "amount<999"])),
        0
    );
}

#[test]
fn null_compares_against_absence() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", "1", "state", "done"]);
    run(&mut ex, &["s", "add", "2", "other", "1"]);

    assert_eq!(
        int(&run(&mut ex, &["s", "count", "-", "+", "FILTER", "state=null"])),
        1
    );
    assert_eq!(
        int(&run(&mut ex, &["s", "count", "-", "+", "FILTER", "state!=null"])),
        1
    );
}

#[test]
fn set_membership() {
    let mut ex = create_executor();
    for (ts, job) in [("1", "reader"), ("2", "writer"), ("3", "cleaner")] {
        run(&mut ex, &["s", "add", ts, "job", job]);
    }

    assert_eq!(
        int(&run(&mut ex, &["s", "count", "-", "+", "FILTER", "job=(reader,writer)"])),
        2
    );
    assert_eq!(
        int(&run(&mut ex, &["s", "count", "-", "+", "FILTER", "job!=(reader,writer)"])),
        1
    );
}

#[test]
fn joins_apply_in_input_order() {
    let mut ex = create_executor();
    seed_jobs(&mut ex);

    // left-fold, no precedence: (state=done OR state=busy) AND amount>=2900
    assert_eq!(
        int(&run(
            &mut ex,
            &[
                "jobs", "count", "-", "+", "FILTER", "state=done", "OR", "state=busy", "AND",
                "amount>=2900"
            ]
        )),
        1
    );
}

#[test]
fn filter_applies_before_projection() {
    let mut ex = create_executor();
    seed_jobs(&mut ex);

    // the filtered field is redacted from the output but still filterable
    let rows = array(run(
        &mut ex,
        &["jobs", "range", "-", "+", "FILTER", "state=done", "REDACT", "state"],
    ));
    assert_eq!(rows.len(), 10);
    let first = rows[0].as_array().unwrap();
    let record = first[1].as_array().unwrap();
    assert_eq!(record, &[tidemark::Reply::Str("amount".into()), tidemark::Reply::Int(1000)]);
}

#[test]
fn parse_failure_aborts_the_verb() {
    let mut ex = create_executor();
    seed_jobs(&mut ex);

    let err = ex
        .dispatch(&["jobs", "count", "-", "+", "FILTER", "state~done"])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "FILTER: unable to parse expression : state~done"
    );
}

#[test]
fn coercion_failure_degrades_to_false() {
    let mut ex = create_executor();
    run(&mut ex, &["s", "add", "1", "amount", "100"]);

    // ordering against a non-numeric literal fails the predicate, it
    // does not abort the verb
    assert_eq!(
        int(&run(&mut ex, &["s", "count", "-", "+", "FILTER", "amount>lots"])),
        0
    );
}
