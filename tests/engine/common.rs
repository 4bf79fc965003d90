//! Common test utilities for engine tests.

use tidemark::{Executor, MemoryStore, Reply};

/// The second the pinned test clock reports for the `*` bound token.
pub const TEST_NOW: i64 = 1488823384;

fn pinned_clock() -> i64 {
    TEST_NOW
}

/// Create an executor over a fresh in-memory store with a pinned clock.
pub fn create_executor() -> Executor<MemoryStore> {
    Executor::with_clock(MemoryStore::new(), pinned_clock)
}

/// Dispatch, panicking on error (for steps that must succeed).
pub fn run(ex: &mut Executor<MemoryStore>, argv: &[&str]) -> Reply {
    match ex.dispatch(argv) {
        Ok(reply) => reply,
        Err(e) => panic!("dispatch {argv:?} failed: {e}"),
    }
}

/// Extract an integer reply.
#[allow(dead_code)]
pub fn int(reply: &Reply) -> i64 {
    match reply {
        Reply::Int(i) => *i,
        _ => panic!("Expected Reply::Int, got {reply:?}"),
    }
}

/// Extract a sequence reply.
#[allow(dead_code)]
pub fn array(reply: Reply) -> Vec<Reply> {
    match reply {
        Reply::Array(items) => items,
        _ => panic!("Expected Reply::Array, got {reply:?}"),
    }
}

/// Extract a string reply.
#[allow(dead_code)]
pub fn text(reply: &Reply) -> &str {
    match reply {
        Reply::Str(s) => s,
        _ => panic!("Expected Reply::Str, got {reply:?}"),
    }
}

/// Seed the spec's reference table: `v(i) = (i/10)*100 + table[i mod 10]`
/// for `i` in `[10, 50)`, stored under field `value`.
#[allow(dead_code)]
pub fn seed_table(ex: &mut Executor<MemoryStore>, key: &str) {
    const TABLE: [i64; 10] = [31, 41, 59, 26, 53, 58, 97, 93, 23, 84];
    for i in 10..50i64 {
        let v = (i / 10) * 100 + TABLE[(i % 10) as usize];
        run(ex, &[key, "add", &i.to_string(), "value", &v.to_string()]);
    }
}
