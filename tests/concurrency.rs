//! Exercises the mutable handle (`TableMut`/`SetMut`) across threads: two
//! independent cells written concurrently, and a single shared cell read
//! concurrently with a writer, in the style of the teacher's own
//! `tests/concurrency.rs`.

use std::sync::Arc;

use prefixtrie::{Prefix, SetMut, TableMut};

mod common {
    pub fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }
}

fn p(addr: u32, len: u8) -> Prefix<u32> {
    Prefix::new(addr, len).unwrap()
}

/// Two independent mutable handles, each hammered by its own thread, must
/// not observe each other's writes: a `Handle`'s cell is only shared when
/// `share()` is called explicitly.
#[test]
fn independent_handles_stay_independent_under_load() {
    common::init();

    const COUNT: u32 = 10_000;

    let left: TableMut<u32, u32> = TableMut::new();
    let right: TableMut<u32, u32> = TableMut::new();

    let left_writer = {
        let left = left.share();
        std::thread::Builder::new()
            .name("left-writer".into())
            .spawn(move || {
                for i in 0..COUNT {
                    // 10.0.0.0/8 host addresses, one /32 per value.
                    assert!(left.insert(p(0x0a00_0000 + i, 32), i));
                }
            })
            .unwrap()
    };
    let right_writer = {
        let right = right.share();
        std::thread::Builder::new()
            .name("right-writer".into())
            .spawn(move || {
                for i in 0..COUNT {
                    // 11.0.0.0/8 host addresses, disjoint from the left side.
                    assert!(right.insert(p(0x0b00_0000 + i, 32), i));
                }
            })
            .unwrap()
    };

    left_writer.join().unwrap();
    right_writer.join().unwrap();

    assert_eq!(left.size() as u32, COUNT);
    assert_eq!(right.size() as u32, COUNT);

    let combined = left.freeze().collect().len() + right.freeze().collect().len();
    assert_eq!(combined as u32, COUNT * 2);
}

/// A single writer thread and several reader threads share one cell. Readers
/// only ever `load`/`freeze`/`get`, never `mutate`, so they can run alongside
/// the writer without tripping the single-writer CAS contract.
#[test]
fn readers_observe_a_consistent_snapshot_while_a_writer_runs() {
    common::init();

    const COUNT: u32 = 5_000;

    let table: TableMut<u32, u32> = TableMut::new();

    let writer = {
        let table = table.share();
        std::thread::Builder::new()
            .name("writer".into())
            .spawn(move || {
                for i in 0..COUNT {
                    table.insert(p(0x0a00_0000 + i, 32), i);
                }
            })
            .unwrap()
    };

    let readers: Vec<_> = (0..4)
        .map(|n| {
            let table = table.share();
            std::thread::Builder::new()
                .name(format!("reader-{n}"))
                .spawn(move || {
                    // Every snapshot taken mid-write is internally consistent:
                    // whatever prefixes it holds all carry their matching value.
                    for _ in 0..200 {
                        let snapshot = table.freeze();
                        for (prefix, value) in snapshot.collect() {
                            assert_eq!(prefix.address() - 0x0a00_0000, value);
                        }
                    }
                })
                .unwrap()
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(table.size() as u32, COUNT);
}

/// Two disjoint `SetMut` cells, unioned after the fact: the classic
/// "build two halves in parallel, merge" pattern the set algebra exists for.
#[test]
fn disjoint_sets_built_concurrently_union_cleanly() {
    common::init();

    const COUNT: u32 = 2_000;

    let evens: SetMut<u32> = SetMut::new();
    let odds: SetMut<u32> = SetMut::new();

    let evens_writer = {
        let evens = evens.share();
        std::thread::Builder::new()
            .name("evens".into())
            .spawn(move || {
                for i in 0..COUNT {
                    evens.insert(p(2 * i, 32));
                }
            })
            .unwrap()
    };
    let odds_writer = {
        let odds = odds.share();
        std::thread::Builder::new()
            .name("odds".into())
            .spawn(move || {
                for i in 0..COUNT {
                    odds.insert(p(2 * i + 1, 32));
                }
            })
            .unwrap()
    };

    evens_writer.join().unwrap();
    odds_writer.join().unwrap();

    let union = evens.freeze().union(&odds.freeze());
    assert_eq!(union.size() as u32, COUNT * 2);
    for i in 0..COUNT {
        assert!(union.contains(&p(i, 32)));
    }
}

/// A handle wrapped in `Arc` can be handed to threads without `share()` per
/// se; `share()` itself just clones the `Arc` cell reference, so this checks
/// the handle types are actually `Send + Sync` across an ordinary `Arc`.
#[test]
fn handle_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TableMut<u32, u32>>();
    assert_send_sync::<SetMut<u32>>();

    let table = Arc::new(TableMut::<u32, u32>::new());
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let table = Arc::clone(&table);
            std::thread::Builder::new()
                .name(format!("arc-writer-{n}"))
                .spawn(move || {
                    table.insert(p(n, 32), n);
                })
                .unwrap()
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(table.size(), 8);
}
