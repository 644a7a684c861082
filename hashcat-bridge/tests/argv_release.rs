// Deallocation tracking for argument vector release
//
// Every test runs under a dhat testing profiler, one at a time, and compares
// live heap blocks before and after the release.

use hashcat_bridge::{hashcat_bridge_free_argv, Argv};
use std::mem::size_of;
use std::os::raw::c_char;

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

/// Live blocks and bytes freed by `f`, which must not allocate
fn freed_by(f: impl FnOnce()) -> (usize, usize) {
    let before = dhat::HeapStats::get();
    f();
    let after = dhat::HeapStats::get();

    assert_eq!(after.total_blocks, before.total_blocks, "release allocated");
    (
        before.curr_blocks - after.curr_blocks,
        before.curr_bytes - after.curr_bytes,
    )
}

fn slot() -> usize {
    size_of::<*mut c_char>()
}

#[test]
#[serial_test::serial]
fn releases_each_entry_then_the_table() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let (argc, raw) = Argv::new(["a", "bb", "ccc"]).unwrap().into_raw();
    assert_eq!(argc, 3);

    let (blocks, bytes) = freed_by(|| unsafe { hashcat_bridge_free_argv(argc, raw) });

    // "a\0", "bb\0", "ccc\0", then four table slots including the terminator.
    assert_eq!(blocks, 3 + 1);
    assert_eq!(bytes, 2 + 3 + 4 + 4 * slot());
}

#[test]
#[serial_test::serial]
fn empty_vector_releases_only_the_table() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let (argc, raw) = Argv::new(Vec::<String>::new()).unwrap().into_raw();
    assert_eq!(argc, 0);

    let (blocks, bytes) = freed_by(|| unsafe { hashcat_bridge_free_argv(argc, raw) });
    assert_eq!(blocks, 1);
    assert_eq!(bytes, slot());
}

#[test]
#[serial_test::serial]
fn short_count_releases_the_whole_table() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let (_, raw) = Argv::new(["a", "bb", "ccc"]).unwrap().into_raw();

    let (blocks, bytes) = freed_by(|| unsafe { hashcat_bridge_free_argv(1, raw) });
    assert_eq!(blocks, 3 + 1);
    assert_eq!(bytes, 2 + 3 + 4 + 4 * slot());
}

#[test]
#[serial_test::serial]
fn owned_vector_drops_exactly_once() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let argv = Argv::new(["hashcat", "-m", "0"]).unwrap();

    // Three strings, the string vector and the pointer table.
    let (blocks, _) = freed_by(|| drop(argv));
    assert_eq!(blocks, 5);
}

#[test]
#[serial_test::serial]
fn null_table_releases_nothing() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let (blocks, bytes) =
        freed_by(|| unsafe { hashcat_bridge_free_argv(3, std::ptr::null_mut()) });
    assert_eq!((blocks, bytes), (0, 0));
}
