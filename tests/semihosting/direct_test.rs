/*!
 * Direct Backend Tests
 * File calls against real host files in a temporary directory
 */

use super::common::*;
use pretty_assertions::assert_eq;
use semihost_relay::semihosting::TargetErrno;
use std::fs;
use tempfile::TempDir;

/// Put `path` in target memory at `addr` and return open's argument block
fn open_args(target: &mut MockTarget, addr: u32, path: &std::path::Path, mode: u32) -> [u32; 4] {
    let len = target.put_str(addr, path.to_str().unwrap());
    [addr, mode, len, 0]
}

#[test]
fn test_write_then_read_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.txt");
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    let args = open_args(&mut target, STRINGS, &path, MODE_W);
    let handle = call(&mut harness.dispatcher, &mut target, SYS_OPEN, args);
    assert!(handle > 0, "open failed: {handle}");
    // Backend descriptors start at 3, so the target sees 4
    assert_eq!(handle, 4);

    target.poke(BUF, b"semihosted");
    let not_written = call(&mut harness.dispatcher, &mut target, SYS_WRITE, [handle as u32, BUF, 10, 0]);
    assert_eq!(not_written, 0);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_CLOSE, [handle as u32, 0, 0, 0]), 0);
    assert_eq!(fs::read(&path).unwrap(), b"semihosted".to_vec());

    let args = open_args(&mut target, STRINGS, &path, MODE_R);
    let handle = call(&mut harness.dispatcher, &mut target, SYS_OPEN, args) as u32;
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_FLEN, [handle, 0, 0, 0]), 10);

    let not_read = call(&mut harness.dispatcher, &mut target, SYS_READ, [handle, BUF + 0x100, 16, 0]);
    assert_eq!(not_read, 6);
    assert_eq!(target.peek(BUF + 0x100, 10), b"semihosted".to_vec());

    // At end of file nothing is read
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_READ, [handle, BUF, 4, 0]), 4);

    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_SEEK, [handle, 4, 0, 0]), 0);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_READ, [handle, BUF, 4, 0]), 0);
    assert_eq!(target.peek(BUF, 4), b"host".to_vec());
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_CLOSE, [handle, 0, 0, 0]), 0);
}

#[test]
fn test_append_mode_keeps_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("append.txt");
    fs::write(&path, b"abc").unwrap();
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    let args = open_args(&mut target, STRINGS, &path, MODE_A);
    let handle = call(&mut harness.dispatcher, &mut target, SYS_OPEN, args) as u32;
    target.poke(BUF, b"def");
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [handle, BUF, 3, 0]), 0);
    call(&mut harness.dispatcher, &mut target, SYS_CLOSE, [handle, 0, 0, 0]);
    assert_eq!(fs::read(&path).unwrap(), b"abcdef".to_vec());
}

#[test]
fn test_open_missing_file_sets_errno() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.bin");
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    let args = open_args(&mut target, STRINGS, &path, MODE_R);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_OPEN, args), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::NoEnt.code()
    );
    assert!(!path.exists());
}

#[test]
fn test_open_mode_out_of_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("never.txt");
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    for mode in [12, 13, 0xff] {
        let args = open_args(&mut target, STRINGS, &path, mode);
        assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_OPEN, args), -1);
    }
    assert!(!path.exists());
}

#[test]
fn test_console_name_never_touches_filesystem() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    let len = target.put_str(STRINGS, ":tt");

    let expected = [
        (MODE_R, 1),
        (MODE_R + 1, 1),
        (MODE_R_PLUS, 3),
        (MODE_W, 2),
        (MODE_W_PLUS, 2),
        (MODE_A, 3),
        (MODE_A_PLUS, 3),
    ];
    for (mode, handle) in expected {
        assert_eq!(
            call(&mut harness.dispatcher, &mut target, SYS_OPEN, [STRINGS, mode, len, 0]),
            handle,
            "mode {mode}"
        );
    }
    assert!(!std::path::Path::new(":tt").exists());
}

#[test]
fn test_console_descriptors() {
    let mut harness = DirectHarness::with_console(b"", [false, true, false]);
    let mut target = MockTarget::new();

    target.poke(BUF, b"to stdout");
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [2, BUF, 9, 0]), 0);
    assert_eq!(harness.stdout.contents_lossy(), "to stdout");

    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_ISTTY, [1, 0, 0, 0]), 0);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_ISTTY, [2, 0, 0, 0]), 1);

    // Console streams cannot seek and report no length
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_SEEK, [2, 0, 0, 0]), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::SPipe.code()
    );
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_FLEN, [2, 0, 0, 0]), 0);

    // Closing the console leaves it usable
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_CLOSE, [2, 0, 0, 0]), 0);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [2, BUF, 2, 0]), 0);
    assert_eq!(harness.stdout.contents_lossy(), "to stdoutto");
}

#[test]
fn test_read_write_argument_checks() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [2, 0, 4, 0]), -1);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_READ, [1, 0, 4, 0]), -1);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [2, BUF, 0, 0]), 0);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_READ, [1, BUF, 0, 0]), 0);
    assert!(harness.stdout.contents().is_empty());
}

#[test]
fn test_bad_descriptor() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_CLOSE, [40, 0, 0, 0]), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::BadF.code()
    );
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [40, BUF, 4, 0]), -1);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_FLEN, [40, 0, 0, 0]), -1);
}

#[test]
fn test_unreadable_buffer_fails_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fault.txt");
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    let args = open_args(&mut target, STRINGS, &path, MODE_W);
    let handle = call(&mut harness.dispatcher, &mut target, SYS_OPEN, args) as u32;
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [handle, 0x1000_0000, 4, 0]), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::Fault.code()
    );
    assert_eq!(fs::read(&path).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_oversized_counts_are_streamed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.bin");
    let contents: Vec<u8> = (0..5000u32).map(|i| i as u8).collect();
    fs::write(&path, &contents).unwrap();
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    let huge = 0x1000_0000;

    // Read stops at end of file, spanning more than one chunk
    let args = open_args(&mut target, STRINGS, &path, MODE_R);
    let handle = call(&mut harness.dispatcher, &mut target, SYS_OPEN, args) as u32;
    let not_read = call(&mut harness.dispatcher, &mut target, SYS_READ, [handle, BUF, huge, 0]);
    assert_eq!(not_read, (huge - 5000) as i32);
    assert_eq!(target.peek(BUF, 5000), contents);
    call(&mut harness.dispatcher, &mut target, SYS_CLOSE, [handle, 0, 0, 0]);

    // Write runs off the end of target memory and faults instead of buffering it all
    let args = open_args(&mut target, STRINGS, &dir.path().join("out.bin"), MODE_W);
    let handle = call(&mut harness.dispatcher, &mut target, SYS_OPEN, args) as u32;
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_WRITE, [handle, BUF, huge, 0]), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::Fault.code()
    );
}

#[test]
fn test_oversized_path_length_is_rejected() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    target.put_str(STRINGS, "name.txt");

    let args = [STRINGS, MODE_R, 0x8000_0000, 0];
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_OPEN, args), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::NameTooLong.code()
    );
}

#[test]
fn test_rename_and_remove() {
    let dir = TempDir::new().unwrap();
    let from = dir.path().join("old.txt");
    let to = dir.path().join("new.txt");
    fs::write(&from, b"x").unwrap();
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    let from_len = target.put_str(STRINGS, from.to_str().unwrap());
    let to_len = target.put_str(STRINGS_B, to.to_str().unwrap());
    let result = call(
        &mut harness.dispatcher,
        &mut target,
        SYS_RENAME,
        [STRINGS, from_len, STRINGS_B, to_len],
    );
    assert_eq!(result, 0);
    assert!(!from.exists());
    assert!(to.exists());

    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_REMOVE, [STRINGS_B, to_len, 0, 0]), 0);
    assert!(!to.exists());

    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_REMOVE, [STRINGS_B, to_len, 0, 0]), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::NoEnt.code()
    );
}

#[test]
fn test_empty_or_null_path_is_invalid() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_REMOVE, [0, 4, 0, 0]), -1);
    assert_eq!(
        call(&mut harness.dispatcher, &mut target, SYS_ERRNO, [0; 4]),
        TargetErrno::Inval.code()
    );
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_REMOVE, [STRINGS, 0, 0, 0]), -1);
}

#[cfg(unix)]
#[test]
fn test_system_returns_exit_code() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("ran");
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    let command = format!("touch {} && exit 3", marker.display());
    let len = target.put_str(STRINGS, &command);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_SYSTEM, [STRINGS, len, 0, 0]), 3);
    assert!(marker.exists());
}

#[test]
fn test_descriptors_are_reused() {
    let dir = TempDir::new().unwrap();
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    let first = open_args(&mut target, STRINGS, &dir.path().join("a"), MODE_W);
    let second = open_args(&mut target, STRINGS_B, &dir.path().join("b"), MODE_W);
    let a = call(&mut harness.dispatcher, &mut target, SYS_OPEN, first);
    let b = call(&mut harness.dispatcher, &mut target, SYS_OPEN, second);
    assert_eq!((a, b), (4, 5));

    call(&mut harness.dispatcher, &mut target, SYS_CLOSE, [a as u32, 0, 0, 0]);
    let again = call(&mut harness.dispatcher, &mut target, SYS_OPEN, first);
    assert_eq!(again, 4);
}
