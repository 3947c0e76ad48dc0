/*!
 * Dispatcher Tests
 * Call decoding, write-back and the calls that never reach a file
 */

use super::common::*;
use pretty_assertions::assert_eq;
use semihost_relay::semihosting::{CallKind, CallRequest, SemihostingConfig, TargetErrno};

#[test]
fn test_result_lands_in_r0() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    target.trap(SYS_ISERROR, [2, 0, 0, 0]);
    let interrupted = harness.dispatcher.handle_trapped_call(&mut target);
    assert!(!interrupted);
    assert_eq!(target.r0(), 1);
}

#[test]
fn test_iserror_predicate() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    for errno in TargetErrno::ALL {
        let code = errno.code() as u32;
        assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_ISERROR, [code, 0, 0, 0]), 1);
    }
    for code in [0u32, 3, 12, 9998, u32::MAX] {
        assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_ISERROR, [code, 0, 0, 0]), 0);
    }
}

#[test]
fn test_tmpnam_writes_name() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();

    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_TMPNAM, [BUF, 0, 16, 0]), 0);
    assert_eq!(target.peek(BUF, 11), b"tempAA.tmp\0".to_vec());

    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_TMPNAM, [BUF, 255, 11, 0]), 0);
    assert_eq!(target.peek(BUF, 11), b"tempPP.tmp\0".to_vec());
}

#[test]
fn test_tmpnam_rejections_leave_memory_untouched() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    let cases = [
        [0, 1, 16, 0],
        [BUF, 256, 16, 0],
        [BUF, u32::MAX, 16, 0],
        [BUF, 1, 0, 0],
        [BUF, 1, u32::MAX, 0],
        [BUF, 1, 10, 0],
    ];
    for params in cases {
        assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_TMPNAM, params), -1, "{params:x?}");
    }
    assert_eq!(target.peek(BUF, 11), vec![0; 11]);
}

#[test]
fn test_heapinfo_words() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    target.trap(SYS_HEAPINFO, [0; 4]);
    target.registers[1] = OUT;
    harness.dispatcher.handle_trapped_call(&mut target);

    assert_eq!(target.r0(), 0);
    assert_eq!(target.word(OUT), 0x2000_8000);
    assert_eq!(target.word(OUT + 4), 0x2000_c000);
    assert_eq!(target.word(OUT + 8), 0x2001_0000);
    assert_eq!(target.word(OUT + 12), 0x2000_c000);
}

#[test]
fn test_heapinfo_fault_fails() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    let request = CallRequest::new(CallKind::HeapInfo, 0x1000_0000, [0; 4]);
    let result = harness.dispatcher.execute(&mut target, &request);
    assert_eq!(result.value, -1);
}

#[test]
fn test_get_cmdline_fits() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    // Argument block doubles as the {address, length} output
    let result = call(&mut harness.dispatcher, &mut target, SYS_GET_CMDLINE, [BUF, 64, 0, 0]);

    assert_eq!(result, 0);
    let expected = b"firmware.elf --verbose\0";
    assert_eq!(target.peek(BUF, expected.len()), expected.to_vec());
    assert_eq!(target.word(ARGS), BUF);
    assert_eq!(target.word(ARGS + 4), expected.len() as u32);
}

#[test]
fn test_get_cmdline_too_small() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    // 22 characters plus the terminator do not fit in 22 bytes
    let result = call(&mut harness.dispatcher, &mut target, SYS_GET_CMDLINE, [BUF, 22, 0, 0]);
    assert_eq!(result, -1);
    assert_eq!(target.peek(BUF, 4), vec![0; 4]);
}

#[test]
fn test_exit_prints_and_steps() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    // The exit argument lives in r1 itself and no argument block is read
    target.registers[0] = SYS_EXIT;
    target.registers[1] = 0x2_0026;
    harness.dispatcher.handle_trapped_call(&mut target);

    assert_eq!(target.r0(), 0);
    assert_eq!(target.printed, vec!["_exit(0x20026)\n".to_string()]);
    assert_eq!(target.halts, vec![true]);
    assert_eq!(target.faults, 0);
}

#[test]
fn test_exit_extended_prints_both_words() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    call(&mut harness.dispatcher, &mut target, SYS_EXIT_EXTENDED, [0x2_0026, 0x1, 0, 0]);
    assert_eq!(target.printed, vec!["_exit(0x100020026)\n".to_string()]);
    assert_eq!(target.halts, vec![true]);
}

#[test]
fn test_unsupported_and_unrecognized_fail() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    for id in [SYS_ELAPSED, SYS_TICKFREQ, 0x0b, 0x14, 0x17, 0x99] {
        assert_eq!(call(&mut harness.dispatcher, &mut target, id, [BUF, 4, 0, 0]), -1, "{id:#x}");
    }
    assert_eq!(target.peek(BUF, 4), vec![0; 4]);
    assert_eq!(CallKind::from_id(0x99).name(), "SYS_UNKNOWN");
}

#[test]
fn test_writec_and_write0_go_to_stderr() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    target.poke(STRINGS, b"!");
    target.put_str(STRINGS_B, "hello, target");

    let request = CallRequest::new(CallKind::WriteC, STRINGS, [0; 4]);
    assert_eq!(harness.dispatcher.execute(&mut target, &request).value, 0);
    let request = CallRequest::new(CallKind::Write0, STRINGS_B, [0; 4]);
    assert_eq!(harness.dispatcher.execute(&mut target, &request).value, 0);

    assert_eq!(harness.stderr.contents_lossy(), "!hello, target");
    assert!(harness.stdout.contents().is_empty());
}

#[test]
fn test_console_null_pointers_fail() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    for kind in [CallKind::WriteC, CallKind::Write0] {
        let request = CallRequest::new(kind, 0, [0; 4]);
        assert_eq!(harness.dispatcher.execute(&mut target, &request).value, -1);
    }
    assert!(harness.stderr.contents().is_empty());
}

#[test]
fn test_write0_scan_is_bounded() {
    let mut harness = DirectHarness::new(b"");
    harness.dispatcher = harness
        .dispatcher
        .with_config(SemihostingConfig::new().with_max_string_length(8));
    let mut target = MockTarget::new();
    target.poke(STRINGS, b"0123456789\0");

    let request = CallRequest::new(CallKind::Write0, STRINGS, [0; 4]);
    assert_eq!(harness.dispatcher.execute(&mut target, &request).value, -1);
    assert!(harness.stderr.contents().is_empty());

    target.poke(STRINGS, b"0123456\0");
    assert_eq!(harness.dispatcher.execute(&mut target, &request).value, 0);
    assert_eq!(harness.stderr.contents_lossy(), "0123456");
}

#[test]
fn test_readc_consumes_stdin() {
    let mut harness = DirectHarness::new(b"xy");
    let mut target = MockTarget::new();
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_READC, [0; 4]), b'x' as i32);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_READC, [0; 4]), b'y' as i32);
    assert_eq!(call(&mut harness.dispatcher, &mut target, SYS_READC, [0; 4]), -1);
}

#[test]
fn test_time_reports_host_seconds() {
    let mut harness = DirectHarness::new(b"");
    let mut target = MockTarget::new();
    let before = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as u32;
    let seconds = call(&mut harness.dispatcher, &mut target, SYS_TIME, [0; 4]) as u32;
    assert!(seconds >= before && seconds - before < 5);
}

#[test]
fn test_backend_name() {
    let harness = DirectHarness::new(b"");
    assert_eq!(harness.dispatcher.backend_name(), "direct");
    assert!(!harness.dispatcher.session_lost());
}
