//! Test: Panic containment

use crate::helpers::*;
use pipe::{args, pipe, PipeError, Pipeline};

/// Test that a panicking step becomes an error instead of unwinding into the caller
#[test]
fn test_panic_becomes_error() {
    init_tracing();

    let after = Counter::new();
    let hits = after.clone();

    let pipeline = pipe![
        |n: i32| n,
        |n: i32| -> i32 {
            if n == 0 {
                panic!("division by zero");
            }
            100 / n
        },
        move |_: i32| hits.hit(),
    ];

    assert!(pipeline.call(args![4]).is_ok());
    assert_eq!(after.count(), 1);

    let err = pipeline.call(args![0]).unwrap_err();
    assert!(err.is_panic());
    assert_eq!(err.to_string(), "pipeline panicked: division by zero");
    assert_eq!(after.count(), 1);
}

/// Test runtime faults raised by the standard library
#[test]
fn test_index_out_of_bounds() {
    let pipeline = pipe![|v: Vec<u8>| v[10]];
    let err = pipeline.call(args![vec![1u8, 2, 3]]).unwrap_err();

    match err {
        PipeError::Panicked(message) => assert!(message.contains("index out of bounds")),
        other => panic!("Expected a panic, got: {}", other),
    }
}

/// Test that non-string payloads are still reported
#[test]
fn test_non_string_payload() {
    let pipeline = pipe![|| -> () {
        std::panic::panic_any(42u32);
    }];
    let err = pipeline.call(args![]).unwrap_err();
    assert_eq!(err.to_string(), "pipeline panicked: non-string panic payload");
}

/// Test that the pipeline keeps working after a panic
#[test]
fn test_reusable_after_panic() {
    let pipeline = Pipeline::builder()
        .name("flaky")
        .step(|fail: bool| -> bool {
            assert!(!fail, "asked to fail");
            fail
        })
        .build();

    let err = pipeline.call(args![true]).unwrap_err();
    assert_eq!(err.to_string(), "pipeline panicked: asked to fail");
    assert!(pipeline.call(args![false]).is_ok());
}
