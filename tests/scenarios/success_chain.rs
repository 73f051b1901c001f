//! Test: Success Chain - values threaded from step to step

use crate::helpers::*;
use pipe::{args, pipe, Data, Pipeline, Value};

/// Test that each step observes exactly the previous step's data outputs
#[test]
fn test_each_step_sees_previous_outputs() {
    init_tracing();

    let seen_by_second = Recorder::<(i32, String)>::new();
    let seen_by_third = Recorder::<usize>::new();

    let second = seen_by_second.clone();
    let third = seen_by_third.clone();
    let pipeline = pipe![
        |n: i32| (n + 1, format!("n={}", n)),
        move |n: i32, label: String| {
            second.record((n, label.clone()));
            label.len()
        },
        move |len: usize| third.record(len),
    ];

    pipeline.call(args![41]).unwrap();

    assert_eq!(seen_by_second.values(), vec![(42, "n=41".to_string())]);
    assert_eq!(seen_by_third.values(), vec![4]);
}

/// Test integer arithmetic through a two step chain
#[test]
fn test_value_threading() {
    let result = Recorder::<i32>::new();
    let sink = result.clone();

    let pipeline = pipe![|n: i32| n + 12, move |n: i32| sink.record(n / 2)];

    assert!(pipeline.call(args![10]).is_ok());
    assert_eq!(result.values(), vec![11]);
}

/// Test a generator feeding a long chain of transformations
#[test]
fn test_generator_to_sink() {
    let result = Recorder::<String>::new();
    let sink = result.clone();

    let pipeline = Pipeline::builder()
        .name("generator")
        .step(|| 3u64)
        .step(|n: u64| n * 2)
        .step(|n: u64| (n, n + 1))
        .step(|a: u64, b: u64| Data(vec![a, b]))
        .step(|v: Vec<u64>| v.iter().sum::<u64>())
        .step(|n: u64| n.to_string())
        .step(move |s: String| sink.record(s))
        .build();

    assert_eq!(pipeline.len(), 7);
    pipeline.call(args![]).unwrap();
    assert_eq!(result.values(), vec!["13".to_string()]);
}

/// Test that a step may take zero inputs after a sink in the middle
#[test]
fn test_sink_followed_by_generator() {
    let counter = Counter::new();
    let hits = counter.clone();

    let pipeline = pipe![
        move |_: &'static str| hits.hit(),
        || 5i32,
        |n: i32| n * n,
    ];

    let frame = pipeline.evaluate(args!["start"]).unwrap();
    assert_eq!(counter.count(), 1);
    assert_eq!(frame.len(), 1);
    assert_eq!(frame[0].downcast_ref::<i32>(), Some(&25));
}

/// Test custom types travel between steps
#[test]
fn test_custom_types_via_data_wrapper() {
    #[derive(Debug, Clone, PartialEq)]
    struct Order {
        id: u32,
        total_cents: u64,
    }

    let result = Recorder::<Order>::new();
    let sink = result.clone();

    let pipeline = pipe![
        |id: u32| Data(Order { id, total_cents: 0 }),
        |order: Order| Data(Order {
            total_cents: 1999,
            ..order
        }),
        move |order: Order| sink.record(order),
    ];

    pipeline.call(args![7u32]).unwrap();
    assert_eq!(
        result.last(),
        Some(Order {
            id: 7,
            total_cents: 1999
        })
    );
}

/// Test that Ok values of fallible steps are threaded like plain returns
#[test]
fn test_fallible_steps_thread_ok_values() {
    let pipeline = pipe![
        |s: String| s.parse::<i64>(),
        |n: i64| -> Result<(i64, i64), std::io::Error> { Ok((n, n * 2)) },
        |a: i64, b: i64| a + b,
    ];

    let mut frame = pipeline.evaluate(args!["14".to_string()]).unwrap();
    assert_eq!(frame.remove(0).downcast::<i64>().unwrap(), 42);
}

/// Test that a pipeline nests as a step of another pipeline
#[test]
fn test_nested_pipeline() {
    let inner = pipe![|n: i32| n + 1, |n: i32| n * 10];
    let outer = Pipeline::builder()
        .step(|s: &'static str| s.len() as i32)
        .step(inner)
        .step(|n: i32| n - 1)
        .build();

    let frame = outer.evaluate(args!["abc"]).unwrap();
    assert_eq!(frame[0].downcast_ref::<i32>(), Some(&39));
}

/// Test that the empty pipeline accepts anything and does nothing
#[test]
fn test_empty_pipeline() {
    let pipeline = pipe![];

    assert!(pipeline.call(args![]).is_ok());
    assert!(pipeline.call(args![1, "two", 3.0]).is_ok());
    assert!(Pipeline::default().call(Vec::<Value>::new()).is_ok());
}
