//! End-to-end batching scenarios against the in-memory sink.

mod common;

use common::*;
use tracker_enqueue::{
    Dispatcher, DispatcherState, EnqueueError, LineReader, MemorySink,
};

async fn dispatch(input: &str, sink: &MemorySink, capacity: usize) -> Result<u64, EnqueueError> {
    let mut reader = LineReader::new(input.as_bytes());
    let mut dispatcher = Dispatcher::new(sink, capacity)?;
    let report = dispatcher.dispatch_reader(&mut reader).await?;
    Ok(report.batches_flushed)
}

#[tokio::test]
async fn test_blank_line_skipped_and_trailing_batch_flushed() {
    let sink = MemorySink::new();
    let batches = dispatch("a\nb\n\nc\n", &sink, 2).await.unwrap();

    assert_eq!(batches, 2);
    assert_eq!(sink.batch_contents(), vec![vec!["a", "b"], vec!["c"]]);
}

#[tokio::test]
async fn test_exactly_capacity_lines_is_one_batch() {
    let sink = MemorySink::new();
    let batches = dispatch(&numbered_lines(10_000), &sink, 10_000)
        .await
        .unwrap();

    assert_eq!(batches, 1);
    assert_eq!(sink.attempts(), vec![1]);
    assert_eq!(sink.item_count(), 10_000);
}

#[tokio::test]
async fn test_single_partial_batch() {
    let sink = MemorySink::new();
    let batches = dispatch("alice\n  bob  \n\ncarol\n", &sink, 10_000)
        .await
        .unwrap();

    assert_eq!(batches, 1);
    assert_eq!(sink.batch_contents(), vec![vec!["alice", "bob", "carol"]]);
}

#[tokio::test]
async fn test_exact_multiple_of_capacity_has_no_empty_trailing_batch() {
    let sink = MemorySink::new();
    let batches = dispatch(&numbered_lines(20_000), &sink, 10_000)
        .await
        .unwrap();

    assert_eq!(batches, 2);
    let sizes: Vec<usize> = sink.batches().iter().map(|b| b.len()).collect();
    assert_eq!(sizes, vec![10_000, 10_000]);
    assert_eq!(sink.attempts(), vec![1, 2]);
}

#[tokio::test]
async fn test_one_over_capacity_yields_trailing_single_item_batch() {
    let sink = MemorySink::new();
    dispatch(&numbered_lines(10_001), &sink, 10_000)
        .await
        .unwrap();

    let batches = sink.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 10_000);
    assert_eq!(batches[1].to_strings(), vec!["item10001"]);
}

#[tokio::test]
async fn test_empty_and_blank_only_input_makes_no_sink_calls() {
    for input in ["", "\n", "   \n\t\n\r\n"] {
        let sink = MemorySink::new();
        let batches = dispatch(input, &sink, 3).await.unwrap();
        assert_eq!(batches, 0, "input {input:?}");
        assert!(sink.attempts().is_empty(), "input {input:?}");
    }
}

#[tokio::test]
async fn test_missing_final_newline_and_crlf() {
    let sink = MemorySink::new();
    dispatch("one\r\ntwo\r\n three", &sink, 10).await.unwrap();
    assert_eq!(sink.batch_contents(), vec![vec!["one", "two", "three"]]);
}

#[tokio::test]
async fn test_only_ascii_whitespace_and_nul_are_trimmed() {
    let sink = MemorySink::new();
    let input = "\u{a0}\nabc\0\n\u{3000}x\u{3000}\n\0\n";
    let mut reader = LineReader::new(input.as_bytes());
    let mut dispatcher = Dispatcher::new(&sink, 10).unwrap();
    dispatcher.dispatch_reader(&mut reader).await.unwrap();

    assert_eq!(
        sink.batch_contents(),
        vec![vec!["\u{a0}", "abc", "\u{3000}x\u{3000}"]]
    );
    assert_eq!(reader.blank_lines(), 1);
    assert_eq!(sink.batch_contents().concat(), expected_items(input));
}

#[tokio::test]
async fn test_duplicates_are_preserved() {
    let sink = MemorySink::new();
    dispatch("dup\ndup\ndup\n", &sink, 2).await.unwrap();
    assert_eq!(
        sink.batch_contents(),
        vec![vec!["dup", "dup"], vec!["dup"]]
    );
}

#[tokio::test]
async fn test_failure_names_batch_and_keeps_earlier_batches() {
    let sink = MemorySink::failing_on(2);
    let err = dispatch(&numbered_lines(7), &sink, 3).await.unwrap_err();

    assert_eq!(err.failed_batch(), Some(2));
    match &err {
        EnqueueError::SinkFailure {
            batches_flushed,
            items_flushed,
            item_count,
            ..
        } => {
            assert_eq!(*batches_flushed, 1);
            assert_eq!(*items_flushed, 3);
            assert_eq!(*item_count, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // batch 1 stays enqueued, batch 3 is never attempted
    assert_eq!(sink.batch_contents(), vec![vec!["item1", "item2", "item3"]]);
    assert_eq!(sink.attempts(), vec![1, 2]);
}

#[tokio::test]
async fn test_failure_on_trailing_partial_batch() {
    let sink = MemorySink::failing_on(3);
    let err = dispatch(&numbered_lines(7), &sink, 3).await.unwrap_err();

    assert_eq!(err.failed_batch(), Some(3));
    assert_eq!(sink.item_count(), 6);
    assert!(err.to_string().contains("batch 3"));
}

#[tokio::test]
async fn test_dispatcher_is_done_after_failure() {
    let sink = MemorySink::failing_on(1);
    let mut reader = LineReader::new(&b"a\nb\nc\n"[..]);
    let mut dispatcher = Dispatcher::new(&sink, 2).unwrap();

    assert!(dispatcher.dispatch_reader(&mut reader).await.is_err());
    assert_eq!(dispatcher.state(), DispatcherState::Done);
    assert!(matches!(
        dispatcher.finish().await,
        Err(EnqueueError::DispatcherClosed)
    ));
}

#[tokio::test]
async fn test_read_error_mid_stream_keeps_flushed_batches() {
    let input = tokio_test::io::Builder::new()
        .read(b"a\nb\nc\n")
        .read_error(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ))
        .build();

    let sink = MemorySink::new();
    let mut reader = LineReader::new(tokio::io::BufReader::new(input));
    let mut dispatcher = Dispatcher::new(&sink, 2).unwrap();

    let err = dispatcher.dispatch_reader(&mut reader).await.unwrap_err();
    match err {
        EnqueueError::InputRead { line, source } => {
            assert_eq!(line, 4);
            assert_eq!(source.kind(), std::io::ErrorKind::BrokenPipe);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // the pending "c" is not flushed on an input failure
    assert_eq!(sink.batch_contents(), vec![vec!["a", "b"]]);
}

#[tokio::test]
async fn test_invalid_utf8_is_input_error_with_line_number() {
    let sink = MemorySink::new();
    let mut reader = LineReader::new(&b"ok\n\xff\xfe\n"[..]);
    let mut dispatcher = Dispatcher::new(&sink, 10).unwrap();

    let err = dispatcher.dispatch_reader(&mut reader).await.unwrap_err();
    assert!(matches!(err, EnqueueError::InputRead { line: 2, .. }));
    assert!(sink.attempts().is_empty());
}

#[tokio::test]
async fn test_stream_and_reader_paths_agree() {
    let input = "x\n\ny\n z \nw\n";

    let via_reader = MemorySink::new();
    dispatch(input, &via_reader, 2).await.unwrap();

    let via_stream = MemorySink::new();
    let mut dispatcher = Dispatcher::new(&via_stream, 2).unwrap();
    dispatcher
        .dispatch_stream(LineReader::new(input.as_bytes()).into_stream())
        .await
        .unwrap();

    assert_eq!(via_reader.batch_contents(), via_stream.batch_contents());
    assert_eq!(
        via_reader.batch_contents().concat(),
        expected_items(input)
    );
}
