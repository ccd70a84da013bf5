/// Asserts that the next observer message is a successful sync outcome and
/// evaluates to the merged records.
#[macro_export]
macro_rules! assert_synced {
    ($stream:expr) => {{
        let outcome = tokio_stream::StreamExt::next(&mut $stream)
            .await
            .expect("observer stream ended unexpectedly");
        match outcome {
            Ok(records) => records,
            Err(err) => panic!("Expected sync success, got error: {err}"),
        }
    }};
}

/// Asserts that the next observer message is a sync error and evaluates to it.
#[macro_export]
macro_rules! assert_sync_error {
    ($stream:expr) => {{
        let outcome = tokio_stream::StreamExt::next(&mut $stream)
            .await
            .expect("observer stream ended unexpectedly");
        match outcome {
            Ok(records) => panic!("Expected sync error, got {} records", records.len()),
            Err(err) => err,
        }
    }};
}
