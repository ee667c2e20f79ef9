//! Collecting a pipeline's output in memory.

use std::io::Read;

use pipejoin::exec::Redirect;
use tokio::task::JoinHandle;

/// Create a pipe whose write end is returned as a [`Redirect`] and whose read
/// end is drained on a blocking task.
///
/// The handle resolves once every copy of the write end is closed, so hand
/// the redirect to the pipeline without keeping a clone around.
pub fn capture() -> (Redirect, JoinHandle<Vec<u8>>) {
    let (mut reader, writer) = std::io::pipe().expect("failed to create capture pipe");
    let handle = tokio::task::spawn_blocking(move || {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .expect("failed to read captured output");
        buf
    });
    (Redirect::from(writer), handle)
}
