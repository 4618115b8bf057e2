//! Long-running maintenance tasks. Each one runs until its
//! [`CancellationToken`](tokio_util::sync::CancellationToken) fires.

pub mod session_cleanup;
