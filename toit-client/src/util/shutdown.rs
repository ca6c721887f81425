//! Global shutdown signal for Ctrl+C.

use once_cell::sync::Lazy;
use tokio_util::sync::CancellationToken;

/// Cancelled once the user interrupts the process; aborts the in-flight call.
pub static SHUTDOWN: Lazy<CancellationToken> = Lazy::new(CancellationToken::new);
