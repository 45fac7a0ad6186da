//! Callback interface for asynchronous image requests.

use std::sync::Arc;

use crate::domain::entities::Bitmap;
use crate::domain::errors::ImageError;

/// Receives the outcome of an asynchronous image request.
///
/// Exactly one method is called per request that is not cancelled. Calls
/// happen on a worker task, never on the caller's own thread, so UI code must
/// re-dispatch to its own context.
pub trait ImageListener: Send + Sync {
    /// The image was loaded.
    fn on_success(&self, uri: &str, bitmap: Arc<Bitmap>);

    /// Loading failed.
    fn on_failure(&self, uri: &str, error: ImageError);
}

/// Listener adapter over a pair of closures.
pub struct FnListener<S, F> {
    on_success: S,
    on_failure: F,
}

impl<S, F> FnListener<S, F>
where
    S: Fn(&str, Arc<Bitmap>) + Send + Sync,
    F: Fn(&str, ImageError) + Send + Sync,
{
    /// Creates a listener from success and failure callbacks.
    pub const fn new(on_success: S, on_failure: F) -> Self {
        Self {
            on_success,
            on_failure,
        }
    }
}

impl<S, F> ImageListener for FnListener<S, F>
where
    S: Fn(&str, Arc<Bitmap>) + Send + Sync,
    F: Fn(&str, ImageError) + Send + Sync,
{
    fn on_success(&self, uri: &str, bitmap: Arc<Bitmap>) {
        (self.on_success)(uri, bitmap);
    }

    fn on_failure(&self, uri: &str, error: ImageError) {
        (self.on_failure)(uri, error);
    }
}
