use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Single-shot trailing timer. Arming again cancels whatever was pending.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    token: Option<CancellationToken>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `on_fire` after `duration` unless cancelled or re-armed first.
    pub fn arm<F>(&mut self, duration: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(duration) => on_fire.await,
            }
        });
        self.token = Some(token);
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
