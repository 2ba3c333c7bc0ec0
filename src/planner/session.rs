use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Handed out when a search starts; identifies its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

/// Last-request-wins holder for search results.
///
/// Every [`begin`](SearchSession::begin) bumps the generation. A result is
/// stored only while its ticket is still the newest one issued, so a slow
/// search that finishes after a newer one started is dropped.
#[derive(Debug)]
pub struct SearchSession<T> {
    generation: AtomicU64,
    latest: Mutex<Option<T>>,
}

impl<T> Default for SearchSession<T> {
    fn default() -> Self {
        SearchSession::new()
    }
}

impl<T> SearchSession<T> {
    pub fn new() -> Self {
        SearchSession {
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    pub fn begin(&self) -> SearchTicket {
        SearchTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Store `result` if `ticket` is still current. Returns whether it was kept.
    pub async fn complete(&self, ticket: SearchTicket, result: T) -> bool {
        let mut latest = self.latest.lock().await;
        if !self.is_current(ticket) {
            return false;
        }
        *latest = Some(result);
        true
    }

    pub async fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.latest.lock().await.clone()
    }

    /// Start a search, await it and keep the result unless superseded.
    pub async fn run<F>(&self, search: F) -> Option<T>
    where
        F: Future<Output = T>,
        T: Clone,
    {
        let ticket = self.begin();
        let result = search.await;
        if self.complete(ticket, result.clone()).await {
            Some(result)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn only_the_newest_ticket_is_current() {
        let session: SearchSession<&str> = SearchSession::new();
        let first = session.begin();
        let second = session.begin();

        assert!(!session.is_current(first));
        assert!(session.is_current(second));
        assert!(!session.complete(first, "stale").await);
        assert!(session.complete(second, "fresh").await);
        assert_eq!(session.latest().await, Some("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_stale_search_does_not_overwrite_newer_results() {
        let session: SearchSession<&str> = SearchSession::new();

        let slow = session.run(async {
            sleep(Duration::from_millis(300)).await;
            "YUL-YVR"
        });
        let fast = async {
            // Started after the slow search, finishes first
            sleep(Duration::from_millis(10)).await;
            session
                .run(async {
                    sleep(Duration::from_millis(20)).await;
                    "YUL-YYZ"
                })
                .await
        };

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow, None);
        assert_eq!(fast, Some("YUL-YYZ"));
        assert_eq!(session.latest().await, Some("YUL-YYZ"));
    }
}
