//! Drives a [`SearchSession`] against the primary and fallback providers.
//!
//! The session lives behind an `Arc<Mutex<_>>` so a manual fallback request
//! arriving on another task sees the same one-shot trigger. The lock is never
//! held across a provider call.

use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use super::provider::RestaurantSearchProvider;
use super::session::{NextStep, SearchOutcome, SearchSession};

pub struct SearchOrchestrator {
    primary: Arc<dyn RestaurantSearchProvider>,
    fallback: Arc<dyn RestaurantSearchProvider>,
    /// Woken whenever any fallback call records its result.
    fallback_finished: Notify,
}

impl SearchOrchestrator {
    pub fn new(
        primary: Arc<dyn RestaurantSearchProvider>,
        fallback: Arc<dyn RestaurantSearchProvider>,
    ) -> Self {
        Self {
            primary,
            fallback,
            fallback_finished: Notify::new(),
        }
    }

    /// Run the primary search and, if it came back empty or failed, the
    /// fallback. Returns once the session is done, including when a manual
    /// fallback started elsewhere is still running.
    pub async fn run(&self, session: Arc<Mutex<SearchSession>>) -> SearchOutcome {
        let query = {
            let mut s = session.lock().await;
            s.begin();
            s.query().clone()
        };

        tracing::debug!(
            provider = self.primary.name(),
            prefecture = %query.prefecture,
            "Running primary search"
        );
        let result = self.primary.search(&query).await;
        let next = session.lock().await.record_primary(result);

        match next {
            NextStep::RunFallback => self.call_fallback(&session).await,
            NextStep::AwaitFallback => self.wait_until_done(&session).await,
            NextStep::Done => {}
        }

        let outcome = session.lock().await.outcome();
        outcome
    }

    /// User-requested fallback. Returns `false` without calling the provider
    /// if the fallback has already been triggered for this session.
    pub async fn run_manual_fallback(&self, session: Arc<Mutex<SearchSession>>) -> bool {
        if !session.lock().await.trigger_fallback() {
            return false;
        }
        self.call_fallback(&session).await;
        true
    }

    async fn call_fallback(&self, session: &Mutex<SearchSession>) {
        let query = session.lock().await.query().clone();
        tracing::debug!(
            provider = self.fallback.name(),
            prefecture = %query.prefecture,
            "Running fallback search"
        );
        let result = self.fallback.search(&query).await;
        session.lock().await.record_fallback(result);
        self.fallback_finished.notify_waiters();
    }

    async fn wait_until_done(&self, session: &Mutex<SearchSession>) {
        loop {
            // Register before checking so a wake-up between the two is kept.
            let notified = self.fallback_finished.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if session.lock().await.is_done() {
                return;
            }
            notified.await;
        }
    }
}
