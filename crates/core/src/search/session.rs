//! Per-search state machine.
//!
//! ```text
//! Idle → PrimaryPending → PrimarySuccess ─────────────────────────────→ Done
//!                       ↘ PrimaryEmpty / PrimaryError → FallbackPending
//!                                     FallbackPending → FallbackSuccess / FallbackError → Done
//! ```
//!
//! The fallback trigger is a one-shot flag: whichever of the automatic path
//! (primary came back empty or failed) and a manual user request gets there
//! first runs the fallback; the other observes the flag and waits.

use serde::Serialize;

use super::provider::ProviderError;
use super::{merge_fallback, scope_to_prefecture, SearchQuery, SearchResult};
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Idle,
    PrimaryPending,
    PrimarySuccess,
    PrimaryEmpty,
    PrimaryError,
    FallbackPending,
    FallbackSuccess,
    FallbackError,
    Done,
}

/// What the caller should do after recording the primary outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Nothing more to run.
    Done,
    /// This caller owns the fallback call and must run it.
    RunFallback,
    /// A fallback started elsewhere is still running.
    AwaitFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Pending,
    Succeeded,
    Failed,
}

/// Snapshot returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub phase: SearchPhase,
    pub results: Vec<SearchResult>,
    pub primary_count: usize,
    pub fallback_used: bool,
    /// Set only when both providers failed.
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    query: SearchQuery,
    started_at: Timestamp,
    phase: SearchPhase,
    history: Vec<SearchPhase>,

    primary: Outcome,
    primary_results: Vec<SearchResult>,
    primary_error: Option<String>,

    fallback_triggered: bool,
    fallback: Outcome,
    fallback_results: Vec<SearchResult>,
    fallback_error: Option<String>,
}

impl SearchSession {
    pub fn new(query: SearchQuery) -> Self {
        Self {
            query,
            started_at: chrono::Utc::now(),
            phase: SearchPhase::Idle,
            history: vec![SearchPhase::Idle],
            primary: Outcome::Pending,
            primary_results: Vec::new(),
            primary_error: None,
            fallback_triggered: false,
            fallback: Outcome::Pending,
            fallback_results: Vec::new(),
            fallback_error: None,
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Every phase entered so far, in order.
    pub fn history(&self) -> &[SearchPhase] {
        &self.history
    }

    pub fn is_done(&self) -> bool {
        self.phase == SearchPhase::Done
    }

    pub fn fallback_triggered(&self) -> bool {
        self.fallback_triggered
    }

    fn enter(&mut self, phase: SearchPhase) {
        self.phase = phase;
        self.history.push(phase);
    }

    fn primary_known(&self) -> bool {
        self.primary != Outcome::Pending
    }

    fn fallback_running(&self) -> bool {
        self.fallback_triggered && self.fallback == Outcome::Pending
    }

    /// Idle → PrimaryPending.
    pub fn begin(&mut self) {
        if self.phase == SearchPhase::Idle {
            self.enter(SearchPhase::PrimaryPending);
        }
    }

    /// Claim the fallback call. Returns `true` only for the first caller.
    pub fn trigger_fallback(&mut self) -> bool {
        if self.fallback_triggered {
            return false;
        }
        self.fallback_triggered = true;
        if self.primary_known() {
            self.enter(SearchPhase::FallbackPending);
        }
        true
    }

    pub fn record_primary(
        &mut self,
        result: Result<Vec<SearchResult>, ProviderError>,
    ) -> NextStep {
        if self.primary_known() {
            return NextStep::Done;
        }

        match result {
            Ok(results) if !results.is_empty() => {
                self.primary = Outcome::Succeeded;
                self.primary_results = results;
                self.enter(SearchPhase::PrimarySuccess);
                if self.fallback_running() {
                    self.enter(SearchPhase::FallbackPending);
                    return NextStep::AwaitFallback;
                }
                self.enter(SearchPhase::Done);
                return NextStep::Done;
            }
            Ok(_) => {
                self.primary = Outcome::Succeeded;
                self.enter(SearchPhase::PrimaryEmpty);
            }
            Err(err) => {
                tracing::warn!(
                    provider = err.provider,
                    error = %err.message,
                    prefecture = %self.query.prefecture,
                    "Primary search failed, falling back"
                );
                self.primary = Outcome::Failed;
                self.primary_error = Some(err.to_string());
                self.enter(SearchPhase::PrimaryError);
            }
        }

        if self.trigger_fallback() {
            NextStep::RunFallback
        } else if self.fallback_running() {
            self.enter(SearchPhase::FallbackPending);
            NextStep::AwaitFallback
        } else {
            self.enter(SearchPhase::Done);
            NextStep::Done
        }
    }

    pub fn record_fallback(&mut self, result: Result<Vec<SearchResult>, ProviderError>) {
        if !self.fallback_running() {
            return;
        }

        match result {
            Ok(results) => {
                self.fallback = Outcome::Succeeded;
                self.fallback_results = results;
                self.enter(SearchPhase::FallbackSuccess);
            }
            Err(err) => {
                tracing::warn!(
                    provider = err.provider,
                    error = %err.message,
                    "Fallback search failed"
                );
                self.fallback = Outcome::Failed;
                self.fallback_error = Some(err.to_string());
                self.enter(SearchPhase::FallbackError);
            }
        }

        if self.primary_known() {
            self.enter(SearchPhase::Done);
        } else {
            // Manual fallback finished before the primary answered.
            self.enter(SearchPhase::PrimaryPending);
        }
    }

    /// Merged, de-duplicated, prefecture-scoped results plus error state.
    pub fn outcome(&self) -> SearchOutcome {
        let mut merged = self.primary_results.clone();
        merge_fallback(&mut merged, self.fallback_results.clone());
        let results = scope_to_prefecture(&merged, self.query.prefecture.trim());

        let error = if self.primary == Outcome::Failed && self.fallback == Outcome::Failed {
            Some(
                self.fallback_error
                    .clone()
                    .unwrap_or_else(|| "Search failed".to_string()),
            )
        } else {
            None
        };

        SearchOutcome {
            phase: self.phase,
            results,
            primary_count: self.primary_results.len(),
            fallback_used: self.fallback_triggered,
            error,
        }
    }
}
