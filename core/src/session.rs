//! Per-view query state: idle, loading, then success or failure.
//!
//! Overlapping queries are independent. Under the default
//! [`Sequencing::LastWriterWins`] policy whichever response completes last
//! is what the view shows, even if it was issued first. The opt-in
//! [`Sequencing::LatestIssued`] policy drops responses to superseded
//! queries instead.

use std::future::Future;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sequencing {
    #[default]
    LastWriterWins,
    LatestIssued,
}

/// Handed out when a query starts; presented again when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default)]
pub struct QuerySession<T> {
    query: String,
    state: QueryState<T>,
    sequencing: Sequencing,
    issued: u64,
}

impl<T> QuerySession<T> {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            state: QueryState::Idle,
            sequencing: Sequencing::LastWriterWins,
            issued: 0,
        }
    }

    pub fn with_sequencing(mut self, sequencing: Sequencing) -> Self {
        self.sequencing = sequencing;
        self
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, QueryState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            QueryState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&T> {
        match &self.state {
            QueryState::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Clears any previous result or error and marks the view as loading.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.state = QueryState::Loading;
        Ticket(self.issued)
    }

    /// Applies a finished query. Returns false when the outcome was dropped
    /// because a newer query has been issued since.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<T>) -> bool {
        if self.sequencing == Sequencing::LatestIssued && ticket.0 < self.issued {
            return false;
        }

        self.state = match outcome {
            Ok(value) => QueryState::Success(value),
            Err(e) => QueryState::Failed(e.to_string()),
        };
        true
    }

    pub async fn run<F>(&mut self, fut: F) -> &QueryState<T>
    where
        F: Future<Output = Result<T>>,
    {
        let ticket = self.begin();
        let outcome = fut.await;
        self.complete(ticket, outcome);
        &self.state
    }
}
