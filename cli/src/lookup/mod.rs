use threatlens_core::{Config, OsvQuery, Query, QueryDispatcher, QueryOutcome, QuerySession};

/// Runs one query to completion and returns the resulting view state.
pub async fn run_query(config: &Config, query: Query) -> QuerySession<QueryOutcome> {
    let dispatcher = QueryDispatcher::from_config(config);
    tracing::info!(source = %query.source(), "dispatching query");

    let mut session = QuerySession::new();
    session.set_query(query_text(&query));
    session.run(dispatcher.dispatch(&query)).await;
    session
}

fn query_text(query: &Query) -> String {
    match query {
        Query::Osv(OsvQuery::Package { name, ecosystem }) => format!("{} ({})", name, ecosystem),
        Query::Osv(OsvQuery::Text(text)) => text.clone(),
        Query::VirusTotal { query, .. } | Query::AlienVault { query, .. } => query.clone(),
    }
}
