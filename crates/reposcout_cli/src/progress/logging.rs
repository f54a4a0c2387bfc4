use reposcout::BrowseEvent;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: BrowseEvent) {
        match event {
            BrowseEvent::FetchStarted {
                generation,
                page,
                query,
            } => {
                tracing::info!(
                    query = %query.text,
                    page = page + 1,
                    per_page = query.per_page,
                    generation,
                    "Fetching page"
                );
            }

            BrowseEvent::FetchCompleted {
                page,
                count,
                total_count,
                has_next_page,
                ..
            } => {
                tracing::info!(page = page + 1, count, total_count, has_next_page, "Fetched page");
            }

            BrowseEvent::FetchFailed { page, error, .. } => {
                tracing::error!(page = page + 1, error = %error, "Fetch failed");
            }

            BrowseEvent::StaleDiscarded { generation, latest } => {
                tracing::debug!(generation, latest, "Dropped stale response");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
