use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reposcout::BrowseEvent;

/// Interactive progress reporter using indicatif.
///
/// At most one spinner is visible: the controller only has one meaningful
/// fetch at a time, and a newer fetch replaces the spinner of a stale one.
pub struct InteractiveReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    pub fn handle(&self, event: BrowseEvent) {
        let Ok(mut spinner) = self.spinner.lock() else {
            return;
        };

        match event {
            BrowseEvent::FetchStarted { page, query, .. } => {
                if let Some(old) = spinner.take() {
                    old.finish_and_clear();
                }
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.set_prefix(format!("page {}", page + 1));
                pb.set_message(format!("Searching \"{}\"...", query.text));
                pb.enable_steady_tick(Duration::from_millis(100));
                *spinner = Some(pb);
            }

            BrowseEvent::FetchCompleted { .. } | BrowseEvent::FetchFailed { .. } => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(pb) = spinner.take()
        {
            pb.finish_and_clear();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposcout::SearchQuery;

    fn started(page: usize) -> BrowseEvent {
        BrowseEvent::FetchStarted {
            generation: 1,
            page,
            query: SearchQuery::new("react", 10),
        }
    }

    fn has_spinner(reporter: &InteractiveReporter) -> bool {
        reporter.spinner.lock().unwrap().is_some()
    }

    #[test]
    fn spinner_lives_from_start_to_completion() {
        let reporter = InteractiveReporter::new();
        reporter.handle(started(0));
        assert!(has_spinner(&reporter));

        reporter.handle(BrowseEvent::FetchCompleted {
            generation: 1,
            page: 0,
            count: 10,
            total_count: 100,
            has_next_page: true,
        });
        assert!(!has_spinner(&reporter));
    }

    #[test]
    fn failure_and_finish_clear_spinner() {
        let reporter = InteractiveReporter::new();
        reporter.handle(started(1));
        reporter.handle(BrowseEvent::FetchFailed {
            generation: 1,
            page: 1,
            error: "boom".to_string(),
        });
        assert!(!has_spinner(&reporter));

        reporter.handle(started(2));
        reporter.finish();
        assert!(!has_spinner(&reporter));
    }

    #[test]
    fn stale_event_keeps_current_spinner() {
        let reporter = InteractiveReporter::new();
        reporter.handle(started(0));
        reporter.handle(BrowseEvent::StaleDiscarded {
            generation: 1,
            latest: 2,
        });
        assert!(has_spinner(&reporter));
        reporter.finish();
    }
}
