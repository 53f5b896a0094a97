//! Run orchestration: fetch → filter → aggregate → report → publish.
//!
//! Each stage is awaited to completion before the next starts. The two I/O
//! boundaries are the [`AuditLogSource`] and [`ReportPublisher`] ports; every
//! stage between them is local and deterministic given `now`.

use tracing::{debug, info, instrument};

use crate::{
    aggregate, filter_window, AuditLogSource, PublishRequest, Report, ReportConfig,
    ReportPublisher, ReportRunError, Timestamp,
};

/// Target of the progress lines a user watches while the report runs.
///
/// Subscribers should keep this target enabled at `info` regardless of the
/// general log level.
pub const CONSOLE_TARGET: &str = "git_audit_report";

/// A report that has been rendered but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Sorted report rows.
    pub report: Report,
    /// The rendered CSV text, header first.
    pub csv: String,
    /// The request a publisher should execute to persist `report`.
    pub request: PublishRequest,
}

/// Reads the audit log and renders the report for the window ending at `now`.
///
/// Fails with [`ReportRunError::Fetch`] before any aggregation if the source
/// fails, or [`ReportRunError::Report`] if the CSV cannot be produced.
#[instrument(skip_all, fields(org = %config.org, days = %config.window, sort = %config.sort))]
pub async fn render_report(
    config: &ReportConfig,
    source: &dyn AuditLogSource,
    now: Timestamp,
) -> Result<RenderedReport, ReportRunError> {
    let events = source.git_events(&config.org).await?;
    let from = config.window.start(now);

    debug!(fetched = events.len(), "audit log retrieved");
    info!(
        target: CONSOLE_TARGET,
        "Retrieve Git audit log for {} days starting at {}",
        config.window,
        from
    );

    let in_window = filter_window(events, from);
    let counts = aggregate(&in_window);
    let mut report = Report::from_counts(&counts, config.window);

    for row in report.rows() {
        info!(
            target: CONSOLE_TARGET,
            "{} ## Clones: {}, Pushes: {}, Fetches: {}",
            row.repo_name, row.git_clone, row.git_push, row.git_fetch
        );
    }

    report.sort_descending(config.sort);
    let csv = report.to_csv()?;
    let request = PublishRequest::for_report(
        &config.org,
        config.window,
        now,
        csv.clone(),
        config.committer.clone(),
    );

    Ok(RenderedReport {
        report,
        csv,
        request,
    })
}

/// Persists a rendered report through `publisher`.
#[instrument(skip_all, fields(path = %rendered.request.path))]
pub async fn publish_report(
    rendered: &RenderedReport,
    publisher: &dyn ReportPublisher,
) -> Result<(), ReportRunError> {
    info!(
        target: CONSOLE_TARGET,
        "Pushing final CSV report to repository path: {}",
        rendered.request.path
    );
    publisher.put(&rendered.request).await?;
    Ok(())
}

/// Renders the report for the window ending at `now` and publishes it.
pub async fn run_report(
    config: &ReportConfig,
    source: &dyn AuditLogSource,
    publisher: &dyn ReportPublisher,
    now: Timestamp,
) -> Result<RenderedReport, ReportRunError> {
    let rendered = render_report(config, source, now).await?;
    publish_report(&rendered, publisher).await?;
    Ok(rendered)
}
