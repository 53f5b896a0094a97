//! Git audit log report CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** from flags and GitHub Actions `INPUT_*`
//!    environment variables, and validate it into a [`pipeline::ReportConfig`].
//! 2. **Wire observability** with `tracing-subscriber` (text or JSON) and, when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: one [`github::GithubClient`] serves as both
//!    the audit log source and the report publisher.
//! 4. **Run** the report once and translate the outcome into an exit status.
//!    Failures are surfaced as a GitHub Actions `::error::` workflow command.

mod config;
mod telemetry;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info_span, Instrument};

use github::GithubClient;
use pipeline::{publish_report, render_report, ReportRunId, Timestamp};

use crate::config::{Cli, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{message}");
            set_failed(&message);
            return ExitCode::FAILURE;
        }
    };

    let telemetry = match telemetry::init(cli.log_format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            set_failed(&format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };

    let run_id = ReportRunId::new_random();
    let result = run(cli, &mut std::io::stdout())
        .instrument(info_span!("report_run", run_id = %run_id))
        .await;

    let status = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = format!("{e:#}");
            error!(run_id = %run_id, error = %message, "report run failed");
            set_failed(&message);
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    status
}

/// Parses the command line.
///
/// `--help` and `--version` exit through clap as usual; any other parse
/// failure is returned as its rendered message.
fn parse_cli<I, T>(args: I) -> std::result::Result<Cli, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => Err(e.render().to_string().trim_end().to_owned()),
    }
}

/// Runs one report. In dry-run mode the CSV is written to `out` and nothing
/// is committed.
async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let Settings {
        report,
        client,
        dry_run,
    } = cli.resolve()?;

    let github = GithubClient::new(client)?;
    let rendered = render_report(&report, &github, Timestamp::now()).await?;

    if dry_run {
        out.write_all(rendered.csv.as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    publish_report(&rendered, &github).await?;
    Ok(())
}

/// Marks the Actions step failed with `message`.
fn set_failed(message: &str) {
    println!("::error::{}", escape_command_data(message));
}

/// Escapes text for use as workflow command data.
fn escape_command_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn args(api_url: &str, extra: &[&str]) -> Vec<String> {
        [
            "git-audit-report",
            "--token",
            "t",
            "--org",
            "acme",
            "--repository",
            "acme/reports",
            "--api-url",
            api_url,
        ]
        .iter()
        .chain(extra)
        .map(|s| s.to_string())
        .collect()
    }

    #[tokio::test]
    async fn dry_run_writes_only_the_csv_and_commits_nothing() {
        let server = MockServer::start().await;
        let recent = Timestamp::now().as_event_time().as_millis() - 86_400_000;

        Mock::given(method("GET"))
            .and(path("/orgs/acme/audit-log"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "@timestamp": recent, "action": "git.clone", "repo": "acme/foo" }
            ])))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let cli = parse_cli(args(&server.uri(), &["--dry-run"])).unwrap();
        let mut out = Vec::new();
        run(cli, &mut out).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Repository,Git clones (<7 days),Git pushes (<7 days),Git fetches (<7 days)\n\
             foo,1,0,0\n"
        );
    }

    #[tokio::test]
    async fn publishing_run_writes_nothing_to_output() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/orgs/acme/audit-log"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let cli = parse_cli(args(&server.uri(), &[])).unwrap();
        let mut out = Vec::new();
        run(cli, &mut out).await.unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn parse_errors_are_returned_for_reporting() {
        let message = parse_cli(args("https://api.github.com", &["--log-format", "xml"]))
            .err()
            .unwrap();

        assert!(message.contains("xml"), "{message}");
    }

    #[test]
    fn command_data_escapes_line_breaks_and_percent() {
        assert_eq!(
            escape_command_data("100% failed\r\nretry"),
            "100%25 failed%0D%0Aretry"
        );
    }

    #[test]
    fn plain_messages_pass_through() {
        assert_eq!(escape_command_data("Bad credentials"), "Bad credentials");
    }
}
