//! Submission Adapter (§4.4): builds the wire request, POSTs it, and
//! classifies the response.
//!

use crate::token::fetch_access_token;
use crate::version::{adapt, EngineVersion};
use crate::wire::{build_fred_args, PopulationWire, RunRequest, SubmitRequest, SubmitResponseWire};
use simrun_common::{ClientConfig, ClientError, Result};
use simrun_params::RunParams;
use std::path::Path;

/// Default submission endpoint (§6.2).
pub const DEFAULT_ENDPOINT: &str = "https://studio.epistemix.cloud/v1/runs";

/// The client-version tag sent as `fredcli-version` (§4.4).
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the adapter needs to submit one run.
pub struct RunSubmission<'a> {
    pub params: &'a RunParams,
    pub output_dir: &'a Path,
    pub size: &'a str,
    pub version: &'a EngineVersion,
}

/// Successful submission outcome: the `run_id`s the service assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub run_ids: Vec<u64>,
}

/// Submits runs to the remote execution service.
pub struct SubmissionClient {
    http: reqwest::Client,
    config: ClientConfig,
    endpoint: String,
}

impl SubmissionClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the submission endpoint (used by tests against a mock
    /// server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[tracing::instrument(skip(self, submission), fields(program = %submission.params.program))]
    pub async fn submit(&self, submission: &RunSubmission<'_>) -> Result<SubmitOutcome> {
        let adapted = adapt(submission.params, submission.version);
        let fred_args = build_fred_args(&adapted, submission.output_dir, submission.version);

        let body = SubmitRequest {
            run_requests: vec![RunRequest {
                working_dir: program_dir(&submission.params.program),
                size: submission.size.to_string(),
                fred_version: submission.version.as_str().to_string(),
                population: PopulationWire {
                    version: submission.params.pop.name.clone(),
                    locations: submission.params.pop.locations.clone(),
                },
                fred_args,
            }],
        };

        let mut req = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("fredcli-version", CLIENT_VERSION)
            .json(&body);

        req = if let Some(token) = self.config.offline_token() {
            req.header("Offline-Token", format!("Bearer {token}"))
        } else {
            let hub = self.config.hub_url().ok_or_else(|| {
                ClientError::RemoteUnavailable("no hub URL configured for token refresh".into())
            })?;
            let jpy = self.config.jpy_token().unwrap_or_default();
            let token = fetch_access_token(&self.http, hub, jpy).await?;
            req.header("Authorization", format!("Bearer {token}"))
        };

        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::RemoteUnavailable(e.to_string()))?;

        classify(resp).await
    }
}

/// The `workingDir` sent with a run request: the program file's containing
/// directory, not the run's output directory (§4.4/§6.2 leaves this field's
/// value unspecified; the original client sends the process's cwd, which is
/// always the directory holding the `.fred` program being submitted).
fn program_dir(program: &str) -> String {
    Path::new(program)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_string_lossy()
        .to_string()
}

async fn classify(resp: reqwest::Response) -> Result<SubmitOutcome> {
    let status = resp.status();

    if status.as_u16() == 401 || status.as_u16() == 403 {
        let desc = resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("description").and_then(|d| d.as_str().map(String::from)))
            .unwrap_or_else(|| "unauthorized".to_string());
        return Err(ClientError::UnauthorizedUser(desc));
    }

    if status.is_server_error() {
        return Err(ClientError::RemoteServerError(format!("HTTP {status}")));
    }

    if !status.is_success() {
        return Err(ClientError::RemoteServerError(format!(
            "unexpected HTTP status {status}"
        )));
    }

    let parsed: SubmitResponseWire = resp
        .json()
        .await
        .map_err(|e| ClientError::RemoteServerError(e.to_string()))?;

    let mut run_ids = Vec::with_capacity(parsed.run_responses.len());
    let mut failures = Vec::new();
    for run in &parsed.run_responses {
        match run.status.as_str() {
            "Submitted" => run_ids.push(run.run_id),
            "Failed" => {
                if let Some(errors) = &run.errors {
                    for e in errors {
                        failures.push(format!("{} error: {}", e.key, e.error));
                    }
                } else {
                    failures.push(format!("run {} failed", run.run_id));
                }
            }
            other => {
                return Err(ClientError::RemoteServerError(format!(
                    "unrecognized run status {other:?}"
                )))
            }
        }
    }

    if !failures.is_empty() {
        return Err(ClientError::RunConfigError(failures.join("; ")));
    }

    Ok(SubmitOutcome { run_ids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use simrun_params::PopRef;
    use std::path::PathBuf;

    fn params() -> RunParams {
        let pop = PopRef::new("US_County", vec!["42003".into()]).unwrap();
        RunParams::new("model.fred", pop, None, None, None, Some(42), false).unwrap()
    }

    #[test]
    fn program_dir_is_parent_of_program_path() {
        assert_eq!(program_dir("/home/epx/my-model/model.fred"), "/home/epx/my-model");
        assert_eq!(program_dir("model.fred"), ".");
    }

    #[tokio::test]
    async fn working_dir_is_program_directory_not_output_dir() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/runs")
                .json_body_partial(r#"{"runRequests": [{"workingDir": "/home/epx/my-model"}]}"#);
            then.status(200).json_body(serde_json::json!({
                "runResponses": [{"runId": 1, "status": "Submitted"}]
            }));
        });

        let config = ClientConfig::new("/tmp/cache").with_offline_token("tok");
        let client = SubmissionClient::new(config).with_endpoint(server.url("/v1/runs"));

        let version = EngineVersion::parse("11.0.1").unwrap();
        let pop = PopRef::new("US_County", vec!["42003".into()]).unwrap();
        let params =
            RunParams::new("/home/epx/my-model/model.fred", pop, None, None, None, Some(42), false)
                .unwrap();
        let submission = RunSubmission {
            params: &params,
            output_dir: &PathBuf::from("/tmp/runs/0"),
            size: "hot_small",
            version: &version,
        };

        client.submit(&submission).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn submitted_status_yields_run_ids() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/v1/runs");
            then.status(200).json_body(serde_json::json!({
                "runResponses": [
                    {"runId": 1, "status": "Submitted"}
                ]
            }));
        });

        let config = ClientConfig::new("/tmp/cache").with_offline_token("tok");
        let client = SubmissionClient::new(config).with_endpoint(server.url("/v1/runs"));

        let version = EngineVersion::parse("11.0.1").unwrap();
        let params = params();
        let submission = RunSubmission {
            params: &params,
            output_dir: &PathBuf::from("/out/0"),
            size: "hot_small",
            version: &version,
        };

        let outcome = client.submit(&submission).await.unwrap();
        m.assert();
        assert_eq!(outcome.run_ids, vec![1]);
    }

    #[tokio::test]
    async fn failed_status_yields_run_config_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/runs");
            then.status(200).json_body(serde_json::json!({
                "runResponses": [{
                    "runId": 42,
                    "status": "Failed",
                    "errors": [{"key": "size", "error": "The compute size provided is invalid"}]
                }]
            }));
        });

        let config = ClientConfig::new("/tmp/cache").with_offline_token("tok");
        let client = SubmissionClient::new(config).with_endpoint(server.url("/v1/runs"));
        let version = EngineVersion::parse("11.0.1").unwrap();
        let params = params();
        let submission = RunSubmission {
            params: &params,
            output_dir: &PathBuf::from("/out/0"),
            size: "hot_small",
            version: &version,
        };

        let err = client.submit(&submission).await.unwrap_err();
        match err {
            ClientError::RunConfigError(msg) => {
                assert_eq!(msg, "size error: The compute size provided is invalid")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn forbidden_yields_unauthorized_user() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/runs");
            then.status(403)
                .json_body(serde_json::json!({"description": "Unauthorized error detail."}));
        });

        let config = ClientConfig::new("/tmp/cache").with_offline_token("tok");
        let client = SubmissionClient::new(config).with_endpoint(server.url("/v1/runs"));
        let version = EngineVersion::parse("11.0.1").unwrap();
        let params = params();
        let submission = RunSubmission {
            params: &params,
            output_dir: &PathBuf::from("/out/0"),
            size: "hot_small",
            version: &version,
        };

        let err = client.submit(&submission).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authorization error: Unauthorized error detail."
        );
    }

    #[tokio::test]
    async fn server_error_is_surfaced_generically() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/runs");
            then.status(500);
        });

        let config = ClientConfig::new("/tmp/cache").with_offline_token("tok");
        let client = SubmissionClient::new(config).with_endpoint(server.url("/v1/runs"));
        let version = EngineVersion::parse("11.0.1").unwrap();
        let params = params();
        let submission = RunSubmission {
            params: &params,
            output_dir: &PathBuf::from("/out/0"),
            size: "hot_small",
            version: &version,
        };

        let err = client.submit(&submission).await.unwrap_err();
        assert!(matches!(err, ClientError::RemoteServerError(_)));
    }
}
