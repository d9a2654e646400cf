//! End-to-end tests of the library pipeline: payload, adapter, value object,
//! aggregator, text and exit code.

use chrono::{DateTime, Utc};
use gh_facts::adapters::{FromSource, SourceContext, SourceKind, normalize};
use gh_facts::aggregator::{AggregatorState, ErrorKind, ResultAggregator, STOP_MARKER, TerminalError};
use gh_facts::facts::{EntityKind, PullRequest, PullRequestState, ToFactPairs};
use gh_facts::keys::{FactKey, GenericKey, registry};
use serde_json::json;

fn now() -> DateTime<Utc> {
    "2024-06-15T00:00:00Z".parse().unwrap()
}

#[test]
fn test_graphql_pull_request_to_text() {
    let payload = json!({
        "data": {
            "repository": {
                "pullRequest": {
                    "id": "PR_kwDO",
                    "number": 42,
                    "title": "Add caching",
                    "state": "MERGED",
                    "isDraft": false,
                    "author": {"login": "alice"},
                    "labels": {"nodes": [{"name": "perf"}]},
                    "additions": 120,
                    "deletions": 20,
                    "createdAt": "2024-06-01T00:00:00Z",
                    "updatedAt": "2024-06-05T00:00:00Z",
                    "closedAt": "2024-06-05T00:00:00Z",
                    "mergedAt": "2024-06-05T00:00:00Z",
                    "url": "https://github.com/o/r/pull/42",
                    "repository": {"nameWithOwner": "o/r"}
                }
            }
        }
    });

    let pr = PullRequest::from_graphql_response(&payload, &SourceContext::new()).unwrap();
    assert_eq!(pr.state(), PullRequestState::Merged);

    let mut aggregator = ResultAggregator::new();
    aggregator.add_pair(GenericKey::Status.name(), "success").unwrap();
    aggregator.add_pairs(&pr.to_fact_pairs(now())).unwrap();

    let text = aggregator.serialize();
    assert!(text.starts_with("STATUS=success\nPULL_REQUEST_ID=PR_kwDO\n"));
    assert!(text.contains("\nPULL_REQUEST_STATE=merged\n"));
    assert!(text.contains("\nPULL_REQUEST_LABELS=perf\n"));
    assert!(text.contains("\nPULL_REQUEST_REPOSITORY=o/r\n"));
    assert!(text.contains("\nPULL_REQUEST_NET_CHANGES=100\n"));
    assert!(!text.contains(STOP_MARKER));
    assert!(!text.ends_with('\n'));
    assert_eq!(aggregator.exit_code(), 0);
}

#[test]
fn test_every_source_shape_emits_the_same_key_set() {
    let tool = json!({"number": 1, "title": "t", "state": "OPEN", "createdAt": "2024-06-01T00:00:00Z"});
    let rest = json!({"number": 1, "title": "t", "state": "open", "created_at": "2024-06-01T00:00:00Z"});
    let graphql = json!({"data": {"repository": {"issue": {"number": 1, "title": "t", "state": "OPEN", "createdAt": "2024-06-01T00:00:00Z"}}}});

    let context = SourceContext::new().with_repository("o/r");
    let keys = |source: SourceKind, payload: &serde_json::Value| -> Vec<&'static str> {
        normalize(EntityKind::Issue, source, payload, &context, now()).unwrap().keys().collect()
    };

    let tool_keys = keys(SourceKind::ToolOutput, &tool);
    assert_eq!(tool_keys, keys(SourceKind::Rest, &rest));
    assert_eq!(tool_keys, keys(SourceKind::GraphQl, &graphql));
    assert!(tool_keys.iter().all(|key| registry().any(|info| info.name == *key)));
}

#[test]
fn test_failure_mid_run_keeps_earlier_facts() {
    let context = SourceContext::new();
    let mut aggregator = ResultAggregator::new();

    let repository = json!({
        "id": 7, "name": "r", "full_name": "o/r", "owner": {"login": "o", "type": "User"},
        "created_at": "2024-01-01T00:00:00Z"
    });
    assert!(aggregator.record(normalize(EntityKind::Repository, SourceKind::Rest, &repository, &context, now())));
    assert_eq!(aggregator.state(), AggregatorState::Accumulating);

    let commit = json!({"commit": {"message": "no sha"}});
    assert!(!aggregator.record(normalize(EntityKind::Commit, SourceKind::Rest, &commit, &context, now())));
    assert_eq!(aggregator.state(), AggregatorState::Failed);

    let later = TerminalError::new(ErrorKind::FetchFailed, "ignored");
    assert!(!aggregator.set_error(later));

    let text = aggregator.serialize();
    let (facts, error_block) = text.split_once(STOP_MARKER).unwrap();
    assert!(facts.contains("REPOSITORY_FULL_NAME=o/r"));
    assert!(error_block.contains("ERROR_TYPE=MISSING_REQUIRED_FIELDS"));
    assert!(error_block.contains("ERROR_CONTEXT_ENTITY=commit"));
    assert!(error_block.contains("ERROR_CONTEXT_FIELDS=sha,commit.author.date"));
    assert!(error_block.contains("RECOVERY_SUGGESTION_1="));
    assert!(!error_block.contains("ignored"));
    assert_eq!(aggregator.exit_code(), 1);
}

#[test]
fn test_merge_of_partial_runs() {
    let context = SourceContext::new().with_repository("o/r").with_period_days(7);

    let mut first = ResultAggregator::new();
    let activity = json!({"commits": 14, "issues_opened": 3, "issues_closed": 1});
    assert!(first.record(normalize(EntityKind::ActivityMetrics, SourceKind::Rest, &activity, &context, now())));

    let mut second = ResultAggregator::new();
    let _ = second.set_error(TerminalError::new(ErrorKind::UpstreamError, "rate limited").with_context("status", "403"));

    first.merge(second);

    assert_eq!(first.get("ACTIVITY_REPOSITORY"), Some("o/r"));
    assert_eq!(first.get("ACTIVITY_COMMITS_PER_DAY"), Some("2"));
    assert_eq!(first.error().map(TerminalError::kind), Some(ErrorKind::UpstreamError));
    assert!(first.serialize().ends_with("ERROR_CONTEXT_STATUS=403"));
}

#[test]
fn test_invalid_key_becomes_terminal_error() {
    let mut aggregator = ResultAggregator::new();
    let result = aggregator.add_pairs_bulk([("GOOD_KEY", "1"), ("bad key", "2"), ("OTHER_KEY", "3")]);

    assert_eq!(result.unwrap_err().key(), "bad key");
    assert_eq!(aggregator.get("GOOD_KEY"), Some("1"));
    assert_eq!(aggregator.get("OTHER_KEY"), Some("3"));
    assert_eq!(aggregator.error().map(TerminalError::kind), Some(ErrorKind::InvalidKey));
    assert_eq!(aggregator.exit_code(), 1);
}

#[test]
fn test_multiline_values_stay_on_one_line() {
    let payload = json!({
        "sha": "abc",
        "commit": {"message": "Subject\n\nBody line", "author": {"name": "A", "date": "2024-06-14T00:00:00Z"}}
    });

    let mut aggregator = ResultAggregator::new();
    assert!(aggregator.record(normalize(EntityKind::Commit, SourceKind::Rest, &payload, &SourceContext::new(), now())));

    let text = aggregator.serialize();
    assert!(text.lines().all(|line| line.contains('=')));
    assert!(text.contains("COMMIT_MESSAGE=Subject\\n\\nBody line"));
}
