//! Integration tests for the command-line front-end, driven through `run` with a
//! capturing host.

use camino::{Utf8Path, Utf8PathBuf};
use gh_facts::Host;
use std::fs;

/// Test host that captures output to in-memory buffers.
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
    exit_code: Option<i32>,
}

impl TestHost {
    const fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
            exit_code: None,
        }
    }

    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

fn write(dir: &Utf8Path, name: &str, text: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_normalize_graphql_project_item() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8Path::from_path(dir.path()).unwrap();
    let input = write(
        root,
        "item.json",
        r#"{"data": {"node": {
            "id": "PVTI_1",
            "type": "ISSUE",
            "content": {"__typename": "Issue", "number": 5, "title": "Crash", "state": "OPEN",
                        "repository": {"nameWithOwner": "o/r"}},
            "fieldValues": {"nodes": [
                {"__typename": "ProjectV2ItemFieldSingleSelectValue", "name": "In Progress", "field": {"name": "Status"}}
            ]}
        }}}"#,
    );

    let mut host = TestHost::new();
    gh_facts::run(
        &mut host,
        [
            "gh-facts",
            "normalize",
            "--entity",
            "project-item",
            "--source",
            "graphql",
            "--input",
            input.as_str(),
            "--now",
            "2024-06-15T00:00:00Z",
        ],
    )
    .unwrap();

    let output = host.output_str();
    assert!(output.starts_with("STATUS=success\nVALID=true\nGENERATED_AT=2024-06-15T00:00:00Z\nENTITY_TYPE=project-item\nSOURCE_FORMAT=graphql\n"));
    assert!(output.contains("PROJECT_ITEM_ID=PVTI_1\n"));
    assert!(output.contains("PROJECT_ITEM_STATUS=In Progress\n"));
    assert!(output.contains("PROJECT_ITEM_REPOSITORY=o/r\n"));
    assert_eq!(host.exit_code, Some(0));
}

#[test]
fn test_normalize_graphql_errors_are_reported_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8Path::from_path(dir.path()).unwrap();
    let input = write(root, "errors.json", r#"{"data": null, "errors": [{"message": "Could not resolve to a Repository"}]}"#);

    let mut host = TestHost::new();
    gh_facts::run(
        &mut host,
        ["gh-facts", "normalize", "--entity", "repository", "--source", "graphql", "--input", input.as_str()],
    )
    .unwrap();

    let output = host.output_str();
    assert!(output.starts_with("STATUS=error\nVALID=false\n"));
    assert!(output.contains("STOP PROCESSING\nERROR_TYPE=UPSTREAM_ERROR\n"));
    assert!(output.contains("Could not resolve to a Repository"));
    assert!(host.error_buf.is_empty());
    assert_eq!(host.exit_code, Some(1));
}

#[test]
fn test_collect_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8Path::from_path(dir.path()).unwrap();
    let _ = write(
        root,
        "activity.json",
        r#"{"commits": [
            {"sha": "a", "commit": {"author": {"name": "Ann", "date": "2024-06-10T00:00:00Z"}}},
            {"sha": "b", "commit": {"author": {"name": "Ann", "date": "2024-06-11T00:00:00Z"}}},
            {"sha": "c", "commit": {"author": {"name": "Bo", "date": "2024-06-12T00:00:00Z"}}}
        ]}"#,
    );
    let _ = write(
        root,
        "issues.json",
        r#"[{"number": 1, "title": "a", "state": "open", "created_at": "2024-06-01T00:00:00Z"},
            {"number": 2, "title": "b", "state": "closed", "created_at": "2024-06-02T00:00:00Z", "closed_at": "2024-06-03T00:00:00Z"}]"#,
    );
    let manifest = write(
        root,
        "gh-facts.toml",
        r#"
now = "2024-06-15T00:00:00Z"

[[payload]]
entity = "activity-metrics"
source = "rest"
path = "activity.json"
repository = "o/r"
period_days = 7

[[payload]]
entity = "issue"
source = "rest"
path = "issues.json"
repository = "o/r"
"#,
    );

    let mut host = TestHost::new();
    gh_facts::run(&mut host, ["gh-facts", "collect", "--manifest", manifest.as_str()]).unwrap();

    let output = host.output_str();
    assert!(output.starts_with("STATUS=success\n"));
    assert!(output.contains("ACTIVITY_COMMITS=3\n"));
    assert!(output.contains("ACTIVITY_CONTRIBUTORS=2\n"));
    assert!(output.contains("ISSUE_STATE_1=open\n"));
    assert!(output.contains("ISSUE_STATE_2=closed\n"));
    assert!(output.ends_with("COUNT=3\n"));
    assert_eq!(host.exit_code, Some(0));
}

#[test]
fn test_collect_missing_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = Utf8Path::from_path(dir.path()).unwrap().join("absent.toml");

    let mut host = TestHost::new();
    let result = gh_facts::run(&mut host, ["gh-facts", "collect", "--manifest", manifest.as_str()]);

    assert!(result.is_err());
    assert!(host.output_buf.is_empty());
    assert_eq!(host.exit_code, Some(1));
}

#[test]
fn test_keys_lists_registry() {
    let mut host = TestHost::new();
    gh_facts::run(&mut host, ["gh-facts", "keys"]).unwrap();

    let output = host.output_str();
    assert!(output.starts_with("STATUS="));
    assert!(output.lines().any(|line| line.starts_with("REPOSITORY_STARGAZERS_COUNT=")));
    assert!(output.lines().any(|line| line.starts_with("PROJECT_SUMMARY_COMPLETION_RATIO=")));
}
