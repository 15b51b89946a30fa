use relaycrew::app::command_handlers::run::{execute_plan, ABORTED_MESSAGE};
use relaycrew::app::command_handlers::{run_cli_with_settings, EXIT_FAILURE, EXIT_NOT_CONFIGURED};
use relaycrew::config::{Settings, ToolMode};
use relaycrew::orchestration::StreamReviewGate;
use relaycrew::provider::{AgentContext, ProviderError, ToolResults};
use relaycrew::shared::logging::EventLog;
use serde_json::json;
use std::fs;
use std::io::Cursor;
use std::path::Path;

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|arg| arg.to_string()).collect()
}

fn simulated_settings(root: &Path, tools: serde_json::Value) -> Settings {
    let fixtures = root.join("fixtures.json");
    fs::write(
        &fixtures,
        serde_json::to_string(&json!({
            "initialize": {"result": {}},
            "tools/list": {"result": {"tools": tools}}
        }))
        .expect("encode"),
    )
    .expect("fixtures");
    let mut settings = Settings::for_workspace(root);
    settings.tools.url = Some("http://localhost:3000".to_string());
    settings.tools.token = Some("tok".to_string());
    settings.tools.mode = ToolMode::Simulation;
    settings.tools.fixtures = Some(fixtures);
    settings
}

#[test]
fn check_without_endpoint_exits_with_not_configured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = run_cli_with_settings(&Settings::for_workspace(dir.path()), args(&["check"]))
        .expect_err("not configured");
    assert_eq!(err.exit_code, EXIT_NOT_CONFIGURED);
}

#[test]
fn check_reports_mode_and_tool_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = simulated_settings(dir.path(), json!([{"name": "a"}, {"name": "b"}]));
    let output = run_cli_with_settings(&settings, args(&["check", "--require", "a,b"]))
        .expect("check");
    assert!(output.starts_with("OK: tools reachable (mode=simulation), tools: 2"));
}

#[test]
fn check_fails_when_management_tools_are_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = simulated_settings(dir.path(), json!([{"name": "n8n_create_workflow"}]));
    let err = run_cli_with_settings(&settings, args(&["check", "--require-management"]))
        .expect_err("missing management tool");
    assert_eq!(err.exit_code, EXIT_FAILURE);
    assert!(err.message.contains("n8n_update_partial_workflow"));
    assert!(!err.message.contains("n8n_create_workflow,"));
}

#[test]
fn package_zips_deliverables_relative_to_the_deliverables_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let project = dir.path().join("deliverables/demo");
    fs::create_dir_all(project.join("notes")).expect("project");
    fs::write(project.join("draft.md"), "DRAFT").expect("draft");
    fs::write(project.join("notes/extra.md"), "EXTRA").expect("extra");
    let settings = Settings::for_workspace(dir.path());

    let output = run_cli_with_settings(&settings, args(&["package", "--project", "demo"]))
        .expect("package");
    assert!(output.contains("package-demo.zip"));

    let file = fs::File::open(dir.path().join("package-demo.zip")).expect("zip");
    let mut archive = zip::ZipArchive::new(file).expect("archive");
    let mut names = (0..archive.len())
        .map(|index| archive.by_index(index).expect("entry").name().to_string())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["demo/draft.md", "demo/notes/extra.md"]);
}

#[test]
fn package_without_deliverables_exits_with_two() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = run_cli_with_settings(&Settings::for_workspace(dir.path()), args(&["package"]))
        .expect_err("missing");
    assert_eq!(err.exit_code, EXIT_NOT_CONFIGURED);
    assert!(err.message.contains("unnamed_project"));
}

#[test]
fn run_reports_reviewer_abort_and_keeps_earlier_deliverables() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("workflows")).expect("workflows");
    fs::create_dir_all(root.join("agents/core")).expect("agents");
    fs::write(root.join("agents/core/Writer.md"), "writer").expect("prompt");
    fs::write(root.join("agents/core/Builder.md"), "builder").expect("prompt");
    fs::write(
        root.join("workflows/default.yml"),
        "phases:\n  - name: P\n    steps:\n      - agent: Writer\n        output: draft\n      - agent: HumanReview\n      - agent: Builder\n        output: build\n",
    )
    .expect("workflow");
    let plan = root.join("plan.yml");
    fs::write(&plan, "project_name: demo\nworkflow_definition: default.yml\n").expect("plan");

    let agent = Box::new(
        |agent: &str, _context: &AgentContext, _tools: &ToolResults| -> Result<String, ProviderError> {
            Ok(format!("{agent} text"))
        },
    );
    let review = Box::new(StreamReviewGate::new(Cursor::new("N\n".to_string()), Vec::new()));

    let err = execute_plan(
        &Settings::for_workspace(root),
        &plan,
        agent,
        review,
        EventLog::for_workspace(root),
    )
    .expect_err("aborted");
    assert_eq!(err.message, ABORTED_MESSAGE);
    assert_eq!(err.exit_code, EXIT_FAILURE);
    assert!(root.join("deliverables/demo/draft.md").exists());
    assert!(!root.join("deliverables/demo/build.md").exists());
}

fn analyst_workspace(root: &Path) -> std::path::PathBuf {
    fs::create_dir_all(root.join("workflows")).expect("workflows");
    fs::create_dir_all(root.join("agents/core")).expect("agents");
    fs::write(root.join("agents/core/Analyst.md"), "analyst").expect("prompt");
    fs::write(
        root.join("workflows/default.yml"),
        "phases:\n  - name: Discovery\n    steps:\n      - agent: Analyst\n        task: Pick nodes\n        output: nodes\n        mcp_tools:\n          - name: list_nodes\n",
    )
    .expect("workflow");
    let plan = root.join("plan.yml");
    fs::write(&plan, "project_name: demo\nworkflow_definition: default.yml\n").expect("plan");
    plan
}

fn echo_tools_agent() -> Box<dyn relaycrew::provider::AgentInvoker> {
    Box::new(
        |_agent: &str, _context: &AgentContext, tools: &ToolResults| -> Result<String, ProviderError> {
            Ok(tools.get("list_nodes").cloned().unwrap_or_default())
        },
    )
}

#[test]
fn simulation_run_needs_only_tool_call_fixtures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let plan = analyst_workspace(root);
    let fixtures = root.join("calls.json");
    fs::write(
        &fixtures,
        serde_json::to_string(&json!({
            "tools/call::list_nodes::{}": {
                "result": {"content": [{"type": "text", "text": "Webhook, Slack"}]}
            }
        }))
        .expect("encode"),
    )
    .expect("fixtures");
    let mut settings = Settings::for_workspace(root);
    settings.tools.url = Some("http://localhost:3000".to_string());
    settings.tools.token = Some("tok".to_string());
    settings.tools.mode = ToolMode::Simulation;
    settings.tools.fixtures = Some(fixtures);

    let output = execute_plan(
        &settings,
        &plan,
        echo_tools_agent(),
        Box::new(StreamReviewGate::new(Cursor::new(String::new()), Vec::new())),
        EventLog::for_workspace(root),
    )
    .expect("run");
    assert!(output.contains("Project 'demo' completed successfully!"));
    assert_eq!(
        fs::read_to_string(root.join("deliverables/demo/nodes.md")).expect("nodes"),
        "Webhook, Slack"
    );
}

#[test]
fn resume_with_tool_steps_completed_does_not_contact_the_endpoint() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let plan = analyst_workspace(root);
    let mut settings = Settings::for_workspace(root);
    settings.tools.url = Some("http://127.0.0.1:9".to_string());
    settings.tools.token = Some("tok".to_string());
    settings.tools.mode = ToolMode::Real;
    settings.tools.timeout_seconds = 1;
    let state_dir = settings.state_root();
    fs::create_dir_all(&state_dir).expect("state dir");
    fs::write(
        relaycrew::config::checkpoint_path(&state_dir, "demo"),
        serde_json::to_string(&json!({
            "project_name": "demo",
            "nodes": "Webhook",
            "history": [],
            "completed": ["0:0:Analyst:nodes"]
        }))
        .expect("encode"),
    )
    .expect("checkpoint");

    let output = execute_plan(
        &settings,
        &plan,
        Box::new(
            |agent: &str, _context: &AgentContext, _tools: &ToolResults| -> Result<String, ProviderError> {
                panic!("{agent} should have been skipped")
            },
        ),
        Box::new(StreamReviewGate::new(Cursor::new(String::new()), Vec::new())),
        EventLog::for_workspace(root),
    )
    .expect("resume");
    assert!(output.contains("completed successfully"));
}

#[test]
fn unknown_command_is_a_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = run_cli_with_settings(&Settings::for_workspace(dir.path()), args(&["deploy"]))
        .expect_err("unknown");
    assert_eq!(err.exit_code, EXIT_FAILURE);
}
