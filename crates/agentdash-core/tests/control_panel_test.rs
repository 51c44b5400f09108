// End-to-end tests: ControlPanel requests against wiremock, outcomes
// applied to a Dashboard.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agentdash_core::components::MemoryStore;
use agentdash_core::{
    AgentAction, AgentProfile, CommandOutcome, Dashboard, DashboardConfig, DashboardController,
    LogKind, SYSTEM_AGENT, SettingSpec, ThemePreference,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardController, Dashboard) {
    let server = MockServer::start().await;
    let config = DashboardConfig {
        api_url: Url::parse(&server.uri()).unwrap(),
        agents: vec![
            AgentProfile {
                name: "Developer".into(),
                settings: vec![SettingSpec {
                    name: "Priority".into(),
                    options: vec!["normal".into(), "high".into()],
                    value: Some("normal".into()),
                }],
            },
            AgentProfile::new("Business Analyst"),
        ],
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::new(
        &config,
        ThemePreference::load(Box::new(MemoryStore::default())),
    );
    let controller = DashboardController::new(config).unwrap();
    (server, controller, dashboard)
}

async fn mount_control(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/agents/control"))
        .respond_with(ResponseTemplate::new(status).set_body_string("agent busy"))
        .mount(server)
        .await;
}

// ── Control ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_control_500_logs_one_error_and_keeps_status() {
    let (server, controller, mut dash) = setup().await;
    mount_control(&server, 500).await;

    dash.board.apply_control_result("Developer", AgentAction::Resume);
    let before = dash.board.card("Developer").unwrap().status_tag().to_owned();

    let outcome = controller
        .control_panel()
        .send_control("Developer", AgentAction::Pause)
        .await;
    assert!(outcome.is_failure());
    dash.apply_outcome(&outcome);

    assert_eq!(dash.logs.len(), 1);
    let entry = dash.logs.visible().next().unwrap();
    assert_eq!(entry.kind, LogKind::Error);
    assert_eq!(entry.agent, SYSTEM_AGENT);
    assert!(entry.message.contains("Developer"));
    assert!(entry.message.contains("pause"));
    assert!(entry.message.contains("500"));
    assert_eq!(dash.board.card("Developer").unwrap().status_tag(), before);
}

#[tokio::test]
async fn test_control_200_pause_sets_paused() {
    let (server, controller, mut dash) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/agents/control"))
        .and(body_json(json!({"agent": "Developer", "action": "pause"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = controller
        .control_panel()
        .send_control("Developer", AgentAction::Pause)
        .await;
    assert_eq!(
        outcome,
        CommandOutcome::ControlApplied {
            agent: "Developer".into(),
            action: AgentAction::Pause,
        }
    );
    dash.apply_outcome(&outcome);

    assert_eq!(dash.board.card("Developer").unwrap().status_tag(), "paused");
    assert!(dash.logs.is_empty());
}

#[tokio::test]
async fn test_control_200_resume_and_restart_set_active() {
    let (server, controller, mut dash) = setup().await;
    mount_control(&server, 200).await;
    let panel = controller.control_panel();

    for action in [AgentAction::Resume, AgentAction::Restart] {
        dash.board.apply_control_result("Business Analyst", AgentAction::Pause);
        let outcome = panel.send_control("Business Analyst", action).await;
        dash.apply_outcome(&outcome);
        assert_eq!(
            dash.board.card("Business Analyst").unwrap().status_tag(),
            "active"
        );
    }
}

#[tokio::test]
async fn test_control_unreachable_backend_is_logged() {
    let (server, controller, mut dash) = setup().await;
    drop(server);

    let outcome = controller
        .control_panel()
        .send_control("Developer", AgentAction::Restart)
        .await;
    dash.apply_outcome(&outcome);

    let entry = dash.logs.visible().next().unwrap();
    assert_eq!(entry.kind, LogKind::Error);
    assert!(entry.message.starts_with("Failed to restart Developer:"));
}

#[tokio::test]
async fn test_control_timeout_names_configured_limit() {
    let server = MockServer::start().await;
    let config = DashboardConfig {
        api_url: Url::parse(&server.uri()).unwrap(),
        timeout: Duration::from_secs(1),
        agents: vec![AgentProfile::new("Developer")],
        ..DashboardConfig::default()
    };
    let mut dash = Dashboard::new(
        &config,
        ThemePreference::load(Box::new(MemoryStore::default())),
    );
    let controller = DashboardController::new(config).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/agents/control"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let outcome = controller
        .control_panel()
        .send_control("Developer", AgentAction::Pause)
        .await;
    dash.apply_outcome(&outcome);

    let entry = dash.logs.visible().next().unwrap();
    assert_eq!(
        entry.message,
        "Failed to pause Developer: request timed out after 1s"
    );
}

// ── Settings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setting_success_logs_info_and_records_value() {
    let (server, controller, mut dash) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/agents/settings"))
        .and(body_json(
            json!({"agent": "Developer", "setting": "Priority", "value": "high"}),
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = controller
        .control_panel()
        .send_setting_change("Developer", "Priority", "high")
        .await;
    dash.apply_outcome(&outcome);

    let entry = dash.logs.visible().next().unwrap();
    assert_eq!(entry.kind, LogKind::Info);
    assert_eq!(entry.message, "Updated Priority for Developer to high");
    let setting = &dash.board.card("Developer").unwrap().settings[0];
    assert_eq!(setting.value.as_deref(), Some("high"));
}

#[tokio::test]
async fn test_setting_failure_logs_error_and_keeps_value() {
    let (server, controller, mut dash) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/agents/settings"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let outcome = controller
        .control_panel()
        .send_setting_change("Developer", "Priority", "high")
        .await;
    dash.apply_outcome(&outcome);

    let entry = dash.logs.visible().next().unwrap();
    assert_eq!(entry.kind, LogKind::Error);
    assert!(
        entry
            .message
            .starts_with("Failed to update Priority for Developer:")
    );
    let setting = &dash.board.card("Developer").unwrap().settings[0];
    assert_eq!(setting.value.as_deref(), Some("normal"));
}
