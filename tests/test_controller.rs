//! End-to-end tests: controller + runner against the in-memory backend,
//! and one full session against a mock HTTP server.

use sfapprove::api::memory::BackendCall;
use sfapprove::api::{
    ApprovalItem, AuthClient, Credentials, Decision, HttpBackend, ItemField, MemoryBackend,
    ServiceClient,
};
use sfapprove::controller::{run_until_idle, Button, Controller, MainStatus, Screen};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn creds() -> Credentials {
    Credentials {
        username: "sam@example.com".to_string(),
        password: "hunter2".to_string(),
    }
}

fn item(id: &str, fields: &[(&str, &str)]) -> ApprovalItem {
    ApprovalItem {
        id: id.to_string(),
        object_name: "Expense".to_string(),
        title: format!("Expense {}", id),
        fields: fields
            .iter()
            .map(|(name, value)| ItemField {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

fn controller() -> Controller {
    Controller::new(creds()).with_transition(Duration::ZERO)
}

/// Start the session and run until the list is showing.
async fn started(backend: &MemoryBackend) -> Controller {
    let mut c = controller();
    let effect = c.start();
    run_until_idle(&mut c, backend, effect).await;
    c
}

/// Press a button and run whatever it triggers to completion.
async fn press(c: &mut Controller, backend: &MemoryBackend, button: Button) {
    let effect = c.press(button);
    run_until_idle(c, backend, effect).await;
}

/// From the menu: open the selected item, go to confirm, decide.
async fn decide_selected(c: &mut Controller, backend: &MemoryBackend, decision: Decision) {
    press(c, backend, Button::Select).await;
    press(c, backend, Button::Select).await;
    let button = match decision {
        Decision::Approve => Button::Up,
        Decision::Reject => Button::Down,
    };
    press(c, backend, button).await;
}

fn ids(c: &Controller) -> Vec<String> {
    c.items().iter().map(|i| i.id.clone()).collect()
}

#[tokio::test]
async fn test_approve_then_reject_until_empty() {
    let backend = MemoryBackend::new(
        creds(),
        vec![item("A", &[("Amount", "10")]), item("B", &[("Amount", "20")])],
    );
    let mut c = started(&backend).await;
    assert_eq!(c.main_body(), "Loaded.");
    assert_eq!(ids(&c), vec!["A", "B"]);

    decide_selected(&mut c, &backend, Decision::Approve).await;
    assert_eq!(ids(&c), vec!["B"]);
    assert!(c.window_stack().is_none());
    assert!(matches!(c.screen(), Screen::Loaded(_)));

    decide_selected(&mut c, &backend, Decision::Reject).await;
    assert!(c.items().is_empty());
    assert!(c.menu().is_none());
    assert_eq!(c.status(), &MainStatus::NothingToApprove);
    assert_eq!(c.main_body(), "Nothing to approve.");
    assert!(matches!(c.screen(), Screen::Main { .. }));

    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::Login {
                username: "sam@example.com".to_string()
            },
            BackendCall::List {
                username: "sam@example.com".to_string()
            },
            BackendCall::Decide {
                item_id: "A".to_string(),
                approve: true
            },
            BackendCall::Decide {
                item_id: "B".to_string(),
                approve: false
            },
        ]
    );
    assert!(backend.pending().is_empty());
}

#[tokio::test]
async fn test_invalid_grant_stops_everything() {
    let backend = MemoryBackend::new(creds(), vec![item("A", &[])]);
    let mut c = Controller::new(Credentials {
        username: "sam@example.com".to_string(),
        password: "wrong".to_string(),
    });
    let effect = c.start();
    run_until_idle(&mut c, &backend, effect).await;

    assert_eq!(c.main_body(), "Failed:\n{\"error\":\"invalid_grant\"}");
    assert!(!c.has_token());

    for button in [Button::Select, Button::Up, Button::Down, Button::Select] {
        press(&mut c, &backend, button).await;
    }
    assert_eq!(backend.calls().len(), 1);
    assert!(matches!(backend.calls()[0], BackendCall::Login { .. }));
}

#[tokio::test]
async fn test_login_error_detail_is_shown_verbatim() {
    let detail = r#"{"error":"invalid_client_id","error_description":"client identifier invalid"}"#;
    let backend = MemoryBackend::new(creds(), vec![item("A", &[])]).with_login_error(detail);
    let mut c = Controller::new(Credentials {
        username: "sam@example.com".to_string(),
        password: "stale".to_string(),
    });
    let effect = c.start();
    run_until_idle(&mut c, &backend, effect).await;

    assert_eq!(c.main_body(), format!("Failed:\n{}", detail));
    assert!(!c.reload_enabled());
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_empty_upstream_list_shows_nothing_to_approve() {
    let backend = MemoryBackend::new(creds(), vec![]);
    let c = started(&backend).await;
    assert_eq!(c.status(), &MainStatus::NothingToApprove);
    assert!(c.menu().is_none());
}

#[tokio::test]
async fn test_detail_shows_server_fields_in_order() {
    let fields = [
        ("Stage", "Negotiation"),
        ("Amount", "250000"),
        ("Close Date", "2026-11-30"),
        ("Owner", "Sam"),
    ];
    let backend = MemoryBackend::new(creds(), vec![item("A", &[]), item("B", &fields)]);
    let mut c = started(&backend).await;

    press(&mut c, &backend, Button::Down).await;
    press(&mut c, &backend, Button::Select).await;
    match c.screen() {
        Screen::ItemDetail { item, .. } => {
            let shown: Vec<(&str, &str)> = item
                .fields
                .iter()
                .map(|f| (f.name.as_str(), f.value.as_str()))
                .collect();
            assert_eq!(shown, fields.to_vec());
            assert_eq!(
                item.detail_text(),
                "Stage: Negotiation\nAmount: 250000\nClose Date: 2026-11-30\nOwner: Sam\n"
            );
        }
        other => panic!("expected detail card, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_decide_keeps_item() {
    let a = item("A", &[("Amount", "10")]);
    let b = item("B", &[("Amount", "20")]);
    let backend = MemoryBackend::new(creds(), vec![a.clone(), b.clone()]);
    backend.fail_decide("A");
    let mut c = started(&backend).await;

    decide_selected(&mut c, &backend, Decision::Approve).await;
    match c.screen() {
        Screen::Error { message, .. } => assert!(message.contains("PROCESS_ERROR")),
        other => panic!("expected error card, got {:?}", other),
    }
    assert_eq!(c.items(), &[a.clone(), b.clone()]);

    // Dismiss the error, retry from the confirm card once the server recovers.
    press(&mut c, &backend, Button::Back).await;
    assert!(matches!(c.screen(), Screen::Confirming(_)));
    backend.clear_failures();
    press(&mut c, &backend, Button::Up).await;
    assert_eq!(c.items(), &[b]);
}

#[tokio::test]
async fn test_reload_after_list_failure() {
    let backend = MemoryBackend::new(creds(), vec![item("A", &[])]);
    backend.set_list_error(Some("{\"status\":503}"));
    let mut c = started(&backend).await;
    assert_eq!(c.main_body(), "Failed:\n{\"status\":503}");
    assert!(c.reload_enabled());

    backend.set_list_error(None);
    press(&mut c, &backend, Button::Select).await;
    assert_eq!(c.main_body(), "Loaded.");
    assert_eq!(ids(&c), vec!["A"]);

    // Only one login for the whole session.
    let logins = backend
        .calls()
        .into_iter()
        .filter(|call| matches!(call, BackendCall::Login { .. }))
        .count();
    assert_eq!(logins, 1);
}

#[tokio::test]
async fn test_reload_from_main_card_picks_up_new_state() {
    let backend = MemoryBackend::new(creds(), vec![item("A", &[]), item("B", &[])]);
    let mut c = started(&backend).await;

    // Back to the main card, then reload.
    press(&mut c, &backend, Button::Back).await;
    assert!(matches!(c.screen(), Screen::Main { .. }));
    press(&mut c, &backend, Button::Select).await;
    assert!(matches!(c.screen(), Screen::Loaded(_)));
    assert_eq!(ids(&c), vec!["A", "B"]);
}

#[tokio::test]
async fn test_full_session_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-http"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/GetWorkItems/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "WorkItems": [
                {"ObjectName": "Expense", "WorkItemName": "Taxi", "WorkItemId": "X1",
                 "Fields": [{"Name": "Amount", "Value": "30"}]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ApproveWorkItem/"))
        .and(body_json(serde_json::json!({ "WorkItemId": "X1", "Approve": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let backend = HttpBackend::new(
        AuthClient::new(
            http.clone(),
            format!("{}/services/oauth2/token", server.uri()),
            "id",
            "secret",
        ),
        ServiceClient::new(http, format!("{}/api", server.uri())),
    );

    let mut c = controller();
    let effect = c.start();
    run_until_idle(&mut c, &backend, effect).await;
    assert_eq!(c.items().len(), 1);

    for button in [Button::Select, Button::Select, Button::Up] {
        let effect = c.press(button);
        run_until_idle(&mut c, &backend, effect).await;
    }
    assert_eq!(c.main_body(), "Nothing to approve.");
}
