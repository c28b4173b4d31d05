use bizdesk::client::{ApiClient, ClientConfig, ClientError};
use bizdesk::events::{drain, Mutation, ResourceKind};
use bizdesk::model::{ExpenseFilter, RegisterRequest, TaskStatus};
use bizdesk::session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
use bizdesk::state::{Applied, CalendarView, StalePolicy};
use bizdesk::CalendarMonth;
use chrono::NaiveDate;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

const USER: &str = r#"{"id": 1, "username": "alice", "full_name": "Alice Smith"}"#;

fn client_for(server: &ServerGuard, session: Session) -> ApiClient {
    let config = ClientConfig {
        base_url: format!("{}/api", server.url()),
        ..ClientConfig::default()
    };
    ApiClient::new(config, session).unwrap()
}

fn logged_in(token: &str) -> (Arc<MemoryTokenStore>, Session) {
    let store = Arc::new(MemoryTokenStore::with_token(token));
    let session = Session::new(store.clone());
    (store, session)
}

fn task_json(id: u64, status: &str) -> String {
    json!({
        "id": id,
        "title": "Send invoice",
        "description": "March invoice for Acme",
        "status": status,
        "priority": "high",
        "due_date": "2024-03-15"
    })
    .to_string()
}

#[tokio::test]
async fn test_token_header_sent_only_when_logged_in() {
    let mut server = Server::new_async().await;

    let with_token = server
        .mock("GET", "/api/tasks/")
        .match_header("authorization", "Token abc123")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);
    assert!(client.list_tasks().await.unwrap().is_empty());
    with_token.assert_async().await;

    let without_token = server
        .mock("GET", "/api/customers/")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = client_for(&server, Session::in_memory());
    assert!(client.list_customers(None).await.unwrap().is_empty());
    without_token.assert_async().await;
}

#[tokio::test]
async fn test_login_persists_token() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/accounts/login/")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "username": "alice",
            "password": "secret"
        })))
        .with_status(200)
        .with_body(format!(r#"{{"token": "fresh-token", "user": {}}}"#, USER))
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.json");
    let session = Session::new(Arc::new(FileTokenStore::new(&path)));
    let client = client_for(&server, session);

    let user = client.login("alice", "secret").await.unwrap();
    login.assert_async().await;

    assert_eq!(user.display_name(), "Alice Smith");
    let state = client.session().snapshot().await;
    assert!(state.is_authenticated);
    assert!(!state.loading);
    assert_eq!(state.token.as_deref(), Some("fresh-token"));

    // A new process picks the token back up
    let reloaded = FileTokenStore::new(&path).load().unwrap();
    assert_eq!(reloaded.as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_login_failure_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/accounts/login/")
        .with_status(400)
        .with_body(r#"{"non_field_errors": ["Invalid credentials"]}"#)
        .create_async()
        .await;

    let client = client_for(&server, Session::in_memory());
    let err = client.login("alice", "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(400));
    assert!(client.session().token().await.is_none());
}

#[tokio::test]
async fn test_error_without_message_uses_fallback() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/tasks/")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);
    let err = client.list_tasks().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load tasks");
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords_locally() {
    let server = Server::new_async().await;
    let client = client_for(&server, Session::in_memory());

    let request = RegisterRequest {
        username: "bob".to_string(),
        email: "bob@example.com".to_string(),
        password: "one".to_string(),
        password_confirm: "two".to_string(),
        first_name: String::new(),
        last_name: String::new(),
    };
    assert!(matches!(
        client.register(&request).await,
        Err(ClientError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_logout_clears_token_even_when_server_fails() {
    let mut server = Server::new_async().await;
    let logout = server
        .mock("POST", "/api/accounts/logout/")
        .match_header("authorization", "Token abc123")
        .with_status(500)
        .create_async()
        .await;

    let (store, session) = logged_in("abc123");
    let client = client_for(&server, session);

    client.logout().await.unwrap();
    logout.assert_async().await;

    assert!(client.session().token().await.is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_init_auth_confirms_valid_token() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/accounts/check/")
        .with_status(200)
        .with_body(format!(r#"{{"is_authenticated": true, "user": {}}}"#, USER))
        .create_async()
        .await;

    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);
    assert!(client.session().is_loading().await);

    let state = client.init_auth().await;
    assert!(state.is_authenticated);
    assert!(!state.loading);
    assert_eq!(state.user.unwrap().username, "alice");
}

#[tokio::test]
async fn test_init_auth_drops_rejected_token() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/accounts/check/")
        .with_status(401)
        .with_body(r#"{"detail": "Invalid token."}"#)
        .create_async()
        .await;

    let (store, session) = logged_in("expired");
    let client = client_for(&server, session);

    let state = client.init_auth().await;
    assert!(!state.is_authenticated);
    assert!(!state.loading);
    assert!(state.token.is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_init_auth_without_token_makes_no_request() {
    let mut server = Server::new_async().await;
    let check = server
        .mock("GET", "/api/accounts/check/")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, Session::in_memory());
    let state = client.init_auth().await;

    assert!(!state.is_authenticated);
    assert!(!state.loading);
    check.assert_async().await;
}

#[tokio::test]
async fn test_toggle_reads_then_writes_done() {
    let mut server = Server::new_async().await;
    let read = server
        .mock("GET", "/api/tasks/7/")
        .with_status(200)
        .with_body(task_json(7, "in_progress"))
        .create_async()
        .await;
    let write = server
        .mock("PUT", "/api/tasks/7/")
        .match_body(Matcher::PartialJson(json!({
            "title": "Send invoice",
            "status": "done",
            "priority": "high",
            "due_date": "2024-03-15"
        })))
        .with_status(200)
        .with_body(task_json(7, "done"))
        .create_async()
        .await;

    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);
    let mut rx = client.events().subscribe();

    let task = client.toggle_task_status(7).await.unwrap();
    read.assert_async().await;
    write.assert_async().await;
    assert_eq!(task.status, TaskStatus::Done);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ResourceKind::Tasks);
    assert_eq!(events[0].mutation, Mutation::Updated);
    assert_eq!(events[0].id, Some(7));
}

#[tokio::test]
async fn test_failed_mutation_publishes_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", "/api/tasks/7/")
        .with_status(404)
        .with_body(r#"{"detail": "Not found."}"#)
        .create_async()
        .await;

    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);
    let mut rx = client.events().subscribe();

    let err = client.delete_task(7).await.unwrap_err();
    assert_eq!(err.to_string(), "Not found.");
    assert!(drain(&mut rx).is_empty());
    assert_eq!(client.events().version(ResourceKind::Tasks), 0);
}

#[tokio::test]
async fn test_calendar_view_loads_three_month_window() {
    let mut server = Server::new_async().await;
    let window = server
        .mock("GET", "/api/schedules/calendar/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start_date".into(), "2024-02-01".into()),
            Matcher::UrlEncoded("end_date".into(), "2024-04-30".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "schedules": [{
                    "id": 3,
                    "title": "Client visit",
                    "date": "2024-03-12",
                    "start_time": "09:30:00",
                    "end_time": "10:30:00",
                    "color": "green"
                }],
                "tasks": [serde_json::from_str::<serde_json::Value>(&task_json(7, "todo")).unwrap()]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);

    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let mut view = CalendarView::new(today, StalePolicy::Discard);
    let ticket = view.go_to(CalendarMonth::new(2024, 3).unwrap());

    assert_eq!(view.apply(ticket.run(&client).await), Applied::Updated);
    window.assert_async().await;

    assert_eq!(
        view.buckets().count_on(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()),
        1
    );
    assert_eq!(
        view.buckets().count_on(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
        1
    );
}

#[tokio::test]
async fn test_inverted_calendar_window_rejected_before_request() {
    let server = Server::new_async().await;
    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);

    let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert!(matches!(
        client.fetch_calendar_window(start, end).await,
        Err(ClientError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_expense_filter_and_generation() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/api/expenses/expenses/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("year".into(), "2024".into()),
            Matcher::UrlEncoded("month".into(), "3".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/api/expenses/recurring/generate/")
        .match_body(Matcher::Json(json!({"year": 2024, "month": 3})))
        .with_status(200)
        .with_body(
            json!({
                "message": "1 expense generated",
                "created": [{
                    "id": 40,
                    "date": "2024-03-25",
                    "amount": 12000,
                    "expense_type": "business",
                    "description": "Office rent"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (_store, session) = logged_in("abc123");
    let client = client_for(&server, session);
    let mut rx = client.events().subscribe();

    assert!(client
        .list_expenses(&ExpenseFilter::month(2024, 3))
        .await
        .unwrap()
        .is_empty());
    list.assert_async().await;

    let result = client.generate_recurring_expenses(2024, 3).await.unwrap();
    generate.assert_async().await;
    assert_eq!(result.created.len(), 1);
    assert_eq!(result.created[0].amount, 12000);

    let kinds: Vec<ResourceKind> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&ResourceKind::Expenses));

    assert!(matches!(
        client.generate_recurring_expenses(2024, 13).await,
        Err(ClientError::InvalidInput(_))
    ));
}
