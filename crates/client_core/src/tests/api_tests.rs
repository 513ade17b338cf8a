use std::{collections::HashMap, sync::Arc};

use super::*;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use shared::{domain::Role, error::ErrorCode};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    multipart_fields: Arc<Mutex<Vec<(String, String)>>>,
    grades: Arc<Mutex<Vec<(i64, String, String)>>>,
    assignment_queries: Arc<Mutex<Vec<Option<String>>>>,
}

async fn spawn_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    Url::parse(&format!("http://{addr}/api")).expect("api url")
}

async fn login_handler() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "session=student-4; Path=/")],
        Json(json!({
            "status": "ok",
            "user": {"id": 4, "role": "student", "name": "Ada", "email": "ada@example.com"}
        })),
    )
}

async fn session_handler(headers: HeaderMap) -> impl IntoResponse {
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("session=student-4"));
    if has_cookie {
        Json(json!({
            "logged_in": true,
            "user": {"id": 4, "role": "student", "name": "Ada", "email": "ada@example.com"}
        }))
    } else {
        Json(json!({"logged_in": false}))
    }
}

async fn register_handler() -> impl IntoResponse {
    (
        StatusCode::CONFLICT,
        Json(json!({"error": "email already exists"})),
    )
}

async fn assignments_handler(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    state
        .assignment_queries
        .lock()
        .await
        .push(query.get("course_code").cloned());
    Json(json!([
        {"id": 3, "title": "Problem Set 1", "description": "limits", "created_at": "2025-09-01T00:00:00Z"},
        {"id": 2, "title": "Reading", "description": ""}
    ]))
}

async fn submissions_post_handler(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name() {
            Some(file_name) => format!("file:{file_name}"),
            None => field.text().await.unwrap_or_default(),
        };
        state.multipart_fields.lock().await.push((name, value));
    }
    (StatusCode::CREATED, Json(json!({"status": "submitted"})))
}

async fn grade_handler(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(body): Json<GradeRequest>,
) -> impl IntoResponse {
    state.grades.lock().await.push((id, body.grade, body.feedback));
    Json(json!({"status": "graded"}))
}

async fn unauthorized_handler() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Not logged in"})),
    )
}

fn app(state: ServerState) -> Router {
    Router::new()
        .route("/api/login", post(login_handler))
        .route("/api/session", get(session_handler))
        .route("/api/register", post(register_handler))
        .route("/api/assignments", get(assignments_handler))
        .route(
            "/api/submissions",
            post(submissions_post_handler).get(unauthorized_handler),
        )
        .route("/api/submissions/:id", patch(grade_handler))
        .route("/api/classlist", get(|| async { "not json" }))
        .with_state(state)
}

#[tokio::test]
async fn session_cookie_survives_between_requests() {
    let base = spawn_server(app(ServerState::default())).await;
    let api = HttpClassroomApi::new(base, None).expect("client");

    assert!(api.session().await.expect("session").is_none());

    let user = api
        .login(&LoginRequest {
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
            role: Role::Student,
        })
        .await
        .expect("login");
    assert_eq!(user.role, Role::Student);

    let session = api.session().await.expect("session").expect("logged in");
    assert_eq!(session.email, "ada@example.com");
}

#[tokio::test]
async fn non_success_maps_error_body() {
    let base = spawn_server(app(ServerState::default())).await;
    let api = HttpClassroomApi::new(base, None).expect("client");

    let err = api
        .register(&RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .expect_err("conflict");
    match err {
        ClientError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 409);
            assert_eq!(code, ErrorCode::Conflict);
            assert_eq!(message, "email already exists");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = api.list_submissions().await.expect_err("unauthorized");
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn assignments_are_filtered_by_course_code() {
    let state = ServerState::default();
    let base = spawn_server(app(state.clone())).await;
    let api = HttpClassroomApi::new(base, None).expect("client");

    let assignments = api
        .list_assignments(Some("MATH10100"))
        .await
        .expect("assignments");
    assert_eq!(assignments.len(), 2);
    assert_eq!(assignments[0].id, AssignmentId(3));
    api.list_assignments(None).await.expect("assignments");

    assert_eq!(
        *state.assignment_queries.lock().await,
        vec![Some("MATH10100".to_string()), None]
    );
}

#[tokio::test]
async fn submission_is_sent_as_multipart() {
    let state = ServerState::default();
    let base = spawn_server(app(state.clone())).await;
    let api = HttpClassroomApi::new(base, None).expect("client");

    api.submit(&NewSubmission {
        assignment_id: AssignmentId(3),
        content: "answers attached".to_string(),
        file: Some(FileUpload {
            file_name: "ps1.zip".to_string(),
            mime_type: Some("application/zip".to_string()),
            bytes: b"PK\x03\x04".to_vec(),
        }),
    })
    .await
    .expect("submit");

    let fields = state.multipart_fields.lock().await.clone();
    assert_eq!(
        fields,
        vec![
            ("assignment_id".to_string(), "3".to_string()),
            ("content".to_string(), "answers attached".to_string()),
            ("file".to_string(), "file:ps1.zip".to_string()),
        ]
    );
}

#[tokio::test]
async fn grade_patches_submission() {
    let state = ServerState::default();
    let base = spawn_server(app(state.clone())).await;
    let api = HttpClassroomApi::new(base, None).expect("client");

    api.grade_submission(
        SubmissionId(9),
        &GradeRequest {
            grade: "A-".to_string(),
            feedback: "Nice work".to_string(),
        },
    )
    .await
    .expect("grade");

    assert_eq!(
        *state.grades.lock().await,
        vec![(9, "A-".to_string(), "Nice work".to_string())]
    );
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let base = spawn_server(app(ServerState::default())).await;
    let api = HttpClassroomApi::new(base, None).expect("client");

    let err = api.classlist().await.expect_err("decode");
    assert!(matches!(err, ClientError::Decode(_)));
}
