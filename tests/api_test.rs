mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use courseboard::{api::create_app, config::Settings, service::ServiceContext};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{create_course, test_context, PASSWORD};

const BOUNDARY: &str = "courseboard-test-boundary";

async fn app() -> anyhow::Result<(Router, Arc<ServiceContext>)> {
    let ctx = test_context().await?;
    let app = create_app(ctx.clone(), Arc::new(Settings::default()));
    Ok((app, ctx))
}

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Ok((status, body))
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ).as_bytes());
    }
    if let Some((name, file_name, data)) = file {
        body.extend_from_slice(format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, name, file_name
        ).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn register_and_login(app: &Router, username: &str, role: &str) -> anyhow::Result<String> {
    let (status, _) = send(app, json_request(Method::POST, "/api/auth/register", None, json!({
        "email": format!("{}@example.com", username),
        "username": username,
        "full_name": format!("{} Test", username),
        "password": PASSWORD,
        "role": role,
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, json_request(Method::POST, "/api/auth/login", None, json!({
        "email": format!("{}@example.com", username),
        "password": PASSWORD,
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");

    Ok(body["access_token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_health_and_public_catalogue() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    create_course(&ctx, "ALG").await?;

    let (status, body) = send(&app, get_request("/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, get_request("/api/courses", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(|a| a.len()), Some(1));
    assert_eq!(body[0]["code"], "ALG");

    Ok(())
}

#[tokio::test]
async fn test_authentication_flow() -> anyhow::Result<()> {
    let (app, _ctx) = app().await?;

    let token = register_and_login(&app, "ana", "student").await?;

    let (status, body) = send(&app, get_request("/api/auth/me", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ana");
    assert_eq!(body["role"], "student");
    assert!(body.get("password_hash").is_none());

    let (status, _) = send(&app, get_request("/api/auth/me", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_request("/api/auth/me", Some("not-a-token"))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, json_request(Method::POST, "/api/auth/login", None, json!({
        "email": "ana@example.com",
        "password": "wrong-password",
    }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Same email again
    let (status, _) = send(&app, json_request(Method::POST, "/api/auth/register", None, json!({
        "email": "ana@example.com",
        "username": "ana2",
        "full_name": "Ana Again",
        "password": PASSWORD,
        "role": "student",
    }))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_enrollment_over_http() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let token = register_and_login(&app, "ana", "student").await?;

    let mut course_ids = Vec::new();
    for code in ["A", "B", "C", "D"] {
        course_ids.push(create_course(&ctx, code).await?.id);
    }

    for course_id in &course_ids[..3] {
        let (status, _) = send(&app, json_request(
            Method::POST,
            "/api/courses/enroll",
            Some(&token),
            json!({ "course_id": course_id }),
        )).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, json_request(
        Method::POST,
        "/api/courses/enroll",
        Some(&token),
        json!({ "course_id": course_ids[3] }),
    )).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("3"));

    let (status, body) = send(&app, get_request("/api/courses/my-enrollments", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(|a| a.len()), Some(3));

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/courses/unenroll/{}", course_ids[0]))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())?;
    let (status, _) = send(&app, request).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, json_request(
        Method::POST,
        "/api/courses/enroll",
        Some(&token),
        json!({ "course_id": course_ids[3] }),
    )).await?;
    assert_eq!(status, StatusCode::CREATED);

    Ok(())
}

#[tokio::test]
async fn test_material_upload_and_download() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let professor = register_and_login(&app, "prof", "professor").await?;
    let student = register_and_login(&app, "ana", "student").await?;
    let course = create_course(&ctx, "BDP").await?;

    for token in [&professor, &student] {
        let (status, _) = send(&app, json_request(
            Method::POST,
            "/api/courses/enroll",
            Some(token),
            json!({ "course_id": course.id }),
        )).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let course_id = course.id.to_string();
    let upload = |token: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/materials")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(multipart_body(
                &[("title", "Week 1"), ("course_id", &course_id)],
                Some(("file", "week1.txt", b"SQL basics")),
            )))
            .unwrap()
    };

    let (status, _) = send(&app, upload(&student)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, upload(&professor)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["file_name"], "week1.txt");
    assert!(body.get("file_path").is_none());
    let material_id = body["id"].as_str().unwrap_or_default().to_string();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/materials/{}/download", material_id), Some(&student)))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("week1.txt"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"SQL basics");

    Ok(())
}

#[tokio::test]
async fn test_rejected_input_uses_error_body() -> anyhow::Result<()> {
    let (app, ctx) = app().await?;
    let professor = register_and_login(&app, "prof", "professor").await?;
    let student = register_and_login(&app, "ana", "student").await?;
    let course = create_course(&ctx, "WEB").await?;

    // Malformed id in the path
    let (status, body) = send(&app, get_request("/api/announcements/not-a-uuid", Some(&student))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string(), "body: {body}");

    // JSON of the wrong shape
    let (status, body) = send(&app, json_request(Method::POST, "/api/auth/register", None, json!({
        "email": "admin@example.com",
        "username": "admin",
        "full_name": "Admin",
        "password": PASSWORD,
        "role": "admin",
    }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string(), "body: {body}");

    for token in [&professor, &student] {
        send(&app, json_request(
            Method::POST,
            "/api/courses/enroll",
            Some(token),
            json!({ "course_id": course.id }),
        )).await?;
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/announcements")
        .header(header::AUTHORIZATION, format!("Bearer {}", professor))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(multipart_body(
            &[("title", "Lab"), ("content", "Bring laptops"), ("course_id", &course.id.to_string())],
            None,
        )))?;
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::CREATED);
    let announcement_id = body["id"].as_str().unwrap_or_default().to_string();

    let uri = format!("/api/announcements/{}/react", announcement_id);
    let (status, body) = send(&app, json_request(Method::POST, &uri, Some(&student), json!({ "kind": "like" }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string(), "body: {body}");

    let (status, body) = send(&app, json_request(Method::POST, &uri, Some(&student), json!({ "reaction_type": "Like" }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap_or_default().contains("like"));

    // Broken JSON syntax
    let request = Request::builder()
        .method(Method::POST)
        .uri(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", student))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"reaction_type\":"))?;
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "body: {body}");

    // Query parameters that are not numbers
    let (status, body) = send(&app, get_request("/api/courses?limit=lots", None)).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string(), "body: {body}");

    Ok(())
}
