use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, MockConfig, Pet, DEFAULT_EMAIL, DEFAULT_PASSWORD};
use serde::Deserialize;
use tower::ServiceExt;

const BOUNDARY: &str = "mockboundary7f3a";

#[derive(Deserialize)]
struct PetList {
    pets: Vec<Pet>,
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

fn key_request(email: &str, password: &str) -> Request<String> {
    Request::builder()
        .uri("/api/key")
        .header("email", email)
        .header("password", password)
        .body(String::new())
        .unwrap()
}

fn authed(method: &str, uri: &str, key: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("auth_key", key)
        .body(String::new())
        .unwrap()
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some((name, content_type, bytes)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"cat1.jpg\"\r\nContent-Type: {content_type}\r\n\r\n{}\r\n",
            String::from_utf8_lossy(bytes)
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn multipart_request(uri: &str, key: &str, body: String) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("auth_key", key)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

fn create_request(key: &str, name: &str, animal_type: &str, age: &str) -> Request<String> {
    let body = multipart_body(&[("name", name), ("animal_type", animal_type), ("age", age)], None);
    multipart_request("/api/create_pet_simple", key, body)
}

async fn login(app: &Router) -> String {
    let resp = send(app, key_request(DEFAULT_EMAIL, DEFAULT_PASSWORD)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = body_json(resp).await;
    json["key"].as_str().unwrap().to_string()
}

async fn create(app: &Router, key: &str, name: &str) -> Pet {
    let resp = send(app, create_request(key, name, "cat", "3")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- key ---

#[tokio::test]
async fn api_key_for_valid_user() {
    let app = app();
    let key = login(&app).await;
    assert!(!key.is_empty());
}

#[tokio::test]
async fn api_key_wrong_password_is_403_text() {
    let app = app();
    let resp = send(&app, key_request(DEFAULT_EMAIL, "wrong")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<serde_json::Value>(&body).is_err());
}

#[tokio::test]
async fn api_key_unknown_email_is_403() {
    let app = app();
    let resp = send(&app, key_request("ghost@nowhere", DEFAULT_PASSWORD)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- list ---

#[tokio::test]
async fn list_all_includes_seed_pets() {
    let app = app();
    let key = login(&app).await;
    let resp = send(&app, authed("GET", "/api/pets?filter=", &key)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: PetList = body_json(resp).await;
    assert_eq!(list.pets.len(), MockConfig::default().seed_pets.len());
}

#[tokio::test]
async fn list_my_pets_starts_empty() {
    let app = app();
    let key = login(&app).await;
    let resp = send(&app, authed("GET", "/api/pets?filter=my_pets", &key)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let list: PetList = body_json(resp).await;
    assert!(list.pets.is_empty());
}

#[tokio::test]
async fn list_with_bad_key_is_403() {
    let app = app();
    let resp = send(&app, authed("GET", "/api/pets?filter=", "nope")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_without_key_is_403() {
    let app = app();
    let resp = send(
        &app,
        Request::builder().uri("/api/pets").body(String::new()).unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- create ---

#[tokio::test]
async fn create_pet_simple_returns_pet() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Barbos").await;
    assert_eq!(pet.name, "Barbos");
    assert_eq!(pet.age, "3");
    assert!(pet.pet_photo.is_empty());
}

#[tokio::test]
async fn create_missing_field_is_400() {
    let app = app();
    let key = login(&app).await;
    let body = multipart_body(&[("name", "Barbos")], None);
    let resp = send(&app, multipart_request("/api/create_pet_simple", &key, body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lenient_create_accepts_numeric_name() {
    let app = app();
    let key = login(&app).await;
    let resp = send(&app, create_request(&key, "123", "dog", "4")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn strict_create_rejects_bad_fields() {
    let app = app_with(MockConfig {
        strict_validation: true,
        ..MockConfig::default()
    });
    let key = login(&app).await;
    for (name, animal_type, age) in [("123", "dog", "4"), ("Karl", "123", "4"), ("Karl", "dog", "odin")] {
        let resp = send(&app, create_request(&key, name, animal_type, age)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{name}/{animal_type}/{age}");
    }
    let resp = send(&app, create_request(&key, "Karl", "dog", "4")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_with_bad_key_is_403() {
    let app = app();
    let resp = send(&app, create_request("nope", "Bart", "dog", "4")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- photo ---

#[tokio::test]
async fn set_photo_stores_data_uri() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Tiger").await;

    let body = multipart_body(&[], Some(("pet_photo", "image/jpeg", &b"JFIF"[..])));
    let uri = format!("/api/pets/set_photo/{}", pet.id);
    let resp = send(&app, multipart_request(&uri, &key, body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Pet = body_json(resp).await;
    assert_eq!(updated.id, pet.id);
    assert_eq!(updated.pet_photo, "data:image/jpeg;base64,SkZJRg==");
}

#[tokio::test]
async fn set_photo_rejects_non_image() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Tiger").await;

    let body = multipart_body(&[], Some(("pet_photo", "text/plain", &b"hello"[..])));
    let uri = format!("/api/pets/set_photo/{}", pet.id);
    let resp = send(&app, multipart_request(&uri, &key, body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn set_photo_wrong_path_is_404() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Tiger").await;

    let body = multipart_body(&[], Some(("pet_photo", "image/jpeg", &b"JFIF"[..])));
    let uri = format!("/api/pet/set_photo/{}", pet.id);
    let resp = send(&app, multipart_request(&uri, &key, body)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_photo_with_bad_key_is_403() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Tiger").await;

    let body = multipart_body(&[], Some(("pet_photo", "image/jpeg", &b"JFIF"[..])));
    let uri = format!("/api/pets/set_photo/{}", pet.id);
    let resp = send(&app, multipart_request(&uri, "nope", body)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- update ---

#[tokio::test]
async fn update_pet_replaces_fields() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Tiger").await;

    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/pets/{}", pet.id))
        .header("auth_key", &key)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("name=Murzik&age=5&animal_type=Kote".to_string())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Pet = body_json(resp).await;
    assert_eq!(updated.name, "Murzik");
    assert_eq!(updated.animal_type, "Kote");
    assert_eq!(updated.age, "5");
}

#[tokio::test]
async fn update_with_bad_key_is_403_and_keeps_fields() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Tiger").await;

    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/pets/{}", pet.id))
        .header("auth_key", "nope")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("name=Murzik&age=5&animal_type=Kote".to_string())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&app, authed("GET", "/api/pets?filter=my_pets", &key)).await;
    let list: PetList = body_json(resp).await;
    assert_eq!(list.pets, [pet]);
}

#[tokio::test]
async fn update_unknown_pet_is_400() {
    let app = app();
    let key = login(&app).await;
    let req = Request::builder()
        .method("PUT")
        .uri("/api/pets/does-not-exist")
        .header("auth_key", &key)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("name=Murzik".to_string())
        .unwrap();
    let resp = send(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_answers_200_with_empty_body() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Supercat").await;

    let resp = send(&app, authed("DELETE", &format!("/api/pets/{}", pet.id), &key)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&app, authed("GET", "/api/pets?filter=my_pets", &key)).await;
    let list: PetList = body_json(resp).await;
    assert!(list.pets.iter().all(|p| p.id != pet.id));
}

#[tokio::test]
async fn delete_with_bad_key_is_403_and_keeps_pet() {
    let app = app();
    let key = login(&app).await;
    let pet = create(&app, &key, "Supercat").await;

    let resp = send(&app, authed("DELETE", &format!("/api/pets/{}", pet.id), "nope")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&app, authed("GET", "/api/pets?filter=my_pets", &key)).await;
    let list: PetList = body_json(resp).await;
    assert_eq!(list.pets.len(), 1);
}

// --- ownership and ordering ---

#[tokio::test]
async fn my_pets_are_newest_first_and_exclude_others() {
    let app = app();
    let key = login(&app).await;
    create(&app, &key, "First").await;
    create(&app, &key, "Second").await;

    let resp = send(&app, authed("GET", "/api/pets?filter=my_pets", &key)).await;
    let list: PetList = body_json(resp).await;
    let names: Vec<_> = list.pets.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Second", "First"]);
}
