//! In-memory replica of the PetFriends REST service.
//!
//! Serves the same routes, headers and status codes as the public service so
//! the client and scenario suite can run without network access. By default
//! it copies the live service's lax validation on pet creation; set
//! `MockConfig::strict_validation` to get the documented 400s instead.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_EMAIL: &str = "user@petfriends.test";
pub const DEFAULT_PASSWORD: &str = "secret";

const SEED_OWNER: &str = "shelter@petfriends.test";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
}

#[derive(Clone, Debug)]
pub struct MockConfig {
    /// (email, password) pairs that may obtain a key.
    pub users: Vec<(String, String)>,
    /// Pets owned by an account nobody can log in as, so `GET /api/pets`
    /// is never empty.
    pub seed_pets: Vec<(String, String, String)>,
    pub strict_validation: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            users: vec![(DEFAULT_EMAIL.to_string(), DEFAULT_PASSWORD.to_string())],
            seed_pets: vec![
                ("Sharik".to_string(), "dog".to_string(), "2".to_string()),
                ("Murka".to_string(), "cat".to_string(), "6".to_string()),
            ],
            strict_validation: false,
        }
    }
}

struct User {
    password: String,
    key: String,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    /// Insertion order; listed newest first.
    pets: Vec<Pet>,
}

impl Store {
    fn email_for_key(&self, key: &str) -> Option<String> {
        self.users
            .iter()
            .find(|(_, u)| u.key == key)
            .map(|(email, _)| email.clone())
    }

    fn owned_mut(&mut self, owner: &str, id: &str) -> Option<&mut Pet> {
        self.pets
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner)
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    strict_validation: bool,
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let mut store = Store::default();
    for (email, password) in config.users {
        let key = Uuid::new_v4().simple().to_string();
        store.users.insert(email, User { password, key });
    }
    for (name, animal_type, age) in config.seed_pets {
        store.pets.push(Pet {
            id: Uuid::new_v4().to_string(),
            name,
            animal_type,
            age,
            pet_photo: String::new(),
            user_id: SEED_OWNER.to_string(),
        });
    }

    let state = AppState {
        db: Arc::new(RwLock::new(store)),
        strict_validation: config.strict_validation,
    };

    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/set_photo/{id}", post(set_photo))
        .route("/api/pets/{id}", put(update_pet).delete(delete_pet))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

/// Text error response, shaped like the HTML pages the live service sends.
struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let title = self.0.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<title>{} {title}</title><h1>{title}</h1><p>{}</p>",
            self.0.as_u16(),
            self.1
        );
        (self.0, body).into_response()
    }
}

fn forbidden() -> Failure {
    Failure(
        StatusCode::FORBIDDEN,
        "Please provide 'auth_key' Header or make sure your auth_key is correct",
    )
}

fn bad_request(reason: &'static str) -> Failure {
    Failure(StatusCode::BAD_REQUEST, reason)
}

fn header<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<String, Failure> {
    let key = header(headers, "auth_key").ok_or_else(forbidden)?;
    state.db.read().await.email_for_key(key).ok_or_else(forbidden)
}

async fn get_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Failure> {
    let email = header(&headers, "email").unwrap_or_default();
    let password = header(&headers, "password").unwrap_or_default();
    let db = state.db.read().await;
    match db.users.get(email) {
        Some(user) if user.password == password => {
            Ok(Json(serde_json::json!({ "key": user.key })))
        }
        _ => Err(Failure(
            StatusCode::FORBIDDEN,
            "This user wasn't found in database",
        )),
    }
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    filter: String,
}

#[derive(Serialize)]
struct PetList {
    pets: Vec<Pet>,
}

async fn list_pets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<PetList>, Failure> {
    let owner = authorize(&state, &headers).await?;
    let mine = match query.filter.as_str() {
        "" => false,
        "my_pets" => true,
        _ => return Err(bad_request("Filter value is incorrect")),
    };
    let db = state.db.read().await;
    let pets = db
        .pets
        .iter()
        .rev()
        .filter(|p| !mine || p.user_id == owner)
        .cloned()
        .collect();
    Ok(Json(PetList { pets }))
}

async fn create_pet_simple(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Pet>, Failure> {
    let owner = authorize(&state, &headers).await?;

    let mut fields: HashMap<String, String> = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Malformed multipart body"))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|_| bad_request("Malformed multipart field"))?;
        fields.insert(name, value);
    }

    let (Some(name), Some(animal_type), Some(age)) = (
        fields.remove("name"),
        fields.remove("animal_type"),
        fields.remove("age"),
    ) else {
        return Err(bad_request("name, animal_type and age are required"));
    };

    if state.strict_validation {
        if is_numeric(&name) {
            return Err(bad_request("Pet name must not be a number"));
        }
        if is_numeric(&animal_type) {
            return Err(bad_request("Animal type must not be a number"));
        }
        if !is_numeric(&age) {
            return Err(bad_request("Age must be a number"));
        }
    }

    let pet = Pet {
        id: Uuid::new_v4().to_string(),
        name,
        animal_type,
        age,
        pet_photo: String::new(),
        user_id: owner,
    };
    state.db.write().await.pets.push(pet.clone());
    Ok(Json(pet))
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

async fn set_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Pet>, Failure> {
    let owner = authorize(&state, &headers).await?;

    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Malformed multipart body"))?
    {
        if field.name() != Some("pet_photo") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_owned();
        if content_type != "image/jpeg" && content_type != "image/png" {
            return Err(bad_request("pet_photo must be a jpeg or png image"));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|_| bad_request("Malformed multipart field"))?;
        photo = Some(format!("data:{content_type};base64,{}", BASE64.encode(&bytes)));
    }
    let photo = photo.ok_or_else(|| bad_request("pet_photo is required"))?;

    let mut db = state.db.write().await;
    let pet = db
        .owned_mut(&owner, &id)
        .ok_or_else(|| bad_request("Pet with this id wasn't found"))?;
    pet.pet_photo = photo;
    Ok(Json(pet.clone()))
}

#[derive(Deserialize)]
struct UpdatePet {
    name: Option<String>,
    animal_type: Option<String>,
    age: Option<String>,
}

async fn update_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(input): Form<UpdatePet>,
) -> Result<Json<Pet>, Failure> {
    let owner = authorize(&state, &headers).await?;
    let mut db = state.db.write().await;
    let pet = db
        .owned_mut(&owner, &id)
        .ok_or_else(|| bad_request("Pet with this id wasn't found"))?;
    if let Some(name) = input.name {
        pet.name = name;
    }
    if let Some(animal_type) = input.animal_type {
        pet.animal_type = animal_type;
    }
    if let Some(age) = input.age {
        pet.age = age;
    }
    Ok(Json(pet.clone()))
}

/// Answers 200 with an empty body whether or not the pet existed, as the
/// live service does.
async fn delete_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, Failure> {
    let owner = authorize(&state, &headers).await?;
    state
        .db
        .write()
        .await
        .pets
        .retain(|p| !(p.id == id && p.user_id == owner));
    Ok(StatusCode::OK)
}
