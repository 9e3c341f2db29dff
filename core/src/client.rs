//! Request builder and facade for the PetFriends API.
//!
//! # Design
//! `PetFriends` holds only a `base_url` and a transport, and carries no
//! mutable state between calls. Each endpoint has a `build_*` method that
//! produces an `HttpRequest` and a calling method that sends it through
//! `send`, which executes the request and normalizes the response. Negative
//! tests use the same `build_*` methods and tamper with the request before
//! calling `send`.
//!
//! Pet ids are percent-encoded as a single path segment, so an id can never
//! add path components or a query string.

use std::path::Path;

use tracing::debug;
use urlencoding::encode;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Part, PartContent, RequestBody, Transport};
use crate::response::ApiResponse;
use crate::types::{AuthKey, Credentials, NewPet, PetFilter, Photo};

/// Default root of the public PetFriends service.
pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru";

/// Client facade: one method per remote endpoint.
///
/// Every calling method returns `Ok(ApiResponse)` for any HTTP status; the
/// status is data for the caller. `Err` means the round-trip itself failed.
#[derive(Debug, Clone)]
pub struct PetFriends<T> {
    base_url: String,
    transport: T,
}

impl<T> PetFriends<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    pub fn build_get_api_key(&self, credentials: &Credentials) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url("api/key"),
            query: Vec::new(),
            headers: vec![
                ("email".to_string(), credentials.email.clone()),
                ("password".to_string(), credentials.password.clone()),
            ],
            body: RequestBody::Empty,
        }
    }

    pub fn build_list_pets(&self, key: &AuthKey, filter: PetFilter) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url("api/pets"),
            query: vec![("filter".to_string(), filter.as_str().to_string())],
            headers: auth_header(key),
            body: RequestBody::Empty,
        }
    }

    pub fn build_create_pet_simple(&self, key: &AuthKey, pet: &NewPet) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.url("api/create_pet_simple"),
            query: Vec::new(),
            headers: auth_header(key),
            body: RequestBody::Multipart(vec![
                Part::text("name", pet.name.as_str()),
                Part::text("animal_type", pet.animal_type.as_str()),
                Part::text("age", pet.age.to_string()),
            ]),
        }
    }

    pub fn build_set_photo(&self, key: &AuthKey, pet_id: &str, photo: &Photo) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.url(&format!("api/pets/set_photo/{}", encode(pet_id))),
            query: Vec::new(),
            headers: auth_header(key),
            body: RequestBody::Multipart(vec![Part {
                name: "pet_photo".to_string(),
                content: PartContent::File {
                    file_name: photo.file_name.clone(),
                    content_type: photo.content_type.clone(),
                    bytes: photo.bytes.clone(),
                },
            }]),
        }
    }

    pub fn build_update_pet(&self, key: &AuthKey, pet_id: &str, pet: &NewPet) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Put,
            path: self.url(&format!("api/pets/{}", encode(pet_id))),
            query: Vec::new(),
            headers: auth_header(key),
            body: RequestBody::Form(vec![
                ("name".to_string(), pet.name.clone()),
                ("age".to_string(), pet.age.to_string()),
                ("animal_type".to_string(), pet.animal_type.clone()),
            ]),
        }
    }

    pub fn build_delete_pet(&self, key: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.url(&format!("api/pets/{}", encode(pet_id))),
            query: Vec::new(),
            headers: auth_header(key),
            body: RequestBody::Empty,
        }
    }
}

impl<T: Transport> PetFriends<T> {
    /// Execute a built request and normalize the response.
    pub fn send(&self, request: HttpRequest) -> Result<ApiResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response.into())
    }

    /// `GET /api/key`: exchange credentials for an auth key.
    pub fn get_api_key(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        self.send(self.build_get_api_key(credentials))
    }

    /// `GET /api/pets`: all pets, or only the caller's with `PetFilter::MyPets`.
    pub fn list_pets(&self, key: &AuthKey, filter: PetFilter) -> Result<ApiResponse, ApiError> {
        self.send(self.build_list_pets(key, filter))
    }

    /// `POST /api/create_pet_simple`: create a pet without a photo.
    pub fn create_pet_simple(&self, key: &AuthKey, pet: &NewPet) -> Result<ApiResponse, ApiError> {
        self.send(self.build_create_pet_simple(key, pet))
    }

    /// `POST /api/pets/set_photo/{pet_id}` with the image read from `photo_path`.
    pub fn set_photo(
        &self,
        key: &AuthKey,
        pet_id: &str,
        photo_path: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = Photo::from_path(photo_path)?;
        self.send(self.build_set_photo(key, pet_id, &photo))
    }

    /// `PUT /api/pets/{pet_id}`: replace name, type and age.
    pub fn update_pet(
        &self,
        key: &AuthKey,
        pet_id: &str,
        pet: &NewPet,
    ) -> Result<ApiResponse, ApiError> {
        self.send(self.build_update_pet(key, pet_id, pet))
    }

    /// `DELETE /api/pets/{pet_id}`.
    ///
    /// The live service answers a successful delete with 200 and an empty
    /// body, so the result is usually `Body::Text("")`.
    pub fn delete_pet(&self, key: &AuthKey, pet_id: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.build_delete_pet(key, pet_id))
    }
}

fn auth_header(key: &AuthKey) -> Vec<(String, String)> {
    vec![("auth_key".to_string(), key.key.clone())]
}
