//! Domain DTOs for the PetFriends API.
//!
//! # Design
//! These types mirror the service's JSON but are defined independently of the
//! mock-server crate. Integration tests catch any schema drift between the
//! two. The client never validates pet records beyond deserializing them.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Email/password pair exchanged for an `AuthKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Opaque token returned by `GET /api/key`, sent as the `auth_key` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthKey {
    pub key: String,
}

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

/// Pet age as the service returns it: sometimes a number, usually a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Age {
    Number(i64),
    Text(String),
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Number(n) => write!(f, "{n}"),
            Age::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Age {
    fn from(n: i64) -> Self {
        Age::Number(n)
    }
}

impl From<&str> for Age {
    fn from(s: &str) -> Self {
        Age::Text(s.to_string())
    }
}

impl From<String> for Age {
    fn from(s: String) -> Self {
        Age::Text(s)
    }
}

/// A pet record as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: Age,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Pet {
    /// True when the service has a non-empty photo reference for this pet.
    pub fn has_photo(&self) -> bool {
        self.pet_photo.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Envelope of `GET /api/pets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

/// Mutable pet fields, used for both creation and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub animal_type: String,
    pub age: Age,
}

impl NewPet {
    pub fn new(name: impl Into<String>, animal_type: impl Into<String>, age: impl Into<Age>) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.into(),
        }
    }
}

/// Value of the `filter` query parameter on `GET /api/pets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetFilter {
    #[default]
    All,
    MyPets,
}

impl PetFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

/// An image payload for `POST /api/pets/set_photo/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub const JPEG: &'static str = "image/jpeg";

    /// The cat photo compiled into the crate, usable without a source checkout.
    pub fn bundled() -> Self {
        Self {
            file_name: "cat1.jpg".to_string(),
            content_type: Self::JPEG.to_string(),
            bytes: include_bytes!("../fixtures/cat1.jpg").to_vec(),
        }
    }

    /// Read a photo from disk. The file handle is closed before this returns,
    /// so no descriptor outlives the upload whatever its outcome.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ApiError::PhotoRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());
        Ok(Self {
            file_name,
            content_type: Self::JPEG.to_string(),
            bytes,
        })
    }
}
