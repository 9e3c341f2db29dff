//! End-to-end user journeys against a PetFriends service.
//!
//! # Design
//! Every scenario is an independent method on `Runner` returning
//! `ScenarioResult`. Positive scenarios share one setup path: authenticate,
//! then `owned_pets`, which creates a pet when the account has none so the
//! scenario always has something to act on. Negative scenarios reuse the
//! regular facade calls with an invalid key, invalid credentials or a
//! tampered path.
//!
//! Field validation on pet creation is a known gap in the live service: it
//! accepts numeric names and alphabetic ages. Those scenarios still expect
//! 400, but report a 200 as `Outcome::KnownDiscrepancy` instead of failing.

use tracing::{error, info, warn};

use crate::client::PetFriends;
use crate::error::ApiError;
use crate::http::Transport;
use crate::response::{ApiResponse, Body};
use crate::settings::Settings;
use crate::types::{AuthKey, Credentials, NewPet, Pet, PetFilter};

const BODY_PREVIEW: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// The service behaved as it is known to, but not as it should.
    KnownDiscrepancy(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("{step}: expected status {expected}, got {actual} (body: {body})")]
    UnexpectedStatus {
        step: &'static str,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("{step}: {message}")]
    Assertion { step: &'static str, message: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type ScenarioResult = Result<Outcome, ScenarioError>;

type ScenarioFn<'a, T> = fn(&Runner<'a, T>) -> ScenarioResult;

#[derive(Debug)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub result: ScenarioResult,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub known_discrepancies: usize,
    pub failed: usize,
}

impl Summary {
    pub fn of(reports: &[ScenarioReport]) -> Self {
        reports.iter().fold(Summary::default(), |mut s, r| {
            match &r.result {
                Ok(Outcome::Passed) => s.passed += 1,
                Ok(Outcome::KnownDiscrepancy(_)) => s.known_discrepancies += 1,
                Err(_) => s.failed += 1,
            }
            s
        })
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

pub struct Runner<'a, T> {
    client: &'a PetFriends<T>,
    settings: &'a Settings,
}

impl<'a, T: Transport> Runner<'a, T> {
    pub fn new(client: &'a PetFriends<T>, settings: &'a Settings) -> Self {
        Self { client, settings }
    }

    /// Run every scenario in order; a failure does not stop the rest.
    pub fn run_all(&self) -> Vec<ScenarioReport> {
        let scenarios: [(&'static str, ScenarioFn<'a, T>); 16] = [
            ("get_api_key_for_valid_user", Self::get_api_key_for_valid_user),
            ("get_all_pets_with_valid_key", Self::get_all_pets_with_valid_key),
            ("add_new_pet_simple", Self::add_new_pet_simple),
            ("set_pet_photo", Self::set_pet_photo),
            ("update_pet_info", Self::update_pet_info),
            ("delete_pet", Self::delete_pet),
            ("get_api_key_for_invalid_email", Self::get_api_key_for_invalid_email),
            ("get_api_key_for_invalid_password", Self::get_api_key_for_invalid_password),
            ("create_pet_with_invalid_auth_key", Self::create_pet_with_invalid_auth_key),
            ("create_pet_with_numeric_name", Self::create_pet_with_numeric_name),
            ("create_pet_with_numeric_animal_type", Self::create_pet_with_numeric_animal_type),
            ("create_pet_with_alphabetic_age", Self::create_pet_with_alphabetic_age),
            ("list_pets_with_invalid_auth_key", Self::list_pets_with_invalid_auth_key),
            ("set_photo_with_invalid_path", Self::set_photo_with_invalid_path),
            ("set_photo_with_invalid_auth_key", Self::set_photo_with_invalid_auth_key),
            ("delete_pet_with_invalid_auth_key", Self::delete_pet_with_invalid_auth_key),
        ];

        scenarios
            .into_iter()
            .map(|(name, scenario)| {
                let result = scenario(self);
                match &result {
                    Ok(Outcome::Passed) => info!(scenario = name, "passed"),
                    Ok(Outcome::KnownDiscrepancy(note)) => {
                        warn!(scenario = name, note = %note, "known discrepancy")
                    }
                    Err(e) => error!(scenario = name, error = %e, "failed"),
                }
                ScenarioReport { name, result }
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Shared setup
    // -----------------------------------------------------------------------

    /// Exchange the valid credentials for a key.
    pub fn authenticate(&self) -> Result<AuthKey, ScenarioError> {
        let response = self.client.get_api_key(&self.settings.valid)?;
        expect_status("get_api_key", &response, 200)?;
        Ok(response.auth_key()?)
    }

    /// The caller's pets, creating `seed` first when there are none.
    pub fn owned_pets(&self, key: &AuthKey, seed: &NewPet) -> Result<Vec<Pet>, ScenarioError> {
        let pets = self.my_pets(key)?;
        if !pets.is_empty() {
            return Ok(pets);
        }

        info!(name = %seed.name, "account has no pets, creating one");
        let created = self.client.create_pet_simple(key, seed)?;
        expect_status("create_pet_simple (setup)", &created, 200)?;

        let pets = self.my_pets(key)?;
        if pets.is_empty() {
            return Err(ScenarioError::Assertion {
                step: "owned_pets",
                message: "still no own pets after creating one".to_string(),
            });
        }
        Ok(pets)
    }

    fn my_pets(&self, key: &AuthKey) -> Result<Vec<Pet>, ScenarioError> {
        let response = self.client.list_pets(key, PetFilter::MyPets)?;
        expect_status("list_pets(my_pets)", &response, 200)?;
        Ok(response.pets()?)
    }

    fn first_owned_pet_id(&self, key: &AuthKey, seed: &NewPet) -> Result<String, ScenarioError> {
        let pets = self.owned_pets(key, seed)?;
        // owned_pets never returns an empty list
        Ok(pets[0].id.clone())
    }

    // -----------------------------------------------------------------------
    // Positive scenarios
    // -----------------------------------------------------------------------

    pub fn get_api_key_for_valid_user(&self) -> ScenarioResult {
        let response = self.client.get_api_key(&self.settings.valid)?;
        expect_status("get_api_key", &response, 200)?;
        ensure(response.has_field("key"), "get_api_key", || {
            format!("no `key` in body: {}", preview(&response.body))
        })?;
        Ok(Outcome::Passed)
    }

    pub fn get_all_pets_with_valid_key(&self) -> ScenarioResult {
        let key = self.authenticate()?;
        let response = self.client.list_pets(&key, PetFilter::All)?;
        expect_status("list_pets", &response, 200)?;
        let pets = response.pets()?;
        ensure(!pets.is_empty(), "list_pets", || "pet list is empty".to_string())?;
        Ok(Outcome::Passed)
    }

    pub fn add_new_pet_simple(&self) -> ScenarioResult {
        let pet = NewPet::new("Barbos", "mongrel", "4");
        let key = self.authenticate()?;

        let response = self.client.create_pet_simple(&key, &pet)?;
        expect_status("create_pet_simple", &response, 200)?;
        expect_name("create_pet_simple", &response, &pet.name)?;

        let pets = self.my_pets(&key)?;
        ensure(pets.iter().any(|p| p.name == pet.name), "list_pets(my_pets)", || {
            format!("{} not among own pets", pet.name)
        })?;
        Ok(Outcome::Passed)
    }

    pub fn set_pet_photo(&self) -> ScenarioResult {
        let key = self.authenticate()?;
        let pet_id = self.first_owned_pet_id(&key, &NewPet::new("Tiger", "cat", "3"))?;

        let photo = self.settings.load_photo()?;
        let response = self.client.send(self.client.build_set_photo(&key, &pet_id, &photo))?;
        expect_status("set_photo", &response, 200)?;
        let pet = response.pet()?;
        ensure(pet.id == pet_id, "set_photo", || {
            format!("response is for pet {}, expected {pet_id}", pet.id)
        })?;
        ensure(pet.has_photo(), "set_photo", || "photo not set".to_string())?;
        Ok(Outcome::Passed)
    }

    pub fn update_pet_info(&self) -> ScenarioResult {
        let update = NewPet::new("Murzik", "Kote", 5);
        let key = self.authenticate()?;
        let pet_id = self.first_owned_pet_id(&key, &NewPet::new("Tiger", "cat", "3"))?;

        let response = self.client.update_pet(&key, &pet_id, &update)?;
        expect_status("update_pet", &response, 200)?;
        expect_name("update_pet", &response, &update.name)?;
        Ok(Outcome::Passed)
    }

    pub fn delete_pet(&self) -> ScenarioResult {
        let key = self.authenticate()?;
        let pet_id = self.first_owned_pet_id(&key, &NewPet::new("Supercat", "cat", "3"))?;

        let response = self.client.delete_pet(&key, &pet_id)?;
        expect_status("delete_pet", &response, 200)?;
        if response.text() == Some("") {
            // known service behavior: delete has no confirmation body
            info!(pet_id = %pet_id, "delete answered 200 with an empty body");
        }

        let pets = self.my_pets(&key)?;
        ensure(pets.iter().all(|p| p.id != pet_id), "list_pets(my_pets)", || {
            format!("pet {pet_id} still listed after delete")
        })?;
        Ok(Outcome::Passed)
    }

    // -----------------------------------------------------------------------
    // Negative scenarios
    // -----------------------------------------------------------------------

    pub fn get_api_key_for_invalid_email(&self) -> ScenarioResult {
        let credentials = Credentials::new(
            self.settings.invalid_email.as_str(),
            self.settings.valid.password.as_str(),
        );
        let response = self.client.get_api_key(&credentials)?;
        expect_status("get_api_key(invalid email)", &response, 403)?;
        Ok(Outcome::Passed)
    }

    pub fn get_api_key_for_invalid_password(&self) -> ScenarioResult {
        let credentials = Credentials::new(
            self.settings.valid.email.as_str(),
            self.settings.invalid_password.as_str(),
        );
        let response = self.client.get_api_key(&credentials)?;
        expect_status("get_api_key(invalid password)", &response, 403)?;
        Ok(Outcome::Passed)
    }

    pub fn create_pet_with_invalid_auth_key(&self) -> ScenarioResult {
        let pet = NewPet::new("Bart", "mongrel", "4");
        let response = self
            .client
            .create_pet_simple(&self.settings.invalid_auth_key, &pet)?;
        expect_status("create_pet_simple(invalid key)", &response, 403)?;
        Ok(Outcome::Passed)
    }

    pub fn create_pet_with_numeric_name(&self) -> ScenarioResult {
        self.expect_rejected_pet("create_pet_simple(numeric name)", NewPet::new("123", "mongrel", "4"))
    }

    pub fn create_pet_with_numeric_animal_type(&self) -> ScenarioResult {
        self.expect_rejected_pet("create_pet_simple(numeric animal type)", NewPet::new("Karl", "123", "4"))
    }

    pub fn create_pet_with_alphabetic_age(&self) -> ScenarioResult {
        self.expect_rejected_pet("create_pet_simple(alphabetic age)", NewPet::new("Karl", "dog", "odin"))
    }

    fn expect_rejected_pet(&self, step: &'static str, pet: NewPet) -> ScenarioResult {
        let key = self.authenticate()?;
        let response = self.client.create_pet_simple(&key, &pet)?;
        match response.status {
            400 => Ok(Outcome::Passed),
            200 => {
                let note = format!(
                    "{step}: service accepted name={:?} animal_type={:?} age={:?}, expected 400",
                    pet.name,
                    pet.animal_type,
                    pet.age.to_string()
                );
                warn!(%note, "invalid pet data accepted");
                Ok(Outcome::KnownDiscrepancy(note))
            }
            _ => Err(unexpected(step, &response, 400)),
        }
    }

    pub fn list_pets_with_invalid_auth_key(&self) -> ScenarioResult {
        let response = self
            .client
            .list_pets(&self.settings.invalid_auth_key, PetFilter::All)?;
        expect_status("list_pets(invalid key)", &response, 403)?;
        Ok(Outcome::Passed)
    }

    pub fn set_photo_with_invalid_path(&self) -> ScenarioResult {
        let key = self.authenticate()?;
        let pet_id = self.first_owned_pet_id(&key, &NewPet::new("Tiger", "cat", "3"))?;
        let photo = self.settings.load_photo()?;

        let mut request = self.client.build_set_photo(&key, &pet_id, &photo);
        request.path = request.path.replacen("/api/pets/", "/api/pet/", 1);
        let response = self.client.send(request)?;
        expect_status("set_photo(invalid path)", &response, 404)?;
        Ok(Outcome::Passed)
    }

    pub fn set_photo_with_invalid_auth_key(&self) -> ScenarioResult {
        let key = self.authenticate()?;
        let pet_id = self.first_owned_pet_id(&key, &NewPet::new("Tiger", "cat", "3"))?;

        let photo = self.settings.load_photo()?;
        let response = self.client.send(self.client.build_set_photo(
            &self.settings.invalid_auth_key,
            &pet_id,
            &photo,
        ))?;
        expect_status("set_photo(invalid key)", &response, 403)?;
        Ok(Outcome::Passed)
    }

    pub fn delete_pet_with_invalid_auth_key(&self) -> ScenarioResult {
        let key = self.authenticate()?;
        let pet_id = self.first_owned_pet_id(&key, &NewPet::new("Supercat", "cat", "3"))?;

        let response = self
            .client
            .delete_pet(&self.settings.invalid_auth_key, &pet_id)?;
        expect_status("delete_pet(invalid key)", &response, 403)?;
        Ok(Outcome::Passed)
    }
}

fn expect_status(step: &'static str, response: &ApiResponse, expected: u16) -> Result<(), ScenarioError> {
    if response.status == expected {
        Ok(())
    } else {
        Err(unexpected(step, response, expected))
    }
}

fn unexpected(step: &'static str, response: &ApiResponse, expected: u16) -> ScenarioError {
    ScenarioError::UnexpectedStatus {
        step,
        expected,
        actual: response.status,
        body: preview(&response.body),
    }
}

fn expect_name(step: &'static str, response: &ApiResponse, name: &str) -> Result<(), ScenarioError> {
    let actual = response.field("name").and_then(|v| v.as_str());
    ensure(actual == Some(name), step, || {
        format!("expected name {name:?}, got {actual:?}")
    })
}

fn ensure(
    condition: bool,
    step: &'static str,
    message: impl FnOnce() -> String,
) -> Result<(), ScenarioError> {
    if condition {
        Ok(())
    } else {
        Err(ScenarioError::Assertion {
            step,
            message: message(),
        })
    }
}

fn preview(body: &Body) -> String {
    let text = match body {
        Body::Json(v) => v.to_string(),
        Body::Text(s) => s.clone(),
    };
    if text.chars().count() > BODY_PREVIEW {
        let cut: String = text.chars().take(BODY_PREVIEW).collect();
        format!("{cut}...")
    } else {
        text
    }
}
