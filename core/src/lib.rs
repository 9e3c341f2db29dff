//! Synchronous client and scenario suite for the PetFriends pet service.
//!
//! # Overview
//! `PetFriends` maps each remote endpoint to one method. Every call returns
//! an `ApiResponse`: the HTTP status plus a body that is JSON when it parses
//! and raw text otherwise. Error statuses are data, not errors.
//!
//! # Design
//! - The client builds `HttpRequest` values and hands them to an injected
//!   `Transport`; `ReqwestTransport` (feature `blocking`) does the real I/O,
//!   tests substitute their own.
//! - `scenario::Runner` sequences client calls into end-to-end checks,
//!   driven by `settings::Settings`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod scenario;
pub mod settings;
#[cfg(feature = "blocking")]
pub mod transport;
pub mod types;

pub use client::{PetFriends, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Part, PartContent, RequestBody, Transport, TransportError};
pub use response::{ApiResponse, Body};
pub use scenario::{Outcome, Runner, ScenarioError, ScenarioReport, Summary};
pub use settings::{Settings, SettingsError};
#[cfg(feature = "blocking")]
pub use transport::ReqwestTransport;
pub use types::{Age, AuthKey, Credentials, NewPet, Pet, PetFilter, PetList, Photo};
