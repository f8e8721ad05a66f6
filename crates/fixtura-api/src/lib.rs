//! fixtura-api - REST client for the invoicing API targeted by the
//! fixtura test-data tooling.
//!
//! This crate provides:
//! - An authenticated HTTP client for the login/CRUD/list endpoints.
//! - Transient-failure retry with backoff for idempotent calls.
//! - Offset pagination with a hard page cap.
//! - An error taxonomy that distinguishes transport failures, bad
//!   statuses, and malformed bodies.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod client;
mod error;
mod pagination;
mod resource;
mod retry;
mod wire;

pub use client::{
    ApiClient, ApiClientBuilder, ApiClientConfig, ApiClientMetricsSnapshot, Credentials,
    DeleteOutcome, Session, MERCHANT_HEADER,
};
pub use error::{ApiError, HttpErrorInfo};
pub use pagination::{paginate, Page, PaginationError};
pub use resource::ResourceKind;
pub use retry::{RetryDecision, RetryPolicy, RetryStrategy};
pub use wire::{CreatedData, Envelope, LoginData, LoginRequest, Meta, PageMeta, Record};
