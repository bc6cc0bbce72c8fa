//! Transport layer for talking to the IV Ingestion API over HTTP.
//!
//! This module provides types and traits for:
//! - Building HTTP requests ([`HttpRequest`], [`RequestBody`])
//! - Multipart upload forms ([`MultipartForm`], [`FormPart`], [`FileSource`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Classifying transport failures ([`HttpError`], [`IsRetryable`])

mod client;
mod error;
mod form;
mod http;

#[cfg(test)]
mod client_tests;

pub use client::ReqwestClient;
pub use error::{HttpError, IsRetryable};
pub use form::{FileSource, FormPart, MultipartForm};
pub use http::{HttpClient, HttpRequest, HttpResponse, RequestBody};
