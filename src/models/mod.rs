//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_key, CounterRequest, PullRequest, PutRequest};
pub use responses::{
    AddResponse, CounterResponse, DeleteResponse, FlushResponse, GetResponse, HealthResponse,
    PullResponse, PutResponse,
};
