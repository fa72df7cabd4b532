//! Taleweave-client - submission to the remote generation service
//!
//! The client encodes a prompt to binary tokens, wraps them in the
//! generator's request envelope, submits with retry/backoff, and decodes
//! the response tokens back to text. Credential derivation is a
//! collaborator's job; only a bearer token is consumed here.

pub mod error;
pub use error::{ClientError, Result};

pub mod envelope;
pub use envelope::{GenerateRequest, GenerateResponse};

pub mod backoff;
pub use backoff::BackoffSchedule;

pub mod api;
pub use api::{AccessKeys, GenerateOutcome, GeneratorClient};
