//! API models for request and response payloads

pub mod idea;
