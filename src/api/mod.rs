// HTTP surface for the analyzer: router, DTOs, error mapping, endpoints.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;
