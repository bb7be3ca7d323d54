//! JSON API over a [`Session`](crate::session::Session)

mod handler;
mod server;

pub use handler::{PresetEntry, SelectionRequest, StatusResponse, TreatyMembersResponse};
pub use server::{router, HttpServer};
