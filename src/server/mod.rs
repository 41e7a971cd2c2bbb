mod collections;
pub mod dto;
mod items;
pub mod response;
mod router;
mod tokens;
mod users;
pub mod validation;

pub use router::{AppState, create_router};
