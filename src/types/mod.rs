mod id;
mod models;

pub use id::{ID_LENGTH, new_id};
pub use models::{Collection, Item, RefreshToken, User};
