// Stores layer - Data access and repository pattern
pub mod user_store;

pub use user_store::{NewUser, ProfileUpdate, UserStore};
