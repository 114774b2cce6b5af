pub mod chat;
pub mod coordinate;
pub mod place;
pub mod query;
pub mod route;
