pub mod routes;
mod server;
pub use server::{app, serve};
pub mod public;
mod organizer;
pub use organizer::{ORGANIZER_HEADER, Organizer};
mod state;
pub use state::AppState;
