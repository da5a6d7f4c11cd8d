//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, HttpClient, Selector, etc.)
//! but are themselves concrete structs, not traits.

pub mod chooser;
mod credentials;
mod flags;
mod login;
mod session;

pub use credentials::CredentialStore;
pub use flags::FlagService;
pub use login::{LoginService, POLL_INTERVAL};
pub use session::SessionService;
