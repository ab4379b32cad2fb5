pub mod credentials;
pub mod http;
pub mod notifier;
pub mod protocol;

pub use credentials::{FileCredentialStore, InMemoryCredentialStore};
pub use http::HttpGateway;
pub use notifier::ConsoleNotifier;
