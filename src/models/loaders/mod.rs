pub mod request_loader;

pub use request_loader::{load_request, parse_request};
