pub mod clipboard;
pub mod codec;
pub mod collaborator;
pub mod error;
pub mod models;
pub mod observer;
pub use clipboard::*;
pub use codec::{EncodedKey, KeyBytes};
pub use collaborator::*;
pub use error::*;
pub use models::*;
pub use observer::*;
