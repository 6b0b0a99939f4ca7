pub mod error;
pub mod text_store;

pub use error::PersistenceError;
pub use text_store::TextStore;
