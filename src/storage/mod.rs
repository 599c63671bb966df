pub mod backend;
pub mod layout;

pub use backend::{FileStorage, MemoryStorage, StateStorage};
pub use layout::PersistedState;
