// Client session store exports
pub mod session;
pub mod storage;

pub use session::{Mutation, SessionState, SessionStore, TOKEN_KEY, USER_KEY};
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};
