pub mod memory;
pub mod rest;
pub mod session_events;
pub mod traits;

pub use memory::{InMemoryPushConfigStore, InMemorySessionService, InMemoryTaskStore};
pub use rest::{RestClient, RestPushConfigStore, RestSessionService, RestTaskStore};
pub use traits::{PushConfigStore, SessionService, TaskStore};
