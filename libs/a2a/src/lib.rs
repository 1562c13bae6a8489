//! A2A protocol core: context/task resolution, the event converter, the
//! HITL decision engine, the task-saving event queue, the streaming
//! executor, and the task manager that ties them together (spec §4, §9).

pub mod context;
pub mod converter;
pub mod event;
pub mod executor;
pub mod hitl;
pub mod jsonrpc;
pub mod manager;
pub mod queue;

pub use context::{resolve_context_id, resolve_task_id};
pub use converter::{EventContext, convert_event};
pub use event::{A2aStreamEvent, TaskArtifactUpdateEvent, TaskStatusUpdateEvent};
pub use executor::{FrameworkError, FrameworkExecutor, StreamingExecutor};
pub use hitl::{Decision, extract_decision};
pub use manager::TaskManager;
pub use queue::{ChannelSink, EventSink, ListSink, TaskSavingEventQueue};
