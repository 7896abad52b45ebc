//! Trait contracts and shared types for the task scheduler core.
//!
//! This crate defines the kernel-level contract only: the persisted [`Task`]
//! shape, the [`TaskRegistry`] and [`TaskRepository`] traits, the injectable
//! [`Clock`], and the crate-wide [`SchedulerError`] taxonomy. Concrete
//! implementations (the cron/timer dispatch engine, the in-memory registry
//! and repository) live in the `scheduler` crate.
//!
//! Keeping the contract here means it can be compiled and unit-tested
//! without pulling in `tokio::time`, the `cron` crate, or any dispatch
//! machinery — callers that only need to be generic over the scheduler
//! backend (mocks, alternate persistence backends) depend on this crate
//! alone.

pub mod clock;
pub mod error;
pub mod registry;
pub mod repository;
pub mod task;

pub use clock::{Clock, SystemClock};
pub use error::SchedulerError;
pub use registry::{task_body, BoxFuture, TaskBody, TaskContext, TaskRegistry};
pub use repository::TaskRepository;
pub use task::{Task, TaskKind, TaskSchedule, TaskState};
