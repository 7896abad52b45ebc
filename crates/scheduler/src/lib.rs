//! Concrete dispatch engine, default registry/repository, and process-wide
//! convenience entry point for the task scheduler.
//!
//! This crate builds on the contracts defined in `scheduler_kernel`:
//! [`registry::InMemoryTaskRegistry`] and [`repository::InMemoryTaskRepository`]
//! are the default implementations of the kernel's [`scheduler_kernel::TaskRegistry`]
//! and [`scheduler_kernel::TaskRepository`] traits, [`engine::SchedulerEngine`]
//! is the cron/timer dispatch core (C4), [`manager::TaskManager`] is the
//! thin composition layer in front of it (C5), and [`global`] is the
//! process-wide singleton (C6) — an optional convenience, never required.

pub mod config;
pub mod engine;
mod entities;
pub mod global;
pub mod manager;
pub mod registry;
pub mod repository;

pub use config::EngineConfig;
pub use engine::SchedulerEngine;
pub use global::GlobalScheduler;
pub use manager::TaskManager;
pub use registry::InMemoryTaskRegistry;
pub use repository::InMemoryTaskRepository;

pub use scheduler_kernel::{
    task_body, Clock, SchedulerError, SystemClock, Task, TaskBody, TaskContext, TaskKind,
    TaskRegistry, TaskRepository, TaskSchedule, TaskState,
};
