pub mod cascade;
pub mod config;
pub mod entity;
pub mod error;
pub mod service;
pub mod store;
pub mod temporal;
pub mod validation;

pub use config::{Config, IntervalPolicy};
pub use entity::*;
pub use error::*;
pub use service::{DeleteOutcome, ScheduleService, TaskService};
pub use store::{SaveMode, ScheduleStore};
