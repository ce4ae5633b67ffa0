use std::sync::Arc;

use rota_core::{IntervalPolicy, ScheduleService, ScheduleStore, TaskService};

/// Shared handler state: both services over one store.
pub struct AppState {
    pub schedules: ScheduleService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(store: Arc<dyn ScheduleStore>, policy: IntervalPolicy) -> Self {
        Self {
            schedules: ScheduleService::new(store.clone(), policy),
            tasks: TaskService::new(store, policy),
        }
    }
}
