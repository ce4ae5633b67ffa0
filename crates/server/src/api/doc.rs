//! OpenAPI documentation aggregator, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rota API",
        version = "0.1.0",
        description = "Agent schedules and the work/break tasks inside them.",
    ),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Schedules", description = "Schedule CRUD; deletes are refused while tasks remain"),
        (name = "Tasks", description = "Task CRUD; tasks must fit inside their schedule"),
    ),
    paths(
        crate::api::health::health,
        crate::api::schedules::schedules_list,
        crate::api::schedules::schedules_create,
        crate::api::schedules::schedules_get,
        crate::api::schedules::schedules_update,
        crate::api::schedules::schedules_delete,
        crate::api::tasks::tasks_list,
        crate::api::tasks::tasks_create,
        crate::api::tasks::tasks_get,
        crate::api::tasks::tasks_update,
        crate::api::tasks::tasks_delete,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::schedules::SchedulePayload,
        crate::api::tasks::TaskPayload,
    ))
)]
pub struct ApiDoc;
