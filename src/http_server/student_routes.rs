//! Student HTTP Routes
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | POST | /api/students | 201 `{success, message, data}` |
//! | GET | /api/students | 200 `{success, count, data}` |
//! | GET | /api/students/:id | 200 `{success, data}` |
//! | PUT | /api/students/:id | 200 `{success, message, data}` |
//! | DELETE | /api/students/:id | 200 `{success, message, data}` |

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::schema::{NewStudent, Student, StudentPatch};
use crate::students::{StudentRepository, StudentResult};

use super::errors::{ApiError, Operation};
use super::extract::{BodyRejection, StudentBody};
use super::response::{ListResponse, SingleResponse};
use super::root_routes::route_not_found;

// ==================
// Shared State
// ==================

/// Student state shared across handlers
pub struct StudentState {
    pub students: StudentRepository,
}

impl StudentState {
    pub fn new(students: StudentRepository) -> Self {
        Self { students }
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ==================
// Student Routes
// ==================

/// Create student routes, to be nested under `/api/students`
pub fn student_routes(state: Arc<StudentState>) -> Router {
    Router::new()
        .route(
            "/",
            post(create_student_handler)
                .get(list_students_handler)
                .fallback(route_not_found),
        )
        .route(
            "/:id",
            get(get_student_handler)
                .put(update_student_handler)
                .delete(delete_student_handler)
                .fallback(route_not_found),
        )
        .with_state(state)
}

// ==================
// Handlers
// ==================

/// Run a repository call on the blocking pool.
///
/// Writes fsync the snapshot, so they must not run on an async worker.
async fn run_blocking<T, F>(operation: Operation, call: F) -> ApiResult<T>
where
    F: FnOnce() -> StudentResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => result.map_err(|e| ApiError::from_student_error(operation, e)),
        Err(e) => {
            tracing::error!(?operation, error = %e, "student task failed");
            Err(ApiError::Panic)
        }
    }
}

async fn create_student_handler(
    State(state): State<Arc<StudentState>>,
    body: Result<StudentBody<NewStudent>, BodyRejection>,
) -> ApiResult<(StatusCode, Json<SingleResponse<Student>>)> {
    let StudentBody(input) = body.map_err(|e| ApiError::invalid_body(Operation::Create, e))?;

    let students = state.students.clone();
    let student = run_blocking(Operation::Create, move || students.create(input)).await?;

    Ok((
        StatusCode::CREATED,
        Json(SingleResponse::with_message(
            student,
            "Student created successfully",
        )),
    ))
}

async fn list_students_handler(
    State(state): State<Arc<StudentState>>,
) -> ApiResult<Json<ListResponse<Student>>> {
    let students = state.students.clone();
    let all = run_blocking(Operation::List, move || students.list_all()).await?;

    Ok(Json(ListResponse::new(all)))
}

async fn get_student_handler(
    State(state): State<Arc<StudentState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SingleResponse<Student>>> {
    let students = state.students.clone();
    let student = run_blocking(Operation::Get, move || students.get_by_id(&id)).await?;

    Ok(Json(SingleResponse::new(student)))
}

async fn update_student_handler(
    State(state): State<Arc<StudentState>>,
    Path(id): Path<String>,
    body: Result<StudentBody<StudentPatch>, BodyRejection>,
) -> ApiResult<Json<SingleResponse<Student>>> {
    let StudentBody(patch) = body.map_err(|e| ApiError::invalid_body(Operation::Update, e))?;

    let students = state.students.clone();
    let student = run_blocking(Operation::Update, move || {
        students.update_by_id(&id, patch)
    })
    .await?;

    Ok(Json(SingleResponse::with_message(
        student,
        "Student updated successfully",
    )))
}

async fn delete_student_handler(
    State(state): State<Arc<StudentState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SingleResponse<Student>>> {
    let students = state.students.clone();
    let student = run_blocking(Operation::Delete, move || students.delete_by_id(&id)).await?;

    Ok(Json(SingleResponse::with_message(
        student,
        "Student deleted successfully",
    )))
}
