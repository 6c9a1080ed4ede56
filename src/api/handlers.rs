use crate::api::responses::{
    DashboardSuccessResponse, EntryResponse, EntrySuccessResponse, ErrorCode, ErrorResponse,
    HealthStatus, HealthSuccessResponse, QueueSuccessResponse,
};
use crate::error::AppError;
use crate::estimation::accuracy::SeatingFeedback;
use crate::lifecycle::{NewEntry, WaitingList};
use crate::queue::{
    CalculationMode, CustomerId, EntryId, FloorId, Priority, QueueEntry, Table, TableId,
};
use crate::state::{AppState, SharedState};
use crate::store::MemoryStore;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

pub enum ApiResponse<T> {
    Success {
        status: StatusCode,
        body: T,
    },
    Error {
        status: StatusCode,
        body: ErrorResponse,
    },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success { status, body } => (status, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub party_size: u32,
    #[serde(default)]
    pub priority: Priority,
    pub customer_id: Option<CustomerId>,
    pub floor_id: Option<FloorId>,
    #[serde(default)]
    pub calculation_mode: CalculationMode,
    #[serde(default)]
    pub manual_wait_minutes: f64,
    /// RFC 3339; defaults to the time of the request.
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTableRequest {
    pub table_id: TableId,
    pub seats: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryAction {
    Ready,
    Call,
    Seat,
    Done,
    Cancel,
    NoShow,
}

pub async fn get_health(State(state): State<SharedState>) -> impl IntoResponse {
    build_health_response(&state, OffsetDateTime::now_utc())
}

pub async fn get_queue(State(state): State<SharedState>) -> impl IntoResponse {
    build_queue_response(&state, OffsetDateTime::now_utc())
}

pub async fn create_entry(
    State(state): State<SharedState>,
    Json(request): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    build_create_response(&state, request, OffsetDateTime::now_utc())
}

pub async fn get_entry(
    State(state): State<SharedState>,
    Path(id): Path<EntryId>,
) -> impl IntoResponse {
    build_entry_response(&state, id, OffsetDateTime::now_utc())
}

pub async fn recalculate_entry(
    State(state): State<SharedState>,
    Path(id): Path<EntryId>,
) -> impl IntoResponse {
    build_recalculate_response(&state, id, OffsetDateTime::now_utc())
}

pub async fn apply_action(
    State(state): State<SharedState>,
    Path((id, action)): Path<(EntryId, EntryAction)>,
) -> impl IntoResponse {
    build_action_response(&state, id, action, OffsetDateTime::now_utc())
}

pub async fn assign_table(
    State(state): State<SharedState>,
    Path(id): Path<EntryId>,
    Json(request): Json<AssignTableRequest>,
) -> impl IntoResponse {
    build_assign_table_response(&state, id, request, OffsetDateTime::now_utc())
}

pub async fn get_dashboard(State(state): State<SharedState>) -> impl IntoResponse {
    build_dashboard_response(&state, OffsetDateTime::now_utc())
}

fn build_health_response(
    state: &SharedState,
    now: OffsetDateTime,
) -> ApiResponse<HealthSuccessResponse> {
    match read_state(state, |app| Ok(app.waiting_list().queue().len())) {
        Ok(queue_length) => ApiResponse::Success {
            status: StatusCode::OK,
            body: HealthSuccessResponse {
                status: HealthStatus::Ok,
                queue_length,
                timestamp: format_timestamp(now),
            },
        },
        Err(err) => error_response(&err, now),
    }
}

fn build_queue_response(
    state: &SharedState,
    now: OffsetDateTime,
) -> ApiResponse<QueueSuccessResponse> {
    match read_state(state, |app| Ok(app.waiting_list().queue())) {
        Ok(queue) => {
            let entries: Vec<EntryResponse> =
                queue.iter().map(|entry| entry_body(entry, now)).collect();
            ApiResponse::Success {
                status: StatusCode::OK,
                body: QueueSuccessResponse {
                    queue_length: entries.len(),
                    entries,
                    timestamp: format_timestamp(now),
                },
            }
        }
        Err(err) => error_response(&err, now),
    }
}

fn build_create_response(
    state: &SharedState,
    request: CreateEntryRequest,
    now: OffsetDateTime,
) -> ApiResponse<EntrySuccessResponse> {
    let created_at = match request.created_at.as_deref().map(parse_timestamp).transpose() {
        Ok(created_at) => created_at,
        Err(err) => return invalid_input(format!("invalid created_at: {err}"), now),
    };
    let new_entry = NewEntry {
        party_size: request.party_size,
        priority: request.priority,
        customer_id: request.customer_id,
        floor_id: request.floor_id,
        calculation_mode: request.calculation_mode,
        manual_wait_minutes: request.manual_wait_minutes,
        created_at,
    };

    let result = write_state(state, |app| {
        app.update(|list| list.add_entry(new_entry, now))
    });
    entry_outcome(result.map(|entry| (entry, None)), StatusCode::CREATED, now)
}

fn build_entry_response(
    state: &SharedState,
    id: EntryId,
    now: OffsetDateTime,
) -> ApiResponse<EntrySuccessResponse> {
    let result = read_state(state, |app| app.waiting_list().get(id));
    entry_outcome(result.map(|entry| (entry, None)), StatusCode::OK, now)
}

fn build_recalculate_response(
    state: &SharedState,
    id: EntryId,
    now: OffsetDateTime,
) -> ApiResponse<EntrySuccessResponse> {
    let result = write_state(state, |app| app.update(|list| list.recalculate(id)));
    entry_outcome(result.map(|entry| (entry, None)), StatusCode::OK, now)
}

fn build_action_response(
    state: &SharedState,
    id: EntryId,
    action: EntryAction,
    now: OffsetDateTime,
) -> ApiResponse<EntrySuccessResponse> {
    let result = write_state(state, |app| {
        app.update(|list| apply_entry_action(list, id, action, now))
    });
    entry_outcome(result, StatusCode::OK, now)
}

fn build_assign_table_response(
    state: &SharedState,
    id: EntryId,
    request: AssignTableRequest,
    now: OffsetDateTime,
) -> ApiResponse<EntrySuccessResponse> {
    let table = Table {
        id: request.table_id,
        seats: request.seats,
    };
    let result = write_state(state, |app| {
        app.update(|list| list.assign_table(id, table, now))
    });
    match result {
        Ok(assigned) => ApiResponse::Success {
            status: StatusCode::OK,
            body: EntrySuccessResponse {
                entry: entry_body(&assigned.entry, now),
                feedback: None,
                occupied_by: assigned.occupied_by,
                timestamp: format_timestamp(now),
            },
        },
        Err(err) => error_response(&err, now),
    }
}

fn build_dashboard_response(
    state: &SharedState,
    now: OffsetDateTime,
) -> ApiResponse<DashboardSuccessResponse> {
    match read_state(state, |app| Ok(app.waiting_list().dashboard(now.date()))) {
        Ok(statistics) => ApiResponse::Success {
            status: StatusCode::OK,
            body: DashboardSuccessResponse {
                statistics,
                timestamp: format_timestamp(now),
            },
        },
        Err(err) => error_response(&err, now),
    }
}

fn apply_entry_action(
    list: &mut WaitingList<MemoryStore>,
    id: EntryId,
    action: EntryAction,
    now: OffsetDateTime,
) -> Result<(QueueEntry, Option<SeatingFeedback>), AppError> {
    let entry = match action {
        EntryAction::Seat => return list.seat(id, now),
        EntryAction::Ready => list.mark_ready(id, now)?,
        EntryAction::Call => list.call(id, now)?,
        EntryAction::Done => list.mark_done(id, now)?,
        EntryAction::Cancel => list.cancel(id, now)?,
        EntryAction::NoShow => list.mark_no_show(id, now)?,
    };
    Ok((entry, None))
}

fn read_state<T>(
    state: &SharedState,
    read: impl FnOnce(&AppState) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let guard = state.read().map_err(|_| AppError::StateLock)?;
    read(&*guard)
}

fn write_state<T>(
    state: &SharedState,
    write: impl FnOnce(&mut AppState) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut guard = state.write().map_err(|_| AppError::StateLock)?;
    write(&mut *guard)
}

fn entry_outcome(
    result: Result<(QueueEntry, Option<SeatingFeedback>), AppError>,
    status: StatusCode,
    now: OffsetDateTime,
) -> ApiResponse<EntrySuccessResponse> {
    match result {
        Ok((entry, feedback)) => ApiResponse::Success {
            status,
            body: EntrySuccessResponse {
                entry: entry_body(&entry, now),
                feedback,
                occupied_by: None,
                timestamp: format_timestamp(now),
            },
        },
        Err(err) => error_response(&err, now),
    }
}

fn entry_body(entry: &QueueEntry, now: OffsetDateTime) -> EntryResponse {
    EntryResponse {
        id: entry.id,
        status: entry.status,
        party_size: entry.party_size,
        priority: entry.priority.value(),
        customer_id: entry.customer_id,
        floor_id: entry.floor_id,
        table_id: entry.table.map(|table| table.id),
        created_at: entry.created_at.map(format_timestamp),
        calculation_mode: entry.calculation_mode,
        estimated_wait_minutes: entry.estimated_wait_minutes,
        wait_source: entry.wait_source.clone(),
        actual_wait_minutes: entry.actual_wait_minutes(now),
    }
}

fn error_response<T>(err: &AppError, now: OffsetDateTime) -> ApiResponse<T> {
    let (status, error_code) = match err {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        AppError::InvalidTransition { .. } => (StatusCode::CONFLICT, ErrorCode::InvalidTransition),
        AppError::TableRequired => (StatusCode::CONFLICT, ErrorCode::TableRequired),
        AppError::TableAssignment(_) => (StatusCode::CONFLICT, ErrorCode::TableAssignment),
        AppError::NotEditable(_) => (StatusCode::CONFLICT, ErrorCode::NotEditable),
        AppError::NotEstimable(_) => (StatusCode::CONFLICT, ErrorCode::NotEstimable),
        AppError::ManualMode => (StatusCode::CONFLICT, ErrorCode::ManualMode),
        AppError::TableCapacity { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::TableCapacity)
        }
        AppError::InvalidPartySize(_)
        | AppError::InvalidPriority(_)
        | AppError::InvalidManualWait(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidInput)
        }
        AppError::StateLock => return internal_error(&err.to_string(), now),
    };
    debug!(error = %err, status = status.as_u16(), "Request rejected");
    ApiResponse::Error {
        status,
        body: ErrorResponse {
            error_code,
            error_message: err.to_string(),
            timestamp: format_timestamp(now),
        },
    }
}

fn invalid_input<T>(message: String, now: OffsetDateTime) -> ApiResponse<T> {
    ApiResponse::Error {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        body: ErrorResponse {
            error_code: ErrorCode::InvalidInput,
            error_message: message,
            timestamp: format_timestamp(now),
        },
    }
}

fn internal_error<T>(message: &str, now: OffsetDateTime) -> ApiResponse<T> {
    error!(message = message, "Internal error while handling request");
    ApiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            error_code: ErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: format_timestamp(now),
        },
    }
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(value, &Rfc3339)
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp.format(&Rfc3339).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format timestamp");
        FALLBACK_TIMESTAMP.to_string()
    })
}
