use crate::estimation::accuracy::SeatingFeedback;
use crate::queue::{CalculationMode, CustomerId, EntryId, FloorId, QueueStatus, TableId};
use crate::stats::DashboardStatistics;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EntryResponse {
    pub id: EntryId,
    pub status: QueueStatus,
    pub party_size: u32,
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<FloorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<TableId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub calculation_mode: CalculationMode,
    pub estimated_wait_minutes: f64,
    pub wait_source: String,
    pub actual_wait_minutes: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EntrySuccessResponse {
    pub entry: EntryResponse,
    /// Present only when a seating could be compared with its estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<SeatingFeedback>,
    /// Seated entry still holding the table just assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupied_by: Option<EntryId>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct QueueSuccessResponse {
    pub entries: Vec<EntryResponse>,
    pub queue_length: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardSuccessResponse {
    #[serde(flatten)]
    pub statistics: DashboardStatistics,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthSuccessResponse {
    pub status: HealthStatus,
    pub queue_length: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    InvalidTransition,
    TableRequired,
    TableAssignment,
    TableCapacity,
    NotEditable,
    NotEstimable,
    ManualMode,
    InvalidInput,
    InternalError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> EntryResponse {
        EntryResponse {
            id: 4,
            status: QueueStatus::Waiting,
            party_size: 2,
            priority: 1,
            customer_id: None,
            floor_id: None,
            table_id: None,
            created_at: Some("2026-03-09T19:00:00Z".to_string()),
            calculation_mode: CalculationMode::Auto,
            estimated_wait_minutes: 10.0,
            wait_source: "Minimum wait time (10 min) - 0 customers ahead".to_string(),
            actual_wait_minutes: 0.0,
        }
    }

    #[test]
    fn entry_response_omits_missing_optional_fields() {
        let value = serde_json::to_value(sample_entry()).expect("serialize entry response");
        assert_eq!(
            value,
            json!({
                "id": 4,
                "status": "waiting",
                "party_size": 2,
                "priority": 1,
                "created_at": "2026-03-09T19:00:00Z",
                "calculation_mode": "auto",
                "estimated_wait_minutes": 10.0,
                "wait_source": "Minimum wait time (10 min) - 0 customers ahead",
                "actual_wait_minutes": 0.0
            })
        );
    }

    #[test]
    fn entry_success_response_skips_absent_feedback() {
        let response = EntrySuccessResponse {
            entry: sample_entry(),
            feedback: None,
            occupied_by: None,
            timestamp: "2026-03-09T19:01:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize entry success response");
        assert!(value.get("feedback").is_none());
        assert!(value.get("occupied_by").is_none());
        assert_eq!(value["entry"]["id"], json!(4));
    }

    #[test]
    fn dashboard_response_flattens_statistics() {
        let response = DashboardSuccessResponse {
            statistics: DashboardStatistics {
                waiting_count: 3,
                seated_count: 2,
                total_count: 7,
                avg_wait_time: 12.5,
            },
            timestamp: "2026-03-09T20:00:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize dashboard response");
        assert_eq!(
            value,
            json!({
                "waiting_count": 3,
                "seated_count": 2,
                "total_count": 7,
                "avg_wait_time": 12.5,
                "timestamp": "2026-03-09T20:00:00Z"
            })
        );
    }

    #[test]
    fn health_success_response_serializes_status() {
        let response = HealthSuccessResponse {
            status: HealthStatus::Ok,
            queue_length: 0,
            timestamp: "2026-01-11T12:33:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize health success response");
        assert_eq!(
            value,
            json!({
                "status": "ok",
                "queue_length": 0,
                "timestamp": "2026-01-11T12:33:00Z"
            })
        );
    }

    #[test]
    fn error_response_uses_screaming_snake_case_code() {
        let response = ErrorResponse {
            error_code: ErrorCode::InvalidTransition,
            error_message: "cannot move entry from done to seated".to_string(),
            timestamp: "2026-01-11T12:34:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize error response");
        assert_eq!(
            value,
            json!({
                "error_code": "INVALID_TRANSITION",
                "error_message": "cannot move entry from done to seated",
                "timestamp": "2026-01-11T12:34:00Z"
            })
        );
    }
}
