/// Equipment inventory endpoints
///
/// Technicians and regular users manage the inventory as part of
/// day-to-day work; only removal is reserved for administrators, and
/// restricted accounts see none of it.
///
/// # Endpoints
///
/// - `GET    /equipment` - Filtered, paginated inventory listing
/// - `GET    /equipment/types` - Distinct device types for filter menus
/// - `POST   /equipment` - Register a device
/// - `GET    /equipment/:id` - Device detail with maintenance history
/// - `PUT    /equipment/:id` - Edit a device
/// - `DELETE /equipment/:id` - Remove a device and its history (admin)
/// - `POST   /equipment/:id/maintenance` - Log maintenance work
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::equipment::{
    CreateEquipment, Equipment, EquipmentCleanup, EquipmentFilter, EquipmentPage,
    EquipmentWithLocation, UpdateEquipment,
};
use fielddesk_shared::models::maintenance::{
    CreateMaintenance, MaintenanceRecord, MaintenanceWithPerformer,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Equipment listing query parameters
///
/// # Example Request
///
/// `GET /equipment?device_type=Printer&status=active&page=2`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentListQuery {
    /// Exact device type match
    pub device_type: Option<String>,
    /// Status match, case-insensitive
    pub status: Option<String>,
    /// Site filter; non-numeric values are ignored
    pub location_id: Option<String>,
    /// 1-based page number
    pub page: Option<i64>,
}

/// Device detail payload
///
/// # Example Response
///
/// ```json
/// {
///   "equipment": {
///     "id": 4,
///     "device_type": "Printer",
///     "model": "LaserJet Pro M404",
///     "serial_number": "PHBJC1234",
///     "location_id": 2,
///     "location_name": "North Branch",
///     "ip_address": "10.0.2.31",
///     "status": "active",
///     "installation_date": "2024-03-18"
///   },
///   "maintenance": [
///     {
///       "id": 9,
///       "equipment_id": 4,
///       "maintenance_type": "Repair",
///       "description": "Replaced fuser unit",
///       "date_performed": "2025-06-02",
///       "performed_by": 3,
///       "performer_username": "tgrant"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct EquipmentDetailResponse {
    pub equipment: EquipmentWithLocation,
    pub maintenance: Vec<MaintenanceWithPerformer>,
}

/// Device deletion result
///
/// `cleanup` is present only when a row was actually removed.
#[derive(Debug, Serialize)]
pub struct DeleteEquipmentResponse {
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<EquipmentCleanup>,
}

/// Equipment listing endpoint handler
///
/// Pages are 10 rows, newest device first, and an out-of-range page
/// request is clamped rather than rejected.
pub async fn list_equipment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<EquipmentListQuery>,
) -> ApiResult<Json<EquipmentPage>> {
    authorize(Some(&current), Capability::ListEquipment)?;

    let filter = EquipmentFilter::from_params(query.device_type, query.status, query.location_id);
    let page = Equipment::search(&state.db, &filter, query.page.unwrap_or(1)).await?;

    Ok(Json(page))
}

/// Device type listing endpoint handler
///
/// Returns the distinct device types currently in the inventory, for
/// populating the listing filter.
pub async fn device_types(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<String>>> {
    authorize(Some(&current), Capability::ListEquipment)?;

    let types = Equipment::device_types(&state.db).await?;

    Ok(Json(types))
}

/// Device detail endpoint handler
///
/// # Errors
///
/// - 404 Not Found: No such device
pub async fn get_equipment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EquipmentDetailResponse>> {
    authorize(Some(&current), Capability::ViewEquipment)?;

    let equipment = Equipment::find_with_location(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Equipment not found".to_string(),
            redirect: Some("/equipment".to_string()),
        })?;
    let maintenance = MaintenanceRecord::list_for_equipment(&state.db, id).await?;

    Ok(Json(EquipmentDetailResponse {
        equipment,
        maintenance,
    }))
}

/// Device registration endpoint handler
///
/// # Example Request
///
/// ```json
/// {
///   "device_type": "Printer",
///   "model": "LaserJet Pro M404",
///   "serial_number": "PHBJC1234",
///   "location_id": 2,
///   "ip_address": "10.0.2.31"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: Validation failure or unknown location
/// - 403 Forbidden: Restricted account
/// - 409 Conflict: Serial number already registered
pub async fn create_equipment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateEquipment>,
) -> ApiResult<Json<Equipment>> {
    authorize(Some(&current), Capability::AddEquipment)?;
    payload.validate()?;

    let equipment = Equipment::create(&state.db, payload).await?;

    tracing::info!(
        equipment_id = equipment.id,
        device_type = %equipment.device_type,
        created_by = current.user_id,
        "Equipment registered"
    );

    Ok(Json(equipment))
}

/// Device edit endpoint handler
///
/// Omitted fields are left unchanged; nullable fields are cleared by
/// sending an explicit `null`.
///
/// # Errors
///
/// - 400 Bad Request: Validation failure or unknown location
/// - 403 Forbidden: Restricted account
/// - 404 Not Found: No such device
/// - 409 Conflict: Serial number already registered
pub async fn update_equipment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateEquipment>,
) -> ApiResult<Json<Equipment>> {
    authorize(Some(&current), Capability::EditEquipment)?;
    payload.validate()?;

    let equipment = Equipment::update(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Equipment not found".to_string(),
            redirect: Some("/equipment".to_string()),
        })?;

    tracing::info!(
        equipment_id = equipment.id,
        changed_by = current.user_id,
        "Equipment updated"
    );

    Ok(Json(equipment))
}

/// Device deletion endpoint handler
///
/// Deleting a device also deletes its maintenance history and clears
/// the device reference on any tickets that pointed at it. Deleting a
/// device that is already gone reports `deleted: false`.
pub async fn delete_equipment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteEquipmentResponse>> {
    authorize(Some(&current), Capability::DeleteEquipment)?;

    let cleanup = Equipment::delete(&state.db, id).await?;

    if let Some(cleanup) = &cleanup {
        tracing::info!(
            equipment_id = id,
            maintenance_records = cleanup.maintenance_records,
            tickets_unlinked = cleanup.tickets_unlinked,
            deleted_by = current.user_id,
            "Equipment deleted"
        );
    }

    Ok(Json(DeleteEquipmentResponse {
        deleted: cleanup.is_some(),
        cleanup,
    }))
}

/// Maintenance logging endpoint handler
///
/// The performer is always the session user, and the date defaults to
/// today when the request leaves it out.
///
/// # Example Request
///
/// ```json
/// { "maintenance_type": "Repair", "description": "Replaced fuser unit" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: Validation failure
/// - 403 Forbidden: Restricted account
/// - 404 Not Found: No such device
pub async fn add_maintenance(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateMaintenance>,
) -> ApiResult<Json<MaintenanceRecord>> {
    authorize(Some(&current), Capability::AddMaintenance)?;
    payload.validate()?;

    let record = MaintenanceRecord::add(&state.db, id, current.user_id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Equipment not found".to_string(),
            redirect: Some("/equipment".to_string()),
        })?;

    tracing::info!(
        equipment_id = id,
        maintenance_id = record.id,
        performed_by = current.user_id,
        "Maintenance recorded"
    );

    Ok(Json(record))
}
