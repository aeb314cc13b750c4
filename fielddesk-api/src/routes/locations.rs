/// Site management endpoints
///
/// Every signed-in role may browse sites; create, edit and delete are
/// admin operations. Site deletion never cascades into tickets or
/// devices, it only unlinks them.
///
/// # Endpoints
///
/// - `GET    /locations` - All sites with device counts
/// - `POST   /locations` - Add a site (admin)
/// - `GET    /locations/:id` - Site detail with devices and recent tickets
/// - `PUT    /locations/:id` - Edit a site (admin)
/// - `DELETE /locations/:id` - Remove a site, unlinking references (admin)
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use fielddesk_shared::auth::authorization::{authorize, Capability};
use fielddesk_shared::auth::middleware::CurrentUser;
use fielddesk_shared::models::equipment::Equipment;
use fielddesk_shared::models::location::{
    CreateLocation, Location, LocationWithCounts, UnlinkCounts, UpdateLocation,
};
use fielddesk_shared::models::ticket::{Ticket, TicketWithNames};
use serde::Serialize;
use validator::Validate;

/// Tickets shown on a site's detail page
const RECENT_TICKETS: i64 = 5;

/// Site detail payload
///
/// # Example Response
///
/// ```json
/// {
///   "location": {
///     "id": 2,
///     "name": "North Branch",
///     "address": "14 Mill Road",
///     "contact_person": "Dana Voss",
///     "contact_phone": "555-0182",
///     "anydesk_id": "123456789",
///     "created_at": "2025-01-12T09:30:00Z"
///   },
///   "equipment": [],
///   "recent_tickets": []
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct LocationDetailResponse {
    pub location: Location,
    pub equipment: Vec<Equipment>,
    pub recent_tickets: Vec<TicketWithNames>,
}

/// Site deletion result
///
/// `unlinked` is present only when a row was actually removed.
#[derive(Debug, Serialize)]
pub struct DeleteLocationResponse {
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlinked: Option<UnlinkCounts>,
}

/// Site listing endpoint handler
///
/// Sites come back in name order, each with its device count.
pub async fn list_locations(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<LocationWithCounts>>> {
    authorize(Some(&current), Capability::ListLocations)?;

    let locations = Location::list_with_counts(&state.db).await?;

    Ok(Json(locations))
}

/// Site detail endpoint handler
///
/// # Errors
///
/// - 404 Not Found: No such site
pub async fn get_location(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<LocationDetailResponse>> {
    authorize(Some(&current), Capability::ViewLocation)?;

    let location = Location::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Location not found".to_string(),
            redirect: Some("/locations".to_string()),
        })?;
    let equipment = Equipment::list_for_location(&state.db, id).await?;
    let recent_tickets = Ticket::recent_for_location(&state.db, id, RECENT_TICKETS).await?;

    Ok(Json(LocationDetailResponse {
        location,
        equipment,
        recent_tickets,
    }))
}

/// Site creation endpoint handler
///
/// # Example Request
///
/// ```json
/// { "name": "North Branch", "address": "14 Mill Road" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request: Validation failure
/// - 403 Forbidden: Caller is not an administrator
/// - 409 Conflict: Site name already in use
pub async fn create_location(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateLocation>,
) -> ApiResult<Json<Location>> {
    authorize(Some(&current), Capability::AddLocation)?;
    payload.validate()?;

    let location = Location::create(&state.db, payload).await?;

    tracing::info!(
        location_id = location.id,
        name = %location.name,
        created_by = current.user_id,
        "Location created"
    );

    Ok(Json(location))
}

/// Site edit endpoint handler
///
/// Omitted fields are left unchanged; nullable fields are cleared by
/// sending an explicit `null`.
///
/// # Errors
///
/// - 400 Bad Request: Validation failure
/// - 403 Forbidden: Caller is not an administrator
/// - 404 Not Found: No such site
/// - 409 Conflict: Site name already in use
pub async fn update_location(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLocation>,
) -> ApiResult<Json<Location>> {
    authorize(Some(&current), Capability::EditLocation)?;
    payload.validate()?;

    let location = Location::update(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "Location not found".to_string(),
            redirect: Some("/locations".to_string()),
        })?;

    tracing::info!(
        location_id = location.id,
        changed_by = current.user_id,
        "Location updated"
    );

    Ok(Json(location))
}

/// Site deletion endpoint handler
///
/// Devices, tickets and accounts that referenced the site are kept
/// with their reference cleared. Deleting a site that is already gone
/// reports `deleted: false`.
pub async fn delete_location(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteLocationResponse>> {
    authorize(Some(&current), Capability::DeleteLocation)?;

    let unlinked = Location::delete(&state.db, id).await?;

    if let Some(unlinked) = &unlinked {
        tracing::info!(
            location_id = id,
            equipment_unlinked = unlinked.equipment,
            tickets_unlinked = unlinked.tickets,
            users_unlinked = unlinked.users,
            deleted_by = current.user_id,
            "Location deleted"
        );
    }

    Ok(Json(DeleteLocationResponse {
        deleted: unlinked.is_some(),
        unlinked,
    }))
}
