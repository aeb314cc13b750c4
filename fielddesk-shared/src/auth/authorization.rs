/// The authorization gate
///
/// Every business operation is named by a [`Capability`], and every
/// handler asks the gate exactly one question: may this user invoke
/// this capability? The decision comes from a closed allow-list on
/// [`Role`], so the whole access policy is auditable in one place and
/// a new operation cannot be wired up without declaring who may call
/// it.
///
/// # Decision order
///
/// 1. No authenticated user: deny, send to the login page.
/// 2. Admins: allow unconditionally.
/// 3. `opentickets` accounts: allow only viewing and listing tickets;
///    anything else denies with a redirect to the ticket list.
/// 4. Remaining roles: deny admin-only capabilities with a redirect to
///    the dashboard.
/// 5. Otherwise allow.
///
/// Denials carry their redirect target and user-facing message, so the
/// HTTP layer only has to serialize them.
///
/// # Example
///
/// ```no_run
/// use fielddesk_shared::auth::authorization::{authorize, Capability};
/// use fielddesk_shared::auth::middleware::CurrentUser;
///
/// fn handle(current: &CurrentUser) -> Result<(), Box<dyn std::error::Error>> {
///     authorize(Some(current), Capability::CreateTicket)?;
///     // ... proceed with the operation
///     Ok(())
/// }
/// ```
use serde::{Deserialize, Serialize};

use super::middleware::CurrentUser;
use crate::models::user::Role;

/// Error type for authorization decisions
///
/// The display string is the user-facing message; the redirect target
/// is where the client should send the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No authenticated user on the request
    #[error("Please log in to access this page.")]
    NotAuthenticated,

    /// An `opentickets` account tried something beyond viewing tickets
    #[error("You only have permission to view open tickets.")]
    OpenTicketsOnly,

    /// The capability is reserved for administrators
    #[error("You do not have permission to access this page.")]
    PermissionDenied,
}

impl AuthzError {
    /// Where the client should redirect the user after this denial
    pub fn redirect_target(&self) -> &'static str {
        match self {
            AuthzError::NotAuthenticated => "/login",
            AuthzError::OpenTicketsOnly => "/tickets",
            AuthzError::PermissionDenied => "/dashboard",
        }
    }
}

/// Every gated operation in the system
///
/// One variant per business operation. Handlers pass the capability
/// they implement to [`authorize`]; nothing else consults roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    ViewDashboard,

    ListTickets,
    ViewTicket,
    CreateTicket,
    EditTicket,
    DeleteTicket,
    UpdateTicketStatus,
    AssignTicket,
    AddComment,
    ExportTickets,

    ListEquipment,
    ViewEquipment,
    AddEquipment,
    EditEquipment,
    DeleteEquipment,
    AddMaintenance,

    ListLocations,
    ViewLocation,
    AddLocation,
    EditLocation,
    DeleteLocation,

    ListUsers,
    AddUser,
    EditUser,

    ViewProfile,
    EditProfile,

    ListAccessRequests,
    ProcessAccessRequest,
}

impl Capability {
    /// Every capability (used by the exhaustive policy tests)
    pub const ALL: [Capability; 28] = [
        Capability::ViewDashboard,
        Capability::ListTickets,
        Capability::ViewTicket,
        Capability::CreateTicket,
        Capability::EditTicket,
        Capability::DeleteTicket,
        Capability::UpdateTicketStatus,
        Capability::AssignTicket,
        Capability::AddComment,
        Capability::ExportTickets,
        Capability::ListEquipment,
        Capability::ViewEquipment,
        Capability::AddEquipment,
        Capability::EditEquipment,
        Capability::DeleteEquipment,
        Capability::AddMaintenance,
        Capability::ListLocations,
        Capability::ViewLocation,
        Capability::AddLocation,
        Capability::EditLocation,
        Capability::DeleteLocation,
        Capability::ListUsers,
        Capability::AddUser,
        Capability::EditUser,
        Capability::ViewProfile,
        Capability::EditProfile,
        Capability::ListAccessRequests,
        Capability::ProcessAccessRequest,
    ];

    /// Whether this capability is reserved for administrators
    pub fn admin_only(&self) -> bool {
        matches!(
            self,
            Capability::CreateTicket
                | Capability::EditTicket
                | Capability::DeleteTicket
                | Capability::DeleteEquipment
                | Capability::AddLocation
                | Capability::EditLocation
                | Capability::DeleteLocation
                | Capability::ListUsers
                | Capability::AddUser
                | Capability::EditUser
                | Capability::ListAccessRequests
                | Capability::ProcessAccessRequest
        )
    }
}

impl Role {
    /// The allow-list: may this role invoke this capability?
    ///
    /// This is the single source of truth for access policy.
    /// [`authorize`] only adds the authentication check and picks the
    /// denial flavor.
    pub fn allows(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::OpenTickets => matches!(
                capability,
                Capability::ViewTicket | Capability::ListTickets
            ),
            Role::Technician | Role::User => !capability.admin_only(),
        }
    }
}

/// Decides whether a (possibly anonymous) user may invoke a capability
///
/// # Arguments
///
/// * `user` - The authenticated user, or None for anonymous requests
/// * `capability` - The operation being attempted
///
/// # Returns
///
/// `Ok(())` to allow; an [`AuthzError`] carrying the redirect target
/// and message to deny
pub fn authorize(user: Option<&CurrentUser>, capability: Capability) -> Result<(), AuthzError> {
    let user = user.ok_or(AuthzError::NotAuthenticated)?;

    if user.role.allows(capability) {
        return Ok(());
    }

    match user.role {
        Role::OpenTickets => Err(AuthzError::OpenTicketsOnly),
        _ => Err(AuthzError::PermissionDenied),
    }
}
