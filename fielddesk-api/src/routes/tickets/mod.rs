/// Ticket endpoints
///
/// Tickets are the core of the system, so each operation gets its own
/// file. Listing and the CSV export share the same filter semantics;
/// the export is the listing without pagination.
///
/// # Endpoints
///
/// - `GET /tickets` - Filtered, paginated listing
/// - `GET /tickets/export` - CSV download of the filtered listing
/// - `POST /tickets` - Create a ticket (admin)
/// - `GET /tickets/:id` - Single ticket with its comment thread
/// - `PUT /tickets/:id` - Edit a ticket (admin)
/// - `DELETE /tickets/:id` - Delete a ticket (admin)
/// - `PUT /tickets/:id/status` - Change status
/// - `PUT /tickets/:id/assign` - Reassign
/// - `POST /tickets/:id/comments` - Add a comment
///
/// # Restricted Accounts
///
/// Accounts with the `opentickets` role may only list and view, and
/// their listings are pinned to Open status regardless of the query
/// string. The pin is applied here, derived from the session role;
/// clients cannot opt out of it.

pub mod assign;
pub mod comments;
pub mod create;
pub mod delete;
pub mod export;
pub mod get;
pub mod list;
pub mod status;
pub mod update;

// Re-export handlers for convenience
pub use assign::{assign_ticket, AssignTicketRequest};
pub use comments::{add_comment, AddCommentRequest};
pub use create::create_ticket;
pub use delete::{delete_ticket, DeleteTicketResponse};
pub use export::export_tickets;
pub use get::{get_ticket, TicketDetailResponse};
pub use list::{list_tickets, TicketListQuery};
pub use status::{update_ticket_status, UpdateStatusRequest};
pub use update::update_ticket;
