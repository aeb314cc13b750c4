/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login, logout, and current-user endpoints
/// - `dashboard`: Summary counts and recent activity
/// - `tickets`: Ticket listing, CRUD, workflow, and CSV export
/// - `equipment`: Device inventory and maintenance log
/// - `locations`: Site management
/// - `users`: Account administration
/// - `profile`: Self-service account settings
/// - `access_requests`: Public account requests and their review

pub mod access_requests;
pub mod auth;
pub mod dashboard;
pub mod equipment;
pub mod health;
pub mod locations;
pub mod profile;
pub mod tickets;
pub mod users;
