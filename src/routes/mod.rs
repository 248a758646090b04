/// Router Module Index
///
/// Routing is split by access level so the auth perimeter is applied
/// explicitly at the module boundary (an Axum `route_layer` over the admin
/// router) rather than per handler, preventing accidental exposure of
/// protected endpoints.
/// Routes accessible to any client: the marketing site's read surface,
/// the contact form, and login.
pub mod public;

/// The back-office surface. Every route here sits behind the session-token
/// perimeter middleware, and every handler additionally validates the token
/// and requires the admin role.
pub mod admin;
