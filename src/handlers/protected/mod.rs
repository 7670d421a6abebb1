// Handlers that resolve the session cookie themselves rather than relying on
// the route gate.
pub mod auth;
pub mod user;
