// handlers/mod.rs - route handlers grouped by how they treat identity
//
// public:    no session needed (login, logout, login page, webhooks)
// protected: resolve the session themselves (ping, /api/user/*)
// pages:     page composers behind the route gate
pub mod pages;
pub mod protected;
pub mod public;
