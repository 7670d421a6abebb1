pub mod gate;
pub mod response;

pub use gate::{is_public_path, login_redirect, requires_session, route_gate};
pub use response::{Degradable, Degraded, Fallback, OrFallback};
