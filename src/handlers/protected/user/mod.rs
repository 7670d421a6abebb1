// /api/user/* - the signed-in user's bookmarks
//
// These never answer with an error status. No session means an empty
// result; a failing store call means an empty result with `"error": true`.
pub mod my_reports;
pub mod my_trends;
pub mod subscribed;

pub use my_reports::my_reports;
pub use my_trends::my_trends;
pub use subscribed::{subscribed_domains, subscribed_reports, subscribed_trends};
