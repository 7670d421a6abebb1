pub mod auth;
pub mod login_page;
pub mod webhook;

pub use login_page::login_page;
pub use webhook::airtable_webhook;
