pub mod cookies;
pub mod flash;
pub mod guard;
pub mod handlers;
pub mod session;

pub use guard::require_login;
