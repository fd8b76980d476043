pub mod password;
pub mod session;

pub use password::credential_matches;
pub use session::{SessionClaims, SessionService};
