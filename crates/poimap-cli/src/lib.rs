pub mod session;

pub use session::{DiscoverySession, SessionDefaults};
