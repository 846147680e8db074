pub use crate::error::{Error, WdResult};
pub use crate::types::{ListPage, Timestamp, Tier};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
