pub use warden_types::prelude::*;

pub use crate::guard::{GuardConfig, GuardError};

// vim: ts=4
