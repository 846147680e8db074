//! Tier resolution for the tiered rate limit guard.

use axum::body::Body;
use axum::http::{HeaderName, Request};

use crate::prelude::*;

/// Resolves the tier of a caller. `None` selects the default window.
pub trait TierResolver: Send + Sync {
	fn resolve(&self, req: &Request<Body>) -> Option<Tier>;
}

impl<F> TierResolver for F
where
	F: Fn(&Request<Body>) -> Option<Tier> + Send + Sync,
{
	fn resolve(&self, req: &Request<Body>) -> Option<Tier> {
		self(req)
	}
}

/// Reads a `Tier` inserted into the request extensions by an earlier layer
/// (typically authentication)
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionTier;

impl TierResolver for ExtensionTier {
	fn resolve(&self, req: &Request<Body>) -> Option<Tier> {
		req.extensions().get::<Tier>().copied()
	}
}

/// Reads the tier from a request header, for deployments where a trusted
/// gateway classifies callers. Unknown values select the default window.
#[derive(Debug, Clone)]
pub struct HeaderTier {
	header: HeaderName,
}

impl HeaderTier {
	pub fn new(header: HeaderName) -> Self {
		Self { header }
	}
}

impl TierResolver for HeaderTier {
	fn resolve(&self, req: &Request<Body>) -> Option<Tier> {
		let value = req.headers().get(&self.header)?.to_str().ok()?;
		match value.parse() {
			Ok(tier) => Some(tier),
			Err(_) => {
				debug!(value = %value, "Ignoring unknown tier header value");
				None
			}
		}
	}
}


// vim: ts=4
