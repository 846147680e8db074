//! Guard Middleware
//!
//! Tower layers applying the block check and the rate limits to Axum routes.
//! `GuardLayer` composes both so the block check always runs before any
//! rate limit counter is touched.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;
use futures::future::BoxFuture;
use tower::{Layer, Service};

use super::error::GuardError;
use super::extractors::extract_client_ip;
use super::limiter::{RateLimiter, RatePolicy};
use super::registry::BlockRegistry;

// Block check
//*************

/// Rejects requests from blocked addresses with 403
#[derive(Clone, Debug)]
pub struct BlockLayer {
	registry: Arc<BlockRegistry>,
}

impl BlockLayer {
	pub fn new(registry: Arc<BlockRegistry>) -> Self {
		Self { registry }
	}
}

impl<S> Layer<S> for BlockLayer {
	type Service = BlockService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		BlockService { inner, registry: self.registry.clone() }
	}
}

#[derive(Clone, Debug)]
pub struct BlockService<S> {
	inner: S,
	registry: Arc<BlockRegistry>,
}

impl<S> Service<Request<Body>> for BlockService<S>
where
	S: Service<Request<Body>, Response = axum::response::Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let rejection = match extract_client_ip(&req) {
			None => Some(GuardError::InvalidAddress),
			Some(ip) if self.registry.is_blocked(ip) => Some(GuardError::Blocked),
			Some(_) => None,
		};
		let mut inner = self.inner.clone();

		Box::pin(async move {
			if let Some(error) = rejection {
				return Ok(error.into_response());
			}
			inner.call(req).await
		})
	}
}

// Rate limit
//************

/// Applies one rate limit policy
#[derive(Clone)]
pub struct RateLimitLayer {
	limiter: Arc<RateLimiter>,
	policy: Arc<RatePolicy>,
}

impl RateLimitLayer {
	pub(crate) fn new(limiter: Arc<RateLimiter>, policy: RatePolicy) -> Self {
		Self { limiter, policy: Arc::new(policy) }
	}
}

impl std::fmt::Debug for RateLimitLayer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RateLimitLayer").finish_non_exhaustive()
	}
}

impl<S> Layer<S> for RateLimitLayer {
	type Service = RateLimitService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RateLimitService { inner, limiter: self.limiter.clone(), policy: self.policy.clone() }
	}
}

#[derive(Clone)]
pub struct RateLimitService<S> {
	inner: S,
	limiter: Arc<RateLimiter>,
	policy: Arc<RatePolicy>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
	S: Service<Request<Body>, Response = axum::response::Response> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Response = S::Response;
	type Error = S::Error;
	type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		// Decide before entering the future so counting stays synchronous
		let decision = self.limiter.check(&self.policy, &req);
		let mut inner = self.inner.clone();

		Box::pin(async move {
			if let Err(error) = decision {
				return Ok(error.into_response());
			}
			inner.call(req).await
		})
	}
}

// Composition
//*************

/// Block check followed by a rate limit
#[derive(Clone, Debug)]
pub struct GuardLayer {
	block: BlockLayer,
	limit: RateLimitLayer,
}

impl GuardLayer {
	pub fn new(block: BlockLayer, limit: RateLimitLayer) -> Self {
		Self { block, limit }
	}
}

impl<S> Layer<S> for GuardLayer {
	type Service = BlockService<RateLimitService<S>>;

	fn layer(&self, inner: S) -> Self::Service {
		self.block.layer(self.limit.layer(inner))
	}
}

// vim: ts=4
