//! Client Address Extraction
//!
//! Resolves the canonical client address used as cache and store key.

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Extract the canonical client address of a request
///
/// The first entry of `X-Forwarded-For` wins when it holds a valid address,
/// otherwise the peer address from `ConnectInfo` is used. Returns `None`
/// when neither is available.
pub fn extract_client_ip<B>(req: &Request<B>) -> Option<IpAddr> {
	extract_from_xff(req).or_else(|| extract_from_peer(req)).map(canonical_ip)
}

/// Extract IP from X-Forwarded-For header
fn extract_from_xff<B>(req: &Request<B>) -> Option<IpAddr> {
	req.headers()
		.get("x-forwarded-for")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| {
			// "client, proxy1, proxy2": the leftmost entry is the original client
			s.split(',').next().map(str::trim).and_then(|ip| ip.parse().ok())
		})
}

fn extract_from_peer<B>(req: &Request<B>) -> Option<IpAddr> {
	req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip())
}

/// IPv4-mapped IPv6 addresses are folded to plain IPv4 so both notations share one key
pub fn canonical_ip(ip: IpAddr) -> IpAddr {
	match ip {
		IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(IpAddr::V6(v6), IpAddr::V4),
		IpAddr::V4(_) => ip,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::net::Ipv4Addr;

	fn request() -> axum::http::request::Builder {
		Request::builder().uri("/")
	}

	#[test]
	fn test_first_forwarded_entry_wins() {
		let req = request()
			.header("x-forwarded-for", " 203.0.113.7 , 10.0.0.1, 10.0.0.2")
			.body(())
			.unwrap();
		assert_eq!(extract_client_ip(&req), Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))));
	}

	#[test]
	fn test_falls_back_to_peer_address() {
		let mut req = request().header("x-forwarded-for", "not-an-ip").body(()).unwrap();
		let peer: SocketAddr = "192.0.2.10:4711".parse().unwrap();
		req.extensions_mut().insert(ConnectInfo(peer));

		assert_eq!(extract_client_ip(&req), Some(peer.ip()));
	}

	#[test]
	fn test_no_address() {
		let req = request().body(()).unwrap();
		assert_eq!(extract_client_ip(&req), None);
	}

	#[test]
	fn test_ipv4_mapped_is_canonicalized() {
		let req = request().header("x-forwarded-for", "::ffff:198.51.100.1").body(()).unwrap();
		assert_eq!(extract_client_ip(&req), Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 1))));
	}
}

// vim: ts=4
