//! Block Registry
//!
//! In-memory projection of the currently blocked addresses, backed by the
//! store. Lookups never touch the store: readers take a read lock only long
//! enough to probe a hash map, writers build a new map and swap it in.
//!
//! The projection is reconciled with the store by a periodic refresh and
//! time-bounded blocks are deactivated by a periodic sweep. Both loops are
//! owned by the registry (`start` / `stop`).
//!
//! # Refresh consistency
//!
//! While a refresh query is in flight every cache mutation is also written
//! to a journal. The refresh replays the journal on top of the query result
//! before swapping, so a block issued after the query started is never
//! dropped by the swap.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use warden_types::notify_adapter::{Notification, Severity};
use warden_types::store_adapter::{BlockedAddress, StoreAdapter, UpsertBlockedAddress};
use warden_types::types::now;

use super::config::GuardConfig;
use super::extractors::canonical_ip;
use super::middleware::BlockLayer;
use super::with_timeout;
use crate::notifier::Notifier;
use crate::prelude::*;

/// Shortest period accepted for the background loops
const MIN_LOOP_PERIOD: Duration = Duration::from_millis(10);

/// Immutable snapshot of the blocked set
#[derive(Debug, Default)]
struct Projection {
	/// Blocked address -> expiry (None = indefinite)
	entries: HashMap<IpAddr, Option<Timestamp>>,
	synced_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy)]
enum CacheChange {
	Insert(IpAddr, Option<Timestamp>),
	Remove(IpAddr),
}

impl CacheChange {
	fn apply_to(self, entries: &mut HashMap<IpAddr, Option<Timestamp>>) -> bool {
		match self {
			CacheChange::Insert(ip, expires_at) => {
				entries.insert(ip, expires_at);
				true
			}
			CacheChange::Remove(ip) => entries.remove(&ip).is_some(),
		}
	}
}

#[derive(Debug, Default)]
struct WriterState {
	refreshes_in_flight: u32,
	journal: Vec<CacheChange>,
}

/// Marks a refresh as in flight until dropped, also when the refresh future is cancelled
struct RefreshInFlight<'a>(&'a Mutex<WriterState>);

impl<'a> RefreshInFlight<'a> {
	fn enter(writer: &'a Mutex<WriterState>) -> Self {
		writer.lock().refreshes_in_flight += 1;
		Self(writer)
	}
}

impl Drop for RefreshInFlight<'_> {
	fn drop(&mut self) {
		let mut writer = self.0.lock();
		writer.refreshes_in_flight = writer.refreshes_in_flight.saturating_sub(1);
		if writer.refreshes_in_flight == 0 {
			writer.journal.clear();
		}
	}
}

pub struct BlockRegistry {
	store: Arc<dyn StoreAdapter>,
	notifier: Notifier,
	refresh_interval: Duration,
	sweep_interval: Duration,
	store_timeout: Duration,
	list_max_page_size: u32,
	cache: RwLock<Arc<Projection>>,
	/// Serializes cache mutations and holds the refresh journal
	writer: Mutex<WriterState>,
	/// Store writes of deferred blocks not yet known to be finished
	deferred: Mutex<HashMap<IpAddr, Vec<JoinHandle<()>>>>,
	tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BlockRegistry {
	pub fn new(config: &GuardConfig, store: Arc<dyn StoreAdapter>, notifier: Notifier) -> Self {
		Self {
			store,
			notifier,
			refresh_interval: config.refresh_interval.max(MIN_LOOP_PERIOD),
			sweep_interval: config.sweep_interval.max(MIN_LOOP_PERIOD),
			store_timeout: config.store_timeout,
			list_max_page_size: config.list_max_page_size.max(1),
			cache: RwLock::new(Arc::new(Projection::default())),
			writer: Mutex::new(WriterState::default()),
			deferred: Mutex::new(HashMap::new()),
			tasks: Mutex::new(Vec::new()),
		}
	}

	// Hot path
	//**********

	/// Membership test against the in-memory projection only
	pub fn is_blocked(&self, ip: IpAddr) -> bool {
		let ip = canonical_ip(ip);
		let cache = self.cache.read();
		cache.entries.get(&ip).is_some_and(|expires_at| expires_at.is_none_or(|exp| exp > now()))
	}

	pub fn cached_count(&self) -> usize {
		self.cache.read().entries.len()
	}

	/// Time of the last successful refresh, None until the first one completes
	pub fn last_synced_at(&self) -> Option<Timestamp> {
		self.cache.read().synced_at
	}

	/// Request pipeline stage rejecting blocked callers
	pub fn middleware(self: &Arc<Self>) -> BlockLayer {
		BlockLayer::new(Arc::clone(self))
	}

	// Mutations
	//***********

	/// Block an address, waiting for the store write
	///
	/// Re-blocking an already blocked address refreshes its reason, actor and expiry.
	pub async fn block(
		&self,
		ip: IpAddr,
		actor: &str,
		reason: Option<&str>,
		expires_at: Option<Timestamp>,
	) -> WdResult<BlockedAddress> {
		let ip = canonical_ip(ip);
		if expires_at.is_some_and(|exp| exp <= now()) {
			return Err(Error::ValidationError("expiry must be in the future".into()));
		}

		let record = self.persist_block(ip, actor, reason, expires_at).await?;
		self.apply(CacheChange::Insert(ip, expires_at));
		Ok(record)
	}

	/// Block an address without waiting for the store
	///
	/// The projection is updated before returning; persistence and the
	/// notification run on a background task. Used by automatic escalation so
	/// the request being rejected never waits on the store. A later `unblock`
	/// of the address waits for the pending write before deactivating.
	pub fn block_deferred(
		self: &Arc<Self>,
		ip: IpAddr,
		actor: &str,
		reason: &str,
		expires_at: Option<Timestamp>,
	) {
		let ip = canonical_ip(ip);
		self.apply(CacheChange::Insert(ip, expires_at));

		let Ok(handle) = tokio::runtime::Handle::try_current() else {
			warn!(address = %ip, "No async runtime, block kept in memory only");
			return;
		};

		let registry = Arc::clone(self);
		let actor: Box<str> = actor.into();
		let reason: Box<str> = reason.into();
		let task = handle.spawn(async move {
			if let Err(err) = registry.persist_block(ip, &actor, Some(&reason), expires_at).await {
				error!(address = %ip, error = %err, "Failed to persist block");
			}
		});

		let mut deferred = self.deferred.lock();
		deferred.retain(|_, tasks| {
			tasks.retain(|pending| !pending.is_finished());
			!tasks.is_empty()
		});
		deferred.entry(ip).or_default().push(task);
	}

	/// Wait for deferred store writes of an address to land
	async fn settle_deferred(&self, ip: IpAddr) {
		let pending = self.deferred.lock().remove(&ip).unwrap_or_default();
		for task in pending {
			if let Err(err) = task.await {
				warn!(address = %ip, error = %err, "Deferred block write did not complete");
			}
		}
	}

	/// Unblock an address. Returns false when it was not blocked.
	pub async fn unblock(&self, ip: IpAddr) -> WdResult<bool> {
		let ip = canonical_ip(ip);
		self.settle_deferred(ip).await;

		let address = ip.to_string();
		let deactivated =
			with_timeout(self.store_timeout, self.store.deactivate_blocked_address(&address)).await?;
		let was_cached = self.apply(CacheChange::Remove(ip));

		if deactivated || was_cached {
			info!(address = %address, "Address unblocked");
			self.notifier.dispatch(
				Notification::new(
					"IP Address Unblocked",
					format!("{} has been unblocked", address),
					Severity::Success,
				)
				.field("Address", address),
			);
			Ok(true)
		} else {
			debug!(address = %address, "Unblock of an address that was not blocked");
			Ok(false)
		}
	}

	async fn persist_block(
		&self,
		ip: IpAddr,
		actor: &str,
		reason: Option<&str>,
		expires_at: Option<Timestamp>,
	) -> WdResult<BlockedAddress> {
		let address = ip.to_string();
		let opts = UpsertBlockedAddress {
			address: &address,
			reason,
			blocked_by: actor,
			expires_at,
			now: now(),
		};
		let record =
			with_timeout(self.store_timeout, self.store.upsert_blocked_address(&opts)).await?;

		info!(address = %address, actor = %actor, expires_at = ?expires_at, "Address blocked");
		self.notifier.dispatch(block_notification(&record));
		Ok(record)
	}

	/// Copy-on-write update of the projection. Returns whether the set changed.
	fn apply(&self, change: CacheChange) -> bool {
		let mut writer = self.writer.lock();
		let current = Arc::clone(&self.cache.read());

		let mut entries = current.entries.clone();
		let changed = change.apply_to(&mut entries);
		if writer.refreshes_in_flight > 0 {
			writer.journal.push(change);
		}

		*self.cache.write() = Arc::new(Projection { entries, synced_at: current.synced_at });
		changed
	}

	// Reconciliation
	//****************

	/// Replace the projection with the active, non-expired records of the store
	///
	/// On failure the current projection is kept unchanged.
	pub async fn refresh(&self) -> WdResult<usize> {
		let in_flight = RefreshInFlight::enter(&self.writer);
		let as_of = now();

		let records =
			match with_timeout(self.store_timeout, self.store.find_active_blocked_addresses(as_of))
				.await
			{
				Ok(records) => records,
				Err(err) => {
					warn!(error = %err, "Block cache refresh failed, keeping stale cache");
					return Err(err);
				}
			};

		let mut entries = HashMap::with_capacity(records.len());
		for record in records {
			match record.address.parse::<IpAddr>() {
				Ok(ip) => {
					entries.insert(canonical_ip(ip), record.expires_at);
				}
				Err(_) => warn!(address = %record.address, "Skipping unparsable blocked address"),
			}
		}

		let count = {
			let writer = self.writer.lock();
			for change in &writer.journal {
				change.apply_to(&mut entries);
			}
			let count = entries.len();
			*self.cache.write() = Arc::new(Projection { entries, synced_at: Some(as_of) });
			count
		};
		drop(in_flight);

		debug!(count, "Block cache refreshed");
		Ok(count)
	}

	/// Unblock every active record whose expiry has passed
	pub async fn sweep_expired(&self) -> WdResult<usize> {
		let as_of = now();
		let expired = match with_timeout(
			self.store_timeout,
			self.store.find_expired_active_blocked_addresses(as_of),
		)
		.await
		{
			Ok(expired) => expired,
			Err(err) => {
				warn!(error = %err, "Expired block sweep failed");
				return Err(err);
			}
		};

		let mut swept = 0;
		for record in expired {
			let res = match record.address.parse::<IpAddr>() {
				Ok(ip) => self.unblock(ip).await,
				Err(_) => {
					with_timeout(
						self.store_timeout,
						self.store.deactivate_blocked_address(&record.address),
					)
					.await
				}
			};
			match res {
				Ok(true) => swept += 1,
				Ok(false) => {}
				Err(err) => {
					warn!(address = %record.address, error = %err, "Failed to unblock expired address");
				}
			}
		}

		if swept > 0 {
			info!(count = swept, "Expired blocks removed");
		}
		Ok(swept)
	}

	// Queries
	//*********

	/// Active blocks from the store, newest first. `page` is 1-based.
	pub async fn list_blocked(
		&self,
		page: u32,
		page_size: u32,
	) -> WdResult<ListPage<BlockedAddress>> {
		let page = page.max(1);
		let page_size = page_size.clamp(1, self.list_max_page_size);
		with_timeout(
			self.store_timeout,
			self.store.list_active_blocked_addresses_paged(page, page_size),
		)
		.await
	}

	/// Full record of an address, active or not
	pub async fn read(&self, ip: IpAddr) -> WdResult<Option<BlockedAddress>> {
		let address = canonical_ip(ip).to_string();
		with_timeout(self.store_timeout, self.store.read_blocked_address(&address)).await
	}

	// Lifecycle
	//***********

	/// Spawn the refresh and sweep loops. The first refresh runs immediately.
	pub fn start(self: &Arc<Self>) {
		let mut tasks = self.tasks.lock();
		if !tasks.is_empty() {
			debug!("Block registry loops already running");
			return;
		}

		let registry = Arc::clone(self);
		let refresh_interval = self.refresh_interval;
		tasks.push(tokio::spawn(async move {
			let mut interval = tokio::time::interval(refresh_interval);
			interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				interval.tick().await;
				// Failures are logged by refresh(), the next tick retries
				let _ = registry.refresh().await;
			}
		}));

		let registry = Arc::clone(self);
		let sweep_interval = self.sweep_interval;
		tasks.push(tokio::spawn(async move {
			let mut interval = tokio::time::interval(sweep_interval);
			interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				interval.tick().await;
				let _ = registry.sweep_expired().await;
			}
		}));

		info!(
			refresh_secs = refresh_interval.as_secs(),
			sweep_secs = sweep_interval.as_secs(),
			"Block registry started"
		);
	}

	/// Abort the background loops
	pub fn stop(&self) {
		let mut tasks = self.tasks.lock();
		for task in tasks.drain(..) {
			task.abort();
		}
	}

	pub fn is_running(&self) -> bool {
		!self.tasks.lock().is_empty()
	}
}

impl std::fmt::Debug for BlockRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BlockRegistry")
			.field("cached", &self.cached_count())
			.field("last_synced_at", &self.last_synced_at())
			.finish_non_exhaustive()
	}
}

fn block_notification(record: &BlockedAddress) -> Notification {
	let expires = record.expires_at.map_or_else(|| "Never".to_string(), Timestamp::to_iso_string);
	let mut notification = Notification::new(
		"IP Address Blocked",
		format!("{} has been blocked", record.address),
		Severity::Warning,
	)
	.field("Address", record.address.as_ref())
	.field("Blocked by", record.blocked_by.as_ref())
	.field("Expires", expires);
	if let Some(reason) = &record.reason {
		notification = notification.wide_field("Reason", reason.as_ref());
	}
	notification
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use std::net::Ipv4Addr;
	use std::sync::atomic::{AtomicBool, Ordering};
	use tokio::sync::Notify;

	use crate::memory_store::InMemoryStoreAdapter;
	use warden_types::types::SYSTEM_ACTOR;

	const IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100));

	/// Store that can be switched to fail every call, or to hold refresh
	/// queries after they took their snapshot until `release` is notified
	#[derive(Debug, Default)]
	struct FlakyStore {
		inner: InMemoryStoreAdapter,
		failing: AtomicBool,
		gated: AtomicBool,
		snapshot_taken: AtomicBool,
		release: Notify,
	}

	impl FlakyStore {
		fn check(&self) -> WdResult<()> {
			if self.failing.load(Ordering::SeqCst) { Err(Error::DbError) } else { Ok(()) }
		}
	}

	#[async_trait]
	impl StoreAdapter for FlakyStore {
		async fn upsert_blocked_address(
			&self,
			opts: &UpsertBlockedAddress<'_>,
		) -> WdResult<BlockedAddress> {
			self.check()?;
			self.inner.upsert_blocked_address(opts).await
		}
		async fn find_active_blocked_addresses(
			&self,
			as_of: Timestamp,
		) -> WdResult<Vec<BlockedAddress>> {
			self.check()?;
			let records = self.inner.find_active_blocked_addresses(as_of).await?;
			if self.gated.load(Ordering::SeqCst) {
				self.snapshot_taken.store(true, Ordering::SeqCst);
				self.release.notified().await;
			}
			Ok(records)
		}
		async fn find_expired_active_blocked_addresses(
			&self,
			as_of: Timestamp,
		) -> WdResult<Vec<BlockedAddress>> {
			self.check()?;
			self.inner.find_expired_active_blocked_addresses(as_of).await
		}
		async fn deactivate_blocked_address(&self, address: &str) -> WdResult<bool> {
			self.check()?;
			self.inner.deactivate_blocked_address(address).await
		}
		async fn read_blocked_address(&self, address: &str) -> WdResult<Option<BlockedAddress>> {
			self.check()?;
			self.inner.read_blocked_address(address).await
		}
		async fn list_active_blocked_addresses_paged(
			&self,
			page: u32,
			page_size: u32,
		) -> WdResult<ListPage<BlockedAddress>> {
			self.check()?;
			self.inner.list_active_blocked_addresses_paged(page, page_size).await
		}
		async fn insert_failed_attempt(&self, address: &str, at: Timestamp) -> WdResult<()> {
			self.check()?;
			self.inner.insert_failed_attempt(address, at).await
		}
		async fn count_failed_attempts(&self, address: &str, since: Timestamp) -> WdResult<u32> {
			self.check()?;
			self.inner.count_failed_attempts(address, since).await
		}
		async fn insert_rate_limit_violation(
			&self,
			address: &str,
			endpoint: &str,
			at: Timestamp,
		) -> WdResult<()> {
			self.check()?;
			self.inner.insert_rate_limit_violation(address, endpoint, at).await
		}
		async fn count_rate_limit_violations(
			&self,
			address: &str,
			since: Timestamp,
		) -> WdResult<u32> {
			self.check()?;
			self.inner.count_rate_limit_violations(address, since).await
		}
	}

	fn registry_with(store: Arc<dyn StoreAdapter>) -> Arc<BlockRegistry> {
		Arc::new(BlockRegistry::new(&GuardConfig::default(), store, Notifier::disabled()))
	}

	#[tokio::test]
	async fn test_block_is_visible_immediately() {
		let registry = registry_with(Arc::new(InMemoryStoreAdapter::new()));
		assert!(!registry.is_blocked(IP));

		registry.block(IP, "admin", Some("spam"), None).await.unwrap();
		assert!(registry.is_blocked(IP));
		assert_eq!(registry.last_synced_at(), None);
	}

	#[tokio::test]
	async fn test_reblock_overwrites_metadata() {
		let store = Arc::new(InMemoryStoreAdapter::new());
		let registry = registry_with(store.clone());
		let later = now().after(Duration::from_secs(3600));

		registry.block(IP, "alice", Some("first"), None).await.unwrap();
		registry.block(IP, "bob", Some("second"), Some(later)).await.unwrap();

		let page = registry.list_blocked(1, 10).await.unwrap();
		assert_eq!(page.total, 1);
		let record = &page.items[0];
		assert_eq!(record.reason.as_deref(), Some("second"));
		assert_eq!(record.blocked_by.as_ref(), "bob");
		assert_eq!(record.expires_at, Some(later));
	}

	#[tokio::test]
	async fn test_block_rejects_past_expiry() {
		let registry = registry_with(Arc::new(InMemoryStoreAdapter::new()));
		let res = registry.block(IP, "admin", None, Some(now().before(Duration::from_secs(1)))).await;
		assert!(matches!(res, Err(Error::ValidationError(_))));
		assert!(!registry.is_blocked(IP));
	}

	#[tokio::test]
	async fn test_unblock() {
		let store = Arc::new(InMemoryStoreAdapter::new());
		let registry = registry_with(store.clone());

		assert!(!registry.unblock(IP).await.unwrap());

		registry.block(IP, "admin", None, None).await.unwrap();
		assert!(registry.unblock(IP).await.unwrap());
		assert!(!registry.is_blocked(IP));

		let record = registry.read(IP).await.unwrap().unwrap();
		assert!(!record.is_active);
	}

	#[tokio::test]
	async fn test_refresh_loads_store_state() {
		let store = Arc::new(InMemoryStoreAdapter::new());
		let past = now().before(Duration::from_secs(10));
		for (addr, expires_at) in [("10.0.0.1", None), ("10.0.0.2", Some(past))] {
			store
				.upsert_blocked_address(&UpsertBlockedAddress {
					address: addr,
					reason: None,
					blocked_by: SYSTEM_ACTOR,
					expires_at,
					now: now(),
				})
				.await
				.unwrap();
		}

		let registry = registry_with(store);
		assert_eq!(registry.refresh().await.unwrap(), 1);
		assert!(registry.is_blocked("10.0.0.1".parse().unwrap()));
		assert!(!registry.is_blocked("10.0.0.2".parse().unwrap()));
		assert!(registry.last_synced_at().is_some());
	}

	#[tokio::test]
	async fn test_failed_refresh_keeps_stale_cache() {
		let store = Arc::new(FlakyStore::default());
		let registry = registry_with(store.clone());
		registry.block(IP, "admin", None, None).await.unwrap();
		registry.refresh().await.unwrap();

		store.failing.store(true, Ordering::SeqCst);
		assert!(registry.refresh().await.is_err());
		assert!(registry.is_blocked(IP));
		assert_eq!(registry.cached_count(), 1);
	}

	#[tokio::test]
	async fn test_block_during_refresh_is_kept() {
		let store = Arc::new(FlakyStore::default());
		store.gated.store(true, Ordering::SeqCst);
		let registry = registry_with(store.clone());

		let refreshing = tokio::spawn({
			let registry = Arc::clone(&registry);
			async move { registry.refresh().await }
		});
		while !store.snapshot_taken.load(Ordering::SeqCst) {
			tokio::task::yield_now().await;
		}

		// The snapshot predates this block
		registry.block(IP, "admin", None, None).await.unwrap();
		store.release.notify_one();

		assert_eq!(refreshing.await.unwrap().unwrap(), 1);
		assert!(registry.is_blocked(IP));
		assert!(registry.writer.lock().journal.is_empty());
	}

	#[tokio::test]
	async fn test_unblock_after_deferred_block_stays_unblocked() {
		let store = Arc::new(InMemoryStoreAdapter::new());
		let registry = registry_with(store.clone());

		registry.block_deferred(IP, SYSTEM_ACTOR, "automatic", None);
		assert!(registry.unblock(IP).await.unwrap());
		assert!(!registry.is_blocked(IP));

		for _ in 0..10 {
			tokio::task::yield_now().await;
		}
		let record = store.read_blocked_address("192.168.1.100").await.unwrap().unwrap();
		assert!(!record.is_active);

		registry.refresh().await.unwrap();
		assert!(!registry.is_blocked(IP));
	}

	#[tokio::test]
	async fn test_sweep_expired() {
		let store = Arc::new(InMemoryStoreAdapter::new());
		let registry = registry_with(store.clone());
		registry.block(IP, "admin", None, Some(now().after(Duration::from_secs(1)))).await.unwrap();

		// Not yet expired
		assert_eq!(registry.sweep_expired().await.unwrap(), 0);
		assert!(registry.is_blocked(IP));

		tokio::time::sleep(Duration::from_millis(2100)).await;
		assert_eq!(registry.sweep_expired().await.unwrap(), 1);
		assert!(!registry.is_blocked(IP));
		assert!(!registry.read(IP).await.unwrap().unwrap().is_active);
	}

	#[tokio::test]
	async fn test_background_sweep_deactivates_expired_block() {
		let config = GuardConfig { sweep_interval: Duration::from_millis(50), ..GuardConfig::default() };
		let store = Arc::new(InMemoryStoreAdapter::new());
		let registry = Arc::new(BlockRegistry::new(&config, store.clone(), Notifier::disabled()));
		registry.block(IP, "admin", None, Some(now().after(Duration::from_secs(1)))).await.unwrap();

		registry.start();
		let mut active = true;
		for _ in 0..100 {
			tokio::time::sleep(Duration::from_millis(50)).await;
			active = store.read_blocked_address("192.168.1.100").await.unwrap().unwrap().is_active;
			if !active {
				break;
			}
		}
		registry.stop();

		assert!(!active);
		assert!(!registry.is_blocked(IP));
		assert_eq!(registry.cached_count(), 0);
	}

	#[tokio::test]
	async fn test_block_deferred_persists_in_background() {
		let store = Arc::new(InMemoryStoreAdapter::new());
		let registry = registry_with(store.clone());

		registry.block_deferred(IP, SYSTEM_ACTOR, "automatic", None);
		assert!(registry.is_blocked(IP));

		let mut record = None;
		for _ in 0..100 {
			record = store.read_blocked_address("192.168.1.100").await.unwrap();
			if record.is_some() {
				break;
			}
			tokio::task::yield_now().await;
		}
		assert_eq!(record.unwrap().blocked_by.as_ref(), SYSTEM_ACTOR);
	}

	#[tokio::test]
	async fn test_list_clamps_page_size() {
		let registry = registry_with(Arc::new(InMemoryStoreAdapter::new()));
		let page = registry.list_blocked(0, 10_000).await.unwrap();
		assert_eq!(page.page, 1);
		assert_eq!(page.page_size, 100);
	}

	#[tokio::test]
	async fn test_start_and_stop() {
		let store = Arc::new(InMemoryStoreAdapter::new());
		store
			.upsert_blocked_address(&UpsertBlockedAddress {
				address: "192.168.1.100",
				reason: None,
				blocked_by: "admin",
				expires_at: None,
				now: now(),
			})
			.await
			.unwrap();
		let registry = registry_with(store);

		registry.start();
		assert!(registry.is_running());
		for _ in 0..100 {
			if registry.last_synced_at().is_some() {
				break;
			}
			tokio::task::yield_now().await;
		}
		assert!(registry.is_blocked(IP));

		registry.stop();
		assert!(!registry.is_running());
	}
}

// vim: ts=4
