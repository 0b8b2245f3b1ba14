/* tests/holder_tests.rs */

#![cfg(feature = "holder")]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use livehold::holder::{Container, Decision, HoldError, Resource};

#[derive(Debug, Clone, PartialEq)]
struct ConnConfig {
	dsn: String,
	pool: usize,
}

#[derive(Debug)]
struct Conn {
	id: u64,
	dsn: String,
	pool: AtomicUsize,
	closed: AtomicBool,
	closes: Arc<AtomicUsize>,
}

impl Resource for Conn {
	type Error = std::io::Error;

	fn close(&self) -> Result<(), Self::Error> {
		if !self.closed.swap(true, Ordering::SeqCst) {
			self.closes.fetch_add(1, Ordering::SeqCst);
		}
		Ok(())
	}
}

#[derive(Clone)]
struct Harness {
	source: Arc<Mutex<ConnConfig>>,
	fail_fetch: Arc<AtomicBool>,
	fail_construct: Arc<AtomicBool>,
	constructed: Arc<AtomicU64>,
	closes: Arc<AtomicUsize>,
}

impl Harness {
	fn new() -> Self {
		Self {
			source: Arc::new(Mutex::new(ConnConfig {
				dsn: "db://primary".to_string(),
				pool: 4,
			})),
			fail_fetch: Arc::new(AtomicBool::new(false)),
			fail_construct: Arc::new(AtomicBool::new(false)),
			constructed: Arc::new(AtomicU64::new(0)),
			closes: Arc::new(AtomicUsize::new(0)),
		}
	}

	fn set(&self, dsn: &str, pool: usize) {
		*self.source.lock().unwrap() = ConnConfig {
			dsn: dsn.to_string(),
			pool,
		};
	}

	fn builder(&self) -> livehold::holder::ContainerBuilder<Conn, ConnConfig> {
		let source = self.source.clone();
		let fail_fetch = self.fail_fetch.clone();
		let fail_construct = self.fail_construct.clone();
		let constructed = self.constructed.clone();
		let closes = self.closes.clone();

		Container::builder()
			.name("conn")
			.fetch(move || {
				if fail_fetch.load(Ordering::SeqCst) {
					return Err("source unavailable");
				}
				Ok(source.lock().unwrap().clone())
			})
			.construct(move |config: &ConnConfig| {
				if fail_construct.load(Ordering::SeqCst) {
					return Err("connection refused");
				}
				let id = constructed.fetch_add(1, Ordering::SeqCst) + 1;
				Ok(Conn {
					id,
					dsn: config.dsn.clone(),
					pool: AtomicUsize::new(config.pool),
					closed: AtomicBool::new(false),
					closes: closes.clone(),
				})
			})
	}

	fn container(&self) -> Container<Conn, ConnConfig> {
		self.builder()
			.compare(|old: &ConnConfig, new: &ConnConfig| {
				Ok::<_, HoldError>(if old.dsn != new.dsn {
					Decision::NeedReplace
				} else if old.pool != new.pool {
					Decision::NeedReset
				} else {
					Decision::NoNeed
				})
			})
			.reset(|conn: &Conn, _old: &ConnConfig, new: &ConnConfig| {
				if new.pool == 0 {
					return Err("pool size must be positive");
				}
				conn.pool.store(new.pool, Ordering::SeqCst);
				Ok(())
			})
			.build()
			.expect("container builds")
	}
}

fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
	let deadline = Instant::now() + timeout;
	while Instant::now() < deadline {
		if cond() {
			return true;
		}
		thread::sleep(Duration::from_millis(5));
	}
	cond()
}

#[test]
fn build_fetches_and_constructs() {
	let h = Harness::new();
	let ct = h.container();

	assert_eq!(ct.name(), "conn");
	assert_eq!(ct.generation(), 1);
	assert_eq!(h.constructed.load(Ordering::SeqCst), 1);
	assert_eq!(ct.config().dsn, "db://primary");

	let conn = ct.checkout();
	assert_eq!(conn.id, 1);
	assert_eq!(conn.dsn, "db://primary");
	assert_eq!(ct.leases(), 1);
	ct.put_back(conn);
	assert_eq!(ct.leases(), 0);
}

#[test]
fn build_requires_fetch_and_construct() {
	let err = Container::<Conn, ConnConfig>::builder()
		.construct(|_: &ConnConfig| Err::<Conn, _>("unused"))
		.build()
		.unwrap_err();
	assert!(matches!(err, HoldError::MissingCallback("fetch")));

	let err = Container::<Conn, ConnConfig>::builder()
		.fetch(|| Err::<ConnConfig, _>("unused"))
		.build()
		.unwrap_err();
	assert!(matches!(err, HoldError::MissingCallback("construct")));
}

#[test]
fn build_fails_when_fetch_or_construct_fails() {
	let h = Harness::new();
	h.fail_fetch.store(true, Ordering::SeqCst);
	assert!(matches!(h.builder().build(), Err(HoldError::Fetch(_))));

	let h = Harness::new();
	h.fail_construct.store(true, Ordering::SeqCst);
	assert!(matches!(h.builder().build(), Err(HoldError::Construct(_))));
}

#[test]
fn no_need_keeps_identity_and_config() {
	let h = Harness::new();
	let ct = h.container();
	let before = ct.config();

	assert_eq!(ct.update().unwrap(), Decision::NoNeed);

	assert_eq!(ct.generation(), 1);
	assert_eq!(h.constructed.load(Ordering::SeqCst), 1);
	assert!(Arc::ptr_eq(&before, &ct.config()));
}

#[test]
fn reset_adjusts_in_place() {
	let h = Harness::new();
	let ct = h.container();
	h.set("db://primary", 16);

	assert_eq!(ct.update().unwrap(), Decision::NeedReset);

	assert_eq!(ct.generation(), 1);
	assert_eq!(h.constructed.load(Ordering::SeqCst), 1);
	assert_eq!(ct.config().pool, 16);
	assert_eq!(ct.checkout().pool.load(Ordering::SeqCst), 16);
}

#[test]
fn reset_failure_keeps_prior_config() {
	let h = Harness::new();
	let ct = h.container();
	h.set("db://primary", 0);

	assert!(matches!(ct.update(), Err(HoldError::Reset(_))));
	assert_eq!(ct.config().pool, 4);
	assert_eq!(ct.checkout().pool.load(Ordering::SeqCst), 4);
}

#[test]
fn reset_without_callback_is_an_error() {
	let h = Harness::new();
	let ct = h
		.builder()
		.compare(|_: &ConnConfig, _: &ConnConfig| Ok::<_, HoldError>(Decision::NeedReset))
		.build()
		.unwrap();

	assert!(matches!(ct.update(), Err(HoldError::MissingCallback("reset"))));
	assert_eq!(ct.config().pool, 4);
}

#[test]
fn update_without_compare_is_an_error() {
	let h = Harness::new();
	let ct = h.builder().build().unwrap();
	h.set("db://replica", 4);

	assert!(matches!(ct.update(), Err(HoldError::MissingCallback("compare"))));
	assert_eq!(ct.generation(), 1);
}

#[test]
fn fetch_failure_leaves_state_untouched() {
	let h = Harness::new();
	let ct = h.container();
	h.set("db://replica", 8);
	h.fail_fetch.store(true, Ordering::SeqCst);

	assert!(matches!(ct.update(), Err(HoldError::Fetch(_))));
	assert_eq!(ct.generation(), 1);
	assert_eq!(ct.config().dsn, "db://primary");
}

#[test]
fn compare_failure_leaves_state_untouched() {
	let h = Harness::new();
	let ct = h
		.builder()
		.compare(|_: &ConnConfig, _: &ConnConfig| Err::<Decision, _>("incomparable"))
		.build()
		.unwrap();
	h.set("db://replica", 8);

	assert!(matches!(ct.update(), Err(HoldError::Compare(_))));
	assert_eq!(ct.generation(), 1);
	assert_eq!(ct.config().dsn, "db://primary");
}

#[test]
fn replace_swaps_identity_and_drains_old_object() {
	let h = Harness::new();
	let ct = h.container();

	let old = ct.checkout();
	h.set("db://replica", 4);
	assert_eq!(ct.update().unwrap(), Decision::NeedReplace);

	assert_eq!(ct.generation(), 2);
	assert_eq!(h.constructed.load(Ordering::SeqCst), 2);

	let new = ct.checkout();
	assert_eq!(new.id, 2);
	assert_eq!(new.dsn, "db://replica");
	assert_eq!(new.config().dsn, "db://replica");

	// The pre-update lease still points at the old, open object.
	assert_eq!(old.id, 1);
	assert_eq!(old.generation(), 1);
	assert_eq!(old.config().dsn, "db://primary");
	thread::sleep(Duration::from_millis(50));
	assert!(!old.closed.load(Ordering::SeqCst));
	assert_eq!(h.closes.load(Ordering::SeqCst), 0);

	drop(old);
	assert!(wait_until(Duration::from_secs(2), || h.closes.load(Ordering::SeqCst) == 1));
	assert!(!new.closed.load(Ordering::SeqCst));
}

#[test]
fn replace_construct_failure_is_atomic() {
	let h = Harness::new();
	let ct = h.container();
	let before = ct.config();
	h.set("db://replica", 8);
	h.fail_construct.store(true, Ordering::SeqCst);

	assert!(matches!(ct.update(), Err(HoldError::Construct(_))));

	assert_eq!(ct.generation(), 1);
	assert!(Arc::ptr_eq(&before, &ct.config()));
	let conn = ct.checkout();
	assert_eq!(conn.id, 1);
	assert_eq!(conn.dsn, "db://primary");
	assert!(!conn.closed.load(Ordering::SeqCst));
}

#[test]
fn close_waits_for_every_lease() {
	let h = Harness::new();
	let ct = Arc::new(h.container());

	let leases: Vec<_> = (0..8).map(|_| ct.checkout()).collect();
	assert_eq!(ct.leases(), 8);

	let closer = {
		let ct = ct.clone();
		thread::spawn(move || ct.close())
	};

	thread::sleep(Duration::from_millis(50));
	assert!(!closer.is_finished());
	assert_eq!(h.closes.load(Ordering::SeqCst), 0);

	drop(leases);
	closer.join().unwrap().unwrap();

	assert_eq!(h.closes.load(Ordering::SeqCst), 1);
	assert!(ct.is_closed());
	assert!(matches!(ct.try_checkout(), Err(HoldError::Closed)));
}

#[test]
fn close_twice_and_update_after_close_fail() {
	let h = Harness::new();
	let ct = h.container();

	ct.close().unwrap();
	assert!(matches!(ct.close(), Err(HoldError::AlreadyClosed)));
	assert!(matches!(ct.update(), Err(HoldError::Closed)));
	assert_eq!(h.closes.load(Ordering::SeqCst), 1);
}

#[test]
#[should_panic(expected = "container is closed")]
fn checkout_after_close_panics() {
	let h = Harness::new();
	let ct = h.container();
	ct.close().unwrap();
	let _ = ct.checkout();
}

#[test]
fn checkouts_never_observe_a_closed_object_during_replacement() {
	let h = Harness::new();
	let ct = Arc::new(h.container());
	let stop = Arc::new(AtomicBool::new(false));

	let workers: Vec<_> = (0..4)
		.map(|_| {
			let ct = ct.clone();
			let stop = stop.clone();
			thread::spawn(move || {
				let mut seen = 0u64;
				while !stop.load(Ordering::SeqCst) {
					let conn = ct.checkout();
					assert!(!conn.closed.load(Ordering::SeqCst), "leased a closed object");
					assert_eq!(conn.generation(), conn.id);
					seen = seen.max(conn.id);
					thread::yield_now();
				}
				seen
			})
		})
		.collect();

	for round in 0..50 {
		h.set(&format!("db://node-{round}"), 4);
		assert_eq!(ct.update().unwrap(), Decision::NeedReplace);
	}
	stop.store(true, Ordering::SeqCst);

	for worker in workers {
		worker.join().expect("worker panicked");
	}

	assert_eq!(ct.generation(), 51);
	assert!(wait_until(Duration::from_secs(5), || h.closes.load(Ordering::SeqCst) == 50));
	ct.close().unwrap();
	assert_eq!(h.closes.load(Ordering::SeqCst), 51);
}
