//! Shared harness wiring a real ledger to fake adapters

use chrono::{DateTime, TimeZone, Utc};
use ck_adapters::{FakeAdmin, FakeAnnouncer, FakeNotifier, TracedNotifier};
use ck_core::{Config, FakeClock, GameId, GameTest, MessageId, TestId};
use ck_engine::{ClaimCoordinator, LifecycleScheduler};
use ck_storage::Ledger;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub fn start_of_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

pub struct Harness {
    _dir: TempDir,
    pub ledger: Arc<Ledger>,
    pub game: GameId,
    pub notify: FakeNotifier,
    pub announce: FakeAnnouncer,
    pub admin: FakeAdmin,
    pub clock: FakeClock,
    next_message: AtomicU64,
}

impl Harness {
    pub fn with_codes(codes: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(Ledger::open(&dir.path().join("ledger.jsonl")).unwrap());
        let game = GameId::new("moss garden");
        ledger.create_game(&game).unwrap();
        let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        ledger.import_codes(&game, &codes).unwrap();
        Self {
            _dir: dir,
            ledger,
            game,
            notify: FakeNotifier::new(),
            announce: FakeAnnouncer::new(),
            admin: FakeAdmin::new(),
            clock: FakeClock::at(start_of_day()),
            next_message: AtomicU64::new(1),
        }
    }

    /// Coordinator delivering through a traced notifier, as production wires it
    pub fn coordinator(&self) -> Arc<ClaimCoordinator<TracedNotifier<FakeNotifier>, FakeAdmin>> {
        Arc::new(ClaimCoordinator::new(
            Arc::clone(&self.ledger),
            TracedNotifier::new(self.notify.clone()),
            self.admin.clone(),
        ))
    }

    pub fn scheduler(&self) -> LifecycleScheduler<FakeAnnouncer, FakeAdmin, FakeClock> {
        LifecycleScheduler::new(
            Arc::clone(&self.ledger),
            self.announce.clone(),
            self.admin.clone(),
            self.clock.clone(),
            Config::default(),
        )
    }

    pub fn create_test(&self, end: DateTime<Utc>) -> GameTest {
        let n = self.next_message.fetch_add(1, Ordering::SeqCst);
        self.ledger
            .create_test(TestId(format!("t-{n}")), &self.game, MessageId(n), end, None)
            .unwrap()
    }
}
