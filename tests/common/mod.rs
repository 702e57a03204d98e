//! Common test utilities

use std::sync::Arc;

use classgrid::api::memory::InMemoryApi;
use classgrid::assignments::AssignmentResolver;
use classgrid::notify::{AutoConfirm, NotificationLog};
use classgrid::timetable::{SchedulingEngine, TimeOfDay};

/// Parse a strict `HH:MM` literal
#[allow(dead_code)]
pub fn t(s: &str) -> TimeOfDay {
    TimeOfDay::parse(s).unwrap()
}

/// Engine wired to a demo backend and a recording notifier
#[allow(dead_code)]
pub struct Harness {
    pub api: Arc<InMemoryApi>,
    pub log: Arc<NotificationLog>,
    pub engine: SchedulingEngine,
}

#[allow(dead_code)]
impl Harness {
    pub async fn new() -> Self {
        Self::with_api(InMemoryApi::demo(), true).await
    }

    /// Harness whose confirmation prompts answer `confirm`
    pub async fn with_api(api: InMemoryApi, confirm: bool) -> Self {
        let api = Arc::new(api);
        let log = Arc::new(NotificationLog::new());
        let mut engine =
            SchedulingEngine::new(api.clone(), log.clone(), Arc::new(AutoConfirm(confirm)));
        engine.load().await.unwrap();
        log.drain();
        Self { api, log, engine }
    }
}

/// Resolver over a shared backend
#[allow(dead_code)]
pub fn resolver(
    api: &Arc<InMemoryApi>,
    log: &Arc<NotificationLog>,
    confirm: bool,
) -> AssignmentResolver {
    AssignmentResolver::new(api.clone(), log.clone(), Arc::new(AutoConfirm(confirm)))
}
