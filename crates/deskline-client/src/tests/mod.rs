//! Service tests against the in-memory backends.


use std::sync::Arc;

use crate::{ScheduleService, SessionManager, testutil::MemoryBackend};

/// A session manager whose auth and store sides share one backend.
fn manager(
  backend: &Arc<MemoryBackend>,
) -> SessionManager<MemoryBackend, MemoryBackend> {
  SessionManager::new(Arc::clone(backend), Arc::clone(backend))
}

fn service(
  backend: &Arc<MemoryBackend>,
) -> ScheduleService<MemoryBackend, MemoryBackend> {
  ScheduleService::new(Arc::new(manager(backend)), Arc::clone(backend))
}
