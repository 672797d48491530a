//! Per-collection session state.
//!
//! A [`SessionView`] holds one collection snapshot and the derived state of
//! its steps. The watcher and the drivers share it through a
//! [`SharedSession`]; the lock is never held across an await, so no
//! partially reconciled state is observable.

mod view;

pub use view::SessionView;

use std::sync::Arc;
use tokio::sync::Mutex;

/// A session view shared between the watcher and the drivers.
pub type SharedSession = Arc<Mutex<SessionView>>;

/// Wrap a view for sharing.
pub fn shared(view: SessionView) -> SharedSession {
    Arc::new(Mutex::new(view))
}
