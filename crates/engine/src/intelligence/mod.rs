//! Business intelligence derived from a tenant's live data.
//!
//! [`BusinessMetrics`] is gathered once per request; the snapshot text, the
//! proactive alerts, and the morning briefing are pure functions of it.

pub mod alerts;
pub mod briefing;
pub mod metrics;
pub mod snapshot;

pub use alerts::{Alert, AlertKind, compute_alerts, dedup_by_kind};
pub use briefing::{BRIEFING_FALLBACK, morning_briefing, morning_briefing_text};
pub use metrics::{BusinessMetrics, OrderWindows};
pub use snapshot::{SNAPSHOT_FALLBACK, build_snapshot, render_snapshot};
