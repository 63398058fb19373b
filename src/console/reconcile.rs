//! Snapshot reconciliation.
//!
//! Applies one [`MachineState`] to the view document: derived maps first, a
//! topology rebuild only if the lane count moved, then per-lane content,
//! badges, the maintenance sweep, the queue strip and the gantry indicator.

use tracing::debug;

use crate::models::{Lane, LaneIndex, MachineState};

use super::Session;
use super::document::{Document, Mark, NodeKey, Tone};
use super::queue;
use super::topology::{self, MOCK_ACTIVE_TEXT, MOCK_IDLE_TEXT};

/// Status substrings that mean a lane is mid-cycle.
pub const IN_PROGRESS_MARKERS: [&str; 3] = ["Đang chờ", "Đang phân loại", "Đang đi thẳng"];

pub const UNKNOWN_MAINTENANCE_ERROR: &str = "Lỗi không xác định.";

pub fn is_in_progress(status: &str) -> bool {
    IN_PROGRESS_MARKERS.iter().any(|marker| status.contains(marker))
}

/// Rebuild derived maps and, when the lane count changed, the topology.
///
/// Returns whether structure was regenerated.
pub fn sync_topology(session: &mut Session, document: &mut Document, lanes: &[Lane]) -> bool {
    session.lanes = LaneIndex::from_lanes(lanes);
    if !topology::needs_rebuild(session.rendered_lane_count, lanes) {
        return false;
    }
    debug!(
        from = session.rendered_lane_count,
        to = lanes.len(),
        "lane count changed, rebuilding topology"
    );
    topology::rebuild(document, lanes);
    session.rendered_lane_count = lanes.len();
    true
}

/// Apply a full snapshot. Returns whether structure was regenerated.
pub fn reconcile(session: &mut Session, document: &mut Document, state: &MachineState) -> bool {
    apply_gantry(document, state);

    let rebuilt = sync_topology(session, document, &state.lanes);
    for (i, lane) in state.lanes.iter().enumerate() {
        apply_lane(document, i, lane);
    }

    document.set_hidden(NodeKey::MockBadge, !state.is_mock);
    document.set_hidden(NodeKey::MaintenanceBadge, !state.maintenance_mode);
    document.set_hidden(NodeKey::MockControls, !state.is_mock);

    apply_maintenance(document, state.maintenance_mode, state.last_error.as_deref());
    queue::render_queue(document, &session.lanes, &state.queue_indices);
    rebuilt
}

fn set_sensor_light(document: &mut Document, key: NodeKey, active: bool) {
    document.toggle(key, Mark::SensorActive, active);
    document.toggle(key, Mark::SensorInactive, !active);
}

pub fn apply_lane(document: &mut Document, i: usize, lane: &Lane) {
    let sorting = lane.is_sorting();
    let active = lane.sensor_active();

    // Home page
    document.set_text(NodeKey::LaneCount(i), lane.count.to_string());
    set_sensor_light(document, NodeKey::LaneSensor(i), active);

    for (key, engaged) in [
        (NodeKey::LaneGrab(i), lane.grab_engaged()),
        (NodeKey::LanePush(i), lane.push_engaged()),
    ] {
        document.toggle(key, Mark::RelayActive, sorting && engaged);
        document.toggle(key, Mark::RelayInactive, sorting && !engaged);
    }

    let status = NodeKey::LaneStatus(i);
    let busy = is_in_progress(&lane.status);
    document.set_text(status, lane.status.clone());
    document.toggle(status, Mark::StatusPulse, busy);
    document.toggle(status, Mark::StatusSorting, busy && sorting);
    document.toggle(status, Mark::StatusPassThrough, busy && !sorting);
    document.toggle(status, Mark::StatusIdle, !busy);

    // Test page
    set_sensor_light(document, NodeKey::TestSensor(i), active);

    // Mock panel; lanes without a sensor have no status line
    let mock_status = NodeKey::MockStatus(i);
    if document.contains(mock_status) {
        document.set_text(
            mock_status,
            if active { MOCK_ACTIVE_TEXT } else { MOCK_IDLE_TEXT },
        );
        document.set_tone(mock_status, if active { Tone::Red } else { Tone::Green });
        document.set_disabled(NodeKey::MockActiveButton(i), active);
        document.set_disabled(NodeKey::MockIdleButton(i), !active);
    }
}

/// Maintenance lockout.
///
/// Entering disables every control that is not exempt. Leaving re-enables
/// every control, including ones disabled for other reasons.
pub fn apply_maintenance(document: &mut Document, maintenance_mode: bool, last_error: Option<&str>) {
    if maintenance_mode {
        document.set_text(
            NodeKey::MaintenanceError,
            last_error.unwrap_or(UNKNOWN_MAINTENANCE_ERROR),
        );
        document.set_hidden(NodeKey::MaintenanceBanner, false);
        for control in document.controls_mut() {
            if !control.maintenance_exempt {
                control.disabled = true;
                control.set_mark(Mark::Locked, true);
            }
        }
    } else {
        document.set_hidden(NodeKey::MaintenanceBanner, true);
        for control in document.controls_mut() {
            control.disabled = false;
            control.set_mark(Mark::Locked, false);
        }
    }
}

pub fn apply_gantry(document: &mut Document, state: &MachineState) {
    if !state.gantry_enabled() {
        document.set_hidden(NodeKey::GantryHome, true);
        document.set_hidden(NodeKey::GantryTest, true);
        return;
    }

    document.set_hidden(NodeKey::GantryHome, false);
    document.set_hidden(NodeKey::GantryTest, false);

    let active = state.gantry_active();
    document.set_text(NodeKey::GantryText, if active { "KÍCH HOẠT" } else { "Chờ" });
    document.set_tone(NodeKey::GantryText, if active { Tone::Yellow } else { Tone::Gray });
    set_sensor_light(document, NodeKey::GantryLightHome, active);
    set_sensor_light(document, NodeKey::GantryLightTest, active);
}
