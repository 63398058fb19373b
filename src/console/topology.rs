//! Lane topology rendering.
//!
//! [`plan`] turns a lane list into fragment descriptors for the four per-lane
//! views; [`rebuild`] clears those containers and mounts a fresh plan. Nothing
//! here reads live readings beyond the lane's static shape (pins, name).

use crate::models::{Lane, READY_STATUS};

use super::document::{ContainerKind, Document, Fragment, Mark, NodeKey, NodeKind, Tone};

/// Widest grid used by the test and mock views.
pub const MAX_GRID_COLUMNS: usize = 3;

pub const PASS_THROUGH_LABEL: &str = "Lane đi thẳng";
pub const NO_SENSOR_LABEL: &str = "Lane này không có Sensor để mô phỏng.";
pub const MOCK_IDLE_TEXT: &str = "KHÔNG KÍCH HOẠT (HIGH)";
pub const MOCK_ACTIVE_TEXT: &str = "ĐANG KÍCH HOẠT (LOW)";

/// Fragments for every per-lane view, in lane order.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyPlan {
    pub columns: usize,
    pub status_cards: Vec<Fragment>,
    pub sensor_cells: Vec<Fragment>,
    pub relay_cells: Vec<Fragment>,
    pub mock_cells: Vec<Fragment>,
}

pub fn grid_columns(lane_count: usize) -> usize {
    lane_count.min(MAX_GRID_COLUMNS)
}

/// Structural regeneration is needed exactly when the lane count moved.
pub fn needs_rebuild(rendered_lane_count: usize, lanes: &[Lane]) -> bool {
    lanes.len() != rendered_lane_count
}

pub fn plan(lanes: &[Lane]) -> TopologyPlan {
    TopologyPlan {
        columns: grid_columns(lanes.len()),
        status_cards: lanes
            .iter()
            .enumerate()
            .map(|(i, lane)| status_card(i, lane))
            .collect(),
        sensor_cells: lanes
            .iter()
            .enumerate()
            .map(|(i, lane)| sensor_cell(i, lane))
            .collect(),
        relay_cells: lanes
            .iter()
            .enumerate()
            .map(|(i, lane)| relay_cell(i, lane))
            .collect(),
        mock_cells: lanes
            .iter()
            .enumerate()
            .map(|(i, lane)| mock_cell(i, lane))
            .collect(),
    }
}

/// Replace the contents of all four lane containers with a fresh plan.
pub fn rebuild(document: &mut Document, lanes: &[Lane]) {
    let plan = plan(lanes);
    for kind in ContainerKind::TOPOLOGY {
        document.clear_container(kind);
    }
    // status cards keep their own responsive layout
    document.set_columns(ContainerKind::SensorTest, plan.columns);
    document.set_columns(ContainerKind::RelayTest, plan.columns);
    document.set_columns(ContainerKind::MockLanes, plan.columns);

    document.mount(ContainerKind::LaneStatus, plan.status_cards);
    document.mount(ContainerKind::SensorTest, plan.sensor_cells);
    document.mount(ContainerKind::RelayTest, plan.relay_cells);
    document.mount(ContainerKind::MockLanes, plan.mock_cells);
}

fn relay_light(key: NodeKey, caption: &str, sorting: bool) -> Fragment {
    let mark = if sorting {
        Mark::RelayInactive
    } else {
        Mark::RelayDisabled
    };
    Fragment::new(key, NodeKind::Indicator).text(caption).mark(mark)
}

pub fn status_card(i: usize, lane: &Lane) -> Fragment {
    let sorting = lane.is_sorting();
    let has_sensor = lane.has_sensor();

    let sensor = Fragment::new(NodeKey::LaneSensor(i), NodeKind::Indicator)
        .text("Cảm biến")
        .mark_if(Mark::SensorInactive, has_sensor)
        .mark_if(Mark::Dimmed, !has_sensor);

    Fragment::new(NodeKey::LaneCard(i), NodeKind::Panel)
        .child(Fragment::new(NodeKey::LaneName(i), NodeKind::Label).text(lane.name.clone()))
        .child(
            Fragment::new(NodeKey::LaneStatus(i), NodeKind::Badge)
                .text(READY_STATUS)
                .mark(Mark::StatusIdle),
        )
        .child(Fragment::new(NodeKey::LaneCount(i), NodeKind::Label).text("0"))
        .child(sensor)
        .child(relay_light(NodeKey::LaneGrab(i), "Relay Thu", sorting))
        .child(relay_light(NodeKey::LanePush(i), "Relay Đẩy", sorting))
}

pub fn sensor_cell(i: usize, lane: &Lane) -> Fragment {
    let has_sensor = lane.has_sensor();
    Fragment::new(NodeKey::SensorCell(i), NodeKind::Panel)
        .mark_if(Mark::Dimmed, !has_sensor)
        .child(Fragment::new(NodeKey::SensorCellLabel(i), NodeKind::Label).text(lane.name.clone()))
        .child(
            Fragment::new(NodeKey::TestSensor(i), NodeKind::Indicator)
                .mark_if(Mark::SensorInactive, has_sensor)
                .mark_if(Mark::Dimmed, !has_sensor),
        )
}

pub fn relay_cell(i: usize, lane: &Lane) -> Fragment {
    let cell = Fragment::new(NodeKey::RelayCell(i), NodeKind::Panel)
        .child(Fragment::new(NodeKey::RelayCellLabel(i), NodeKind::Label).text(lane.name.clone()));

    if lane.is_sorting() {
        cell.child(Fragment::new(NodeKey::RelayGrabButton(i), NodeKind::Button).text("Thu"))
            .child(Fragment::new(NodeKey::RelayPushButton(i), NodeKind::Button).text("Đẩy"))
    } else {
        cell.mark(Mark::Dimmed).child(
            Fragment::new(NodeKey::RelayPlaceholder(i), NodeKind::Placeholder)
                .text(PASS_THROUGH_LABEL),
        )
    }
}

pub fn mock_cell(i: usize, lane: &Lane) -> Fragment {
    let cell = Fragment::new(NodeKey::MockCell(i), NodeKind::Panel)
        .child(Fragment::new(NodeKey::MockCellLabel(i), NodeKind::Label).text(lane.name.clone()));

    match lane.sensor_pin {
        Some(pin) => cell
            .child(
                Fragment::new(NodeKey::MockPin(i), NodeKind::Label)
                    .text(format!("Sensor pin: {}", pin)),
            )
            .child(
                Fragment::new(NodeKey::MockStatus(i), NodeKind::Label)
                    .text(MOCK_IDLE_TEXT)
                    .tone(Tone::Green),
            )
            .child(
                Fragment::new(NodeKey::MockActiveButton(i), NodeKind::Button)
                    .text("Giả lập phát hiện"),
            )
            .child(
                Fragment::new(NodeKey::MockIdleButton(i), NodeKind::Button)
                    .text("Trở về bình thường"),
            ),
        None => cell.mark(Mark::Dimmed).child(
            Fragment::new(NodeKey::MockPlaceholder(i), NodeKind::Placeholder).text(NO_SENSOR_LABEL),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LaneConfig;

    fn lanes() -> Vec<Lane> {
        vec![
            LaneConfig {
                id: Some("SP001".into()),
                name: Some("A".into()),
                sensor_pin: Some(5),
                push_pin: Some(11),
                pull_pin: Some(12),
            }
            .to_lane(0),
            LaneConfig {
                id: Some("NG".into()),
                name: Some("Pass".into()),
                sensor_pin: None,
                push_pin: None,
                pull_pin: None,
            }
            .to_lane(1),
        ]
    }

    #[test]
    fn test_plan_shapes_per_lane_kind() {
        let plan = plan(&lanes());
        assert_eq!(plan.columns, 2);
        assert_eq!(plan.status_cards.len(), 2);

        let relay_keys: Vec<NodeKey> = plan.relay_cells[0].children.iter().map(|c| c.key).collect();
        assert!(relay_keys.contains(&NodeKey::RelayGrabButton(0)));
        assert!(relay_keys.contains(&NodeKey::RelayPushButton(0)));

        let pass = &plan.relay_cells[1];
        assert!(pass.marks.contains(&Mark::Dimmed));
        assert_eq!(pass.children[1].text, PASS_THROUGH_LABEL);

        let mock = &plan.mock_cells[1];
        assert_eq!(mock.children[1].key, NodeKey::MockPlaceholder(1));
        assert_eq!(mock.children[1].text, NO_SENSOR_LABEL);
    }

    #[test]
    fn test_grid_columns_cap_at_three() {
        assert_eq!(grid_columns(0), 0);
        assert_eq!(grid_columns(2), 2);
        assert_eq!(grid_columns(7), 3);
    }

    #[test]
    fn test_rebuild_mounts_all_views() {
        let mut doc = Document::new();
        rebuild(&mut doc, &lanes());

        assert_eq!(doc.container(ContainerKind::LaneStatus).children.len(), 2);
        assert_eq!(doc.container(ContainerKind::MockLanes).columns, 2);
        assert!(doc.has_mark(NodeKey::LaneGrab(1), Mark::RelayDisabled));
        assert!(!doc.has_mark(NodeKey::LaneGrab(1), Mark::RelayInactive));
        assert!(doc.has_mark(NodeKey::LaneSensor(1), Mark::Dimmed));
        assert!(!doc.has_mark(NodeKey::LaneSensor(1), Mark::SensorInactive));
        assert!(doc.has_mark(NodeKey::TestSensor(0), Mark::SensorInactive));
        assert!(!doc.has_mark(NodeKey::TestSensor(1), Mark::SensorInactive));
        assert!(doc.has_mark(NodeKey::TestSensor(1), Mark::Dimmed));
        assert_eq!(doc.text(NodeKey::MockStatus(0)), Some(MOCK_IDLE_TEXT));
        assert_eq!(doc.text(NodeKey::MockPin(0)), Some("Sensor pin: 5"));
        assert!(!doc.contains(NodeKey::MockStatus(1)));

        rebuild(&mut doc, &lanes()[..1]);
        assert!(!doc.contains(NodeKey::LaneCard(1)));
        assert!(!doc.contains(NodeKey::RelayPlaceholder(1)));
        assert_eq!(doc.container(ContainerKind::SensorTest).columns, 1);
    }
}
