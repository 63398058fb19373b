//! Retained view document.
//!
//! The console never draws directly. Every visual element lives here as a
//! keyed [`Node`]; the reconciler mutates text, marks and enabled state, and a
//! presentation adapter (the TUI) reads the document to draw a frame.
//!
//! Structure changes only through [`Document::mount`] and
//! [`Document::clear_container`]. Each mounted node receives a fresh
//! [`NodeId`], so a caller can tell a regenerated node from a surviving one.

use std::collections::{BTreeMap, BTreeSet};

/// Identity of a node instance. Never reused within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Stable address of a node, derived from its role and lane index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    // Lane status cards
    LaneCard(usize),
    LaneName(usize),
    LaneStatus(usize),
    LaneCount(usize),
    LaneSensor(usize),
    LaneGrab(usize),
    LanePush(usize),

    // Sensor test grid
    SensorCell(usize),
    SensorCellLabel(usize),
    TestSensor(usize),

    // Relay test grid
    RelayCell(usize),
    RelayCellLabel(usize),
    RelayGrabButton(usize),
    RelayPushButton(usize),
    RelayPlaceholder(usize),

    // Sensor mock grid
    MockCell(usize),
    MockCellLabel(usize),
    MockPin(usize),
    MockStatus(usize),
    MockActiveButton(usize),
    MockIdleButton(usize),
    MockPlaceholder(usize),

    // Queue strip
    QueueEmpty,
    QueueChip(usize),

    // Global chrome
    MockBadge,
    MaintenanceBadge,
    MaintenanceBanner,
    MaintenanceError,
    MockControls,
    GantryHome,
    GantryText,
    GantryLightHome,
    GantryTest,
    GantryLightTest,

    // Global controls
    ResetMaintenanceButton,
    ResetCountButton,
    TestAllRelaysButton,
    ToggleAutoTestButton,
    ResetQueueButton,
    ReloadConfigButton,
    SaveConfigButton,
}

impl NodeKey {
    /// Lane index carried by per-lane keys.
    pub fn lane_index(&self) -> Option<usize> {
        use NodeKey::*;
        match *self {
            LaneCard(i) | LaneName(i) | LaneStatus(i) | LaneCount(i) | LaneSensor(i)
            | LaneGrab(i) | LanePush(i) | SensorCell(i) | SensorCellLabel(i) | TestSensor(i)
            | RelayCell(i) | RelayCellLabel(i) | RelayGrabButton(i) | RelayPushButton(i)
            | RelayPlaceholder(i) | MockCell(i) | MockCellLabel(i) | MockPin(i)
            | MockStatus(i) | MockActiveButton(i) | MockIdleButton(i) | MockPlaceholder(i) => {
                Some(i)
            }
            _ => None,
        }
    }
}

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Groups children (lane card, grid cell)
    Panel,
    Label,
    Badge,
    Indicator,
    /// Interactive control; subject to the maintenance sweep
    Button,
    Placeholder,
    Chip,
    Banner,
}

/// Named colours. The presentation layer maps them to concrete styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tone {
    Gray,
    Green,
    Red,
    Yellow,
    Cyan,
    Indigo,
    Blue,
    Purple,
    Pink,
    StrongRed,
    StrongYellow,
}

/// Visual state flags, the document's equivalent of CSS classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mark {
    Hidden,
    Dimmed,
    /// Disabled by the maintenance sweep
    Locked,
    SensorActive,
    SensorInactive,
    RelayActive,
    RelayInactive,
    /// Lane has no actuator; relay lights never toggle
    RelayDisabled,
    StatusPulse,
    StatusSorting,
    StatusPassThrough,
    StatusIdle,
    QueueItem,
    Next,
}

/// Top-level containers whose children are regenerated as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerKind {
    LaneStatus,
    SensorTest,
    RelayTest,
    MockLanes,
    Queue,
}

impl ContainerKind {
    /// The four containers owned by the topology renderer.
    pub const TOPOLOGY: [ContainerKind; 4] = [
        ContainerKind::LaneStatus,
        ContainerKind::SensorTest,
        ContainerKind::RelayTest,
        ContainerKind::MockLanes,
    ];
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub key: NodeKey,
    pub kind: NodeKind,
    pub text: String,
    pub tone: Option<Tone>,
    pub marks: BTreeSet<Mark>,
    pub disabled: bool,
    /// Stays usable during a maintenance lockout
    pub maintenance_exempt: bool,
    pub children: Vec<NodeKey>,
}

impl Node {
    pub fn has(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    pub fn set_mark(&mut self, mark: Mark, on: bool) {
        if on {
            self.marks.insert(mark);
        } else {
            self.marks.remove(&mark);
        }
    }

    pub fn is_control(&self) -> bool {
        self.kind == NodeKind::Button
    }

    pub fn is_hidden(&self) -> bool {
        self.has(Mark::Hidden)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Container {
    /// Grid columns for the presentation layer (0 = layout default)
    pub columns: usize,
    pub children: Vec<NodeKey>,
}

/// Descriptor for a node to be mounted. Pure data; holds no identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub text: String,
    pub tone: Option<Tone>,
    pub marks: Vec<Mark>,
    pub disabled: bool,
    pub maintenance_exempt: bool,
    pub children: Vec<Fragment>,
}

impl Fragment {
    pub fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            text: String::new(),
            tone: None,
            marks: Vec::new(),
            disabled: false,
            maintenance_exempt: false,
            children: Vec::new(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Add `mark` only when `on` holds.
    pub fn mark_if(self, mark: Mark, on: bool) -> Self {
        if on { self.mark(mark) } else { self }
    }

    pub fn exempt(mut self) -> Self {
        self.maintenance_exempt = true;
        self
    }

    pub fn child(mut self, child: Fragment) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    next_id: u64,
    nodes: BTreeMap<NodeKey, Node>,
    containers: BTreeMap<ContainerKind, Container>,
    /// Keys of nodes that are not inside any container
    chrome: Vec<NodeKey>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding the static chrome: badges, banner, gantry
    /// indicators, queue placeholder and the global controls.
    pub fn new() -> Self {
        let mut doc = Self {
            next_id: 1,
            nodes: BTreeMap::new(),
            containers: BTreeMap::new(),
            chrome: Vec::new(),
        };
        for kind in ContainerKind::TOPOLOGY {
            doc.containers.insert(kind, Container::default());
        }
        doc.containers.insert(ContainerKind::Queue, Container::default());

        let chrome = [
            Fragment::new(NodeKey::MockBadge, NodeKind::Badge)
                .text("MOCK")
                .tone(Tone::Purple)
                .mark(Mark::Hidden),
            Fragment::new(NodeKey::MaintenanceBadge, NodeKind::Badge)
                .text("BẢO TRÌ")
                .tone(Tone::Red)
                .mark(Mark::Hidden),
            Fragment::new(NodeKey::MaintenanceBanner, NodeKind::Banner)
                .text("Hệ thống đang ở chế độ bảo trì")
                .tone(Tone::Red)
                .mark(Mark::Hidden)
                .child(Fragment::new(NodeKey::MaintenanceError, NodeKind::Label)),
            Fragment::new(NodeKey::MockControls, NodeKind::Panel).mark(Mark::Hidden),
            Fragment::new(NodeKey::GantryHome, NodeKind::Panel)
                .text("Sensor Gác Cổng")
                .mark(Mark::Hidden)
                .child(Fragment::new(NodeKey::GantryText, NodeKind::Label).text("Chờ"))
                .child(
                    Fragment::new(NodeKey::GantryLightHome, NodeKind::Indicator)
                        .mark(Mark::SensorInactive),
                ),
            Fragment::new(NodeKey::GantryTest, NodeKind::Panel)
                .text("Sensor Gác Cổng")
                .mark(Mark::Hidden)
                .child(
                    Fragment::new(NodeKey::GantryLightTest, NodeKind::Indicator)
                        .mark(Mark::SensorInactive),
                ),
            Fragment::new(NodeKey::ResetMaintenanceButton, NodeKind::Button)
                .text("Reset bảo trì")
                .exempt(),
            Fragment::new(NodeKey::ResetCountButton, NodeKind::Button).text("Reset đếm"),
            Fragment::new(NodeKey::TestAllRelaysButton, NodeKind::Button)
                .text("Test tuần tự"),
            Fragment::new(NodeKey::ToggleAutoTestButton, NodeKind::Button)
                .text("Bật Auto Test Sensor"),
            Fragment::new(NodeKey::ResetQueueButton, NodeKind::Button).text("Reset hàng chờ"),
            Fragment::new(NodeKey::ReloadConfigButton, NodeKind::Button).text("Tải lại cấu hình"),
            Fragment::new(NodeKey::SaveConfigButton, NodeKind::Button).text("Lưu cấu hình"),
        ];
        for fragment in chrome {
            let key = fragment.key;
            doc.insert_fragment(fragment);
            doc.chrome.push(key);
        }

        doc.mount(
            ContainerKind::Queue,
            vec![Fragment::new(NodeKey::QueueEmpty, NodeKind::Placeholder).text("Hàng chờ trống")],
        );
        doc
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(&key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(&key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    pub fn container(&self, kind: ContainerKind) -> &Container {
        // every kind is inserted in new(), so the map lookup cannot miss
        &self.containers[&kind]
    }

    pub fn set_columns(&mut self, kind: ContainerKind, columns: usize) {
        if let Some(container) = self.containers.get_mut(&kind) {
            container.columns = columns;
        }
    }

    /// Append fragments (and their subtrees) to a container.
    pub fn mount(&mut self, kind: ContainerKind, fragments: Vec<Fragment>) {
        for fragment in fragments {
            let key = fragment.key;
            self.insert_fragment(fragment);
            if let Some(container) = self.containers.get_mut(&kind) {
                container.children.push(key);
            }
        }
    }

    /// Remove every child of a container, including nested nodes.
    pub fn clear_container(&mut self, kind: ContainerKind) {
        let children = match self.containers.get_mut(&kind) {
            Some(container) => std::mem::take(&mut container.children),
            None => return,
        };
        for key in children {
            self.remove_subtree(key);
        }
    }

    /// Remove the container children whose top node satisfies `pred`.
    pub fn remove_children_where<F>(&mut self, kind: ContainerKind, pred: F)
    where
        F: Fn(&Node) -> bool,
    {
        let Some(container) = self.containers.get(&kind) else {
            return;
        };
        let doomed: Vec<NodeKey> = container
            .children
            .iter()
            .copied()
            .filter(|key| self.nodes.get(key).is_some_and(&pred))
            .collect();
        if let Some(container) = self.containers.get_mut(&kind) {
            container.children.retain(|key| !doomed.contains(key));
        }
        for key in doomed {
            self.remove_subtree(key);
        }
    }

    /// Identities of every node inside a container, in document order.
    pub fn subtree_ids(&self, kind: ContainerKind) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for key in &self.container(kind).children {
            self.collect_ids(*key, &mut ids);
        }
        ids
    }

    /// Nodes that are direct children of a container, in order.
    pub fn children(&self, kind: ContainerKind) -> impl Iterator<Item = &Node> {
        self.container(kind)
            .children
            .iter()
            .filter_map(|key| self.nodes.get(key))
    }

    pub fn controls(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|node| node.is_control())
    }

    pub fn controls_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut().filter(|node| node.is_control())
    }

    // Setters silently skip missing nodes: a lane without a sensor has no
    // mock status line, and the reconciler does not special-case that.

    pub fn set_text(&mut self, key: NodeKey, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&key) {
            node.text = text.into();
        }
    }

    pub fn set_tone(&mut self, key: NodeKey, tone: Tone) {
        if let Some(node) = self.nodes.get_mut(&key) {
            node.tone = Some(tone);
        }
    }

    pub fn toggle(&mut self, key: NodeKey, mark: Mark, on: bool) {
        if let Some(node) = self.nodes.get_mut(&key) {
            node.set_mark(mark, on);
        }
    }

    pub fn set_hidden(&mut self, key: NodeKey, hidden: bool) {
        self.toggle(key, Mark::Hidden, hidden);
    }

    pub fn set_disabled(&mut self, key: NodeKey, disabled: bool) {
        if let Some(node) = self.nodes.get_mut(&key) {
            node.disabled = disabled;
        }
    }

    pub fn has_mark(&self, key: NodeKey, mark: Mark) -> bool {
        self.nodes.get(&key).is_some_and(|node| node.has(mark))
    }

    pub fn text(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(&key).map(|node| node.text.as_str())
    }

    pub fn is_hidden(&self, key: NodeKey) -> bool {
        self.nodes.get(&key).map_or(true, Node::is_hidden)
    }

    /// A control exists and accepts input.
    pub fn is_enabled(&self, key: NodeKey) -> bool {
        self.nodes
            .get(&key)
            .is_some_and(|node| node.is_control() && !node.disabled)
    }

    fn insert_fragment(&mut self, fragment: Fragment) {
        let Fragment {
            key,
            kind,
            text,
            tone,
            marks,
            disabled,
            maintenance_exempt,
            children,
        } = fragment;

        let child_keys = children.iter().map(|child| child.key).collect();
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            key,
            Node {
                id,
                key,
                kind,
                text,
                tone,
                marks: marks.into_iter().collect(),
                disabled,
                maintenance_exempt,
                children: child_keys,
            },
        );
        for child in children {
            self.insert_fragment(child);
        }
    }

    fn remove_subtree(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.remove(&key) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    fn collect_ids(&self, key: NodeKey, ids: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(&key) {
            ids.push(node.id);
            for child in &node.children {
                self.collect_ids(*child, ids);
            }
        }
    }
}
