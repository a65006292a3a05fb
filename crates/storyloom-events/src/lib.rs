use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use storyloom_core::{BranchId, NodeId, NodeType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    // Graph
    NodeCreated {
        id: NodeId,
        parent_id: NodeId,
        branch_id: BranchId,
        node_type: NodeType,
        x: f32,
        y: f32,
    },
    NodeUpdated {
        id: NodeId,
    },
    /// Every node removed by one cascading delete, descendants first.
    NodesDeleted {
        ids: Vec<NodeId>,
        stripped_branches: usize,
    },
    NodeMoved {
        id: NodeId,
        x: f32,
        y: f32,
    },
    SelectionChanged {
        id: Option<NodeId>,
    },

    // Sessions
    EditStarted {
        id: NodeId,
    },
    EditEnded {
        id: NodeId,
        committed: bool,
    },
    DragStarted {
        id: NodeId,
    },
    DragEnded {
        id: NodeId,
    },

    // Persistence
    ValidationFailed {
        messages: Vec<String>,
    },
    StorySaved {
        story_id: String,
    },
    StorySaveFailed {
        error: String,
    },
    StoryExported {
        path: String,
    },

    // Notifications
    ShowSuccess {
        message: String,
    },
    ShowWarning {
        message: String,
    },
    ShowError {
        message: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        tracing::trace!("Publishing {:?}", event);
        let _ = self.tx.send(event);
    }

    /// Events published so far that nobody has consumed yet.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }

    /// Dispatch all pending events to a listener.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
