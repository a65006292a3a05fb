use crate::save::{save_story, SaveError, StoryPersistence};
use crate::story_file::export_story;
use anyhow::Result;
use std::path::Path;
use storyloom_api::SavedStory;
use storyloom_core::{Branch, NodeId, NodeType, Position, StoryNode};
use storyloom_events::{Event, EventBus};
use storyloom_graph::{
    BranchConnector, CascadeReport, ConnectorRouter, GraphError, NewNodeSpec, NodeUpdate, Story,
    ValidationReport, Validator,
};

/// Drives one story on behalf of a UI, announcing every change on the bus.
///
/// Rejected operations leave the story untouched and publish a `ShowError`
/// notification carrying the error text.
pub struct StoryEditor {
    story: Story,
    events: EventBus,
}

impl StoryEditor {
    pub fn new(mut story: Story, events: EventBus) -> Self {
        story.graph.ensure_root();
        Self { story, events }
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn into_story(self) -> Story {
        self.story
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn reject<T>(&self, err: GraphError) -> Result<T, GraphError> {
        tracing::debug!("Rejected: {}", err);
        self.events.publish(Event::ShowError {
            message: err.to_string(),
        });
        Err(err)
    }

    fn publish_selection(&self) {
        self.events.publish(Event::SelectionChanged {
            id: self.story.graph.selected_id().cloned(),
        });
    }

    pub fn add_branch(
        &mut self,
        source_id: &NodeId,
        text: &str,
        spec: NewNodeSpec,
    ) -> Result<(Branch, StoryNode), GraphError> {
        match self.story.graph.add_branch(source_id, text, spec) {
            Ok((branch, node)) => {
                self.events.publish(Event::NodeCreated {
                    id: node.id.clone(),
                    parent_id: source_id.clone(),
                    branch_id: branch.id.clone(),
                    node_type: node.node_type,
                    x: node.position.x,
                    y: node.position.y,
                });
                Ok((branch, node))
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn delete_node(&mut self, id: &NodeId) -> Result<CascadeReport, GraphError> {
        let editing = self.story.graph.edit_session().map(|s| s.node_id.clone());
        match self.story.graph.delete_node(id) {
            Ok(report) => {
                if let Some(edited) = editing.filter(|e| report.removed.contains(e)) {
                    self.events.publish(Event::EditEnded {
                        id: edited,
                        committed: false,
                    });
                }
                self.events.publish(Event::NodesDeleted {
                    ids: report.removed.clone(),
                    stripped_branches: report.stripped_branches,
                });
                self.publish_selection();
                Ok(report)
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn select(&mut self, id: &NodeId) -> Result<(), GraphError> {
        match self.story.graph.select(id) {
            Ok(()) => {
                self.publish_selection();
                Ok(())
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> Result<(), GraphError> {
        match self.story.graph.update_node(id, update) {
            Ok(_) => {
                self.events.publish(Event::NodeUpdated { id: id.clone() });
                Ok(())
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn set_node_type(&mut self, id: &NodeId, node_type: NodeType) -> Result<(), GraphError> {
        match self.story.graph.set_node_type(id, node_type) {
            Ok(()) => {
                self.events.publish(Event::NodeUpdated { id: id.clone() });
                Ok(())
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn open_edit(&mut self, id: &NodeId) -> Result<(), GraphError> {
        match self.story.graph.open_edit(id) {
            Ok(_) => {
                self.events.publish(Event::EditStarted { id: id.clone() });
                Ok(())
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn commit_edit(&mut self, update: NodeUpdate) -> Result<(), GraphError> {
        match self.story.graph.commit_edit(update) {
            Ok(node) => {
                let id = node.id.clone();
                self.events.publish(Event::NodeUpdated { id: id.clone() });
                self.events.publish(Event::EditEnded {
                    id,
                    committed: true,
                });
                Ok(())
            }
            Err(err) => self.reject(err),
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.story.graph.cancel_edit() {
            self.events.publish(Event::EditEnded {
                id: session.node_id,
                committed: false,
            });
        }
    }

    pub fn begin_drag(&mut self, id: &NodeId, pointer: Position) -> Result<(), GraphError> {
        match self.story.graph.begin_drag(id, pointer) {
            Ok(()) => {
                self.events.publish(Event::DragStarted { id: id.clone() });
                Ok(())
            }
            Err(err) => self.reject(err),
        }
    }

    /// Move the dragged node; returns its new position, or `None` when idle.
    pub fn drag_to(&mut self, pointer: Position) -> Option<Position> {
        let position = self.story.graph.drag_to(pointer)?;
        if let Some(session) = self.story.graph.drag_session() {
            self.events.publish(Event::NodeMoved {
                id: session.node_id.clone(),
                x: position.x,
                y: position.y,
            });
        }
        Some(position)
    }

    pub fn end_drag(&mut self) -> Option<NodeId> {
        let id = self.story.graph.end_drag()?;
        self.events.publish(Event::DragEnded { id: id.clone() });
        Some(id)
    }

    /// Connectors for every branch, for the renderer to draw.
    pub fn connectors(&self) -> Vec<BranchConnector> {
        ConnectorRouter::from_config(self.story.graph.config()).route_branches(&self.story.graph)
    }

    pub fn validate(&self) -> ValidationReport {
        let report = Validator::validate(&self.story);
        if !report.is_valid() {
            self.events.publish(Event::ValidationFailed {
                messages: report.messages(),
            });
        }
        report
    }

    pub fn save<P>(&self, persistence: &mut P) -> Result<SavedStory, SaveError>
    where
        P: StoryPersistence + ?Sized,
    {
        match save_story(&self.story, persistence) {
            Ok(saved) => {
                self.events.publish(Event::StorySaved {
                    story_id: saved.story_id.clone(),
                });
                self.events.publish(Event::ShowSuccess {
                    message: "Story saved".to_string(),
                });
                Ok(saved)
            }
            Err(SaveError::Invalid(report)) => {
                self.events.publish(Event::ValidationFailed {
                    messages: report.messages(),
                });
                self.events.publish(Event::ShowWarning {
                    message: format!("Cannot save: {} problem(s) found", report.len()),
                });
                Err(SaveError::Invalid(report))
            }
            Err(SaveError::Persistence(err)) => {
                let message = err.user_message();
                self.events.publish(Event::StorySaveFailed {
                    error: message.clone(),
                });
                self.events.publish(Event::ShowError { message });
                Err(SaveError::Persistence(err))
            }
        }
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        match export_story(&self.story, path) {
            Ok(()) => {
                self.events.publish(Event::StoryExported {
                    path: path.display().to_string(),
                });
                Ok(())
            }
            Err(err) => {
                if let Some(SaveError::Invalid(report)) = err.downcast_ref::<SaveError>() {
                    self.events.publish(Event::ValidationFailed {
                        messages: report.messages(),
                    });
                } else {
                    self.events.publish(Event::ShowError {
                        message: format!("{:#}", err),
                    });
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::PersistenceError;
    use storyloom_api::{ApiError, PersistencePayload};
    use storyloom_core::StoryMeta;
    use storyloom_graph::EditorConfig;

    fn editor() -> StoryEditor {
        let story = Story::new(StoryMeta::new("Story", "Desc"), EditorConfig::default());
        StoryEditor::new(story, EventBus::new())
    }

    fn root(editor: &StoryEditor) -> NodeId {
        editor.story().graph.root_id().cloned().unwrap()
    }

    #[test]
    fn test_add_and_delete_publish_events() {
        let mut editor = editor();
        let root = root(&editor);

        let (_, node) = editor
            .add_branch(&root, "go north", NewNodeSpec::default())
            .unwrap();
        editor.delete_node(&node.id).unwrap();

        let events = editor.events().drain();
        assert!(matches!(
            &events[0],
            Event::NodeCreated { id, parent_id, x, y, .. }
                if id == &node.id && parent_id == &root && *x == 300.0 && *y == 100.0
        ));
        assert_eq!(
            events[1],
            Event::NodesDeleted {
                ids: vec![node.id.clone()],
                stripped_branches: 1,
            }
        );
        assert_eq!(events[2], Event::SelectionChanged { id: Some(root) });
    }

    #[test]
    fn test_rejection_publishes_error() {
        let mut editor = editor();
        let root = root(&editor);

        assert!(editor.delete_node(&root).is_err());

        let events = editor.events().drain();
        assert!(matches!(&events[..], [Event::ShowError { message }] if message.contains("protected")));
        assert_eq!(editor.story().graph.len(), 1);
    }

    #[test]
    fn test_drag_sequence() {
        let mut editor = editor();
        let root = root(&editor);

        assert_eq!(editor.drag_to(Position::new(5.0, 5.0)), None);
        editor
            .begin_drag(&root, Position::new(120.0, 110.0))
            .unwrap();
        assert_eq!(
            editor.drag_to(Position::new(220.0, 310.0)),
            Some(Position::new(200.0, 300.0))
        );
        assert_eq!(editor.end_drag(), Some(root.clone()));

        let events = editor.events().drain();
        assert_eq!(
            events,
            vec![
                Event::DragStarted { id: root.clone() },
                Event::NodeMoved {
                    id: root.clone(),
                    x: 200.0,
                    y: 300.0,
                },
                Event::DragEnded { id: root },
            ]
        );
    }

    struct FailingBackend;

    impl StoryPersistence for FailingBackend {
        fn save_story(&mut self, _: &PersistencePayload) -> Result<SavedStory, PersistenceError> {
            Err(PersistenceError::Rejected(ApiError::internal("")))
        }
    }

    #[test]
    fn test_failed_save_notifies_generic_message() {
        let editor = editor();

        assert!(editor.save(&mut FailingBackend).is_err());

        let events = editor.events().drain();
        assert_eq!(
            events,
            vec![
                Event::StorySaveFailed {
                    error: "Failed to save story".to_string(),
                },
                Event::ShowError {
                    message: "Failed to save story".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_edit_session_events() {
        let mut editor = editor();
        let root = root(&editor);

        editor.open_edit(&root).unwrap();
        assert!(editor.open_edit(&root).is_err());
        editor
            .commit_edit(NodeUpdate {
                title: Some("Cave mouth".into()),
                content: None,
            })
            .unwrap();

        let events = editor.events().drain();
        assert_eq!(events[0], Event::EditStarted { id: root.clone() });
        assert!(matches!(events[1], Event::ShowError { .. }));
        assert_eq!(events[2], Event::NodeUpdated { id: root.clone() });
        assert_eq!(
            events[3],
            Event::EditEnded {
                id: root,
                committed: true,
            }
        );
        assert!(editor.validate().is_valid());
    }
}
