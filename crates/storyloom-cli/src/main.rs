use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use storyloom_core::{NodeId, NodeType, StoryMeta};
use storyloom_events::{Event, EventBus};
use storyloom_graph::{NewNodeSpec, Validator};
use storyloom_project::{
    EditorSettings, SETTINGS_FILE_NAME, StoryEditor, StoryFile, export_story, prepare_save,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Editor settings file (defaults to ./storyloom_settings.json)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a story file holding only its root node
    New {
        path: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Report every problem that would block saving
    Validate { path: PathBuf },
    /// Write a validated copy of the story to `out`
    Export { path: PathBuf, out: PathBuf },
    /// Print the payload a save would send to the backend
    Payload { path: PathBuf },
    /// Print connector geometry for every branch
    Connectors { path: PathBuf },
    /// Add a branch from `source` to a new node
    AddBranch {
        path: PathBuf,
        source: String,
        text: String,
        #[arg(long, value_enum, default_value_t = NodeKindArg::Regular)]
        kind: NodeKindArg,
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a node and everything reachable from it
    DeleteNode { path: PathBuf, node: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NodeKindArg {
    Regular,
    Branch,
    End,
}

impl From<NodeKindArg> for NodeType {
    fn from(kind: NodeKindArg) -> Self {
        match kind {
            NodeKindArg::Regular => NodeType::Regular,
            NodeKindArg::Branch => NodeType::Branch,
            NodeKindArg::End => NodeType::End,
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<EditorSettings> {
    match path {
        Some(path) => EditorSettings::load_or_default(path),
        None => EditorSettings::load_or_default(Path::new(SETTINGS_FILE_NAME)),
    }
}

fn print_events(events: &EventBus) {
    for event in events.drain() {
        match event {
            Event::NodeCreated { id, x, y, .. } => println!("Created {} at ({}, {})", id, x, y),
            Event::NodesDeleted {
                ids,
                stripped_branches,
            } => println!(
                "Deleted {} node(s), stripped {} branch(es)",
                ids.len(),
                stripped_branches
            ),
            Event::ShowError { message } => eprintln!("Error: {}", message),
            other => tracing::debug!("{:?}", other),
        }
    }
}

/// Run a mutation through the editor, then write the story back.
fn edit_file<F>(path: PathBuf, settings: &EditorSettings, edit: F) -> Result<()>
where
    F: FnOnce(&mut StoryEditor) -> Result<()>,
{
    let file = StoryFile::load(path, settings.editor)?;
    let mut editor = StoryEditor::new(file.story, EventBus::new());
    let outcome = edit(&mut editor);
    print_events(editor.events());
    outcome?;
    StoryFile {
        story: editor.into_story(),
        path: file.path,
    }
    .save()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let settings = load_settings(args.settings.as_deref())?;

    match args.command {
        Command::New {
            path,
            title,
            description,
        } => {
            let file = StoryFile::new(
                StoryMeta::new(title, description),
                settings.editor,
                path,
            );
            file.save()?;
            println!("Created {}", file.path.display());
        }
        Command::Validate { path } => {
            let file = StoryFile::load(path, settings.editor)?;
            let report = Validator::validate(&file.story);
            if !report.is_valid() {
                for message in report.messages() {
                    println!("- {}", message);
                }
                bail!("{} problem(s) found", report.len());
            }
            println!("Story is valid.");
        }
        Command::Export { path, out } => {
            let file = StoryFile::load(path, settings.editor)?;
            export_story(&file.story, &out)?;
            println!("Exported to {}", out.display());
        }
        Command::Payload { path } => {
            let file = StoryFile::load(path, settings.editor)?;
            let payload = prepare_save(&file.story)?;
            println!("{}", payload.to_json_pretty()?);
        }
        Command::Connectors { path } => {
            let file = StoryFile::load(path, settings.editor)?;
            let editor = StoryEditor::new(file.story, EventBus::new());
            for branch in editor.connectors() {
                let c = &branch.connector;
                println!(
                    "{} -> {} {:?}: ({:.1}, {:.1}) -> ({:.1}, {:.1}) length {:.1} angle {:.1}",
                    branch.source_id,
                    branch.target_id,
                    branch.label,
                    c.start.x,
                    c.start.y,
                    c.end.x,
                    c.end.y,
                    c.length,
                    c.angle_degrees
                );
            }
        }
        Command::AddBranch {
            path,
            source,
            text,
            kind,
            title,
        } => edit_file(path, &settings, |editor| {
            let spec = NewNodeSpec {
                node_type: Some(kind.into()),
                title,
                content: None,
            };
            editor.add_branch(&NodeId(source), &text, spec)?;
            Ok(())
        })?,
        Command::DeleteNode { path, node } => edit_file(path, &settings, |editor| {
            editor.delete_node(&NodeId(node))?;
            Ok(())
        })?,
    }

    Ok(())
}
