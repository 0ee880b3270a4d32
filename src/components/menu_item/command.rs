use std::rc::Rc;

use serde::{Deserialize, Deserializer};

use super::data::{
    Action, CommandTarget, ExecuteContext, Icon, LifecycleContext, Predicate, RenderContext,
    RenderHook,
};
use crate::error::Result;

/// Declared type of a command
///
/// Anything the controller does not know about deserializes to `Unknown`
/// and is dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    #[default]
    Normal,
    Separator,
    Label,
    Radio,
    #[serde(other)]
    Unknown,
}

/// A raw command declaration
///
/// Data fields can be declared in TOML; behavior (closures) is attached in
/// code with the builder methods.
///
/// ```
/// use menukit::components::menu_item::Command;
///
/// let copy = Command::normal("Copy")
///     .with_id("copy")
///     .with_target(["li.file", "root"])
///     .on_execute(|ctx| println!("copy {}", ctx.target.tag_name().unwrap_or("?")));
/// assert_eq!(copy.id.as_deref(), Some("copy"));
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Command {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub target: Option<CommandTarget>,
    pub label: Option<String>,
    pub title: Option<String>,
    pub icon: Option<Icon>,
    pub children: Option<Vec<Command>>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub visible: Option<Predicate>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub enabled: Option<Predicate>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub checked: Option<Predicate>,
    #[serde(skip)]
    pub execute: Option<Action>,
    #[serde(skip)]
    pub before_render: Option<RenderHook>,
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<Option<Predicate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.map(Predicate::Flag))
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("label", &self.label)
            .field("children", &self.children)
            .field("has_execute", &self.execute.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct CommandDocument {
    #[serde(default)]
    commands: Vec<Command>,
}

impl Command {
    pub fn new(kind: CommandType) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn normal(label: impl Into<String>) -> Self {
        Self::new(CommandType::Normal).with_label(label)
    }

    pub fn separator() -> Self {
        Self::new(CommandType::Separator)
    }

    /// A non-interactive section header
    pub fn label(text: impl Into<String>) -> Self {
        Self::new(CommandType::Label).with_label(text)
    }

    pub fn radio(label: impl Into<String>) -> Self {
        Self::new(CommandType::Radio).with_label(label)
    }

    /// Parse the `[[commands]]` array of a TOML document
    pub fn list_from_toml(source: &str) -> Result<Vec<Command>> {
        let document: CommandDocument = toml::from_str(source)?;
        Ok(document.commands)
    }

    // === Builder API ===

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<CommandTarget>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<Icon>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Command>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn with_child(mut self, child: Command) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn with_visible(mut self, visible: impl Into<Predicate>) -> Self {
        self.visible = Some(visible.into());
        self
    }

    pub fn visible_when<F>(self, f: F) -> Self
    where
        F: Fn(&LifecycleContext<'_>) -> anyhow::Result<bool> + 'static,
    {
        self.with_visible(Predicate::dynamic(f))
    }

    pub fn with_enabled(mut self, enabled: impl Into<Predicate>) -> Self {
        self.enabled = Some(enabled.into());
        self
    }

    pub fn enabled_when<F>(self, f: F) -> Self
    where
        F: Fn(&LifecycleContext<'_>) -> anyhow::Result<bool> + 'static,
    {
        self.with_enabled(Predicate::dynamic(f))
    }

    pub fn with_checked(mut self, checked: impl Into<Predicate>) -> Self {
        self.checked = Some(checked.into());
        self
    }

    pub fn checked_when<F>(self, f: F) -> Self
    where
        F: Fn(&LifecycleContext<'_>) -> anyhow::Result<bool> + 'static,
    {
        self.with_checked(Predicate::dynamic(f))
    }

    pub fn on_execute<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecuteContext<'_>) + 'static,
    {
        self.execute = Some(Rc::new(f));
        self
    }

    pub fn before_render<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut RenderContext<'_>) + 'static,
    {
        self.before_render = Some(Rc::new(f));
        self
    }
}

/// Depth-first lookup of a declaration by id
///
/// Used to attach behavior to commands declared in a TOML file.
pub fn find_command_mut<'a>(commands: &'a mut [Command], id: &str) -> Option<&'a mut Command> {
    for command in commands {
        if command.id.as_deref() == Some(id) {
            return Some(command);
        }
        if let Some(found) = command
            .children
            .as_deref_mut()
            .and_then(|children| find_command_mut(children, id))
        {
            return Some(found);
        }
    }
    None
}
