use std::rc::Rc;

use tracing::trace;

use super::command::{Command, CommandType};
use super::data::{MenuItem, MenuItemKind};

/// Source of ids for declarations that do not carry one
///
/// The controller owns one generator for its whole lifetime, so generated
/// ids never repeat within it. Any `FnMut() -> String` is a generator.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Yields `"1"`, `"2"`, `"3"`, ...
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    last: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.last += 1;
        self.last.to_string()
    }
}

/// Convert raw declarations into menu items
///
/// `None` entries and unknown types are skipped. Empty `children` become
/// absent children.
pub fn normalize<I>(commands: I, ids: &mut dyn IdGenerator) -> Vec<Rc<MenuItem>>
where
    I: IntoIterator,
    I::Item: Into<Option<Command>>,
{
    commands
        .into_iter()
        .filter_map(Into::into)
        .filter_map(|command| normalize_one(command, ids))
        .map(Rc::new)
        .collect()
}

fn normalize_one(command: Command, ids: &mut dyn IdGenerator) -> Option<MenuItem> {
    let kind = match command.kind {
        CommandType::Normal => MenuItemKind::Normal,
        CommandType::Separator => MenuItemKind::Separator,
        CommandType::Label => MenuItemKind::Label,
        CommandType::Radio => MenuItemKind::Radio,
        CommandType::Unknown => {
            trace!("Dropping command {:?} with an unknown type", command.id);
            return None;
        }
    };
    let id = command.id.unwrap_or_else(|| ids.next_id());

    let item = match kind {
        MenuItemKind::Separator => MenuItem {
            kind,
            id,
            target: command.target,
            label: None,
            title: None,
            icon: None,
            children: None,
            visible: command.visible,
            enabled: None,
            checked: None,
            execute: None,
            before_render: None,
        },
        MenuItemKind::Label => MenuItem {
            kind,
            id,
            target: command.target,
            label: command.label,
            title: command.title,
            icon: None,
            children: None,
            visible: command.visible,
            enabled: None,
            checked: None,
            execute: None,
            before_render: None,
        },
        MenuItemKind::Normal | MenuItemKind::Radio => {
            let children = command
                .children
                .map(|children| normalize(children, ids))
                .filter(|children| !children.is_empty());
            MenuItem {
                kind,
                id,
                target: command.target,
                label: command.label,
                title: command.title,
                icon: command.icon,
                children,
                visible: command.visible,
                enabled: command.enabled,
                checked: command.checked,
                execute: command.execute,
                before_render: command.before_render,
            }
        }
    };
    Some(item)
}
