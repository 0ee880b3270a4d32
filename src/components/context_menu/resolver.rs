use std::collections::HashSet;

use super::events::PointerEvent;
use crate::common::Point;
use crate::components::menu_item::{CommandTarget, MenuItem};
use crate::element::Element;

/// How the controller turns a pointer event into a set of commands
///
/// Every method has a default. Implement the trait and override the
/// methods you need to support richer target matching; the controller
/// calls these and nothing else.
pub trait TargetResolver {
    /// The element a context-menu gesture applies to
    fn find_target(&self, event: &PointerEvent, _workspace: &Element) -> Option<Element> {
        event.target.clone()
    }

    /// Symbolic name commands declare in their `target`
    fn element_to_target(&self, element: &Element, workspace: &Element) -> Option<String> {
        default_target_name(element, workspace)
    }

    /// The point the commands reason about, passed to actions as
    /// `click_point`. Independent from where the menu is placed.
    fn read_target_click_position(&self, event: &PointerEvent) -> Point {
        event.position
    }

    /// Whether a top-level item applies to `name`
    fn matches(&self, item: &MenuItem, name: &str, _element: &Element) -> bool {
        item.target().is_some_and(|target| target.matches(name))
    }
}

/// `root` for the workspace, otherwise `tag` or `tag.class1.class2`
///
/// Elements without a tag name have no target name.
pub fn default_target_name(element: &Element, workspace: &Element) -> Option<String> {
    if element == workspace {
        return Some(CommandTarget::ROOT.to_string());
    }
    let tag = element.tag_name().filter(|tag| !tag.is_empty())?;
    let mut name = tag.to_string();
    for class in element.classes() {
        name.push('.');
        name.push_str(class);
    }
    Some(name)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTargetResolver;

impl TargetResolver for DefaultTargetResolver {}

/// Resolves a click to the nearest ancestor with a known target name
///
/// A click on a label inside `li.file` opens the `li.file` menu. The walk
/// never leaves the workspace; when nothing matches the event target is
/// used as is.
#[derive(Debug, Default, Clone)]
pub struct AncestorTargetResolver {
    names: HashSet<String>,
}

impl AncestorTargetResolver {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl TargetResolver for AncestorTargetResolver {
    fn find_target(&self, event: &PointerEvent, workspace: &Element) -> Option<Element> {
        let target = event.target.as_ref()?;
        target
            .find_ancestor(Some(workspace), |el| {
                default_target_name(el, workspace).is_some_and(|name| self.names.contains(&name))
            })
            .or_else(|| Some(target.clone()))
    }
}
