use std::rc::Rc;

use serde_json::Value;

use crate::common::Point;
use crate::components::menu_item::MenuItem;
use crate::element::Element;
use crate::store::Store;

/// Keys the menu reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other(String),
}

/// A pointer event on the workspace
#[derive(Debug, Clone)]
pub struct PointerEvent {
    /// Innermost element under the pointer
    pub target: Option<Element>,
    /// Workspace-relative position
    pub position: Point,
}

impl PointerEvent {
    pub fn new(target: Option<Element>, position: impl Into<Point>) -> Self {
        Self {
            target,
            position: position.into(),
        }
    }
}

/// A document-level click
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub position: Point,
    /// Set when another handler already consumed the click
    pub default_prevented: bool,
}

impl ClickEvent {
    pub fn at(position: impl Into<Point>) -> Self {
        Self {
            position: position.into(),
            default_prevented: false,
        }
    }

    pub fn prevented(mut self) -> Self {
        self.default_prevented = true;
        self
    }
}

/// Programmatic trigger, opens the menu for `name` without a pointer
#[derive(Debug, Clone, Default)]
pub struct CustomMenuRequest {
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Element passed to the callbacks as `target`; the workspace when unset
    pub action_target: Option<Element>,
    /// The pointer event behind the request, used for the target click point
    pub click_event: Option<PointerEvent>,
    pub custom_data: Option<Value>,
}

impl CustomMenuRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_action_target(mut self, target: Element) -> Self {
        self.action_target = Some(target);
        self
    }

    pub fn with_click_event(mut self, event: PointerEvent) -> Self {
        self.click_event = Some(event);
        self
    }

    pub fn with_custom_data(mut self, data: impl Into<Value>) -> Self {
        self.custom_data = Some(data.into());
        self
    }
}

/// Input consumed by [`ContextMenu::handle_event`](super::ContextMenu::handle_event)
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Context-menu gesture on the workspace
    ContextMenu(PointerEvent),
    CustomMenu(CustomMenuRequest),
    Click(ClickEvent),
    KeyDown(Key),
    PointerMove(Point),
}

/// Whether the controller used the event
///
/// `Consumed` means the host should suppress its default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Consumed,
    Ignored,
}

/// A selection travelling from a view up to the controller
#[derive(Debug, Clone)]
pub struct TriggerDetail {
    /// Position of the selected row among its siblings
    pub item: usize,
    pub command: Rc<MenuItem>,
    /// Nearest ancestor item with an action, attached while bubbling
    pub parent: Option<Rc<MenuItem>>,
}

/// Published when the selected command chain has no action
#[derive(Debug, Clone)]
pub struct ExecuteDetail {
    pub id: String,
    pub store: Store,
    pub target: Element,
    pub root: Element,
    pub click_point: Point,
    pub custom_data: Option<Value>,
    pub selected_subcommand: Option<usize>,
    pub item: Rc<MenuItem>,
}
