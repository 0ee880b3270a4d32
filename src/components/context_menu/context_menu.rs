use std::rc::Rc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, trace};

use super::events::{
    CustomMenuRequest, EventStatus, ExecuteDetail, InputEvent, Key, PointerEvent, TriggerDetail,
};
use super::resolver::{DefaultTargetResolver, TargetResolver};
use super::view::{ContextMenuView, KeyOutcome};
use crate::common::{Emitter, Point, SubscriptionId};
use crate::components::menu_item::{
    normalize, Command, IdGenerator, MenuItem, MenuScope, SequentialIds,
};
use crate::config::MenuConfig;
use crate::element::Element;
use crate::store::Store;

/// Attribute set on the element a menu was opened for
pub const ACTIVE_ATTRIBUTE: &str = "active";

/// What one open menu was built for
#[derive(Debug, Clone)]
pub struct TriggerInfo {
    pub target: Element,
    /// Point the commands reason about, independent from the placement
    pub click_point: Point,
    pub custom_data: Option<Value>,
}

/// Contextual menu controller bound to one workspace
///
/// Owns the command registry and the store, turns input events into menu
/// builds, and relays selections to command actions or `execute`
/// subscribers.
///
/// ```
/// use std::time::Instant;
/// use menukit::components::context_menu::{ContextMenu, CustomMenuRequest, InputEvent};
/// use menukit::components::menu_item::Command;
/// use menukit::element::Element;
///
/// let mut menu = ContextMenu::new(Element::new("main"));
/// menu.connect();
/// menu.register_commands(vec![
///     Command::normal("Copy").with_target("all"),
///     Command::separator().with_target("all"),
///     Command::normal("Paste").with_target("root"),
/// ]);
///
/// let request = CustomMenuRequest::new("root").at(10.0, 20.0);
/// menu.handle_event(InputEvent::CustomMenu(request), Instant::now());
/// assert_eq!(menu.current_menu().map(|view| view.rows().len()), Some(3));
/// ```
pub struct ContextMenu {
    workspace: Element,
    store: Store,
    config: Rc<MenuConfig>,
    resolver: Box<dyn TargetResolver>,
    ids: Box<dyn IdGenerator>,
    commands: Vec<Rc<MenuItem>>,
    connected: bool,
    trigger: Option<TriggerInfo>,
    menu: Option<ContextMenuView>,
    on_execute: Emitter<ExecuteDetail>,
    on_closed: Emitter<Element>,
}

impl std::fmt::Debug for ContextMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextMenu")
            .field("workspace", &self.workspace)
            .field("commands", &self.commands.len())
            .field("connected", &self.connected)
            .field("trigger", &self.trigger)
            .field("menu", &self.menu)
            .finish()
    }
}

impl ContextMenu {
    pub fn new(workspace: Element) -> Self {
        Self {
            workspace,
            store: Store::new(),
            config: Rc::new(MenuConfig::default()),
            resolver: Box::new(DefaultTargetResolver),
            ids: Box::new(SequentialIds::new()),
            commands: Vec::new(),
            connected: false,
            trigger: None,
            menu: None,
            on_execute: Emitter::new(),
            on_closed: Emitter::new(),
        }
    }

    // === Builder ===

    pub fn with_config(mut self, config: MenuConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    pub fn with_resolver(mut self, resolver: impl TargetResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replace the id source; only affects commands registered afterwards
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Share an existing store instead of a fresh one
    pub fn with_store(mut self, store: Store) -> Self {
        self.store = store;
        self
    }

    // === Getters ===

    pub fn workspace(&self) -> &Element {
        &self.workspace
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn resolver(&self) -> &dyn TargetResolver {
        self.resolver.as_ref()
    }

    pub fn commands(&self) -> &[Rc<MenuItem>] {
        &self.commands
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_open(&self) -> bool {
        self.menu.is_some()
    }

    pub fn current_menu(&self) -> Option<&ContextMenuView> {
        self.menu.as_ref()
    }

    pub fn trigger_info(&self) -> Option<&TriggerInfo> {
        self.trigger.as_ref()
    }

    // === Subscriptions ===

    /// Called when a selected command chain has no action
    pub fn on_execute<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ExecuteDetail) + 'static,
    {
        self.on_execute.subscribe(listener)
    }

    pub fn off_execute(&self, id: SubscriptionId) -> bool {
        self.on_execute.unsubscribe(id)
    }

    /// Called with the trigger target whenever an open menu is torn down
    pub fn on_closed<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Element) + 'static,
    {
        self.on_closed.subscribe(listener)
    }

    pub fn off_closed(&self, id: SubscriptionId) -> bool {
        self.on_closed.unsubscribe(id)
    }

    // === Lifecycle ===

    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// Stop handling input and close any open menu
    pub fn disconnect(&mut self) {
        self.destroy();
        self.connected = false;
    }

    // === Registry ===

    /// Replace the registry; an empty list leaves it untouched
    pub fn register_commands<I>(&mut self, commands: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<Command>>,
    {
        let commands: Vec<Option<Command>> = commands.into_iter().map(Into::into).collect();
        if commands.is_empty() {
            return;
        }
        self.commands = normalize(commands, self.ids.as_mut());
        debug!("Registered {} commands", self.commands.len());
    }

    /// Append one command, returning its id when it was kept
    pub fn add_command(&mut self, command: Command) -> Option<String> {
        let item = normalize([command], self.ids.as_mut()).pop()?;
        let id = item.id().to_string();
        self.commands.push(item);
        Some(id)
    }

    /// Top-level items applying to `name`, in registration order
    pub fn list_commands(&self, name: &str, element: &Element) -> Vec<Rc<MenuItem>> {
        self.commands
            .iter()
            .filter(|item| self.resolver.matches(item, name, element))
            .cloned()
            .collect()
    }

    // === Build / destroy ===

    /// Open a menu for `target` at `placement`
    ///
    /// Any open menu is destroyed first. Returns false, with nothing
    /// opened, when no command applies to `name`.
    pub fn build(
        &mut self,
        target: &Element,
        name: &str,
        placement: Point,
        target_point: Point,
        custom_data: Option<Value>,
    ) -> bool {
        self.destroy();

        let commands = self.list_commands(name, target);
        if commands.is_empty() {
            trace!("No commands for target {name}");
            return false;
        }

        debug!("Opening menu for {name} with {} commands", commands.len());
        let info = TriggerInfo {
            target: target.clone(),
            click_point: target_point,
            custom_data,
        };
        self.render(commands, placement, &info);
        target.set_attribute(ACTIVE_ATTRIBUTE, "");
        self.trigger = Some(info);
        true
    }

    fn render(&mut self, commands: Vec<Rc<MenuItem>>, placement: Point, info: &TriggerInfo) {
        let scope = Rc::new(self.scope_for(info));
        let mut view = ContextMenuView::new(commands, scope, self.config.clone(), None, placement);
        view.open();
        view.focus();
        self.menu = Some(view);
    }

    fn scope_for(&self, info: &TriggerInfo) -> MenuScope {
        MenuScope {
            store: self.store.clone(),
            target: info.target.clone(),
            workspace: self.workspace.clone(),
            custom_data: info.custom_data.clone(),
        }
    }

    /// Close the open menu; does nothing when idle
    pub fn destroy(&mut self) {
        let menu = self.menu.take();
        let Some(info) = self.trigger.take() else {
            return;
        };
        info.target.remove_attribute(ACTIVE_ATTRIBUTE);
        drop(menu);
        debug!("Closed menu");
        self.on_closed.emit(&info.target);
    }

    // === Input ===

    /// Feed one input event; `now` drives the sub-menu debounce
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> EventStatus {
        if !self.connected {
            return EventStatus::Ignored;
        }
        match event {
            InputEvent::ContextMenu(event) => {
                self.on_context_menu(&event);
                EventStatus::Consumed
            }
            InputEvent::CustomMenu(request) => {
                self.on_custom_menu(request);
                EventStatus::Consumed
            }
            InputEvent::Click(click) => {
                let Some(menu) = self.menu.as_mut() else {
                    return EventStatus::Ignored;
                };
                if click.default_prevented {
                    return EventStatus::Ignored;
                }
                if menu.closes_on_outside_click() && !menu.contains(click.position) {
                    self.destroy();
                    return EventStatus::Ignored;
                }
                if let Some(detail) = menu.click(click.position, now) {
                    self.relay(detail);
                }
                EventStatus::Consumed
            }
            InputEvent::KeyDown(key) => self.on_key_down(&key, now),
            InputEvent::PointerMove(position) => {
                let Some(menu) = self.menu.as_mut() else {
                    return EventStatus::Ignored;
                };
                menu.pointer_over(position, now);
                if menu.contains(position) {
                    EventStatus::Consumed
                } else {
                    EventStatus::Ignored
                }
            }
        }
    }

    /// Fire due sub-menu tasks
    pub fn tick(&mut self, now: Instant) {
        if let Some(menu) = self.menu.as_mut() {
            menu.tick(now);
        }
    }

    /// When the host should call [`tick`](Self::tick) next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.menu.as_ref().and_then(ContextMenuView::next_deadline)
    }

    fn on_context_menu(&mut self, event: &PointerEvent) {
        self.destroy();
        let Some(target) = self.resolver.find_target(event, &self.workspace) else {
            return;
        };
        let Some(name) = self.resolver.element_to_target(&target, &self.workspace) else {
            trace!("Trigger target has no name");
            return;
        };
        let target_point = self.resolver.read_target_click_position(event);
        self.build(&target, &name, event.position, target_point, None);
    }

    fn on_custom_menu(&mut self, request: CustomMenuRequest) {
        self.destroy();
        let placement = Point::new(request.x, request.y);
        let target = request
            .action_target
            .unwrap_or_else(|| self.workspace.clone());
        let target_point = request
            .click_event
            .as_ref()
            .map_or(placement, |event| self.resolver.read_target_click_position(event));
        self.build(&target, &request.name, placement, target_point, request.custom_data);
    }

    fn on_key_down(&mut self, key: &Key, now: Instant) -> EventStatus {
        let Some(menu) = self.menu.as_mut() else {
            return EventStatus::Ignored;
        };
        if *key == Key::Escape {
            self.destroy();
            return EventStatus::Consumed;
        }
        match menu.key_down(key, now) {
            KeyOutcome::Ignored => EventStatus::Ignored,
            KeyOutcome::Handled => EventStatus::Consumed,
            KeyOutcome::Closed => {
                self.destroy();
                EventStatus::Consumed
            }
            KeyOutcome::Trigger(detail) => {
                self.relay(detail);
                EventStatus::Consumed
            }
        }
    }

    /// Close the menu, then run the action for a selection
    ///
    /// Order: a parent action standing in for a child without one, the
    /// command's own action, otherwise the `execute` notification.
    fn relay(&mut self, detail: TriggerDetail) {
        let Some(info) = self.trigger.clone() else {
            return;
        };
        self.destroy();

        let TriggerDetail {
            item,
            command,
            parent,
        } = detail;
        let scope = self.scope_for(&info);

        let stand_in = parent.filter(|parent| parent.has_execute() && !command.has_execute());
        if let Some(parent) = stand_in {
            debug!("Running {} on behalf of {}", parent.id(), command.id());
            parent.trigger(&command, &scope, info.click_point, Some(item));
        } else if command.trigger(&command, &scope, info.click_point, None) {
            debug!("Ran {}", command.id());
        } else {
            debug!("No action for {}, notifying subscribers", command.id());
            self.on_execute.emit(&ExecuteDetail {
                id: command.id().to_string(),
                store: scope.store,
                target: scope.target,
                root: scope.workspace,
                click_point: info.click_point,
                custom_data: scope.custom_data,
                selected_subcommand: Some(item),
                item: command,
            });
        }
    }
}
