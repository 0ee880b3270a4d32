use std::rc::Rc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, trace};

use super::events::{Key, TriggerDetail};
use super::state::ListState;
use super::task::TaskSlot;
use crate::common::{Point, Rect};
use crate::components::menu_item::{Icon, MenuItem, MenuItemKind, MenuScope};
use crate::config::MenuConfig;
use crate::element::Element;
use crate::store::Store;

/// Accessibility role of a rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    MenuItem,
    Separator,
    Presentation,
}

/// One row of a rendered menu level, ready for the host to draw
///
/// Disabled and hidden rows are kept in the list; only their flags (and,
/// when hidden, their height) change.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub id: String,
    pub kind: MenuItemKind,
    pub role: RowRole,
    pub label: Option<String>,
    pub title: Option<String>,
    /// Icon slot; radio rows never carry an icon
    pub icon: Option<Icon>,
    /// Check mark state of radio rows
    pub checked: bool,
    /// Draw the sub-menu indicator and set `aria-haspopup`
    pub has_children: bool,
    pub disabled: bool,
    pub hidden: bool,
    /// Holds the keyboard focus of its list
    pub focused: bool,
    pub bounds: Rect,
}

impl RenderedRow {
    /// Can be hovered, focused and selected
    pub fn is_interactive(&self) -> bool {
        self.kind.is_interactive() && !self.disabled && !self.hidden
    }

    pub fn aria_haspopup(&self) -> bool {
        self.has_children
    }

    pub fn aria_hidden(&self) -> bool {
        self.hidden
    }
}

/// Result of routing a key press into a view
#[derive(Debug, Clone)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    /// The view asked to be closed (left navigation out of a sub-menu)
    Closed,
    Trigger(TriggerDetail),
}

/// One level of an open menu
///
/// Owns at most one child sub-menu. A sub-menu opens after the pointer
/// rests on a row with children for `sub_menu_timeout`, and closes the
/// same delay after the pointer moves to a row without children.
#[derive(Debug)]
pub struct ContextMenuView {
    commands: Vec<Rc<MenuItem>>,
    scope: Rc<MenuScope>,
    config: Rc<MenuConfig>,
    parent_command: Option<String>,
    position: Point,
    bounds: Rect,
    rows: Vec<RenderedRow>,
    opened: bool,
    focused: bool,
    no_cancel_on_outside_click: bool,
    list: ListState,
    nested_id: Option<String>,
    open_task: TaskSlot,
    close_task: TaskSlot,
    child: Option<Box<ContextMenuView>>,
}

impl ContextMenuView {
    pub fn new(
        commands: Vec<Rc<MenuItem>>,
        scope: Rc<MenuScope>,
        config: Rc<MenuConfig>,
        parent_command: Option<String>,
        position: Point,
    ) -> Self {
        let mut view = Self {
            commands,
            scope,
            config,
            no_cancel_on_outside_click: parent_command.is_some(),
            parent_command,
            position,
            bounds: Rect::default(),
            rows: Vec::new(),
            opened: false,
            focused: false,
            list: ListState::new(),
            nested_id: None,
            open_task: TaskSlot::default(),
            close_task: TaskSlot::default(),
            child: None,
        };
        view.render();
        view
    }

    // === Getters ===

    pub fn commands(&self) -> &[Rc<MenuItem>] {
        &self.commands
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    /// Interactive rows only
    pub fn interactive_rows(&self) -> impl Iterator<Item = &RenderedRow> {
        self.rows.iter().filter(|row| row.is_interactive())
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Id of the row this sub-menu belongs to; `None` for the root menu
    pub fn parent_command(&self) -> Option<&str> {
        self.parent_command.as_deref()
    }

    pub fn is_sub_menu(&self) -> bool {
        self.parent_command.is_some()
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Sub-menus are closed by their parent, never by outside clicks
    pub fn closes_on_outside_click(&self) -> bool {
        !self.no_cancel_on_outside_click
    }

    pub fn focused_row(&self) -> Option<usize> {
        self.list.focused()
    }

    pub fn store(&self) -> &Store {
        &self.scope.store
    }

    pub fn target(&self) -> &Element {
        &self.scope.target
    }

    pub fn workspace(&self) -> &Element {
        &self.scope.workspace
    }

    pub fn custom_data(&self) -> Option<&Value> {
        self.scope.custom_data.as_ref()
    }

    pub fn child(&self) -> Option<&ContextMenuView> {
        self.child.as_deref()
    }

    /// The row whose sub-menu is pending or open
    pub fn nested_command(&self) -> Option<&str> {
        self.nested_id.as_deref()
    }

    pub fn has_pending_open(&self) -> bool {
        self.open_task.is_pending()
    }

    pub fn has_pending_close(&self) -> bool {
        self.close_task.is_pending()
    }

    /// The innermost open view of this branch
    pub fn deepest(&self) -> &ContextMenuView {
        let mut view = self;
        while let Some(child) = view.child() {
            view = child;
        }
        view
    }

    /// Number of open levels, this one included
    pub fn depth(&self) -> usize {
        1 + self.child.as_ref().map_or(0, |child| child.depth())
    }

    // === Overlay state ===

    pub fn open(&mut self) {
        self.opened = true;
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    // === Rendering ===

    /// Re-run `before_render` and the predicates, then lay the rows out
    pub fn render(&mut self) {
        let scope = &self.scope;
        self.rows = self
            .commands
            .iter()
            .map(|item| render_row(item, scope))
            .collect();

        let layout_input: Vec<_> = self.rows.iter().map(|row| (row.kind, row.hidden)).collect();
        let (bounds, rects) = self.config.style.layout(self.position, &layout_input);
        self.bounds = bounds;
        for (row, rect) in self.rows.iter_mut().zip(rects) {
            row.bounds = rect;
        }

        if let Some(focused) = self.list.focused() {
            if !self.selectable().get(focused).copied().unwrap_or(false) {
                self.list.clear();
            }
        }
        self.sync_focus();
    }

    fn sync_focus(&mut self) {
        let focused = self.list.focused();
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.focused = focused == Some(index);
        }
    }

    fn selectable(&self) -> Vec<bool> {
        self.rows.iter().map(RenderedRow::is_interactive).collect()
    }

    // === Hit testing ===

    /// Whether `point` is over this view or any open sub-menu
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point) || self.child.as_ref().is_some_and(|c| c.contains(point))
    }

    /// Index of the visible row under `point`
    pub fn row_at(&self, point: Point) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| !row.hidden && row.bounds.contains(point))
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.commands.iter().position(|item| item.id() == id)
    }

    fn nested_item(&self) -> Option<&Rc<MenuItem>> {
        let id = self.nested_id.as_deref()?;
        self.commands.iter().find(|item| item.id() == id)
    }

    // === Pointer ===

    /// Route a pointer move to the deepest view under it
    pub fn pointer_over(&mut self, point: Point, now: Instant) {
        if let Some(child) = self.child.as_mut() {
            if child.contains(point) {
                child.pointer_over(point, now);
                return;
            }
        }
        let Some(index) = self.row_at(point) else {
            return;
        };
        let row = &self.rows[index];
        if !row.is_interactive() {
            return;
        }
        if row.has_children {
            let id = row.id.clone();
            self.build_nested(&id, now);
        } else if self.nested_id.is_some() {
            self.remove_nested(now);
        }
    }

    /// Route a click inside the view tree to the row under it
    pub fn click(&mut self, point: Point, now: Instant) -> Option<TriggerDetail> {
        if let Some(child) = self.child.as_mut() {
            if child.contains(point) {
                let detail = child.click(point, now)?;
                return Some(self.adopt_child_trigger(detail));
            }
        }
        let index = self.row_at(point)?;
        self.select(index, now)
    }

    /// Select the row at `index`
    ///
    /// Rows with children schedule their sub-menu; leaves produce a trigger.
    pub fn select(&mut self, index: usize, now: Instant) -> Option<TriggerDetail> {
        let row = self.rows.get(index)?;
        if !row.is_interactive() {
            return None;
        }
        let selectable = self.selectable();
        self.list.focus(index, &selectable);
        self.sync_focus();
        let row = &self.rows[index];
        if row.has_children {
            let id = row.id.clone();
            self.build_nested(&id, now);
            return None;
        }
        Some(TriggerDetail {
            item: index,
            command: self.commands[index].clone(),
            parent: None,
        })
    }

    // === Nested menu protocol ===

    fn build_nested(&mut self, id: &str, now: Instant) {
        if self.nested_id.as_deref() == Some(id) {
            if self.close_task.cancel() {
                trace!("Kept sub-menu {id} open");
            }
            return;
        }
        self.close_task.cancel();
        if self.nested_id.is_some() {
            self.clear_nested();
        }
        let has_children = self
            .index_of(id)
            .is_some_and(|index| self.commands[index].has_children());
        if !has_children {
            return;
        }
        self.nested_id = Some(id.to_string());
        self.open_task.schedule(now, self.config.sub_menu_timeout());
        trace!("Scheduled sub-menu {id}");
    }

    fn remove_nested(&mut self, now: Instant) {
        if self.close_task.is_pending() {
            return;
        }
        self.close_task.schedule(now, self.config.sub_menu_timeout());
        trace!("Scheduled sub-menu close for {:?}", self.nested_id);
    }

    fn create_nested(&mut self) {
        let Some(id) = self.nested_id.clone() else {
            return;
        };
        let Some(index) = self.index_of(&id) else {
            return;
        };
        let Some(children) = self.commands[index].children() else {
            return;
        };
        let anchor = self.rows[index].bounds;
        let position = Point::new(anchor.right() - self.config.submenu_overlap, anchor.y);
        let mut menu = ContextMenuView::new(
            children.to_vec(),
            self.scope.clone(),
            self.config.clone(),
            Some(id.clone()),
            position,
        );
        menu.open();
        self.child = Some(Box::new(menu));
        debug!("Opened sub-menu {id}");
    }

    /// Drop the sub-menu; focus held inside it moves back to this view
    fn clear_nested(&mut self) {
        self.nested_id = None;
        self.open_task.cancel();
        self.close_task.cancel();
        if let Some(child) = self.child.take() {
            if child.holds_focus() {
                self.focus();
            }
            debug!("Closed sub-menu");
        }
    }

    /// Whether this view or one of its sub-menus has keyboard focus
    pub fn holds_focus(&self) -> bool {
        self.focused || self.child.as_ref().is_some_and(|child| child.holds_focus())
    }

    /// Close this view's sub-menu and take focus back
    ///
    /// Returns false when there was nothing to close.
    pub fn close_sub_menu(&mut self) -> bool {
        if self.nested_id.is_none() && self.child.is_none() {
            return false;
        }
        self.clear_nested();
        self.focus();
        true
    }

    /// Fire due debounce tasks in this branch
    pub fn tick(&mut self, now: Instant) {
        if self.open_task.take_due(now) {
            self.create_nested();
        }
        if self.close_task.take_due(now) {
            self.clear_nested();
        }
        if let Some(child) = self.child.as_mut() {
            child.tick(now);
        }
    }

    /// Earliest pending deadline in this branch
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.open_task.due(),
            self.close_task.due(),
            self.child.as_ref().and_then(|child| child.next_deadline()),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Attach the nested row as `parent` when the child's trigger has none
    /// and the nested row can act on its behalf
    fn adopt_child_trigger(&self, mut detail: TriggerDetail) -> TriggerDetail {
        if detail.parent.is_none() {
            if let Some(item) = self.nested_item().filter(|item| item.has_execute()) {
                detail.parent = Some(item.clone());
            }
        }
        detail
    }

    // === Keyboard ===

    /// Route a key press to the focused view of this branch
    pub fn key_down(&mut self, key: &Key, now: Instant) -> KeyOutcome {
        if !self.focused {
            if let Some(child) = self.child.as_mut() {
                return match child.key_down(key, now) {
                    KeyOutcome::Closed => {
                        self.clear_nested();
                        self.focus();
                        KeyOutcome::Handled
                    }
                    KeyOutcome::Trigger(detail) => {
                        KeyOutcome::Trigger(self.adopt_child_trigger(detail))
                    }
                    other => other,
                };
            }
        }

        match key {
            Key::ArrowDown => {
                let selectable = self.selectable();
                self.list.focus_next(&selectable);
                self.sync_focus();
                KeyOutcome::Handled
            }
            Key::ArrowUp => {
                let selectable = self.selectable();
                self.list.focus_previous(&selectable);
                self.sync_focus();
                KeyOutcome::Handled
            }
            Key::ArrowRight => self.move_right(),
            Key::ArrowLeft => self.move_left(),
            Key::Enter => match self.list.focused() {
                Some(index) => match self.select(index, now) {
                    Some(detail) => KeyOutcome::Trigger(detail),
                    None => KeyOutcome::Handled,
                },
                None => KeyOutcome::Ignored,
            },
            Key::Escape | Key::Other(_) => KeyOutcome::Ignored,
        }
    }

    /// Open the focused row's sub-menu now and move focus into it
    fn move_right(&mut self) -> KeyOutcome {
        let Some(index) = self.list.focused() else {
            return KeyOutcome::Ignored;
        };
        let row = &self.rows[index];
        if !row.has_children || !row.is_interactive() {
            return KeyOutcome::Ignored;
        }
        let id = row.id.clone();
        self.clear_nested();
        self.nested_id = Some(id);
        self.create_nested();
        if let Some(child) = self.child.as_mut() {
            child.focus();
            let selectable = child.selectable();
            child.list.focus_next(&selectable);
            child.sync_focus();
        }
        self.blur();
        KeyOutcome::Handled
    }

    /// Close this view if it is a sub-menu
    fn move_left(&mut self) -> KeyOutcome {
        if !self.is_sub_menu() {
            return KeyOutcome::Ignored;
        }
        self.opened = false;
        KeyOutcome::Closed
    }
}

fn render_row(item: &MenuItem, scope: &MenuScope) -> RenderedRow {
    match item.kind() {
        MenuItemKind::Separator => structural_row(item, scope, RowRole::Separator),
        MenuItemKind::Label => structural_row(item, scope, RowRole::Presentation),
        kind @ (MenuItemKind::Normal | MenuItemKind::Radio) => {
            let display = item.render_display(scope);
            let visible = item.is_visible(scope);
            let enabled = item.is_enabled(scope);
            let (icon, checked) = if kind == MenuItemKind::Radio {
                (None, item.is_checked(scope))
            } else {
                (display.icon, false)
            };
            RenderedRow {
                id: item.id().to_string(),
                kind,
                role: RowRole::MenuItem,
                label: display.label,
                title: display.title,
                icon,
                checked,
                has_children: item.has_children(),
                disabled: !visible || !enabled,
                hidden: !visible,
                focused: false,
                bounds: Rect::default(),
            }
        }
    }
}

fn structural_row(item: &MenuItem, scope: &MenuScope, role: RowRole) -> RenderedRow {
    RenderedRow {
        id: item.id().to_string(),
        kind: item.kind(),
        role,
        label: item.label().map(str::to_string),
        title: None,
        icon: None,
        checked: false,
        has_children: false,
        disabled: false,
        hidden: !item.is_visible(scope),
        focused: false,
        bounds: Rect::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::menu_item::{normalize, Command, LifecycleContext, SequentialIds};
    use std::cell::Cell;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_millis(300);

    fn scope() -> Rc<MenuScope> {
        Rc::new(MenuScope {
            store: Store::new(),
            target: Element::new("div"),
            workspace: Element::new("main"),
            custom_data: Some(serde_json::json!({ "row": 7 })),
        })
    }

    fn view(commands: Vec<Command>) -> ContextMenuView {
        let items = normalize(commands, &mut SequentialIds::new());
        let mut view = ContextMenuView::new(
            items,
            scope(),
            Rc::new(MenuConfig::default()),
            None,
            Point::new(0.0, 0.0),
        );
        view.open();
        view.focus();
        view
    }

    fn center(view: &ContextMenuView, index: usize) -> Point {
        let b = view.rows()[index].bounds;
        Point::new(b.x + b.width / 2.0, b.y + b.height / 2.0)
    }

    /// Rows: 0 "Edit" (children a, b), 1 "Share" (children c), 2 "Delete"
    fn nested_view() -> ContextMenuView {
        view(vec![
            Command::normal("Edit").with_id("edit").with_children(vec![
                Command::normal("Cut").with_id("cut"),
                Command::normal("Copy").with_id("copy"),
            ]),
            Command::normal("Share")
                .with_id("share")
                .with_child(Command::normal("Mail").with_id("mail")),
            Command::normal("Delete").with_id("delete"),
        ])
    }

    #[test]
    fn test_renders_row_kinds() {
        let v = view(vec![
            Command::normal("Open").with_icon("folder").with_title("Open file"),
            Command::separator(),
            Command::label("Sort"),
            Command::radio("Name").with_icon("ignored").with_checked(true),
            Command::radio("Date"),
        ]);
        let rows = v.rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].role, RowRole::MenuItem);
        assert_eq!(rows[0].icon, Some(Icon::from("folder")));
        assert_eq!(rows[0].title.as_deref(), Some("Open file"));
        assert_eq!(rows[1].role, RowRole::Separator);
        assert_eq!(rows[2].role, RowRole::Presentation);
        assert_eq!(rows[2].label.as_deref(), Some("Sort"));
        assert!(rows[3].checked);
        assert_eq!(rows[3].icon, None);
        assert!(!rows[4].checked);
        assert_eq!(v.interactive_rows().count(), 3);
    }

    #[test]
    fn test_disabled_and_hidden_rows_stay_in_list() {
        let v = view(vec![
            Command::normal("Disabled").with_enabled(false),
            Command::normal("Hidden").with_visible(false),
            Command::separator().with_visible(false),
            Command::normal("Shown"),
        ]);
        let rows = v.rows();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].disabled && !rows[0].hidden);
        assert!(rows[1].disabled && rows[1].hidden && rows[1].aria_hidden());
        assert!(rows[2].hidden);
        assert!(rows[3].is_interactive());
        assert_eq!(rows[1].bounds.height, 0.0);
    }

    #[test]
    fn test_before_render_and_predicates_get_scope() {
        let seen = Rc::new(Cell::new(false));
        let flag = seen.clone();
        let v = view(vec![Command::normal("Rows")
            .before_render(|ctx| {
                let row = ctx.custom_data.and_then(|d| d["row"].as_u64()).unwrap_or(0);
                ctx.menu.label = Some(format!("Row {row}"));
            })
            .enabled_when(move |ctx| {
                flag.set(ctx.target.tag_name() == Some("div"));
                Ok(ctx.root.tag_name() == Some("main"))
            })]);
        assert_eq!(v.rows()[0].label.as_deref(), Some("Row 7"));
        assert!(!v.rows()[0].disabled);
        assert!(seen.get());
    }

    #[test]
    fn test_submenu_indicator() {
        let v = nested_view();
        assert!(v.rows()[0].aria_haspopup());
        assert!(!v.rows()[2].aria_haspopup());
        assert!(v.child().is_none());
    }

    #[test]
    fn test_hover_opens_after_timeout() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        assert_eq!(v.nested_command(), Some("edit"));
        assert!(v.has_pending_open());

        v.tick(t0 + TIMEOUT - Duration::from_millis(1));
        assert!(v.child().is_none());

        v.tick(t0 + TIMEOUT);
        let child = v.child().expect("sub-menu should be open");
        assert_eq!(child.parent_command(), Some("edit"));
        assert_eq!(child.rows().len(), 2);
        assert!(!child.closes_on_outside_click());
        assert!(child.is_opened());
        assert!(child.store().ptr_eq(v.store()));
        assert_eq!(child.target(), v.target());
        assert_eq!(child.workspace(), v.workspace());
        assert_eq!(child.custom_data(), v.custom_data());
    }

    #[test]
    fn test_submenu_anchored_to_row() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 1), t0);
        v.tick(t0 + TIMEOUT);
        let row = v.rows()[1].bounds;
        let child = v.child().unwrap();
        assert_eq!(child.position(), Point::new(row.right() - 4.0, row.y));
    }

    #[test]
    fn test_hovering_same_row_does_not_reschedule() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.pointer_over(center(&v, 0), t0 + Duration::from_millis(200));
        v.tick(t0 + TIMEOUT);
        assert!(v.child().is_some());
    }

    #[test]
    fn test_second_row_replaces_first_submenu() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);
        assert_eq!(v.child().unwrap().parent_command(), Some("edit"));

        let t1 = t0 + Duration::from_secs(1);
        v.pointer_over(center(&v, 1), t1);
        // The previous sub-menu is gone before the new one appears
        assert!(v.child().is_none());
        assert_eq!(v.nested_command(), Some("share"));

        v.tick(t1 + TIMEOUT);
        assert_eq!(v.child().unwrap().parent_command(), Some("share"));
        assert_eq!(v.depth(), 2);
    }

    #[test]
    fn test_pending_open_replaced_by_other_row() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.pointer_over(center(&v, 1), t0 + Duration::from_millis(100));
        v.tick(t0 + TIMEOUT);
        assert!(v.child().is_none());
        v.tick(t0 + Duration::from_millis(100) + TIMEOUT);
        assert_eq!(v.child().unwrap().parent_command(), Some("share"));
    }

    #[test]
    fn test_leaf_hover_closes_after_timeout() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);

        let t1 = t0 + Duration::from_secs(1);
        v.pointer_over(center(&v, 2), t1);
        assert!(v.has_pending_close());
        v.pointer_over(center(&v, 2), t1 + Duration::from_millis(100));
        assert_eq!(v.next_deadline(), Some(t1 + TIMEOUT));

        v.tick(t1 + TIMEOUT - Duration::from_millis(1));
        assert!(v.child().is_some());
        v.tick(t1 + TIMEOUT);
        assert!(v.child().is_none());
        assert_eq!(v.nested_command(), None);
    }

    #[test]
    fn test_returning_to_parent_row_cancels_close() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);

        let t1 = t0 + Duration::from_secs(1);
        v.pointer_over(center(&v, 2), t1);
        v.pointer_over(center(&v, 0), t1 + Duration::from_millis(100));
        assert!(!v.has_pending_close());
        v.tick(t1 + Duration::from_secs(2));
        assert!(v.child().is_some());
    }

    #[test]
    fn test_leaf_hover_without_submenu_is_noop() {
        let mut v = nested_view();
        v.pointer_over(center(&v, 2), Instant::now());
        assert!(!v.has_pending_close());
        assert!(!v.has_pending_open());
    }

    #[test]
    fn test_hover_on_disabled_parent_row_is_ignored() {
        let mut v = view(vec![Command::normal("Edit")
            .with_enabled(false)
            .with_child(Command::normal("Cut"))]);
        v.pointer_over(center(&v, 0), Instant::now());
        assert!(v.nested_command().is_none());
    }

    #[test]
    fn test_select_leaf_triggers() {
        let mut v = nested_view();
        let detail = v.select(2, Instant::now()).expect("leaf should trigger");
        assert_eq!(detail.item, 2);
        assert_eq!(detail.command.id(), "delete");
        assert!(detail.parent.is_none());
    }

    #[test]
    fn test_select_parent_schedules_submenu() {
        let mut v = nested_view();
        let t0 = Instant::now();
        assert!(v.select(0, t0).is_none());
        assert!(v.has_pending_open());
        v.tick(t0 + TIMEOUT);
        assert!(v.child().is_some());
    }

    #[test]
    fn test_select_disabled_does_nothing() {
        let mut v = view(vec![Command::normal("Nope").with_enabled(false)]);
        assert!(v.select(0, Instant::now()).is_none());
    }

    #[test]
    fn test_child_trigger_gets_parent_with_execute() {
        let mut v = view(vec![Command::normal("Sort")
            .with_id("sort")
            .on_execute(|_| {})
            .with_children(vec![
                Command::normal("Name"),
                Command::separator(),
                Command::normal("Date"),
            ])]);
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);

        let point = center(v.child().unwrap(), 2);
        let detail = v.click(point, t0 + TIMEOUT).expect("trigger from sub-menu");
        assert_eq!(detail.item, 2);
        assert_eq!(detail.command.label(), Some("Date"));
        assert_eq!(detail.parent.as_ref().map(|p| p.id()), Some("sort"));
    }

    #[test]
    fn test_child_trigger_without_parent_execute() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);
        let point = center(v.child().unwrap(), 1);
        let detail = v.click(point, t0 + TIMEOUT).unwrap();
        assert_eq!(detail.command.id(), "copy");
        assert!(detail.parent.is_none());
    }

    #[test]
    fn test_nearest_parent_with_execute_wins() {
        let mut v = view(vec![Command::normal("Outer")
            .with_id("outer")
            .on_execute(|_| {})
            .with_child(
                Command::normal("Inner")
                    .with_id("inner")
                    .on_execute(|_| {})
                    .with_child(Command::normal("Leaf").with_id("leaf")),
            )]);
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);
        let inner_row = center(v.child().unwrap(), 0);
        v.pointer_over(inner_row, t0 + TIMEOUT);
        v.tick(t0 + TIMEOUT * 2);
        assert_eq!(v.depth(), 3);

        let leaf = center(v.deepest(), 0);
        let detail = v.click(leaf, t0 + TIMEOUT * 2).unwrap();
        assert_eq!(detail.command.id(), "leaf");
        assert_eq!(detail.parent.as_ref().map(|p| p.id()), Some("inner"));
    }

    #[test]
    fn test_arrow_right_opens_immediately() {
        let mut v = nested_view();
        let now = Instant::now();
        assert!(matches!(v.key_down(&Key::ArrowDown, now), KeyOutcome::Handled));
        assert_eq!(v.focused_row(), Some(0));
        assert!(v.rows()[0].focused);
        assert!(matches!(v.key_down(&Key::ArrowRight, now), KeyOutcome::Handled));

        let child = v.child().expect("opened without waiting");
        assert!(child.is_focused());
        assert!(!v.is_focused());
        assert_eq!(child.focused_row(), Some(0));
        assert!(!v.has_pending_open());
    }

    #[test]
    fn test_arrow_right_on_leaf_is_ignored() {
        let mut v = nested_view();
        let now = Instant::now();
        v.key_down(&Key::ArrowUp, now);
        assert_eq!(v.focused_row(), Some(2));
        assert!(matches!(v.key_down(&Key::ArrowRight, now), KeyOutcome::Ignored));
        assert!(v.child().is_none());
    }

    #[test]
    fn test_arrow_left_closes_submenu_only() {
        let mut v = nested_view();
        let now = Instant::now();
        assert!(matches!(v.key_down(&Key::ArrowLeft, now), KeyOutcome::Ignored));

        v.key_down(&Key::ArrowDown, now);
        v.key_down(&Key::ArrowRight, now);
        assert!(v.child().is_some());

        assert!(matches!(v.key_down(&Key::ArrowLeft, now), KeyOutcome::Handled));
        assert!(v.child().is_none());
        assert!(v.is_focused());
        assert_eq!(v.nested_command(), None);
    }

    #[test]
    fn test_enter_in_submenu_bubbles_trigger() {
        let mut v = nested_view();
        let now = Instant::now();
        v.key_down(&Key::ArrowDown, now);
        v.key_down(&Key::ArrowRight, now);
        v.key_down(&Key::ArrowDown, now);
        match v.key_down(&Key::Enter, now) {
            KeyOutcome::Trigger(detail) => {
                assert_eq!(detail.command.id(), "copy");
                assert_eq!(detail.item, 1);
            }
            other => panic!("expected a trigger, got {other:?}"),
        }
    }

    #[test]
    fn test_hover_teardown_returns_focus() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.key_down(&Key::ArrowDown, t0);
        v.key_down(&Key::ArrowRight, t0);
        assert!(v.child().unwrap().is_focused());

        // Hovering another parent row replaces the focused sub-menu
        v.pointer_over(center(&v, 1), t0);
        assert!(v.is_focused());
        v.tick(t0 + TIMEOUT);
        let child = v.child().unwrap();
        assert_eq!(child.parent_command(), Some("share"));
        assert!(!child.is_focused());

        assert!(matches!(v.key_down(&Key::ArrowDown, t0 + TIMEOUT), KeyOutcome::Handled));
        assert_eq!(v.focused_row(), Some(1));
    }

    #[test]
    fn test_close_task_returns_focus() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.key_down(&Key::ArrowDown, t0);
        v.key_down(&Key::ArrowRight, t0);
        assert!(!v.is_focused());

        v.pointer_over(center(&v, 2), t0);
        v.tick(t0 + TIMEOUT);
        assert!(v.child().is_none());
        assert!(v.is_focused());
        assert!(v.holds_focus());
    }

    #[test]
    fn test_unfocused_teardown_keeps_focus_state() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);
        v.pointer_over(center(&v, 1), t0 + TIMEOUT);
        assert!(v.is_focused());
        assert!(!v.child().is_some_and(ContextMenuView::is_focused));
    }

    #[test]
    fn test_checked_predicate_evaluated_per_render() {
        let store = Store::new();
        store.set("sort", "name");
        let sort_is = |key: &'static str| {
            move |ctx: &LifecycleContext<'_>| -> anyhow::Result<bool> {
                Ok(ctx.store.get("sort") == Some(serde_json::json!(key)))
            }
        };
        let items = normalize(
            vec![
                Command::radio("Name").checked_when(sort_is("name")),
                Command::radio("Size").checked_when(|_| anyhow::bail!("no size column")),
                Command::radio("Date").checked_when(sort_is("date")),
            ],
            &mut SequentialIds::new(),
        );
        let scope = Rc::new(MenuScope {
            store: store.clone(),
            target: Element::new("div"),
            workspace: Element::new("main"),
            custom_data: None,
        });
        let mut v = ContextMenuView::new(
            items,
            scope,
            Rc::new(MenuConfig::default()),
            None,
            Point::new(0.0, 0.0),
        );
        let checked: Vec<bool> = v.rows().iter().map(|row| row.checked).collect();
        assert_eq!(checked, vec![true, true, false]);

        store.set("sort", "date");
        v.render();
        let checked: Vec<bool> = v.rows().iter().map(|row| row.checked).collect();
        assert_eq!(checked, vec![false, true, true]);
    }

    #[test]
    fn test_checked_predicate_failure_fails_open() {
        let v = view(vec![
            Command::radio("Broken").checked_when(|_| anyhow::bail!("store unavailable")),
            Command::radio("Off").checked_when(|_| Ok(false)),
        ]);
        assert!(v.rows()[0].checked);
        assert!(!v.rows()[1].checked);
    }

    #[test]
    fn test_only_root_closes_on_outside_click() {
        let mut v = nested_view();
        assert!(v.closes_on_outside_click());
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);
        assert!(!v.child().unwrap().closes_on_outside_click());
    }

    #[test]
    fn test_close_sub_menu_without_child_is_noop() {
        let mut v = nested_view();
        assert!(!v.close_sub_menu());

        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        assert!(v.close_sub_menu());
        v.tick(t0 + TIMEOUT);
        assert!(v.child().is_none());
    }

    #[test]
    fn test_contains_includes_submenu() {
        let mut v = nested_view();
        let t0 = Instant::now();
        v.pointer_over(center(&v, 0), t0);
        v.tick(t0 + TIMEOUT);
        let child_bounds = v.child().unwrap().bounds();
        let outside_root = Point::new(child_bounds.right() - 1.0, child_bounds.y + 1.0);
        assert!(!v.bounds().contains(outside_root));
        assert!(v.contains(outside_root));
        assert!(!v.contains(Point::new(-5.0, -5.0)));
    }
}
