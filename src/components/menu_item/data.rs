use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::common::Point;
use crate::element::Element;
use crate::store::Store;

/// Type of menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    Normal,
    Separator,
    Label,
    Radio,
}

impl MenuItemKind {
    /// Rows the user can hover, focus and select
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Normal | Self::Radio)
    }
}

/// Opaque icon handle; the host maps it to an asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Icon(pub String);

impl From<&str> for Icon {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// What a top-level command declares it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandTarget {
    Single(String),
    List(Vec<String>),
}

impl CommandTarget {
    /// Sentinel matching every target name
    pub const ALL: &'static str = "all";
    /// Name of the workspace itself
    pub const ROOT: &'static str = "root";

    pub fn all() -> Self {
        Self::Single(Self::ALL.to_string())
    }

    pub fn root() -> Self {
        Self::Single(Self::ROOT.to_string())
    }

    /// Exact string match against `name` or the `all` sentinel
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Single(target) => target == Self::ALL || target == name,
            Self::List(targets) => targets.iter().any(|t| t == Self::ALL || t == name),
        }
    }
}

impl From<&str> for CommandTarget {
    fn from(name: &str) -> Self {
        Self::Single(name.to_string())
    }
}

impl From<String> for CommandTarget {
    fn from(name: String) -> Self {
        Self::Single(name)
    }
}

impl From<Vec<String>> for CommandTarget {
    fn from(names: Vec<String>) -> Self {
        Self::List(names)
    }
}

impl<const N: usize> From<[&str; N]> for CommandTarget {
    fn from(names: [&str; N]) -> Self {
        Self::List(names.iter().map(|n| n.to_string()).collect())
    }
}

// === Lifecycle contexts ===

/// Everything a view injects into the callbacks of its items
///
/// One scope is created per menu build and shared by every nested view.
#[derive(Debug, Clone)]
pub struct MenuScope {
    pub store: Store,
    pub target: Element,
    pub workspace: Element,
    pub custom_data: Option<Value>,
}

impl MenuScope {
    pub fn lifecycle<'a>(&'a self, id: &'a str) -> LifecycleContext<'a> {
        LifecycleContext {
            id,
            store: &self.store,
            target: &self.target,
            root: &self.workspace,
            custom_data: self.custom_data.as_ref(),
        }
    }
}

/// Passed to `visible`, `enabled` and `checked` predicates
#[derive(Debug, Clone, Copy)]
pub struct LifecycleContext<'a> {
    pub id: &'a str,
    pub store: &'a Store,
    /// The element that triggered the menu
    pub target: &'a Element,
    /// The workspace the controller is bound to
    pub root: &'a Element,
    pub custom_data: Option<&'a Value>,
}

/// Passed to `execute` actions
#[derive(Debug, Clone, Copy)]
pub struct ExecuteContext<'a> {
    pub id: &'a str,
    pub store: &'a Store,
    pub target: &'a Element,
    pub root: &'a Element,
    pub click_point: Point,
    pub custom_data: Option<&'a Value>,
    /// Position of the selected row among its siblings, set when a parent
    /// action runs on behalf of a child without one. Counts separators.
    pub selected_subcommand: Option<usize>,
    /// The item the user selected
    pub item: &'a MenuItem,
}

/// The fields of a row that `before_render` may rewrite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowDisplay {
    pub label: Option<String>,
    pub title: Option<String>,
    pub icon: Option<Icon>,
}

/// Passed to `before_render` hooks
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub id: &'a str,
    pub store: &'a Store,
    pub target: &'a Element,
    pub root: &'a Element,
    pub custom_data: Option<&'a Value>,
    pub menu: &'a mut RowDisplay,
}

pub type PredicateFn = dyn Fn(&LifecycleContext<'_>) -> anyhow::Result<bool>;
pub type Action = Rc<dyn Fn(&ExecuteContext<'_>)>;
pub type RenderHook = Rc<dyn Fn(&mut RenderContext<'_>)>;

/// A boolean item property: fixed, or computed per render
#[derive(Clone)]
pub enum Predicate {
    Flag(bool),
    Dynamic(Rc<PredicateFn>),
}

impl Predicate {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&LifecycleContext<'_>) -> anyhow::Result<bool> + 'static,
    {
        Self::Dynamic(Rc::new(f))
    }

    /// Evaluate the predicate; a failing predicate counts as `true`
    pub fn evaluate(&self, ctx: &LifecycleContext<'_>, property: &str) -> bool {
        match self {
            Self::Flag(value) => *value,
            Self::Dynamic(f) => match f(ctx) {
                Ok(value) => value,
                Err(err) => {
                    warn!("`{property}` predicate of command {} failed: {err:#}", ctx.id);
                    true
                }
            },
        }
    }
}

impl From<bool> for Predicate {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(value) => write!(f, "Flag({value})"),
            Self::Dynamic(_) => write!(f, "Dynamic"),
        }
    }
}

/// A normalized, renderable command
///
/// Built by the normalizer only; `children` is either absent or non-empty.
#[derive(Clone)]
pub struct MenuItem {
    pub(crate) kind: MenuItemKind,
    pub(crate) id: String,
    pub(crate) target: Option<CommandTarget>,
    pub(crate) label: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) icon: Option<Icon>,
    pub(crate) children: Option<Vec<Rc<MenuItem>>>,
    pub(crate) visible: Option<Predicate>,
    pub(crate) enabled: Option<Predicate>,
    pub(crate) checked: Option<Predicate>,
    pub(crate) execute: Option<Action>,
    pub(crate) before_render: Option<RenderHook>,
}

impl std::fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("target", &self.target)
            .field("label", &self.label)
            .field("children", &self.children)
            .field("has_execute", &self.execute.is_some())
            .finish()
    }
}

impl MenuItem {
    // === Getters ===

    pub fn kind(&self) -> MenuItemKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> Option<&CommandTarget> {
        self.target.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn icon(&self) -> Option<&Icon> {
        self.icon.as_ref()
    }

    pub fn children(&self) -> Option<&[Rc<MenuItem>]> {
        self.children.as_deref()
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn has_execute(&self) -> bool {
        self.execute.is_some()
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuItemKind::Separator
    }

    // === Lifecycle ===

    pub fn is_visible(&self, scope: &MenuScope) -> bool {
        self.visible
            .as_ref()
            .is_none_or(|p| p.evaluate(&scope.lifecycle(&self.id), "visible"))
    }

    pub fn is_enabled(&self, scope: &MenuScope) -> bool {
        self.enabled
            .as_ref()
            .is_none_or(|p| p.evaluate(&scope.lifecycle(&self.id), "enabled"))
    }

    /// Unset `checked` means unchecked
    pub fn is_checked(&self, scope: &MenuScope) -> bool {
        self.checked
            .as_ref()
            .is_some_and(|p| p.evaluate(&scope.lifecycle(&self.id), "checked"))
    }

    /// The display fields after running `before_render`
    pub fn render_display(&self, scope: &MenuScope) -> RowDisplay {
        let mut display = RowDisplay {
            label: self.label.clone(),
            title: self.title.clone(),
            icon: self.icon.clone(),
        };
        if let Some(hook) = &self.before_render {
            hook(&mut RenderContext {
                id: &self.id,
                store: &scope.store,
                target: &scope.target,
                root: &scope.workspace,
                custom_data: scope.custom_data.as_ref(),
                menu: &mut display,
            });
        }
        display
    }

    /// Run this item's action on behalf of `selected`
    ///
    /// Returns false when the item has no action.
    pub fn trigger(
        &self,
        selected: &MenuItem,
        scope: &MenuScope,
        click_point: Point,
        selected_subcommand: Option<usize>,
    ) -> bool {
        let Some(execute) = &self.execute else {
            return false;
        };
        execute(&ExecuteContext {
            id: &self.id,
            store: &scope.store,
            target: &scope.target,
            root: &scope.workspace,
            click_point,
            custom_data: scope.custom_data.as_ref(),
            selected_subcommand,
            item: selected,
        });
        true
    }
}
