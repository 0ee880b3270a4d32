//! Headless contextual menus
//!
//! Declare [`Command`]s with a target name, hand input events to a
//! [`ContextMenu`], draw the rows of [`ContextMenu::current_menu`] and call
//! [`ContextMenu::tick`] when [`ContextMenu::next_deadline`] passes.

pub mod common;
pub mod components;
pub mod config;
pub mod element;
pub mod error;
pub mod store;

// Re-export commonly used items
pub use components::context_menu::{ContextMenu, ContextMenuView, InputEvent, RenderedRow};
pub use components::menu_item::{Command, MenuItem};
pub use config::MenuConfig;
pub use element::Element;
pub use error::MenuError;
pub use store::Store;

/// Convenience prelude for hosts
pub mod prelude {
    pub use crate::common::{Point, Rect};
    pub use crate::components::context_menu::{
        ClickEvent, ContextMenu, ContextMenuStyle, ContextMenuView, CustomMenuRequest,
        EventStatus, ExecuteDetail, InputEvent, Key, PointerEvent, RenderedRow, RowRole,
        TargetResolver,
    };
    pub use crate::components::menu_item::{
        Command, CommandTarget, CommandType, ExecuteContext, LifecycleContext, MenuItem,
        MenuItemKind, RenderContext,
    };
    pub use crate::config::MenuConfig;
    pub use crate::element::Element;
    pub use crate::store::Store;
}
