mod context_menu;
mod events;
mod resolver;
mod state;
mod style;
mod task;
mod view;

pub use context_menu::{ContextMenu, TriggerInfo, ACTIVE_ATTRIBUTE};
pub use events::{
    ClickEvent, CustomMenuRequest, EventStatus, ExecuteDetail, InputEvent, Key, PointerEvent,
    TriggerDetail,
};
pub use resolver::{
    default_target_name, AncestorTargetResolver, DefaultTargetResolver, TargetResolver,
};
pub use state::ListState;
pub use style::ContextMenuStyle;
pub use task::{ScheduledTask, TaskSlot};
pub use view::{ContextMenuView, KeyOutcome, RenderedRow, RowRole};
