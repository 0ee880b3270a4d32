mod command;
mod data;
mod normalizer;

pub use command::{find_command_mut, Command, CommandType};
pub use data::{
    Action, CommandTarget, ExecuteContext, Icon, LifecycleContext, MenuItem, MenuItemKind,
    MenuScope, Predicate, PredicateFn, RenderContext, RenderHook, RowDisplay,
};
pub use normalizer::{normalize, IdGenerator, SequentialIds};
