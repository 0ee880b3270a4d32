use std::time::Instant;

use anyhow::Context;
use menukit::components::context_menu::{ContextMenuView, CustomMenuRequest, InputEvent};
use menukit::components::menu_item::{find_command_mut, Command};
use menukit::{ContextMenu, Element, MenuConfig};

const BUILTIN_COMMANDS: &str = include_str!("../../demos/commands.toml");

fn print_menu(view: &ContextMenuView, depth: usize) {
    let indent = "  ".repeat(depth);
    for row in view.rows() {
        let label = row.label.as_deref().unwrap_or("");
        let mut flags = Vec::new();
        if row.has_children {
            flags.push("submenu");
        }
        if row.checked {
            flags.push("checked");
        }
        if row.disabled {
            flags.push("disabled");
        }
        if row.hidden {
            flags.push("hidden");
        }
        println!(
            "{indent}{:?} {:<12} id={} y={:.0} {}",
            row.role,
            label,
            row.id,
            row.bounds.y,
            flags.join(",")
        );
    }
    if let Some(child) = view.child() {
        println!("{indent}-> sub-menu of {}", child.parent_command().unwrap_or("?"));
        print_menu(child, depth + 1);
    }
}

fn main() -> anyhow::Result<()> {
    if let Ok(env_filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("info")
            .compact()
            .init();
    }

    let source = match std::env::args().nth(1) {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?
        }
        None => BUILTIN_COMMANDS.to_string(),
    };
    let mut commands = Command::list_from_toml(&source).context("parsing commands")?;
    if let Some(rename) = find_command_mut(&mut commands, "rename") {
        *rename = rename
            .clone()
            .enabled_when(|ctx| Ok(ctx.store.contains("selection")));
    }
    if let Some(new_file) = find_command_mut(&mut commands, "new-file") {
        *new_file = new_file.clone().on_execute(|ctx| {
            tracing::info!("create file at {:?}", ctx.click_point);
        });
    }

    let config = MenuConfig::load();
    let timeout = config.sub_menu_timeout();
    let workspace = Element::new("main");
    let mut menu = ContextMenu::new(workspace).with_config(config);
    menu.on_execute(|detail| tracing::info!("execute {} (no action)", detail.id));
    menu.connect();
    menu.register_commands(commands);

    let start = Instant::now();
    let request = CustomMenuRequest::new("root").at(20.0, 20.0);
    menu.handle_event(InputEvent::CustomMenu(request), start);

    let Some(view) = menu.current_menu() else {
        println!("no commands for root");
        return Ok(());
    };
    print_menu(view, 0);

    let hover = view
        .rows()
        .iter()
        .find(|row| row.has_children && row.is_interactive())
        .map(|row| row.bounds);
    if let Some(bounds) = hover {
        let point = (bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0);
        menu.handle_event(InputEvent::PointerMove(point.into()), start);
        menu.tick(start + timeout);
        if let Some(view) = menu.current_menu() {
            println!();
            print_menu(view, 0);
        }
    }

    menu.destroy();
    Ok(())
}
