//! Built-in commands.
//!
//! | Key             | Usage                          |
//! |-----------------|--------------------------------|
//! | `help`          | `help [command]`               |
//! | `alias`         | `alias <key> [definition...]`  |
//! | `unalias`       | `unalias <key>`                |
//! | `aliases`       | `aliases`                      |
//! | `reset_aliases` | `reset_aliases`                |
//! | `echo`          | `echo [words...]`              |
//! | `clear`         | `clear`                        |
//! | `history`       | `history`                      |
//! | `cheats`        | `cheats [bool]`                |

use devcon_core::{CommandError, FromValue, ParamType, Value};

use crate::call::{CallContext, NativeFn};
use crate::discovery::CommandSet;
use crate::member::{AccessorDef, CommandProperties, Member, MethodDef};
use crate::output::Severity;

/// Module name of the built-in command set.
pub const MODULE: &str = "devcon::builtins";

/// The built-in commands, ready to install.
pub fn command_set() -> CommandSet {
    let mut set = CommandSet::new(MODULE);

    let help = || {
        CommandProperties::new("help")
            .description("List commands, or show how to use one")
            .priority(100)
    };
    set.native(
        help().autofill(|request| {
            (request.param_index == 0)
                .then(|| request.match_command_key())
                .flatten()
        }),
        &[],
        list_commands,
    )
    .method_def(
        help(),
        MethodDef::new(&[ParamType::String], NativeFn::new(describe_command)).named(["command"]),
    );

    set.catch_all(
        CommandProperties::new("alias")
            .description("Define an alias, or show one")
            .priority(90),
        define_alias,
    )
    .method_def(
        CommandProperties::new("unalias")
            .description("Remove an alias")
            .autofill(|request| {
                (request.param_index == 0)
                    .then(|| request.match_alias_key())
                    .flatten()
            }),
        MethodDef::new(&[ParamType::String], NativeFn::new(remove_alias)).named(["key"]),
    )
    .native(
        CommandProperties::new("aliases").description("List aliases"),
        &[],
        list_aliases,
    )
    .native(
        CommandProperties::new("reset_aliases").description("Remove every alias"),
        &[],
        |ctx| {
            ctx.console().reset_aliases();
            ctx.console().log("All aliases removed", Severity::Info);
            Ok(())
        },
    );

    set.catch_all(
        CommandProperties::new("echo").description("Print the arguments"),
        |ctx| {
            let text = ctx
                .args()
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            ctx.console().log(text, Severity::Info);
            Ok(())
        },
    )
    .native(
        CommandProperties::new("clear").description("Clear the output"),
        &[],
        |ctx| {
            ctx.console().clear_output();
            Ok(())
        },
    )
    .native(
        CommandProperties::new("history").description("Show recent input, newest first"),
        &[],
        |ctx| {
            let console = ctx.console();
            let lines: Vec<String> = console.history().iter().map(str::to_string).collect();
            for line in lines {
                console.log(line, Severity::Info);
            }
            Ok(())
        },
    );

    let cheats = AccessorDef::new(ParamType::Bool)
        .with_getter(|ctx| Ok(Value::Bool(ctx.console().cheats_enabled())))
        .with_setter(|ctx, value| {
            let enabled = bool::from_value(&value)?;
            ctx.console().set_cheats(enabled);
            Ok(())
        });
    set.add(
        CommandProperties::new("cheats").description("Whether cheat commands may run"),
        Member::Property(cheats),
    );

    set
}

fn list_commands(ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
    let console = ctx.console();
    let lines: Vec<String> = console
        .registry()
        .enumerate(console.cheats_enabled())
        .into_iter()
        .map(|command| {
            if command.description().is_empty() {
                command.key().to_string()
            } else {
                format!("{} - {}", command.key(), command.description())
            }
        })
        .collect();
    for line in lines {
        console.log(line, Severity::Info);
    }
    Ok(())
}

fn describe_command(ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
    let key: String = ctx.arg(0)?;
    let console = ctx.console();
    let command = console
        .registry()
        .get(&key)
        .filter(|c| !c.is_hidden())
        .ok_or_else(|| CommandError::other(format!("no command named '{key}'")))?;

    let mut lines = vec![command.name().to_string()];
    if !command.description().is_empty() {
        lines.push(command.description().to_string());
    }
    if command.is_cheat() {
        lines.push("(requires cheats)".to_string());
    }
    lines.extend(command.usage().lines().map(|l| format!("  {l}")));
    for line in lines {
        console.log(line, Severity::Info);
    }
    Ok(())
}

fn define_alias(ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
    let Some(key) = ctx.args().first().and_then(Value::as_str).map(str::to_string) else {
        return Err(CommandError::other("usage: alias <key> [definition...]"));
    };

    if ctx.arg_count() == 1 {
        let console = ctx.console();
        let definition = console
            .aliases()
            .get(&key)
            .map(str::to_string)
            .ok_or_else(|| CommandError::other(format!("no alias named '{key}'")))?;
        console.log(format!("{key} = {definition}"), Severity::Info);
        return Ok(());
    }

    let definition = ctx.raw_args().get(1..).unwrap_or_default().join(" ");
    let console = ctx.console();
    let added = console
        .set_alias(&key, definition)
        .map_err(|err| CommandError::other(err.to_string()))?;
    let message = if added {
        format!("+ Added alias '{key}'")
    } else {
        format!("* Modified alias '{key}'")
    };
    console.log(message, Severity::Info);
    Ok(())
}

fn remove_alias(ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
    let key: String = ctx.arg(0)?;
    let console = ctx.console();
    if !console.remove_alias(&key) {
        return Err(CommandError::other(format!("no alias named '{key}'")));
    }
    console.log(format!("- Removed alias '{key}'"), Severity::Info);
    Ok(())
}

fn list_aliases(ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
    let console = ctx.console();
    if console.aliases().is_empty() {
        console.log("No aliases", Severity::Info);
        return Ok(());
    }
    let lines: Vec<String> = console
        .aliases()
        .iter()
        .map(|(key, definition)| format!("{key} = {definition}"))
        .collect();
    for line in lines {
        console.log(line, Severity::Info);
    }
    Ok(())
}
