//! End-to-end tests of the console pipeline.

use std::cell::RefCell;
use std::rc::Rc;

use devcon::{
    AliasStore, CallContext, CommandError, CommandProperties, CommandSet, Console, ConsoleConfig,
    ExecutionError, JsonAliasStore, Member, MethodDef, NativeFn, Outcome, ParamType, Severity,
    Substitution, ValidState, Value, cleanse_key,
};
use devcon_parser::{split_statements, split_words};
use rustc_hash::FxHashSet;

fn quiet() -> ConsoleConfig {
    ConsoleConfig {
        echo_input: false,
        ..ConsoleConfig::default()
    }
}

fn output(console: &Console) -> Vec<String> {
    console.output().lines().map(|l| l.message.clone()).collect()
}

/// Run `input` and return only the lines it produced.
fn run(console: &mut Console, input: &str) -> Vec<String> {
    console.clear_output();
    console.run_input(input);
    output(console)
}

/// A command whose overloads report which one ran.
fn overloads() -> CommandSet {
    let mut set = CommandSet::new("test");
    set.method(CommandProperties::new("key"), || "f()")
        .method(CommandProperties::new("key"), |_: i64| "f(int)")
        .method(CommandProperties::new("key"), |_: f64| "f(float)")
        .method(CommandProperties::new("key"), |_: String| "f(string)")
        .method(CommandProperties::new("pair"), |a: i64, b: f64| format!("{a} {b:?}"));
    set
}

struct Player {
    health: i64,
}

// ============================================================================
// Tokenizing
// ============================================================================

#[test]
fn test_cleanse_examples_and_idempotence() {
    assert_eq!(cleanse_key("KEY NAME 123"), "key_name_123");
    assert_eq!(cleanse_key("k#e$y-_&na=m+e?"), "key_name");
    for raw in ["Hello World", "__x__", "ÄBC d", "   ", "a;b\"c"] {
        let once = cleanse_key(raw);
        assert_eq!(cleanse_key(&once), once);
    }
}

#[test]
fn test_split_without_separator_is_identity() {
    for input in ["phrase", "echo \"quoted words\"", "a b c", "x\\y"] {
        assert_eq!(split_statements(input), vec![input.to_string()]);
    }
}

#[test]
fn test_split_statements_escapes_and_quotes() {
    let input = "phrase;echo \"semicolon is ;\";echo \"escape with \\;\";echo \\;;";
    assert_eq!(
        split_statements(input),
        vec![
            "phrase",
            "echo \"semicolon is ;\"",
            "echo \"escape with \\;\"",
            "echo ;",
        ]
    );
}

#[test]
fn test_split_words_literal_flag() {
    let words = split_words("key \"first second\" third");
    let args: Vec<_> = words[1..].iter().map(|w| (w.text.as_str(), w.literal)).collect();
    assert_eq!(args, vec![("first second", true), ("third", false)]);
}

// ============================================================================
// Resolution and execution
// ============================================================================

#[test]
fn test_overload_selection() {
    let mut console = Console::new(quiet());
    console.install(&overloads());

    assert_eq!(run(&mut console, "key"), vec!["f()"]);
    assert_eq!(run(&mut console, "key 5"), vec!["f(int)"]);
    assert_eq!(run(&mut console, "key 5.5"), vec!["f(float)"]);
    assert_eq!(run(&mut console, "key five"), vec!["f(string)"]);
    assert_eq!(run(&mut console, "key \"5\""), vec!["f(string)"]);
    assert_eq!(run(&mut console, "pair 5 3"), vec!["5 3.0"]);
}

#[test]
fn test_typed_trailing_argument_decides_overload() {
    let mut set = CommandSet::new("test");
    set.method(CommandProperties::new("key"), |_: i64, _: String| "f(int,string)")
        .method(CommandProperties::new("key"), |_: String, _: i64| "f(string,int)");
    let mut console = Console::new(quiet());
    console.install(&set);

    assert_eq!(run(&mut console, "key 5 6"), vec!["f(string,int)"]);
    assert_eq!(run(&mut console, "key 5 six"), vec!["f(int,string)"]);
}

#[test]
fn test_defaults_and_named_parameters() {
    let mut set = CommandSet::new("test");
    set.method_def(
        CommandProperties::new("spawn"),
        MethodDef::new(
            &[ParamType::String, ParamType::Int],
            NativeFn::new(|ctx: &mut CallContext<'_>| {
                let name: String = ctx.arg(0)?;
                let count: i64 = ctx.arg(1)?;
                ctx.set_return(format!("{count}x {name}"));
                Ok(())
            }),
        )
        .named(["enemy", "count"])
        .with_default(1, 1),
    );
    let mut console = Console::new(quiet());
    console.install(&set);

    assert_eq!(run(&mut console, "spawn orc"), vec!["1x orc"]);
    assert_eq!(run(&mut console, "spawn orc 3"), vec!["3x orc"]);
    assert_eq!(
        console.registry().get("spawn").map(|c| c.usage().to_string()),
        Some("spawn <string enemy> [int count = 1]".to_string())
    );
}

#[test]
fn test_instance_commands() {
    let mut set = CommandSet::new("game");
    set.instance_method(CommandProperties::new("heal"), |p: &mut Player, amount: i64| {
        p.health += amount;
        p.health
    })
    .instance_field(
        CommandProperties::new("health"),
        |p: &Player| p.health,
        |p: &mut Player, v: i64| p.health = v,
    );

    let mut console = Console::new(quiet());
    console.install(&set);
    let hero = Rc::new(RefCell::new(Player { health: 10 }));
    console.instances().register("Hero", &hero);

    assert_eq!(run(&mut console, "heal her 5"), vec!["15"]);
    assert_eq!(run(&mut console, "health hero"), vec!["health = 15"]);
    assert_eq!(run(&mut console, "health hero 99"), vec!["health set to 99"]);
    assert_eq!(hero.borrow().health, 99);

    assert_eq!(
        console.run_statement("heal villain 5"),
        Err(ExecutionError::InvocationWasInvalid(ValidState::ErrorNoInstanceTarget))
    );
    drop(hero);
    assert_eq!(
        console.resolve("heal hero 5").state(),
        ValidState::ErrorNoInstanceTarget
    );
}

#[test]
fn test_failures_never_escape() {
    let mut set = CommandSet::new("test");
    set.native(CommandProperties::new("boom"), &[], |_| panic!("boom"))
        .method(CommandProperties::new("god").cheat(), || ());
    let mut console = Console::new(quiet());
    console.install(&set);

    console.run_input("boom; god; nothing; boom 1");
    let severities: Vec<_> = console.output().lines().map(|l| l.severity).collect();
    assert!(!severities.is_empty());
    assert!(severities.iter().all(|s| *s == Severity::Error || *s == Severity::Info));
    assert_eq!(
        console.run_statement("god"),
        Err(ExecutionError::RequiresCheats { key: "god".into() })
    );
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_cheat_flag_merges_across_overloads() {
    let mut console = Console::new(quiet());
    let mut set = CommandSet::new("test");
    set.method(CommandProperties::new("give"), |_: i64| ())
        .method(CommandProperties::new("give").cheat(), |_: String| ());
    console.install(&set);
    assert!(console.registry().get("give").is_some_and(|c| c.is_cheat()));
}

#[test]
fn test_removing_only_method_removes_key() {
    let mut console = Console::new(quiet());
    let def = MethodDef::new(&[], NativeFn::new(|_: &mut CallContext<'_>| Ok(())));
    let id = def.id();
    console
        .register(CommandProperties::new("solo"), Member::Method(def))
        .unwrap();
    console.registry_mut().unregister_method("solo", id).unwrap();
    assert!(console.registry().get("solo").is_none());
    assert_eq!(
        console.run_statement("solo"),
        Err(ExecutionError::InvocationWasInvalid(ValidState::ErrorNoCommandFound))
    );
}

#[test]
fn test_priority_ordering() {
    let mut set = CommandSet::new("test");
    for (key, priority) in [("c", 70), ("b2", 80), ("a", 90), ("b1", 80)] {
        set.method(CommandProperties::new(key).priority(priority), || ());
    }
    let mut console = Console::new(quiet());
    console.install(&set);
    let keys: Vec<_> = console
        .registry()
        .enumerate(false)
        .into_iter()
        .map(|c| c.key().to_string())
        .collect();
    assert_eq!(keys, vec!["a", "b1", "b2", "c"]);
}

// ============================================================================
// Aliases
// ============================================================================

#[test]
fn test_alias_conflict_runs_command() {
    let mut console = Console::with_builtins(quiet());
    console.set_alias("echo", "history").unwrap();
    assert!(matches!(
        console.aliases().substitute("echo hi", console.registry()),
        Substitution::CommandConflict { .. }
    ));
    let lines = run(&mut console, "echo hi");
    assert_eq!(lines.last().map(String::as_str), Some("hi"));
}

#[test]
fn test_aliases_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("aliases.json");
    let config = ConsoleConfig {
        alias_file: Some(path.clone()),
        ..quiet()
    };

    let mut console = Console::with_builtins(config.clone());
    assert!(console.aliases().is_empty());
    run(&mut console, "alias hi echo hello");
    drop(console);

    let stored = JsonAliasStore::new(&path).load().unwrap();
    assert_eq!(stored.get("hi").map(String::as_str), Some("echo hello"));

    let mut console = Console::with_builtins(config);
    assert_eq!(run(&mut console, "hi world"), vec!["hello world"]);
}

#[test]
fn test_corrupt_alias_file_resets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aliases.json");
    std::fs::write(&path, "{ not json").unwrap();

    let console = Console::new(ConsoleConfig {
        alias_file: Some(path.clone()),
        ..quiet()
    });
    assert!(console.aliases().is_empty());
    assert!(JsonAliasStore::new(&path).load().unwrap().is_empty());
}

// ============================================================================
// Autofill
// ============================================================================

#[test]
fn test_autofill_cycles_then_exhausts() {
    let mut set = CommandSet::new("test");
    for key in ["ad", "ac", "ab"] {
        set.method(CommandProperties::new(key), || ());
    }
    let mut console = Console::new(quiet());
    console.install(&set);

    let mut exclusions = FxHashSet::default();
    let mut offered = Vec::new();
    for _ in 0..3 {
        let suggestion = console.autofill("a", &exclusions).unwrap();
        exclusions.insert(suggestion.value.clone());
        offered.push(suggestion.value);
    }
    assert_eq!(offered, vec!["ab", "ac", "ad"]);
    assert!(console.autofill("a", &exclusions).is_none());

    exclusions.clear();
    assert_eq!(console.autofill("a", &exclusions).map(|s| s.value).as_deref(), Some("ab"));
}

#[test]
fn test_autofill_hides_cheats_until_enabled() {
    let mut set = CommandSet::new("test");
    set.method(CommandProperties::new("noclip").cheat(), || ());
    let mut console = Console::new(quiet());
    console.install(&set);

    assert!(console.autofill("no", &FxHashSet::default()).is_none());
    console.set_cheats(true);
    assert_eq!(
        console.autofill("no", &FxHashSet::default()).map(|s| s.value).as_deref(),
        Some("noclip")
    );
}

#[test]
fn test_autofill_instance_names() {
    let mut set = CommandSet::new("game");
    set.instance_method(CommandProperties::new("kill"), |p: &mut Player| p.health = 0);
    let mut console = Console::new(quiet());
    console.install(&set);
    let hero = Rc::new(RefCell::new(Player { health: 1 }));
    console.instances().register("Hero Of Time", &hero);

    assert_eq!(
        console.autofill_next("kill h").as_deref(),
        Some("kill \"Hero Of Time\"")
    );
    console.run_input("kill \"hero of time\"");
    assert_eq!(hero.borrow().health, 0);
}

#[test]
fn test_autofill_callback_panic_is_contained() {
    let mut set = CommandSet::new("test");
    set.method(
        CommandProperties::new("give").autofill(|_| panic!("no items")),
        |_: String| (),
    );
    let mut console = Console::new(quiet());
    console.install(&set);

    assert!(console.autofill("give s", &FxHashSet::default()).is_none());
    assert_eq!(console.autofill_next("give s"), None);
    assert!(console.run_statement("give sword").is_ok());
}

#[test]
fn test_run_statement_outcomes() {
    let mut console = Console::with_builtins(quiet());
    assert_eq!(
        console.run_statement("cheats"),
        Ok(Outcome::Read(Value::Bool(false)))
    );
    assert!(matches!(
        console.run_statement("cheats yes"),
        Err(ExecutionError::Exception(CommandError::Conversion(_)))
    ));
}
