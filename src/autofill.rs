//! Autofill resolution.
//!
//! Given the full input buffer, computes the single next completion and the
//! byte offset it replaces from. Only the last statement of the buffer is
//! considered.
//!
//! - A lone, unfinished first word completes to an alias key or, failing
//!   that, a visible command key. Aliases are offered first.
//! - The instance-target word of an instance command completes to the name
//!   of a live instance.
//! - Any later word is delegated to the command's autofill callback.
//!
//! Every candidate in the exclusion set is skipped, so repeating the request
//! with each accepted value excluded cycles through the candidates.
//! [`AutofillSession`] does that bookkeeping.

use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashSet;
use tracing::error;

use devcon_core::cleanse_key;
use devcon_parser::{Word, ends_with_delimiter, split_statements_raw, split_words};

use crate::alias::AliasTable;
use crate::instance::InstanceFinder;
use crate::member::Instance;
use crate::registry::{Command, CommandRegistry};

/// A completion and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutofillSuggestion {
    /// Replacement text.
    pub value: String,
    /// Byte offset in the buffer where `value` starts; everything after it is
    /// replaced.
    pub start: usize,
}

impl AutofillSuggestion {
    /// The buffer with the suggestion applied.
    pub fn apply(&self, buffer: &str) -> String {
        let keep = buffer.get(..self.start).unwrap_or(buffer);
        format!("{keep}{}", self.value)
    }
}

/// Context handed to a command's autofill callback.
pub struct AutofillRequest<'a> {
    /// Words of the statement being completed.
    pub words: &'a [Word],
    /// Index into `words` of the word being completed. Equal to
    /// `words.len()` when the user has started a new, empty word.
    pub word_index: usize,
    /// Declared parameter position of that word.
    pub param_index: usize,
    /// Text of the word typed so far.
    pub partial: &'a str,
    pub exclusions: &'a FxHashSet<String>,
    /// Resolved instance for instance commands, if the target word matched.
    pub target: Option<&'a Instance>,
    pub registry: &'a CommandRegistry,
    pub aliases: &'a AliasTable,
    /// Whether cheat commands are visible.
    pub include_cheats: bool,
}

impl AutofillRequest<'_> {
    /// First candidate starting with the partial word (ignoring case) that
    /// has not been offered yet.
    pub fn first_match<'c, I>(&self, candidates: I) -> Option<String>
    where
        I: IntoIterator<Item = &'c str>,
    {
        first_prefix_match(candidates, self.partial, self.exclusions)
    }

    /// Visible command keys matching the partial word.
    pub fn match_command_key(&self) -> Option<String> {
        self.first_match(
            self.registry
                .enumerate(self.include_cheats)
                .into_iter()
                .map(Command::key),
        )
    }

    /// Alias keys matching the partial word.
    pub fn match_alias_key(&self) -> Option<String> {
        self.first_match(self.aliases.keys())
    }
}

fn first_prefix_match<'c, I>(candidates: I, partial: &str, exclusions: &FxHashSet<String>) -> Option<String>
where
    I: IntoIterator<Item = &'c str>,
{
    let partial = partial.to_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.to_lowercase().starts_with(&partial))
        .find(|c| !exclusions.contains(*c) && !exclusions.contains(&quote_if_needed(c)))
        .map(str::to_string)
}

/// Quote a value containing a space unless it is already quoted.
pub fn quote_if_needed(value: &str) -> String {
    if value.contains(' ') && !value.starts_with('"') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Everything the engine reads.
pub struct AutofillContext<'a> {
    pub registry: &'a CommandRegistry,
    pub aliases: &'a AliasTable,
    pub finder: &'a mut dyn InstanceFinder,
    pub include_cheats: bool,
    /// Suggestion for an empty buffer.
    pub default_value: &'a str,
}

/// Compute the next completion for `buffer`.
///
/// A panic in an autofill callback or the instance finder yields no
/// suggestion.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn suggest(
    buffer: &str,
    exclusions: &FxHashSet<String>,
    ctx: AutofillContext<'_>,
) -> Option<AutofillSuggestion> {
    panic::catch_unwind(AssertUnwindSafe(|| suggest_unguarded(buffer, exclusions, ctx)))
        .unwrap_or_else(|_| {
            error!(buffer, "autofill panicked");
            None
        })
}

fn suggest_unguarded(
    buffer: &str,
    exclusions: &FxHashSet<String>,
    mut ctx: AutofillContext<'_>,
) -> Option<AutofillSuggestion> {
    if buffer.is_empty() {
        if ctx.default_value.is_empty() || exclusions.contains(ctx.default_value) {
            return None;
        }
        return Some(AutofillSuggestion {
            value: ctx.default_value.to_string(),
            start: 0,
        });
    }

    let statements = split_statements_raw(buffer);
    let last = statements.last()?;
    let words = split_words(last.text);
    let first = words.first()?;
    let trailing = ends_with_delimiter(last.text, &words);

    if words.len() == 1 && !trailing {
        let partial = cleanse_key(&first.text);
        let keys = ctx
            .aliases
            .keys()
            .chain(ctx.registry.enumerate(ctx.include_cheats).into_iter().map(Command::key));
        let value = first_prefix_match(keys, &partial, exclusions)?;
        return Some(AutofillSuggestion {
            value,
            start: last.offset + first.start,
        });
    }

    let command = ctx.registry.get(&first.text)?;
    if command.is_cheat() && !ctx.include_cheats {
        return None;
    }

    let (word_index, partial, start) = if trailing {
        (words.len(), "", last.offset + last.text.len())
    } else {
        let current = &words[words.len() - 1];
        (words.len() - 1, current.text.as_str(), last.offset + current.start)
    };

    let mut target = None;
    let param_index = if command.is_static() {
        word_index - 1
    } else {
        let ty = command.declaring_type()?;
        if word_index == 1 {
            let names = ctx.finder.names(ty);
            let value = first_prefix_match(names.iter().map(String::as_str), partial, exclusions)?;
            return Some(AutofillSuggestion {
                value: quote_if_needed(&value),
                start,
            });
        }
        target = ctx.finder.find(ty, &words[1].text);
        word_index - 2
    };

    let callback = command.autofill()?;
    let request = AutofillRequest {
        words: &words,
        word_index,
        param_index,
        partial,
        exclusions,
        target: target.as_ref(),
        registry: ctx.registry,
        aliases: ctx.aliases,
        include_cheats: ctx.include_cheats,
    };
    let value = quote_if_needed(&callback(&request)?);
    if exclusions.contains(&value) {
        return None;
    }
    Some(AutofillSuggestion { value, start })
}

/// Cycling state for repeated autofill requests.
///
/// Each accepted suggestion is excluded from the next request on the same
/// origin buffer. When the candidates run out, the exclusions are cleared and
/// the request is retried once, wrapping around.
#[derive(Debug, Default, Clone)]
pub struct AutofillSession {
    origin: String,
    last_applied: Option<String>,
    exclusions: FxHashSet<String>,
}

impl AutofillSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggest the next completion for `buffer` and return the completed
    /// buffer.
    ///
    /// `engine` computes a suggestion for a buffer and an exclusion set.
    pub fn next<F>(&mut self, buffer: &str, mut engine: F) -> Option<String>
    where
        F: FnMut(&str, &FxHashSet<String>) -> Option<AutofillSuggestion>,
    {
        if self.last_applied.as_deref() != Some(buffer) {
            self.origin = buffer.to_string();
            self.exclusions.clear();
        }

        let suggestion = match engine(&self.origin, &self.exclusions) {
            Some(found) => Some(found),
            None if !self.exclusions.is_empty() => {
                self.exclusions.clear();
                engine(&self.origin, &self.exclusions)
            }
            None => None,
        };

        let Some(suggestion) = suggestion else {
            self.last_applied = None;
            return None;
        };
        let applied = suggestion.apply(&self.origin);
        self.exclusions.insert(suggestion.value);
        self.last_applied = Some(applied.clone());
        Some(applied)
    }

    /// Forget the current cycle.
    pub fn reset(&mut self) {
        self.origin.clear();
        self.last_applied = None;
        self.exclusions.clear();
    }

    pub fn exclusions(&self) -> &FxHashSet<String> {
        &self.exclusions
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::call::{CallContext, NativeFn};
    use crate::instance::InstanceRegistry;
    use crate::member::{CommandProperties, Member, MethodDef, TypeInfo};

    struct Player;

    fn noop() -> Member {
        Member::Method(MethodDef::new(
            &[],
            NativeFn::new(|_: &mut CallContext<'_>| Ok(())),
        ))
    }

    struct Fixture {
        registry: CommandRegistry,
        aliases: AliasTable,
        finder: InstanceRegistry,
    }

    impl Fixture {
        fn new(keys: &[&str]) -> Self {
            let mut registry = CommandRegistry::new();
            for key in keys {
                registry.register(CommandProperties::new(*key), noop()).unwrap();
            }
            Self {
                registry,
                aliases: AliasTable::new(),
                finder: InstanceRegistry::new(Duration::ZERO),
            }
        }

        fn suggest(&mut self, buffer: &str, exclusions: &FxHashSet<String>) -> Option<AutofillSuggestion> {
            suggest(
                buffer,
                exclusions,
                AutofillContext {
                    registry: &self.registry,
                    aliases: &self.aliases,
                    finder: &mut self.finder,
                    include_cheats: false,
                    default_value: "help",
                },
            )
        }

        fn value(&mut self, buffer: &str) -> Option<String> {
            self.suggest(buffer, &FxHashSet::default()).map(|s| s.value)
        }
    }

    #[test]
    fn empty_buffer_gets_default() {
        let mut fixture = Fixture::new(&[]);
        assert_eq!(
            fixture.suggest("", &FxHashSet::default()),
            Some(AutofillSuggestion {
                value: "help".into(),
                start: 0
            })
        );
    }

    #[test]
    fn exclusions_cycle_in_sort_order() {
        let mut fixture = Fixture::new(&["ad", "ab", "ac", "b"]);
        let mut exclusions = FxHashSet::default();
        let mut seen = Vec::new();
        while let Some(s) = fixture.suggest("a", &exclusions) {
            exclusions.insert(s.value.clone());
            seen.push(s.value);
        }
        assert_eq!(seen, vec!["ab", "ac", "ad"]);
    }

    #[test]
    fn aliases_offered_before_commands() {
        let mut fixture = Fixture::new(&["help"]);
        fixture.aliases.set("hello", "echo hello").unwrap();
        assert_eq!(fixture.value("he").as_deref(), Some("hello"));
    }

    #[test]
    fn completes_last_statement_with_global_offset() {
        let mut fixture = Fixture::new(&["history"]);
        let suggestion = fixture.suggest("echo x; his", &FxHashSet::default()).unwrap();
        assert_eq!(suggestion.start, 8);
        assert_eq!(suggestion.apply("echo x; his"), "echo x; history");
    }

    #[test]
    fn first_word_is_cleansed_before_matching() {
        let mut fixture = Fixture::new(&["spawn_enemy"]);
        assert_eq!(fixture.value("Spawn E").as_deref(), None);
        assert_eq!(fixture.value("Spawn_E").as_deref(), Some("spawn_enemy"));
    }

    #[test]
    fn trailing_separator_or_unknown_command_has_no_suggestion() {
        let mut fixture = Fixture::new(&["help"]);
        assert_eq!(fixture.value("help;"), None);
        assert_eq!(fixture.value("nothing here"), None);
        assert_eq!(fixture.value("help "), None);
    }

    #[test]
    fn callback_receives_parameter_position() {
        let mut fixture = Fixture::new(&[]);
        let props = CommandProperties::new("give").autofill(|request| {
            let items = ["sword", "shield", "magic staff"];
            assert_eq!(request.param_index, request.word_index - 1);
            request.first_match(items)
        });
        fixture.registry.register(props, noop()).unwrap();

        let suggestion = fixture.suggest("give s", &FxHashSet::default()).unwrap();
        assert_eq!(suggestion.value, "sword");
        assert_eq!(suggestion.start, 5);

        let mut exclusions = FxHashSet::default();
        exclusions.insert("sword".to_string());
        exclusions.insert("shield".to_string());
        assert_eq!(fixture.suggest("give ", &exclusions).unwrap().value, "\"magic staff\"");
    }

    #[test]
    fn panicking_callback_yields_nothing() {
        let mut fixture = Fixture::new(&[]);
        let props = CommandProperties::new("give").autofill(|_| panic!("callback bug"));
        fixture.registry.register(props, noop()).unwrap();
        assert_eq!(fixture.value("give s"), None);
        assert_eq!(fixture.value("gi").as_deref(), Some("give"));
    }

    struct PanickingFinder;

    impl InstanceFinder for PanickingFinder {
        fn find(&mut self, _: &TypeInfo, _: &str) -> Option<Instance> {
            panic!("finder bug");
        }

        fn names(&self, _: &TypeInfo) -> Vec<String> {
            panic!("finder bug");
        }
    }

    #[test]
    fn panicking_finder_yields_nothing() {
        let mut registry = CommandRegistry::new();
        let def = MethodDef::new(&[], NativeFn::new(|_: &mut CallContext<'_>| Ok(())))
            .with_declaring(TypeInfo::of::<Player>());
        registry
            .register(CommandProperties::new("kill"), Member::Method(def))
            .unwrap();
        let aliases = AliasTable::new();
        for buffer in ["kill b", "kill bob x"] {
            let suggestion = suggest(
                buffer,
                &FxHashSet::default(),
                AutofillContext {
                    registry: &registry,
                    aliases: &aliases,
                    finder: &mut PanickingFinder,
                    include_cheats: false,
                    default_value: "",
                },
            );
            assert_eq!(suggestion, None);
        }
    }

    #[test]
    fn instance_word_completes_names() {
        let mut fixture = Fixture::new(&[]);
        let def = MethodDef::new(&[], NativeFn::new(|_: &mut CallContext<'_>| Ok(())))
            .with_declaring(TypeInfo::of::<Player>());
        fixture
            .registry
            .register(CommandProperties::new("kill"), Member::Method(def))
            .unwrap();
        let bob = Rc::new(RefCell::new(Player));
        let big = Rc::new(RefCell::new(Player));
        fixture.finder.register("Bob", &bob);
        fixture.finder.register("Big Guy", &big);

        assert_eq!(fixture.value("kill b").as_deref(), Some("Bob"));
        let mut exclusions = FxHashSet::default();
        exclusions.insert("Bob".to_string());
        assert_eq!(
            fixture.suggest("kill b", &exclusions).unwrap().value,
            "\"Big Guy\""
        );
    }

    #[test]
    fn session_wraps_after_exhaustion() {
        let mut fixture = Fixture::new(&["ab", "ac"]);
        let mut session = AutofillSession::new();
        let mut next = |buffer: &str| {
            session.next(buffer, |b, ex| fixture.suggest(b, ex))
        };
        assert_eq!(next("a").as_deref(), Some("ab"));
        assert_eq!(next("ab").as_deref(), Some("ac"));
        assert_eq!(next("ac").as_deref(), Some("ab"));
        // Typing something new restarts the cycle.
        assert_eq!(next("ac").as_deref(), Some("ac"));
    }
}
