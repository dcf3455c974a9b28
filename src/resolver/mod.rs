//! Invocation resolution.
//!
//! Turns one statement into an [`Invocation`]: the command it names, the
//! instance it targets and the overload or accessor to call, with arguments
//! already coerced.
//!
//! ## Algorithm
//!
//! 1. Split the statement into words; no words is [`ValidState::ErrorEmpty`]
//! 2. Cleanse the first word and look the command up
//! 3. For instance commands, consume the next word as the target name and ask
//!    the [`InstanceFinder`] for it
//! 4. Turn the remaining words into [`Argument`]s
//! 5. Methods: pick the best overload (see [`find_best_match`]).
//!    Properties and fields: no argument reads, one argument writes
//!
//! Failures are reported through [`ValidState`]; nothing here returns an
//! error or unwinds to the caller.

mod ranking;

pub use ranking::find_best_match;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use devcon_core::{Argument, Coercion, Value, cleanse_key};
use devcon_parser::{Word, split_leading_word, split_words, split_words_verbatim};

use crate::instance::InstanceFinder;
use crate::invocation::{BoundCall, Invocation};
use crate::member::{Instance, MethodDef};
use crate::registry::{Binding, Command, CommandRegistry};

/// Outcome of resolving a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidState {
    Valid,
    /// The statement has no words.
    ErrorEmpty,
    /// No command is registered under the first word.
    ErrorNoCommandFound,
    /// An instance command was given no target name, or no live instance matched it.
    ErrorNoInstanceTarget,
    /// The command's declaring type cannot be looked up by name.
    ErrorInstanceNotSearchable,
    /// No overload accepts the supplied arguments.
    ErrorNoMethodForParameters,
    /// Resolution itself failed unexpectedly.
    ErrorUnspecified,
}

impl ValidState {
    pub fn is_valid(self) -> bool {
        self == ValidState::Valid
    }
}

impl fmt::Display for ValidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidState::Valid => "valid",
            ValidState::ErrorEmpty => "empty statement",
            ValidState::ErrorNoCommandFound => "no command found",
            ValidState::ErrorNoInstanceTarget => "no instance target",
            ValidState::ErrorInstanceNotSearchable => "instance type is not searchable",
            ValidState::ErrorNoMethodForParameters => "no overload matches the arguments",
            ValidState::ErrorUnspecified => "unspecified resolution failure",
        })
    }
}

/// A viable overload and the values bound to its parameters.
#[derive(Debug, Clone)]
pub struct OverloadMatch {
    /// Position of the overload in the command's method list.
    pub index: usize,
    /// Total declared parameters of the overload.
    pub param_count: usize,
    /// One value per parameter; omitted arguments take their defaults.
    pub values: Vec<Value>,
    /// Coercion per parameter (`None` = default used).
    pub conversions: Vec<Option<Coercion>>,
    /// Sum of coercion costs (lower is better).
    pub total_cost: u32,
    /// Non-string parameters after the first that were matched by a
    /// supplied argument.
    pub value_score: usize,
    /// Non-string parameters whose argument matched without conversion.
    pub exact_values: usize,
}

/// Resolve a statement against the registry.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve(
    statement: &str,
    registry: &CommandRegistry,
    finder: &mut dyn InstanceFinder,
) -> Invocation {
    let guarded = panic::catch_unwind(AssertUnwindSafe(|| {
        resolve_unguarded(statement, registry, &mut *finder)
    }));
    guarded.unwrap_or_else(|_| {
        let key = split_leading_word(statement)
            .map(|(word, _)| cleanse_key(&word.text))
            .unwrap_or_default();
        error!(%key, "resolution panicked");
        Invocation::invalid(key, ValidState::ErrorUnspecified)
    })
}

fn resolve_unguarded(
    statement: &str,
    registry: &CommandRegistry,
    finder: &mut dyn InstanceFinder,
) -> Invocation {
    let words = split_words(statement);
    let Some((first, rest)) = words.split_first() else {
        return Invocation::invalid(String::new(), ValidState::ErrorEmpty);
    };

    let key = cleanse_key(&first.text);
    let Some(command) = registry.get(&key) else {
        return Invocation::invalid(key, ValidState::ErrorNoCommandFound);
    };

    let (target, rest) = match resolve_target(command, rest, finder) {
        Ok(resolved) => resolved,
        Err(state) => return Invocation::failed(command, state),
    };
    let arguments: Vec<Argument> = rest
        .iter()
        .map(|w| Argument::new(w.text.clone(), w.literal))
        .collect();

    let call = match command.binding() {
        Binding::Methods(methods) => {
            let Some(selected) = select_overload(methods, &arguments) else {
                return Invocation::failed(command, ValidState::ErrorNoMethodForParameters);
            };
            let method = methods[selected.index].clone();
            let raw_args = if method.is_catch_all() {
                let consumed = words.len() - rest.len();
                split_words_verbatim(statement)
                    .into_iter()
                    .skip(consumed)
                    .map(|w| w.text)
                    .collect()
            } else {
                Vec::new()
            };
            debug!(key = %command.key(), overload = selected.index, cost = selected.total_cost, "resolved method");
            BoundCall::Method {
                method,
                args: selected.values,
                raw_args,
                target,
            }
        }
        Binding::Property(accessor) | Binding::Field(accessor) => match arguments.as_slice() {
            [] => BoundCall::Read {
                accessor: accessor.clone(),
                target,
            },
            [argument] => BoundCall::Write {
                accessor: accessor.clone(),
                argument: argument.clone(),
                target,
            },
            _ => return Invocation::failed(command, ValidState::ErrorNoMethodForParameters),
        },
    };

    Invocation::valid(command, call)
}

/// Consume the instance-target word for non-static commands.
fn resolve_target<'w>(
    command: &Command,
    words: &'w [Word],
    finder: &mut dyn InstanceFinder,
) -> Result<(Option<Instance>, &'w [Word]), ValidState> {
    if command.is_static() {
        return Ok((None, words));
    }
    let ty = command
        .declaring_type()
        .ok_or(ValidState::ErrorUnspecified)?;
    if !ty.is_searchable() {
        return Err(ValidState::ErrorInstanceNotSearchable);
    }
    let (selector, remaining) = words
        .split_first()
        .ok_or(ValidState::ErrorNoInstanceTarget)?;
    let target = finder
        .find(ty, &selector.text)
        .ok_or(ValidState::ErrorNoInstanceTarget)?;
    Ok((Some(target), remaining))
}

/// Pick the overload to call for the given arguments.
///
/// A catch-all overload wins outright. Otherwise every overload that accepts
/// the argument count and can coerce every argument is ranked by
/// [`find_best_match`].
pub fn select_overload(methods: &[MethodDef], args: &[Argument]) -> Option<OverloadMatch> {
    if let Some(index) = methods.iter().position(MethodDef::is_catch_all) {
        return Some(OverloadMatch {
            index,
            param_count: 0,
            values: args
                .iter()
                .map(|a| Value::String(a.text().to_string()))
                .collect(),
            conversions: Vec::new(),
            total_cost: 0,
            value_score: 0,
            exact_values: 0,
        });
    }

    let viable: Vec<OverloadMatch> = methods
        .iter()
        .enumerate()
        .filter_map(|(index, method)| try_match_candidate(index, method, args))
        .collect();
    find_best_match(viable)
}

/// Try to bind arguments to one overload.
///
/// Returns `None` if the argument count is out of range, an argument cannot
/// be coerced, or an omitted parameter has no default.
fn try_match_candidate(index: usize, method: &MethodDef, args: &[Argument]) -> Option<OverloadMatch> {
    let params = method.params();
    if args.len() < method.required_count() || args.len() > params.len() {
        return None;
    }

    let mut values = Vec::with_capacity(params.len());
    let mut conversions = Vec::with_capacity(params.len());
    let mut total_cost = 0u32;
    let mut value_score = 0usize;
    let mut exact_values = 0usize;

    for (position, param) in params.iter().enumerate() {
        match args.get(position) {
            Some(arg) => {
                let coercion = arg.coerce(param.ty).ok()?;
                total_cost += coercion.cost;
                if !param.ty.is_string() {
                    if position > 0 {
                        value_score += 1;
                    }
                    if coercion.is_exact() {
                        exact_values += 1;
                    }
                }
                values.push(coercion.value.clone());
                conversions.push(Some(coercion));
            }
            None => {
                values.push(param.default.clone()?);
                conversions.push(None);
            }
        }
    }

    Some(OverloadMatch {
        index,
        param_count: params.len(),
        values,
        conversions,
        total_cost,
        value_score,
        exact_values,
    })
}
