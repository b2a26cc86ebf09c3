//! Overload resolution support (JLS3 15.12.2)
//!
//! The engine answers pairwise "more specific" questions and can list the
//! maximally specific candidates. Deciding that a call is ambiguous, or that
//! nothing applies, is left to the caller.

use log::trace;

use crate::model::{IInvocable, TypeArena, TypeId};
use crate::utils::Result;

/// Whether parameter list `this` is more specific than `that` (JLS3 15.12.2.5).
///
/// JLS2 would also require the declaring type of `this` to be a subtype of the
/// declaring type of `that`. Like javac 1.4 through 6, only the parameters are
/// compared: `A.m(String)` beats an inherited `B.m(Object)` either way.
pub(crate) fn is_more_specific(arena: &TypeArena, this: &[TypeId], that: &[TypeId]) -> Result<bool> {
    if this.len() != that.len() {
        return Ok(false);
    }
    for (&this_pt, &that_pt) in this.iter().zip(that) {
        if !arena.is_assignable_from(that_pt, this_pt)? {
            trace!(
                "{} does not widen to {}",
                arena.class_name(this_pt),
                arena.class_name(that_pt)
            );
            return Ok(false);
        }
    }
    // Identical lists are equally specific
    Ok(this != that)
}

/// Whether `invocable` accepts arguments of these static types by identity or
/// widening conversion (JLS3 15.12.2.2)
pub fn is_applicable(arena: &TypeArena, invocable: &dyn IInvocable, argument_types: &[TypeId]) -> Result<bool> {
    let parameters = invocable.parameter_types();
    if parameters.len() != argument_types.len() {
        return Ok(false);
    }
    for (&parameter, &argument) in parameters.iter().zip(argument_types) {
        if !arena.is_assignable_from(parameter, argument)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The candidates that no other candidate is more specific than, in input order.
///
/// Expects applicable candidates of equal arity; more than one result means
/// the caller has an ambiguity on its hands.
pub fn maximally_specific<'a, T: IInvocable>(arena: &TypeArena, candidates: &'a [T]) -> Result<Vec<&'a T>> {
    let mut result = Vec::new();
    'candidates: for (i, candidate) in candidates.iter().enumerate() {
        for (j, other) in candidates.iter().enumerate() {
            if i != j && other.is_more_specific_than(candidate, arena)? {
                continue 'candidates;
            }
        }
        result.push(candidate);
    }
    Ok(result)
}
