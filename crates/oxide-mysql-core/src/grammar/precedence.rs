//! Shift/reduce conflict resolution by precedence and associativity.

use std::cmp::Ordering;

use super::symbol::{Assoc, Precedence};

/// How a shift/reduce conflict is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Shift,
    Reduce,
    /// Non-associative operators at the same level: neither is allowed.
    Error,
    /// Either side lacks a precedence. The table shifts and records a
    /// conflict.
    Unresolved,
}

/// Compares the precedence of the rule to reduce with that of the lookahead.
#[must_use]
pub fn resolve(rule: Option<Precedence>, lookahead: Option<Precedence>) -> Resolution {
    let (Some(rule), Some(lookahead)) = (rule, lookahead) else {
        return Resolution::Unresolved;
    };
    match rule.level.cmp(&lookahead.level) {
        Ordering::Greater => Resolution::Reduce,
        Ordering::Less => Resolution::Shift,
        Ordering::Equal => match lookahead.assoc {
            Assoc::Left => Resolution::Reduce,
            Assoc::Right => Resolution::Shift,
            Assoc::NonAssoc => Resolution::Error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn prec(level: u16, assoc: Assoc) -> Option<Precedence> {
        Some(Precedence { level, assoc })
    }

    #[test]
    fn test_higher_rule_reduces() {
        // `a * b + c`: reduce `a * b` before shifting '+'.
        assert_eq!(
            resolve(prec(2, Assoc::Left), prec(1, Assoc::Left)),
            Resolution::Reduce
        );
    }

    #[test]
    fn test_higher_lookahead_shifts() {
        assert_eq!(
            resolve(prec(1, Assoc::Left), prec(2, Assoc::Left)),
            Resolution::Shift
        );
    }

    #[test]
    fn test_same_level_uses_associativity() {
        assert_eq!(
            resolve(prec(3, Assoc::Left), prec(3, Assoc::Left)),
            Resolution::Reduce
        );
        assert_eq!(
            resolve(prec(3, Assoc::Right), prec(3, Assoc::Right)),
            Resolution::Shift
        );
        assert_eq!(
            resolve(prec(3, Assoc::NonAssoc), prec(3, Assoc::NonAssoc)),
            Resolution::Error
        );
    }

    #[test]
    fn test_missing_precedence_is_unresolved() {
        assert_eq!(resolve(None, prec(1, Assoc::Left)), Resolution::Unresolved);
        assert_eq!(resolve(prec(1, Assoc::Left), None), Resolution::Unresolved);
    }
}
