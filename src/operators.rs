//! The operator catalogue `apply` is generic over (`spec.md` §4.4).
//!
//! Each operator is a zero-sized type implementing [`Operator`], the
//! idiomatic-Rust rendition of the source's per-operator template
//! specialisation (`SPEC_FULL.md` §E.1). `apply_operator` is the shared
//! sentinel-handling wrapper every operator goes through: absorbing values
//! short-circuit, `Nondetermined` propagates, otherwise the operator's own
//! `eval` runs.

/// An in-band operand/result sentinel (`spec.md` §4.4, §7, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Val {
    Value(u32),
    /// Absorbing outcome for operators that declare one.
    Undefined,
    /// An operand is not yet resolved to a terminal; forces recursion.
    Nondetermined,
}

/// Identifies an operator for apply-cache bookkeeping (`spec.md` §4.4: a
/// cache entry carries `op_id` "to distinguish operators that share a
/// cache slot", retained for generality even though this crate gives each
/// operator its own cache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpId {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    PiConj,
    EqualTo,
    NotEqualTo,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Min,
    Max,
    Plus,
    Multiplies,
}

pub trait Operator {
    const ID: OpId;
    const COMMUTATIVE: bool;

    /// The value that, when present on either operand, determines the
    /// result regardless of the other operand. `modulus` is the domain's
    /// value count, needed by operators whose absorbing value depends on
    /// it (e.g. `Max`'s absorbing value is `modulus - 1`).
    fn absorbing(modulus: u32) -> Option<u32>;

    fn eval(lhs: u32, rhs: u32, modulus: u32) -> u32;
}

/// Runs `Op` over two sentinel-aware operands, following the resolution
/// order `spec.md` §4.4 describes: absorbing value wins first, then
/// `Nondetermined` propagates, otherwise `Op::eval` computes the result.
pub fn apply_operator<Op: Operator>(lv: Val, rv: Val, modulus: u32) -> Val {
    if let Some(absorb) = Op::absorbing(modulus) {
        if lv == Val::Value(absorb) || rv == Val::Value(absorb) {
            return Val::Value(absorb);
        }
    }
    if lv == Val::Nondetermined || rv == Val::Nondetermined {
        return Val::Nondetermined;
    }
    match (lv, rv) {
        (Val::Value(a), Val::Value(b)) => Val::Value(Op::eval(a, b, modulus)),
        (Val::Undefined, _) | (_, Val::Undefined) => Val::Undefined,
        _ => unreachable!("Nondetermined already handled above"),
    }
}

fn truthy(v: u32) -> bool {
    v != 0
}

macro_rules! boolean_op {
    ($name:ident, $id:ident, $commutative:expr, $absorb:expr, $eval:expr) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl Operator for $name {
            const ID: OpId = OpId::$id;
            const COMMUTATIVE: bool = $commutative;

            fn absorbing(_modulus: u32) -> Option<u32> {
                $absorb
            }

            fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
                let f: fn(bool, bool) -> bool = $eval;
                f(truthy(lhs), truthy(rhs)) as u32
            }
        }
    };
}

boolean_op!(And, And, true, Some(0), |a, b| a && b);
boolean_op!(Or, Or, true, Some(1), |a, b| a || b);
boolean_op!(Xor, Xor, true, None, |a, b| a != b);
boolean_op!(Nand, Nand, true, None, |a, b| !(a && b));
boolean_op!(Nor, Nor, true, None, |a, b| !(a || b));

/// N-ary-safe conjunction (`spec.md` §4.4): `min(lhs, rhs)`, absorbing at
/// `0`. Unlike `And`, not truthy-coerced — on a P>2 domain `PiConj(5, 3)`
/// is `3`, not a boolean result.
#[derive(Debug, Clone, Copy)]
pub struct PiConj;
impl Operator for PiConj {
    const ID: OpId = OpId::PiConj;
    const COMMUTATIVE: bool = true;
    fn absorbing(_modulus: u32) -> Option<u32> {
        Some(0)
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        lhs.min(rhs)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EqualTo;
impl Operator for EqualTo {
    const ID: OpId = OpId::EqualTo;
    const COMMUTATIVE: bool = true;
    fn absorbing(_modulus: u32) -> Option<u32> {
        None
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        (lhs == rhs) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotEqualTo;
impl Operator for NotEqualTo {
    const ID: OpId = OpId::NotEqualTo;
    const COMMUTATIVE: bool = true;
    fn absorbing(_modulus: u32) -> Option<u32> {
        None
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        (lhs != rhs) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Less;
impl Operator for Less {
    const ID: OpId = OpId::Less;
    const COMMUTATIVE: bool = false;
    fn absorbing(_modulus: u32) -> Option<u32> {
        None
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        (lhs < rhs) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LessEqual;
impl Operator for LessEqual {
    const ID: OpId = OpId::LessEqual;
    const COMMUTATIVE: bool = false;
    fn absorbing(_modulus: u32) -> Option<u32> {
        None
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        (lhs <= rhs) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Greater;
impl Operator for Greater {
    const ID: OpId = OpId::Greater;
    const COMMUTATIVE: bool = false;
    fn absorbing(_modulus: u32) -> Option<u32> {
        None
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        (lhs > rhs) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GreaterEqual;
impl Operator for GreaterEqual {
    const ID: OpId = OpId::GreaterEqual;
    const COMMUTATIVE: bool = false;
    fn absorbing(_modulus: u32) -> Option<u32> {
        None
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        (lhs >= rhs) as u32
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Min;
impl Operator for Min {
    const ID: OpId = OpId::Min;
    const COMMUTATIVE: bool = true;
    fn absorbing(_modulus: u32) -> Option<u32> {
        Some(0)
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        lhs.min(rhs)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Max;
impl Operator for Max {
    const ID: OpId = OpId::Max;
    const COMMUTATIVE: bool = true;
    fn absorbing(modulus: u32) -> Option<u32> {
        modulus.checked_sub(1)
    }
    fn eval(lhs: u32, rhs: u32, _modulus: u32) -> u32 {
        lhs.max(rhs)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Plus;
impl Operator for Plus {
    const ID: OpId = OpId::Plus;
    const COMMUTATIVE: bool = true;
    fn absorbing(_modulus: u32) -> Option<u32> {
        None
    }
    fn eval(lhs: u32, rhs: u32, modulus: u32) -> u32 {
        (lhs + rhs) % modulus
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Multiplies;
impl Operator for Multiplies {
    const ID: OpId = OpId::Multiplies;
    const COMMUTATIVE: bool = true;
    fn absorbing(_modulus: u32) -> Option<u32> {
        Some(0)
    }
    fn eval(lhs: u32, rhs: u32, modulus: u32) -> u32 {
        (lhs * rhs) % modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_absorbs_zero() {
        assert_eq!(
            apply_operator::<And>(Val::Value(0), Val::Nondetermined, 2),
            Val::Value(0)
        );
    }

    #[test]
    fn nondetermined_propagates_without_absorbing() {
        assert_eq!(
            apply_operator::<Xor>(Val::Nondetermined, Val::Value(1), 2),
            Val::Nondetermined
        );
    }

    #[test]
    fn plus_wraps_modulus() {
        assert_eq!(Plus::eval(2, 2, 3), 1);
    }

    #[test]
    fn pi_conj_is_min_not_boolean_and() {
        assert_eq!(PiConj::eval(5, 3, 6), 3);
        assert_eq!(
            apply_operator::<PiConj>(Val::Value(5), Val::Value(3), 6),
            Val::Value(3)
        );
        assert_eq!(
            apply_operator::<PiConj>(Val::Value(0), Val::Nondetermined, 6),
            Val::Value(0)
        );
    }
}
