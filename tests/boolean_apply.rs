//! `spec.md` §8 scenario 1: building two BDD variables and combining them
//! with `And` yields a diagram that evaluates like Boolean conjunction.

use teddy_dd::domain::Domain;
use teddy_dd::manager::ManagerConfig;
use teddy_dd::prelude::*;

#[test]
fn and_matches_boolean_conjunction() {
    let dm = DiagramManager::new(2, Domain::Fixed(2), ManagerConfig::default());
    let x0 = dm.variable(0);
    let x1 = dm.variable(1);
    let conj = dm.apply::<And>(&x0, &x1);

    for a in 0..2 {
        for b in 0..2 {
            assert_eq!(dm.evaluate(&conj, &[a, b]), a & b);
        }
    }
}

#[test]
fn xor_of_variable_with_itself_is_constant_zero() {
    let dm = DiagramManager::new(1, Domain::Fixed(2), ManagerConfig::default());
    let x0 = dm.variable(0);
    let d = dm.apply::<Xor>(&x0, &x0);
    assert_eq!(dm.node_count(&d), 1);
    assert_eq!(dm.evaluate(&d, &[0]), 0);
    assert_eq!(dm.evaluate(&d, &[1]), 0);
}

#[test]
fn de_morgan_holds_through_apply() {
    let dm = DiagramManager::new(2, Domain::Fixed(2), ManagerConfig::default());
    let x0 = dm.variable(0);
    let x1 = dm.variable(1);

    let and_d = dm.apply::<And>(&x0, &x1);
    let one = dm.constant(1);
    let not_and = dm.apply::<Xor>(&and_d, &one);

    let not_x0 = dm.apply::<Xor>(&x0, &one);
    let not_x1 = dm.apply::<Xor>(&x1, &one);
    let or_not = dm.apply::<Or>(&not_x0, &not_x1);

    for a in 0..2 {
        for b in 0..2 {
            assert_eq!(dm.evaluate(&not_and, &[a, b]), dm.evaluate(&or_not, &[a, b]));
        }
    }
}
