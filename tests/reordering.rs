//! `spec.md` §8 scenario 4: `swap_vars`/`sift_vars` must preserve the
//! function a diagram represents even as the variable order changes.

use teddy_dd::domain::Domain;
use teddy_dd::manager::ManagerConfig;
use teddy_dd::prelude::*;

fn all_assignments(domains: &[u32]) -> Vec<Vec<u32>> {
    let mut out = vec![vec![]];
    for &d in domains {
        let mut next = Vec::new();
        for prefix in &out {
            for v in 0..d {
                let mut p = prefix.clone();
                p.push(v);
                next.push(p);
            }
        }
        out = next;
    }
    out
}

#[test]
fn swap_vars_preserves_semantics() {
    let dm = DiagramManager::new(3, Domain::Fixed(2), ManagerConfig::default());
    let x0 = dm.variable(0);
    let x1 = dm.variable(1);
    let x2 = dm.variable(2);
    let a = dm.apply::<And>(&x0, &x1);
    let d = dm.apply::<Or>(&a, &x2);

    let assignments = all_assignments(&[2, 2, 2]);
    let before: Vec<u32> = assignments.iter().map(|v| dm.evaluate(&d, v)).collect();

    dm.swap_vars(0);

    let after: Vec<u32> = assignments.iter().map(|v| dm.evaluate(&d, v)).collect();
    assert_eq!(before, after);
}

#[test]
fn sift_vars_preserves_semantics() {
    let dm = DiagramManager::new(4, Domain::Fixed(2), ManagerConfig::default());
    let vars: Vec<_> = (0..4).map(|i| dm.variable(i)).collect();
    let mut d = dm.apply::<Xor>(&vars[0], &vars[1]);
    d = dm.apply::<Xor>(&d, &vars[2]);
    d = dm.apply::<Xor>(&d, &vars[3]);

    let assignments = all_assignments(&[2, 2, 2, 2]);
    let before: Vec<u32> = assignments.iter().map(|v| dm.evaluate(&d, v)).collect();

    dm.sift_vars();

    let after: Vec<u32> = assignments.iter().map(|v| dm.evaluate(&d, v)).collect();
    assert_eq!(before, after);
}
