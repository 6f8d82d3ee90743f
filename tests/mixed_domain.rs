//! `spec.md` §8 scenario 2: a mixed-domain MDD built from a truth vector
//! over variables of differing domain sizes.

use teddy_dd::domain::Domain;
use teddy_dd::manager::ManagerConfig;
use teddy_dd::prelude::*;

#[test]
fn from_vector_round_trips_every_assignment() {
    let domains = vec![2u32, 3, 2, 3];
    let dm = DiagramManager::new(4, Domain::Mixed(domains.clone()), ManagerConfig::default());

    let total: usize = domains.iter().map(|&d| d as usize).product();
    let values: Vec<u32> = (0..total as u32).collect();
    let d = dm.from_vector(&values);

    let mut expected = 0u32;
    for v0 in 0..domains[0] {
        for v1 in 0..domains[1] {
            for v2 in 0..domains[2] {
                for v3 in 0..domains[3] {
                    assert_eq!(dm.evaluate(&d, &[v0, v1, v2, v3]), expected);
                    expected += 1;
                }
            }
        }
    }
}

#[test]
fn fixed_domain_greater_than_two_uses_numeric_labels() {
    let dm = DiagramManager::new(1, Domain::Fixed(3), ManagerConfig::default());
    let x0 = dm.variable(0);
    assert_eq!(dm.evaluate(&x0, &[0]), 0);
    assert_eq!(dm.evaluate(&x0, &[1]), 1);
    assert_eq!(dm.evaluate(&x0, &[2]), 2);
}
