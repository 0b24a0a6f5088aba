use proptest::prelude::*;

use crate::active_space::electrons::{reconcile, ActiveElectronClaim, ElectronBudget};
use crate::active_space::{ActiveSpaceError, ActiveSpaceKind, ElectronMismatch};

const DERIVED: ActiveElectronClaim = ActiveElectronClaim::Cas { claimed: None };

#[test]
fn test_electrons_cas_derived() {
    let budget = reconcile(&DERIVED, &[2, 1, 0], 10, 10).unwrap();
    assert_eq!(
        budget,
        ElectronBudget {
            total_electrons: 10,
            total_nuclear_charge: 10,
            inactive_electrons: 6,
            active_electrons: 4,
        }
    );
    assert_eq!(budget.molecular_charge(), 0);
    assert_eq!(DERIVED.kind(), ActiveSpaceKind::Cas);

    // The [1.98, 1.2, 0.8, 0.02] scenario with four electrons.
    let budget = reconcile(&DERIVED, &[1], 4, 4).unwrap();
    assert_eq!(budget.active_electrons, 2);
}

#[test]
fn test_electrons_cas_claims() {
    let claim = ActiveElectronClaim::Cas { claimed: Some(4) };
    assert_eq!(reconcile(&claim, &[3], 10, 10).unwrap().active_electrons, 4);

    for claimed in [0, 2, 6, 8, 10] {
        let claim = ActiveElectronClaim::Cas {
            claimed: Some(claimed),
        };
        assert_eq!(
            reconcile(&claim, &[3], 10, 10),
            Err(ActiveSpaceError::ElectronMismatch(
                ElectronMismatch::Inconsistent {
                    expected: 4,
                    actual: i64::from(claimed),
                }
            ))
        );
    }
}

#[test]
fn test_electrons_parity() {
    assert_eq!(
        reconcile(&DERIVED, &[1], 9, 9),
        Err(ElectronMismatch::OddTotal(9).into())
    );
    let claim = ActiveElectronClaim::Cas { claimed: Some(5) };
    assert_eq!(
        reconcile(&claim, &[1], 10, 10),
        Err(ElectronMismatch::OddActive(5).into())
    );
    let claim = ActiveElectronClaim::Ras {
        ras1: vec![1],
        ras2_electrons: 1,
    };
    assert_eq!(
        reconcile(&claim, &[3], 10, 10),
        Err(ElectronMismatch::OddActive(3).into())
    );
}

#[test]
fn test_electrons_ras() {
    let claim = ActiveElectronClaim::Ras {
        ras1: vec![1, 0],
        ras2_electrons: 2,
    };
    assert_eq!(claim.kind(), ActiveSpaceKind::Ras);
    let budget = reconcile(&claim, &[2, 1], 10, 11).unwrap();
    assert_eq!(budget.inactive_electrons, 6);
    assert_eq!(budget.active_electrons, 4);
    assert_eq!(budget.molecular_charge(), 1);

    let claim = ActiveElectronClaim::Ras {
        ras1: vec![1, 0],
        ras2_electrons: 4,
    };
    assert_eq!(
        reconcile(&claim, &[2, 1], 10, 10),
        Err(ElectronMismatch::Inconsistent {
            expected: 4,
            actual: 6
        }
        .into())
    );
}

#[test]
fn test_electrons_excess_inactive() {
    let error = reconcile(&DERIVED, &[4, 2], 10, 10).unwrap_err();
    assert_eq!(
        error,
        ActiveSpaceError::ElectronMismatch(ElectronMismatch::ExcessInactive {
            inactive: 12,
            total: 10
        })
    );
    assert!(error.to_string().contains("12"));
}

#[test]
fn test_electrons_budget_display() {
    let budget = reconcile(&DERIVED, &[1], 4, 5).unwrap();
    let display = budget.to_string();
    assert!(display.contains("Active electrons: 2"));
    assert!(display.contains("Total molecular charge: 1"));
}

proptest! {
    #[test]
    fn test_electrons_derived_cas_always_reconciles(
        inactive in prop::collection::vec(0usize..6, 1..5),
        extra_pairs in 0u32..10,
    ) {
        let inactive_electrons = 2 * inactive.iter().sum::<usize>() as u32;
        let total = inactive_electrons + 2 * extra_pairs;
        let budget = reconcile(&DERIVED, &inactive, total, total).unwrap();
        prop_assert_eq!(budget.active_electrons, 2 * extra_pairs);
        prop_assert_eq!(budget.inactive_electrons + budget.active_electrons, total);
    }

    #[test]
    fn test_electrons_odd_total_always_rejected(
        inactive in prop::collection::vec(0usize..6, 1..5),
        half in 0u32..50,
    ) {
        let total = 2 * half + 1;
        prop_assert_eq!(
            reconcile(&DERIVED, &inactive, total, total),
            Err(ActiveSpaceError::ElectronMismatch(ElectronMismatch::OddTotal(total)))
        );
    }
}
