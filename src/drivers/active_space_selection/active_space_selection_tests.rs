use std::env;
use std::fs;

use crate::active_space::occupancy::{OccupancyTable, WavefunctionMethod};
use crate::active_space::{ActiveSpaceError, ActiveSpaceKind, ElectronMismatch};
use crate::drivers::active_space_selection::{
    ActiveSpaceSelectionDriver, ActiveSpaceSelectionParams, ActiveSpaceSelectionResult,
};
use crate::drivers::CasGenDriver;
use crate::io::{read_casgen_binary, CasGenFileType};

fn shuffled_table() -> OccupancyTable {
    OccupancyTable::builder()
        .method(WavefunctionMethod::Mcscf)
        .total_electrons(8)
        .total_nuclear_charge(8)
        .occupations(&[vec![1.99, 0.03, 1.96, 1.5, 0.5, 0.0005], vec![1.98, 0.02]])
        .build()
        .unwrap()
}

#[test]
fn test_drivers_active_space_selection_cas() {
    let table = shuffled_table();
    let params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.1)
        .build()
        .unwrap();
    let mut driver = ActiveSpaceSelectionDriver::builder()
        .parameters(&params)
        .occupancy(&table)
        .build()
        .unwrap();
    assert!(driver.result().is_err());
    driver.run().unwrap();
    let res = driver.result().unwrap();

    assert_eq!(res.partition.kind(), ActiveSpaceKind::Cas);
    assert_eq!(res.partition.inactive(), &[2, 1]);
    assert_eq!(res.partition.cas().unwrap(), &[2, 0]);
    assert_eq!(res.partition.secondary(), &[2, 1]);
    assert_eq!(res.electron_budget.inactive_electrons, 6);
    assert_eq!(res.electron_budget.active_electrons, 2);
    assert_eq!(res.electron_budget.molecular_charge(), 0);
    assert!(res.degeneracy.is_none());

    assert_eq!(res.sorted_occupations[0].original_indices(), vec![0, 2, 3, 4, 1, 5]);
    assert_eq!(res.reorder.counts(), vec![4, 0]);
    let pairs = res
        .reorder
        .flattened()
        .iter()
        .map(|swap| swap.to_string())
        .collect::<Vec<_>>();
    assert_eq!(pairs, vec!["2 3", "3 4", "4 5", "5 2"]);
}

#[test]
fn test_drivers_active_space_selection_ras() {
    let table = shuffled_table();
    let params = ActiveSpaceSelectionParams::builder()
        .kind(ActiveSpaceKind::Ras)
        .active_threshold(0.1)
        .ras_frozen_threshold(1e-3)
        .ras2_orbitals(Some(vec![2, 0]))
        .ras2_electrons(2)
        .build()
        .unwrap();
    let mut driver = ActiveSpaceSelectionDriver::builder()
        .parameters(&params)
        .occupancy(&table)
        .build()
        .unwrap();
    driver.run().unwrap();
    let res = driver.result().unwrap();

    assert_eq!(res.partition.inactive(), &[0, 0]);
    assert_eq!(res.partition.ras1().unwrap(), &[2, 1]);
    assert_eq!(res.partition.ras2().unwrap(), &[2, 0]);
    assert_eq!(res.partition.ras3().unwrap(), &[1, 1]);
    assert_eq!(res.partition.secondary(), &[1, 0]);
    assert_eq!(res.electron_budget.active_electrons, 8);
}

#[test]
fn test_drivers_active_space_selection_ras_requires_ras2() {
    assert!(ActiveSpaceSelectionParams::builder()
        .kind(ActiveSpaceKind::Ras)
        .build()
        .is_err());
}

#[test]
fn test_drivers_active_space_selection_electron_mismatch() {
    let table = shuffled_table();
    let params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.1)
        .cas_active_electrons(Some(4))
        .build()
        .unwrap();
    let mut driver = ActiveSpaceSelectionDriver::builder()
        .parameters(&params)
        .occupancy(&table)
        .build()
        .unwrap();
    let err = driver.run().unwrap_err();
    assert_eq!(
        err.downcast_ref::<ActiveSpaceError>(),
        Some(&ActiveSpaceError::ElectronMismatch(
            ElectronMismatch::Inconsistent {
                expected: 2,
                actual: 4
            }
        ))
    );
    assert!(driver.result().is_err());
}

#[test]
fn test_drivers_active_space_selection_invalid_threshold() {
    let table = shuffled_table();
    let params = ActiveSpaceSelectionParams::builder()
        .active_threshold(1.2)
        .build()
        .unwrap();
    let mut driver = ActiveSpaceSelectionDriver::builder()
        .parameters(&params)
        .occupancy(&table)
        .build()
        .unwrap();
    assert!(driver.run().is_err());
}

#[test]
fn test_drivers_active_space_selection_degenerate() {
    let table = shuffled_table();
    let params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.6)
        .build()
        .unwrap();
    let mut driver = ActiveSpaceSelectionDriver::builder()
        .parameters(&params)
        .occupancy(&table)
        .build()
        .unwrap();
    driver.run().unwrap();
    let res = driver.result().unwrap();
    assert_eq!(res.partition.n_active(), 0);
    assert_eq!(res.partition.inactive(), &[3, 1]);
    assert_eq!(res.electron_budget.active_electrons, 0);
    assert!(res.degeneracy.is_some());
    assert!(res.to_string().contains("Degenerate CAS partition"));
}

#[test]
fn test_drivers_active_space_selection_save() {
    let table = shuffled_table();
    let name = env::temp_dir().join("casgen_selection_test_save");
    let params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.1)
        .result_save_name(Some(name.clone()))
        .build()
        .unwrap();
    let mut driver = ActiveSpaceSelectionDriver::builder()
        .parameters(&params)
        .occupancy(&table)
        .build()
        .unwrap();
    driver.run().unwrap();
    let read: ActiveSpaceSelectionResult = read_casgen_binary(&name, CasGenFileType::Sel).unwrap();
    assert_eq!(&read, driver.result().unwrap());
    fs::remove_file(name.with_extension(CasGenFileType::Sel.ext())).unwrap();
}

#[test]
fn test_drivers_active_space_selection_params_defaults() {
    let params = ActiveSpaceSelectionParams::default();
    assert_eq!(params.kind, ActiveSpaceKind::Cas);
    assert_eq!(params.active_threshold, 0.02);
    assert_eq!(params.neglect_threshold, 1e-3);
    assert!(params.ras2_orbitals.is_none());
    assert!(params.to_string().contains("Claimed active electrons: derived"));
}
