use std::env;
use std::fs;

use crate::active_space::occupancy::OccupancyTable;
use crate::active_space::ActiveSpaceKind;
use crate::drivers::active_space_selection::{
    ActiveSpaceSelectionDriver, ActiveSpaceSelectionParams, ActiveSpaceSelectionResult,
};
use crate::drivers::CasGenDriver;
use crate::interfaces::dalton::{
    write_dalton_input, write_dalton_input_file, DaltonInputParams, DaltonWavefunction,
};

fn select(occupations: &[Vec<f64>], params: &ActiveSpaceSelectionParams) -> ActiveSpaceSelectionResult {
    let table = OccupancyTable::builder()
        .total_electrons(8)
        .total_nuclear_charge(8)
        .occupations(occupations)
        .build()
        .unwrap();
    let mut driver = ActiveSpaceSelectionDriver::builder()
        .parameters(params)
        .occupancy(&table)
        .build()
        .unwrap();
    driver.run().unwrap();
    driver.result().unwrap().clone()
}

fn shuffled_occupations() -> Vec<Vec<f64>> {
    vec![vec![1.99, 0.03, 1.96, 1.5, 0.5, 0.0005], vec![1.98, 0.02]]
}

fn render(params: &DaltonInputParams, selection: &ActiveSpaceSelectionResult) -> String {
    let mut buffer = Vec::new();
    write_dalton_input(&mut buffer, params, selection).unwrap();
    String::from_utf8(buffer).unwrap()
}

fn lines(lines: &[&str]) -> String {
    lines.join("\n") + "\n"
}

#[test]
fn test_interfaces_dalton_mcscf_cas_with_reorder() {
    let sel_params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.1)
        .build()
        .unwrap();
    let selection = select(&shuffled_occupations(), &sel_params);
    let output = render(&DaltonInputParams::default(), &selection);
    let expected = lines(&[
        "**DALTON INPUT",
        ".RUN WAVE FUNCTION",
        "*MOLBAS",
        ".SYMTHR",
        " 1.0D-4",
        "**WAVEFUNCTION",
        ".MCSCF",
        "*CONFIGURATION INPUT",
        ".INACTIVE",
        " 2 1 ",
        ".CAS SPACE",
        " 2 0 ",
        ".ELECTRONS",
        " 2",
        ".SYMMETRY",
        " 1",
        "*ORBITAL INPUT",
        ".MOSTART",
        " NEWORB",
        ".REORDER",
        "4 0 ",
        "2 3 3 4 4 5 5 2 ",
        "*OPTIMIZATION",
        ".STATE",
        " 1",
        ".MAX MICRO ITERATIONS",
        " 24",
        ".MAX MACRO ITERATIONS",
        " 24",
        "**END OF DALTON INPUT",
    ]);
    assert_eq!(output, expected);
}

#[test]
fn test_interfaces_dalton_ci_without_reorder() {
    let sel_params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.1)
        .build()
        .unwrap();
    let selection = select(&[vec![1.99, 1.96, 1.5, 0.5, 0.03], vec![1.98, 0.02]], &sel_params);
    let params = DaltonInputParams::builder()
        .wavefunction(DaltonWavefunction::Ci)
        .state(2)
        .max_micro_iterations(30)
        .build()
        .unwrap();
    let output = render(&params, &selection);
    assert!(!output.contains(".REORDER"));
    let expected = lines(&[
        "**DALTON INPUT",
        ".RUN WAVE FUNCTION",
        "*MOLBAS",
        ".SYMTHR",
        " 1.0D-4",
        "**WAVEFUNCTION",
        ".CI",
        "*CI VECTOR",
        ".PLUS COMBINATIONS",
        "*CI INPUT",
        ".CINO",
        ".STATE",
        " 2",
        "*CONFIGURATION INPUT",
        ".INACTIVE",
        " 2 1 ",
        ".CAS SPACE",
        " 2 0 ",
        ".ELECTRONS",
        " 2",
        ".SYMMETRY",
        " 1",
        "*ORBITAL INPUT",
        ".MOSTART",
        " NEWORB",
        "*OPTIMIZATION",
        ".DETERMI",
        ".MAX MICRO ITERATIONS",
        " 30",
        ".MAX MACRO ITERATIONS",
        " 24",
        "**END OF DALTON INPUT",
    ]);
    assert_eq!(output, expected);
}

#[test]
fn test_interfaces_dalton_mcsrdft_ras() {
    let sel_params = ActiveSpaceSelectionParams::builder()
        .kind(ActiveSpaceKind::Ras)
        .active_threshold(0.1)
        .ras2_orbitals(Some(vec![2, 0]))
        .ras2_electrons(2)
        .build()
        .unwrap();
    let selection = select(&[vec![1.99, 1.96, 1.5, 0.5, 0.03, 0.0005], vec![1.98, 0.02]], &sel_params);
    let params = DaltonInputParams::builder()
        .wavefunction(DaltonWavefunction::McSrDft)
        .symmetry(2)
        .ras1_holes([0, 1])
        .build()
        .unwrap();
    let output = render(&params, &selection);
    let expected = lines(&[
        "**DALTON INPUT",
        ".RUN WAVE FUNCTION",
        "*MOLBAS",
        ".SYMTHR",
        " 1.0D-4",
        "**WAVEFUNCTION",
        ".MCSRDFT",
        ".SRFUN",
        " SRXPBEHSE SRCPBERI",
        "*CONFIGURATION INPUT",
        ".INACTIVE",
        " 0 0 ",
        ".RAS1 SPACE",
        " 2 1 ",
        ".RAS2 SPACE",
        " 2 0 ",
        ".RAS3 SPACE",
        " 1 1 ",
        ".RAS1 HOLES",
        " 0 1",
        ".RAS3 ELECTRONS",
        " 0 2",
        ".ELECTRONS",
        " 8",
        ".SYMMETRY",
        " 2",
        "*ORBITAL INPUT",
        ".MOSTART",
        " NEWORB",
        "*OPTIMIZATION",
        ".STATE",
        " 1",
        ".MAX MICRO ITERATIONS",
        " 24",
        ".MAX MACRO ITERATIONS",
        " 24",
        "**INTEGRALS",
        "*TWOINT",
        ".DOSRIN",
        ".ERF",
        " 0.4",
        "**END OF DALTON INPUT",
    ]);
    assert_eq!(output, expected);
}

#[test]
fn test_interfaces_dalton_rejects_inconsistent_budget() {
    let sel_params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.1)
        .build()
        .unwrap();
    let mut selection = select(&shuffled_occupations(), &sel_params);
    selection.electron_budget.active_electrons = 4;
    let mut buffer = Vec::new();
    assert!(write_dalton_input(&mut buffer, &DaltonInputParams::default(), &selection).is_err());
    assert!(buffer.is_empty());
}

#[test]
fn test_interfaces_dalton_write_file() {
    let sel_params = ActiveSpaceSelectionParams::builder()
        .active_threshold(0.1)
        .build()
        .unwrap();
    let selection = select(&shuffled_occupations(), &sel_params);
    let params = DaltonInputParams::builder()
        .output_file(env::temp_dir().join("casgen_dalton_test.dal"))
        .build()
        .unwrap();
    let path = write_dalton_input_file(&params, &selection).unwrap();
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, render(&params, &selection));
    fs::remove_file(&path).unwrap();
}
