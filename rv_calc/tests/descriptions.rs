use std::path::PathBuf;

use approx::assert_relative_eq;
use rv_algebra::floats::ApproxFloat;
use rv_calc::{compare_all, load_description, parse_description, summarize, Comparison};

fn description_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("descriptions").join(name)
}

#[test]
fn two_dice() {
    let desc = parse_description(include_str!("../descriptions/two_dice.json")).unwrap();
    let var = desc.to_variable().unwrap();
    let summary = summarize(&var).unwrap();
    assert_eq!(Some(7.0), summary.expectation);
    assert_relative_eq!(35.0 / 6.0, summary.variance.unwrap(), epsilon = 1e-12);
    assert_eq!(Some(7.0), summary.mode);
    assert_eq!((2.0, 12.0), summary.support);

    let pmf = var.pmf().unwrap();
    assert_eq!(11, pmf.len());
    assert!(pmf.check().is_ok());
    assert_eq!(ApproxFloat::new(1.0 / 36.0), var.pdf(2.0).unwrap());
    assert_eq!(ApproxFloat::new(1.0 / 6.0), var.pdf(7.0).unwrap());
    assert_eq!(ApproxFloat::new(1.0 / 36.0), var.pdf(12.0).unwrap());
}

#[test]
fn greatsword_from_file() {
    let desc = load_description(description_path("greatsword.json")).unwrap();
    let var = desc.to_variable().unwrap();
    assert_eq!(Ok(10.0), var.expectation());
    let results = compare_all(&var, &[(Comparison::Ge, 10.0), (Comparison::Eq, 15.0)]).unwrap();
    assert_eq!(ApproxFloat::new(21.0 / 36.0), results[0].1.probability());
    assert_eq!(ApproxFloat::new(1.0 / 36.0), results[1].1.probability());
}

#[test]
fn uniform_sum_from_file() {
    let desc = load_description(description_path("uniform_sum.json")).unwrap();
    let var = desc.to_variable().unwrap();
    let summary = summarize(&var).unwrap();
    assert!(!summary.discrete);
    assert_eq!(Some(1.0), summary.expectation);
    assert_eq!(None, summary.median);
    assert_relative_eq!(0.5, var.pdf(0.5).unwrap(), epsilon = 1e-9);
    let results = compare_all(&var, &[(Comparison::Lt, 1.0)]).unwrap();
    assert_relative_eq!(0.5, results[0].1.probability().value(), epsilon = 1e-9);
}
