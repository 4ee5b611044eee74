//! End-to-end acceptance scenarios on the default plan.

use chrono::NaiveDate;
use weightcheck::config::InspectionPlan;
use weightcheck::inspection::{
    ControlSession, FirstRound, GeneralInfo, RejectionReason, Verdict,
};
use weightcheck::plan::{StandardZonePolicy, ZonePolicy};
use weightcheck::stats::summarize;
use weightcheck::InspectionError;

fn info(weight: f64, quantity: u64) -> GeneralInfo {
    GeneralInfo {
        operator: "Operator".into(),
        product: "Supérieur fort".into(),
        manufacture_date: NaiveDate::from_ymd_opt(2025, 11, 20),
        packaging_date: NaiveDate::from_ymd_opt(2025, 11, 25),
        embossing_day: Some(24),
        product_weight: weight,
        theoretical_quantity: quantity,
        lot_override: None,
    }
}

/// 30 units of 100 g, all at 96.0 g: no non-conforming unit, s = 0.
#[test]
fn scenario_a_accept_first_round() {
    let plan = InspectionPlan::default();
    let session = ControlSession::new(&plan, info(100.0, 400)).expect("session");
    assert!((session.minimum() - 95.5).abs() < f64::EPSILON);
    assert_eq!(session.sample_size(), 30);

    let outcome = session.first_round(&[96.0; 30]).expect("valid");
    let first = outcome.report();
    assert_eq!(first.non_conforming, 0);
    assert_eq!((first.zones.accept_max, first.zones.refuse_min), (0, 2));
    assert!((first.summary.mean - 96.0).abs() < 1e-12);
    assert!(first.summary.std_dev.abs() < 1e-12);
    assert_eq!(first.mean_test.g(), Some(0.239));
    assert!((first.mean_test.threshold().expect("evaluated") - 95.5).abs() < 1e-12);

    let report = outcome.into_final().expect("decisive");
    assert_eq!(report.verdict, Verdict::Accepted);
}

/// Three units below 95.5 g reject outright even with a good mean.
#[test]
fn scenario_b_reject_first_round() {
    let plan = InspectionPlan::default();
    let session = ControlSession::new(&plan, info(100.0, 400)).expect("session");
    let mut values = vec![98.0; 30];
    values[3] = 95.4;
    values[11] = 94.0;
    values[27] = 95.0;

    match session.first_round(&values).expect("valid") {
        FirstRound::Rejected(report) => {
            assert_eq!(report.first.non_conforming, 3);
            assert!(report.first.mean_test.passed());
            assert_eq!(
                report.verdict,
                Verdict::Rejected(RejectionReason::NonConforming)
            );
            assert!(report.second.is_none());
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

/// One non-conforming unit sends the lot to a second round; a clean second
/// round keeps the total within the combined tolerance of 1.
#[test]
fn scenario_c_second_round() {
    let plan = InspectionPlan::default();
    let session = ControlSession::new(&plan, info(100.0, 400)).expect("session");
    let mut first = vec![96.8; 30];
    first[14] = 95.2;

    let FirstRound::Inconclusive(pending) = session.first_round(&first).expect("valid") else {
        panic!("expected a second round");
    };
    assert_eq!(pending.first().non_conforming, 1);

    let second = vec![96.9; 30];
    let report = pending.evaluate(&second).expect("valid");
    let round2 = report.second.as_ref().expect("second round report");
    assert_eq!(round2.non_conforming, 0);
    assert_eq!(round2.total_non_conforming, 1);
    assert_eq!(round2.combined.max_non_conforming, 1);
    assert_eq!(round2.pooled.n, 60);

    let pooled: Vec<f64> = first.iter().chain(&second).copied().collect();
    let expected = summarize(&pooled).expect("pooled");
    assert!((round2.pooled.mean - expected.mean).abs() < 1e-12);
    assert!((round2.pooled.std_dev - expected.std_dev).abs() < 1e-12);

    // The pooled mean test decides the verdict
    assert_eq!(report.is_accepted(), round2.mean_test.passed());
    assert!(report.is_accepted());
}

/// A pooled sample too close to the minimum rejects on the mean test alone.
#[test]
fn scenario_c_second_round_mean_test_failure() {
    let plan = InspectionPlan::default();
    let session = ControlSession::new(&plan, info(100.0, 400)).expect("session");
    // Pooled: mean 95.733, s 1.874, threshold 95.5 + 0.167 * 1.874 = 95.813
    let mut first = vec![95.5; 30];
    first[0] = 95.0;
    first[1] = 110.0;

    let FirstRound::Inconclusive(pending) = session.first_round(&first).expect("valid") else {
        panic!("expected a second round");
    };
    let report = pending.evaluate(&[95.5; 30]).expect("valid");
    assert_eq!(report.total_non_conforming(), 1);
    assert_eq!(report.verdict, Verdict::Rejected(RejectionReason::MeanTest));
}

#[test]
fn scenario_d_large_lot_sample_size() {
    let plan = InspectionPlan::default();
    let session = ControlSession::new(&plan, info(250.0, 3500)).expect("session");
    assert_eq!(session.sample_size(), 80);
    let zones = StandardZonePolicy.first_round(80).expect("certified");
    assert_eq!((zones.accept_max, zones.refuse_min), (1, 4));
}

#[test]
fn scenario_e_undefined_weight_class() {
    let plan = InspectionPlan::default();
    assert_eq!(plan.tolerances.minimum_for(999.0), None);
    let err = ControlSession::new(&plan, info(999.0, 400)).unwrap_err();
    assert!(matches!(
        err,
        InspectionError::UndefinedTolerance { weight_class: 999 }
    ));
    assert!(err.to_string().contains("999"));
}

#[test]
fn custom_plan_from_toml() {
    let plan = InspectionPlan::from_toml_str(
        r#"
        line = "OMORI 3"
        [[tolerances]]
        nominal = 999
        minimum = 984.0
        "#,
    )
    .expect("plan");
    let session = ControlSession::new(&plan, info(999.0, 200)).expect("session");
    assert_eq!(session.sample_size(), 30);
    let report = session
        .first_round(&[990.0; 30])
        .expect("valid")
        .into_final()
        .expect("decisive");
    assert!(report.is_accepted());
}

/// A product weight halfway between two grams takes the even class.
#[test]
fn half_gram_weight_takes_even_class() {
    let plan = InspectionPlan::default();
    let session = ControlSession::new(&plan, info(100.5, 400)).expect("session");
    assert_eq!(session.weight_class(), 100);
    assert!((session.minimum() - 95.5).abs() < f64::EPSILON);

    let err = ControlSession::new(&plan, info(84.5, 400)).unwrap_err();
    assert!(matches!(
        err,
        InspectionError::UndefinedTolerance { weight_class: 84 }
    ));
}

#[test]
fn plan_without_g_factors_is_refused() {
    assert!(InspectionPlan::from_toml_str("g_factors = []").is_err());
}
