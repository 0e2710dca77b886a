mod common;

use obesity_predictor::types::input::{Frequency, Gender, TransportMode, YesNo};
use obesity_predictor::RawInput;

fn sample_input() -> RawInput {
    RawInput {
        age: 25.0,
        gender: Gender::Male,
        height: 1.75,
        weight: 70.0,
        family_history_with_overweight: YesNo::Yes,
        favc: YesNo::Yes,
        fcvc: 2.0,
        ncp: 3.0,
        caec: Frequency::Sometimes,
        ch2o: 2.0,
        calc: Frequency::No,
        scc: YesNo::No,
        faf: 1.0,
        tue: 1.0,
        smoke: YesNo::No,
        mtrans: Some(TransportMode::PublicTransportation),
    }
}

#[test]
fn sample_submission_encodes_and_predicts() {
    let predictor = common::predictor();

    let report = predictor.predict(&sample_input()).unwrap();
    let row = &report.features;

    assert_eq!(row.columns.to_vec(), predictor.artifacts().schema);
    let expected = [
        ("Gender", 1.0),
        ("Age", 25.0),
        ("Height", 1.75),
        ("Weight", 70.0),
        ("family_history_with_overweight", 1.0),
        ("FAVC", 1.0),
        ("FCVC", 2.0),
        ("NCP", 3.0),
        ("CAEC", 1.0),
        ("SMOKE", 0.0),
        ("CH2O", 2.0),
        ("SCC", 0.0),
        ("FAF", 1.0),
        ("TUE", 1.0),
        ("CALC", 0.0),
        ("MTRANS_Automobile", 0.0),
        ("MTRANS_Bike", 0.0),
        ("MTRANS_Motorbike", 0.0),
        ("MTRANS_Public_Transportation", 1.0),
        ("MTRANS_Walking", 0.0),
    ];
    for (column, value) in expected {
        assert_eq!(row.get(column), Some(value), "column {}", column);
    }

    assert!(predictor
        .artifacts()
        .labels
        .values()
        .any(|label| *label == report.label));
    assert_eq!(report.label, "Normal_Weight");
}

#[test]
fn heavier_input_moves_up_the_scale() {
    let predictor = common::predictor();
    let mut input = sample_input();
    input.weight = 130.0;

    let report = predictor.predict(&input).unwrap();
    assert_eq!(report.label, "Obesity_Type_III");
}

#[test]
fn every_valid_transport_yields_a_full_row() {
    let predictor = common::predictor();

    for mode in TransportMode::ALL {
        let mut input = sample_input();
        input.mtrans = Some(mode);
        let row = predictor.encoder().encode(&input);

        assert_eq!(row.len(), predictor.artifacts().schema.len());
        let hot = row
            .iter()
            .filter(|(c, v)| c.starts_with("MTRANS_") && *v == 1.0)
            .count();
        assert_eq!(hot, 1);
    }
}
