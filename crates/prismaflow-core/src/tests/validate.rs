use crate::*;

fn core_data() -> FlowData {
    let mut data = FlowData::default();
    let c = &mut data.counts;
    c.database_results = Some(100);
    c.records_screened = Some(80);
    c.records_excluded = Some(20);
    c.dbr_sought_reports = Some(60);
    c.dbr_notretrieved_reports = Some(5);
    c.dbr_assessed = Some(55);
    c.new_studies = Some(40);
    c.new_reports = Some(42);
    data.dbr_excluded = Exclusions::Total(15);
    data
}

#[test]
fn core_data_validates_without_wings() {
    let data = core_data();
    let wings = Wings::resolve(&data, &DiagramOptions::default());
    assert_eq!(wings, Wings::NEITHER);
    data.validate(wings).unwrap();
}

#[test]
fn wing_requirements_follow_active_wings() {
    let mut data = core_data();
    data.counts.previous_studies = Some(3);
    data.counts.citations_results = Some(7);
    let wings = Wings::resolve(&data, &DiagramOptions::default());
    assert_eq!(wings, Wings::BOTH);

    let err = data.validate(wings).unwrap_err();
    assert_eq!(err.to_string(), "Required count `total_studies` is missing");

    data.counts.total_studies = Some(43);
    data.counts.total_reports = Some(50);
    let err = data.validate(wings).unwrap_err();
    assert!(matches!(
        err,
        Error::RequiredCountMissing {
            field: Field::OtherSoughtReports
        }
    ));
}

#[test]
fn wings_require_both_the_flag_and_data() {
    let mut data = core_data();
    data.counts.previous_reports = Some(1);
    data.counts.organisation_results = Some(2);

    let opts = DiagramOptions {
        previous: false,
        ..DiagramOptions::default()
    };
    assert_eq!(
        Wings::resolve(&data, &opts),
        Wings {
            previous: false,
            other: true
        }
    );

    let opts = DiagramOptions {
        other: false,
        ..DiagramOptions::default()
    };
    assert_eq!(
        Wings::resolve(&data, &opts),
        Wings {
            previous: true,
            other: false
        }
    );
}

#[test]
fn missing_exclusion_table_fails_validation() {
    let mut data = core_data();
    data.dbr_excluded = Exclusions::Missing;
    let err = data.validate(Wings::NEITHER).unwrap_err();
    assert!(matches!(
        err,
        Error::RequiredCountMissing {
            field: Field::DbrExcluded
        }
    ));
}

#[test]
fn flow_data_serializes_to_json() {
    let data = core_data();
    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(value["counts"]["records_screened"], 80);
    assert_eq!(value["dbr_excluded"]["kind"], "total");
    assert_eq!(value["dbr_excluded"]["value"], 15);
    let back: FlowData = serde_json::from_value(value).unwrap();
    assert_eq!(back, data);
}
