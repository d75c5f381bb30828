use callboard::{
    aggregate, ingest, ChartClick, DataStatus, Dataset, FilterState, IngestError, RawUploadPayload,
    Session,
};

const HEADER: &str = "DATE,SERVICE CATEGORY,SERVICE- SUB CATEGORY,DESCRIPTION / RESOLUTION";

/// Build an upload payload from CSV data rows under the standard header.
fn upload(filename: &str, rows: &[&str]) -> RawUploadPayload {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    RawUploadPayload::from_bytes(filename, text.as_bytes())
}

fn hotel_week() -> Dataset {
    ingest(
        upload(
            "week.csv",
            &[
                "2024-03-01,Housekeeping,Towels,Delivered extra towels",
                "2024-03-01,Maintenance,AC,Reset thermostat",
                "2024-03-02,Maintenance,Plumbing,Fixed leaking tap",
                "2024-03-02,Front Desk,Keys,Reissued key card",
                "2024-03-02,Maintenance,AC,Reset thermostat",
                "2024-03-04,Housekeeping,Linen,Changed linen",
                "2024-03-04,Maintenance,AC,Replaced filter",
                "2023-12-30,Maintenance,AC,Too old to count",
            ],
        ),
        2024,
    )
    .expect("week ingests")
    .dataset
}

#[test]
fn test_scenario_a_unfiltered_totals() {
    let dataset = ingest(
        upload(
            "a.csv",
            &[
                "2024-01-01,X,x1,one",
                "2024-01-02,X,x2,two",
                "2024-01-02,Y,y1,three",
            ],
        ),
        2024,
    )
    .unwrap()
    .dataset;

    let result = aggregate(&dataset, &FilterState::new());
    assert_eq!(result.total_calls, 3);
    assert_eq!(result.service_categories, 2);
}

#[test]
fn test_scenario_b_category_click_keeps_pie() {
    let dataset = ingest(
        upload(
            "b.csv",
            &[
                "2024-01-01,X,x1,one",
                "2024-01-02,X,x2,two",
                "2024-01-02,Y,y1,three",
            ],
        ),
        2024,
    )
    .unwrap()
    .dataset;

    let result = aggregate(&dataset, &FilterState::new().with_category_click("X"));
    let subs: Vec<(&str, usize)> = result
        .sub_category_breakdown
        .iter()
        .map(|e| (e.label.as_str(), e.count))
        .collect();
    assert_eq!(subs, vec![("x1", 1), ("x2", 1)]);

    let pie: Vec<(&str, usize)> = result
        .category_breakdown
        .iter()
        .map(|e| (e.label.as_str(), e.count))
        .collect();
    assert_eq!(pie, vec![("X", 2), ("Y", 1)]);
}

#[test]
fn test_scenario_c_nothing_after_floor_keeps_stored_dataset() {
    let mut session = Session::default();
    assert!(session.upload(Some(upload("good.csv", &["2024-06-01,X,x1,ok"]))).accepted);

    let response = session.upload(Some(upload(
        "legacy.csv",
        &["2022-06-01,X,x1,old", "2023-12-31,Y,y1,older"],
    )));
    assert!(!response.accepted);
    assert!(response.status.contains("No valid data"));
    assert!(response.status.contains("legacy.csv"));
    assert_eq!(response.date_range, "");
    assert_eq!(session.dataset().map(|d| d.len()), Some(1));
    assert_eq!(session.refresh(&FilterState::new()).total_calls, 1);
}

#[test]
fn test_scenario_d_unmatched_sub_category_click() {
    let dataset = hotel_week();
    let filter = FilterState::new().with_sub_category_click("Minibar");
    let result = aggregate(&dataset, &filter);
    assert!(result.resolutions.is_empty());
    assert_eq!(result.status, DataStatus::Ready);
    assert_eq!(result.total_calls, dataset.len());
}

#[test]
fn test_total_matches_restriction_and_series_sum() {
    let dataset = hotel_week();
    let filters = [
        FilterState::new(),
        FilterState::new().with_categories(["Maintenance", "Front Desk"]),
        FilterState::new().with_categories(["All", "Maintenance"]),
        FilterState::new().with_category_click("Housekeeping"),
        FilterState::new()
            .with_category_click("Maintenance")
            .with_sub_category_click("AC"),
        FilterState::new().with_category_click("Nobody"),
    ];

    for filter in &filters {
        let result = aggregate(&dataset, filter);
        let selection = filter.category_selection();
        let expected = dataset
            .iter()
            .filter(|r| selection.admits(&r.service_category))
            .count();
        let series_sum: usize = result.calls_over_time.iter().map(|p| p.count).sum();
        assert_eq!(result.total_calls, expected, "filter {:?}", filter);
        assert_eq!(series_sum, expected, "filter {:?}", filter);
    }
}

#[test]
fn test_aggregate_is_deterministic() {
    let dataset = hotel_week();
    let filter = FilterState::new()
        .with_category_click("Maintenance")
        .with_sub_category_click("AC");
    let first = aggregate(&dataset, &filter);
    let second = aggregate(&dataset, &filter);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_category_breakdown_ignores_filters() {
    let dataset = hotel_week();
    let baseline = aggregate(&dataset, &FilterState::new()).category_breakdown;
    for filter in [
        FilterState::new().with_categories(["Housekeeping"]),
        FilterState::new().with_category_click("Front Desk"),
        FilterState::new().with_sub_category_click("AC"),
    ] {
        assert_eq!(aggregate(&dataset, &filter).category_breakdown, baseline);
    }
}

#[test]
fn test_week_numbers() {
    let dataset = hotel_week();
    assert_eq!(dataset.len(), 7);

    let result = aggregate(&dataset, &FilterState::new().with_categories(["Maintenance"]));
    assert_eq!(result.total_calls, 4);
    assert_eq!(result.sub_categories, 2);
    // 4 rows over 3 observed dates
    assert_eq!(result.kpi_labels().avg_calls_per_day, "1.33");
    assert_eq!(
        result.resolutions,
        vec!["Reset thermostat", "Fixed leaking tap", "Replaced filter"]
    );
    assert_eq!(result.sub_category_breakdown[0].label, "AC");
    assert_eq!(result.sub_category_breakdown[0].count, 3);
}

#[test]
fn test_click_events_from_json() {
    let dataset = hotel_week();
    let category = ChartClick::from_json(r#"{"points":[{"label":"Maintenance","value":4}]}"#).unwrap();
    let sub = ChartClick::from_json(r#"{"points":[{"label":"Plumbing"}]}"#).unwrap();
    let filter = FilterState::from_events(Some(vec!["Housekeeping".to_string()]), Some(&category), Some(&sub));
    let result = aggregate(&dataset, &filter);
    assert_eq!(result.total_calls, 4);
    assert_eq!(result.resolutions, vec!["Fixed leaking tap"]);
}

#[test]
fn test_reingesting_same_bytes_is_identical() {
    let rows = [
        "03/02/2024,Maintenance,AC,Reset",
        "2024-03-01 09:15:00,Housekeeping,Towels,Sent",
        "bad,Housekeeping,Towels,Sent",
    ];
    let payload = upload("again.csv", &rows);
    let first = ingest(payload.clone(), 2024).unwrap();
    let second = ingest(payload, 2024).unwrap();
    assert_eq!(first.dataset, second.dataset);
    assert_eq!(first.date_range, second.date_range);
    assert_eq!(first.date_range.to_string(), "Data available from 2024-03-01 to 2024-03-02");
}

#[test]
fn test_year_floor_boundary() {
    let payload = upload(
        "edge.csv",
        &["2025-01-01,X,x,kept", "2024-12-31,X,x,dropped"],
    );
    let outcome = ingest(payload, 2025).unwrap();
    assert_eq!(outcome.dataset.len(), 1);
    assert_eq!(outcome.dataset.records()[0].resolution_text, "kept");
    assert_eq!(outcome.report.before_floor, 1);
}

#[test]
fn test_unreadable_payloads() {
    let not_base64 = RawUploadPayload::new("data:text/csv;base64,@@@", "broken.csv");
    let err = ingest(not_base64, 2024).unwrap_err();
    assert!(matches!(err, IngestError::Unreadable { .. }));
    assert!(err.to_string().starts_with("Error processing file:"));

    let not_a_workbook = RawUploadPayload::from_bytes("calls.xlsx", b"plain text, not a zip");
    let err = ingest(not_a_workbook, 2024).unwrap_err();
    assert!(matches!(err, IngestError::Unreadable { .. }));
    assert_eq!(err.filename(), "calls.xlsx");
}

#[test]
fn test_schema_mismatch() {
    let payload = RawUploadPayload::from_bytes(
        "renamed.csv",
        b"Date,Service Category,SERVICE- SUB CATEGORY,DESCRIPTION / RESOLUTION\n2024-01-01,X,x,r\n",
    );
    match ingest(payload, 2024) {
        Err(IngestError::SchemaMismatch { missing, .. }) => {
            assert_eq!(missing, vec!["DATE", "SERVICE CATEGORY"]);
        }
        other => panic!("expected schema mismatch, got {:?}", other),
    }
}

#[test]
fn test_average_per_day_rounds_exact_half_up() {
    let first = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut rows: Vec<String> = (0..200)
        .map(|offset| {
            let date = first + chrono::Duration::days(offset);
            format!("{},Maintenance,AC,Reset", date.format("%Y-%m-%d"))
        })
        .collect();
    rows.push("2024-01-01,Maintenance,AC,Reset again".to_string());
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

    let dataset = ingest(upload("busy.csv", &rows), 2024).unwrap().dataset;
    let result = aggregate(&dataset, &FilterState::new());
    assert_eq!(result.total_calls, 201);
    assert_eq!(result.calls_over_time.len(), 200);
    // 201 / 200 = 1.005
    assert_eq!(result.kpi_labels().avg_calls_per_day, "1.01");
}
