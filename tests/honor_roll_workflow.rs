//! End-to-end runs: grade export import, batch evaluation, and honor roll reporting.

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use honor_engine::workflows::honors::{
    CatalogError, CriterionCatalog, EvaluationError, GradeBook, GradingCalendar, GradingPeriod,
    HonorEvaluationService, HonorTypeKey, LevelKey, PeriodId, SchoolYear, Semester, StudentId,
};

const GRADE_HEADER: &str =
    "student_id,subject_id,level,period_id,school_year,grade,year_of_study,semester\n";

fn grade_export() -> String {
    let mut csv = GRADE_HEADER.to_string();
    for (subject, grade) in [("math", 96), ("science", 96), ("english", 96), ("filipino", 96), ("pe", 96)] {
        csv.push_str(&format!("elem-1,{subject},elementary,final,2024-2025,{grade},4,\n"));
    }
    for (subject, grade) in [("math", 96), ("science", 95), ("english", 97), ("filipino", 93), ("pe", 91)] {
        csv.push_str(&format!("elem-2,{subject},elementary,final,2024-2025,{grade},4,\n"));
    }
    for subject in ["math", "science", "english"] {
        csv.push_str(&format!("elem-3,{subject},elementary,final,2024-2025,84,4,\n"));
    }
    // Corrected grade for the same slot replaces the first submission.
    csv.push_str("elem-3,math,elementary,final,2024-2025,86,4,\n");
    csv
}

fn college_export() -> String {
    let mut csv = GRADE_HEADER.to_string();
    for (year_of_study, school_year) in [(1, "2021-2022"), (2, "2022-2023"), (3, "2023-2024"), (4, "2024-2025")] {
        for (semester, tag) in [("first", "1st"), ("second", "2nd")] {
            for subject in ["core", "major"] {
                csv.push_str(&format!(
                    "col-1,{subject}-{year_of_study}-{semester},college,{semester}-final,{school_year},96,{year_of_study},{tag}\n"
                ));
                csv.push_str(&format!(
                    "col-2,{subject}-{year_of_study}-{semester},college,{semester}-final,{school_year},{grade},{year_of_study},{tag}\n",
                    grade = if year_of_study == 2 && semester == "second" { 85 } else { 94 }
                ));
            }
        }
    }
    csv
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn period(id: &str, school_year: &str, semester: Semester, starts_on: NaiveDate, ends_on: NaiveDate) -> GradingPeriod {
    GradingPeriod {
        id: PeriodId(id.to_string()),
        level: LevelKey::College,
        school_year: SchoolYear(school_year.to_string()),
        semester: Some(semester),
        starts_on,
        ends_on,
    }
}

#[test]
fn school_year_roll_from_grade_export() {
    let book = GradeBook::from_reader(grade_export().as_bytes()).expect("grades import");
    assert_eq!(book.len(), 13);

    let service = HonorEvaluationService::new(Arc::new(book), CriterionCatalog::standard());
    let roll = service
        .evaluate_school_year(LevelKey::Elementary, &SchoolYear("2024-2025".to_string()))
        .expect("roll built");

    let summary = roll.summary();
    let awarded: Vec<(&str, HonorTypeKey)> = summary
        .awards
        .iter()
        .map(|view| (view.student_id.0.as_str(), view.honor))
        .collect();
    assert_eq!(
        awarded,
        vec![
            ("elem-1", HonorTypeKey::WithHighHonors),
            ("elem-2", HonorTypeKey::WithHonors),
        ]
    );
    assert_eq!(summary.awards[1].gpa, 94.4);
    assert_eq!(summary.not_awarded, 1);
    assert!(summary.unevaluated.is_empty());

    let json = summary.to_json_pretty().expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(value["awards"][0]["level_label"], "Elementary");
    assert_eq!(value["tallies"].as_array().map(Vec::len), Some(2));
}

#[test]
fn program_roll_and_term_chain_from_college_export() {
    let book = GradeBook::from_reader(college_export().as_bytes()).expect("grades import");
    let service = HonorEvaluationService::new(Arc::new(book), CriterionCatalog::standard())
        .with_threads(2)
        .expect("pool");

    let roll = service.evaluate_program().expect("program roll");
    assert_eq!(roll.awards_for(HonorTypeKey::SummaCumLaude).len(), 1);
    assert_eq!(roll.not_awarded, vec![StudentId("col-2".to_string())]);

    let calendar = GradingCalendar::new(vec![
        period("2022-2023-second", "2022-2023", Semester::Second, date(2023, 1, 9), date(2023, 5, 19)),
        period("2022-2023-first", "2022-2023", Semester::First, date(2022, 8, 15), date(2022, 12, 16)),
        period("2023-2024-first", "2023-2024", Semester::First, date(2023, 8, 14), date(2023, 12, 15)),
    ])
    .expect("calendar");
    let terms = calendar.college_terms();

    let outcomes = service.evaluate_terms(&terms).expect("terms evaluated");
    let by_student: Vec<(&str, Vec<Option<HonorTypeKey>>)> = outcomes
        .iter()
        .map(|student| {
            (
                student.student_id.0.as_str(),
                student
                    .terms
                    .iter()
                    .map(|outcome| outcome.award().map(|result| result.honor))
                    .collect(),
            )
        })
        .collect();

    assert_eq!(
        by_student,
        vec![
            (
                "col-1",
                vec![
                    Some(HonorTypeKey::CollegeHonors),
                    Some(HonorTypeKey::DeansList),
                    Some(HonorTypeKey::DeansList),
                ]
            ),
            (
                "col-2",
                vec![
                    Some(HonorTypeKey::CollegeHonors),
                    None,
                    // GPA 94 clears Dean's List, but the preceding term held no honor.
                    Some(HonorTypeKey::CollegeHonors),
                ]
            ),
        ]
    );
}

#[test]
fn criterion_catalog_loads_from_csv_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "level,honor,rule,min_gpa,max_gpa,min_grade,span,years_of_study,active").expect("write");
    writeln!(file, "elementary,with_high_honors,gpa_range_with_floor,94,97,88,full_year,,").expect("write");
    writeln!(file, "elementary,with_honors,gpa_floor,88,,,full_year,,").expect("write");

    let catalog = CriterionCatalog::from_path(file.path()).expect("catalog loads");
    let book = GradeBook::from_reader(grade_export().as_bytes()).expect("grades import");
    let roll = HonorEvaluationService::new(Arc::new(book), catalog)
        .evaluate_school_year(LevelKey::Elementary, &SchoolYear("2024-2025".to_string()))
        .expect("roll built");

    assert_eq!(roll.awards_for(HonorTypeKey::WithHighHonors).len(), 2);
}

#[test]
fn misordered_level_is_disabled_without_blocking_others() {
    let csv = "level,honor,rule,min_gpa,max_gpa,min_grade,span,years_of_study,active\n\
elementary,with_honors,gpa_floor,90,,,full_year,,\n\
college,cum_laude,no_grade_below,,,87,multi_year_1_to_4,,\n\
college,summa_cum_laude,no_grade_below,,,95,multi_year_1_to_4,,\n";
    let catalog = CriterionCatalog::from_reader(csv.as_bytes()).expect("rows parse");
    let faults: Vec<(LevelKey, bool)> = catalog
        .faults()
        .map(|(level, error)| (level, matches!(error, CatalogError::InvalidCriterionRange { .. })))
        .collect();
    assert_eq!(faults, vec![(LevelKey::College, true)]);

    let export = grade_export() + college_export().trim_start_matches(GRADE_HEADER);
    let book = GradeBook::from_reader(export.as_bytes()).expect("grades import");
    let service = HonorEvaluationService::new(Arc::new(book), catalog);

    let elementary = service
        .evaluate_school_year(LevelKey::Elementary, &SchoolYear("2024-2025".to_string()))
        .expect("elementary roll");
    assert_eq!(elementary.awards.len(), 2);

    let college = service.evaluate_program().expect("college roll");
    assert!(college.awards.is_empty());
    assert_eq!(college.unevaluated.len(), 2);
    assert!(college
        .unevaluated
        .iter()
        .all(|entry| matches!(entry.error, EvaluationError::Catalog { .. })));
}
