// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Percentages on a scale whose top value is not `1`.

use super::helpers::{Fixture, create_test_cause, question_answer, setup};
use crate::request_response::{
    AuditMetadataInput, CategoryScoreInfo, CreateAuditRequest, CreateQuestionnaireRequest,
    CreateScaleRequest, QuestionInput, ScaleValueInput, UpdateAuditRequest,
};
use crate::{
    complete_audit, create_audit, create_questionnaire, create_scale, export_completed_audits_csv,
    get_audit, get_company_statistics, get_questionnaire_version, update_audit,
};

fn question(text: &str, category: Option<&str>) -> QuestionInput {
    QuestionInput {
        text: text.to_string(),
        weight: 1.0,
        category: category.map(str::to_string),
        has_subitems: false,
        subitems: Vec::new(),
    }
}

/// Greeting (Opening), Wrap-up (a category literally named "Uncategorized")
/// and Closing (no category), each of weight 1 on a 10 / 5 / 0 scale.
/// Returns the questionnaire id and the three question ids.
fn ten_point_questionnaire(fixture: &mut Fixture) -> (i64, [i64; 3]) {
    let scale_id = create_scale(
        &mut fixture.persistence,
        CreateScaleRequest {
            name: String::from("Ten point"),
            is_default: false,
            values: vec![
                ScaleValueInput {
                    value: 10.0,
                    label: String::from("Excellent"),
                },
                ScaleValueInput {
                    value: 5.0,
                    label: String::from("Adequate"),
                },
                ScaleValueInput {
                    value: 0.0,
                    label: String::from("Missing"),
                },
            ],
        },
        &fixture.admin.actor,
    )
    .unwrap()
    .scale_id;

    let created = create_questionnaire(
        &mut fixture.persistence,
        CreateQuestionnaireRequest {
            name: String::from("Inbound calls"),
            description: None,
            scale_id: Some(scale_id),
            questions: vec![
                question("Greeting", Some("Opening")),
                question("Wrap-up", Some("Uncategorized")),
                question("Closing", None),
            ],
        },
        &fixture.admin.actor,
    )
    .unwrap();
    assert_eq!(created.scale_id, scale_id);

    let tree = get_questionnaire_version(
        &mut fixture.persistence,
        created.version_id,
        &fixture.admin.actor,
    )
    .unwrap();
    let id = |text: &str| {
        tree.questions
            .iter()
            .find(|q| q.text == text)
            .unwrap()
            .question_id
    };
    (
        created.questionnaire_id,
        [id("Greeting"), id("Wrap-up"), id("Closing")],
    )
}

/// Answers 10 / 5 / 0 and completes; returns the audit id, the total score
/// and the category breakdown of the completion response.
fn complete_ten_point_audit(fixture: &mut Fixture) -> (i64, f64, Vec<CategoryScoreInfo>) {
    let (questionnaire_id, [greeting, wrap_up, closing]) = ten_point_questionnaire(fixture);

    let audit_id = create_audit(
        &mut fixture.persistence,
        CreateAuditRequest {
            company_id: fixture.company_id,
            manager_id: Some(fixture.manager_id),
            questionnaire_id,
            metadata: AuditMetadataInput {
                call_date: Some(String::from("2026-04-02")),
                call_reference: Some(String::from("CRM-2001")),
                summary: None,
            },
        },
        &fixture.analyst.actor,
        &fixture.analyst.operator,
        create_test_cause(),
    )
    .unwrap()
    .audit_id;

    update_audit(
        &mut fixture.persistence,
        audit_id,
        UpdateAuditRequest {
            answers: vec![
                question_answer(greeting, Some(10.0)),
                question_answer(wrap_up, Some(5.0)),
                question_answer(closing, Some(0.0)),
            ],
            metadata: None,
        },
        &fixture.analyst.actor,
        &fixture.analyst.operator,
        create_test_cause(),
    )
    .unwrap();

    let completed = complete_audit(
        &mut fixture.persistence,
        audit_id,
        &fixture.analyst.actor,
        &fixture.analyst.operator,
        create_test_cause(),
    )
    .unwrap();
    (audit_id, completed.total_score, completed.categories)
}

fn percent_of(categories: &[CategoryScoreInfo], category: Option<&str>) -> f64 {
    categories
        .iter()
        .find(|c| c.category.as_deref() == category)
        .unwrap()
        .percent
}

#[test]
fn test_completion_categories_are_percentages_of_scale_maximum() {
    let mut fixture = setup();
    let (_, total_score, categories) = complete_ten_point_audit(&mut fixture);

    assert_eq!(total_score, 50.0);
    assert_eq!(categories.len(), 3);
    assert_eq!(percent_of(&categories, Some("Opening")), 100.0);
    assert_eq!(percent_of(&categories, Some("Uncategorized")), 50.0);
    assert_eq!(percent_of(&categories, None), 0.0);

    let opening = categories
        .iter()
        .find(|c| c.category.as_deref() == Some("Opening"))
        .unwrap();
    assert_eq!(opening.score, 10.0);
}

#[test]
fn test_audit_detail_reports_ratio_and_percentages_of_scale_maximum() {
    let mut fixture = setup();
    let (audit_id, _, _) = complete_ten_point_audit(&mut fixture);

    let detail = get_audit(&mut fixture.persistence, audit_id, &fixture.analyst.actor).unwrap();

    assert_eq!(detail.total_score, Some(50.0));
    assert_eq!(detail.percentage, 50.0);
    assert_eq!(detail.overall_ratio, 0.5);
    assert_eq!(percent_of(&detail.categories, Some("Opening")), 100.0);
    assert_eq!(percent_of(&detail.categories, Some("Uncategorized")), 50.0);
    assert_eq!(percent_of(&detail.categories, None), 0.0);
}

#[test]
fn test_statistics_category_averages_are_percentages_of_scale_maximum() {
    let mut fixture = setup();
    complete_ten_point_audit(&mut fixture);

    let stats = get_company_statistics(
        &mut fixture.persistence,
        fixture.company_id,
        &fixture.analyst.actor,
    )
    .unwrap();

    assert_eq!(stats.summary.count, 1);
    assert_eq!(stats.summary.average, 50.0);
    assert_eq!(stats.categories.len(), 3);

    let average = |category: Option<&str>| {
        stats
            .categories
            .iter()
            .find(|c| c.category.as_deref() == category)
            .unwrap()
    };
    assert_eq!(average(Some("Opening")).average_percent, 100.0);
    assert_eq!(average(Some("Uncategorized")).average_percent, 50.0);
    assert_eq!(average(None).average_percent, 0.0);
    assert_eq!(average(None).label, "Uncategorized");
}

#[test]
fn test_export_keeps_named_uncategorized_apart_from_bucket() {
    let mut fixture = setup();
    let (audit_id, _, _) = complete_ten_point_audit(&mut fixture);

    let csv = export_completed_audits_csv(
        &mut fixture.persistence,
        fixture.company_id,
        &fixture.analyst.actor,
    )
    .unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "audit_id,completed_at,manager_id,manager_name,call_date,call_reference,total_score,\
         category: Opening,category: Uncategorized,uncategorized"
    );

    let cells: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(cells[0], audit_id.to_string());
    assert_eq!(cells[6], "50.00");
    assert_eq!(&cells[7..], &["100.00", "50.00", "0.00"]);
}
