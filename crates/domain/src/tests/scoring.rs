// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::fixtures::{
    answer, default_scale, question, sample_answers, sample_version, subitem, ten_point_scale,
};
use crate::{
    Category, CategoryScore, CompletionScore, QuestionnaireVersion, ScoreScale, UnitRef,
    aggregate_categories, aggregate_overall, compute_category_scores, compute_completion_score,
    compute_overall_score, fraction_of_scale, resolve_scored_units, round_to, scale_percentage,
    unanswered_units,
};

#[test]
fn test_sample_scenario_overall_score() {
    let version: QuestionnaireVersion = sample_version();
    let overall: f64 = compute_overall_score(&sample_answers(), &version);
    assert_eq!(overall, 0.4);
}

#[test]
fn test_sample_scenario_completion_percentage() {
    let completion: CompletionScore =
        compute_completion_score(&sample_answers(), &sample_version(), &default_scale());
    assert_eq!(completion.achieved, 2.0);
    assert_eq!(completion.max_possible, 5.0);
    assert_eq!(completion.percentage, 40.0);
}

#[test]
fn test_sample_scenario_category_scores() {
    let categories: Vec<CategoryScore> =
        compute_category_scores(&sample_answers(), &sample_version());

    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].category, Category::Named(String::from("Opening")));
    assert_eq!(categories[0].score, 1.0);
    assert_eq!(categories[0].weight, 1.0);
    assert_eq!(categories[0].count, 1);
    assert_eq!(categories[1].category, Category::Named(String::from("Pitch")));
    assert_eq!(categories[1].score, 0.25);
    assert_eq!(categories[1].weight, 4.0);
    assert_eq!(categories[1].count, 2);
}

#[test]
fn test_zero_weight_returns_exactly_zero() {
    let version: QuestionnaireVersion = sample_version();
    assert_eq!(compute_overall_score(&[], &version), 0.0);
    assert!(compute_category_scores(&[], &version).is_empty());
    assert_eq!(aggregate_overall(&[]), 0.0);
}

#[test]
fn test_only_inactive_answers_returns_zero() {
    let version: QuestionnaireVersion = sample_version();
    let answers = vec![answer(UnitRef::Question(3), Some(1.0))];
    let overall: f64 = compute_overall_score(&answers, &version);
    assert_eq!(overall, 0.0);
    assert!(!overall.is_nan());
}

#[test]
fn test_unanswered_counts_as_zero_with_full_weight() {
    let version = QuestionnaireVersion {
        version_id: 1,
        questionnaire_id: 1,
        version_number: 1,
        questions: vec![question(1, 1.0, None, 0), question(2, 1.0, None, 1)],
    };
    let answers = vec![
        answer(UnitRef::Question(1), Some(1.0)),
        answer(UnitRef::Question(2), None),
    ];
    assert_eq!(compute_overall_score(&answers, &version), 0.5);
}

#[test]
fn test_inactive_subitem_is_excluded() {
    let mut version: QuestionnaireVersion = sample_version();
    version.questions[1].subitems[1].is_active = false;

    // Greeting 1*1, Clarity 0.5*2 => 2 / 3
    let overall: f64 = compute_overall_score(&sample_answers(), &version);
    assert_eq!(overall, 2.0 / 3.0);
}

#[test]
fn test_direct_answer_on_subitem_question_is_ignored() {
    let version: QuestionnaireVersion = sample_version();
    let mut answers = sample_answers();
    answers.push(answer(UnitRef::Question(2), Some(1.0)));
    assert_eq!(compute_overall_score(&answers, &version), 0.4);
}

#[test]
fn test_subitem_weight_multiplies_question_weight() {
    let mut pitch = question(7, 3.0, Some("Pitch"), 0);
    pitch.has_subitems = true;
    pitch.subitems = vec![subitem(71, 2.0, 0), subitem(72, 0.5, 1)];
    let version = QuestionnaireVersion {
        version_id: 1,
        questionnaire_id: 1,
        version_number: 1,
        questions: vec![pitch],
    };
    let answers = vec![
        answer(UnitRef::Subitem(71), Some(1.0)),
        answer(UnitRef::Subitem(72), Some(0.0)),
    ];

    let units = resolve_scored_units(&answers, &version);
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].weight, 6.0);
    assert_eq!(units[1].weight, 1.5);
    assert_eq!(aggregate_overall(&units), 6.0 / 7.5);
}

#[test]
fn test_unknown_units_are_silently_excluded() {
    let version: QuestionnaireVersion = sample_version();
    let mut answers = sample_answers();
    answers.push(answer(UnitRef::Question(999), Some(1.0)));
    answers.push(answer(UnitRef::Subitem(999), Some(1.0)));
    assert_eq!(compute_overall_score(&answers, &version), 0.4);
}

#[test]
fn test_category_weights_partition_total_weight() {
    let version: QuestionnaireVersion = sample_version();
    let units = resolve_scored_units(&sample_answers(), &version);
    let total: f64 = units.iter().map(|u| u.weight).sum();
    let by_category: f64 = aggregate_categories(&units).iter().map(|c| c.weight).sum();
    assert_eq!(total, by_category);
}

#[test]
fn test_null_category_goes_to_uncategorized_bucket() {
    let version = QuestionnaireVersion {
        version_id: 1,
        questionnaire_id: 1,
        version_number: 1,
        questions: vec![question(1, 1.0, None, 0), question(2, 1.0, Some("  "), 1)],
    };
    let answers = vec![
        answer(UnitRef::Question(1), Some(1.0)),
        answer(UnitRef::Question(2), Some(0.0)),
    ];

    let categories = compute_category_scores(&answers, &version);
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].category, Category::Uncategorized);
    assert_eq!(categories[0].category.label(), "Uncategorized");
    assert_eq!(categories[0].score, 0.5);
}

#[test]
fn test_results_are_bit_identical_regardless_of_answer_order() {
    let version = QuestionnaireVersion {
        version_id: 1,
        questionnaire_id: 1,
        version_number: 1,
        questions: vec![
            question(1, 0.1, Some("A"), 0),
            question(2, 0.7, Some("B"), 1),
            question(3, 0.3, Some("A"), 2),
        ],
    };
    let forward = vec![
        answer(UnitRef::Question(1), Some(0.5)),
        answer(UnitRef::Question(2), Some(1.0)),
        answer(UnitRef::Question(3), Some(0.5)),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a: f64 = compute_overall_score(&forward, &version);
    let b: f64 = compute_overall_score(&reversed, &version);
    let c: f64 = compute_overall_score(&forward, &version);
    assert_eq!(a.to_bits(), b.to_bits());
    assert_eq!(a.to_bits(), c.to_bits());
    assert_eq!(
        compute_category_scores(&forward, &version),
        compute_category_scores(&reversed, &version)
    );
}

#[test]
fn test_categories_follow_version_order() {
    let version = QuestionnaireVersion {
        version_id: 1,
        questionnaire_id: 1,
        version_number: 1,
        questions: vec![
            question(1, 1.0, Some("Zeta"), 0),
            question(2, 1.0, Some("Alpha"), 1),
        ],
    };
    let answers = vec![
        answer(UnitRef::Question(2), Some(1.0)),
        answer(UnitRef::Question(1), Some(0.0)),
    ];
    let labels: Vec<String> = compute_category_scores(&answers, &version)
        .iter()
        .map(|c| c.category.label().to_string())
        .collect();
    assert_eq!(labels, vec![String::from("Zeta"), String::from("Alpha")]);
}

#[test]
fn test_completion_max_possible_includes_unanswered_units() {
    let answers = vec![answer(UnitRef::Question(1), Some(1.0))];
    let completion = compute_completion_score(&answers, &sample_version(), &default_scale());
    assert_eq!(completion.achieved, 1.0);
    assert_eq!(completion.max_possible, 5.0);
    assert_eq!(completion.percentage, 20.0);
}

#[test]
fn test_completion_percentage_is_rounded_to_two_decimals() {
    let version = QuestionnaireVersion {
        version_id: 1,
        questionnaire_id: 1,
        version_number: 1,
        questions: vec![
            question(1, 1.0, None, 0),
            question(2, 1.0, None, 1),
            question(3, 1.0, None, 2),
        ],
    };
    let answers = vec![answer(UnitRef::Question(1), Some(1.0))];
    let completion = compute_completion_score(&answers, &version, &default_scale());
    assert_eq!(completion.percentage, 33.33);
}

#[test]
fn test_completion_of_empty_version_is_zero() {
    let version = QuestionnaireVersion {
        version_id: 1,
        questionnaire_id: 1,
        version_number: 1,
        questions: Vec::new(),
    };
    let completion = compute_completion_score(&[], &version, &default_scale());
    assert_eq!(completion.percentage, 0.0);
}

#[test]
fn test_unanswered_units_lists_active_units_without_score() {
    let answers = vec![
        answer(UnitRef::Question(1), Some(1.0)),
        answer(UnitRef::Subitem(21), None),
    ];
    let missing = unanswered_units(&answers, &sample_version());
    assert_eq!(missing, vec![UnitRef::Subitem(21), UnitRef::Subitem(22)]);
}

#[test]
fn test_round_to() {
    assert_eq!(round_to(40.004, 2), 40.0);
    assert_eq!(round_to(66.666_666, 2), 66.67);
    assert_eq!(round_to(72.25, 1), 72.3);
}

#[test]
fn test_perfect_answer_on_ten_point_scale_reads_one_hundred_everywhere() {
    let scale: ScoreScale = ten_point_scale();
    let version = QuestionnaireVersion {
        version_id: 20,
        questionnaire_id: 200,
        version_number: 1,
        questions: vec![question(1, 1.0, Some("Opening"), 0)],
    };
    let answers = vec![answer(UnitRef::Question(1), Some(10.0))];

    let completion: CompletionScore = compute_completion_score(&answers, &version, &scale);
    let categories: Vec<CategoryScore> = compute_category_scores(&answers, &version);

    assert_eq!(completion.percentage, 100.0);
    assert_eq!(categories[0].score, 10.0);
    assert_eq!(scale_percentage(categories[0].score, scale.max_value()), 100.0);
    assert_eq!(
        fraction_of_scale(compute_overall_score(&answers, &version), scale.max_value()),
        1.0
    );
}

#[test]
fn test_sample_scenario_on_ten_point_scale_matches_unit_scale_percentages() {
    let scale: ScoreScale = ten_point_scale();
    let answers = vec![
        answer(UnitRef::Question(1), Some(10.0)),
        answer(UnitRef::Subitem(21), Some(5.0)),
        answer(UnitRef::Subitem(22), Some(0.0)),
    ];

    let completion: CompletionScore = compute_completion_score(&answers, &sample_version(), &scale);
    let categories: Vec<CategoryScore> = compute_category_scores(&answers, &sample_version());
    let percents: Vec<f64> = categories
        .iter()
        .map(|c| scale_percentage(c.score, scale.max_value()))
        .collect();

    assert_eq!(completion.percentage, 40.0);
    assert_eq!(percents, vec![100.0, 25.0]);

    let unit_completion: CompletionScore =
        compute_completion_score(&sample_answers(), &sample_version(), &default_scale());
    assert_eq!(completion.percentage, unit_completion.percentage);
}

#[test]
fn test_scale_percentage_of_empty_scale_is_zero() {
    assert_eq!(scale_percentage(3.0, 0.0), 0.0);
    assert_eq!(fraction_of_scale(3.0, 0.0), 0.0);
    assert_eq!(scale_percentage(0.5, 1.0), 50.0);
}
