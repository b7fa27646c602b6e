// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for audit transitions, frozen scoring and history.

use super::{Seeded, create_test_actor, create_test_cause, load_context, seed};
use crate::{AuditFilter, PersistedAudit, PersistenceError, SqlitePersistence};
use callscore::{
    AuditContext, AuditState, Command, TransitionResult, apply, apply_create, compute_audit_scores,
};
use callscore_domain::{
    AuditAnswer, AuditMetadata, AuditStatus, Category, QuestionnaireVersion, UnitRef,
};
use callscore_history::HistoryKind;
use time::macros::{date, datetime};

fn create_audit(persistence: &mut SqlitePersistence, seeded: &Seeded) -> PersistedAudit {
    let context: AuditContext = load_context(
        persistence,
        seeded.version_id,
        seeded.company_id,
        Some(seeded.manager_id),
    );
    let result: TransitionResult = apply_create(
        &context,
        Command::CreateAudit {
            company_id: seeded.company_id,
            manager_id: Some(seeded.manager_id),
            version_id: seeded.version_id,
            metadata: AuditMetadata {
                call_date: Some(date!(2026 - 03 - 07)),
                call_reference: Some(String::from("CALL-001")),
                summary: None,
            },
        },
        seeded.analyst_id,
        create_test_actor(seeded.analyst_id),
        create_test_cause(),
    )
    .unwrap();
    persistence.persist_created_audit(&result).unwrap()
}

fn run(
    persistence: &mut SqlitePersistence,
    seeded: &Seeded,
    audit_id: i64,
    command: Command,
) -> Result<i64, PersistenceError> {
    let state: AuditState = persistence.get_audit_state(audit_id).unwrap().unwrap();
    let context = load_context(
        persistence,
        state.audit.version_id,
        state.audit.company_id,
        state.audit.manager_id,
    );
    let result = apply(
        &context,
        &state,
        command,
        create_test_actor(seeded.analyst_id),
        create_test_cause(),
    )
    .unwrap();
    persistence.persist_transition(audit_id, &result)
}

/// Greeting = 1, Clarity = 0.5, Value = 0, Closing = 1.
fn full_answers(version: &QuestionnaireVersion) -> Vec<AuditAnswer> {
    let greeting = version.questions[0].question_id;
    let clarity = version.questions[1].subitems[0].subitem_id;
    let value = version.questions[1].subitems[1].subitem_id;
    let closing = version.questions[2].question_id;
    vec![
        AuditAnswer::new(UnitRef::Question(greeting), Some(1.0), None),
        AuditAnswer::new(
            UnitRef::Subitem(clarity),
            Some(0.5),
            Some(String::from("Hesitant")),
        ),
        AuditAnswer::new(UnitRef::Subitem(value), Some(0.0), None),
        AuditAnswer::new(UnitRef::Question(closing), Some(1.0), None),
    ]
}

fn update_with(answers: Vec<AuditAnswer>) -> Command {
    Command::UpdateAudit {
        answers,
        metadata: None,
    }
}

#[test]
fn test_create_audit_persists_draft_and_history() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);

    let persisted = create_audit(&mut persistence, &seeded);

    let state = persistence
        .get_audit_state(persisted.audit_id)
        .unwrap()
        .unwrap();
    assert_eq!(state.audit.audit_id, Some(persisted.audit_id));
    assert_eq!(state.audit.status, AuditStatus::Draft);
    assert_eq!(state.audit.version_id, seeded.version_id);
    assert_eq!(state.audit.metadata.call_date, Some(date!(2026 - 03 - 07)));
    assert_eq!(
        state.audit.metadata.call_reference.as_deref(),
        Some("CALL-001")
    );
    assert!(state.answers.is_empty());

    let history = persistence.get_audit_history(persisted.audit_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event.event_id, Some(persisted.history_id));
    assert_eq!(history[0].event.kind, HistoryKind::Created);
    assert_eq!(history[0].event.actor.operator_id, Some(seeded.analyst_id));
}

#[test]
fn test_update_replaces_the_whole_answer_set() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let audit_id = create_audit(&mut persistence, &seeded).audit_id;
    let version = persistence
        .get_version_tree(seeded.version_id)
        .unwrap()
        .unwrap();

    run(
        &mut persistence,
        &seeded,
        audit_id,
        update_with(full_answers(&version)),
    )
    .unwrap();
    let first = persistence.get_audit_state(audit_id).unwrap().unwrap();
    assert_eq!(first.answers.len(), 4);
    assert_eq!(first.answers[1].comment.as_deref(), Some("Hesitant"));

    let greeting_only = vec![full_answers(&version)[0].clone()];
    run(&mut persistence, &seeded, audit_id, update_with(greeting_only)).unwrap();

    let second = persistence.get_audit_state(audit_id).unwrap().unwrap();
    assert_eq!(second.answers.len(), 1);
    assert_eq!(
        second.answers[0].unit,
        UnitRef::Question(version.questions[0].question_id)
    );
}

#[test]
fn test_failed_transition_writes_nothing() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let audit_id = create_audit(&mut persistence, &seeded).audit_id;
    let version = persistence
        .get_version_tree(seeded.version_id)
        .unwrap()
        .unwrap();

    let state = persistence.get_audit_state(audit_id).unwrap().unwrap();
    let context = load_context(
        &mut persistence,
        seeded.version_id,
        seeded.company_id,
        Some(seeded.manager_id),
    );
    let result = apply(
        &context,
        &state,
        update_with(full_answers(&version)),
        create_test_actor(seeded.analyst_id),
        create_test_cause(),
    )
    .unwrap();

    // The answer insert for a missing audit violates its foreign key
    let outcome = persistence.persist_transition(9999, &result);
    assert!(outcome.is_err());

    let history = persistence.get_audit_history(audit_id).unwrap();
    assert_eq!(history.len(), 1);
    let state = persistence.get_audit_state(audit_id).unwrap().unwrap();
    assert!(state.answers.is_empty());
}

#[test]
fn test_complete_audit_stores_score_and_frozen_units() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let audit_id = create_audit(&mut persistence, &seeded).audit_id;
    let version = persistence
        .get_version_tree(seeded.version_id)
        .unwrap()
        .unwrap();

    run(
        &mut persistence,
        &seeded,
        audit_id,
        update_with(full_answers(&version)),
    )
    .unwrap();
    run(
        &mut persistence,
        &seeded,
        audit_id,
        Command::CompleteAudit {
            completed_at: datetime!(2026-03-08 09:15 UTC),
        },
    )
    .unwrap();

    let state = persistence.get_audit_state(audit_id).unwrap().unwrap();
    assert_eq!(state.audit.status, AuditStatus::Completed);
    assert_eq!(state.audit.total_score, Some(50.0));
    assert_eq!(
        state.audit.completed_at,
        Some(datetime!(2026-03-08 09:15 UTC))
    );

    let frozen = persistence.get_frozen_units(audit_id).unwrap().unwrap();
    assert_eq!(frozen.len(), 4);
    assert_eq!(frozen[0].category, Category::Named(String::from("Opening")));
    assert_eq!(frozen[1].weight, 2.0);
    assert_eq!(frozen[3].category, Category::Uncategorized);

    let history = persistence.get_audit_history(audit_id).unwrap();
    let kinds: Vec<HistoryKind> = history.iter().map(|h| h.event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            HistoryKind::Created,
            HistoryKind::Updated,
            HistoryKind::StatusChanged
        ]
    );
}

#[test]
fn test_completed_scores_survive_questionnaire_edits() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let audit_id = create_audit(&mut persistence, &seeded).audit_id;
    let version = persistence
        .get_version_tree(seeded.version_id)
        .unwrap()
        .unwrap();

    run(
        &mut persistence,
        &seeded,
        audit_id,
        update_with(full_answers(&version)),
    )
    .unwrap();
    run(
        &mut persistence,
        &seeded,
        audit_id,
        Command::CompleteAudit {
            completed_at: datetime!(2026-03-08 09:15 UTC),
        },
    )
    .unwrap();

    // Soft-delete the zero-scored Value subitem after completion
    let value_id = version.questions[1].subitems[1].subitem_id;
    persistence.set_subitem_active(value_id, false).unwrap();

    let context = load_context(
        &mut persistence,
        seeded.version_id,
        seeded.company_id,
        Some(seeded.manager_id),
    );
    let state = persistence.get_audit_state(audit_id).unwrap().unwrap();
    let frozen = persistence.get_frozen_units(audit_id).unwrap();
    let scores = compute_audit_scores(&state, &context.version, &context.scale, frozen.as_deref());

    assert_eq!(scores.percentage, 50.0);
    let pitch = scores
        .categories
        .iter()
        .find(|c| c.category == Category::Named(String::from("Pitch")))
        .unwrap();
    assert_eq!(pitch.score, 0.25);
    assert_eq!(pitch.count, 2);
}

#[test]
fn test_frozen_units_absent_for_drafts() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let audit_id = create_audit(&mut persistence, &seeded).audit_id;

    assert!(persistence.get_frozen_units(audit_id).unwrap().is_none());
    assert!(persistence.get_frozen_units(9999).unwrap().is_none());
}

#[test]
fn test_delete_keeps_answers_and_hides_from_default_listing() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let kept = create_audit(&mut persistence, &seeded).audit_id;
    let deleted = create_audit(&mut persistence, &seeded).audit_id;
    let version = persistence
        .get_version_tree(seeded.version_id)
        .unwrap()
        .unwrap();

    run(
        &mut persistence,
        &seeded,
        deleted,
        update_with(full_answers(&version)),
    )
    .unwrap();
    run(&mut persistence, &seeded, deleted, Command::DeleteAudit).unwrap();

    let state = persistence.get_audit_state(deleted).unwrap().unwrap();
    assert!(state.audit.is_deleted);
    assert_eq!(state.answers.len(), 4);

    let visible = persistence.list_audits(&AuditFilter::default()).unwrap();
    let ids: Vec<i64> = visible.iter().map(|a| a.audit_id).collect();
    assert_eq!(ids, vec![kept]);

    let all = persistence
        .list_audits(&AuditFilter {
            include_deleted: true,
            ..AuditFilter::default()
        })
        .unwrap();
    let ids: Vec<i64> = all.iter().map(|a| a.audit_id).collect();
    assert_eq!(ids, vec![deleted, kept]);

    let history = persistence.get_audit_history(deleted).unwrap();
    assert_eq!(history.last().unwrap().event.kind, HistoryKind::Deleted);
}

#[test]
fn test_list_audits_filters_by_company_and_status() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let other_company = persistence.create_company("Zeta Telecom").unwrap();
    let first = create_audit(&mut persistence, &seeded).audit_id;
    create_audit(&mut persistence, &seeded);
    let version = persistence
        .get_version_tree(seeded.version_id)
        .unwrap()
        .unwrap();

    run(
        &mut persistence,
        &seeded,
        first,
        update_with(full_answers(&version)),
    )
    .unwrap();
    run(
        &mut persistence,
        &seeded,
        first,
        Command::CompleteAudit {
            completed_at: datetime!(2026-03-08 09:15 UTC),
        },
    )
    .unwrap();

    let completed = persistence
        .list_audits(&AuditFilter {
            status: Some(AuditStatus::Completed),
            ..AuditFilter::default()
        })
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].audit_id, first);
    assert_eq!(completed[0].total_score, Some(50.0));

    let by_manager = persistence
        .list_audits(&AuditFilter {
            manager_id: Some(seeded.manager_id),
            ..AuditFilter::default()
        })
        .unwrap();
    assert_eq!(by_manager.len(), 2);

    let none = persistence
        .list_audits(&AuditFilter {
            company_id: Some(other_company),
            ..AuditFilter::default()
        })
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_completed_summaries_exclude_drafts_and_deleted() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let seeded = seed(&mut persistence);
    let version = persistence
        .get_version_tree(seeded.version_id)
        .unwrap()
        .unwrap();

    let mut completed_ids = Vec::new();
    for (i, when) in [
        datetime!(2026-03-08 09:15 UTC),
        datetime!(2026-02-01 10:00 UTC),
    ]
    .into_iter()
    .enumerate()
    {
        let audit_id = create_audit(&mut persistence, &seeded).audit_id;
        run(
            &mut persistence,
            &seeded,
            audit_id,
            update_with(full_answers(&version)),
        )
        .unwrap();
        run(
            &mut persistence,
            &seeded,
            audit_id,
            Command::CompleteAudit { completed_at: when },
        )
        .unwrap();
        completed_ids.push((i, audit_id));
    }
    // A draft and a deleted draft are not reported
    create_audit(&mut persistence, &seeded);
    let removed = create_audit(&mut persistence, &seeded).audit_id;
    run(&mut persistence, &seeded, removed, Command::DeleteAudit).unwrap();

    let summaries = persistence
        .list_completed_audit_summaries(Some(seeded.company_id))
        .unwrap();
    assert_eq!(summaries.len(), 2);
    // Oldest completion first
    assert_eq!(summaries[0].audit_id, completed_ids[1].1);
    assert_eq!(summaries[0].completed_at, datetime!(2026-02-01 10:00 UTC));
    assert_eq!(summaries[1].audit_id, completed_ids[0].1);
    assert!(summaries.iter().all(|s| s.total_score == 50.0));
    assert_eq!(summaries[0].manager_id, Some(seeded.manager_id));

    assert!(
        persistence
            .list_completed_audit_summaries(Some(9999))
            .unwrap()
            .is_empty()
    );
}
