// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::fixtures::sample_version;
use crate::{
    Audit, AuditMetadata, AuditStatus, Category, DomainError, ScoreScale, UnitRef,
    parse_call_date,
};
use std::str::FromStr;

#[test]
fn test_category_from_optional() {
    assert_eq!(Category::from_optional(None), Category::Uncategorized);
    assert_eq!(Category::from_optional(Some("")), Category::Uncategorized);
    assert_eq!(
        Category::from_optional(Some(" Opening ")),
        Category::Named(String::from("Opening"))
    );
}

#[test]
fn test_category_label_and_storage_value() {
    let named = Category::Named(String::from("Pitch"));
    assert_eq!(named.label(), "Pitch");
    assert_eq!(named.as_optional(), Some("Pitch"));
    assert_eq!(Category::Uncategorized.label(), "Uncategorized");
    assert_eq!(Category::Uncategorized.as_optional(), None);
    assert_eq!(Category::Uncategorized.to_string(), "Uncategorized");
}

#[test]
fn test_unit_ref_from_columns() {
    assert_eq!(
        UnitRef::from_columns(Some(4), None).unwrap(),
        UnitRef::Question(4)
    );
    assert_eq!(
        UnitRef::from_columns(None, Some(9)).unwrap(),
        UnitRef::Subitem(9)
    );
    assert!(UnitRef::from_columns(Some(1), Some(2)).is_err());
    assert!(UnitRef::from_columns(None, None).is_err());
}

#[test]
fn test_unit_ref_accessors() {
    assert_eq!(UnitRef::Question(3).question_id(), Some(3));
    assert_eq!(UnitRef::Question(3).subitem_id(), None);
    assert_eq!(UnitRef::Subitem(5).subitem_id(), Some(5));
    assert_eq!(UnitRef::Subitem(5).to_string(), "subitem 5");
}

#[test]
fn test_audit_status_round_trips_through_strings() {
    assert_eq!(AuditStatus::from_str("DRAFT").unwrap(), AuditStatus::Draft);
    assert_eq!(
        AuditStatus::from_str("COMPLETED").unwrap(),
        AuditStatus::Completed
    );
    assert_eq!(AuditStatus::Completed.as_str(), "COMPLETED");
    assert!(matches!(
        AuditStatus::from_str("draft"),
        Err(DomainError::InvalidAuditStatus(_))
    ));
}

#[test]
fn test_audit_status_transitions() {
    assert!(AuditStatus::Draft.can_transition_to(AuditStatus::Completed));
    assert!(!AuditStatus::Completed.can_transition_to(AuditStatus::Draft));
    assert!(!AuditStatus::Completed.can_transition_to(AuditStatus::Completed));
    assert!(!AuditStatus::Draft.can_transition_to(AuditStatus::Draft));
}

#[test]
fn test_draft_audit_is_editable() {
    let mut audit = Audit::new_draft(1, None, 2, 3, AuditMetadata::default());
    audit.audit_id = Some(7);
    assert!(audit.ensure_editable().is_ok());
    assert!(audit.ensure_completable().is_ok());
    assert!(audit.ensure_deletable().is_ok());
}

#[test]
fn test_completed_audit_is_locked() {
    let mut audit = Audit::new_draft(1, None, 2, 3, AuditMetadata::default());
    audit.audit_id = Some(7);
    audit.status = AuditStatus::Completed;
    assert_eq!(audit.ensure_editable(), Err(DomainError::AuditLocked(7)));
    assert!(matches!(
        audit.ensure_completable(),
        Err(DomainError::InvalidStatusTransition { .. })
    ));
}

#[test]
fn test_deleted_audit_rejects_edits_and_second_delete() {
    let mut audit = Audit::new_draft(1, None, 2, 3, AuditMetadata::default());
    audit.audit_id = Some(7);
    audit.is_deleted = true;
    assert_eq!(audit.ensure_editable(), Err(DomainError::AuditDeleted(7)));
    assert_eq!(audit.ensure_completable(), Err(DomainError::AuditDeleted(7)));
    assert_eq!(
        audit.ensure_deletable(),
        Err(DomainError::AuditAlreadyDeleted(7))
    );
}

#[test]
fn test_parse_call_date() {
    let date = parse_call_date("2026-03-14").unwrap();
    assert_eq!(date.year(), 2026);
    assert_eq!(u8::from(date.month()), 3);
    assert_eq!(date.day(), 14);
    assert!(matches!(
        parse_call_date("14/03/2026"),
        Err(DomainError::DateParseError { .. })
    ));
}

#[test]
fn test_scale_max_value_and_membership() {
    let scale = super::fixtures::default_scale();
    assert_eq!(scale.max_value(), 1.0);
    assert!(scale.contains(0.5));
    assert!(!scale.contains(0.25));

    let empty = ScoreScale::new(String::from("Empty"), false, Vec::new());
    assert_eq!(empty.max_value(), 0.0);
}

#[test]
fn test_version_scorable_units_skip_inactive_and_expand_subitems() {
    let units = sample_version().scorable_units();
    let refs: Vec<UnitRef> = units.iter().map(|u| u.unit).collect();
    assert_eq!(
        refs,
        vec![UnitRef::Question(1), UnitRef::Subitem(21), UnitRef::Subitem(22)]
    );
    assert_eq!(units[1].weight, 2.0);
}

#[test]
fn test_version_lookups() {
    let version = sample_version();
    assert!(version.contains_unit(UnitRef::Question(3)));
    assert!(version.contains_unit(UnitRef::Subitem(22)));
    assert!(!version.contains_unit(UnitRef::Subitem(3)));
    let (parent, sub) = version.subitem(21).unwrap();
    assert_eq!(parent.question_id, 2);
    assert_eq!(sub.subitem_id, 21);
}
