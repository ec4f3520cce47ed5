//! Desired-state diff for replacing a course's tag list.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::errors::DomainError;
use crate::models::tag::TagInput;
use crate::models::Tag;

/// New tag to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInsert {
    pub order: i32,
    pub name: String,
    pub course_staff_only_at: Option<DateTime<Utc>>,
}

/// Existing tag whose stored values differ from the desired ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpdate {
    pub id: Uuid,
    pub order: i32,
    pub name: String,
    pub course_staff_only_at: Option<DateTime<Utc>>,
}

/// Writes needed to turn the stored tags into the desired list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPlan {
    pub inserts: Vec<TagInsert>,
    pub updates: Vec<TagUpdate>,
    pub deletes: Vec<Uuid>,
}

impl TagPlan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// Computes the plan. The position of an entry in `desired` becomes its order.
pub fn plan_tag_replacement(
    existing: &[Tag],
    desired: &[TagInput],
    now: DateTime<Utc>,
) -> Result<TagPlan, DomainError> {
    let by_reference: HashMap<&str, &Tag> =
        existing.iter().map(|t| (t.reference.as_str(), t)).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut plan = TagPlan::default();

    for (index, input) in desired.iter().enumerate() {
        let order = index as i32;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Tag names must not be blank"));
        }

        let Some(reference) = input.reference.as_deref() else {
            plan.inserts.push(TagInsert {
                order,
                name: name.to_string(),
                course_staff_only_at: input.is_course_staff_only.then_some(now),
            });
            continue;
        };

        let tag = by_reference
            .get(reference)
            .copied()
            .ok_or(DomainError::NotFound("Tag"))?;
        if !seen.insert(reference) {
            return Err(DomainError::validation(format!(
                "Tag {} appears more than once",
                reference
            )));
        }

        let course_staff_only_at = match (input.is_course_staff_only, tag.course_staff_only_at) {
            (true, Some(since)) => Some(since),
            (true, None) => Some(now),
            (false, _) => None,
        };

        if tag.order != order
            || tag.name != name
            || tag.course_staff_only_at != course_staff_only_at
        {
            plan.updates.push(TagUpdate {
                id: tag.id,
                order,
                name: name.to_string(),
                course_staff_only_at,
            });
        }
    }

    plan.deletes = existing
        .iter()
        .filter(|t| !seen.contains(t.reference.as_str()))
        .map(|t| t.id)
        .collect();

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tag(reference: &str, order: i32, name: &str, staff_only: bool) -> Tag {
        Tag {
            id: Uuid::new_v4(),
            course_id: Uuid::nil(),
            reference: reference.to_string(),
            order,
            name: name.to_string(),
            course_staff_only_at: staff_only.then(|| Utc::now() - Duration::days(10)),
            created_at: Utc::now() - Duration::days(30),
        }
    }

    fn input(reference: Option<&str>, name: &str, staff_only: bool) -> TagInput {
        TagInput {
            reference: reference.map(str::to_string),
            name: name.to_string(),
            is_course_staff_only: staff_only,
        }
    }

    fn as_inputs(tags: &[Tag]) -> Vec<TagInput> {
        tags.iter()
            .map(|t| input(Some(&t.reference), &t.name, t.is_course_staff_only()))
            .collect()
    }

    #[test]
    fn test_unchanged_list_writes_nothing() {
        let existing = vec![
            tag("11", 0, "Homework", false),
            tag("12", 1, "Exams", true),
        ];
        let plan = plan_tag_replacement(&existing, &as_inputs(&existing), Utc::now()).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_reorder_updates_only_moved_tags() {
        let existing = vec![
            tag("11", 0, "Homework", false),
            tag("12", 1, "Exams", false),
            tag("13", 2, "Labs", false),
        ];
        let desired = vec![
            input(Some("12"), "Exams", false),
            input(Some("11"), "Homework", false),
            input(Some("13"), "Labs", false),
        ];
        let plan = plan_tag_replacement(&existing, &desired, Utc::now()).unwrap();
        assert_eq!(plan.updates.len(), 2);
        assert!(plan.inserts.is_empty());
        assert!(plan.deletes.is_empty());
        assert_eq!(plan.updates[0].id, existing[1].id);
        assert_eq!(plan.updates[0].order, 0);
    }

    #[test]
    fn test_insert_update_delete() {
        let now = Utc::now();
        let existing = vec![tag("11", 0, "Homework", false), tag("12", 1, "Exams", false)];
        let desired = vec![
            input(Some("11"), " Assignments ", false),
            input(None, "Lectures", true),
        ];
        let plan = plan_tag_replacement(&existing, &desired, now).unwrap();

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].name, "Assignments");
        assert_eq!(
            plan.inserts,
            vec![TagInsert {
                order: 1,
                name: "Lectures".to_string(),
                course_staff_only_at: Some(now),
            }]
        );
        assert_eq!(plan.deletes, vec![existing[1].id]);
    }

    #[test]
    fn test_staff_only_timestamp_preserved() {
        let existing = vec![tag("11", 0, "Exams", true)];
        let since = existing[0].course_staff_only_at;

        let plan = plan_tag_replacement(
            &existing,
            &[input(Some("11"), "Midterms", true)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan.updates[0].course_staff_only_at, since);

        let plan = plan_tag_replacement(
            &existing,
            &[input(Some("11"), "Exams", false)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan.updates[0].course_staff_only_at, None);
    }

    #[test]
    fn test_empty_list_deletes_everything() {
        let existing = vec![tag("11", 0, "Homework", false)];
        let plan = plan_tag_replacement(&existing, &[], Utc::now()).unwrap();
        assert_eq!(plan.deletes, vec![existing[0].id]);
    }

    #[test]
    fn test_foreign_reference_not_found() {
        let existing = vec![tag("11", 0, "Homework", false)];
        let result = plan_tag_replacement(&existing, &[input(Some("99"), "X", false)], Utc::now());
        assert_eq!(result, Err(DomainError::NotFound("Tag")));
    }

    #[test]
    fn test_duplicate_reference_rejected() {
        let existing = vec![tag("11", 0, "Homework", false)];
        let desired = vec![
            input(Some("11"), "Homework", false),
            input(Some("11"), "Homework again", false),
        ];
        assert!(matches!(
            plan_tag_replacement(&existing, &desired, Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(
            plan_tag_replacement(&[], &[input(None, "   ", false)], Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }
}
