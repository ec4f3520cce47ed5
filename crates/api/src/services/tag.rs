//! Course tags.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use domain::models::tag::{ListTagsResponse, ReplaceTagsRequest, TagResponse};
use domain::models::{CourseRole, Tag};
use domain::services::{plan_tag_replacement, TagPlan};
use persistence::repositories::{CourseNotificationRepository, CourseRepository, TagRepository};
use shared::crypto::generate_reference;

use crate::error::ApiError;
use crate::extractors::{CourseContext, StaffContext};
use crate::services::course::lock_course;
use crate::services::outbox::append_course_changed;

/// Tags a viewer with `role` may see, in order.
fn visible_tags(tags: Vec<Tag>, role: CourseRole) -> Vec<TagResponse> {
    tags.into_iter()
        .filter(|tag| role.is_course_staff() || !tag.is_course_staff_only())
        .map(TagResponse::from)
        .collect()
}

pub struct TagService {
    pool: PgPool,
    courses: CourseRepository,
    tags: TagRepository,
    notifications: CourseNotificationRepository,
}

impl TagService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            courses: CourseRepository::new(pool.clone()),
            tags: TagRepository::new(pool.clone()),
            notifications: CourseNotificationRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn list(&self, context: &CourseContext) -> Result<ListTagsResponse, ApiError> {
        let tags = self
            .tags
            .list_by_course(context.course.id)
            .await?
            .into_iter()
            .map(Tag::from)
            .collect();
        Ok(ListTagsResponse {
            tags: visible_tags(tags, context.role()),
        })
    }

    /// Replaces the course's tag list with `request.tags`.
    ///
    /// Resubmitting the stored list unchanged performs no writes.
    pub async fn replace_all(
        &self,
        StaffContext(context): StaffContext,
        request: &ReplaceTagsRequest,
    ) -> Result<ListTagsResponse, ApiError> {
        let mut tx = self.pool.begin().await?;
        let course = lock_course(&self.courses, &mut *tx, &context.course).await?;
        course.ensure_not_archived()?;

        let existing: Vec<Tag> = self
            .tags
            .lock_for_course(&mut *tx, course.id)
            .await?
            .into_iter()
            .map(Tag::from)
            .collect();

        let plan: TagPlan = plan_tag_replacement(&existing, &request.tags, Utc::now())?;
        if plan.is_empty() {
            return Ok(ListTagsResponse {
                tags: visible_tags(existing, CourseRole::CourseStaff),
            });
        }

        for id in &plan.deletes {
            self.tags.delete(&mut *tx, *id).await?;
        }
        for update in &plan.updates {
            self.tags
                .update(
                    &mut *tx,
                    update.id,
                    update.order,
                    &update.name,
                    update.course_staff_only_at,
                )
                .await?;
        }
        for insert in &plan.inserts {
            self.tags
                .insert(
                    &mut *tx,
                    course.id,
                    &generate_reference(),
                    insert.order,
                    &insert.name,
                    insert.course_staff_only_at,
                )
                .await?;
        }

        let tags: Vec<Tag> = self
            .tags
            .lock_for_course(&mut *tx, course.id)
            .await?
            .into_iter()
            .map(Tag::from)
            .collect();

        append_course_changed(&self.notifications, &mut *tx, &course).await?;
        tx.commit().await?;

        info!(
            course_reference = %course.reference,
            inserted = plan.inserts.len(),
            updated = plan.updates.len(),
            deleted = plan.deletes.len(),
            "Course tags replaced"
        );

        Ok(ListTagsResponse {
            tags: visible_tags(tags, CourseRole::CourseStaff),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tag(order: i32, staff_only: bool) -> Tag {
        Tag {
            id: Uuid::new_v4(),
            course_id: Uuid::nil(),
            reference: format!("{}", 1000000000 + order),
            order,
            name: format!("Tag {}", order),
            course_staff_only_at: staff_only.then(Utc::now),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_students_do_not_see_staff_only_tags() {
        let tags = vec![tag(0, false), tag(1, true), tag(2, false)];

        let student_view = visible_tags(tags.clone(), CourseRole::Student);
        assert_eq!(student_view.len(), 2);
        assert!(student_view.iter().all(|t| !t.is_course_staff_only));

        let staff_view = visible_tags(tags, CourseRole::CourseStaff);
        assert_eq!(staff_view.len(), 3);
        assert_eq!(staff_view[1].order, 1);
    }
}
