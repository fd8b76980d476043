use crate::draw::{NormalizedPool, normalize_draw_number};
use crate::entities::student_entity as students;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateStudentRequest, PaginatedResponse, PaginationParams, StudentQuery, StudentResponse,
    UpdateStudentRequest,
};
use crate::services::{ChangeNotifier, ChangedTable};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Roster administration. This is the write side that enforces the
/// draw-number invariants the read-side pool assumes: numbers are stored
/// normalized (digits only, max 4) and unique among assigned values.
#[derive(Clone)]
pub struct StudentService {
    pool: DatabaseConnection,
    notifier: ChangeNotifier,
}

impl StudentService {
    pub fn new(pool: DatabaseConnection, notifier: ChangeNotifier) -> Self {
        Self { pool, notifier }
    }

    pub async fn list(
        &self,
        query: &StudentQuery,
    ) -> AppResult<PaginatedResponse<StudentResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut condition = Condition::all();
        if let Some(department) = query.department.as_deref().filter(|d| !d.is_empty()) {
            condition = condition.add(students::Column::Department.eq(department));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            condition = condition.add(
                Condition::any()
                    .add(students::Column::StudentId.like(&pattern))
                    .add(students::Column::DrawNumber.like(&pattern)),
            );
        }

        let base_query = students::Entity::find().filter(condition);
        let total = base_query.clone().count(&self.pool).await? as i64;

        let records = base_query
            .order_by_asc(students::Column::StudentId)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            records.into_iter().map(Into::into).collect(),
            params.page.unwrap_or(1),
            params.get_limit(),
            total,
        ))
    }

    pub async fn create(&self, req: CreateStudentRequest) -> AppResult<StudentResponse> {
        let student_id = req.student_id.trim().to_string();
        if student_id.is_empty() || !student_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::ValidationError(
                "student id must be a non-empty numeric string".to_string(),
            ));
        }

        if students::Entity::find_by_id(student_id.clone())
            .one(&self.pool)
            .await?
            .is_some()
        {
            return Err(AppError::ValidationError(format!(
                "student {student_id} already exists"
            )));
        }

        let draw_number = self
            .prepare_draw_number(req.draw_number.as_deref(), None)
            .await?;

        let model = students::ActiveModel {
            student_id: Set(student_id),
            draw_number: Set(draw_number),
            is_suspended: Set(false),
            gender: Set(req.gender),
            department: Set(req.department),
            role: Set(req.role),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        self.notifier.publish(ChangedTable::Students);
        Ok(model.into())
    }

    pub async fn update(
        &self,
        student_id: &str,
        req: UpdateStudentRequest,
    ) -> AppResult<StudentResponse> {
        let existing = students::Entity::find_by_id(student_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("student {student_id} not found")))?;

        let mut am = existing.into_active_model();

        if let Some(raw) = req.draw_number.as_deref() {
            let number = self.prepare_draw_number(Some(raw), Some(student_id)).await?;
            am.draw_number = Set(number);
        }
        if let Some(is_suspended) = req.is_suspended {
            am.is_suspended = Set(is_suspended);
        }
        if let Some(gender) = req.gender {
            am.gender = Set(gender);
        }
        if let Some(department) = req.department {
            am.department = Set(department);
        }
        if let Some(role) = req.role {
            am.role = Set(role);
        }
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(&self.pool).await?;
        self.notifier.publish(ChangedTable::Students);
        Ok(updated.into())
    }

    /// Removes the student from the roster. Existing winner rows are kept:
    /// past wins are not revoked by roster removal, mirroring how suspension
    /// is prospective only.
    pub async fn delete(&self, student_id: &str) -> AppResult<()> {
        let existing = students::Entity::find_by_id(student_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("student {student_id} not found")))?;

        existing.delete(&self.pool).await?;
        self.notifier.publish(ChangedTable::Students);
        Ok(())
    }

    /// Rebuild the normalized read-side pool from scratch. Quota-sensitive
    /// callers always reload rather than patching a cached copy.
    pub async fn load_pool(&self) -> AppResult<NormalizedPool> {
        let records = students::Entity::find()
            .order_by_asc(students::Column::StudentId)
            .all(&self.pool)
            .await?;
        Ok(NormalizedPool::from_records(&records))
    }

    /// Normalize a raw draw-number input and check uniqueness against every
    /// other student. Returns None for an empty input (clears the number).
    async fn prepare_draw_number(
        &self,
        raw: Option<&str>,
        exclude_student_id: Option<&str>,
    ) -> AppResult<Option<String>> {
        let Some(raw) = raw else { return Ok(None) };

        let number = normalize_draw_number(raw);
        if number.is_empty() {
            if raw.trim().is_empty() {
                return Ok(None);
            }
            return Err(AppError::ValidationError(format!(
                "draw number '{raw}' contains no digits"
            )));
        }

        let mut query =
            students::Entity::find().filter(students::Column::DrawNumber.eq(number.clone()));
        if let Some(exclude) = exclude_student_id {
            query = query.filter(students::Column::StudentId.ne(exclude));
        }
        if let Some(holder) = query.one(&self.pool).await? {
            return Err(AppError::ValidationError(format!(
                "draw number {number} is already assigned to student {}",
                holder.student_id
            )));
        }

        Ok(Some(number))
    }
}
