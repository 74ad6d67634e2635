//! Teacher-account and student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `teachers` and `students` storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call record `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Student lists are ordered by `last_name, first_name, id` for stable
//!   pagination.

use crate::model::roster::{EntityId, Student, TeacherAccount};
use crate::repo::{ensure_connection_ready, parse_entity_id, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    teacher_id,
    first_name,
    last_name,
    email,
    grade_level,
    created_at
FROM students";

/// Query options for listing students.
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    /// Restrict to one teacher's roster.
    pub teacher_id: Option<EntityId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for teacher-account and student operations.
pub trait RosterRepository {
    fn create_teacher(&self, teacher: &TeacherAccount) -> RepoResult<EntityId>;
    fn get_teacher(&self, id: EntityId) -> RepoResult<Option<TeacherAccount>>;
    fn create_student(&self, student: &Student) -> RepoResult<EntityId>;
    fn get_student(&self, id: EntityId) -> RepoResult<Option<Student>>;
    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    fn delete_student(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed roster repository.
#[derive(Debug)]
pub struct SqliteRosterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["teachers", "students"])?;
        Ok(Self { conn })
    }
}

impl RosterRepository for SqliteRosterRepository<'_> {
    fn create_teacher(&self, teacher: &TeacherAccount) -> RepoResult<EntityId> {
        teacher.validate()?;

        self.conn.execute(
            "INSERT INTO teachers (id, username, email, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                teacher.id.to_string(),
                teacher.username.as_str(),
                teacher.email.as_str(),
                teacher.created_at,
            ],
        )?;

        Ok(teacher.id)
    }

    fn get_teacher(&self, id: EntityId) -> RepoResult<Option<TeacherAccount>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, email, created_at
             FROM teachers
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            return Ok(Some(TeacherAccount {
                id: parse_entity_id(&id_text, "teachers.id")?,
                username: row.get("username")?,
                email: row.get("email")?,
                created_at: row.get("created_at")?,
            }));
        }

        Ok(None)
    }

    fn create_student(&self, student: &Student) -> RepoResult<EntityId> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (
                id,
                teacher_id,
                first_name,
                last_name,
                email,
                grade_level,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                student.id.to_string(),
                student.teacher_id.map(|id| id.to_string()),
                student.first_name.as_str(),
                student.last_name.as_str(),
                student.email.as_str(),
                student.grade_level,
                student.created_at,
            ],
        )?;

        Ok(student.id)
    }

    fn get_student(&self, id: EntityId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(teacher_id) = query.teacher_id {
            sql.push_str(" AND teacher_id = ?");
            bind_values.push(Value::Text(teacher_id.to_string()));
        }

        sql.push_str(" ORDER BY last_name ASC, first_name ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        student.validate()?;

        let changed = self.conn.execute(
            "UPDATE students
             SET
                teacher_id = ?1,
                first_name = ?2,
                last_name = ?3,
                email = ?4,
                grade_level = ?5
             WHERE id = ?6;",
            params![
                student.teacher_id.map(|id| id.to_string()),
                student.first_name.as_str(),
                student.last_name.as_str(),
                student.email.as_str(),
                student.grade_level,
                student.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(student.id));
        }

        Ok(())
    }

    fn delete_student(&self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id_text: String = row.get("id")?;
    let teacher_id = match row.get::<_, Option<String>>("teacher_id")? {
        Some(value) => Some(parse_entity_id(&value, "students.teacher_id")?),
        None => None,
    };

    Ok(Student {
        id: parse_entity_id(&id_text, "students.id")?,
        teacher_id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        grade_level: row.get("grade_level")?,
        created_at: row.get("created_at")?,
    })
}
