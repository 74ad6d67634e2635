//! Assessment/submission repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over assessments, questions, submissions and answers.
//! - Own the explicit cascade logic for parent deletions.
//!
//! # Invariants
//! - Deleting an assessment removes its questions, submissions and answers
//!   in a single transaction.
//! - Deleting a submission removes its answers in a single transaction.
//! - Write paths call record `validate()` before SQL mutations.

use crate::model::roster::{
    Assessment, AssessmentQuestion, AssessmentSubmission, EntityId, QuestionAnswer, QuestionType,
};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_db_bool, parse_entity_id, RepoError, RepoResult,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Repository interface for assessment lifecycle operations.
pub trait AssessmentRepository {
    fn create_assessment(&self, assessment: &Assessment) -> RepoResult<EntityId>;
    fn get_assessment(&self, id: EntityId) -> RepoResult<Option<Assessment>>;
    fn list_assessments(&self, creator_id: Option<EntityId>) -> RepoResult<Vec<Assessment>>;
    /// Deletes an assessment and all dependent rows in one transaction.
    fn delete_assessment(&mut self, id: EntityId) -> RepoResult<()>;

    fn add_question(&self, question: &AssessmentQuestion) -> RepoResult<EntityId>;
    fn list_questions(&self, assessment_id: EntityId) -> RepoResult<Vec<AssessmentQuestion>>;

    fn create_submission(&self, submission: &AssessmentSubmission) -> RepoResult<EntityId>;
    fn get_submission(&self, id: EntityId) -> RepoResult<Option<AssessmentSubmission>>;
    fn list_submissions(&self, assessment_id: EntityId)
        -> RepoResult<Vec<AssessmentSubmission>>;
    /// Deletes a submission and its answers in one transaction.
    fn delete_submission(&mut self, id: EntityId) -> RepoResult<()>;
    fn update_submission_grade(
        &self,
        id: EntityId,
        total_score: f64,
        feedback: Option<&str>,
    ) -> RepoResult<()>;

    fn record_answer(&self, answer: &QuestionAnswer) -> RepoResult<EntityId>;
    fn list_answers(&self, submission_id: EntityId) -> RepoResult<Vec<QuestionAnswer>>;
}

/// SQLite-backed assessment repository.
#[derive(Debug)]
pub struct SqliteAssessmentRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteAssessmentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                "assessments",
                "assessment_questions",
                "assessment_submissions",
                "question_answers",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl AssessmentRepository for SqliteAssessmentRepository<'_> {
    fn create_assessment(&self, assessment: &Assessment) -> RepoResult<EntityId> {
        assessment.validate()?;

        self.conn.execute(
            "INSERT INTO assessments (
                id,
                creator_id,
                title,
                description,
                due_date,
                total_points,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                assessment.id.to_string(),
                assessment.creator_id.map(|id| id.to_string()),
                assessment.title.as_str(),
                assessment.description.as_deref(),
                assessment
                    .due_date
                    .map(|date| date.format(DAY_FORMAT).to_string()),
                assessment.total_points,
                assessment.created_at,
            ],
        )?;

        Ok(assessment.id)
    }

    fn get_assessment(&self, id: EntityId) -> RepoResult<Option<Assessment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, creator_id, title, description, due_date, total_points, created_at
             FROM assessments
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assessment_row(row)?));
        }

        Ok(None)
    }

    fn list_assessments(&self, creator_id: Option<EntityId>) -> RepoResult<Vec<Assessment>> {
        let mut sql = String::from(
            "SELECT id, creator_id, title, description, due_date, total_points, created_at
             FROM assessments",
        );
        let mut bind_values = Vec::new();

        if let Some(creator) = creator_id {
            sql.push_str(" WHERE creator_id = ?");
            bind_values.push(creator.to_string());
        }

        sql.push_str(" ORDER BY created_at DESC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind_values))?;
        let mut assessments = Vec::new();

        while let Some(row) = rows.next()? {
            assessments.push(parse_assessment_row(row)?);
        }

        Ok(assessments)
    }

    fn delete_assessment(&mut self, id: EntityId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Dependents first so foreign keys hold throughout the transaction.
        tx.execute(
            "DELETE FROM question_answers
             WHERE submission_id IN (
                SELECT id FROM assessment_submissions WHERE assessment_id = ?1
             );",
            [id_text.as_str()],
        )?;
        tx.execute(
            "DELETE FROM assessment_submissions WHERE assessment_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute(
            "DELETE FROM assessment_questions WHERE assessment_id = ?1;",
            [id_text.as_str()],
        )?;
        let changed = tx.execute("DELETE FROM assessments WHERE id = ?1;", [id_text.as_str()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn add_question(&self, question: &AssessmentQuestion) -> RepoResult<EntityId> {
        question.validate()?;

        self.conn.execute(
            "INSERT INTO assessment_questions (
                id,
                assessment_id,
                question_text,
                question_type,
                points,
                options,
                correct_answer
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                question.id.to_string(),
                question.assessment_id.to_string(),
                question.question_text.as_str(),
                question_type_to_db(question.question_type),
                question.points,
                question.options.as_deref(),
                question.correct_answer.as_deref(),
            ],
        )?;

        Ok(question.id)
    }

    fn list_questions(&self, assessment_id: EntityId) -> RepoResult<Vec<AssessmentQuestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, assessment_id, question_text, question_type, points, options,
                    correct_answer
             FROM assessment_questions
             WHERE assessment_id = ?1
             ORDER BY rowid ASC;",
        )?;

        let mut rows = stmt.query([assessment_id.to_string()])?;
        let mut questions = Vec::new();

        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }

        Ok(questions)
    }

    fn create_submission(&self, submission: &AssessmentSubmission) -> RepoResult<EntityId> {
        submission.validate()?;

        self.conn.execute(
            "INSERT INTO assessment_submissions (
                id,
                assessment_id,
                student_id,
                submitted_at,
                graded,
                total_score,
                feedback
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                submission.id.to_string(),
                submission.assessment_id.to_string(),
                submission.student_id.to_string(),
                submission.submitted_at,
                bool_to_int(submission.graded),
                submission.total_score,
                submission.feedback.as_deref(),
            ],
        )?;

        Ok(submission.id)
    }

    fn get_submission(&self, id: EntityId) -> RepoResult<Option<AssessmentSubmission>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, assessment_id, student_id, submitted_at, graded, total_score, feedback
             FROM assessment_submissions
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_submission_row(row)?));
        }

        Ok(None)
    }

    fn list_submissions(
        &self,
        assessment_id: EntityId,
    ) -> RepoResult<Vec<AssessmentSubmission>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, assessment_id, student_id, submitted_at, graded, total_score, feedback
             FROM assessment_submissions
             WHERE assessment_id = ?1
             ORDER BY submitted_at DESC, id ASC;",
        )?;

        let mut rows = stmt.query([assessment_id.to_string()])?;
        let mut submissions = Vec::new();

        while let Some(row) = rows.next()? {
            submissions.push(parse_submission_row(row)?);
        }

        Ok(submissions)
    }

    fn delete_submission(&mut self, id: EntityId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        delete_submission_in_tx(&tx, id, id_text.as_str())?;

        tx.commit()?;
        Ok(())
    }

    fn update_submission_grade(
        &self,
        id: EntityId,
        total_score: f64,
        feedback: Option<&str>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE assessment_submissions
             SET graded = 1, total_score = ?1, feedback = ?2
             WHERE id = ?3;",
            params![total_score, feedback, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn record_answer(&self, answer: &QuestionAnswer) -> RepoResult<EntityId> {
        answer.validate()?;

        self.conn.execute(
            "INSERT INTO question_answers (
                id,
                submission_id,
                question_id,
                answer_text,
                score,
                feedback,
                ai_graded
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                answer.id.to_string(),
                answer.submission_id.to_string(),
                answer.question_id.to_string(),
                answer.answer_text.as_deref(),
                answer.score,
                answer.feedback.as_deref(),
                bool_to_int(answer.ai_graded),
            ],
        )?;

        Ok(answer.id)
    }

    fn list_answers(&self, submission_id: EntityId) -> RepoResult<Vec<QuestionAnswer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, submission_id, question_id, answer_text, score, feedback, ai_graded
             FROM question_answers
             WHERE submission_id = ?1
             ORDER BY rowid ASC;",
        )?;

        let mut rows = stmt.query([submission_id.to_string()])?;
        let mut answers = Vec::new();

        while let Some(row) = rows.next()? {
            answers.push(parse_answer_row(row)?);
        }

        Ok(answers)
    }
}

fn delete_submission_in_tx(tx: &Transaction<'_>, id: EntityId, id_text: &str) -> RepoResult<()> {
    tx.execute(
        "DELETE FROM question_answers WHERE submission_id = ?1;",
        [id_text],
    )?;
    let changed = tx.execute(
        "DELETE FROM assessment_submissions WHERE id = ?1;",
        [id_text],
    )?;

    if changed == 0 {
        return Err(RepoError::NotFound(id));
    }

    Ok(())
}

fn parse_assessment_row(row: &Row<'_>) -> RepoResult<Assessment> {
    let id_text: String = row.get("id")?;
    let creator_id = match row.get::<_, Option<String>>("creator_id")? {
        Some(value) => Some(parse_entity_id(&value, "assessments.creator_id")?),
        None => None,
    };
    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(NaiveDate::parse_from_str(&value, DAY_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid due_date value `{value}` in assessments.due_date"
            ))
        })?),
        None => None,
    };

    Ok(Assessment {
        id: parse_entity_id(&id_text, "assessments.id")?,
        creator_id,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date,
        total_points: row.get("total_points")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_question_row(row: &Row<'_>) -> RepoResult<AssessmentQuestion> {
    let id_text: String = row.get("id")?;
    let assessment_text: String = row.get("assessment_id")?;
    let type_text: String = row.get("question_type")?;
    let question_type = parse_question_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid question type `{type_text}` in assessment_questions.question_type"
        ))
    })?;

    Ok(AssessmentQuestion {
        id: parse_entity_id(&id_text, "assessment_questions.id")?,
        assessment_id: parse_entity_id(&assessment_text, "assessment_questions.assessment_id")?,
        question_text: row.get("question_text")?,
        question_type,
        points: row.get("points")?,
        options: row.get("options")?,
        correct_answer: row.get("correct_answer")?,
    })
}

fn parse_submission_row(row: &Row<'_>) -> RepoResult<AssessmentSubmission> {
    let id_text: String = row.get("id")?;
    let assessment_text: String = row.get("assessment_id")?;
    let student_text: String = row.get("student_id")?;
    let graded = parse_db_bool(
        row.get::<_, i64>("graded")?,
        "assessment_submissions.graded",
    )?;

    Ok(AssessmentSubmission {
        id: parse_entity_id(&id_text, "assessment_submissions.id")?,
        assessment_id: parse_entity_id(&assessment_text, "assessment_submissions.assessment_id")?,
        student_id: parse_entity_id(&student_text, "assessment_submissions.student_id")?,
        submitted_at: row.get("submitted_at")?,
        graded,
        total_score: row.get("total_score")?,
        feedback: row.get("feedback")?,
    })
}

fn parse_answer_row(row: &Row<'_>) -> RepoResult<QuestionAnswer> {
    let id_text: String = row.get("id")?;
    let submission_text: String = row.get("submission_id")?;
    let question_text: String = row.get("question_id")?;
    let ai_graded = parse_db_bool(row.get::<_, i64>("ai_graded")?, "question_answers.ai_graded")?;

    Ok(QuestionAnswer {
        id: parse_entity_id(&id_text, "question_answers.id")?,
        submission_id: parse_entity_id(&submission_text, "question_answers.submission_id")?,
        question_id: parse_entity_id(&question_text, "question_answers.question_id")?,
        answer_text: row.get("answer_text")?,
        score: row.get("score")?,
        feedback: row.get("feedback")?,
        ai_graded,
    })
}

fn question_type_to_db(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => "multiple_choice",
        QuestionType::TrueFalse => "true_false",
        QuestionType::ShortAnswer => "short_answer",
        QuestionType::Essay => "essay",
    }
}

fn parse_question_type(value: &str) -> Option<QuestionType> {
    match value {
        "multiple_choice" => Some(QuestionType::MultipleChoice),
        "true_false" => Some(QuestionType::TrueFalse),
        "short_answer" => Some(QuestionType::ShortAnswer),
        "essay" => Some(QuestionType::Essay),
        _ => None,
    }
}
