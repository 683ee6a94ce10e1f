use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::metadata::ScheduleMetadata;
use crate::project::ProjectPlan;
use crate::task::{PredecessorLink, RelationshipType, TaskDescriptor};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    // Dependency rows are not foreign-keyed on predecessor_id: links to tasks
    // outside the stored plan are kept and dropped at calculation time.
    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS project_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                project_name TEXT NOT NULL,
                project_description TEXT NOT NULL,
                manager TEXT NOT NULL,
                project_start_date TEXT
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                wbs_code TEXT NOT NULL,
                duration_days INTEGER NOT NULL CHECK (duration_days >= 0)
            );
            CREATE TABLE IF NOT EXISTS task_dependencies (
                task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                predecessor_id TEXT NOT NULL,
                relationship TEXT NOT NULL,
                lag_days INTEGER NOT NULL,
                PRIMARY KEY (task_id, position)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| PersistenceError::Poisoned)
    }

    fn save_metadata(tx: &Transaction, metadata: &ScheduleMetadata) -> PersistenceResult<()> {
        tx.execute("DELETE FROM project_metadata", [])?;
        tx.execute(
            "INSERT INTO project_metadata
                (id, project_name, project_description, manager, project_start_date)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                metadata.project_name,
                metadata.project_description,
                metadata.manager,
                metadata
                    .project_start_date
                    .map(|date| date.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    fn save_tasks(tx: &Transaction, tasks: &[TaskDescriptor]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM task_dependencies", [])?;
        tx.execute("DELETE FROM tasks", [])?;
        let mut insert_task = tx.prepare(
            "INSERT INTO tasks (id, position, name, wbs_code, duration_days)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut insert_link = tx.prepare(
            "INSERT INTO task_dependencies
                (task_id, position, predecessor_id, relationship, lag_days)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, task) in tasks.iter().enumerate() {
            insert_task.execute(params![
                task.id,
                position as i64,
                task.name,
                task.wbs_code,
                task.duration_days,
            ])?;
            for (link_position, link) in task.predecessors.iter().enumerate() {
                insert_link.execute(params![
                    task.id,
                    link_position as i64,
                    link.predecessor_id,
                    link.relationship.as_str(),
                    link.lag_days,
                ])?;
            }
        }
        Ok(())
    }

    fn load_metadata(connection: &Connection) -> PersistenceResult<Option<ScheduleMetadata>> {
        let row = connection
            .query_row(
                "SELECT project_name, project_description, manager, project_start_date
                 FROM project_metadata WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((project_name, project_description, manager, start)) = row else {
            return Ok(None);
        };
        let project_start_date = start
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|err| {
                    PersistenceError::InvalidData(format!("invalid project_start_date '{raw}': {err}"))
                })
            })
            .transpose()?;

        Ok(Some(ScheduleMetadata {
            project_name,
            project_description,
            manager,
            project_start_date,
        }))
    }

    fn load_links(connection: &Connection) -> PersistenceResult<HashMap<String, Vec<PredecessorLink>>> {
        let mut stmt = connection.prepare(
            "SELECT task_id, predecessor_id, relationship, lag_days
             FROM task_dependencies ORDER BY task_id, position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                PredecessorLink::new(
                    row.get::<_, String>(1)?,
                    RelationshipType::parse_lenient(&row.get::<_, String>(2)?),
                    row.get::<_, i64>(3)?,
                ),
            ))
        })?;

        let mut links: HashMap<String, Vec<PredecessorLink>> = HashMap::new();
        for row in rows {
            let (task_id, link) = row?;
            links.entry(task_id).or_default().push(link);
        }
        Ok(links)
    }

    fn load_tasks(connection: &Connection) -> PersistenceResult<Vec<TaskDescriptor>> {
        let mut links = Self::load_links(connection)?;
        let mut stmt = connection.prepare(
            "SELECT id, name, wbs_code, duration_days FROM tasks ORDER BY position ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(TaskDescriptor {
                id: row.get(0)?,
                name: row.get(1)?,
                wbs_code: row.get(2)?,
                duration_days: row.get(3)?,
                predecessors: Vec::new(),
            })
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let mut task = row?;
            task.predecessors = links.remove(&task.id).unwrap_or_default();
            tasks.push(task);
        }
        Ok(tasks)
    }
}

impl PlanStore for SqlitePlanStore {
    fn save_plan(&self, plan: &ProjectPlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_metadata(&tx, &plan.metadata)?;
        Self::save_tasks(&tx, &plan.tasks)?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<ProjectPlan>> {
        let conn = self.lock()?;
        let Some(metadata) = Self::load_metadata(&conn)? else {
            return Ok(None);
        };
        let plan = ProjectPlan::with_tasks(metadata, Self::load_tasks(&conn)?);
        super::validate_plan(&plan)?;
        Ok(Some(plan))
    }
}
