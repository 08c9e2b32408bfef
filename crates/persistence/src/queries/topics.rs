// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Topic queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use helpdesk_domain::{Topic, TopicCategory};

use crate::diesel_schema::topics;
use crate::error::PersistenceError;

/// Diesel Queryable struct for topic rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = topics)]
pub(crate) struct TopicRow {
    pub topic_id: i64,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub department_id: i64,
    pub version: i32,
}

pub(crate) fn row_to_topic(row: TopicRow) -> Result<Topic, PersistenceError> {
    let category = TopicCategory::parse(&row.category)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    Ok(Topic {
        topic_id: Some(row.topic_id),
        name: row.name,
        category,
        subcategory: row.subcategory,
        description: row.description,
        department_id: row.department_id,
        version: row.version,
    })
}

/// Retrieves a topic by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the topic is not found.
pub fn get_topic(
    conn: &mut SqliteConnection,
    topic_id: i64,
) -> Result<Option<Topic>, PersistenceError> {
    debug!("Looking up topic by ID: {}", topic_id);

    let result: Result<TopicRow, diesel::result::Error> = topics::table
        .filter(topics::topic_id.eq(topic_id))
        .select(TopicRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row_to_topic(row)?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists all topics ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_topics(conn: &mut SqliteConnection) -> Result<Vec<Topic>, PersistenceError> {
    let rows: Vec<TopicRow> = topics::table
        .order(topics::name.asc())
        .select(TopicRow::as_select())
        .load(conn)?;

    rows.into_iter().map(row_to_topic).collect()
}

/// Lists the topics filed under a category.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_topics_by_category(
    conn: &mut SqliteConnection,
    category: TopicCategory,
) -> Result<Vec<Topic>, PersistenceError> {
    let rows: Vec<TopicRow> = topics::table
        .filter(topics::category.eq(category.as_str()))
        .order(topics::name.asc())
        .select(TopicRow::as_select())
        .load(conn)?;

    rows.into_iter().map(row_to_topic).collect()
}

/// Lists the topics owned by a department.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_topics_for_department(
    conn: &mut SqliteConnection,
    department_id: i64,
) -> Result<Vec<Topic>, PersistenceError> {
    let rows: Vec<TopicRow> = topics::table
        .filter(topics::department_id.eq(department_id))
        .order(topics::name.asc())
        .select(TopicRow::as_select())
        .load(conn)?;

    rows.into_iter().map(row_to_topic).collect()
}
