//! Profile reads for the context builder, plus the writes used by seeding.

use super::Store;
use async_trait::async_trait;
use vitae_core::{
    context::{Connection, PersonaSettings, Project, UserProfile},
    error::VitaeError,
    traits::ProfileSource,
};

/// Parse a JSON-encoded string list column.
///
/// Absent, malformed, or non-array values yield an empty list. Non-string
/// and blank entries are dropped.
pub fn parse_string_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => {
                    let s = s.trim().to_string();
                    (!s.is_empty()).then_some(s)
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

type SettingsRow = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
);

#[async_trait]
impl ProfileSource for Store {
    async fn read_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, VitaeError> {
        let row: Option<(Option<String>, Option<String>)> =
            sqlx::query_as("SELECT name, email FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| VitaeError::Persistence(format!("read user failed: {e}")))?;

        Ok(row.map(|(name, email)| UserProfile { name, email }))
    }

    async fn read_persona_settings(
        &self,
        user_id: i64,
    ) -> Result<Option<PersonaSettings>, VitaeError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            "SELECT agent_name, persona_type, agent_description, bio, skills, \
             years_experience, specialties, role_title \
             FROM user_settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("read settings failed: {e}")))?;

        Ok(row.map(
            |(agent_name, persona_type, agent_description, bio, skills, years, specialties, role)| {
                PersonaSettings {
                    agent_name,
                    persona_type,
                    agent_description,
                    bio,
                    skills: parse_string_list(skills.as_deref()),
                    years_experience: years.and_then(|y| u32::try_from(y).ok()),
                    specialties: parse_string_list(specialties.as_deref()),
                    role_title: role,
                }
            },
        ))
    }

    async fn read_projects(&self, user_id: i64, limit: usize) -> Result<Vec<Project>, VitaeError> {
        let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT title, description, technologies FROM projects \
             WHERE user_id = ? \
             ORDER BY featured DESC, created_at DESC, id DESC \
             LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("read projects failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(title, description, technologies)| Project {
                title,
                description: description.unwrap_or_default(),
                technologies: technologies.unwrap_or_default(),
            })
            .collect())
    }

    async fn read_connections(&self, user_id: i64) -> Result<Vec<Connection>, VitaeError> {
        let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT platform, username, profile_url FROM social_connections \
             WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("read connections failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(platform, username, profile_url)| Connection {
                platform,
                username: username.unwrap_or_default(),
                profile_url: profile_url.unwrap_or_default(),
            })
            .collect())
    }
}

impl Store {
    /// Create or update a user's identity row.
    pub async fn upsert_user(
        &self,
        user_id: i64,
        name: &str,
        email: Option<&str>,
    ) -> Result<(), VitaeError> {
        sqlx::query(
            "INSERT INTO users (id, name, email) VALUES (?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email",
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("upsert user failed: {e}")))?;

        Ok(())
    }

    /// Create or replace a user's persona settings. List fields are stored as JSON.
    pub async fn upsert_persona_settings(
        &self,
        user_id: i64,
        settings: &PersonaSettings,
    ) -> Result<(), VitaeError> {
        let skills = serde_json::to_string(&settings.skills)?;
        let specialties = serde_json::to_string(&settings.specialties)?;

        sqlx::query(
            "INSERT INTO user_settings \
             (user_id, agent_name, persona_type, agent_description, bio, skills, \
              years_experience, specialties, role_title) \
             VALUES (?, ?, COALESCE(?, 'professional'), ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET \
                agent_name = excluded.agent_name, \
                persona_type = excluded.persona_type, \
                agent_description = excluded.agent_description, \
                bio = excluded.bio, \
                skills = excluded.skills, \
                years_experience = excluded.years_experience, \
                specialties = excluded.specialties, \
                role_title = excluded.role_title",
        )
        .bind(user_id)
        .bind(&settings.agent_name)
        .bind(&settings.persona_type)
        .bind(&settings.agent_description)
        .bind(&settings.bio)
        .bind(&skills)
        .bind(settings.years_experience.map(i64::from))
        .bind(&specialties)
        .bind(&settings.role_title)
        .execute(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("upsert settings failed: {e}")))?;

        Ok(())
    }

    /// Add a project. Returns the new row id.
    pub async fn add_project(
        &self,
        user_id: i64,
        project: &Project,
        featured: bool,
    ) -> Result<i64, VitaeError> {
        let result = sqlx::query(
            "INSERT INTO projects (user_id, title, description, technologies, featured) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.technologies)
        .bind(featured)
        .execute(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("insert project failed: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Delete all of a user's projects. Returns the number removed.
    pub async fn clear_projects(&self, user_id: i64) -> Result<u64, VitaeError> {
        let result = sqlx::query("DELETE FROM projects WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| VitaeError::Persistence(format!("delete projects failed: {e}")))?;

        Ok(result.rows_affected())
    }

    /// Create or update a social connection (one per platform).
    pub async fn upsert_connection(
        &self,
        user_id: i64,
        connection: &Connection,
    ) -> Result<(), VitaeError> {
        sqlx::query(
            "INSERT INTO social_connections (user_id, platform, username, profile_url) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(user_id, platform) DO UPDATE SET \
                username = excluded.username, profile_url = excluded.profile_url",
        )
        .bind(user_id)
        .bind(&connection.platform)
        .bind(&connection.username)
        .bind(&connection.profile_url)
        .execute(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("upsert connection failed: {e}")))?;

        Ok(())
    }
}
