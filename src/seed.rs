//! `vitae seed` — load a profile TOML file into the store.
//!
//! ```toml
//! [user]
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//!
//! [persona]
//! agent_name = "Ada's Assistant"
//! skills = ["Go", "Rust"]
//! years_experience = 6
//!
//! [[projects]]
//! title = "Analytical Engine"
//! featured = true
//!
//! [[connections]]
//! platform = "github"
//! username = "ada"
//! ```

use serde::Deserialize;
use tracing::info;
use vitae_core::{
    context::{Connection, PersonaSettings, Project},
    error::VitaeError,
};
use vitae_memory::Store;

#[derive(Debug, Deserialize)]
pub struct SeedProfile {
    pub user: SeedUser,
    #[serde(default)]
    pub persona: Option<SeedPersona>,
    #[serde(default)]
    pub projects: Vec<SeedProject>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedPersona {
    pub agent_name: Option<String>,
    pub persona_type: Option<String>,
    pub agent_description: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub years_experience: Option<u32>,
    pub specialties: Vec<String>,
    pub role_title: Option<String>,
}

impl From<SeedPersona> for PersonaSettings {
    fn from(p: SeedPersona) -> Self {
        Self {
            agent_name: p.agent_name,
            persona_type: p.persona_type,
            agent_description: p.agent_description,
            bio: p.bio,
            skills: p.skills,
            years_experience: p.years_experience,
            specialties: p.specialties,
            role_title: p.role_title,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: String,
    #[serde(default)]
    pub featured: bool,
}

/// What a seed run wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub projects: usize,
    pub connections: usize,
}

/// Parse a seed file's contents.
pub fn parse_seed(content: &str) -> Result<SeedProfile, VitaeError> {
    toml::from_str(content).map_err(|e| VitaeError::Config(format!("invalid seed file: {e}")))
}

/// Write `profile` for `user_id`, replacing any previous projects.
pub async fn seed_profile(
    store: &Store,
    user_id: i64,
    profile: SeedProfile,
) -> Result<SeedSummary, VitaeError> {
    store
        .upsert_user(user_id, &profile.user.name, profile.user.email.as_deref())
        .await?;

    if let Some(persona) = profile.persona {
        store
            .upsert_persona_settings(user_id, &persona.into())
            .await?;
    }

    store.clear_projects(user_id).await?;
    for p in &profile.projects {
        let project = Project {
            title: p.title.clone(),
            description: p.description.clone(),
            technologies: p.technologies.clone(),
        };
        store.add_project(user_id, &project, p.featured).await?;
    }

    for c in &profile.connections {
        store.upsert_connection(user_id, c).await?;
    }

    let summary = SeedSummary {
        projects: profile.projects.len(),
        connections: profile.connections.len(),
    };
    info!(
        "seeded user {user_id}: {} projects, {} connections",
        summary.projects, summary.connections
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitae_core::{config::MemoryConfig, context::build_context};

    const SAMPLE: &str = r#"
        [user]
        name = "Ada Lovelace"
        email = "ada@example.com"

        [persona]
        agent_name = "Ada's Assistant"
        skills = ["Go", "Rust"]
        years_experience = 6
        role_title = "Staff Engineer"

        [[projects]]
        title = "Analytical Engine"
        technologies = "Brass"
        featured = true

        [[projects]]
        title = "Notes"

        [[connections]]
        platform = "github"
        username = "ada"
    "#;

    async fn temp_store(dir: &tempfile::TempDir) -> Store {
        let config = MemoryConfig {
            db_path: dir.path().join("vitae.db").to_string_lossy().into_owned(),
        };
        Store::new(&config).await.unwrap()
    }

    #[test]
    fn test_parse_seed() {
        let seed = parse_seed(SAMPLE).unwrap();
        assert_eq!(seed.user.name, "Ada Lovelace");
        assert_eq!(seed.persona.as_ref().unwrap().skills, ["Go", "Rust"]);
        assert_eq!(seed.projects.len(), 2);
        assert!(seed.projects[0].featured);
        assert!(!seed.projects[1].featured);
        assert_eq!(seed.connections[0].profile_url, "");
    }

    #[test]
    fn test_parse_seed_requires_user() {
        let err = parse_seed("[persona]\nskills = []").unwrap_err();
        assert!(matches!(err, VitaeError::Config(_)));
    }

    #[tokio::test]
    async fn test_seed_then_build_context() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;

        let summary = seed_profile(&store, 42, parse_seed(SAMPLE).unwrap())
            .await
            .unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                projects: 2,
                connections: 1
            }
        );

        let ctx = build_context(&store, 42).await;
        assert_eq!(ctx.name, "Ada Lovelace");
        assert_eq!(ctx.agent_name, "Ada's Assistant");
        assert_eq!(ctx.skills, ["Go", "Rust"]);
        assert_eq!(ctx.years_experience, 6);
        assert_eq!(ctx.projects[0].title, "Analytical Engine");
        assert_eq!(ctx.connections[0].platform, "github");
    }

    #[tokio::test]
    async fn test_reseed_replaces_projects() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir).await;

        seed_profile(&store, 1, parse_seed(SAMPLE).unwrap())
            .await
            .unwrap();
        seed_profile(&store, 1, parse_seed(SAMPLE).unwrap())
            .await
            .unwrap();

        let ctx = build_context(&store, 1).await;
        assert_eq!(ctx.projects.len(), 2);
        assert_eq!(ctx.connections.len(), 1);
    }
}
