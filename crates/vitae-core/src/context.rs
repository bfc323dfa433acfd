//! User context assembly and the per-request completion input.
//!
//! `UserContext` is rebuilt from the profile store for every chat request and
//! never mutated afterwards. Every field has a total default, so the prompt
//! composer and the rule-based responder never deal with missing data.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::VitaeError, prompt::compose_prompt, traits::ProfileSource};

/// Display name used when neither persona settings nor the profile names one.
pub const DEFAULT_AGENT_NAME: &str = "AI Portfolio Agent";

/// Name used when the user's profile row is missing.
pub const DEFAULT_USER_NAME: &str = "User";

/// Persona applied when settings do not pick one.
pub const DEFAULT_PERSONA: &str = "professional";

/// Upper bound on projects carried into a context.
pub const MAX_PROJECTS: usize = 10;

/// A portfolio project as seen by the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: String,
}

/// A linked social/professional account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub platform: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub profile_url: String,
}

/// Identity row from the profile store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Persona settings row. JSON-encoded list columns arrive already parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaSettings {
    pub agent_name: Option<String>,
    pub persona_type: Option<String>,
    pub agent_description: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub years_experience: Option<u32>,
    pub specialties: Vec<String>,
    pub role_title: Option<String>,
}

/// Everything the agent knows about the person it represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub name: String,
    pub email: String,
    pub agent_name: String,
    pub persona_type: String,
    pub agent_description: String,
    pub professional_bio: String,
    pub current_role: String,
    pub years_experience: u32,
    pub skills: Vec<String>,
    pub specialties: Vec<String>,
    pub projects: Vec<Project>,
    pub connections: Vec<Connection>,
}

impl Default for UserContext {
    fn default() -> Self {
        Self::minimal()
    }
}

impl UserContext {
    /// The safe context used when the profile store cannot be read.
    pub fn minimal() -> Self {
        Self {
            name: DEFAULT_USER_NAME.to_string(),
            email: String::new(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            persona_type: DEFAULT_PERSONA.to_string(),
            agent_description: String::new(),
            professional_bio: String::new(),
            current_role: String::new(),
            years_experience: 0,
            skills: Vec::new(),
            specialties: Vec::new(),
            projects: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Merge the four collaborator reads into a context.
    ///
    /// Absent rows and blank values fall back to per-field defaults.
    pub fn assemble(
        profile: Option<UserProfile>,
        settings: Option<PersonaSettings>,
        mut projects: Vec<Project>,
        connections: Vec<Connection>,
    ) -> Self {
        let profile = profile.unwrap_or_default();
        let settings = settings.unwrap_or_default();

        let profile_name = non_blank(profile.name);
        let agent_name = non_blank(settings.agent_name)
            .or_else(|| profile_name.clone())
            .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string());

        projects.truncate(MAX_PROJECTS);

        Self {
            name: profile_name.unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            email: non_blank(profile.email).unwrap_or_default(),
            agent_name,
            persona_type: non_blank(settings.persona_type)
                .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
            agent_description: non_blank(settings.agent_description).unwrap_or_default(),
            professional_bio: non_blank(settings.bio).unwrap_or_default(),
            current_role: non_blank(settings.role_title).unwrap_or_default(),
            years_experience: settings.years_experience.unwrap_or(0),
            skills: settings.skills,
            specialties: settings.specialties,
            projects,
            connections,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build the context for `user_id` from the four profile sources.
///
/// Any failed read yields [`UserContext::minimal`]; partial assembly is never
/// attempted.
pub async fn build_context(source: &dyn ProfileSource, user_id: i64) -> UserContext {
    match fetch_context(source, user_id).await {
        Ok(ctx) => {
            debug!(
                "context for user {user_id}: {} skills, {} projects, {} connections",
                ctx.skills.len(),
                ctx.projects.len(),
                ctx.connections.len()
            );
            ctx
        }
        Err(e) => {
            warn!("context fetch for user {user_id} failed, using minimal context: {e}");
            UserContext::minimal()
        }
    }
}

async fn fetch_context(
    source: &dyn ProfileSource,
    user_id: i64,
) -> Result<UserContext, VitaeError> {
    let (profile, settings, projects, connections) = tokio::try_join!(
        source.read_user_profile(user_id),
        source.read_persona_settings(user_id),
        source.read_projects(user_id, MAX_PROJECTS),
        source.read_connections(user_id),
    )?;
    Ok(UserContext::assemble(profile, settings, projects, connections))
}

/// A role/content pair for API-based providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// "system" or "user".
    pub role: String,
    pub content: String,
}

/// Input handed to every stage of the provider chain.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Rendered from `user` by the prompt composer.
    pub system_prompt: String,
    /// The visitor's message, trimmed.
    pub message: String,
    pub user: UserContext,
}

impl CompletionRequest {
    /// Compose the system prompt for `user` and pair it with `message`.
    pub fn new(message: &str, user: UserContext) -> Self {
        Self {
            system_prompt: compose_prompt(&user),
            message: message.trim().to_string(),
            user,
        }
    }

    /// Structured messages for chat-completion style APIs: system then user.
    pub fn to_api_messages(&self) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.is_empty() {
            messages.push(ApiMessage {
                role: "system".to_string(),
                content: self.system_prompt.clone(),
            });
        }
        messages.push(ApiMessage {
            role: "user".to_string(),
            content: self.message.clone(),
        });
        messages
    }
}
