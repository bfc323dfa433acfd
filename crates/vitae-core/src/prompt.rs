//! System prompt composition.
//!
//! Pure and deterministic: the same `UserContext` always renders to the same
//! bytes. Clauses are emitted in a fixed order and only when their backing
//! field carries data.

use crate::context::UserContext;

/// Render the system instruction handed to network providers.
pub fn compose_prompt(ctx: &UserContext) -> String {
    let mut prompt = format!(
        "You are {}, helping visitors learn about {}'s work and experience.\n\nAbout {}:",
        ctx.agent_name, ctx.name, ctx.name
    );

    for clause in profile_clauses(ctx) {
        prompt.push_str("\n- ");
        prompt.push_str(&clause);
    }

    prompt.push_str(&closing_block(&ctx.name));
    prompt
}

/// Optional "About" lines, in render order.
fn profile_clauses(ctx: &UserContext) -> Vec<String> {
    let mut clauses = Vec::new();

    if !ctx.professional_bio.is_empty() {
        clauses.push(format!("Bio: {}", ctx.professional_bio));
    }
    if !ctx.current_role.is_empty() {
        clauses.push(format!("Current Role: {}", ctx.current_role));
    }
    if ctx.years_experience > 0 {
        clauses.push(format!("Experience: {} years", ctx.years_experience));
    }
    if !ctx.skills.is_empty() {
        clauses.push(format!("Key Skills: {}", ctx.skills.join(", ")));
    }
    if !ctx.specialties.is_empty() {
        clauses.push(format!("Specialties: {}", ctx.specialties.join(", ")));
    }
    if !ctx.projects.is_empty() {
        let titles: Vec<&str> = ctx.projects.iter().map(|p| p.title.as_str()).collect();
        clauses.push(format!("Projects: {}", titles.join(", ")));
    }
    if !ctx.connections.is_empty() {
        let platforms: Vec<&str> = ctx
            .connections
            .iter()
            .map(|c| c.platform.as_str())
            .collect();
        clauses.push(format!("Connected on: {}", platforms.join(", ")));
    }

    clauses
}

fn closing_block(name: &str) -> String {
    format!(
        "\n\nYour role:\n\
         1. Answer questions about {name}'s background, skills, and projects\n\
         2. Help with Computer Science, algorithms, and data structures\n\
         3. Discuss the visitor's interests and how they relate to {name}'s experience\n\
         4. Be friendly, professional, and informative\n\
         5. If asked about portfolio items, provide relevant details\n\
         6. For technical questions, explain clearly with examples\n\n\
         Keep responses helpful, clear, and tailored to what the visitor wants to know."
    )
}
