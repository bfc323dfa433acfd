//! Offline keyword responder for the terminal stage of the provider chain.
//!
//! The message is normalized (trimmed, lowercased) and checked against an
//! ordered rule table. The first matching rule renders the answer; anything
//! unmatched gets the generic capability listing. Output depends only on
//! `(message, context)`.

use async_trait::async_trait;
use std::time::Instant;
use vitae_core::{
    context::{CompletionRequest, UserContext},
    message::{Completion, CompletionMetadata, ProviderResult},
    traits::CompletionProvider,
};

/// Number of project titles quoted by the portfolio answer.
const QUOTED_PROJECTS: usize = 3;

/// How a rule decides it applies to a normalized message.
enum Trigger {
    /// The whole message equals one of these.
    Exact(&'static [&'static str]),
    /// The message contains one of these.
    Contains(&'static [&'static str]),
}

impl Trigger {
    fn matches(&self, msg: &str) -> bool {
        match self {
            Self::Exact(words) => words.contains(&msg),
            Self::Contains(needles) => needles.iter().any(|n| msg.contains(n)),
        }
    }
}

struct Rule {
    trigger: Trigger,
    render: fn(&UserContext) -> String,
}

/// Evaluated top to bottom; first match wins.
const RULES: &[Rule] = &[
    Rule {
        trigger: Trigger::Exact(&["hi", "hello", "hey"]),
        render: greeting,
    },
    Rule {
        trigger: Trigger::Exact(&["gi"]),
        render: typo_greeting,
    },
    Rule {
        trigger: Trigger::Contains(&["binary search", "bst"]),
        render: binary_search_tree,
    },
    Rule {
        trigger: Trigger::Contains(&["algorithm", "sort"]),
        render: sorting_algorithms,
    },
    Rule {
        trigger: Trigger::Contains(&["hash"]),
        render: hash_tables,
    },
    Rule {
        trigger: Trigger::Contains(&["skill", "technolog"]),
        render: skills,
    },
    Rule {
        trigger: Trigger::Contains(&["experience", "background"]),
        render: experience,
    },
    Rule {
        trigger: Trigger::Contains(&["portfolio", "project"]),
        render: portfolio,
    },
];

fn greeting(ctx: &UserContext) -> String {
    format!(
        "Hello! 👋 I'm {}, an AI assistant helping visitors learn about {}'s work and skills. \
         I can answer questions about computer science, algorithms, data structures, and more. \
         What would you like to know?",
        ctx.agent_name, ctx.name
    )
}

fn typo_greeting(_ctx: &UserContext) -> String {
    "I think you meant \"hi\"? 😊 Hello! I'm here to help with CS questions and portfolio \
     information."
        .to_string()
}

fn binary_search_tree(_ctx: &UserContext) -> String {
    r"A Binary Search Tree (BST) is a data structure where each node has at most two children (left and right). Key properties:
- Left child < Parent < Right child
- Enables O(log n) search, insert, delete on average
- Becomes O(n) if unbalanced (use AVL or Red-Black trees for balance)

Example:
      5
     / \
    3   7
   / \ / \
  2  4 6  8

Time Complexities:
- Search: O(log n) average, O(n) worst
- Insert: O(log n) average, O(n) worst
- Delete: O(log n) average, O(n) worst"
        .to_string()
}

fn sorting_algorithms(_ctx: &UserContext) -> String {
    "Common Sorting Algorithms:

1. **Quick Sort** - O(n log n) average, O(n²) worst, in-place
2. **Merge Sort** - O(n log n) guaranteed, stable, needs O(n) space
3. **Heap Sort** - O(n log n) guaranteed, in-place
4. **Insertion Sort** - O(n²) average, good for small arrays
5. **Bubble Sort** - O(n²), simple but inefficient

Choose based on:
- Data size
- Stability needs
- Memory constraints
- Already sorted data"
        .to_string()
}

fn hash_tables(_ctx: &UserContext) -> String {
    "Hash Tables / Hash Maps:
- Use hash function to map keys to indices
- Average O(1) lookup, insert, delete
- Collisions handled by chaining or probing
- Load factor affects performance
- Good for caching and rapid lookups"
        .to_string()
}

fn skills(ctx: &UserContext) -> String {
    if ctx.skills.is_empty() {
        return format!(
            "{} hasn't listed any skills yet. Ask me about their projects, or about \
             algorithms and data structures in the meantime.",
            ctx.name
        );
    }
    let mut out = format!(
        "{}'s key skills include: {}.",
        ctx.name,
        ctx.skills.join(", ")
    );
    if !ctx.specialties.is_empty() {
        out.push_str(&format!(
            " Their specialties are {}.",
            ctx.specialties.join(", ")
        ));
    }
    out
}

fn experience(ctx: &UserContext) -> String {
    let mut parts = Vec::new();
    if !ctx.current_role.is_empty() {
        parts.push(format!("{} currently works as {}.", ctx.name, ctx.current_role));
    }
    match ctx.years_experience {
        0 => {}
        1 => parts.push("They have 1 year of professional experience.".to_string()),
        n => parts.push(format!("They have {n} years of professional experience.")),
    }
    if !ctx.professional_bio.is_empty() {
        parts.push(ctx.professional_bio.clone());
    }
    if parts.is_empty() {
        return format!(
            "{} hasn't shared their professional background yet. Feel free to ask about \
             their projects or skills instead.",
            ctx.name
        );
    }
    parts.join(" ")
}

fn portfolio(ctx: &UserContext) -> String {
    let count = ctx.projects.len();
    let noun = if count == 1 { "project" } else { "projects" };
    let mut out = format!("{} has {count} {noun} listed.", ctx.name);
    if count > 0 {
        let titles: Vec<&str> = ctx
            .projects
            .iter()
            .take(QUOTED_PROJECTS)
            .map(|p| p.title.as_str())
            .collect();
        out.push_str(&format!(" Highlights: {}.", titles.join(", ")));
    }
    out.push_str(&format!(
        " I can help visitors learn about {}'s work and answer technical questions.",
        ctx.name
    ));
    out
}

const GENERIC_RESPONSE: &str = "I'm running on a fallback system because the main AI API is unavailable.

I can help with:
- Data structures (arrays, linked lists, trees, graphs, hash tables)
- Algorithms (sorting, searching, dynamic programming)
- Time complexity analysis
- Computer Science concepts
- Portfolio and projects

Try asking me about: \"What is a binary search tree?\" or \"Explain quick sort\"";

/// Deterministic keyword responder. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedResponder;

impl RuleBasedResponder {
    pub fn new() -> Self {
        Self
    }

    /// Answer `message` from the rule table.
    pub fn respond(&self, message: &str, ctx: &UserContext) -> String {
        let msg = message.trim().to_lowercase();
        RULES
            .iter()
            .find(|rule| rule.trigger.matches(&msg))
            .map(|rule| (rule.render)(ctx))
            .unwrap_or_else(|| GENERIC_RESPONSE.to_string())
    }

    /// Always-successful completion wrapping [`respond`](Self::respond).
    pub fn complete(&self, request: &CompletionRequest) -> Completion {
        let start = Instant::now();
        let text = self.respond(&request.message, &request.user);
        Completion {
            text,
            metadata: CompletionMetadata {
                provider_used: self.name().to_string(),
                tokens_used: None,
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: None,
            },
        }
    }
}

#[async_trait]
impl CompletionProvider for RuleBasedResponder {
    fn name(&self) -> &str {
        "rules"
    }

    fn is_remote(&self) -> bool {
        false
    }

    async fn attempt(&self, request: &CompletionRequest) -> ProviderResult {
        Ok(self.complete(request))
    }
}
