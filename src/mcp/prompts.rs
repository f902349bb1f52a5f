//! Prompt templates
//!
//! A fixed catalog of instruction templates. Placeholders are written as
//! `{name}` and substituted in a single pass, so substituted text is never
//! scanned for further placeholders.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{McpError, ValidationError};
use crate::mcp::types::{Content, GetPromptResult, Prompt, PromptArgument, PromptMessage, Role};

/// Declared prompt argument. `required` is what clients are told; an
/// absent argument falls back to `default` either way.
struct ArgSpec {
    name: &'static str,
    description: &'static str,
    required: bool,
    default: Option<&'static str>,
}

struct PromptTemplate {
    name: &'static str,
    description: &'static str,
    arguments: &'static [ArgSpec],
    template: &'static str,
}

const PROMPTS: &[PromptTemplate] = &[
    PromptTemplate {
        name: "create_blog_post",
        description: "Template for writing a structured blog post",
        arguments: &[
            ArgSpec {
                name: "topic",
                description: "Topic of the post",
                required: true,
                default: Some("technology"),
            },
            ArgSpec {
                name: "tone",
                description: "Tone of the post (formal, casual, technical)",
                required: false,
                default: Some("professional"),
            },
        ],
        template: "Write a blog post about \"{topic}\" in a {tone} tone.

Expected structure:
1. Catchy title
2. Introduction (1-2 paragraphs)
3. Main body (3-5 sections)
4. Conclusion
5. Call to action

Use the create_post tool to save the content to the CMS.",
    },
    PromptTemplate {
        name: "summarize_posts",
        description: "Summarize existing posts in the CMS",
        arguments: &[ArgSpec {
            name: "count",
            description: "Number of posts to summarize",
            required: false,
            default: Some("5"),
        }],
        template: "Use the list_posts tool to fetch the latest {count} posts from the CMS.

Then write an executive summary that includes:
- Main themes covered
- Key insights from each post
- Trends you notice
- Suggestions for next topics",
    },
    PromptTemplate {
        name: "content_ideas",
        description: "Generate content ideas based on existing posts",
        arguments: &[],
        template: "Review the existing posts in the CMS using list_posts.

Based on that content, suggest:
1. 5 new complementary topics
2. Content gaps to fill
3. Topics worth exploring in more depth
4. Trending themes not covered yet",
    },
];

/// Prompt template engine
#[derive(Debug, Default)]
pub struct PromptEngine;

impl PromptEngine {
    pub fn new() -> Self {
        Self
    }

    /// Render a prompt into a single user message
    pub fn get_prompt(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<GetPromptResult, McpError> {
        let prompt = PROMPTS
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| McpError::UnknownPrompt {
                name: name.to_string(),
            })?;

        let mut values = HashMap::with_capacity(prompt.arguments.len());
        for arg in prompt.arguments {
            let value = match (arguments.get(arg.name), arg.default) {
                (Some(value), _) if !value.is_null() => argument_text(arg.name, value)?,
                (_, Some(default)) => default.to_string(),
                (_, None) => {
                    return Err(ValidationError::MissingField {
                        field: arg.name.to_string(),
                    }
                    .into())
                }
            };
            values.insert(arg.name, value);
        }

        Ok(GetPromptResult {
            description: Some(prompt.description.to_string()),
            messages: vec![PromptMessage {
                role: Role::User,
                content: Content::text(render(prompt.template, &values)),
            }],
        })
    }
}

/// Descriptors of every prompt, in catalog order
pub fn prompt_definitions() -> Vec<Prompt> {
    PROMPTS
        .iter()
        .map(|p| Prompt {
            name: p.name.to_string(),
            description: Some(p.description.to_string()),
            arguments: p
                .arguments
                .iter()
                .map(|a| PromptArgument {
                    name: a.name.to_string(),
                    description: Some(a.description.to_string()),
                    required: a.required,
                })
                .collect(),
        })
        .collect()
}

/// Prompt arguments are strings; plain numbers and booleans are accepted too.
fn argument_text(name: &str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ValidationError::InvalidParameter {
            name: name.to_string(),
            message: "expected a string".to_string(),
        }),
    }
}

fn render(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}').map(|end| (&after[..end], end)) {
            Some((key, end)) if values.contains_key(key) => {
                out.push_str(&values[key]);
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
