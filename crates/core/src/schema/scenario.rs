use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use super::{EntityKind, Fields, ValidationError};
use crate::timestamp::Timestamp;
use crate::version::SchemaVersion;

/// A configured conversation: sampling parameters, prompt setup and history.
///
/// `B` is the background representation: an entry path in the stored
/// document, an [`crate::Attachment`] when it travels with its bytes.
/// Sampling parameters are checked for type only, never for range.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scenario<B = String> {
    pub schema_version: SchemaVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Model most recently used with this scenario.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub formatting_instructions: String,
    pub min_p: f64,
    pub min_p_enabled: bool,
    pub temperature: f64,
    pub repeat_penalty: f64,
    pub repeat_last_n: f64,
    pub top_k: f64,
    pub top_p: f64,
    pub example_messages: Vec<ChatLine>,
    /// The model may drop example messages to save context.
    pub can_delete_example_messages: bool,
    /// Zero or one opening line.
    pub first_messages: Vec<ChatLine>,
    pub narrative: String,
    /// `None` means "use the model's default template" and is written as `null`.
    pub prompt_template: Option<PromptTemplate>,
    pub grammar: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<B>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ChatLine {
    #[serde(rename = "characterID")]
    pub character_id: String,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum PromptTemplate {
    #[serde(rename = "general")]
    General,
    #[serde(rename = "ChatML")]
    ChatMl,
    Llama3,
    Gemma2,
    CommandR,
    MistralInstruct,
}

impl PromptTemplate {
    pub const ALL: [PromptTemplate; 6] = [
        PromptTemplate::General,
        PromptTemplate::ChatMl,
        PromptTemplate::Llama3,
        PromptTemplate::Gemma2,
        PromptTemplate::CommandR,
        PromptTemplate::MistralInstruct,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PromptTemplate::General => "general",
            PromptTemplate::ChatMl => "ChatML",
            PromptTemplate::Llama3 => "Llama3",
            PromptTemplate::Gemma2 => "Gemma2",
            PromptTemplate::CommandR => "CommandR",
            PromptTemplate::MistralInstruct => "MistralInstruct",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|template| template.as_str() == name)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the chat history, discriminated by its `type` field.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Human(HumanMessage),
    Ai(AiMessage),
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HumanMessage {
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub text: String,
}

/// Model turn; `outputs` holds every generated alternative and is never empty.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct AiMessage {
    pub outputs: Vec<AiOutput>,
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiOutput {
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub text: String,
    /// When this alternative was last the selected one.
    pub active_timestamp: Timestamp,
}

impl<B> Scenario<B> {
    /// Copy of this scenario carrying a different background.
    pub fn with_background<C>(&self, background_image: Option<C>) -> Scenario<C> {
        Scenario {
            schema_version: self.schema_version,
            title: self.title.clone(),
            model: self.model.clone(),
            formatting_instructions: self.formatting_instructions.clone(),
            min_p: self.min_p,
            min_p_enabled: self.min_p_enabled,
            temperature: self.temperature,
            repeat_penalty: self.repeat_penalty,
            repeat_last_n: self.repeat_last_n,
            top_k: self.top_k,
            top_p: self.top_p,
            example_messages: self.example_messages.clone(),
            can_delete_example_messages: self.can_delete_example_messages,
            first_messages: self.first_messages.clone(),
            narrative: self.narrative.clone(),
            prompt_template: self.prompt_template,
            grammar: self.grammar.clone(),
            messages: self.messages.clone(),
            background_image,
        }
    }

    /// Consumes the scenario, replacing its background.
    pub fn into_background<C>(self, background_image: Option<C>) -> (Scenario<C>, Option<B>) {
        let Scenario {
            schema_version,
            title,
            model,
            formatting_instructions,
            min_p,
            min_p_enabled,
            temperature,
            repeat_penalty,
            repeat_last_n,
            top_k,
            top_p,
            example_messages,
            can_delete_example_messages,
            first_messages,
            narrative,
            prompt_template,
            grammar,
            messages,
            background_image: previous,
        } = self;
        let scenario = Scenario {
            schema_version,
            title,
            model,
            formatting_instructions,
            min_p,
            min_p_enabled,
            temperature,
            repeat_penalty,
            repeat_last_n,
            top_k,
            top_p,
            example_messages,
            can_delete_example_messages,
            first_messages,
            narrative,
            prompt_template,
            grammar,
            messages,
            background_image,
        };
        (scenario, previous)
    }
}

impl Scenario {
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let fields = Fields::new(EntityKind::Scenario, "", value)?;
        let schema_version = fields.schema_version()?;
        let title = fields.optional_string("title")?;
        let model = fields.optional_string("model")?;
        let formatting_instructions = fields.string("formattingInstructions")?;
        let min_p = fields.number("minP")?;
        let min_p_enabled = fields.boolean("minPEnabled")?;
        let temperature = fields.number("temperature")?;
        let repeat_penalty = fields.number("repeatPenalty")?;
        let repeat_last_n = fields.number("repeatLastN")?;
        let top_k = fields.number("topK")?;
        let top_p = fields.number("topP")?;
        let example_messages = fields.objects("exampleMessages", ChatLine::read)?;
        let can_delete_example_messages = fields.boolean("canDeleteExampleMessages")?;
        let first_messages = fields.objects("firstMessages", ChatLine::read)?;
        if first_messages.len() > 1 {
            return Err(fields.fail(
                "firstMessages",
                format!("must contain at most 1 message, found {}", first_messages.len()),
            ));
        }
        let narrative = fields.string("narrative")?;
        let prompt_template = match fields.required("promptTemplate")? {
            Value::Null => None,
            Value::String(name) => Some(PromptTemplate::from_name(name).ok_or_else(|| {
                let known = template_names();
                fields.fail(
                    "promptTemplate",
                    format!("unknown prompt template {name:?}, expected one of {known}"),
                )
            })?),
            other => {
                return Err(fields.fail(
                    "promptTemplate",
                    format!("expected string or null, found {}", super::type_name(other)),
                ))
            }
        };
        let grammar = fields.nullable_string("grammar")?;
        let messages = fields.objects("messages", Message::read)?;
        let background_image = fields.optional_string("backgroundImage")?;

        Ok(Self {
            schema_version,
            title,
            model,
            formatting_instructions,
            min_p,
            min_p_enabled,
            temperature,
            repeat_penalty,
            repeat_last_n,
            top_k,
            top_p,
            example_messages,
            can_delete_example_messages,
            first_messages,
            narrative,
            prompt_template,
            grammar,
            messages,
            background_image,
        })
    }
}

impl ChatLine {
    fn read(fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            character_id: fields.string("characterID")?,
            text: fields.string("text")?,
        })
    }
}

impl Message {
    fn read(fields: &Fields<'_>) -> Result<Self, ValidationError> {
        let tag = fields.string("type")?;
        match tag.as_str() {
            "human" => Ok(Message::Human(HumanMessage {
                created_at: fields.timestamp("createdAt")?,
                updated_at: fields.timestamp("updatedAt")?,
                text: fields.string("text")?,
            })),
            "ai" => {
                let outputs = fields.objects("outputs", |output| {
                    Ok(AiOutput {
                        created_at: output.timestamp("createdAt")?,
                        updated_at: output.timestamp("updatedAt")?,
                        text: output.string("text")?,
                        active_timestamp: output.timestamp("activeTimestamp")?,
                    })
                })?;
                if outputs.is_empty() {
                    return Err(fields.fail("outputs", "must contain at least 1 output"));
                }
                Ok(Message::Ai(AiMessage { outputs }))
            }
            other => Err(fields.fail(
                "type",
                format!("unrecognized message type {other:?}, expected \"human\" or \"ai\""),
            )),
        }
    }
}

fn template_names() -> String {
    PromptTemplate::ALL
        .iter()
        .map(|template| template.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
