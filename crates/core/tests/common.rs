#![allow(dead_code)]

use byaf::{
    AiMessage, AiOutput, ArchiveInput, ArchiveWriter, Attachment, Author, Character,
    CharacterImage, ChatLine, Container, HumanMessage, LoreItem, Message, PromptTemplate,
    Scenario, SchemaVersion, Timestamp,
};
use serde_json::Value;

pub fn ts(raw: &str) -> Timestamp {
    Timestamp::parse(raw).expect("fixture timestamp")
}

/// Fixed manifest clock for byte-level comparisons.
pub fn created_at() -> Timestamp {
    ts("2024-05-01T12:00:00.500Z")
}

/// Fake image payload; content only needs to be distinguishable.
pub fn image_bytes(seed: u8, len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G'];
    bytes.extend((0..len).map(|i| seed.wrapping_add(i as u8)));
    bytes
}

pub fn character(images: Vec<CharacterImage>) -> Character<CharacterImage> {
    Character {
        schema_version: SchemaVersion,
        id: "abc".to_string(),
        name: "X".to_string(),
        display_name: "X".to_string(),
        is_nsfw: false,
        persona: "p".to_string(),
        created_at: ts("2024-04-30T08:15:00.000Z"),
        updated_at: ts("2024-04-30T09:00:00.250Z"),
        lore_items: Vec::new(),
        images,
    }
}

pub fn avatar() -> CharacterImage {
    CharacterImage::new(Attachment::new("avatar.png", image_bytes(1, 32)), "avatar")
}

pub fn scenario(background: Option<Attachment>) -> Scenario<Attachment> {
    Scenario {
        schema_version: SchemaVersion,
        title: None,
        model: None,
        formatting_instructions: String::new(),
        min_p: 0.25,
        min_p_enabled: true,
        temperature: 1.5,
        repeat_penalty: 1.0,
        repeat_last_n: 256.0,
        top_k: 40.0,
        top_p: 0.75,
        example_messages: Vec::new(),
        can_delete_example_messages: false,
        first_messages: Vec::new(),
        narrative: String::new(),
        prompt_template: None,
        grammar: None,
        messages: Vec::new(),
        background_image: background,
    }
}

/// A scenario using every optional field and both message variants.
pub fn rich_scenario(background: Option<Attachment>) -> Scenario<Attachment> {
    let greeting = ChatLine {
        character_id: "abc".to_string(),
        text: "Welcome aboard.".to_string(),
    };
    Scenario {
        title: Some("Night shift".to_string()),
        model: Some("llama-3-8b-instruct".to_string()),
        formatting_instructions: "Stay in character.".to_string(),
        example_messages: vec![greeting.clone()],
        can_delete_example_messages: true,
        first_messages: vec![greeting],
        narrative: "A quiet station at the edge of the map.".to_string(),
        prompt_template: Some(PromptTemplate::Llama3),
        grammar: Some("root ::= [a-z]+".to_string()),
        messages: vec![
            Message::Human(HumanMessage {
                created_at: ts("2024-05-01T10:00:00Z"),
                updated_at: ts("2024-05-01T10:00:00Z"),
                text: "hi".to_string(),
            }),
            Message::Ai(AiMessage {
                outputs: vec![
                    AiOutput {
                        created_at: ts("2024-05-01T10:00:02.125Z"),
                        updated_at: ts("2024-05-01T10:00:02.125Z"),
                        text: "hello".to_string(),
                        active_timestamp: ts("2024-05-01T10:00:02.125Z"),
                    },
                    AiOutput {
                        created_at: ts("2024-05-01T10:00:05Z"),
                        updated_at: ts("2024-05-01T10:00:06Z"),
                        text: "hey there".to_string(),
                        active_timestamp: ts("2024-05-01T10:00:06Z"),
                    },
                ],
            }),
        ],
        ..scenario(background)
    }
}

pub fn input() -> ArchiveInput {
    let mut character = character(vec![avatar()]);
    character.lore_items.push(LoreItem {
        key: "home".to_string(),
        value: "the moon".to_string(),
    });
    ArchiveInput::new(character, vec![rich_scenario(None)])
        .with_author(Author::new("Ada", "https://example.com/ada"))
}

/// Container written from [`input`] with the fixed clock.
pub fn valid_container() -> Container {
    let (_, container) = ArchiveWriter::new()
        .build_at(&input(), created_at())
        .expect("build fixture archive");
    container
}

pub fn json_entry(container: &Container, path: &str) -> Value {
    let bytes = container.get(path).expect("entry present");
    serde_json::from_slice(bytes).expect("entry is json")
}

/// Replaces a JSON entry with an edited copy.
pub fn edit_json(container: &mut Container, path: &str, edit: impl FnOnce(&mut Value)) {
    let mut value = json_entry(container, path);
    edit(&mut value);
    container.set_text(path, value.to_string());
}
