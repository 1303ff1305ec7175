use byaf::{validate, Entity, EntityKind, Message, PromptTemplate, ValidationError};
use serde_json::{json, Value};

fn messages(list: Value) -> Value {
    json!({
        "schemaVersion": 1,
        "formattingInstructions": "",
        "minP": 0.1,
        "minPEnabled": false,
        "temperature": 1.2,
        "repeatPenalty": 1.05,
        "repeatLastN": 256,
        "topK": 30,
        "topP": 0.9,
        "exampleMessages": [],
        "canDeleteExampleMessages": false,
        "firstMessages": [],
        "narrative": "",
        "promptTemplate": "general",
        "grammar": null,
        "messages": list
    })
}

fn human_then_ai(outputs: Value) -> Value {
    json!([
        {
            "type": "human",
            "text": "hi",
            "createdAt": "2024-05-01T12:00:00Z",
            "updatedAt": "2024-05-01T12:00:00Z"
        },
        {"type": "ai", "outputs": outputs}
    ])
}

fn rejected(raw: &Value) -> ValidationError {
    validate(EntityKind::Scenario, raw).expect_err("scenario should be rejected")
}

#[test]
fn human_and_ai_messages_validate() {
    let raw = messages(human_then_ai(json!([{
        "text": "hello",
        "createdAt": "2024-05-01T12:00:01Z",
        "updatedAt": "2024-05-01T12:00:01Z",
        "activeTimestamp": "2024-05-01T12:00:01Z"
    }])));
    match validate(EntityKind::Scenario, &raw).expect("valid scenario") {
        Entity::Scenario(scenario) => {
            assert_eq!(scenario.prompt_template, Some(PromptTemplate::General));
            assert!(matches!(scenario.messages[1], Message::Ai(ref ai) if ai.outputs.len() == 1));
        }
        other => panic!("expected scenario, got {other:?}"),
    }
}

#[test]
fn ai_message_with_no_outputs_names_outputs() {
    let err = rejected(&messages(human_then_ai(json!([]))));
    assert!(err.field.ends_with("outputs"), "field was {}", err.field);
    assert!(err.to_string().contains("outputs"));
}

#[test]
fn message_without_discriminator_is_rejected() {
    let err = rejected(&messages(json!([{"text": "who am I"}])));
    assert_eq!(err.field, "messages[0].type");
    assert_eq!(err.message, "is required");
}

#[test]
fn unknown_keys_are_ignored_outside_author() {
    let mut raw = messages(json!([]));
    raw["futureField"] = json!({"nested": true});
    assert!(validate(EntityKind::Scenario, &raw).is_ok());
}

#[test]
fn prompt_template_display_matches_wire_names() {
    let names: Vec<String> = PromptTemplate::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        ["general", "ChatML", "Llama3", "Gemma2", "CommandR", "MistralInstruct"]
    );
    for template in PromptTemplate::ALL {
        assert_eq!(
            serde_json::to_value(template).expect("serialize template"),
            json!(template.as_str())
        );
    }
}
