//! Schema fixtures shared by the integration tests.

use identity_acctest::schema::{Element, FieldKind, ResourceSchema, SchemaNode, SchemaRegistry};
use serde_json::json;

/// A group resource with one required field and a few optional ones.
pub fn group_schema() -> ResourceSchema {
    ResourceSchema::new(
        "okta_group",
        vec![
            SchemaNode::string("name").required(),
            SchemaNode::string("description")
                .with_description("Group description. Example: \"Engineering team\""),
            SchemaNode::bool("skip_users").with_default(json!(false)),
            SchemaNode::string("id").computed_only(),
        ],
    )
}

/// A user resource with nested profile and list-of-block fields.
pub fn user_schema() -> ResourceSchema {
    ResourceSchema::new(
        "okta_user",
        vec![
            SchemaNode::string("login").required(),
            SchemaNode::string("email").required(),
            SchemaNode::int("recovery_question_count"),
            SchemaNode::map(
                "profile",
                vec![
                    SchemaNode::string("first_name").required(),
                    SchemaNode::string("nick_name"),
                ],
            ),
            SchemaNode::list(
                "addresses",
                Element::fields(vec![
                    SchemaNode::string("street").required(),
                    SchemaNode::string("city"),
                ]),
            ),
            SchemaNode::set("group_memberships", Element::of(FieldKind::String)),
            SchemaNode::string("status").computed(),
            SchemaNode::string("raw_status").computed_only(),
        ],
    )
}

/// A schema whose every field is skipped or unsupported.
pub fn unsupported_schema() -> ResourceSchema {
    ResourceSchema::new(
        "okta_policy_rule",
        vec![
            SchemaNode {
                kind: FieldKind::Unsupported,
                ..SchemaNode::string("conditions")
            },
            SchemaNode::string("id").computed_only(),
        ],
    )
}

/// Registry with the group and user fixtures.
pub fn fixture_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.add_schema(group_schema()).expect("group schema");
    registry.add_schema(user_schema()).expect("user schema");
    registry
}
