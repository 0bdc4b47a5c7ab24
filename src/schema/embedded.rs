//! Embedded identity provider resource schemas.
//!
//! These schemas mirror resources exposed by the identity provider plugin and
//! are embedded as static strings so the synthesizer and its tests work
//! without external schema files.

/// Returns the OAuth application schema as a JSON string.
pub fn oauth_app_schema() -> &'static str {
    r#"{
  "type": "okta_oauth_app",
  "description": "OpenID Connect client application",
  "fields": [
    { "name": "name", "kind": "string", "required": true, "description": "Name of resource." },
    { "name": "label", "kind": "string", "required": true, "description": "Application label." },
    {
      "name": "type",
      "kind": "string",
      "required": true,
      "description": "The type of client application. Example: \"web\""
    },
    { "name": "client_id", "kind": "string", "computed": true, "description": "OAuth client ID." },
    { "name": "client_secret", "kind": "string", "computed": true, "description": "OAuth client secret key." },
    {
      "name": "token_endpoint_auth_method",
      "kind": "string",
      "optional": true,
      "default": "client_secret_basic",
      "description": "Requested authentication method for the token endpoint. Example: \"client_secret_post\""
    },
    {
      "name": "auto_key_rotation",
      "kind": "bool",
      "optional": true,
      "default": true,
      "description": "Requested key rotation mode."
    },
    { "name": "client_uri", "kind": "string", "optional": true, "description": "URI to a web page providing information about the client." },
    { "name": "logo_uri", "kind": "string", "optional": true, "description": "URI that references a logo for the client." },
    {
      "name": "redirect_uris",
      "kind": "list",
      "optional": true,
      "element": { "kind": "string", "description": "example: \"https://example.com/callback\"" },
      "description": "List of URIs for use in the redirect-based flow."
    },
    {
      "name": "grant_types",
      "kind": "list",
      "required": true,
      "element": { "kind": "string", "description": "Example: \"authorization_code\"" },
      "description": "List of OAuth 2.0 grant type strings."
    },
    {
      "name": "consent_method",
      "kind": "string",
      "optional": true,
      "default": "TRUSTED",
      "description": "Indicates whether user consent is required or implicit. Example: \"REQUIRED\""
    },
    { "name": "status", "kind": "string", "computed": true, "description": "Status of application." }
  ]
}"#
}

/// Returns the application user assignment schema as a JSON string.
pub fn app_user_attachment_schema() -> &'static str {
    r#"{
  "type": "okta_app_user_attachment",
  "description": "Assignment of a user to an application",
  "fields": [
    { "name": "app_id", "kind": "string", "required": true, "description": "ID of application to associate user with." },
    { "name": "user_id", "kind": "string", "required": true, "description": "ID of user to associate with app." },
    { "name": "scope", "kind": "string", "computed": true },
    { "name": "username", "kind": "string", "optional": true },
    {
      "name": "password",
      "kind": "string",
      "optional": true,
      "description": "This will only be set if it is configured. It will be stored in clear text in state."
    }
  ]
}"#
}

/// Returns the custom user profile subschema as a JSON string.
pub fn user_schema_schema() -> &'static str {
    r#"{
  "type": "okta_user_schema",
  "description": "Custom user profile property",
  "fields": [
    { "name": "index", "kind": "string", "required": true, "description": "Subschema unique string identifier" },
    { "name": "title", "kind": "string", "required": true, "description": "Subschema title (display name)" },
    {
      "name": "type",
      "kind": "string",
      "required": true,
      "description": "Subschema type. Example: \"string\""
    },
    { "name": "description", "kind": "string", "optional": true, "description": "Custom Subschema description" },
    {
      "name": "required",
      "kind": "bool",
      "optional": true,
      "default": false,
      "description": "whether the Subschema is required, true or false. Default = false"
    },
    { "name": "min_length", "kind": "int", "optional": true, "description": "Subschema of type string minlength" },
    { "name": "max_length", "kind": "int", "optional": true, "description": "Subschema of type string maxlength" },
    {
      "name": "enum",
      "kind": "list",
      "optional": true,
      "element": { "kind": "string" },
      "description": "Enumerated values of the property."
    },
    {
      "name": "one_of",
      "kind": "list",
      "optional": true,
      "element": [
        { "name": "const", "kind": "string", "required": true },
        { "name": "title", "kind": "string", "required": true }
      ],
      "description": "Enumerated value titles."
    },
    {
      "name": "permissions",
      "kind": "string",
      "optional": true,
      "default": "READ_ONLY",
      "description": "SubSchema permissions: HIDE, READ_ONLY, or READ_WRITE. Example: \"READ_WRITE\""
    },
    {
      "name": "master",
      "kind": "map",
      "optional": true,
      "element": [
        { "name": "type", "kind": "string", "required": true, "description": "Example: \"PROFILE_MASTER\"" },
        { "name": "priority", "kind": "int", "optional": true }
      ],
      "description": "Profile manager settings."
    }
  ]
}"#
}
