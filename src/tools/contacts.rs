//! Contact tools

use super::args::*;
use super::{Reply, ToolCall};
use crate::mcp::protocol::{Param, Tool};
use serde_json::{json, Map, Value};

const GENDERS: &[&str] = &["male", "female"];

pub(super) fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "teamleader_list_contacts",
            "List contacts from Teamleader Focus with optional filtering and pagination",
            vec![
                Param::number("page", "Page number (default: 1)"),
                Param::number("page_size", "Page size (default: 20, max: 100)"),
                Param::string("term", "Search term to filter contacts"),
                Param::string_array("tags", "Filter by tags"),
                Param::string(
                    "updated_since",
                    "ISO 8601 date - only contacts updated after this date",
                ),
            ],
        ),
        Tool::new(
            "teamleader_get_contact",
            "Get detailed information about a specific contact",
            vec![Param::string("id", "The contact ID").required()],
        ),
        Tool::new(
            "teamleader_create_contact",
            "Create a new contact in Teamleader Focus",
            vec![
                Param::string("first_name", "First name").required(),
                Param::string("last_name", "Last name").required(),
                Param::string("email", "Primary email address"),
                Param::string("phone", "Phone number"),
                Param::string("mobile", "Mobile number"),
                Param::string("language", "Language code (e.g. 'en', 'fr', 'nl')"),
                Param::one_of("gender", "Gender", GENDERS),
                Param::string_array("tags", "Tags to assign"),
            ],
        ),
        Tool::new(
            "teamleader_update_contact",
            "Update an existing contact in Teamleader Focus",
            vec![
                Param::string("id", "The contact ID to update").required(),
                Param::string("first_name", "First name"),
                Param::string("last_name", "Last name"),
                Param::string("email", "Primary email address"),
                Param::string("phone", "Phone number"),
                Param::string("mobile", "Mobile number"),
                Param::string("language", "Language code"),
                Param::one_of("gender", "Gender", GENDERS),
                Param::string_array("tags", "Tags to assign"),
            ],
        ),
    ]
}

pub(super) fn resolve(name: &str, args: &Args) -> Option<Result<ToolCall, ArgError>> {
    let call = match name {
        "teamleader_list_contacts" => list(args),
        "teamleader_get_contact" => get(args),
        "teamleader_create_contact" => create(args),
        "teamleader_update_contact" => update(args),
        _ => return None,
    };
    Some(call)
}

fn list(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    set_opt(&mut body, "page", page_param(args)?);

    let mut filter = Map::new();
    set_opt(&mut filter, "term", optional_str(args, "term")?);
    set_opt(&mut filter, "tags", optional_string_array(args, "tags")?);
    set_opt(&mut filter, "updated_since", optional_str(args, "updated_since")?);
    if !filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(filter));
    }

    Ok(ToolCall::new("contacts.list", body))
}

fn get(args: &Args) -> Result<ToolCall, ArgError> {
    let id = required_str(args, "id")?;
    Ok(ToolCall::new("contacts.info", json!({ "id": id })))
}

/// Email, telephone and profile fields shared by create and update
fn contact_details(args: &Args, body: &mut Map<String, Value>) -> Result<(), ArgError> {
    if let Some(email) = optional_str(args, "email")? {
        body.insert(
            "emails".to_string(),
            json!([{ "type": "primary", "email": email }]),
        );
    }

    let mut telephones = Vec::new();
    if let Some(phone) = optional_str(args, "phone")? {
        telephones.push(json!({ "type": "phone", "number": phone }));
    }
    if let Some(mobile) = optional_str(args, "mobile")? {
        telephones.push(json!({ "type": "mobile", "number": mobile }));
    }
    if !telephones.is_empty() {
        body.insert("telephones".to_string(), Value::Array(telephones));
    }

    set_opt(body, "language", optional_str(args, "language")?);
    set_opt(body, "gender", optional_choice(args, "gender", GENDERS)?);
    set_opt(body, "tags", optional_string_array(args, "tags")?);
    Ok(())
}

fn create(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    body.insert("first_name".to_string(), required_str(args, "first_name")?.into());
    body.insert("last_name".to_string(), required_str(args, "last_name")?.into());
    contact_details(args, &mut body)?;

    Ok(ToolCall::new("contacts.add", body))
}

fn update(args: &Args) -> Result<ToolCall, ArgError> {
    let id = required_str(args, "id")?;

    let mut body = Map::new();
    body.insert("id".to_string(), id.into());
    set_opt(&mut body, "first_name", optional_str(args, "first_name")?);
    set_opt(&mut body, "last_name", optional_str(args, "last_name")?);
    contact_details(args, &mut body)?;

    Ok(ToolCall::new("contacts.update", body).with_reply(Reply::updated("Contact", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_args;

    #[test]
    fn test_list_without_arguments_sends_empty_body() {
        let call = list(&Args::new()).unwrap();
        assert_eq!(call.operation, "contacts.list");
        assert_eq!(call.payload, json!({}));
    }

    #[test]
    fn test_list_builds_page_and_filter() {
        let call = list(&test_args(json!({
            "page": 2,
            "term": "acme",
            "tags": ["vip"],
        })))
        .unwrap();

        assert_eq!(
            call.payload,
            json!({
                "page": { "number": 2, "size": 20 },
                "filter": { "term": "acme", "tags": ["vip"] }
            })
        );
    }

    #[test]
    fn test_create_shapes_emails_and_telephones() {
        let call = create(&test_args(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "phone": "+32 9 000 00 00",
            "mobile": "+32 470 00 00 00",
            "gender": "female",
        })))
        .unwrap();

        assert_eq!(call.operation, "contacts.add");
        assert_eq!(
            call.payload,
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "emails": [{ "type": "primary", "email": "ada@example.com" }],
                "telephones": [
                    { "type": "phone", "number": "+32 9 000 00 00" },
                    { "type": "mobile", "number": "+32 470 00 00 00" }
                ],
                "gender": "female"
            })
        );
        assert_eq!(call.reply, Reply::Result);
    }

    #[test]
    fn test_create_requires_names() {
        let err = create(&test_args(json!({ "first_name": "Ada" }))).unwrap_err();
        assert_eq!(err, ArgError::Missing("last_name"));
    }

    #[test]
    fn test_update_rejects_unknown_gender() {
        let err = update(&test_args(json!({ "id": "c-1", "gender": "x" }))).unwrap_err();
        assert!(matches!(err, ArgError::Invalid { name: "gender", .. }));
    }

    #[test]
    fn test_update_acknowledges() {
        let call = update(&test_args(json!({ "id": "c-1", "last_name": "Byron" }))).unwrap();
        assert_eq!(call.operation, "contacts.update");
        assert_eq!(call.payload, json!({ "id": "c-1", "last_name": "Byron" }));
        assert_eq!(call.reply, Reply::updated("Contact", "c-1"));
    }
}
