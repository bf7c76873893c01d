//! Company tools

use super::args::*;
use super::ToolCall;
use crate::mcp::protocol::{Param, Tool};
use serde_json::{json, Map, Value};

pub(super) fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "teamleader_list_companies",
            "List companies from Teamleader Focus with optional filtering and pagination",
            vec![
                Param::number("page", "Page number (default: 1)"),
                Param::number("page_size", "Page size (default: 20, max: 100)"),
                Param::string("term", "Search term to filter companies"),
                Param::string_array("tags", "Filter by tags"),
                Param::string("vat_number", "Filter by VAT number"),
                Param::string(
                    "updated_since",
                    "ISO 8601 date - only companies updated after this date",
                ),
            ],
        ),
        Tool::new(
            "teamleader_get_company",
            "Get detailed information about a specific company",
            vec![Param::string("id", "The company ID").required()],
        ),
        Tool::new(
            "teamleader_create_company",
            "Create a new company in Teamleader Focus",
            vec![
                Param::string("name", "Company name").required(),
                Param::string("email", "Primary email address"),
                Param::string("phone", "Phone number"),
                Param::string("vat_number", "VAT number"),
                Param::string("website", "Website URL"),
                Param::string("language", "Language code (e.g. 'en', 'fr', 'nl')"),
                Param::string_array("tags", "Tags to assign"),
            ],
        ),
    ]
}

pub(super) fn resolve(name: &str, args: &Args) -> Option<Result<ToolCall, ArgError>> {
    let call = match name {
        "teamleader_list_companies" => list(args),
        "teamleader_get_company" => get(args),
        "teamleader_create_company" => create(args),
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
    set_opt(&mut filter, "vat_number", optional_str(args, "vat_number")?);
    set_opt(&mut filter, "updated_since", optional_str(args, "updated_since")?);
    if !filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(filter));
    }

    Ok(ToolCall::new("companies.list", body))
}

fn get(args: &Args) -> Result<ToolCall, ArgError> {
    let id = required_str(args, "id")?;
    Ok(ToolCall::new("companies.info", json!({ "id": id })))
}

fn create(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    body.insert("name".to_string(), required_str(args, "name")?.into());

    if let Some(email) = optional_str(args, "email")? {
        body.insert(
            "emails".to_string(),
            json!([{ "type": "primary", "email": email }]),
        );
    }
    if let Some(phone) = optional_str(args, "phone")? {
        body.insert(
            "telephones".to_string(),
            json!([{ "type": "phone", "number": phone }]),
        );
    }

    set_opt(&mut body, "vat_number", optional_str(args, "vat_number")?);
    set_opt(&mut body, "website", optional_str(args, "website")?);
    set_opt(&mut body, "language", optional_str(args, "language")?);
    set_opt(&mut body, "tags", optional_string_array(args, "tags")?);

    Ok(ToolCall::new("companies.add", body))
}
