//! Task tools

use super::args::*;
use super::ToolCall;
use crate::mcp::protocol::{Param, Tool};
use serde_json::{Map, Value};

const CUSTOMER_TYPES: &[&str] = &["contact", "company"];

pub(super) fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "teamleader_list_tasks",
            "List tasks from Teamleader Focus with optional filtering and pagination",
            vec![
                Param::number("page", "Page number (default: 1)"),
                Param::number("page_size", "Page size (default: 20, max: 100)"),
                Param::string("term", "Search term to filter tasks"),
                Param::one_of("customer_type", "Customer type to filter by", CUSTOMER_TYPES),
                Param::string("customer_id", "Customer ID to filter by"),
            ],
        ),
        Tool::new(
            "teamleader_create_task",
            "Create a new task in Teamleader Focus",
            vec![
                Param::string("description", "Task description").required(),
                Param::string("due_on", "Due date (YYYY-MM-DD)"),
                Param::one_of("customer_type", "Link task to a customer type", CUSTOMER_TYPES),
                Param::string("customer_id", "Link task to a customer ID"),
                Param::string("assignee_type", "Assignee type (e.g. 'user')"),
                Param::string("assignee_id", "Assignee ID"),
                Param::string("work_type_id", "Work type ID"),
            ],
        ),
    ]
}

pub(super) fn resolve(name: &str, args: &Args) -> Option<Result<ToolCall, ArgError>> {
    let call = match name {
        "teamleader_list_tasks" => list(args),
        "teamleader_create_task" => create(args),
        _ => return None,
    };
    Some(call)
}

fn customer(args: &Args) -> Result<Option<Value>, ArgError> {
    Ok(optional_id_ref(
        optional_choice(args, "customer_type", CUSTOMER_TYPES)?,
        optional_str(args, "customer_id")?,
    ))
}

fn list(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    set_opt(&mut body, "page", page_param(args)?);

    let mut filter = Map::new();
    set_opt(&mut filter, "term", optional_str(args, "term")?);
    set_opt(&mut filter, "customer", customer(args)?);
    if !filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(filter));
    }

    Ok(ToolCall::new("tasks.list", body))
}

fn create(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    body.insert("description".to_string(), required_str(args, "description")?.into());

    set_opt(&mut body, "due_on", optional_str(args, "due_on")?);
    set_opt(&mut body, "customer", customer(args)?);
    set_opt(
        &mut body,
        "assignee",
        optional_id_ref(
            optional_str(args, "assignee_type")?,
            optional_str(args, "assignee_id")?,
        ),
    );
    set_opt(&mut body, "work_type_id", optional_str(args, "work_type_id")?);

    Ok(ToolCall::new("tasks.create", body))
}
