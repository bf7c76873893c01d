//! Calendar event tools

use super::args::*;
use super::ToolCall;
use crate::mcp::protocol::{Param, Tool};
use serde_json::{json, Map, Value};

pub(super) fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "teamleader_list_events",
            "List calendar events from Teamleader Focus with optional filtering and pagination",
            vec![
                Param::number("page", "Page number (default: 1)"),
                Param::number("page_size", "Page size (default: 20, max: 100)"),
                Param::string(
                    "starts_after",
                    "ISO 8601 datetime - events starting after this date",
                ),
                Param::string(
                    "starts_before",
                    "ISO 8601 datetime - events starting before this date",
                ),
                Param::string("ends_after", "ISO 8601 datetime - events ending after this date"),
                Param::string(
                    "ends_before",
                    "ISO 8601 datetime - events ending before this date",
                ),
            ],
        ),
        Tool::new(
            "teamleader_get_event",
            "Get detailed information about a specific event",
            vec![Param::string("id", "The event ID").required()],
        ),
        Tool::new(
            "teamleader_create_event",
            "Create a new calendar event in Teamleader Focus",
            vec![
                Param::string("title", "Event title").required(),
                Param::string("description", "Event description"),
                Param::string("activity_type_id", "Activity type ID").required(),
                Param::string("starts_at", "Start datetime (ISO 8601)").required(),
                Param::string("ends_at", "End datetime (ISO 8601)").required(),
                Param::string("location", "Event location"),
                Param::object_array(
                    "attendee_ids",
                    "List of attendees",
                    vec![
                        Param::string("type", "Attendee type (e.g. 'user', 'contact')").required(),
                        Param::string("id", "Attendee ID").required(),
                    ],
                ),
            ],
        ),
    ]
}

pub(super) fn resolve(name: &str, args: &Args) -> Option<Result<ToolCall, ArgError>> {
    let call = match name {
        "teamleader_list_events" => list(args),
        "teamleader_get_event" => get(args),
        "teamleader_create_event" => create(args),
        _ => return None,
    };
    Some(call)
}

fn list(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    set_opt(&mut body, "page", page_param(args)?);

    let mut filter = Map::new();
    for key in ["starts_after", "starts_before", "ends_after", "ends_before"] {
        set_opt(&mut filter, key, optional_str(args, key)?);
    }
    if !filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(filter));
    }

    Ok(ToolCall::new("events.list", body))
}

fn get(args: &Args) -> Result<ToolCall, ArgError> {
    let id = required_str(args, "id")?;
    Ok(ToolCall::new("events.info", json!({ "id": id })))
}

fn create(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    for key in ["title", "activity_type_id", "starts_at", "ends_at"] {
        body.insert(key.to_string(), required_str(args, key)?.into());
    }

    set_opt(&mut body, "description", optional_str(args, "description")?);
    set_opt(&mut body, "location", optional_str(args, "location")?);

    if let Some(attendees) = optional_object_array(args, "attendee_ids")? {
        let attendees = attendees
            .iter()
            .map(|a| -> Result<Value, ArgError> {
                Ok(id_ref(required_str(a, "type")?, required_str(a, "id")?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        body.insert("attendees".to_string(), Value::Array(attendees));
    }

    Ok(ToolCall::new("events.create", body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_args;

    #[test]
    fn test_list_time_window() {
        let call = list(&test_args(json!({
            "starts_after": "2024-01-01T00:00:00+00:00",
            "ends_before": "2024-02-01T00:00:00+00:00",
        })))
        .unwrap();

        assert_eq!(call.operation, "events.list");
        assert_eq!(
            call.payload,
            json!({
                "filter": {
                    "starts_after": "2024-01-01T00:00:00+00:00",
                    "ends_before": "2024-02-01T00:00:00+00:00"
                }
            })
        );
    }

    #[test]
    fn test_create_event_maps_attendees() {
        let call = create(&test_args(json!({
            "title": "Kick-off",
            "activity_type_id": "at-1",
            "starts_at": "2024-03-01T09:00:00+01:00",
            "ends_at": "2024-03-01T10:00:00+01:00",
            "attendee_ids": [{ "type": "user", "id": "u-1" }],
        })))
        .unwrap();

        assert_eq!(
            call.payload["attendees"],
            json!([{ "type": "user", "id": "u-1" }])
        );
        assert!(call.payload.get("attendee_ids").is_none());
    }

    #[test]
    fn test_create_event_requires_window() {
        let err = create(&test_args(json!({
            "title": "Kick-off",
            "activity_type_id": "at-1",
            "starts_at": "2024-03-01T09:00:00+01:00",
        })))
        .unwrap_err();
        assert_eq!(err, ArgError::Missing("ends_at"));
    }
}
