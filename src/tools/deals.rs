//! Deal tools

use super::args::*;
use super::{Reply, ToolCall};
use crate::mcp::protocol::{Param, Tool};
use serde_json::{json, Map, Value};

const CUSTOMER_TYPES: &[&str] = &["contact", "company"];

pub(super) fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "teamleader_list_deals",
            "List deals/opportunities from Teamleader Focus with optional filtering and pagination",
            vec![
                Param::number("page", "Page number (default: 1)"),
                Param::number("page_size", "Page size (default: 20, max: 100)"),
                Param::string("term", "Search term to filter deals"),
                Param::string("phase_id", "Filter by deal phase ID"),
                Param::string("responsible_user_id", "Filter by responsible user ID"),
                Param::string(
                    "updated_since",
                    "ISO 8601 date - only deals updated after this date",
                ),
            ],
        ),
        Tool::new(
            "teamleader_get_deal",
            "Get detailed information about a specific deal",
            vec![Param::string("id", "The deal ID").required()],
        ),
        Tool::new(
            "teamleader_create_deal",
            "Create a new deal/opportunity in Teamleader Focus",
            vec![
                Param::string("title", "Deal title").required(),
                Param::one_of("customer_type", "Customer type", CUSTOMER_TYPES).required(),
                Param::string("customer_id", "Customer ID (contact or company)").required(),
                Param::string("phase_id", "Deal phase ID").required(),
                Param::number("estimated_value_amount", "Estimated value amount"),
                Param::string("estimated_value_currency", "Currency code (e.g. 'EUR', 'USD')"),
                Param::string("estimated_closing_date", "Estimated closing date (YYYY-MM-DD)"),
                Param::number("estimated_probability", "Estimated probability (0-1)"),
                Param::string("responsible_user_id", "Responsible user ID"),
                Param::string("department_id", "Department ID"),
                Param::string("source_id", "Source ID"),
            ],
        ),
        Tool::new(
            "teamleader_update_deal",
            "Update an existing deal in Teamleader Focus",
            vec![
                Param::string("id", "The deal ID to update").required(),
                Param::string("title", "Deal title"),
                Param::number("estimated_value_amount", "Estimated value amount"),
                Param::string("estimated_value_currency", "Currency code (e.g. 'EUR', 'USD')"),
                Param::string("estimated_closing_date", "Estimated closing date (YYYY-MM-DD)"),
                Param::number("estimated_probability", "Estimated probability (0-1)"),
                Param::string("responsible_user_id", "Responsible user ID"),
            ],
        ),
    ]
}

pub(super) fn resolve(name: &str, args: &Args) -> Option<Result<ToolCall, ArgError>> {
    let call = match name {
        "teamleader_list_deals" => list(args),
        "teamleader_get_deal" => get(args),
        "teamleader_create_deal" => create(args),
        "teamleader_update_deal" => update(args),
        _ => return None,
    };
    Some(call)
}

fn list(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    set_opt(&mut body, "page", page_param(args)?);

    let mut filter = Map::new();
    set_opt(&mut filter, "term", optional_str(args, "term")?);
    set_opt(&mut filter, "phase_id", optional_str(args, "phase_id")?);
    set_opt(
        &mut filter,
        "responsible_user_id",
        optional_str(args, "responsible_user_id")?,
    );
    set_opt(&mut filter, "updated_since", optional_str(args, "updated_since")?);
    if !filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(filter));
    }

    Ok(ToolCall::new("deals.list", body))
}

fn get(args: &Args) -> Result<ToolCall, ArgError> {
    let id = required_str(args, "id")?;
    Ok(ToolCall::new("deals.info", json!({ "id": id })))
}

/// Estimate fields shared by create and update. The value is only sent
/// when both amount and currency are given.
fn estimates(args: &Args, body: &mut Map<String, Value>) -> Result<(), ArgError> {
    let amount = optional_number(args, "estimated_value_amount")?;
    let currency = optional_str(args, "estimated_value_currency")?;
    if let (Some(amount), Some(currency)) = (amount, currency) {
        body.insert(
            "estimated_value".to_string(),
            json!({ "amount": amount, "currency": currency }),
        );
    }

    set_opt(
        body,
        "estimated_closing_date",
        optional_str(args, "estimated_closing_date")?,
    );
    set_opt(
        body,
        "estimated_probability",
        optional_number(args, "estimated_probability")?,
    );
    set_opt(
        body,
        "responsible_user_id",
        optional_str(args, "responsible_user_id")?,
    );
    Ok(())
}

fn create(args: &Args) -> Result<ToolCall, ArgError> {
    let title = required_str(args, "title")?;
    let customer_type = required_choice(args, "customer_type", CUSTOMER_TYPES)?;
    let customer_id = required_str(args, "customer_id")?;
    let phase_id = required_str(args, "phase_id")?;

    let mut body = Map::new();
    body.insert("title".to_string(), title.into());
    body.insert(
        "lead".to_string(),
        json!({ "customer": id_ref(customer_type, customer_id) }),
    );
    body.insert("phase_id".to_string(), phase_id.into());

    estimates(args, &mut body)?;
    set_opt(&mut body, "department_id", optional_str(args, "department_id")?);
    set_opt(&mut body, "source_id", optional_str(args, "source_id")?);

    Ok(ToolCall::new("deals.create", body))
}

fn update(args: &Args) -> Result<ToolCall, ArgError> {
    let id = required_str(args, "id")?;

    let mut body = Map::new();
    body.insert("id".to_string(), id.into());
    set_opt(&mut body, "title", optional_str(args, "title")?);
    estimates(args, &mut body)?;

    Ok(ToolCall::new("deals.update", body).with_reply(Reply::updated("Deal", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_args;

    #[test]
    fn test_create_deal_with_lead_and_value() {
        let call = create(&test_args(json!({
            "title": "Website redesign",
            "customer_type": "company",
            "customer_id": "co-1",
            "phase_id": "ph-1",
            "estimated_value_amount": 12000,
            "estimated_value_currency": "EUR",
            "estimated_probability": 0,
        })))
        .unwrap();

        assert_eq!(call.operation, "deals.create");
        assert_eq!(
            call.payload,
            json!({
                "title": "Website redesign",
                "lead": { "customer": { "type": "company", "id": "co-1" } },
                "phase_id": "ph-1",
                "estimated_value": { "amount": 12000, "currency": "EUR" },
                "estimated_probability": 0
            })
        );
    }

    #[test]
    fn test_value_needs_currency() {
        let call = update(&test_args(json!({
            "id": "d-1",
            "estimated_value_amount": 500,
        })))
        .unwrap();
        assert_eq!(call.payload, json!({ "id": "d-1" }));
        assert_eq!(call.reply, Reply::updated("Deal", "d-1"));
    }

    #[test]
    fn test_create_rejects_bad_customer_type() {
        let err = create(&test_args(json!({
            "title": "x",
            "customer_type": "user",
            "customer_id": "u-1",
            "phase_id": "ph-1",
        })))
        .unwrap_err();
        assert!(matches!(err, ArgError::Invalid { name: "customer_type", .. }));
    }

    #[test]
    fn test_list_filters() {
        let call = list(&test_args(json!({
            "phase_id": "ph-2",
            "responsible_user_id": "u-9",
            "page_size": 100,
        })))
        .unwrap();
        assert_eq!(
            call.payload,
            json!({
                "page": { "number": 1, "size": 100 },
                "filter": { "phase_id": "ph-2", "responsible_user_id": "u-9" }
            })
        );
    }
}
