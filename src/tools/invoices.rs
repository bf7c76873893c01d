//! Invoice tools

use super::args::*;
use super::ToolCall;
use crate::mcp::protocol::{Param, Tool};
use serde_json::{json, Map, Value};

const CUSTOMER_TYPES: &[&str] = &["contact", "company"];

pub(super) fn definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "teamleader_list_invoices",
            "List invoices from Teamleader Focus with optional filtering and pagination",
            vec![
                Param::number("page", "Page number (default: 1)"),
                Param::number("page_size", "Page size (default: 20, max: 100)"),
                Param::string("department_id", "Filter by department ID"),
                Param::string_array(
                    "status",
                    "Filter by status (e.g. ['draft', 'outstanding', 'paid'])",
                ),
                Param::string(
                    "updated_since",
                    "ISO 8601 date - only invoices updated after this date",
                ),
                Param::string("invoice_date_after", "Filter invoices dated after (YYYY-MM-DD)"),
                Param::string("invoice_date_before", "Filter invoices dated before (YYYY-MM-DD)"),
            ],
        ),
        Tool::new(
            "teamleader_get_invoice",
            "Get detailed information about a specific invoice",
            vec![Param::string("id", "The invoice ID").required()],
        ),
        Tool::new(
            "teamleader_create_invoice",
            "Create a new draft invoice in Teamleader Focus",
            vec![
                Param::one_of("customer_type", "Customer type", CUSTOMER_TYPES).required(),
                Param::string("customer_id", "Customer ID").required(),
                Param::string("department_id", "Department ID").required(),
                Param::string(
                    "payment_term_type",
                    "Payment term type (e.g. 'cash', 'end_of_month', 'after_invoice_date')",
                )
                .required(),
                Param::number("payment_term_days", "Number of days for payment term"),
                Param::string("invoice_date", "Invoice date (YYYY-MM-DD, defaults to today)"),
                Param::string("note", "Note to include on the invoice"),
                Param::object_array(
                    "line_items",
                    "Line items for the invoice",
                    vec![
                        Param::number("quantity", "Quantity").required(),
                        Param::string("description", "Line item description").required(),
                        Param::number("unit_price_amount", "Unit price amount").required(),
                        Param::string("unit_price_currency", "Currency code (e.g. 'EUR')")
                            .required(),
                        Param::string("tax_rate_id", "Tax rate ID").required(),
                        Param::string("product_id", "Product ID (optional)"),
                    ],
                )
                .required(),
            ],
        ),
    ]
}

pub(super) fn resolve(name: &str, args: &Args) -> Option<Result<ToolCall, ArgError>> {
    let call = match name {
        "teamleader_list_invoices" => list(args),
        "teamleader_get_invoice" => get(args),
        "teamleader_create_invoice" => create(args),
        _ => return None,
    };
    Some(call)
}

fn list(args: &Args) -> Result<ToolCall, ArgError> {
    let mut body = Map::new();
    set_opt(&mut body, "page", page_param(args)?);

    let mut filter = Map::new();
    set_opt(&mut filter, "department_id", optional_str(args, "department_id")?);
    set_opt(&mut filter, "status", optional_string_array(args, "status")?);
    for key in ["updated_since", "invoice_date_after", "invoice_date_before"] {
        set_opt(&mut filter, key, optional_str(args, key)?);
    }
    if !filter.is_empty() {
        body.insert("filter".to_string(), Value::Object(filter));
    }

    Ok(ToolCall::new("invoices.list", body))
}

fn get(args: &Args) -> Result<ToolCall, ArgError> {
    let id = required_str(args, "id")?;
    Ok(ToolCall::new("invoices.info", json!({ "id": id })))
}

fn line_item(item: &Args) -> Result<Value, ArgError> {
    let mut line = Map::new();
    line.insert("quantity".to_string(), required_number(item, "quantity")?.into());
    line.insert("description".to_string(), required_str(item, "description")?.into());
    line.insert(
        "unit_price".to_string(),
        json!({
            "amount": required_number(item, "unit_price_amount")?,
            "currency": required_str(item, "unit_price_currency")?,
        }),
    );
    line.insert("tax_rate_id".to_string(), required_str(item, "tax_rate_id")?.into());
    set_opt(&mut line, "product_id", optional_str(item, "product_id")?);
    Ok(Value::Object(line))
}

fn create(args: &Args) -> Result<ToolCall, ArgError> {
    let customer_type = required_choice(args, "customer_type", CUSTOMER_TYPES)?;
    let customer_id = required_str(args, "customer_id")?;
    let department_id = required_str(args, "department_id")?;

    let mut payment_term = Map::new();
    payment_term.insert("type".to_string(), required_str(args, "payment_term_type")?.into());
    set_opt(
        &mut payment_term,
        "days",
        optional_number(args, "payment_term_days")?,
    );

    let line_items = required_object_array(args, "line_items")?
        .iter()
        .map(line_item)
        .collect::<Result<Vec<_>, _>>()?;

    let mut body = Map::new();
    body.insert(
        "invoicee".to_string(),
        json!({ "customer": id_ref(customer_type, customer_id) }),
    );
    body.insert("department_id".to_string(), department_id.into());
    body.insert("payment_term".to_string(), Value::Object(payment_term));
    body.insert(
        "grouped_lines".to_string(),
        json!([{ "line_items": line_items }]),
    );
    set_opt(&mut body, "invoice_date", optional_str(args, "invoice_date")?);
    set_opt(&mut body, "note", optional_str(args, "note")?);

    Ok(ToolCall::new("invoices.draft", body))
}
