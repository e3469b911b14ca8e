//! CSV export of an organisation's donation history.

use super::models::DonationRecord;

const HEADER: &str = "reference_number,created_at,campaign,donor,amount,comment";

/// Quote a CSV field if it contains a delimiter, quote, or newline.
/// Fields starting with a formula character get an apostrophe prefix so
/// spreadsheets treat them as text.
fn escape_field(field: &str) -> String {
    let field = if matches!(field.chars().next(), Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

/// Render donation records as a CSV document, header row included.
pub fn donations_csv(records: &[DonationRecord]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for record in records {
        let row = [
            escape_field(&record.reference_number),
            record.created_at.to_rfc3339(),
            escape_field(&record.campaign_title),
            escape_field(&record.donor_name),
            record.amount.to_string(),
            escape_field(record.comment.as_deref().unwrap_or("")),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
