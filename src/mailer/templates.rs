//! HTML bodies for the two notification emails.
//!
//! Field values are interpolated as-is. Optional fields render as "N/A".
//! Numbered field families (`ownerName_1`, `productionLine_1`, ...) are
//! walked upward from 1 until the first gap.

use chrono::{Datelike, Utc};

use super::NotifyConfig;
use crate::record::Record;

const BASE_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
.header { background-color: #FF5100; color: white; padding: 20px; text-align: center; }
.content { padding: 20px; }
.section { margin: 20px 0; padding: 15px; border-left: 4px solid #FF5100; background-color: #f8f9fa; }
.field { margin: 10px 0; }
.label { font-weight: bold; color: #333; }
.value { color: #666; }
.footer { text-align: center; padding: 20px; color: #666; font-size: 12px; }
";

const THANK_YOU_STYLE: &str =
    ".thank-you { text-align: center; font-size: 18px; color: #22c55e; margin: 20px 0; }\n";

fn field(label: &str, value: &str) -> String {
    format!(
        "    <div class=\"field\">\n      <span class=\"label\">{label}:</span>\n      <span class=\"value\">{value}</span>\n    </div>\n"
    )
}

/// The internal notification sent to the operator address.
pub(super) fn company_notification(record: &Record, notify: &NotifyConfig) -> String {
    let mut html = format!(
        "<html>\n<head>\n  <style>\n{BASE_STYLE}  </style>\n</head>\n<body>\n\
         <div class=\"header\">\n  <h1>New Factory Registration</h1>\n  <p>Submission ID: {}</p>\n</div>\n\
         <div class=\"content\">\n",
        record.get_or("submissionId", "N/A"),
    );

    html.push_str("  <div class=\"section\">\n    <h2>Factory Information</h2>\n");
    html.push_str(&field("Factory Name", record.get_or("factoryName", "N/A")));
    html.push_str(&field("Country", record.get_or("country", "N/A")));
    html.push_str(&field("City", record.get_or("city", "N/A")));
    html.push_str(&field("Address", record.get_or("detailedAddress", "N/A")));
    html.push_str(&field("Email", record.get_or("factoryEmail", "N/A")));
    html.push_str(&field("Phone", record.get_or("landlinePhone", "N/A")));
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"section\">\n    <h2>Factory Owner Information</h2>\n");
    let mut owner = 1;
    while record.contains_key(&format!("ownerName_{owner}")) {
        html.push_str(&field(
            &format!("Owner {owner}"),
            record.get_or(&format!("ownerName_{owner}"), "N/A"),
        ));
        html.push_str(&field(
            "Email",
            record.get_or(&format!("ownerEmail_{owner}"), "N/A"),
        ));
        html.push_str(&field(
            "Mobile",
            record.get_or(&format!("ownerMobile_{owner}"), "N/A"),
        ));
        owner += 1;
    }
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"section\">\n    <h2>Spare Parts Manager</h2>\n");
    html.push_str(&field("Name", record.get_or("sparePartsManagerName", "N/A")));
    html.push_str(&field(
        "Mobile",
        record.get_or("sparePartsManagerMobile", "N/A"),
    ));
    html.push_str(&field(
        "Email",
        record.get_or("sparePartsManagerEmail", "N/A"),
    ));
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"section\">\n    <h2>Industrial Activity</h2>\n");
    html.push_str(&field("Industry Field", record.get_or("industryField", "N/A")));
    let mut line = 1;
    while record.contains_key(&format!("productionLine_{line}")) {
        let value = format!(
            "{} - {} (Made in: {})",
            record.get_or(&format!("productionLine_{line}"), "N/A"),
            record.get_or(&format!("brandName_{line}"), "N/A"),
            record.get_or(&format!("madeIn_{line}"), "N/A"),
        );
        html.push_str(&field(&format!("Production Line {line}"), &value));
        line += 1;
    }
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"section\">\n    <h2>Employee Information</h2>\n");
    html.push_str(&field("Employee Name", record.get_or("employeeName", "N/A")));
    html.push_str(&field(
        "Position/Title",
        record.get_or("employeePosition", "N/A"),
    ));
    html.push_str(&field("Employee Email", record.get_or("employeeEmail", "N/A")));
    html.push_str(&field("Employee Phone", record.get_or("employeePhone", "N/A")));
    html.push_str("  </div>\n");

    html.push_str("  <div class=\"section\">\n    <h2>Submission Details</h2>\n");
    html.push_str(&field("Submission Date", record.get_or("receivedAt", "N/A")));
    html.push_str("  </div>\n</div>\n");

    html.push_str(&format!(
        "<div class=\"footer\">\n  <p>This is an automated notification from your factory registration system.</p>\n  <p>© {} {}. All rights reserved.</p>\n</div>\n</body>\n</html>\n",
        Utc::now().year(),
        notify.company_name,
    ));

    html
}

/// The confirmation sent back to the submitter.
pub(super) fn customer_confirmation(record: &Record, notify: &NotifyConfig) -> String {
    // Summary line over productionLine_1..productionLine_9, skipping gaps.
    let production_lines: Vec<String> = (1..10)
        .filter_map(|i| {
            let line = record
                .get(&format!("productionLine_{i}"))
                .filter(|v| !v.is_empty())?;
            Some(format!(
                "{} ({}, Made in: {})",
                line,
                record.get_or(&format!("brandName_{i}"), ""),
                record.get_or(&format!("madeIn_{i}"), ""),
            ))
        })
        .collect();

    let mut html = format!(
        "<html>\n<head>\n  <style>\n{BASE_STYLE}{THANK_YOU_STYLE}  </style>\n</head>\n<body>\n\
         <div class=\"header\">\n  <h1>🎉 Registration Successful!</h1>\n  <h2>Factory Registration Confirmation</h2>\n  <p><strong>Submission ID:</strong> {}</p>\n</div>\n\
         <div class=\"content\">\n",
        record.get_or("submissionId", "N/A"),
    );

    html.push_str(
        "  <div class=\"thank-you\">\n    <h2>🌟 Welcome to Our Manufacturing Network!</h2>\n    <p>Dear Valued Customer,</p>\n    <p>We have successfully received your factory registration information. Our team will review your submission and contact you As Soon As Possible.</p>\n  </div>\n",
    );

    html.push_str("  <div class=\"section\">\n    <h2>📋 Registration Summary</h2>\n");
    html.push_str(&field("Factory Name", record.get_or("factoryName", "N/A")));
    html.push_str(&field(
        "Location",
        &format!(
            "{}, {}",
            record.get_or("city", "N/A"),
            record.get_or("country", "N/A")
        ),
    ));
    html.push_str(&field("Industry", record.get_or("industryField", "N/A")));
    html.push_str(&field("Production Lines", &production_lines.join(", ")));
    html.push_str(&field("Contact Email", record.get_or("factoryEmail", "N/A")));
    html.push_str("  </div>\n");

    html.push_str(
        "  <div class=\"section\">\n    <h2>⏰ Next Steps</h2>\n    <ol>\n      <li>Our team will review your registration As Soon As Possible</li>\n      <li>We will contact you via email or phone to discuss next steps</li>\n      <li>You may be asked to provide additional documentation if needed</li>\n      <li>Upon approval, you will receive access to our platform</li>\n    </ol>\n  </div>\n",
    );

    html.push_str("  <div class=\"section\">\n    <h2>👤 Form Completed By</h2>\n");
    html.push_str(&field("Employee Name", record.get_or("employeeName", "N/A")));
    html.push_str(&field(
        "Position/Title",
        record.get_or("employeePosition", "N/A"),
    ));
    html.push_str(&field("Employee Email", record.get_or("employeeEmail", "N/A")));
    html.push_str(&field("Employee Phone", record.get_or("employeePhone", "N/A")));
    html.push_str("  </div>\n");

    html.push_str(&format!(
        "  <div class=\"section\">\n    <h2>📞 Contact Information</h2>\n    <p>If you have any questions about your registration, please contact us:</p>\n    <p><strong>Email:</strong> {}</p>\n    <p><strong>Company:</strong> {}</p>\n  </div>\n</div>\n",
        notify.company_email, notify.company_name,
    ));

    html.push_str(&format!(
        "<div class=\"footer\">\n  <p>🤝 Thank you for choosing {name}!</p>\n  <p>© {year} {name}. All rights reserved.</p>\n  <p><small>This is an automated email. Please do not reply to this email.</small></p>\n</div>\n</body>\n</html>\n",
        name = notify.company_name,
        year = Utc::now().year(),
    ));

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    use crate::record::normalize_payload;

    fn record(fields: &[(&str, &str)]) -> Record {
        let mut map = Map::new();
        for (key, value) in fields {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        normalize_payload(&map)
    }

    fn notify() -> NotifyConfig {
        NotifyConfig {
            company_name: "Acme Industrial".to_string(),
            company_email: "ops@acme.test".to_string(),
        }
    }

    #[test]
    fn test_company_email_carries_factory_fields() {
        let html = company_notification(
            &record(&[
                ("submissionId", "REG-100"),
                ("factoryName", "Globex"),
                ("country", "Egypt"),
                ("detailedAddress", "12 Nile St"),
            ]),
            &notify(),
        );
        assert!(html.contains("New Factory Registration"));
        assert!(html.contains("Submission ID: REG-100"));
        assert!(html.contains("Globex"));
        assert!(html.contains("12 Nile St"));
        assert!(html.contains("Acme Industrial. All rights reserved."));
    }

    #[test]
    fn test_missing_optional_fields_render_as_na() {
        let html = company_notification(&record(&[("factoryName", "Globex")]), &notify());
        assert!(html.contains("Submission ID: N/A"));
        assert!(html.contains("<span class=\"value\">N/A</span>"));
    }

    #[test]
    fn test_owner_listing_stops_at_first_gap() {
        let html = company_notification(
            &record(&[
                ("factoryName", "Globex"),
                ("ownerName_1", "Dana"),
                ("ownerName_2", "Sami"),
                ("ownerName_4", "Ghost"),
            ]),
            &notify(),
        );
        assert!(html.contains("Owner 1"));
        assert!(html.contains("Sami"));
        assert!(!html.contains("Ghost"));
    }

    #[test]
    fn test_production_lines_in_company_email() {
        let html = company_notification(
            &record(&[
                ("productionLine_1", "Washing machines"),
                ("brandName_1", "WashCo"),
                ("madeIn_1", "Egypt"),
            ]),
            &notify(),
        );
        assert!(html.contains("Production Line 1"));
        assert!(html.contains("Washing machines - WashCo (Made in: Egypt)"));
    }

    #[test]
    fn test_customer_email_summarizes_production_lines() {
        let html = customer_confirmation(
            &record(&[
                ("factoryName", "Globex"),
                ("city", "Cairo"),
                ("country", "Egypt"),
                ("productionLine_1", "Washers"),
                ("brandName_1", "WashCo"),
                ("madeIn_1", "Egypt"),
                ("productionLine_2", "Dryers"),
                ("brandName_2", "DryCo"),
                ("madeIn_2", "Jordan"),
            ]),
            &notify(),
        );
        assert!(html.contains("Registration Successful!"));
        assert!(html.contains("Cairo, Egypt"));
        assert!(
            html.contains("Washers (WashCo, Made in: Egypt), Dryers (DryCo, Made in: Jordan)")
        );
    }

    #[test]
    fn test_customer_email_carries_contact_details() {
        let html = customer_confirmation(&record(&[("factoryName", "Globex")]), &notify());
        assert!(html.contains("ops@acme.test"));
        assert!(html.contains("Thank you for choosing Acme Industrial!"));
        assert!(html.contains("Please do not reply to this email."));
    }
}
