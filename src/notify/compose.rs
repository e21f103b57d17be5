//! Render a submission into the operator email (subject, text, HTML).

use super::EmailMessage;
use crate::submission::SubmissionRecord;

/// Placeholder for fields the shopper did not supply.
const MISSING: &str = "-";

/// Build the operator email for a recorded submission.
pub fn compose(record: &SubmissionRecord, to: &str) -> EmailMessage {
    let label = record.request_type().label();
    let subject = format!(
        "{label}: {}",
        record.product_title().unwrap_or(record.product_id())
    );

    let fields = fields(record);

    let mut text_body = format!("New {label} from: {}\n", record.email());
    for (name, value) in fields.iter().skip(1) {
        text_body.push_str(&format!("{name}: {value}\n"));
    }
    text_body.push_str(&format!("Time: {}", record.received_at().to_rfc3339()));

    let mut html_body = format!("<h3>New {label}</h3>\n<ul>\n");
    for (name, value) in &fields {
        html_body.push_str(&format!(
            "  <li><b>{name}:</b> {}</li>\n",
            escape_html(value)
        ));
    }
    html_body.push_str(&format!(
        "  <li><b>Time:</b> {}</li>\n</ul>\n",
        record.received_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    EmailMessage {
        to: to.to_string(),
        subject,
        text_body,
        html_body,
    }
}

/// Labelled values in display order. Email comes first.
fn fields(record: &SubmissionRecord) -> [(&'static str, &str); 7] {
    let message = match record.message() {
        "" => MISSING,
        m => m,
    };
    [
        ("Email", record.email()),
        ("Product", record.product_title().unwrap_or(MISSING)),
        ("Variant ID", record.variant_id().unwrap_or(MISSING)),
        ("Product ID", record.product_id()),
        ("Handle", record.product_handle().unwrap_or(MISSING)),
        ("Store", record.store_domain().unwrap_or(MISSING)),
        ("Message", message),
    ]
}

/// Escape text for inclusion in an HTML body.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::{RequestType, SubmissionPayload};

    fn record(payload: SubmissionPayload) -> SubmissionRecord {
        payload.validate(RequestType::BackInStock).unwrap()
    }

    fn minimal() -> SubmissionPayload {
        SubmissionPayload {
            email: Some("a@x.com".into()),
            product_id: Some("123".into()),
            ..Default::default()
        }
    }

    #[test]
    fn back_in_stock_subject() {
        let email = compose(
            &record(SubmissionPayload {
                product_title: Some("Widget".into()),
                ..minimal()
            }),
            "ops@example.com",
        );
        assert_eq!(email.subject, "Back-in-stock request: Widget");
        assert_eq!(email.to, "ops@example.com");
    }

    #[test]
    fn available_on_request_subject() {
        let email = compose(
            &record(SubmissionPayload {
                product_title: Some("Widget".into()),
                request_type: Some("available_on_request".into()),
                ..minimal()
            }),
            "ops@example.com",
        );
        assert!(email.subject.contains("Available on Request"));
        assert!(email.text_body.starts_with("New Available on Request from: a@x.com"));
    }

    #[test]
    fn subject_falls_back_to_product_id() {
        let email = compose(&record(minimal()), "ops@example.com");
        assert_eq!(email.subject, "Back-in-stock request: 123");
    }

    #[test]
    fn missing_optionals_render_as_dash() {
        let email = compose(&record(minimal()), "ops@example.com");
        for line in [
            "Product: -",
            "Variant ID: -",
            "Handle: -",
            "Store: -",
            "Message: -",
        ] {
            assert!(email.text_body.contains(line), "text body missing {line:?}");
        }
        assert!(email.html_body.contains("<li><b>Store:</b> -</li>"));
        assert!(!email.text_body.contains("null"));
        assert!(!email.text_body.contains("None"));
    }

    #[test]
    fn present_fields_are_rendered() {
        let email = compose(
            &record(SubmissionPayload {
                product_title: Some("Widget".into()),
                product_handle: Some("widget".into()),
                variant_id: Some("v-9".into()),
                store_domain: Some("shop.example.com".into()),
                message: Some("Size M please".into()),
                ..minimal()
            }),
            "ops@example.com",
        );
        assert!(email.text_body.contains("Product ID: 123"));
        assert!(email.text_body.contains("Variant ID: v-9"));
        assert!(email.text_body.contains("Handle: widget"));
        assert!(email.text_body.contains("Store: shop.example.com"));
        assert!(email.text_body.contains("Message: Size M please"));
        assert!(email.html_body.contains("<li><b>Email:</b> a@x.com</li>"));
    }

    #[test]
    fn html_values_are_escaped() {
        let email = compose(
            &record(SubmissionPayload {
                message: Some("<script>alert('x')</script>".into()),
                ..minimal()
            }),
            "ops@example.com",
        );
        assert!(!email.html_body.contains("<script>"));
        assert!(email.html_body.contains("&lt;script&gt;"));
        // plain text keeps the raw message
        assert!(email.text_body.contains("<script>"));
    }

    #[test]
    fn escape_html_passthrough() {
        assert_eq!(escape_html("plain text"), "plain text");
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }
}
