//! Prompt templates for email and notification generation
//!
//! Pure functions from a customer record to a prompt string. The output
//! format instructions are part of the contract with the parser: strict JSON
//! for emails, plain text with a word-count target for notifications.

use crate::customers::CustomerRecord;

/// Prompt for generating the email as a `{subject, body}` JSON object.
pub fn email_prompt(customer: &CustomerRecord) -> String {
    format!(
        r#"Create a short personalized email (JSON only) for the customer.

Customer name: {name}
City: {city}
Gender: {gender}
Last month purchase amount: {last_month}
Last quarter purchase amount: {last_quarter}
Last year purchase amount: {last_year}
Products previously bought: {products}

Requirements:
- Output JSON only: {{ "subject": "...", "body": "..." }}
- Subject: 6-8 words max
- Body: max 40 words; mention one product; end with "Explore more" or "Check it out"."#,
        name = customer.name,
        city = customer.city,
        gender = customer.gender,
        last_month = customer.last_month,
        last_quarter = customer.last_quarter,
        last_year = customer.last_year,
        products = customer.products,
    )
}

/// Prompt for a push/SMS notification derived from the generated email.
pub fn notification_prompt(customer: &CustomerRecord, subject: &str, body: &str) -> String {
    format!(
        r#"Write ONE short customer notification (18-22 words).

Customer: {name}
Product context: {products}
Email subject: {subject}
Email body: {body}

No JSON, only plain text."#,
        name = customer.name,
        products = customer.products,
    )
}
