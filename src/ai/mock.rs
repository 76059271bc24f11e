//! Deterministic fallback content
//!
//! Used for every record in mock mode, and per record when a live generation
//! attempt fails. Output is derived only from the record itself.

use super::parser::SubjectBody;
use crate::customers::CustomerRecord;

/// Placeholder product mention when the record lists none.
const GENERIC_PRODUCT: &str = "our selection";

/// Template email built from the customer's first listed product.
pub fn mock_email(customer: &CustomerRecord) -> SubjectBody {
    let product = customer.first_product().unwrap_or(GENERIC_PRODUCT);

    SubjectBody {
        subject: format!("{}, a pick you'll love — {}", customer.name, product),
        body: format!(
            "Hi {}, based on your recent purchases in {}, you may love our {}. Check it out.",
            customer.name, customer.city, product
        ),
    }
}

/// Template notification, independent of the generated email.
pub fn mock_notification(customer: &CustomerRecord) -> String {
    format!(
        "{}, check out your personalized offers today!",
        customer.name
    )
}
