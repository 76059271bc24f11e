//! Batch generation of emails and notifications
//!
//! Processes customer records strictly sequentially. Rows are isolated: a
//! failed live call substitutes mock content for that row and the batch keeps
//! going. The batch itself never fails.

use crate::ai::{ApiError, CompletionApi, mock_email, mock_notification, parse_subject_body, prompts};
use crate::customers::CustomerRecord;
use crate::retry::{RetryConfig, RetryError, with_retry};

/// One generated result per customer record.
#[derive(Debug, Clone)]
pub struct GeneratedEmail {
    pub customer_name: String,
    pub city: String,
    pub subject: String,
    pub body: String,
    pub notification: String,
    /// True when the email step used mock content instead of a live result
    pub used_fallback: bool,
}

/// Drives per-row generation against an optional live API.
///
/// `api = None` is mock mode: every row gets deterministic template content.
pub struct Generator<C> {
    api: Option<C>,
    retry: RetryConfig,
}

impl<C: CompletionApi> Generator<C> {
    pub fn new(api: Option<C>, retry: RetryConfig) -> Self {
        Self { api, retry }
    }

    /// Whether a live API client is available.
    pub fn is_live(&self) -> bool {
        self.api.is_some()
    }

    async fn call_model(&self, api: &C, prompt: &str) -> Result<String, RetryError<ApiError>> {
        with_retry(&self.retry, ApiError::is_transient, || api.complete(prompt)).await
    }

    /// Generate an email and a notification for every customer record.
    ///
    /// Always returns exactly one result per record, in input order.
    pub async fn generate_emails(&self, customers: &[CustomerRecord]) -> Vec<GeneratedEmail> {
        let mut results = Vec::with_capacity(customers.len());

        for customer in customers {
            // Email
            let (parsed, used_fallback) = match &self.api {
                Some(api) => match self.call_model(api, &prompts::email_prompt(customer)).await {
                    Ok(raw) => (parse_subject_body(&raw), false),
                    Err(e) => {
                        tracing::warn!("Email generation failed for {}: {}", customer.name, e);
                        (mock_email(customer), true)
                    }
                },
                None => (mock_email(customer), true),
            };

            // Notification, using the subject/body just produced. Falls back
            // independently of whether the email step did.
            let notification = match &self.api {
                Some(api) => {
                    let prompt =
                        prompts::notification_prompt(customer, &parsed.subject, &parsed.body);
                    match self.call_model(api, &prompt).await {
                        Ok(raw) => raw.trim().to_string(),
                        Err(e) => {
                            tracing::warn!(
                                "Notification generation failed for {}: {}",
                                customer.name,
                                e
                            );
                            mock_notification(customer)
                        }
                    }
                }
                None => mock_notification(customer),
            };

            results.push(GeneratedEmail {
                customer_name: customer.name.clone(),
                city: customer.city.clone(),
                subject: parsed.subject,
                body: parsed.body,
                notification,
                used_fallback,
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::OpenAiClient;
    use crate::customers::test_record;
    use reqwest::StatusCode;
    use std::cell::RefCell;

    /// Scripted fake: pops one canned outcome per call, in order.
    struct FakeApi {
        script: RefCell<Vec<Result<String, ApiError>>>,
    }

    impl FakeApi {
        fn new(script: Vec<Result<String, ApiError>>) -> Self {
            Self {
                script: RefCell::new(script),
            }
        }

        fn ok(text: &str) -> Result<String, ApiError> {
            Ok(text.to_string())
        }

        fn bad_request() -> Result<String, ApiError> {
            Err(ApiError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "invalid request".to_string(),
            })
        }

        fn rate_limited() -> Result<String, ApiError> {
            Err(ApiError::RateLimited {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: "rate limit reached".to_string(),
            })
        }
    }

    impl CompletionApi for FakeApi {
        fn complete(&self, _prompt: &str) -> impl Future<Output = Result<String, ApiError>> {
            let next = {
                let mut script = self.script.borrow_mut();
                if script.is_empty() {
                    FakeApi::ok("{\"subject\":\"extra\",\"body\":\"extra\"}")
                } else {
                    script.remove(0)
                }
            };
            async move { next }
        }
    }

    fn customers() -> Vec<CustomerRecord> {
        vec![
            test_record("Ana", "Lima", "Shoes, Hat"),
            test_record("Ben", "Leeds", "Socks"),
            test_record("Cleo", "Oslo", ""),
        ]
    }

    #[tokio::test]
    async fn test_mock_mode_generates_one_result_per_record() {
        let generator: Generator<OpenAiClient> = Generator::new(None, RetryConfig::default());
        let customers = customers();

        let results = generator.generate_emails(&customers).await;

        assert_eq!(results.len(), customers.len());
        for (record, result) in customers.iter().zip(&results) {
            assert_eq!(result.customer_name, record.name);
            assert_eq!(result.city, record.city);
            assert!(result.used_fallback);
            assert!(result.subject.contains(&record.name));
            assert!(result.body.ends_with("Check it out."));
            assert_eq!(
                result.notification,
                format!("{}, check out your personalized offers today!", record.name)
            );
        }
    }

    #[tokio::test]
    async fn test_live_results_are_parsed() {
        let api = FakeApi::new(vec![
            FakeApi::ok(r#"{"subject":"Hi Ana","body":"New shoes. Check it out."}"#),
            FakeApi::ok("Ana, your shoes are waiting for you in Lima today!"),
        ]);
        let generator = Generator::new(Some(api), RetryConfig::default());
        let customers = vec![test_record("Ana", "Lima", "Shoes")];

        let results = generator.generate_emails(&customers).await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].used_fallback);
        assert_eq!(results[0].subject, "Hi Ana");
        assert_eq!(results[0].body, "New shoes. Check it out.");
        assert_eq!(
            results[0].notification,
            "Ana, your shoes are waiting for you in Lima today!"
        );
    }

    #[tokio::test]
    async fn test_failed_row_is_isolated() {
        // Row 1: both calls fail fatally. Rows 2 and 3: live success.
        let api = FakeApi::new(vec![
            FakeApi::bad_request(),
            FakeApi::bad_request(),
            FakeApi::ok(r#"{"subject":"Hi Ben","body":"Socks. Explore more"}"#),
            FakeApi::ok("Ben, fresh socks for you."),
            FakeApi::ok(r#"{"subject":"Hi Cleo","body":"News. Explore more"}"#),
            FakeApi::ok("Cleo, something new in Oslo."),
        ]);
        let generator = Generator::new(Some(api), RetryConfig::default());
        let customers = customers();

        let results = generator.generate_emails(&customers).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].used_fallback);
        assert!(results[0].subject.contains("Ana"));
        assert!(results[0].subject.contains("Shoes"));
        assert_eq!(
            results[0].notification,
            "Ana, check out your personalized offers today!"
        );

        assert!(!results[1].used_fallback);
        assert_eq!(results[1].subject, "Hi Ben");
        assert!(!results[2].used_fallback);
        assert_eq!(results[2].subject, "Hi Cleo");
    }

    #[tokio::test]
    async fn test_notification_fallback_is_independent() {
        // Email succeeds, notification fails: used_fallback stays false.
        let api = FakeApi::new(vec![
            FakeApi::ok(r#"{"subject":"Hi Ana","body":"Shoes. Check it out."}"#),
            FakeApi::bad_request(),
        ]);
        let generator = Generator::new(Some(api), RetryConfig::default());
        let customers = vec![test_record("Ana", "Lima", "Shoes")];

        let results = generator.generate_emails(&customers).await;

        assert!(!results[0].used_fallback);
        assert_eq!(results[0].subject, "Hi Ana");
        assert_eq!(
            results[0].notification,
            "Ana, check out your personalized offers today!"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limits_retry_before_succeeding() {
        let api = FakeApi::new(vec![
            FakeApi::rate_limited(),
            FakeApi::rate_limited(),
            FakeApi::ok(r#"{"subject":"Hi Ana","body":"Shoes. Check it out."}"#),
            FakeApi::ok("Ana, your offer is ready."),
        ]);
        let generator = Generator::new(Some(api), RetryConfig::default());
        let customers = vec![test_record("Ana", "Lima", "Shoes")];

        let results = generator.generate_emails(&customers).await;

        assert!(!results[0].used_fallback);
        assert_eq!(results[0].subject, "Hi Ana");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_rate_limits_fall_back() {
        // 4 transient failures exhaust the email call; notification succeeds.
        let api = FakeApi::new(vec![
            FakeApi::rate_limited(),
            FakeApi::rate_limited(),
            FakeApi::rate_limited(),
            FakeApi::rate_limited(),
            FakeApi::ok("Ana, your offer is ready."),
        ]);
        let generator = Generator::new(Some(api), RetryConfig::default());
        let customers = vec![test_record("Ana", "Lima", "Shoes, Hat")];

        let results = generator.generate_emails(&customers).await;

        assert!(results[0].used_fallback);
        assert!(results[0].subject.contains("Shoes"));
        assert_eq!(results[0].notification, "Ana, your offer is ready.");
    }

    #[tokio::test]
    async fn test_empty_completion_falls_back() {
        let api = FakeApi::new(vec![
            Err(ApiError::EmptyResponse),
            FakeApi::ok("Ana, your offer is ready."),
        ]);
        let generator = Generator::new(Some(api), RetryConfig::default());
        let customers = vec![test_record("Ana", "Lima", "Shoes")];

        let results = generator.generate_emails(&customers).await;

        assert!(results[0].used_fallback);
        assert!(results[0].body.ends_with("Check it out."));
    }
}
