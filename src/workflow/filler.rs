//! Form filling for one user record.

use std::sync::Arc;

use tracing::{info, warn};

use crate::browser::{BrowserDriver, BrowserError};
use crate::form::UserRecord;

use super::errors::SubmissionError;
use super::selectors;

const FIELD_CARD_NUMBER: &str = "library card number";
const FIELD_EMAIL: &str = "email address";
const FIELD_RESOURCE_TYPE: &str = "resource type";

/// Populates the three form fields from a user record.
pub struct FormFiller {
    driver: Arc<dyn BrowserDriver>,
}

impl FormFiller {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }

    /// Fill the form in fixed order: card number, email, resource type.
    ///
    /// A missing field is fatal to the whole fill step; partially filled
    /// state is not rolled back since the session is torn down by the
    /// caller on failure anyway. Ends with one best-effort screenshot of
    /// the filled form.
    pub async fn fill_form(&self, record: &UserRecord) -> Result<(), SubmissionError> {
        self.driver
            .type_text(&selectors::card_number_input(), &record.library_card_number)
            .await
            .map_err(|e| field_error(e, FIELD_CARD_NUMBER))?;
        info!("Entered library card number");

        self.driver
            .type_text(&selectors::email_input(), &record.email)
            .await
            .map_err(|e| field_error(e, FIELD_EMAIL))?;
        info!("Entered email address");

        self.driver
            .click(&selectors::resource_selector(record.resource_type))
            .await
            .map_err(|e| field_error(e, FIELD_RESOURCE_TYPE))?;
        info!("Selected e-resource type: {}", record.resource_type);

        let _ = self.driver.screenshot("filled").await;
        Ok(())
    }
}

fn field_error(e: BrowserError, field: &'static str) -> SubmissionError {
    match e {
        BrowserError::ElementNotFound(locator) => {
            warn!("The element cannot be found by given locator: {}", locator);
            SubmissionError::FieldNotFound(field)
        }
        other => SubmissionError::Session(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeCall, FakeDriver};
    use crate::form::ResourceType;

    fn record() -> UserRecord {
        UserRecord {
            name: "Anna".into(),
            library_card_number: "213721".into(),
            email: "example@gmail.com".into(),
            resource_type: ResourceType::EmpikGo,
        }
    }

    fn driver_with_all_fields(record: &UserRecord) -> Arc<FakeDriver> {
        Arc::new(
            FakeDriver::new()
                .with_element(&selectors::card_number_input())
                .with_element(&selectors::email_input())
                .with_element(&selectors::resource_selector(record.resource_type)),
        )
    }

    #[tokio::test]
    async fn test_fills_fields_in_order_with_one_screenshot() {
        let record = record();
        let driver = driver_with_all_fields(&record);
        let filler = FormFiller::new(driver.clone());

        filler.fill_form(&record).await.unwrap();

        let expected = vec![
            FakeCall::Type(
                selectors::card_number_input().to_string(),
                "213721".into(),
            ),
            FakeCall::Type(selectors::email_input().to_string(), "example@gmail.com".into()),
            FakeCall::Click(selectors::resource_selector(ResourceType::EmpikGo).to_string()),
            FakeCall::Screenshot("filled".into()),
        ];
        assert_eq!(driver.calls(), expected);
        assert_eq!(driver.screenshot_attempts(), 1);
    }

    #[tokio::test]
    async fn test_missing_email_field_is_fatal_without_rollback() {
        let record = record();
        let driver = Arc::new(FakeDriver::new().with_element(&selectors::card_number_input()));
        let filler = FormFiller::new(driver.clone());

        let err = filler.fill_form(&record).await.unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::FieldNotFound("email address")
        ));
        // The card number was already typed and stays typed.
        assert_eq!(driver.lookup_count(&selectors::card_number_input()), 1);
        // No screenshot is attempted for a partially filled form.
        assert_eq!(driver.screenshot_attempts(), 0);
    }

    #[tokio::test]
    async fn test_missing_resource_selector_names_the_field() {
        let record = record();
        let driver = Arc::new(
            FakeDriver::new()
                .with_element(&selectors::card_number_input())
                .with_element(&selectors::email_input()),
        );
        let filler = FormFiller::new(driver);

        let err = filler.fill_form(&record).await.unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::FieldNotFound("resource type")
        ));
    }
}
