//! Locators for the library site and the request form.
//!
//! The form is built with a page builder, so fields are addressed through
//! their label text and data attributes rather than stable ids.

use crate::browser::Locator;
use crate::form::ResourceType;

/// Error banner the site serves with a 200 status when it is down.
pub(crate) fn error_indicator() -> Locator {
    Locator::css(".error")
}

/// Link that only exists once the monthly form has been published.
pub(crate) fn form_landmark() -> Locator {
    Locator::link_text("E-Zasoby")
}

/// Link that opens the request form in a new window.
pub(crate) fn form_link() -> Locator {
    Locator::link_text("formularz zgłoszeniowy")
}

/// Text input under the library card number label.
pub(crate) fn card_number_input() -> Locator {
    Locator::xpath(
        r#"//div[contains(.//span, "Numer karty czytelnika WBP w Krakowie:")]//input[@type="text"]"#,
    )
}

/// Text input under the correspondence email label.
pub(crate) fn email_input() -> Locator {
    Locator::xpath(
        r#"//div[contains(.//span, "Adres poczty elektronicznej do korespondencji:")]//input[@type="text"]"#,
    )
}

/// Checkbox row for the requested e-resource platform.
pub(crate) fn resource_selector(resource: ResourceType) -> Locator {
    Locator::xpath(format!(
        r#"//div[contains(@data-value, "{}")]"#,
        resource.form_value()
    ))
}

/// Submit control (a button-role div, not a `<button>`).
pub(crate) fn submit_button() -> Locator {
    Locator::xpath(r#"//div[contains(.//span, "Prześlij") and contains(@role, "button")]"#)
}
