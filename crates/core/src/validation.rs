//! Field-level validation for the catalog's forms.
//!
//! Each entity has a pure `parse` function that turns raw form strings into a
//! validated value or a [`FieldErrors`] map keyed by form field name. Rules
//! that need storage (does the store exist, is the username taken) are applied
//! by the web services on top of these and reported through the same map.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

use crate::types::{ItemCategory, Price, PriceError, StoreId, Username, UsernameError};

/// Message for a missing required value.
pub const REQUIRED: &str = "This field is required.";

/// Message for a select value that is not one of the offered options.
pub const INVALID_CHOICE: &str = "Not a valid choice.";

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

const MAX_TITLE_LENGTH: usize = 80;
const MAX_ADDRESS_LENGTH: usize = 200;
const MAX_NAME_LENGTH: usize = 80;

/// Validation messages grouped by form field.
///
/// Fields iterate in name order so rendered messages are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Build an error map holding a single message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Drop every message recorded against a field.
    pub fn remove(&mut self, field: &str) {
        self.0.remove(field);
    }

    /// Messages for one field (empty when the field is valid).
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Whether a field has any messages.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Whether no field has a message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Move every message from `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Iterate over `(field, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Return `value` when no errors were recorded, `self` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field has a message.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// =============================================================================
// Stores
// =============================================================================

/// Validated title and address of a grocery store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFields {
    pub title: String,
    pub address: String,
}

impl StoreFields {
    /// Validate raw store form values.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` when `title` or `address` is blank or too long.
    pub fn parse(title: &str, address: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", title, MAX_TITLE_LENGTH);
        let address = required_text(&mut errors, "address", address, MAX_ADDRESS_LENGTH);
        errors.into_result(|| Self { title, address })
    }
}

// =============================================================================
// Items
// =============================================================================

/// Raw item form values, borrowed from the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemInput<'a> {
    pub name: &'a str,
    pub price: &'a str,
    pub category: &'a str,
    pub photo_url: &'a str,
    pub store: &'a str,
}

/// Validated grocery item values.
///
/// `store_id` is well-formed but not yet known to exist; the item service
/// checks that against storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub price: Price,
    pub category: ItemCategory,
    pub photo_url: String,
    pub store_id: StoreId,
}

impl ItemFields {
    /// Validate raw item form values.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` listing every invalid field.
    pub fn parse(input: &ItemInput<'_>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", input.name, MAX_NAME_LENGTH);

        let price = match Price::parse(input.price) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.add("price", price_message(&e));
                None
            }
        };

        let category = ItemCategory::parse_or_default(input.category).map_or_else(
            |_| {
                errors.add("category", INVALID_CHOICE);
                None
            },
            Some,
        );

        let photo_url = input.photo_url.trim();
        if let Err(message) = check_photo_url(photo_url) {
            errors.add("photo_url", message);
        }

        let store_id = if input.store.trim().is_empty() {
            errors.add("store", REQUIRED);
            None
        } else if let Ok(id) = input.store.parse::<StoreId>() {
            Some(id)
        } else {
            errors.add("store", INVALID_CHOICE);
            None
        };

        match (price, category, store_id) {
            (Some(price), Some(category), Some(store_id)) if errors.is_empty() => Ok(Self {
                name,
                price,
                category,
                photo_url: photo_url.to_owned(),
                store_id,
            }),
            _ => Err(errors),
        }
    }
}

fn price_message(error: &PriceError) -> String {
    match error {
        PriceError::Empty => REQUIRED.to_owned(),
        PriceError::NotANumber => "Not a valid price.".to_owned(),
        PriceError::Negative => "Price cannot be negative.".to_owned(),
        PriceError::TooLarge { max } => format!("Price must be less than {max}."),
    }
}

/// An absolute `http(s)` URL with a host.
fn check_photo_url(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Err(REQUIRED);
    }

    let url = Url::parse(value).map_err(|_| "Invalid URL.")?;
    let web_scheme = matches!(url.scheme(), "http" | "https");
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());

    if web_scheme && has_host {
        Ok(())
    } else {
        Err("Invalid URL.")
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// A validated username and the plaintext password that goes with it.
///
/// The password never leaves the auth service except as an argon2 hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: Username,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Validate a username and password for registration.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` for an invalid username or a short password.
    pub fn parse(username: &str, password: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = Username::parse(username)
            .map_err(|e| errors.add("username", username_message(&e)))
            .ok();

        if password.is_empty() {
            errors.add("password", REQUIRED);
        } else if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }

        match username {
            Some(username) if errors.is_empty() => Ok(Self {
                username,
                password: password.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// Signup form validation: [`Credentials::parse`] plus password confirmation.
pub struct SignupFields;

impl SignupFields {
    /// Validate the signup form.
    ///
    /// # Errors
    ///
    /// Returns every credential error plus a `password_confirm` error when the
    /// two passwords differ.
    pub fn parse(
        username: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();
        if password != password_confirm {
            errors.add("password_confirm", "Passwords must match.");
        }

        match Credentials::parse(username, password) {
            Ok(credentials) if errors.is_empty() => Ok(credentials),
            Ok(_) => Err(errors),
            Err(credential_errors) => {
                errors.merge(credential_errors);
                Err(errors)
            }
        }
    }
}

fn username_message(error: &UsernameError) -> String {
    match error {
        UsernameError::Empty => REQUIRED.to_owned(),
        UsernameError::TooShort { min } => {
            format!("Username must be at least {min} characters.")
        }
        UsernameError::TooLong { max } => format!("Username must be at most {max} characters."),
        UsernameError::ContainsWhitespace => "Username cannot contain spaces.".to_owned(),
    }
}

/// Trim a required text field, recording an error when blank or too long.
fn required_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() > max {
        errors.add(field, format!("Field cannot be longer than {max} characters."));
    }
    value.to_owned()
}
