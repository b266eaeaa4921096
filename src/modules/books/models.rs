use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Earliest accepted publication year.
pub const MIN_PUBLICATION_YEAR: i32 = 1900;

/// A catalog book as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Book {
    /// Identifier assigned on creation
    pub id: i64,
    pub isbn: String,
    /// Title of the book
    pub titulo: String,
    /// Author of the book
    pub autor: String,
    /// Year of publication
    pub ano_publicacao: i32,
}

/// Request model for creating a new book. Every field is required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub isbn: String,
    /// At least 3 characters
    #[validate(length(min = 3, message = "titulo deve ter pelo menos 3 caracteres"))]
    pub titulo: String,
    /// Must not be empty
    #[validate(length(min = 1, message = "autor não pode ser vazio"))]
    pub autor: String,
    /// Between 1900 and the current year
    #[validate(custom(function = "validate_publication_year"))]
    pub ano_publicacao: i32,
}

impl CreateBook {
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            isbn: self.isbn,
            titulo: self.titulo,
            autor: self.autor,
            ano_publicacao: self.ano_publicacao,
        }
    }
}

/// Request model for a partial update.
///
/// A field left out of the payload is `None` and stays untouched in storage.
/// An explicit `null` is a deserialization error, not an omission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, message = "titulo deve ter pelo menos 3 caracteres"))]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "autor não pode ser vazio"))]
    pub autor: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_publication_year"))]
    pub ano_publicacao: Option<i32>,
}

impl UpdateBook {
    /// True when the payload names no field at all.
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none()
            && self.titulo.is_none()
            && self.autor.is_none()
            && self.ano_publicacao.is_none()
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The upper bound for `ano_publicacao`, read at validation time.
pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

fn validate_publication_year(year: i32) -> Result<(), ValidationError> {
    let current_year = current_year();
    if (MIN_PUBLICATION_YEAR..=current_year).contains(&year) {
        return Ok(());
    }
    let mut err = ValidationError::new("range");
    err.message = Some(Cow::Owned(format!(
        "ano_publicacao deve estar entre {MIN_PUBLICATION_YEAR} e {current_year}"
    )));
    Err(err)
}
