//! Transactional access to the `livros` table.
//!
//! Every operation runs inside its own transaction: commit on success, and
//! `sqlx::Transaction` rolls back on drop for every early return.

use sqlx::error::ErrorKind;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use super::models::{Book, CreateBook, UpdateBook};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Livro com ID {0} não encontrado")]
    NotFound(i64),

    /// Uniqueness or check constraint rejected the write; carries the engine message.
    #[error("{0}")]
    ConstraintViolation(String),

    #[error("Nenhum campo fornecido para atualização")]
    NoFieldsProvided,

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &error {
            if matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::CheckViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::ForeignKeyViolation
            ) {
                return RepositoryError::ConstraintViolation(db.message().to_string());
            }
        }
        RepositoryError::Database(error)
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Columns a partial update may touch. `id` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookColumn {
    Isbn,
    Title,
    Author,
    PublicationYear,
}

impl BookColumn {
    pub const fn as_str(self) -> &'static str {
        match self {
            BookColumn::Isbn => "isbn",
            BookColumn::Title => "titulo",
            BookColumn::Author => "autor",
            BookColumn::PublicationYear => "ano_publicacao",
        }
    }
}

enum ColumnValue<'a> {
    Text(&'a str),
    Integer(i32),
}

#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All books, ascending by id.
    pub async fn list_all(&self) -> Result<Vec<Book>> {
        let mut tx = self.pool.begin().await?;
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, isbn, titulo, autor, ano_publicacao FROM livros ORDER BY id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(books)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Book> {
        let mut tx = self.pool.begin().await?;
        let book = find(&mut tx, id).await?.ok_or(RepositoryError::NotFound(id))?;
        tx.commit().await?;
        Ok(book)
    }

    /// Insert a new row and return the id the store assigned to it.
    pub async fn insert(&self, book: &CreateBook) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO livros (isbn, titulo, autor, ano_publicacao)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.titulo)
        .bind(&book.autor)
        .bind(book.ano_publicacao)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let id = result.last_insert_rowid();
        tracing::info!(book_id = id, "book inserted");
        Ok(id)
    }

    /// Overwrite exactly the columns present in `changes` and return the merged row.
    pub async fn update_fields(&self, id: i64, changes: &UpdateBook) -> Result<Book> {
        let assignments = assignments(changes);
        if assignments.is_empty() {
            return Err(RepositoryError::NoFieldsProvided);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE livros SET ");
        let mut set = builder.separated(", ");
        for (column, value) in &assignments {
            set.push(format!("{} = ", column.as_str()));
            match value {
                ColumnValue::Text(text) => set.push_bind_unseparated(*text),
                ColumnValue::Integer(number) => set.push_bind_unseparated(*number),
            };
        }
        builder.push(" WHERE id = ").push_bind(id);

        let mut tx = self.pool.begin().await?;
        let result = builder.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        let book = find(&mut tx, id).await?.ok_or(RepositoryError::NotFound(id))?;
        tx.commit().await?;

        let columns: Vec<&str> = assignments.iter().map(|(c, _)| c.as_str()).collect();
        tracing::info!(book_id = id, ?columns, "book updated");
        Ok(book)
    }

    /// Delete the row and report how many rows went away (0 or 1).
    pub async fn delete_by_id(&self, id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM livros WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            tracing::info!(book_id = id, "book deleted");
        }
        Ok(deleted)
    }
}

async fn find(tx: &mut sqlx::Transaction<'_, Sqlite>, id: i64) -> Result<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(
        "SELECT id, isbn, titulo, autor, ano_publicacao FROM livros WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(book)
}

fn assignments(changes: &UpdateBook) -> Vec<(BookColumn, ColumnValue<'_>)> {
    let mut assignments = Vec::with_capacity(4);
    if let Some(isbn) = &changes.isbn {
        assignments.push((BookColumn::Isbn, ColumnValue::Text(isbn)));
    }
    if let Some(title) = &changes.titulo {
        assignments.push((BookColumn::Title, ColumnValue::Text(title)));
    }
    if let Some(author) = &changes.autor {
        assignments.push((BookColumn::Author, ColumnValue::Text(author)));
    }
    if let Some(year) = changes.ano_publicacao {
        assignments.push((BookColumn::PublicationYear, ColumnValue::Integer(year)));
    }
    assignments
}
