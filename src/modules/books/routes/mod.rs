//! HTTP handlers for `/livros`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalogo_http::extract::{Path, ValidatedJson};
use catalogo_http::AppError;
use utoipa::OpenApi;

use super::models::{Book, CreateBook, UpdateBook};
use super::repository::{BookRepository, RepositoryError};

/// OpenAPI document for the book endpoints
#[derive(OpenApi)]
#[openapi(
    paths(list_books, get_book, create_book, update_book, delete_book),
    components(schemas(Book, CreateBook, UpdateBook)),
    tags((name = "Livros", description = "Catálogo de livros"))
)]
pub struct BooksApi;

/// Routes for the book catalog, bound to `repository`
pub fn router(repository: BookRepository) -> Router {
    Router::new()
        .route("/livros", get(list_books).post(create_book))
        .route(
            "/livros/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(repository)
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(_) => AppError::not_found(error.to_string()),
            RepositoryError::NoFieldsProvided | RepositoryError::ConstraintViolation(_) => {
                AppError::bad_request(error.to_string())
            }
            RepositoryError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

/// Prefix the engine's constraint message with what was being attempted.
fn constraint_context(action: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |error| match error {
        RepositoryError::ConstraintViolation(detail) => {
            AppError::bad_request(format!("Erro ao {action} livro: {detail}"))
        }
        other => other.into(),
    }
}

#[utoipa::path(
    get,
    path = "/livros",
    tag = "Livros",
    responses((status = 200, description = "Todos os livros, por id crescente", body = [Book]))
)]
pub async fn list_books(State(repo): State<BookRepository>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(repo.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/livros/{id}",
    tag = "Livros",
    params(("id" = i64, Path, description = "ID do livro")),
    responses(
        (status = 200, description = "Livro encontrado", body = Book),
        (status = 404, description = "Livro não encontrado")
    )
)]
pub async fn get_book(
    State(repo): State<BookRepository>,
    Path(id): Path<i64>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(repo.get_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/livros",
    tag = "Livros",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Livro criado", body = Book),
        (status = 400, description = "Violação de restrição, p.ex. ISBN duplicado"),
        (status = 422, description = "Dados inválidos")
    )
)]
pub async fn create_book(
    State(repo): State<BookRepository>,
    ValidatedJson(input): ValidatedJson<CreateBook>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let id = repo
        .insert(&input)
        .await
        .map_err(constraint_context("criar"))?;
    Ok((StatusCode::CREATED, Json(input.into_book(id))))
}

/// Partial update: only the fields present in the body are written.
#[utoipa::path(
    put,
    path = "/livros/{id}",
    tag = "Livros",
    params(("id" = i64, Path, description = "ID do livro")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Livro atualizado", body = Book),
        (status = 400, description = "Nenhum campo fornecido ou violação de restrição"),
        (status = 404, description = "Livro não encontrado"),
        (status = 422, description = "Dados inválidos")
    )
)]
pub async fn update_book(
    State(repo): State<BookRepository>,
    Path(id): Path<i64>,
    ValidatedJson(changes): ValidatedJson<UpdateBook>,
) -> Result<Json<Book>, AppError> {
    if changes.is_empty() {
        return Err(RepositoryError::NoFieldsProvided.into());
    }

    let book = repo
        .update_fields(id, &changes)
        .await
        .map_err(constraint_context("atualizar"))?;
    Ok(Json(book))
}

#[utoipa::path(
    delete,
    path = "/livros/{id}",
    tag = "Livros",
    params(("id" = i64, Path, description = "ID do livro")),
    responses(
        (status = 204, description = "Livro removido"),
        (status = 404, description = "Livro não encontrado")
    )
)]
pub async fn delete_book(
    State(repo): State<BookRepository>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    match repo.delete_by_id(id).await? {
        0 => Err(RepositoryError::NotFound(id).into()),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
