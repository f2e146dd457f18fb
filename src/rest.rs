//! REST layer: thin axum handlers over the domain services.
//!
//! Handlers map request DTOs to domain commands, call a service, and map the
//! outcome to a status code. No business logic lives here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::commands::expenses::{CreateExpenseCommand, UpdateExpenseCommand};
use crate::domain::commands::persons::CreatePersonCommand;
use crate::domain::models::expense::SplitType;
use crate::domain::{
    ExpenseError, ExpenseService, PersonService, RecurringExpenseService, SettlementService,
};
use crate::storage::CsvConnection;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub person_service: PersonService<CsvConnection>,
    pub expense_service: ExpenseService<CsvConnection>,
    pub settlement_service: SettlementService<CsvConnection>,
    pub recurring_service: RecurringExpenseService<CsvConnection>,
}

impl AppState {
    pub fn new(connection: Arc<CsvConnection>, clock: Arc<dyn crate::domain::Clock>) -> Self {
        Self {
            person_service: PersonService::new(connection.clone()),
            expense_service: ExpenseService::new(connection.clone()),
            settlement_service: SettlementService::new(connection.clone()),
            recurring_service: RecurringExpenseService::new(connection, clock),
        }
    }
}

/// Build the API router.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/persons", get(list_persons).post(create_person))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
        .route("/expenses/stats", get(expense_stats))
        .route("/settlement", get(get_settlement))
        .route("/recurring/process", post(process_recurring))
        .with_state(state)
}

#[derive(Deserialize, Debug)]
pub struct CreatePersonRequest {
    pub name: String,
    pub is_parent: bool,
    pub income: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct ExpenseRequest {
    pub amount: f64,
    pub description: String,
    pub payer_id: String,
    pub category: String,
    pub split_type: String,
    #[serde(default)]
    pub assigned_person_ids: Vec<String>,
}

async fn list_persons(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/persons");

    match state.person_service.list_persons() {
        Ok(persons) => (StatusCode::OK, Json(persons)).into_response(),
        Err(e) => {
            error!("Error listing persons: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing persons").into_response()
        }
    }
}

async fn create_person(
    State(state): State<AppState>,
    Json(request): Json<CreatePersonRequest>,
) -> impl IntoResponse {
    info!("POST /api/persons - name: {}", request.name);

    let command = CreatePersonCommand {
        name: request.name,
        is_parent: request.is_parent,
        income: request.income,
    };

    match state.person_service.create_person(command) {
        Ok(person) => (StatusCode::CREATED, Json(person)).into_response(),
        Err(e) => {
            error!("Error creating person: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

async fn list_expenses(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/expenses");

    match state.expense_service.list_expenses() {
        Ok(expenses) => (StatusCode::OK, Json(expenses)).into_response(),
        Err(e) => {
            error!("Error listing expenses: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing expenses").into_response()
        }
    }
}

async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<ExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/expenses - request: {:?}", request);

    let split_type = match SplitType::parse(&request.split_type) {
        Ok(split_type) => split_type,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };

    let command = CreateExpenseCommand {
        amount: request.amount,
        description: request.description,
        payer_id: request.payer_id,
        category: request.category,
        split_type,
        assigned_person_ids: request.assigned_person_ids,
        date: None,
    };

    match state.expense_service.create_expense(command) {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => expense_error_response(e),
    }
}

async fn update_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
    Json(request): Json<ExpenseRequest>,
) -> impl IntoResponse {
    info!("PUT /api/expenses/{} - request: {:?}", expense_id, request);

    let split_type = match SplitType::parse(&request.split_type) {
        Ok(split_type) => split_type,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };

    let command = UpdateExpenseCommand {
        expense_id,
        amount: request.amount,
        description: request.description,
        payer_id: request.payer_id,
        category: request.category,
        split_type,
        assigned_person_ids: request.assigned_person_ids,
    };

    match state.expense_service.update_expense(command) {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => expense_error_response(e),
    }
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses/{}", expense_id);

    match state.expense_service.delete_expense(&expense_id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Expense not found").into_response(),
        Err(e) => {
            error!("Error deleting expense: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error deleting expense").into_response()
        }
    }
}

async fn expense_stats(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/expenses/stats");

    match state.expense_service.stats() {
        Ok(stats) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "total": stats.total,
                "this_month": stats.this_month,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Error computing stats: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error computing stats").into_response()
        }
    }
}

async fn get_settlement(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/settlement");

    match state.settlement_service.calculate_settlement() {
        Ok(instructions) => (StatusCode::OK, Json(instructions)).into_response(),
        Err(e) => {
            error!("Error calculating settlement: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error calculating settlement").into_response()
        }
    }
}

async fn process_recurring(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/recurring/process");

    match state.recurring_service.process_recurring_expenses() {
        Ok(result) => (StatusCode::OK, Json(result.created)).into_response(),
        Err(e) => {
            error!("Error processing recurring expenses: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing recurring expenses",
            )
                .into_response()
        }
    }
}

/// Map expense service failures to status codes: validation and lookup
/// problems are client errors, everything else is a 500.
fn expense_error_response(e: anyhow::Error) -> axum::response::Response {
    match e.downcast_ref::<ExpenseError>() {
        Some(ExpenseError::NotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
        Some(_) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        None => {
            error!("Expense operation failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Expense operation failed").into_response()
        }
    }
}
