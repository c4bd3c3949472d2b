use std::sync::Arc;

use api_core::ApiError;
use auth::Identity;
use axum::extract::{Path, Query};
use axum::{http::StatusCode, response::Json, Extension};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateItemReq, InventoryStatsDto, ItemDto, ItemListDto, ListItemsQuery, UpdateItemReq,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::query::ItemQuery;
use crate::domain::service::Service;

/// List the caller's items with optional filtering and ordering
pub async fn list_items(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Query(params): Query<ListItemsQuery>,
) -> Result<Json<ItemListDto>, ApiError> {
    let query =
        ItemQuery::from_params(params.search, params.category, params.low_stock, params.sort)
            .map_err(ApiError::validation)?;

    match svc.list_items(identity.user_id, query).await {
        Ok(items) => {
            let items: Vec<ItemDto> = items.into_iter().map(ItemDto::from).collect();
            Ok(Json(ItemListDto {
                total: items.len(),
                items,
            }))
        }
        Err(e) => {
            error!("Failed to list items: {}", e);
            Err(map_domain_error(e))
        }
    }
}

/// Fetch one item the caller owns
pub async fn get_item(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemDto>, ApiError> {
    match svc.get_item(identity.user_id, id).await {
        Ok(item) => Ok(Json(ItemDto::from(item))),
        Err(e) => {
            error!("Failed to fetch item: {}", e);
            Err(map_domain_error(e))
        }
    }
}

/// Create an item owned by the caller
pub async fn create_item(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Json(req_body): Json<CreateItemReq>,
) -> Result<(StatusCode, Json<ItemDto>), ApiError> {
    info!(name = %req_body.name, "Create item request");

    match svc.create_item(identity.user_id, req_body.into()).await {
        Ok(item) => Ok((StatusCode::CREATED, Json(ItemDto::from(item)))),
        Err(e) => {
            error!("Failed to create item: {}", e);
            Err(map_domain_error(e))
        }
    }
}

/// Apply a partial update to an item the caller owns
pub async fn update_item(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req_body): Json<UpdateItemReq>,
) -> Result<Json<ItemDto>, ApiError> {
    match svc.update_item(identity.user_id, id, req_body.into()).await {
        Ok(item) => Ok(Json(ItemDto::from(item))),
        Err(e) => {
            error!("Failed to update item: {}", e);
            Err(map_domain_error(e))
        }
    }
}

/// Delete an item the caller owns
pub async fn delete_item(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    match svc.delete_item(identity.user_id, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete item: {}", e);
            Err(map_domain_error(e))
        }
    }
}

/// Aggregate numbers over the caller's whole inventory
pub async fn stats_summary(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
) -> Result<Json<InventoryStatsDto>, ApiError> {
    match svc.stats(identity.user_id).await {
        Ok(stats) => Ok(Json(InventoryStatsDto::from(stats))),
        Err(e) => {
            error!("Failed to compute stats: {}", e);
            Err(map_domain_error(e))
        }
    }
}
