use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct PromotionItem {
    pub promo_id: Uuid,
    pub store_name: String,
    pub barcode: String,
    pub display_name: String,
    pub discount_label: Option<String>,
    pub original_price: Option<Decimal>,
    pub promo_price: Option<Decimal>,
    pub equivalent_percentage: Option<Decimal>,
    pub is_multi_unit: bool,
    pub deal_quantity: i32,
    pub category: String,
    pub primary_macro: String,
    pub is_healthy: bool,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(super) struct PromotionQuery {
    /// Store name filter, case-insensitive.
    pub store: Option<String>,
}

pub(super) async fn list_promotions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PromotionQuery>,
) -> Result<Json<ApiResponse<Vec<PromotionItem>>>, ApiError> {
    let rows = match query.store.as_deref() {
        Some(store_name) => {
            promodb_db::get_active_promotions_by_store_name(&state.pool, store_name).await
        }
        None => promodb_db::get_active_promotions(&state.pool, None).await,
    }
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| PromotionItem {
            promo_id: row.promo_id,
            store_name: row.store_name,
            barcode: row.barcode,
            display_name: row.display_name,
            discount_label: row.discount_label,
            original_price: row.original_price,
            promo_price: row.promo_price,
            equivalent_percentage: row.equivalent_percentage,
            is_multi_unit: row.is_multi_unit,
            deal_quantity: row.deal_quantity,
            category: row.category,
            primary_macro: row.primary_macro,
            is_healthy: row.is_healthy,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
