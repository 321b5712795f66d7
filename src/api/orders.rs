use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, ApiResponse, Object, OpenApi};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::business::{OrderOutcome, OrderService};
use crate::domain::{
    CreateOrderRequest, Order, OrderQuery, RejectRequest, SendPriceOfferRequest,
};
use crate::security::extract_caller;
use crate::store::OrderPage;

pub struct OrdersApi {
    service: Arc<OrderService>,
}

impl OrdersApi {
    pub fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ApiResponse)]
pub enum CreateOrderResponse {
    #[oai(status = 201)]
    Created(Json<OrderOutcome>),
}

#[derive(ApiResponse)]
pub enum OrderOutcomeResponse {
    #[oai(status = 200)]
    Ok(Json<OrderOutcome>),
}

#[derive(ApiResponse)]
pub enum GetOrderResponse {
    #[oai(status = 200)]
    Ok(Json<Order>),
}

#[derive(ApiResponse)]
pub enum ListUserOrdersResponse {
    #[oai(status = 200)]
    Ok(Json<Vec<Order>>),
}

#[derive(ApiResponse)]
pub enum ListOrdersResponse {
    #[oai(status = 200)]
    Ok(Json<OrderPage>),
}

#[derive(ApiResponse)]
pub enum DeleteOrderResponse {
    #[oai(status = 200)]
    Ok(Json<MessageResponse>),
}

/// Customer and admin order routes. Failures are answered with a JSON
/// `{code, message, field?}` body.
#[OpenApi]
impl OrdersApi {
    /// Submit a new order
    #[oai(path = "/orders", method = "post")]
    async fn create_order(
        &self,
        req: &Request,
        body: Json<CreateOrderRequest>,
    ) -> Result<CreateOrderResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let outcome = self.service.create_order(&caller, body.0).await?;
        Ok(CreateOrderResponse::Created(Json(outcome)))
    }

    /// Orders of the calling user, newest first
    #[oai(path = "/orders/mine", method = "get")]
    async fn list_user_orders(&self, req: &Request) -> Result<ListUserOrdersResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let orders = self.service.list_user_orders(&caller).await?;
        Ok(ListUserOrdersResponse::Ok(Json(orders)))
    }

    /// Paginated listing of all orders (admin)
    #[oai(path = "/orders", method = "get")]
    async fn list_orders(
        &self,
        req: &Request,
        page: Query<Option<u64>>,
        limit: Query<Option<u64>>,
        search: Query<Option<String>>,
    ) -> Result<ListOrdersResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let query = OrderQuery::new(page.0, limit.0, search.0);
        let page = self.service.list_orders(&caller, &query).await?;
        Ok(ListOrdersResponse::Ok(Json(page)))
    }

    #[oai(path = "/orders/:id", method = "get")]
    async fn get_order(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<GetOrderResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let order = self.service.get_order(&caller, &id.0).await?;
        Ok(GetOrderResponse::Ok(Json(order)))
    }

    /// Propose a price (admin)
    #[oai(path = "/orders/:id/price-offer", method = "post")]
    async fn send_price_offer(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<SendPriceOfferRequest>,
    ) -> Result<OrderOutcomeResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let outcome = self.service.send_price_offer(&caller, &id.0, body.0).await?;
        Ok(OrderOutcomeResponse::Ok(Json(outcome)))
    }

    /// Decline an order before an offer is accepted (admin)
    #[oai(path = "/orders/:id/reject", method = "post")]
    async fn reject_order(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<RejectRequest>,
    ) -> Result<OrderOutcomeResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let outcome = self.service.reject_order(&caller, &id.0, body.0).await?;
        Ok(OrderOutcomeResponse::Ok(Json(outcome)))
    }

    #[oai(path = "/orders/:id/accept-offer", method = "post")]
    async fn accept_price_offer(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<OrderOutcomeResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let outcome = self.service.accept_price_offer(&caller, &id.0).await?;
        Ok(OrderOutcomeResponse::Ok(Json(outcome)))
    }

    #[oai(path = "/orders/:id/reject-offer", method = "post")]
    async fn reject_price_offer(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<RejectRequest>,
    ) -> Result<OrderOutcomeResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let outcome = self
            .service
            .reject_price_offer(&caller, &id.0, body.0)
            .await?;
        Ok(OrderOutcomeResponse::Ok(Json(outcome)))
    }

    /// Record the customer's payment (admin)
    #[oai(path = "/orders/:id/payment", method = "post")]
    async fn record_payment(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<OrderOutcomeResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let outcome = self.service.record_payment(&caller, &id.0).await?;
        Ok(OrderOutcomeResponse::Ok(Json(outcome)))
    }

    /// Close a paid order (admin)
    #[oai(path = "/orders/:id/complete", method = "post")]
    async fn mark_completed(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<OrderOutcomeResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let outcome = self.service.mark_completed(&caller, &id.0).await?;
        Ok(OrderOutcomeResponse::Ok(Json(outcome)))
    }

    /// Hard delete (admin)
    #[oai(path = "/orders/:id", method = "delete")]
    async fn delete_order(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<DeleteOrderResponse, poem::Error> {
        let caller = extract_caller(req)?;
        let message = self.service.delete_order(&caller, &id.0).await?;
        Ok(DeleteOrderResponse::Ok(Json(MessageResponse { message })))
    }
}
