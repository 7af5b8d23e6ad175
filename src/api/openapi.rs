//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto;
use super::handlers::{banners, batches, invoices, members, payouts, stores, system};
use crate::domain;
use crate::error::{ErrorBody, ErrorKind, ErrorResponse};
use crate::service::{Direction, RedemptionFailure, RedemptionOutcome};

/// Aggregated OpenAPI description, served by Swagger UI.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "vista-ledger",
        description = "Points ledger, code redemption and invoice approval API"
    ),
    paths(
        system::health_handler,
        system::rewards_handler,
        members::list_members,
        members::register_member,
        members::get_member,
        members::get_member_by_phone,
        members::adjust_points,
        members::request_payout,
        payouts::list_payouts,
        payouts::complete_payout,
        payouts::reject_payout,
        batches::create_batch,
        batches::list_batches,
        batches::get_batch,
        batches::mark_printed,
        batches::redeem_code,
        invoices::submit_invoice,
        invoices::list_invoices,
        invoices::update_amount,
        invoices::approve_invoice,
        invoices::reject_invoice,
        banners::list_banners,
        banners::create_banner,
        banners::toggle_banner,
        banners::delete_banner,
        stores::list_stores,
        stores::create_store,
        stores::get_store,
        stores::update_store_settings,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        ErrorKind,
        Direction,
        RedemptionOutcome,
        RedemptionFailure,
        domain::Member,
        domain::Transaction,
        domain::LoyaltyBatch,
        domain::GiftCard,
        domain::InvoiceRequest,
        domain::PayoutRequest,
        domain::PromoBanner,
        domain::Store,
        domain::StoreStatus,
        domain::StoreStats,
        domain::StoreOverview,
        dto::MemberListResponse,
        dto::BatchSummaryDto,
    )),
    tags(
        (name = "System", description = "Health and configuration"),
        (name = "Members", description = "Member registration and balances"),
        (name = "Payouts", description = "Cash payout requests"),
        (name = "Batches", description = "Code batch minting"),
        (name = "Redemptions", description = "Code redemption"),
        (name = "Invoices", description = "Bill claims and approval"),
        (name = "Banners", description = "Promo banners"),
        (name = "Stores", description = "Partner store administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/health",
            "/config/rewards",
            "/api/v1/members/{id}/points",
            "/api/v1/redemptions",
            "/api/v1/invoices/{id}/approve",
            "/api/v1/banners/{id}/toggle",
            "/api/v1/stores",
            "/api/v1/stores/{id}/settings",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
