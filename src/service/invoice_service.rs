//! Invoice submission and store review.

use std::sync::Arc;

use chrono::Utc;

use super::ledger_service::{EntryKind, LedgerEntry, post_entry, resolve_member};
use crate::config::RewardPolicy;
use crate::domain::ids::{IdPrefix, new_id};
use crate::domain::invoice::validate_invoice_amount;
use crate::domain::{EventBus, InvoiceRequest, InvoiceStatus, LedgerEvent};
use crate::error::LedgerError;
use crate::persistence::{self, Collection, DocumentStore, StoreTxn};

/// Fields of a new invoice claim.
#[derive(Debug, Clone, Default)]
pub struct NewInvoice {
    /// Member id or phone.
    pub customer_id: String,
    /// Display name; the member's name when blank.
    pub customer_name: String,
    /// Store-issued bill number.
    pub invoice_number: String,
    /// Claimed amount in rupees.
    pub amount: f64,
    /// Store that issued the bill.
    pub store_name: String,
    /// Optional description of the goods.
    pub product_details: Option<String>,
}

/// Member bill claims and their approval workflow.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    store: Arc<dyn DocumentStore>,
    reward: RewardPolicy,
    event_bus: EventBus,
}

impl InvoiceService {
    /// Creates a new `InvoiceService`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, reward: RewardPolicy, event_bus: EventBus) -> Self {
        Self {
            store,
            reward,
            event_bus,
        }
    }

    /// Returns the reward policy applied on approval.
    #[must_use]
    pub fn reward(&self) -> RewardPolicy {
        self.reward
    }

    /// Files a Pending invoice. No ledger effect.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] for a blank bill number or store,
    /// or a malformed amount, and [`LedgerError::MemberNotFound`] if the
    /// customer is not registered.
    pub async fn submit_invoice(&self, new: NewInvoice) -> Result<InvoiceRequest, LedgerError> {
        validate_invoice_amount(new.amount).map_err(LedgerError::Validation)?;
        let invoice_number = new.invoice_number.trim().trim_start_matches('#').to_string();
        let store_name = new.store_name.trim().to_string();
        if invoice_number.is_empty() {
            return Err(LedgerError::Validation("invoice number is required".to_string()));
        }
        if store_name.is_empty() {
            return Err(LedgerError::Validation("store name is required".to_string()));
        }

        let mut txn = self.store.begin().await?;
        let member = resolve_member(txn.as_mut(), new.customer_id.trim()).await?;
        let customer_name = match new.customer_name.trim() {
            "" => member.name.clone(),
            name => name.to_string(),
        };

        let invoice = InvoiceRequest {
            id: new_id(IdPrefix::Invoice),
            customer_id: member.id,
            customer_name,
            invoice_number,
            amount: new.amount,
            date: Utc::now(),
            status: InvoiceStatus::Pending,
            store_name,
            product_details: new
                .product_details
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            rejection_reason: None,
            awarded_points: None,
            reviewed_at: None,
        };
        persistence::create(txn.as_mut(), Collection::Invoices, &invoice.id, &invoice).await?;
        txn.commit().await?;

        tracing::info!(
            invoice_id = %invoice.id,
            member_id = %invoice.customer_id,
            store = %invoice.store_name,
            amount = invoice.amount,
            "invoice submitted"
        );
        self.event_bus.publish(LedgerEvent::InvoiceSubmitted {
            invoice_id: invoice.id.clone(),
            member_id: invoice.customer_id.clone(),
            store_name: invoice.store_name.clone(),
            amount: invoice.amount,
            timestamp: invoice.date,
        });
        Ok(invoice)
    }

    /// Returns invoices newest first, optionally only one store's.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] on adapter failure.
    pub async fn list_invoices(
        &self,
        store_name: Option<&str>,
    ) -> Result<Vec<InvoiceRequest>, LedgerError> {
        let mut invoices: Vec<InvoiceRequest> =
            persistence::fetch_all(self.store.as_ref(), Collection::Invoices).await?;
        if let Some(store) = store_name {
            invoices.retain(|i| i.store_name == store);
        }
        invoices.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(invoices)
    }

    /// Returns one invoice.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvoiceNotFound`] if the id is unknown.
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<InvoiceRequest, LedgerError> {
        persistence::fetch(self.store.as_ref(), Collection::Invoices, invoice_id)
            .await?
            .ok_or_else(|| LedgerError::InvoiceNotFound(invoice_id.to_string()))
    }

    /// Corrects the amount of a Pending invoice.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvoiceNotFound`], [`LedgerError::Validation`]
    /// or [`LedgerError::InvalidState`] once reviewed.
    pub async fn update_amount(
        &self,
        invoice_id: &str,
        amount: f64,
    ) -> Result<InvoiceRequest, LedgerError> {
        validate_invoice_amount(amount).map_err(LedgerError::Validation)?;

        let mut txn = self.store.begin().await?;
        let mut invoice = load_pending(txn.as_mut(), invoice_id).await?;
        let previous = invoice.amount;
        invoice.amount = amount;
        persistence::save(txn.as_mut(), Collection::Invoices, &invoice.id, &invoice).await?;
        txn.commit().await?;

        tracing::info!(invoice_id = %invoice.id, previous, amount, "invoice amount updated");
        Ok(invoice)
    }

    /// Approves a Pending invoice and credits the member.
    ///
    /// The credit is `floor(amount * points_per_rupee)`, noted
    /// `Bill Approved: #<invoice number>` and attributed to the store.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvoiceNotFound`], [`LedgerError::InvalidState`]
    /// if already reviewed, [`LedgerError::InvalidAmount`] if the amount is
    /// worth no points, or [`LedgerError::MemberNotFound`].
    pub async fn approve(&self, invoice_id: &str) -> Result<InvoiceRequest, LedgerError> {
        let mut txn = self.store.begin().await?;
        let mut invoice = load_pending(txn.as_mut(), invoice_id).await?;

        let points = self.reward.points_for(invoice.amount);
        if points == 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "invoice {} amount {} earns no points",
                invoice.id, invoice.amount
            )));
        }
        let entry = LedgerEntry::new(
            &invoice.customer_id,
            points,
            EntryKind::Earn,
            format!("Bill Approved: #{}", invoice.invoice_number),
        )
        .with_store(Some(invoice.store_name.clone()));
        let posting = post_entry(txn.as_mut(), entry).await?;

        let now = Utc::now();
        invoice.status = InvoiceStatus::Approved;
        invoice.awarded_points = Some(points);
        invoice.reviewed_at = Some(now);
        persistence::save(txn.as_mut(), Collection::Invoices, &invoice.id, &invoice).await?;
        txn.commit().await?;

        tracing::info!(
            invoice_id = %invoice.id,
            member_id = %posting.member.id,
            points,
            "invoice approved"
        );
        self.event_bus.publish_all([
            posting.event,
            LedgerEvent::InvoiceApproved {
                invoice_id: invoice.id.clone(),
                member_id: invoice.customer_id.clone(),
                store_name: invoice.store_name.clone(),
                points,
                timestamp: now,
            },
        ]);
        Ok(invoice)
    }

    /// Rejects a Pending invoice. No ledger effect; terminal.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvoiceNotFound`] or [`LedgerError::InvalidState`].
    pub async fn reject(
        &self,
        invoice_id: &str,
        reason: Option<String>,
    ) -> Result<InvoiceRequest, LedgerError> {
        let mut txn = self.store.begin().await?;
        let mut invoice = load_pending(txn.as_mut(), invoice_id).await?;

        let now = Utc::now();
        invoice.status = InvoiceStatus::Rejected;
        invoice.rejection_reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        invoice.reviewed_at = Some(now);
        persistence::save(txn.as_mut(), Collection::Invoices, &invoice.id, &invoice).await?;
        txn.commit().await?;

        tracing::info!(invoice_id = %invoice.id, reason = ?invoice.rejection_reason, "invoice rejected");
        self.event_bus.publish(LedgerEvent::InvoiceRejected {
            invoice_id: invoice.id.clone(),
            member_id: invoice.customer_id.clone(),
            store_name: invoice.store_name.clone(),
            timestamp: now,
        });
        Ok(invoice)
    }
}

async fn load_pending(
    txn: &mut dyn StoreTxn,
    invoice_id: &str,
) -> Result<InvoiceRequest, LedgerError> {
    let invoice: InvoiceRequest = persistence::load(txn, Collection::Invoices, invoice_id)
        .await?
        .ok_or_else(|| LedgerError::InvoiceNotFound(invoice_id.to_string()))?;
    if !invoice.is_pending() {
        return Err(LedgerError::InvalidState(format!(
            "invoice {} is {:?}",
            invoice.id, invoice.status
        )));
    }
    Ok(invoice)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::service::ledger_service::LedgerService;

    async fn services(points_per_rupee: f64) -> (LedgerService, InvoiceService) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let bus = EventBus::new(100);
        let ledger = LedgerService::new(Arc::clone(&store), bus.clone());
        let invoices = InvoiceService::new(store, RewardPolicy { points_per_rupee }, bus);
        let Ok(_) = ledger.register_member("Ramesh", None, "7777777777").await else {
            panic!("registration failed");
        };
        (ledger, invoices)
    }

    fn claim(amount: f64) -> NewInvoice {
        NewInvoice {
            customer_id: "7777777777".into(),
            customer_name: String::new(),
            invoice_number: "INV-9988".into(),
            amount,
            store_name: "Pune Hardware".into(),
            product_details: Some("Cement x 10".into()),
        }
    }

    #[tokio::test]
    async fn approve_credits_floor_of_amount() {
        let (ledger, invoices) = services(1.0).await;
        let Ok(invoice) = invoices.submit_invoice(claim(5000.0)).await else {
            panic!("submit failed");
        };
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.customer_name, "Ramesh");

        let Ok(updated) = invoices.update_amount(&invoice.id, 4500.75).await else {
            panic!("update failed");
        };
        assert!((updated.amount - 4500.75).abs() < f64::EPSILON);

        let Ok(approved) = invoices.approve(&invoice.id).await else {
            panic!("approve failed");
        };
        assert_eq!(approved.status, InvoiceStatus::Approved);
        assert_eq!(approved.awarded_points, Some(4500));

        let Ok(member) = ledger.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 4500);
        assert_eq!(member.store_balances.get("Pune Hardware"), Some(&4500));
        assert_eq!(
            member.history.first().map(|t| t.note.as_str()),
            Some("Bill Approved: #INV-9988")
        );
    }

    #[tokio::test]
    async fn reviewed_invoices_are_final() {
        let (ledger, invoices) = services(1.0).await;
        let Ok(invoice) = invoices.submit_invoice(claim(100.0)).await else {
            panic!("submit failed");
        };
        assert!(invoices.approve(&invoice.id).await.is_ok());

        assert!(matches!(
            invoices.approve(&invoice.id).await,
            Err(LedgerError::InvalidState(_))
        ));
        assert!(matches!(
            invoices.reject(&invoice.id, None).await,
            Err(LedgerError::InvalidState(_))
        ));
        assert!(matches!(
            invoices.update_amount(&invoice.id, 1.0).await,
            Err(LedgerError::InvalidState(_))
        ));

        let Ok(member) = ledger.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 100);
    }

    #[tokio::test]
    async fn reject_records_reason_without_credit() {
        let (ledger, invoices) = services(1.0).await;
        let Ok(invoice) = invoices.submit_invoice(claim(800.0)).await else {
            panic!("submit failed");
        };
        let Ok(rejected) = invoices
            .reject(&invoice.id, Some("Blurry photo".into()))
            .await
        else {
            panic!("reject failed");
        };
        assert_eq!(rejected.status, InvoiceStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Blurry photo"));

        let Ok(member) = ledger.get_member("7777777777").await else {
            panic!("member missing");
        };
        assert_eq!(member.points_balance, 0);
    }

    #[tokio::test]
    async fn worthless_amount_stays_pending() {
        let (_, invoices) = services(0.5).await;
        let Ok(invoice) = invoices.submit_invoice(claim(1.0)).await else {
            panic!("submit failed");
        };
        assert!(matches!(
            invoices.approve(&invoice.id).await,
            Err(LedgerError::InvalidAmount(_))
        ));
        let Ok(stored) = invoices.get_invoice(&invoice.id).await else {
            panic!("invoice missing");
        };
        assert!(stored.is_pending());
    }

    #[tokio::test]
    async fn submission_validation() {
        let (_, invoices) = services(1.0).await;
        assert!(matches!(
            invoices.submit_invoice(claim(f64::NAN)).await,
            Err(LedgerError::Validation(_))
        ));
        let mut unknown = claim(10.0);
        unknown.customer_id = "0000000000".into();
        assert!(matches!(
            invoices.submit_invoice(unknown).await,
            Err(LedgerError::MemberNotFound(_))
        ));
        assert!(matches!(
            invoices.approve("INV-missing").await,
            Err(LedgerError::InvoiceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_by_store() {
        let (_, invoices) = services(1.0).await;
        let _ = invoices.submit_invoice(claim(10.0)).await;
        let mut other = claim(20.0);
        other.store_name = "Mumbai Tiles".into();
        let _ = invoices.submit_invoice(other).await;

        assert_eq!(invoices.list_invoices(None).await.unwrap_or_default().len(), 2);
        let pune = invoices
            .list_invoices(Some("Pune Hardware"))
            .await
            .unwrap_or_default();
        assert_eq!(pune.len(), 1);
    }
}
