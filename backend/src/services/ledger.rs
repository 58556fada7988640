//! Stock mutation engine
//!
//! Every quantity change goes through here. A mutation reads the current
//! stock of its targets, plans the ledger rows, and commits them together
//! with compare-and-swap stock writes. A stale commit is replanned from fresh
//! reads, up to `max_retries` times.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::ids::{generate_id, MOVEMENT_PREFIX, TRANSFER_PREFIX};
use shared::{
    validate_movement_quantity, validate_price, validate_stock_level, MovementFilter,
    MovementRequest, MovementType, Reconciliation, StockMovement, StockTarget,
};

use crate::error::{check, AppError, AppResult};
use crate::services::price_history::PriceHistoryRecorder;
use crate::store::{CommitOutcome, LedgerCommit, LedgerStore, StockWrite, TargetState};

pub const DEFAULT_MAX_RETRIES: u32 = 5;

type Snapshot = HashMap<StockTarget, TargetState>;

/// Move stock from one target to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: StockTarget,
    pub to: StockTarget,
    pub quantity: i64,
    pub reference: Option<String>,
    pub reason: Option<String>,
}

/// The two linked movements of a transfer
#[derive(Debug, Clone, Serialize)]
pub struct Transfer {
    pub reference: String,
    pub outgoing: StockMovement,
    pub incoming: StockMovement,
}

pub struct StockMutationEngine<S> {
    store: Arc<S>,
    prices: PriceHistoryRecorder<S>,
    max_retries: u32,
}

impl<S> Clone for StockMutationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            prices: self.prices.clone(),
            max_retries: self.max_retries,
        }
    }
}

impl<S: LedgerStore> StockMutationEngine<S> {
    pub fn new(store: Arc<S>, max_retries: u32) -> Self {
        Self {
            prices: PriceHistoryRecorder::new(Arc::clone(&store)),
            store,
            max_retries,
        }
    }

    /// Apply one movement and return the persisted row
    pub async fn apply_movement(&self, request: MovementRequest) -> AppResult<StockMovement> {
        self.apply_batch(vec![request])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("empty commit".to_string()))
    }

    /// Apply several movements as one all-or-nothing unit.
    ///
    /// Requests touching the same target chain in order: each one starts from
    /// the stock the previous one left behind.
    pub async fn apply_batch(&self, requests: Vec<MovementRequest>) -> AppResult<Vec<StockMovement>> {
        if requests.is_empty() {
            return Err(AppError::validation("movements", "At least one movement is required"));
        }
        for request in &requests {
            validate_request(request)?;
        }

        let targets: Vec<StockTarget> = requests.iter().map(MovementRequest::target).collect();
        let movements = self
            .commit_with_retry(&targets, |_| Ok(requests.clone()))
            .await?;

        self.sync_supplier_costs(&movements).await;
        Ok(movements)
    }

    /// Move stock between two targets.
    ///
    /// Writes a `transfer` row on the source and an `in` row on the
    /// destination, both carrying the same reference.
    pub async fn transfer_stock(&self, request: TransferRequest) -> AppResult<Transfer> {
        if request.from == request.to {
            return Err(AppError::validation("to", "Source and destination must differ"));
        }
        check(
            "quantity",
            validate_movement_quantity(MovementType::Transfer, request.quantity),
        )?;

        let reference = request
            .reference
            .clone()
            .unwrap_or_else(|| generate_id(Some(TRANSFER_PREFIX)));

        let mut outgoing =
            MovementRequest::new(request.from.clone(), MovementType::Transfer, request.quantity)
                .with_reference(reference.clone());
        let mut incoming = MovementRequest::new(request.to.clone(), MovementType::In, request.quantity)
            .with_reference(reference.clone());
        if let Some(reason) = &request.reason {
            outgoing = outgoing.with_reason(reason.clone());
            incoming = incoming.with_reason(reason.clone());
        }

        let mut movements = self.apply_batch(vec![outgoing, incoming]).await?.into_iter();
        match (movements.next(), movements.next()) {
            (Some(outgoing), Some(incoming)) => {
                tracing::info!(reference = %reference, quantity = request.quantity, "Stock transferred");
                Ok(Transfer {
                    reference,
                    outgoing,
                    incoming,
                })
            }
            _ => Err(AppError::Internal("transfer commit lost a movement".to_string())),
        }
    }

    /// Set a target to an absolute level with an adjustment of `level - current`
    pub async fn set_stock_level(
        &self,
        target: StockTarget,
        level: i64,
        reason: Option<String>,
    ) -> AppResult<StockMovement> {
        check("level", validate_stock_level(level))?;

        let targets = vec![target.clone()];
        let movements = self
            .commit_with_retry(&targets, |snapshot| {
                let current = snapshot
                    .get(&target)
                    .map(|state| state.stock_quantity)
                    .ok_or_else(|| AppError::Internal(format!("{} missing from snapshot", target)))?;
                if current == level {
                    return Err(AppError::validation("level", "Stock is already at this level"));
                }
                let mut request =
                    MovementRequest::new(target.clone(), MovementType::Adjustment, level - current);
                request.reason = reason.clone();
                Ok(vec![request])
            })
            .await?;

        movements
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("empty commit".to_string()))
    }

    pub async fn get_movement(&self, id: &str) -> AppResult<StockMovement> {
        self.store.get_movement(id).await
    }

    pub async fn list_movements(&self, filter: &MovementFilter) -> AppResult<Vec<StockMovement>> {
        self.store.list_movements(filter).await
    }

    /// Replay a target's ledger from zero against its stored quantity.
    /// Read-only, works for inactive products too.
    pub async fn reconcile(&self, target: &StockTarget) -> AppResult<Reconciliation> {
        let state = self.store.load_target(target).await?;
        let history = self.store.target_history(target).await?;
        let reconciliation = Reconciliation::replay(target.clone(), &history, state.stock_quantity);

        if !reconciliation.consistent {
            tracing::warn!(
                stock_target = %target,
                replayed = reconciliation.replayed_quantity,
                stored = reconciliation.stored_quantity,
                chain_breaks = reconciliation.chain_breaks.len(),
                "Ledger does not reconcile"
            );
        }
        Ok(reconciliation)
    }

    /// Read, plan and commit until the commit is not stale.
    ///
    /// `plan` sees a fresh snapshot on every attempt and returns the requests
    /// to apply against it.
    async fn commit_with_retry<F>(&self, targets: &[StockTarget], plan: F) -> AppResult<Vec<StockMovement>>
    where
        F: Fn(&Snapshot) -> AppResult<Vec<MovementRequest>>,
    {
        for attempt in 0..=self.max_retries {
            let snapshot = self.load_snapshot(targets).await?;
            let requests = plan(&snapshot)?;
            let commit = build_commit(&requests, &snapshot)?;

            match self.store.commit(&commit).await? {
                CommitOutcome::Committed => {
                    for movement in &commit.movements {
                        tracing::info!(
                            movement_id = %movement.id,
                            product_id = %movement.product_id,
                            movement_type = %movement.movement_type,
                            stock_after = movement.stock_after,
                            "Stock movement recorded"
                        );
                    }
                    return Ok(commit.movements);
                }
                CommitOutcome::Stale => {
                    tracing::debug!(attempt, "Stock changed under the mutation, retrying");
                }
            }
        }

        let names: Vec<String> = targets.iter().map(ToString::to_string).collect();
        Err(AppError::ConcurrentModification(names.join(", ")))
    }

    async fn load_snapshot(&self, targets: &[StockTarget]) -> AppResult<Snapshot> {
        let mut snapshot = Snapshot::new();
        for target in targets {
            if snapshot.contains_key(target) {
                continue;
            }
            let state = self.store.load_target(target).await?;
            if !state.is_active {
                return Err(AppError::validation("product_id", "Product is inactive"));
            }
            snapshot.insert(target.clone(), state);
        }
        Ok(snapshot)
    }

    /// Bring supplier prices in line with the unit cost of received goods.
    /// Runs after the stock commit; failures are logged and never surface.
    async fn sync_supplier_costs(&self, movements: &[StockMovement]) {
        for movement in movements.iter().filter(|m| m.movement_type == MovementType::In) {
            let (Some(unit_cost), Some(supplier_id)) =
                (movement.unit_cost, movement.supplier_id.as_deref())
            else {
                continue;
            };

            if let Err(e) = self.sync_supplier_cost(movement, supplier_id, unit_cost).await {
                tracing::warn!(movement_id = %movement.id, error = %e, "Supplier cost sync failed");
            }
        }
    }

    async fn sync_supplier_cost(
        &self,
        movement: &StockMovement,
        supplier_id: &str,
        unit_cost: Decimal,
    ) -> AppResult<()> {
        let Some(supplier_price) = self
            .store
            .find_supplier_price(&movement.product_id, supplier_id)
            .await?
        else {
            return Ok(());
        };
        if supplier_price.price == unit_cost {
            return Ok(());
        }

        self.prices
            .change_supplier_price(&supplier_price.id, unit_cost, None)
            .await?;
        tracing::info!(
            movement_id = %movement.id,
            supplier_price_id = %supplier_price.id,
            price = %unit_cost,
            "Supplier price updated from received cost"
        );
        Ok(())
    }
}

fn validate_request(request: &MovementRequest) -> AppResult<()> {
    check(
        "quantity",
        validate_movement_quantity(request.movement_type, request.quantity),
    )?;
    if let Some(unit_cost) = request.unit_cost {
        check("unit_cost", validate_price(unit_cost))?;
    }
    Ok(())
}

/// Plan the ledger rows and stock writes for `requests` against `snapshot`
fn build_commit(requests: &[MovementRequest], snapshot: &Snapshot) -> AppResult<LedgerCommit> {
    // target -> (quantity read, running quantity)
    let mut running: HashMap<StockTarget, (i64, i64)> = HashMap::new();
    let created_at = Utc::now();
    let mut movements = Vec::with_capacity(requests.len());

    for request in requests {
        let target = request.target();
        let (expected, before) = match running.get(&target) {
            Some(entry) => *entry,
            None => {
                let state = snapshot
                    .get(&target)
                    .ok_or_else(|| AppError::Internal(format!("{} missing from snapshot", target)))?;
                (state.stock_quantity, state.stock_quantity)
            }
        };

        let after = before
            .checked_add(request.movement_type.signed_delta(request.quantity))
            .ok_or_else(|| AppError::validation("quantity", "Quantity is out of range"))?;
        if after < 0 {
            if request.movement_type.checks_available_stock() {
                return Err(AppError::InsufficientStock {
                    target: target.to_string(),
                    requested: request.quantity,
                    available: before,
                });
            }
            return Err(AppError::validation(
                "quantity",
                "Adjustment would take stock below zero",
            ));
        }

        movements.push(StockMovement {
            id: generate_id(Some(MOVEMENT_PREFIX)),
            product_id: request.product_id.clone(),
            variant_id: request.variant_id.clone(),
            movement_type: request.movement_type,
            quantity: request.quantity,
            stock_before: before,
            stock_after: after,
            unit_cost: request.unit_cost,
            reference: request.reference.clone(),
            reason: request.reason.clone(),
            supplier_id: request.supplier_id.clone(),
            created_at,
        });
        running.insert(target, (expected, after));
    }

    let mut writes: Vec<StockWrite> = running
        .into_iter()
        .map(|(target, (expected, new_quantity))| StockWrite {
            target,
            expected,
            new_quantity,
        })
        .collect();
    writes.sort_by(|a, b| {
        (&a.target.product_id, &a.target.variant_id).cmp(&(&b.target.product_id, &b.target.variant_id))
    });

    Ok(LedgerCommit { writes, movements })
}
