use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use common::{DealId, GroupId, Money, OrderId, Pincode, RatingId, SupplierId, VendorId};

use crate::{
    Deal, NewDeal, NewRating, Order, OrderDraft, OrderFilter, OrderStatus, Rating, Result, Score,
    StoreError,
    order::{OrderLine, OrderOrigin},
    store::MarketStore,
};

/// PostgreSQL-backed market store implementation.
#[derive(Clone)]
pub struct PostgresMarketStore {
    pool: PgPool,
}

impl PostgresMarketStore {
    /// Creates a new PostgreSQL market store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_deal(row: PgRow) -> Result<Deal> {
        let pincodes: Vec<String> = row.try_get("target_pincodes")?;

        Ok(Deal {
            id: DealId::from_uuid(row.try_get::<Uuid, _>("id")?),
            supplier_id: SupplierId::from_uuid(row.try_get::<Uuid, _>("supplier_id")?),
            item_name: row.try_get("item_name")?,
            item_description: row.try_get("item_description")?,
            price_per_unit: Money::from_paise(row.try_get("price_per_unit_paise")?),
            unit: row.try_get("unit")?,
            min_order_quantity: row.try_get::<i32, _>("min_order_quantity")? as u32,
            stock_quantity: row
                .try_get::<Option<i32>, _>("stock_quantity")?
                .map(|stock| stock as u32),
            is_active: row.try_get("is_active")?,
            target_pincodes: pincodes.into_iter().map(Pincode::from).collect(),
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_line(row: &PgRow) -> Result<OrderLine> {
        Ok(OrderLine {
            deal_id: DealId::from_uuid(row.try_get::<Uuid, _>("deal_id")?),
            item_name: row.try_get("item_name")?,
            unit: row.try_get("unit")?,
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            unit_price: Money::from_paise(row.try_get("unit_price_paise")?),
            requested_by: VendorId::from_uuid(row.try_get::<Uuid, _>("requested_by")?),
        })
    }

    fn row_to_rating(row: PgRow) -> Result<Rating> {
        let score = Score::new(row.try_get::<i16, _>("score")? as u8)?;

        Ok(Rating {
            id: RatingId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            supplier_id: SupplierId::from_uuid(row.try_get::<Uuid, _>("supplier_id")?),
            vendor_id: VendorId::from_uuid(row.try_get::<Uuid, _>("vendor_id")?),
            score,
            review_text: row.try_get("review_text")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn origin_from_columns(
        group_id: Option<Uuid>,
        vendor_id: Option<Uuid>,
    ) -> Result<OrderOrigin> {
        match (group_id, vendor_id) {
            (Some(group), None) => Ok(OrderOrigin::group(GroupId::from_uuid(group))),
            (None, Some(vendor)) => Ok(OrderOrigin::individual(VendorId::from_uuid(vendor))),
            _ => Err(StoreError::Database(sqlx::Error::ColumnDecode {
                index: "group_id".to_string(),
                source: "order must have exactly one of group_id, vendor_id".into(),
            })),
        }
    }

    fn row_to_order(row: &PgRow, lines: Vec<OrderLine>) -> Result<Order> {
        let status: OrderStatus = row.try_get::<String, _>("status")?.parse()?;
        let origin = Self::origin_from_columns(
            row.try_get::<Option<Uuid>, _>("group_id")?,
            row.try_get::<Option<Uuid>, _>("vendor_id")?,
        )?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            origin,
            supplier_id: SupplierId::from_uuid(row.try_get::<Uuid, _>("supplier_id")?),
            status,
            total_value: Money::from_paise(row.try_get("total_value_paise")?),
            created_at: row.try_get("created_at")?,
            lines,
        })
    }

    /// Fetches the lines for a set of orders, grouped by order id.
    async fn lines_for_orders(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderLine>>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, deal_id, item_name, unit, quantity, unit_price_paise, requested_by
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, line_no ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let order_id: Uuid = row.try_get("order_id")?;
            grouped.entry(order_id).or_default().push(Self::row_to_line(&row)?);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl MarketStore for PostgresMarketStore {
    async fn list_active_deals(&self, scope: &Pincode) -> Result<Vec<Deal>> {
        let rows = sqlx::query(
            r#"
            SELECT id, supplier_id, item_name, item_description, price_per_unit_paise,
                   unit, min_order_quantity, stock_quantity, is_active, target_pincodes, created_at
            FROM deals
            WHERE is_active = TRUE AND $1 = ANY(target_pincodes)
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(scope.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_deal).collect()
    }

    async fn get_deal(&self, deal_id: DealId) -> Result<Option<Deal>> {
        let row = sqlx::query(
            r#"
            SELECT id, supplier_id, item_name, item_description, price_per_unit_paise,
                   unit, min_order_quantity, stock_quantity, is_active, target_pincodes, created_at
            FROM deals
            WHERE id = $1
            "#,
        )
        .bind(deal_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_deal).transpose()
    }

    async fn list_deals_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Deal>> {
        let rows = sqlx::query(
            r#"
            SELECT id, supplier_id, item_name, item_description, price_per_unit_paise,
                   unit, min_order_quantity, stock_quantity, is_active, target_pincodes, created_at
            FROM deals
            WHERE supplier_id = $1
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(supplier_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_deal).collect()
    }

    async fn create_deal(&self, draft: NewDeal) -> Result<Deal> {
        let deal = draft.into_deal(DealId::new(), Utc::now())?;
        let pincodes: Vec<String> = deal
            .target_pincodes
            .iter()
            .map(|pin| pin.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO deals (id, supplier_id, item_name, item_description, price_per_unit_paise,
                               unit, min_order_quantity, stock_quantity, is_active, target_pincodes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(deal.id.as_uuid())
        .bind(deal.supplier_id.as_uuid())
        .bind(&deal.item_name)
        .bind(&deal.item_description)
        .bind(deal.price_per_unit.paise())
        .bind(&deal.unit)
        .bind(deal.min_order_quantity as i32)
        .bind(deal.stock_quantity.map(|stock| stock as i32))
        .bind(deal.is_active)
        .bind(&pincodes)
        .bind(deal.created_at)
        .execute(&self.pool)
        .await?;

        Ok(deal)
    }

    async fn update_deal(&self, deal_id: DealId, draft: NewDeal) -> Result<Deal> {
        draft.validate()?;

        let mut tx = self.pool.begin().await?;

        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT supplier_id FROM deals WHERE id = $1 FOR UPDATE")
                .bind(deal_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

        let owner = SupplierId::from_uuid(owner.ok_or(StoreError::DealNotFound(deal_id))?);
        if owner != draft.supplier_id {
            return Err(StoreError::SupplierMismatch {
                deal_id,
                expected: draft.supplier_id,
                actual: owner,
            });
        }

        let pincodes: Vec<String> = draft
            .target_pincodes
            .iter()
            .map(|pin| pin.as_str().to_string())
            .collect();

        let row = sqlx::query(
            r#"
            UPDATE deals
            SET item_name = $2, item_description = $3, price_per_unit_paise = $4,
                unit = $5, min_order_quantity = $6, stock_quantity = $7, target_pincodes = $8
            WHERE id = $1
            RETURNING id, supplier_id, item_name, item_description, price_per_unit_paise,
                      unit, min_order_quantity, stock_quantity, is_active, target_pincodes, created_at
            "#,
        )
        .bind(deal_id.as_uuid())
        .bind(&draft.item_name)
        .bind(&draft.item_description)
        .bind(draft.price_per_unit.paise())
        .bind(&draft.unit)
        .bind(draft.min_order_quantity as i32)
        .bind(draft.stock_quantity.map(|stock| stock as i32))
        .bind(&pincodes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::row_to_deal(row)
    }

    async fn set_deal_active(&self, deal_id: DealId, active: bool) -> Result<Deal> {
        let row = sqlx::query(
            r#"
            UPDATE deals
            SET is_active = $2
            WHERE id = $1
            RETURNING id, supplier_id, item_name, item_description, price_per_unit_paise,
                      unit, min_order_quantity, stock_quantity, is_active, target_pincodes, created_at
            "#,
        )
        .bind(deal_id.as_uuid())
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_deal(row),
            None => Err(StoreError::DealNotFound(deal_id)),
        }
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order> {
        if draft.is_empty() {
            return Err(StoreError::EmptyDraft);
        }
        for line in &draft.lines {
            if line.quantity == 0 {
                return Err(StoreError::InvalidQuantity {
                    deal_id: line.deal_id,
                    quantity: line.quantity,
                });
            }
        }

        // All pricing reads and inserts share one transaction, so the
        // order and its lines land together or not at all.
        let mut tx = self.pool.begin().await?;

        let mut lines = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let deal_row = sqlx::query(
                "SELECT supplier_id, item_name, unit, price_per_unit_paise FROM deals WHERE id = $1",
            )
            .bind(line.deal_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::DealNotFound(line.deal_id))?;

            let deal_supplier = SupplierId::from_uuid(deal_row.try_get::<Uuid, _>("supplier_id")?);
            if deal_supplier != draft.supplier_id {
                return Err(StoreError::SupplierMismatch {
                    deal_id: line.deal_id,
                    expected: draft.supplier_id,
                    actual: deal_supplier,
                });
            }

            lines.push(OrderLine {
                deal_id: line.deal_id,
                item_name: deal_row.try_get("item_name")?,
                unit: deal_row.try_get("unit")?,
                quantity: line.quantity,
                unit_price: Money::from_paise(deal_row.try_get("price_per_unit_paise")?),
                requested_by: line.requested_by,
            });
        }

        let order = Order {
            id: OrderId::new(),
            origin: draft.origin,
            supplier_id: draft.supplier_id,
            status: OrderStatus::Pending,
            total_value: lines.iter().map(OrderLine::line_total).sum(),
            created_at: Utc::now(),
            lines,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (id, supplier_id, group_id, vendor_id, status, total_value_paise, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.supplier_id.as_uuid())
        .bind(order.origin.group_id().map(|id| id.as_uuid()))
        .bind(order.origin.individual_vendor().map(|id| id.as_uuid()))
        .bind(order.status.as_str())
        .bind(order.total_value.paise())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (line_no, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, line_no, deal_id, item_name, unit, quantity, unit_price_paise, requested_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(line_no as i32)
            .bind(line.deal_id.as_uuid())
            .bind(&line.item_name)
            .bind(&line.unit)
            .bind(line.quantity as i32)
            .bind(line.unit_price.paise())
            .bind(line.requested_by.as_uuid())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            order_id = %order.id,
            supplier_id = %order.supplier_id,
            lines = order.lines.len(),
            total = %order.total_value,
            "order committed"
        );
        Ok(order)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, supplier_id, group_id, vendor_id, status, total_value_paise, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut lines = self.lines_for_orders(&[order_id.as_uuid()]).await?;
        let lines = lines.remove(&order_id.as_uuid()).unwrap_or_default();
        Ok(Some(Self::row_to_order(&row, lines)?))
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut sql = String::from(
            "SELECT id, supplier_id, group_id, vendor_id, status, total_value_paise, created_at \
             FROM orders WHERE 1=1",
        );
        let mut param_count = 0;

        // Build dynamic query
        if filter.supplier_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND supplier_id = ${param_count}"));
        }
        if filter.group_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND group_id = ${param_count}"));
        }
        if filter.vendor_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(
                " AND (vendor_id = ${param_count} OR EXISTS (SELECT 1 FROM order_lines ol \
                 WHERE ol.order_id = orders.id AND ol.requested_by = ${param_count}))"
            ));
        }
        if filter.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }

        sql.push_str(" ORDER BY created_at DESC, id ASC");

        if filter.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        let mut query = sqlx::query(&sql);
        if let Some(supplier_id) = filter.supplier_id {
            query = query.bind(supplier_id.as_uuid());
        }
        if let Some(group_id) = filter.group_id {
            query = query.bind(group_id.as_uuid());
        }
        if let Some(vendor_id) = filter.vendor_id {
            query = query.bind(vendor_id.as_uuid());
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit as i64);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let order_ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<_, _>>()?;
        let mut lines = self.lines_for_orders(&order_ids).await?;

        rows.iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                Self::row_to_order(row, lines.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn transition_order(&self, order_id: OrderId, new_status: OrderStatus) -> Result<Order> {
        // The row lock serializes concurrent transitions of the same
        // order; the loser re-reads a terminal status and is rejected,
        // so the completion decrement can only ever run once.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, supplier_id, group_id, vendor_id, status, total_value_paise, created_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::OrderNotFound(order_id))?;

        let current: OrderStatus = row.try_get::<String, _>("status")?.parse()?;
        if !current.can_transition_to(new_status) {
            return Err(StoreError::IllegalTransition {
                order_id,
                from: current,
                to: new_status,
            });
        }

        let line_rows = sqlx::query(
            r#"
            SELECT deal_id, item_name, unit, quantity, unit_price_paise, requested_by
            FROM order_lines
            WHERE order_id = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&mut *tx)
        .await?;

        let lines: Vec<OrderLine> = line_rows
            .iter()
            .map(Self::row_to_line)
            .collect::<Result<_>>()?;

        if new_status == OrderStatus::Completed {
            for line in &lines {
                sqlx::query(
                    r#"
                    UPDATE deals
                    SET stock_quantity = GREATEST(stock_quantity - $2, 0)
                    WHERE id = $1 AND stock_quantity IS NOT NULL
                    "#,
                )
                .bind(line.deal_id.as_uuid())
                .bind(line.quantity as i32)
                .execute(&mut *tx)
                .await?;
            }
        }

        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(new_status.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(%order_id, from = %current, to = %new_status, "order status changed");

        let mut order = Self::row_to_order(&row, lines)?;
        order.status = new_status;
        Ok(order)
    }

    async fn upsert_rating(&self, submission: NewRating) -> Result<Rating> {
        let supplier: Option<Uuid> =
            sqlx::query_scalar("SELECT supplier_id FROM orders WHERE id = $1")
                .bind(submission.order_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        let supplier = supplier.ok_or(StoreError::OrderNotFound(submission.order_id))?;

        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO ratings (id, order_id, supplier_id, vendor_id, score, review_text, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (order_id, vendor_id) DO UPDATE SET
                score = EXCLUDED.score,
                review_text = EXCLUDED.review_text,
                updated_at = EXCLUDED.updated_at
            RETURNING id, order_id, supplier_id, vendor_id, score, review_text, created_at, updated_at
            "#,
        )
        .bind(RatingId::new().as_uuid())
        .bind(submission.order_id.as_uuid())
        .bind(supplier)
        .bind(submission.vendor_id.as_uuid())
        .bind(submission.score.value() as i16)
        .bind(submission.review_text.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_rating(row)
    }

    async fn list_ratings_for_supplier(&self, supplier_id: SupplierId) -> Result<Vec<Rating>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, supplier_id, vendor_id, score, review_text, created_at, updated_at
            FROM ratings
            WHERE supplier_id = $1
            ORDER BY updated_at DESC, id ASC
            "#,
        )
        .bind(supplier_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_rating).collect()
    }
}
