//! `ItemRepository` over `SqlItemRepository<DB>`.

macro_rules! impl_item_repository {
    ($db:ty) => {
        #[async_trait::async_trait]
        impl domains::ItemRepository for $crate::sql::SqlItemRepository<$db> {
            async fn create(&self, item: domains::NewItem) -> domains::DomainResult<domains::Item> {
                let now = chrono::Utc::now();
                let row = sqlx::query_as::<_, $crate::sql::rows::ItemRow>(
                    "INSERT INTO items (owner_id, item_type, name, description, item_condition, photo, \
                     status, due_date, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, $9) RETURNING *",
                )
                .bind(item.owner_id)
                .bind(item.item_type.as_str())
                .bind(&item.name)
                .bind(&item.description)
                .bind(item.condition.as_str())
                .bind(&item.photo)
                .bind(item.due_date)
                .bind(now)
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                row.try_into()
            }

            async fn find_by_id(&self, id: i64) -> domains::DomainResult<Option<domains::Item>> {
                sqlx::query_as::<_, $crate::sql::rows::ItemRow>("SELECT * FROM items WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?
                    .map(domains::Item::try_from)
                    .transpose()
            }

            async fn list_available(
                &self,
                filter: domains::ItemFilter,
            ) -> domains::DomainResult<Vec<domains::ItemListing>> {
                let mut qb = sqlx::QueryBuilder::<$db>::new(
                    "SELECT i.*, u.username AS owner_username, u.full_name AS owner_name, \
                     u.barangay AS owner_barangay, NULL AS owner_email \
                     FROM items i JOIN users u ON u.id = i.owner_id WHERE i.status = 'available'",
                );
                if let Some(item_type) = filter.item_type {
                    qb.push(" AND i.item_type = ").push_bind(item_type.as_str());
                }
                if let Some(condition) = filter.condition {
                    qb.push(" AND i.item_condition = ").push_bind(condition.as_str());
                }
                if let Some(barangay) = filter.barangay.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
                    qb.push(" AND LOWER(u.barangay) = ").push_bind(barangay.to_lowercase());
                }
                if let Some(pattern) = filter.search_pattern() {
                    qb.push(" AND (LOWER(i.name) LIKE ")
                        .push_bind(pattern.clone())
                        .push(" OR LOWER(i.description) LIKE ")
                        .push_bind(pattern)
                        .push(")");
                }
                qb.push(" ORDER BY i.created_at DESC, i.id DESC");

                let rows = qb
                    .build_query_as::<$crate::sql::rows::ItemListingRow>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?;
                $crate::sql::rows::convert_all(rows)
            }

            async fn list_by_owner(&self, owner_id: i64) -> domains::DomainResult<Vec<domains::Item>> {
                let rows = sqlx::query_as::<_, $crate::sql::rows::ItemRow>(
                    "SELECT * FROM items WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                $crate::sql::rows::convert_all(rows)
            }

            async fn list_pending(&self) -> domains::DomainResult<Vec<domains::ItemListing>> {
                let rows = sqlx::query_as::<_, $crate::sql::rows::ItemListingRow>(
                    "SELECT i.*, u.username AS owner_username, u.full_name AS owner_name, \
                     u.barangay AS owner_barangay, u.email AS owner_email \
                     FROM items i JOIN users u ON u.id = i.owner_id \
                     WHERE i.status = 'pending' ORDER BY i.created_at ASC, i.id ASC",
                )
                .fetch_all(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                $crate::sql::rows::convert_all(rows)
            }

            async fn review(
                &self,
                id: i64,
                decision: domains::ItemDecision,
            ) -> domains::DomainResult<domains::Item> {
                let row = sqlx::query_as::<_, $crate::sql::rows::ItemRow>(
                    "UPDATE items SET status = $1, updated_at = $2 \
                     WHERE id = $3 AND status = 'pending' RETURNING *",
                )
                .bind(decision.target_status().as_str())
                .bind(chrono::Utc::now())
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                if let Some(row) = row {
                    return row.try_into();
                }

                let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM items WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?;
                Err(match exists {
                    Some(_) => domains::DomainError::InvalidState {
                        entity: "item",
                        expected: "pending",
                    },
                    None => domains::DomainError::NotFound("item"),
                })
            }
        }
    };
}

pub(crate) use impl_item_repository;
