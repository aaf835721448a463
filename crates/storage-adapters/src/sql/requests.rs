//! `RequestRepository` over `SqlRequestRepository<DB>`.

macro_rules! impl_request_repository {
    ($db:ty, $lock:literal) => {
        impl $crate::sql::SqlRequestRepository<$db> {
            async fn request_miss(&self, id: i64) -> domains::DomainError {
                let found = sqlx::query_scalar::<_, i64>("SELECT id FROM requests WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await;
                match found {
                    Ok(Some(_)) => domains::DomainError::InvalidState {
                        entity: "request",
                        expected: "pending",
                    },
                    Ok(None) => domains::DomainError::NotFound("request"),
                    Err(err) => $crate::sql::db_error(err),
                }
            }
        }

        #[async_trait::async_trait]
        impl domains::RequestRepository for $crate::sql::SqlRequestRepository<$db> {
            async fn has_pending(&self, item_id: i64, requester_id: i64) -> domains::DomainResult<bool> {
                let found = sqlx::query_scalar::<_, i64>(
                    "SELECT id FROM requests \
                     WHERE item_id = $1 AND requester_id = $2 AND status = 'pending' LIMIT 1",
                )
                .bind(item_id)
                .bind(requester_id)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                Ok(found.is_some())
            }

            async fn create(&self, request: domains::NewRequest) -> domains::DomainResult<domains::Request> {
                let now = chrono::Utc::now();
                let row = sqlx::query_as::<_, $crate::sql::rows::RequestRow>(
                    "INSERT INTO requests (item_id, requester_id, purpose, status, created_at, updated_at) \
                     VALUES ($1, $2, $3, 'pending', $4, $5) RETURNING *",
                )
                .bind(request.item_id)
                .bind(request.requester_id)
                .bind(&request.purpose)
                .bind(now)
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err(|err| {
                    if $crate::sql::is_unique_violation(&err) {
                        domains::DomainError::duplicate_request()
                    } else {
                        $crate::sql::db_error(err)
                    }
                })?;
                row.try_into()
            }

            async fn find_detail(&self, id: i64) -> domains::DomainResult<Option<domains::RequestDetail>> {
                sqlx::query_as::<_, $crate::sql::rows::RequestDetailRow>(
                    "SELECT r.*, i.name AS item_name, i.item_type AS item_type, \
                     i.item_condition AS item_condition, i.photo AS item_photo, \
                     u.username AS requester_username, u.full_name AS requester_name, \
                     u.email AS requester_email, u.barangay AS requester_barangay \
                     FROM requests r \
                     LEFT JOIN items i ON i.id = r.item_id \
                     LEFT JOIN users u ON u.id = r.requester_id \
                     WHERE r.id = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?
                .map(domains::RequestDetail::try_from)
                .transpose()
            }

            async fn list_for_requester(
                &self,
                requester_id: i64,
            ) -> domains::DomainResult<Vec<domains::RequestDetail>> {
                let rows = sqlx::query_as::<_, $crate::sql::rows::RequestDetailRow>(
                    "SELECT r.*, i.name AS item_name, i.item_type AS item_type, \
                     i.item_condition AS item_condition, i.photo AS item_photo, \
                     u.username AS requester_username, u.full_name AS requester_name, \
                     u.email AS requester_email, u.barangay AS requester_barangay \
                     FROM requests r \
                     LEFT JOIN items i ON i.id = r.item_id \
                     LEFT JOIN users u ON u.id = r.requester_id \
                     WHERE r.requester_id = $1 \
                     ORDER BY r.created_at DESC, r.id DESC",
                )
                .bind(requester_id)
                .fetch_all(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                $crate::sql::rows::convert_all(rows)
            }

            async fn list(
                &self,
                filter: domains::RequestFilter,
                page: domains::PageRequest,
            ) -> domains::DomainResult<domains::Paginated<domains::RequestDetail>> {
                fn push_filter(qb: &mut sqlx::QueryBuilder<'_, $db>, filter: &domains::RequestFilter) {
                    qb.push(
                        " FROM requests r \
                         LEFT JOIN items i ON i.id = r.item_id \
                         LEFT JOIN users u ON u.id = r.requester_id \
                         WHERE 1 = 1",
                    );
                    if let Some(status) = filter.status {
                        qb.push(" AND r.status = ").push_bind(status.as_str());
                    }
                    if let Some(pattern) = filter.search_pattern() {
                        qb.push(" AND (LOWER(i.name) LIKE ")
                            .push_bind(pattern.clone())
                            .push(" OR LOWER(u.full_name) LIKE ")
                            .push_bind(pattern.clone())
                            .push(" OR LOWER(u.email) LIKE ")
                            .push_bind(pattern)
                            .push(")");
                    }
                }

                let mut count = sqlx::QueryBuilder::<$db>::new("SELECT COUNT(*)");
                push_filter(&mut count, &filter);
                let total = count
                    .build_query_scalar::<i64>()
                    .fetch_one(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?;

                let mut select = sqlx::QueryBuilder::<$db>::new(
                    "SELECT r.*, i.name AS item_name, i.item_type AS item_type, \
                     i.item_condition AS item_condition, i.photo AS item_photo, \
                     u.username AS requester_username, u.full_name AS requester_name, \
                     u.email AS requester_email, u.barangay AS requester_barangay",
                );
                push_filter(&mut select, &filter);
                select
                    .push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
                    .push_bind(i64::from(page.limit))
                    .push(" OFFSET ")
                    .push_bind(page.offset());
                let rows = select
                    .build_query_as::<$crate::sql::rows::RequestDetailRow>()
                    .fetch_all(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?;

                Ok(domains::Paginated {
                    items: $crate::sql::rows::convert_all(rows)?,
                    total,
                    page: page.page,
                    limit: page.limit,
                })
            }

            async fn approve(&self, id: i64, remarks: Option<String>) -> domains::DomainResult<domains::Request> {
                let mut tx = self.pool.begin().await.map_err($crate::sql::db_error)?;

                let current: domains::Request = match sqlx::query_as::<_, $crate::sql::rows::RequestRow>(
                    concat!("SELECT * FROM requests WHERE id = $1", $lock),
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err($crate::sql::db_error)?
                {
                    Some(row) => row.try_into()?,
                    None => return Err(domains::DomainError::NotFound("request")),
                };
                if current.status != domains::RequestStatus::Pending {
                    return Err(domains::DomainError::InvalidState {
                        entity: "request",
                        expected: "pending",
                    });
                }

                let now = chrono::Utc::now();
                let borrowed = sqlx::query(
                    "UPDATE items SET status = 'borrowed', updated_at = $1 \
                     WHERE id = $2 AND status = 'available'",
                )
                .bind(now)
                .bind(current.item_id)
                .execute(&mut *tx)
                .await
                .map_err($crate::sql::db_error)?;
                if borrowed.rows_affected() == 0 {
                    // Dropping `tx` rolls back; the request stays pending.
                    return Err(domains::DomainError::InvalidState {
                        entity: "item",
                        expected: "available",
                    });
                }

                let row = sqlx::query_as::<_, $crate::sql::rows::RequestRow>(
                    "UPDATE requests SET status = 'approved', remarks = $1, updated_at = $2 \
                     WHERE id = $3 AND status = 'pending' RETURNING *",
                )
                .bind(&remarks)
                .bind(now)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err($crate::sql::db_error)?;
                let Some(row) = row else {
                    return Err(domains::DomainError::InvalidState {
                        entity: "request",
                        expected: "pending",
                    });
                };

                tx.commit().await.map_err($crate::sql::db_error)?;
                row.try_into()
            }

            async fn deny(&self, id: i64, remarks: String) -> domains::DomainResult<domains::Request> {
                let row = sqlx::query_as::<_, $crate::sql::rows::RequestRow>(
                    "UPDATE requests SET status = 'denied', remarks = $1, updated_at = $2 \
                     WHERE id = $3 AND status = 'pending' RETURNING *",
                )
                .bind(&remarks)
                .bind(chrono::Utc::now())
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                match row {
                    Some(row) => row.try_into(),
                    None => Err(self.request_miss(id).await),
                }
            }
        }
    };
}

pub(crate) use impl_request_repository;
