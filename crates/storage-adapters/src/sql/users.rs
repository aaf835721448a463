//! `UserRepository` over `SqlUserRepository<DB>`.

macro_rules! impl_user_repository {
    ($db:ty, $lock:literal) => {
        impl $crate::sql::SqlUserRepository<$db> {
            /// Copies the current profile into the audit table.
            async fn snapshot(
                tx: &mut sqlx::Transaction<'_, $db>,
                user: &domains::User,
                reason: &str,
                now: chrono::DateTime<chrono::Utc>,
            ) -> Result<(), sqlx::Error> {
                sqlx::query(
                    "INSERT INTO user_rejections (user_id, reason, snapshot_full_name, snapshot_email, \
                     snapshot_barangay, snapshot_municipality, snapshot_province, snapshot_contact_number, \
                     snapshot_valid_id, snapshot_selfie_with_id, created_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
                )
                .bind(user.id)
                .bind(reason)
                .bind(&user.full_name)
                .bind(&user.email)
                .bind(&user.barangay)
                .bind(&user.municipality)
                .bind(&user.province)
                .bind(&user.contact_number)
                .bind(&user.valid_id)
                .bind(&user.selfie_with_id)
                .bind(now)
                .execute(&mut **tx)
                .await?;
                Ok(())
            }

            /// Tells "no such resident" apart from "resident in the wrong
            /// state" after a conditional update matched nothing.
            async fn resident_miss(&self, user_id: i64, expected: &'static str) -> domains::DomainError {
                let found = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = $1")
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await;
                match found {
                    Ok(Some(role)) if role == domains::Role::Resident.as_str() => {
                        domains::DomainError::InvalidState { entity: "resident", expected }
                    }
                    Ok(_) => domains::DomainError::NotFound("resident"),
                    Err(err) => $crate::sql::db_error(err),
                }
            }
        }

        #[async_trait::async_trait]
        impl domains::UserRepository for $crate::sql::SqlUserRepository<$db> {
            async fn find_by_id(&self, id: i64) -> domains::DomainResult<Option<domains::User>> {
                sqlx::query_as::<_, $crate::sql::rows::UserRow>("SELECT * FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?
                    .map(domains::User::try_from)
                    .transpose()
            }

            async fn find_by_login(
                &self,
                login: &domains::LoginIdentifier,
            ) -> domains::DomainResult<Option<domains::User>> {
                let query = match login {
                    domains::LoginIdentifier::Email(email) => {
                        sqlx::query_as::<_, $crate::sql::rows::UserRow>("SELECT * FROM users WHERE email = $1")
                            .bind(email.as_str())
                    }
                    domains::LoginIdentifier::Username(username) => {
                        sqlx::query_as::<_, $crate::sql::rows::UserRow>("SELECT * FROM users WHERE username = $1")
                            .bind(username.as_str())
                    }
                };
                query
                    .fetch_optional(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?
                    .map(domains::User::try_from)
                    .transpose()
            }

            async fn find_by_email_or_username(
                &self,
                email: &str,
                username: &str,
            ) -> domains::DomainResult<Option<domains::User>> {
                sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "SELECT * FROM users WHERE email = $1 OR username = $2 ORDER BY id LIMIT 1",
                )
                .bind(email)
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?
                .map(domains::User::try_from)
                .transpose()
            }

            async fn create(&self, user: domains::NewUser) -> domains::DomainResult<domains::User> {
                let now = chrono::Utc::now();
                let row = sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "INSERT INTO users (username, full_name, password_hash, email, contact_number, \
                     barangay, municipality, province, valid_id, selfie_with_id, role, status, \
                     is_verified, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
                     RETURNING *",
                )
                .bind(&user.username)
                .bind(&user.full_name)
                .bind(&user.password_hash)
                .bind(&user.email)
                .bind(&user.contact_number)
                .bind(&user.barangay)
                .bind(&user.municipality)
                .bind(&user.province)
                .bind(&user.valid_id)
                .bind(&user.selfie_with_id)
                .bind(user.role.as_str())
                .bind(user.status.as_str())
                .bind(user.is_verified)
                .bind(now)
                .bind(now)
                .fetch_one(&self.pool)
                .await
                .map_err(|err| {
                    if $crate::sql::is_unique_violation(&err) {
                        domains::DomainError::duplicate_account()
                    } else {
                        $crate::sql::db_error(err)
                    }
                })?;
                row.try_into()
            }

            async fn resubmit(
                &self,
                user_id: i64,
                profile: domains::ResidentProfile,
            ) -> domains::DomainResult<domains::User> {
                let mut tx = self.pool.begin().await.map_err($crate::sql::db_error)?;

                let current: domains::User = match sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    concat!("SELECT * FROM users WHERE id = $1", $lock),
                )
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err($crate::sql::db_error)?
                {
                    Some(row) => row.try_into()?,
                    None => return Err(domains::DomainError::NotFound("user")),
                };
                if current.role != domains::Role::Resident || current.status != domains::UserStatus::Denied {
                    return Err(domains::DomainError::InvalidState {
                        entity: "user",
                        expected: "denied",
                    });
                }

                let now = chrono::Utc::now();
                let reason = current.rejection_reason.as_deref().unwrap_or("resubmission");
                Self::snapshot(&mut tx, &current, reason, now)
                    .await
                    .map_err($crate::sql::db_error)?;

                let row = sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "UPDATE users SET username = $1, full_name = $2, password_hash = $3, email = $4, \
                     contact_number = $5, barangay = $6, municipality = $7, province = $8, \
                     valid_id = COALESCE($9, valid_id), selfie_with_id = COALESCE($10, selfie_with_id), \
                     status = 'pending', is_verified = FALSE, rejection_reason = NULL, updated_at = $11 \
                     WHERE id = $12 RETURNING *",
                )
                .bind(&profile.username)
                .bind(&profile.full_name)
                .bind(&profile.password_hash)
                .bind(&profile.email)
                .bind(&profile.contact_number)
                .bind(&profile.barangay)
                .bind(&profile.municipality)
                .bind(&profile.province)
                .bind(&profile.valid_id)
                .bind(&profile.selfie_with_id)
                .bind(now)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|err| {
                    if $crate::sql::is_unique_violation(&err) {
                        domains::DomainError::duplicate_account()
                    } else {
                        $crate::sql::db_error(err)
                    }
                })?;

                tx.commit().await.map_err($crate::sql::db_error)?;
                row.try_into()
            }

            async fn approve_resident(&self, user_id: i64) -> domains::DomainResult<domains::User> {
                let row = sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "UPDATE users SET status = 'approved', is_verified = TRUE, rejection_reason = NULL, \
                     updated_at = $1 \
                     WHERE id = $2 AND role = 'resident' AND status = 'pending' RETURNING *",
                )
                .bind(chrono::Utc::now())
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                match row {
                    Some(row) => row.try_into(),
                    None => Err(self.resident_miss(user_id, "pending").await),
                }
            }

            async fn reject_resident(&self, user_id: i64, reason: &str) -> domains::DomainResult<domains::User> {
                let mut tx = self.pool.begin().await.map_err($crate::sql::db_error)?;

                let current: domains::User = match sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    concat!("SELECT * FROM users WHERE id = $1 AND role = 'resident'", $lock),
                )
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err($crate::sql::db_error)?
                {
                    Some(row) => row.try_into()?,
                    None => return Err(domains::DomainError::NotFound("resident")),
                };
                if current.status != domains::UserStatus::Pending {
                    return Err(domains::DomainError::InvalidState {
                        entity: "resident",
                        expected: "pending",
                    });
                }

                let now = chrono::Utc::now();
                Self::snapshot(&mut tx, &current, reason, now)
                    .await
                    .map_err($crate::sql::db_error)?;

                let row = sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "UPDATE users SET status = 'denied', is_verified = FALSE, rejection_reason = $1, \
                     updated_at = $2 WHERE id = $3 RETURNING *",
                )
                .bind(reason)
                .bind(now)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err($crate::sql::db_error)?;

                tx.commit().await.map_err($crate::sql::db_error)?;
                row.try_into()
            }

            async fn rejection_history(&self, user_id: i64) -> domains::DomainResult<Vec<domains::UserRejection>> {
                let rows = sqlx::query_as::<_, $crate::sql::rows::UserRejectionRow>(
                    "SELECT * FROM user_rejections WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                Ok(rows.into_iter().map(Into::into).collect())
            }

            async fn list_pending_residents(&self) -> domains::DomainResult<Vec<domains::User>> {
                let rows = sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "SELECT * FROM users WHERE role = 'resident' AND status = 'pending' \
                     ORDER BY created_at ASC, id ASC",
                )
                .fetch_all(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                $crate::sql::rows::convert_all(rows)
            }

            async fn list_users(
                &self,
                filter: domains::UserFilter,
                page: domains::PageRequest,
            ) -> domains::DomainResult<domains::Paginated<domains::User>> {
                fn push_filter<'a>(qb: &mut sqlx::QueryBuilder<'a, $db>, filter: &'a domains::UserFilter) {
                    qb.push(" FROM users WHERE 1 = 1");
                    if let Some(role) = filter.role {
                        qb.push(" AND role = ").push_bind(role.as_str());
                    }
                    if let Some(verified) = filter.verified {
                        qb.push(" AND is_verified = ").push_bind(verified);
                    }
                }

                let mut count = sqlx::QueryBuilder::<$db>::new("SELECT COUNT(*)");
                push_filter(&mut count, &filter);
                let total: i64 = count
                    .build_query_scalar::<i64>()
                    .fetch_one(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?;

                let mut select = sqlx::QueryBuilder::<$db>::new("SELECT *");
                push_filter(&mut select, &filter);
                select
                    .push(" ORDER BY created_at DESC, id DESC LIMIT ")
                    .push_bind(i64::from(page.limit))
                    .push(" OFFSET ")
                    .push_bind(page.offset());
                let rows = select
                    .build_query_as::<$crate::sql::rows::UserRow>()
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

            async fn list_admins(&self) -> domains::DomainResult<Vec<domains::User>> {
                let rows = sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "SELECT * FROM users WHERE role = 'admin' ORDER BY created_at DESC, id DESC",
                )
                .fetch_all(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                $crate::sql::rows::convert_all(rows)
            }

            async fn count_admins(&self) -> domains::DomainResult<i64> {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                    .fetch_one(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)
            }

            async fn delete_admin(&self, admin_id: i64) -> domains::DomainResult<bool> {
                let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = 'admin'")
                    .bind(admin_id)
                    .execute(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?;
                Ok(result.rows_affected() > 0)
            }

            async fn update_profile(
                &self,
                user_id: i64,
                update: domains::ProfileUpdate,
            ) -> domains::DomainResult<Option<domains::User>> {
                sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "UPDATE users SET full_name = COALESCE($1, full_name), \
                     barangay = COALESCE($2, barangay), \
                     contact_number = COALESCE($3, contact_number), updated_at = $4 \
                     WHERE id = $5 RETURNING *",
                )
                .bind(&update.full_name)
                .bind(&update.barangay)
                .bind(&update.contact_number)
                .bind(chrono::Utc::now())
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?
                .map(domains::User::try_from)
                .transpose()
            }

            async fn set_profile_picture(
                &self,
                user_id: i64,
                reference: &str,
            ) -> domains::DomainResult<Option<domains::User>> {
                sqlx::query_as::<_, $crate::sql::rows::UserRow>(
                    "UPDATE users SET profile_picture = $1, updated_at = $2 WHERE id = $3 RETURNING *",
                )
                .bind(reference)
                .bind(chrono::Utc::now())
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err($crate::sql::db_error)?
                .map(domains::User::try_from)
                .transpose()
            }

            async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> domains::DomainResult<bool> {
                let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
                    .bind(password_hash)
                    .bind(chrono::Utc::now())
                    .bind(user_id)
                    .execute(&self.pool)
                    .await
                    .map_err($crate::sql::db_error)?;
                Ok(result.rows_affected() > 0)
            }

            async fn dashboard_stats(&self) -> domains::DomainResult<domains::DashboardStats> {
                let row = sqlx::query_as::<_, $crate::sql::rows::StatsRow>(
                    "SELECT \
                     COALESCE(SUM(CASE WHEN role = 'resident' AND status = 'pending' THEN 1 ELSE 0 END), 0) \
                         AS pending_verifications, \
                     COALESCE(SUM(CASE WHEN role = 'resident' AND status = 'approved' THEN 1 ELSE 0 END), 0) \
                         AS approved_residents, \
                     COALESCE(SUM(CASE WHEN role = 'resident' AND status = 'denied' THEN 1 ELSE 0 END), 0) \
                         AS rejected_residents, \
                     COALESCE(SUM(CASE WHEN role = 'resident' THEN 1 ELSE 0 END), 0) AS total_residents, \
                     COALESCE(SUM(CASE WHEN role = 'admin' THEN 1 ELSE 0 END), 0) AS total_admins \
                     FROM users",
                )
                .fetch_one(&self.pool)
                .await
                .map_err($crate::sql::db_error)?;
                Ok(row.into())
            }
        }
    };
}

pub(crate) use impl_user_repository;
