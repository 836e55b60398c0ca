//! Database repository for signup, chat, and blog-post operations.
//!
//! Blog mutations enforce ownership with a single conditional statement so
//! the check and the write cannot be separated by a concurrent writer.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    ApplicationStatus, BlogPost, ChatMessage, CreateBlogPostRequest, EarlyAccessEntry,
    EarlyAccessRequest, FarmApplication, FarmApplicationRequest, JoinWaitlistRequest,
    NewsletterSubscriber, PostChatMessageRequest, SubscribeRequest, UpdateBlogPostRequest,
    WaitlistEntry,
};

/// Counts of stored records, for the admin stats endpoint.
#[derive(Debug, Clone, Copy)]
pub struct StoredCounts {
    pub waitlist: i64,
    pub newsletter: i64,
    pub early_access: i64,
    pub farm_applications: i64,
    pub chat_messages: i64,
    pub blog_posts: i64,
}

/// Database repository for all mutable data.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== WAITLIST ====================

    /// Add a waitlist entry. Duplicate emails (case-insensitive) are rejected.
    pub async fn add_waitlist_entry(
        &self,
        request: &JoinWaitlistRequest,
    ) -> Result<WaitlistEntry, AppError> {
        self.check_email_available("waitlist", &request.email).await?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO waitlist (id, name, email, zip_code, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.zip_code)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_or_db("waitlist", e))?;

        Ok(WaitlistEntry {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            zip_code: request.zip_code.clone(),
            created_at: now,
        })
    }

    /// List all waitlist entries, oldest first.
    pub async fn list_waitlist(&self) -> Result<Vec<WaitlistEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, email, zip_code, created_at FROM waitlist ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| WaitlistEntry {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                zip_code: row.get("zip_code"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    // ==================== NEWSLETTER ====================

    /// Subscribe an email to the newsletter. Duplicates are rejected.
    pub async fn add_newsletter_subscriber(
        &self,
        request: &SubscribeRequest,
    ) -> Result<NewsletterSubscriber, AppError> {
        self.check_email_available("newsletter_subscribers", &request.email)
            .await?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO newsletter_subscribers (id, email, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&request.email)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_or_db("newsletter_subscribers", e))?;

        Ok(NewsletterSubscriber {
            id,
            email: request.email.clone(),
            created_at: now,
        })
    }

    /// List all newsletter subscribers, oldest first.
    pub async fn list_newsletter_subscribers(
        &self,
    ) -> Result<Vec<NewsletterSubscriber>, AppError> {
        let rows =
            sqlx::query("SELECT id, email, created_at FROM newsletter_subscribers ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|row| NewsletterSubscriber {
                id: row.get("id"),
                email: row.get("email"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    // ==================== EARLY ACCESS ====================

    /// Add an early-access signup. Duplicate emails are rejected.
    pub async fn add_early_access_entry(
        &self,
        request: &EarlyAccessRequest,
    ) -> Result<EarlyAccessEntry, AppError> {
        self.check_email_available("early_access", &request.email)
            .await?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO early_access (id, name, email, city, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.city)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_or_db("early_access", e))?;

        Ok(EarlyAccessEntry {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            city: request.city.clone(),
            created_at: now,
        })
    }

    /// List all early-access signups, oldest first.
    pub async fn list_early_access(&self) -> Result<Vec<EarlyAccessEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, email, city, created_at FROM early_access ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EarlyAccessEntry {
                id: row.get("id"),
                name: row.get("name"),
                email: row.get("email"),
                city: row.get("city"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    // ==================== FARM APPLICATIONS ====================

    /// Store a farm partnership application with status `pending`.
    pub async fn create_farm_application(
        &self,
        request: &FarmApplicationRequest,
    ) -> Result<FarmApplication, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let status = ApplicationStatus::Pending;

        sqlx::query(
            r#"INSERT INTO farm_applications
                (id, farm_name, contact_name, email, phone, location, products, message, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.farm_name)
        .bind(&request.contact_name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.location)
        .bind(&request.products)
        .bind(&request.message)
        .bind(status.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(FarmApplication {
            id,
            farm_name: request.farm_name.clone(),
            contact_name: request.contact_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            location: request.location.clone(),
            products: request.products.clone(),
            message: request.message.clone(),
            status,
            created_at: now,
        })
    }

    /// List all farm applications, oldest first.
    pub async fn list_farm_applications(&self) -> Result<Vec<FarmApplication>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, farm_name, contact_name, email, phone, location, products, message, status, created_at
               FROM farm_applications ORDER BY created_at"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let status_str: String = row.get("status");
                FarmApplication {
                    id: row.get("id"),
                    farm_name: row.get("farm_name"),
                    contact_name: row.get("contact_name"),
                    email: row.get("email"),
                    phone: row.get("phone"),
                    location: row.get("location"),
                    products: row.get("products"),
                    message: row.get("message"),
                    status: ApplicationStatus::from_str(&status_str)
                        .unwrap_or(ApplicationStatus::Pending),
                    created_at: row.get("created_at"),
                }
            })
            .collect())
    }

    // ==================== CHAT ====================

    /// Append a message to a session log.
    pub async fn add_chat_message(
        &self,
        session_id: &str,
        request: &PostChatMessageRequest,
    ) -> Result<ChatMessage, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, sender, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(session_id)
        .bind(&request.sender)
        .bind(&request.content)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(ChatMessage {
            id,
            session_id: session_id.to_string(),
            sender: request.sender.clone(),
            content: request.content.clone(),
            created_at: now,
        })
    }

    /// Messages for a session in chronological order.
    pub async fn list_chat_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        let rows = sqlx::query(
            "SELECT id, session_id, sender, content, created_at FROM chat_messages WHERE session_id = ? ORDER BY created_at, id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ChatMessage {
                id: row.get("id"),
                session_id: row.get("session_id"),
                sender: row.get("sender"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    // ==================== BLOG POSTS ====================

    /// List all blog posts, newest first.
    pub async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, title, category, content, read_time, owner_id, created_at, updated_at
               FROM blog_posts ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(blog_post_from_row).collect())
    }

    /// Get a blog post by id.
    pub async fn get_blog_post(&self, id: &str) -> Result<Option<BlogPost>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, title, category, content, read_time, owner_id, created_at, updated_at
               FROM blog_posts WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(blog_post_from_row))
    }

    /// Create a blog post with a generated UUID v4 id.
    pub async fn create_blog_post(
        &self,
        request: &CreateBlogPostRequest,
    ) -> Result<BlogPost, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let category = request
            .category
            .clone()
            .unwrap_or_else(|| "general".to_string());

        sqlx::query(
            r#"INSERT INTO blog_posts (id, title, category, content, read_time, owner_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&category)
        .bind(&request.content)
        .bind(request.read_time)
        .bind(&request.owner_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(BlogPost {
            id,
            title: request.title.clone(),
            category,
            content: request.content.clone(),
            read_time: request.read_time,
            owner_id: request.owner_id.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update a blog post, gated on ownership.
    ///
    /// The ownership check and the write are one conditional UPDATE: the row
    /// changes only when it is unowned, the caller's token matches, or the
    /// caller supplies no token at all. `updated_at` is always overwritten.
    pub async fn update_blog_post(
        &self,
        id: &str,
        request: &UpdateBlogPostRequest,
    ) -> Result<BlogPost, AppError> {
        let now = Utc::now().to_rfc3339();

        let result = match &request.owner_id {
            Some(owner) => {
                sqlx::query(
                    r#"UPDATE blog_posts SET
                        title = COALESCE(?, title),
                        category = COALESCE(?, category),
                        content = COALESCE(?, content),
                        read_time = COALESCE(?, read_time),
                        updated_at = ?
                       WHERE id = ? AND (owner_id IS NULL OR owner_id = ?)"#,
                )
                .bind(&request.title)
                .bind(&request.category)
                .bind(&request.content)
                .bind(request.read_time)
                .bind(&now)
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"UPDATE blog_posts SET
                        title = COALESCE(?, title),
                        category = COALESCE(?, category),
                        content = COALESCE(?, content),
                        read_time = COALESCE(?, read_time),
                        updated_at = ?
                       WHERE id = ?"#,
                )
                .bind(&request.title)
                .bind(&request.category)
                .bind(&request.content)
                .bind(request.read_time)
                .bind(&now)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            // Either the post does not exist or another owner holds it.
            return match self.get_blog_post(id).await? {
                Some(_) => Err(AppError::Forbidden(format!(
                    "Blog post {} belongs to another owner",
                    id
                ))),
                None => Err(AppError::NotFound(format!("Blog post {} not found", id))),
            };
        }

        self.get_blog_post(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Blog post {} vanished after update", id)))
    }

    /// Delete a blog post, gated on ownership with the same conditional rule.
    pub async fn delete_blog_post(&self, id: &str, owner_id: Option<&str>) -> Result<(), AppError> {
        let result = match owner_id {
            Some(owner) => {
                sqlx::query(
                    "DELETE FROM blog_posts WHERE id = ? AND (owner_id IS NULL OR owner_id = ?)",
                )
                .bind(id)
                .bind(owner)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query("DELETE FROM blog_posts WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };

        if result.rows_affected() == 0 {
            return match self.get_blog_post(id).await? {
                Some(_) => Err(AppError::Forbidden(format!(
                    "Blog post {} belongs to another owner",
                    id
                ))),
                None => Err(AppError::NotFound(format!("Blog post {} not found", id))),
            };
        }

        Ok(())
    }

    // ==================== STATS ====================

    /// Row counts across all stored tables.
    pub async fn stored_counts(&self) -> Result<StoredCounts, AppError> {
        Ok(StoredCounts {
            waitlist: self.count_table("waitlist").await?,
            newsletter: self.count_table("newsletter_subscribers").await?,
            early_access: self.count_table("early_access").await?,
            farm_applications: self.count_table("farm_applications").await?,
            chat_messages: self.count_table("chat_messages").await?,
            blog_posts: self.count_table("blog_posts").await?,
        })
    }

    async fn count_table(&self, table: &str) -> Result<i64, AppError> {
        // Table names come from the fixed list above, never from input.
        let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Reject an email already present in the given signup table.
    async fn check_email_available(&self, table: &str, email: &str) -> Result<(), AppError> {
        let row = sqlx::query(&format!(
            "SELECT id FROM {} WHERE email = ? COLLATE NOCASE",
            table
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            return Err(AppError::Validation(
                "Email is already registered".to_string(),
            ));
        }
        Ok(())
    }
}

/// Map a unique-index violation on an email column to a validation error.
fn duplicate_or_db(table: &str, err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            tracing::debug!("Duplicate email insert into {}", table);
            AppError::Validation("Email is already registered".to_string())
        }
        _ => AppError::from(err),
    }
}

fn blog_post_from_row(row: &sqlx::sqlite::SqliteRow) -> BlogPost {
    BlogPost {
        id: row.get("id"),
        title: row.get("title"),
        category: row.get("category"),
        content: row.get("content"),
        read_time: row.get("read_time"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
