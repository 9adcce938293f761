//! Blog posts scoped to an identity.
use crate::error::AppError;
use crate::storage::{DocumentStore, Query};
use crate::validation::non_empty;
use blog_common::{BlogPost, Document, Pid};
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use uuid::Uuid;

pub struct BlogService<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> BlogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Store a new post owned by `pid`, stamped with the current time.
    pub async fn create_post(
        &self,
        pid: Pid,
        title: &str,
        content: &str,
    ) -> Result<BlogPost, AppError> {
        let title = non_empty(title, "title")?;
        let content = non_empty(content, "content")?;

        let post = BlogPost {
            pid,
            title: title.to_string(),
            content: content.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        let document = Document::Blog(post.clone());

        self.store
            .insert(&Uuid::new_v4().to_string(), serde_json::to_value(&document)?, None)
            .await?;

        counter!(crate::metrics::POST_CREATED).increment(1);
        tracing::info!(%pid, "blog post created");
        Ok(post)
    }

    /// All posts owned by `pid`, in store order.
    pub async fn list_posts(&self, pid: Pid) -> Result<Vec<BlogPost>, AppError> {
        let query = Query::new()
            .field_eq("type", "blog")
            .field_eq("pid", pid.to_string());

        let mut posts = Vec::new();
        for value in self.store.query(&query).await? {
            if let Document::Blog(post) = serde_json::from_value::<Document>(value)? {
                posts.push(post);
            }
        }
        Ok(posts)
    }
}
