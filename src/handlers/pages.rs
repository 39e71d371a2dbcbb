//! Static page handlers

use crate::middleware::session::Visitor;
use crate::views::{pages, Page};

pub async fn index(visitor: Visitor) -> Page {
    Page(pages::index(&visitor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::session::UserContext;

    #[test]
    fn test_index_greets_logged_in_user() {
        let visitor = Visitor {
            user: Some(UserContext { user_id: uuid::Uuid::nil(), username: "정하은".to_string() }),
            flash: None,
        };

        let Page(html) = tokio_test::block_on(index(visitor));
        assert!(html.contains("정하은"));
        assert!(!html.contains("action=\"/signup\""));
    }
}
