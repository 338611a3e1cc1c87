use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::posts::{
    create_post, delete_all_posts, delete_post, get_post, list_posts, update_post,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_posts).post(create_post).delete(delete_all_posts),
        )
        .route(
            "/{id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
}
