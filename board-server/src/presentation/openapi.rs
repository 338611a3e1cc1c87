use utoipa::OpenApi;

use crate::presentation::handlers::posts::{
    CreatePostDto, IdentityQuery, PostPageDto, PostPageQuery, PostResponseDto, UpdatePostDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::delete_all_posts
    ),
    components(
        schemas(
            CreatePostDto,
            UpdatePostDto,
            IdentityQuery,
            PostPageQuery,
            PostResponseDto,
            PostPageDto
        )
    ),
    tags(
        (name = "posts", description = "Post endpoints")
    )
)]
pub(crate) struct ApiDoc;
