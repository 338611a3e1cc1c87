pub(crate) mod page;
pub(crate) mod post_service;
