pub(crate) mod cors;
