pub mod default_routers;
pub mod error_responses;
pub mod http_serve;
pub mod routers;

#[cfg(test)]
pub(crate) mod test_support;
