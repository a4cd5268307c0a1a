pub mod http_order_client;
pub mod traits;
