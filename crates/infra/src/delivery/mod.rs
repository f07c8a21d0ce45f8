pub mod http_delivery_client;
