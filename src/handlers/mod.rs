//! HTTP handlers: the JSON API surface (one gateway call per endpoint) and
//! the server-rendered page surface (list/form/confirm flows with
//! best-effort queue notifications).

pub mod contract_handlers;
pub mod customer_handlers;
pub mod health_handlers;
pub mod image_handlers;
pub mod page_handlers;
pub mod product_handlers;
pub mod queue_handlers;
