//! Defines routes for both HTTP surfaces over the storage gateways.
//!
//! ## Structure
//! - **JSON API** (function-style, one gateway call per endpoint)
//!   - `POST/GET    /api/customers`, `GET/DELETE /api/customers/{id}`
//!   - `POST/GET    /api/products`,  `GET/DELETE /api/products/{id}`
//!   - `POST/GET    /api/images`,    `GET/DELETE /api/images/{name}` (base64 upload)
//!   - `POST/GET    /api/contracts`, `GET/DELETE /api/contracts/{name}`
//!   - `GET  /api/queues/{lane}` — peek; `POST .../messages` — send;
//!     `POST .../receive` — lease; `DELETE .../messages/{id}?receipt=`;
//!     `GET .../length`; `POST .../process` — receive one + delete
//!
//! - **HTML pages** (list / form / confirm flows with redirect-after-POST)
//!   - `/customers`, `/products`, `/images`, `/files`, `/queues`
//!
//! `{lane}` is `order` or `inventory`.

use crate::{
    handlers::{
        contract_handlers, customer_handlers,
        health_handlers::{healthz, readyz},
        image_handlers, page_handlers, product_handlers, queue_handlers,
    },
    services::AppState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build and return the router for both surfaces.
///
/// The router carries shared state (`AppState`, one client handle per
/// gateway) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // JSON API: customers + products
        .route(
            "/api/customers",
            post(customer_handlers::add_customer).get(customer_handlers::list_customers),
        )
        .route(
            "/api/customers/{id}",
            get(customer_handlers::get_customer).delete(customer_handlers::delete_customer),
        )
        .route(
            "/api/products",
            post(product_handlers::add_product).get(product_handlers::list_products),
        )
        .route(
            "/api/products/{id}",
            get(product_handlers::get_product).delete(product_handlers::delete_product),
        )
        // JSON API: images + contracts
        .route(
            "/api/images",
            post(image_handlers::upload_image).get(image_handlers::list_images),
        )
        .route(
            "/api/images/{name}",
            get(image_handlers::download_image).delete(image_handlers::delete_image),
        )
        .route(
            "/api/contracts",
            post(contract_handlers::upload_contract).get(contract_handlers::list_contracts),
        )
        .route(
            "/api/contracts/{name}",
            get(contract_handlers::download_contract).delete(contract_handlers::delete_contract),
        )
        // JSON API: queues
        .route("/api/queues/{lane}", get(queue_handlers::peek_messages))
        .route(
            "/api/queues/{lane}/messages",
            post(queue_handlers::send_message),
        )
        .route(
            "/api/queues/{lane}/messages/{id}",
            delete(queue_handlers::delete_message),
        )
        .route(
            "/api/queues/{lane}/receive",
            post(queue_handlers::receive_messages),
        )
        .route(
            "/api/queues/{lane}/process",
            post(queue_handlers::process_message),
        )
        .route("/api/queues/{lane}/length", get(queue_handlers::queue_length))
        // HTML pages
        .route("/", get(page_handlers::home))
        .route(
            "/customers",
            get(page_handlers::customers_page).post(page_handlers::create_customer),
        )
        .route("/customers/new", get(page_handlers::new_customer_page))
        .route(
            "/customers/{id}/delete",
            get(page_handlers::confirm_delete_customer).post(page_handlers::delete_customer),
        )
        .route(
            "/products",
            get(page_handlers::products_page).post(page_handlers::create_product),
        )
        .route("/products/new", get(page_handlers::new_product_page))
        .route(
            "/products/{id}/delete",
            get(page_handlers::confirm_delete_product).post(page_handlers::delete_product),
        )
        .route("/images", get(page_handlers::images_page))
        .route(
            "/images/upload",
            get(page_handlers::upload_image_page).post(page_handlers::upload_image),
        )
        .route(
            "/images/{name}/delete",
            get(page_handlers::confirm_delete_image).post(page_handlers::delete_image),
        )
        .route("/files", get(page_handlers::files_page))
        .route(
            "/files/upload",
            get(page_handlers::upload_file_page).post(page_handlers::upload_file),
        )
        .route("/files/{name}/download", get(page_handlers::download_file))
        .route(
            "/files/{name}/delete",
            get(page_handlers::confirm_delete_file).post(page_handlers::delete_file),
        )
        .route("/queues", get(page_handlers::queues_page))
        .route("/queues/send", get(page_handlers::send_message_page))
        .route(
            "/queues/{lane}/messages",
            get(page_handlers::queue_messages_page),
        )
        .route("/queues/{lane}/send", post(page_handlers::send_message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn app() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        (routes().with_state(state), dir)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn customer_create_list_delete_scenario() {
        let (app, _dir) = app().await;

        // POST a customer and keep the generated identifier.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/customers",
                json!({"name": "Alice", "email": "a@x.com"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        let id = created["customerId"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        // The list includes Alice.
        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/customers"))
            .await
            .unwrap();
        let listed = body_json(response).await;
        let names: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Alice"));

        // Delete by the returned identifier; the list no longer includes her.
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/api/customers/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/customers/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_customer_body_is_rejected() {
        let (app, _dir) = app().await;
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/customers",
                json!({"name": "", "email": ""}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn image_upload_download_roundtrip() {
        let (app, _dir) = app().await;
        let payload = b"fake png bytes";
        let encoded = {
            use base64::{Engine as _, engine::general_purpose};
            general_purpose::STANDARD.encode(payload)
        };

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/images",
                json!({
                    "base64Image": format!("data:image/png;base64,{encoded}"),
                    "fileExtension": ".png",
                    "contentType": "image/png",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded = body_json(response).await;
        let name = uploaded["fileName"].as_str().unwrap().to_string();
        assert_eq!(uploaded["blobUrl"], format!("/api/images/{name}"));

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/images/{name}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], payload);
    }

    #[tokio::test]
    async fn queue_receipt_fencing_over_http() {
        let (app, _dir) = app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/queues/order/messages",
                json!({"message": "order #42"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/queues/order/receive"))
            .await
            .unwrap();
        let received = body_json(response).await;
        let message = &received["messages"][0];
        let id = message["messageId"].as_str().unwrap();
        let receipt = message["receipt"].as_str().unwrap();

        // A different receipt cannot delete the leased message.
        let response = app
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/api/queues/order/messages/{id}?receipt=bogus"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // The real receipt can.
        let response = app
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/api/queues/order/messages/{id}?receipt={receipt}"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/queues/order/length"))
            .await
            .unwrap();
        let length = body_json(response).await;
        assert_eq!(length["approximateLength"], 0);
    }

    #[tokio::test]
    async fn page_create_notifies_order_queue() {
        let (app, _dir) = app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/customers")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "name=Bob&email=b%40x.com&phone=&address=",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/queues/order"))
            .await
            .unwrap();
        let peeked = body_json(response).await;
        assert_eq!(peeked["messageCount"], 1);
        assert_eq!(
            peeked["messages"][0]["messageText"],
            "New customer profile created: Bob"
        );
    }

    #[tokio::test]
    async fn unknown_lane_is_rejected() {
        let (app, _dir) = app().await;
        let response = app
            .oneshot(empty_request("GET", "/api/queues/returns"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_endpoints_respond() {
        let (app, _dir) = app().await;

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/healthz"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", "/readyz"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
