//! Server-rendered HTML for the back-office pages, built by plain string
//! rendering with escaping. Each function returns a full document.

use crate::models::{
    blob::BlobRecord, customer::CustomerProfile, file::ShareFileInfo, message::QueueLane,
    message::QueueMessage, product::ProductInfo,
};
use chrono::SecondsFormat;

/// Wrap page content in the shared document shell.
fn layout(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">",
            "<title>{title} — Retail Store</title>",
            "<style>",
            "body{{font-family:sans-serif;margin:2rem;max-width:60rem}}",
            "table{{border-collapse:collapse;width:100%}}",
            "th,td{{border:1px solid #ccc;padding:.4rem .6rem;text-align:left}}",
            "nav a{{margin-right:1rem}}",
            ".error{{color:#b00;margin-bottom:1rem}}",
            "</style></head><body>",
            "<nav><a href=\"/\">Home</a><a href=\"/customers\">Customers</a>",
            "<a href=\"/products\">Products</a><a href=\"/images\">Images</a>",
            "<a href=\"/files\">Files</a><a href=\"/queues\">Queues</a></nav>",
            "<h1>{title}</h1>{body}</body></html>"
        ),
        title = html_escape(title),
        body = body
    )
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(msg) => format!("<p class=\"error\">{}</p>", html_escape(msg)),
        None => String::new(),
    }
}

pub fn home_page() -> String {
    layout(
        "Retail back office",
        concat!(
            "<ul>",
            "<li><a href=\"/customers\">Customer profiles</a></li>",
            "<li><a href=\"/products\">Product information</a></li>",
            "<li><a href=\"/images\">Product images</a></li>",
            "<li><a href=\"/files\">Contracts</a></li>",
            "<li><a href=\"/queues\">Queues</a></li>",
            "</ul>"
        ),
    )
}

pub fn customers_page(customers: &[CustomerProfile]) -> String {
    let mut body = String::from("<p><a href=\"/customers/new\">Add customer</a></p>");
    body.push_str("<table><tr><th>Name</th><th>Email</th><th>Phone</th><th>Address</th><th></th></tr>");
    for c in customers {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/customers/{}/delete\">Delete</a></td></tr>",
            html_escape(&c.name),
            html_escape(&c.email),
            html_escape(&c.phone),
            html_escape(&c.address),
            html_escape(&c.row_key),
        ));
    }
    body.push_str("</table>");
    layout("Customers", &body)
}

pub fn customer_form(error: Option<&str>) -> String {
    let body = format!(
        concat!(
            "{}<form method=\"post\" action=\"/customers\">",
            "<p><label>Name <input name=\"name\"></label></p>",
            "<p><label>Email <input name=\"email\" type=\"email\"></label></p>",
            "<p><label>Phone <input name=\"phone\"></label></p>",
            "<p><label>Address <input name=\"address\"></label></p>",
            "<p><button type=\"submit\">Create</button></p></form>"
        ),
        error_banner(error)
    );
    layout("New customer", &body)
}

pub fn confirm_delete_customer(customer: &CustomerProfile) -> String {
    let body = format!(
        concat!(
            "<p>Delete customer <strong>{}</strong> ({})?</p>",
            "<form method=\"post\" action=\"/customers/{}/delete\">",
            "<button type=\"submit\">Delete</button> ",
            "<a href=\"/customers\">Cancel</a></form>"
        ),
        html_escape(&customer.name),
        html_escape(&customer.email),
        html_escape(&customer.row_key),
    );
    layout("Delete customer", &body)
}

pub fn products_page(products: &[ProductInfo]) -> String {
    let mut body = String::from("<p><a href=\"/products/new\">Add product</a></p>");
    body.push_str(
        "<table><tr><th>Name</th><th>Category</th><th>Price</th><th>Stock</th><th>Description</th><th></th></tr>",
    );
    for p in products {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/products/{}/delete\">Delete</a></td></tr>",
            html_escape(&p.name),
            html_escape(&p.category),
            p.price,
            p.stock_quantity,
            html_escape(&p.description),
            html_escape(&p.row_key),
        ));
    }
    body.push_str("</table>");
    layout("Products", &body)
}

pub fn product_form(error: Option<&str>) -> String {
    let body = format!(
        concat!(
            "{}<form method=\"post\" action=\"/products\">",
            "<p><label>Name <input name=\"name\"></label></p>",
            "<p><label>Description <input name=\"description\"></label></p>",
            "<p><label>Price <input name=\"price\" value=\"0\"></label></p>",
            "<p><label>Stock quantity <input name=\"stock_quantity\" value=\"0\"></label></p>",
            "<p><label>Category <input name=\"category\"></label></p>",
            "<p><button type=\"submit\">Create</button></p></form>"
        ),
        error_banner(error)
    );
    layout("New product", &body)
}

pub fn confirm_delete_product(product: &ProductInfo) -> String {
    let body = format!(
        concat!(
            "<p>Delete product <strong>{}</strong> (stock {})?</p>",
            "<form method=\"post\" action=\"/products/{}/delete\">",
            "<button type=\"submit\">Delete</button> ",
            "<a href=\"/products\">Cancel</a></form>"
        ),
        html_escape(&product.name),
        product.stock_quantity,
        html_escape(&product.row_key),
    );
    layout("Delete product", &body)
}

pub fn images_page(blobs: &[BlobRecord]) -> String {
    let mut body = String::from("<p><a href=\"/images/upload\">Upload image</a></p>");
    body.push_str("<table><tr><th>Name</th><th>Type</th><th>Size</th><th>Created</th><th></th></tr>");
    for blob in blobs {
        body.push_str(&format!(
            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/images/{}/delete\">Delete</a></td></tr>",
            html_escape(&blob.url),
            html_escape(&blob.name),
            html_escape(&blob.content_type),
            blob.size_bytes,
            blob.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            html_escape(&blob.name),
        ));
    }
    body.push_str("</table>");
    layout("Product images", &body)
}

pub fn image_upload_form(error: Option<&str>) -> String {
    let body = format!(
        concat!(
            "{}<form method=\"post\" action=\"/images/upload\" enctype=\"multipart/form-data\">",
            "<p><input type=\"file\" name=\"file\" accept=\"image/*\"></p>",
            "<p><button type=\"submit\">Upload</button></p></form>"
        ),
        error_banner(error)
    );
    layout("Upload image", &body)
}

pub fn confirm_delete_image(blob: &BlobRecord) -> String {
    let body = format!(
        concat!(
            "<p>Delete image <strong>{}</strong> ({} bytes)?</p>",
            "<form method=\"post\" action=\"/images/{}/delete\">",
            "<button type=\"submit\">Delete</button> ",
            "<a href=\"/images\">Cancel</a></form>"
        ),
        html_escape(&blob.name),
        blob.size_bytes,
        html_escape(&blob.name),
    );
    layout("Delete image", &body)
}

pub fn files_page(files: &[ShareFileInfo]) -> String {
    let mut body = String::from("<p><a href=\"/files/upload\">Upload contract</a></p>");
    body.push_str("<table><tr><th>Name</th><th>Size</th><th></th><th></th></tr>");
    for file in files {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td>\
             <td><a href=\"/files/{}/download\">Download</a></td>\
             <td><a href=\"/files/{}/delete\">Delete</a></td></tr>",
            html_escape(&file.name),
            file.size_bytes,
            html_escape(&file.name),
            html_escape(&file.name),
        ));
    }
    body.push_str("</table>");
    layout("Contracts", &body)
}

pub fn file_upload_form(error: Option<&str>) -> String {
    let body = format!(
        concat!(
            "{}<form method=\"post\" action=\"/files/upload\" enctype=\"multipart/form-data\">",
            "<p><input type=\"file\" name=\"file\"></p>",
            "<p><button type=\"submit\">Upload</button></p></form>"
        ),
        error_banner(error)
    );
    layout("Upload contract", &body)
}

pub fn confirm_delete_file(name: &str, size_bytes: u64) -> String {
    let body = format!(
        concat!(
            "<p>Delete contract <strong>{}</strong> ({} bytes)?</p>",
            "<form method=\"post\" action=\"/files/{}/delete\">",
            "<button type=\"submit\">Delete</button> ",
            "<a href=\"/files\">Cancel</a></form>"
        ),
        html_escape(name),
        size_bytes,
        html_escape(name),
    );
    layout("Delete contract", &body)
}

pub fn queues_page(order_length: i64, inventory_length: i64) -> String {
    let body = format!(
        concat!(
            "<table><tr><th>Queue</th><th>Approximate length</th><th></th></tr>",
            "<tr><td>order-processing</td><td>{}</td>",
            "<td><a href=\"/queues/order/messages\">View messages</a></td></tr>",
            "<tr><td>inventory-management</td><td>{}</td>",
            "<td><a href=\"/queues/inventory/messages\">View messages</a></td></tr>",
            "</table><p><a href=\"/queues/send\">Send a message</a></p>"
        ),
        order_length, inventory_length
    );
    layout("Queues", &body)
}

pub fn queue_messages_page(lane: QueueLane, messages: &[QueueMessage]) -> String {
    let mut body = String::from(
        "<table><tr><th>Id</th><th>Text</th><th>Inserted</th><th>Dequeued</th></tr>",
    );
    for m in messages {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape(&m.message_id),
            html_escape(&m.message_text),
            m.inserted_on.to_rfc3339_opts(SecondsFormat::Secs, true),
            m.dequeue_count,
        ));
    }
    body.push_str("</table><p><a href=\"/queues\">Back to queues</a></p>");
    layout(&format!("Messages in {}", lane.queue_name()), &body)
}

pub fn send_message_form(error: Option<&str>) -> String {
    let body = format!(
        concat!(
            "{}<form method=\"post\" action=\"/queues/order/send\" id=\"send-form\">",
            "<p><label>Lane <select name=\"lane\" ",
            "onchange=\"document.getElementById('send-form').action='/queues/'+this.value+'/send'\">",
            "<option value=\"order\">order-processing</option>",
            "<option value=\"inventory\">inventory-management</option>",
            "</select></label></p>",
            "<p><label>Message <input name=\"message\" size=\"60\"></label></p>",
            "<p><button type=\"submit\">Send</button></p></form>"
        ),
        error_banner(error)
    );
    layout("Send queue message", &body)
}

pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
