use axum::response::Html;

/// Liveness probe
pub async fn health() -> &'static str {
    "OK"
}

/// Landing page listing the telemetry endpoints
pub async fn index() -> Html<&'static str> {
    Html(
        "<!doctype html>\
         <title>Ant colony</title>\
         <h1>Ant colony simulation</h1>\
         <ul>\
         <li><a href=\"/api/stats\">/api/stats</a> live colony counters</li>\
         <li><a href=\"/api/ants\">/api/ants</a> ant positions and health</li>\
         <li><a href=\"/api/best\">/api/best</a> best genome so far</li>\
         </ul>",
    )
}
