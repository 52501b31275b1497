use hyper::{
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use serde_json::Value;
use std::{convert::Infallible, future::Future, net::SocketAddr};

/// Starts an in-process HTTP endpoint for a test and returns its url.
///
/// The handler receives each request body decoded as JSON and produces the status and body of
/// the response. The endpoint is bound to an OS-assigned port so tests never collide.
///
/// # Arguments
/// * `handler` - The function producing the response for each request
///
/// # Returns
/// * `String` - The url of the endpoint
pub fn serve<F, Fut>(handler: F) -> String
where
    F: Fn(Value) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (StatusCode, String)> + Send + 'static,
{
    let make_svc = make_service_fn(move |_| {
        let handler = handler.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let handler = handler.clone();
                async move {
                    let body = hyper::body::to_bytes(req.into_body()).await?;
                    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                    let (status, body) = handler(value).await;
                    Ok::<_, hyper::Error>(
                        Response::builder()
                            .status(status)
                            .header("content-type", "application/json")
                            .body(Body::from(body))
                            .expect("valid response"),
                    )
                }
            }))
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = Server::bind(&addr).serve(make_svc);
    let url = format!("http://{}", server.local_addr());
    tokio::spawn(server);
    url
}

/// Builds a success response body echoing the given id
pub fn result_body(id: &Value, result: Value) -> Value {
    serde_json::json!({"jsonrpc": "2.0", "result": result, "id": id})
}

/// Builds an error response body echoing the given id
pub fn error_body(id: &Value, code: i64, message: &str) -> Value {
    serde_json::json!({"jsonrpc": "2.0", "error": {"code": code, "message": message}, "id": id})
}
