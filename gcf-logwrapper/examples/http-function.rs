use gcf_logwrapper::{Json, WrappedLogger, WrapperError};

#[derive(serde::Deserialize, Debug)]
struct Request {
    name: String,
}

/// An HTTP function: the runtime hands us the request, including the
/// `Function-Execution-Id` header.
fn greet(request: http::Request<Vec<u8>>) -> Result<String, Box<dyn std::error::Error>> {
    let logger = WrappedLogger::from_request(&request, "greeter")?;

    let body: Request = serde_json::from_slice(request.body())?;
    logger.info(format!("Received request: {body:?}"));
    logger.debug(Json(serde_json::json!({ "name_length": body.name.len() })));

    let message = format!("Hello, {}!", body.name);
    logger.flush()?;
    Ok(message)
}

fn main() {
    // Run with GCP_PROJECT, FUNCTION_NAME and FUNCTION_REGION set, plus
    // GOOGLE_OAUTH_ACCESS_TOKEN when not on GCP.
    let request = http::Request::builder()
        .method("POST")
        .header("Function-Execution-Id", "local-execution")
        .body(br#"{"name": "world"}"#.to_vec());
    let Ok(request) = request else {
        eprintln!("could not build request");
        return;
    };

    match greet(request) {
        Ok(message) => println!("{message}"),
        Err(e) => match e.downcast_ref::<WrapperError>() {
            Some(WrapperError::Environment(e)) => eprintln!("not configured: {e}"),
            _ => eprintln!("failed: {e}"),
        },
    }
}
