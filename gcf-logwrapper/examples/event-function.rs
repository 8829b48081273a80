use gcf_logwrapper::{InvocationContext, Json, Severity, WrappedLogger};

/// A background function triggered by a Pub/Sub message.
fn on_message(body: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let context = InvocationContext::from_event_body(body)?;
    let logger = WrappedLogger::from_context(&context, "pubsub-consumer")?;

    if let Some(metadata) = context.metadata() {
        logger.info(Json(&metadata));
    }
    logger.log(Severity::Notice, "message processed");
    logger.flush()?;
    Ok(())
}

fn main() {
    let body = br#"{
        "context": {
            "eventId": "1234567890",
            "timestamp": "2024-03-01T12:00:00.000Z",
            "eventType": "google.pubsub.topic.publish",
            "resource": {"service": "pubsub.googleapis.com", "name": "projects/p/topics/orders"}
        },
        "data": {"data": "aGVsbG8="}
    }"#;

    if let Err(e) = on_message(body) {
        eprintln!("failed: {e}");
    }
}
