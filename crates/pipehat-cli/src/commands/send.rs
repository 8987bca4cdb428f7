//! `pipehat send` - transmit message files over MLLP

use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use pipehat_core::{
    Filter, Message, MllpClient, Result, ResultExt, SendOptions, expand_paths,
};
use tracing::{debug, info};

use super::{load_message, parse_filter, passes_filter};

#[allow(clippy::too_many_arguments)]
pub async fn send_command(
    paths: &[String],
    host: String,
    port: u16,
    tls: bool,
    insecure: bool,
    delay: Option<u64>,
    timeout: u64,
    filter: Option<&str>,
) -> Result<usize> {
    let filter = parse_filter(filter)?;
    let files = expand_paths(paths)?;
    let client = MllpClient::new(
        host,
        port,
        SendOptions {
            tls,
            insecure,
            timeout: Duration::from_secs(timeout),
        },
    );
    info!("sending {} file(s) to {}", files.len(), client.endpoint());

    let mut failures = 0;
    let mut first = true;
    for path in &files {
        // Pace sends; receivers commonly throttle tight loops.
        if !first && let Some(ms) = delay {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        first = false;

        match send_one(&client, path, filter.as_ref()).await.log_and_continue() {
            Some(Some(ack)) => {
                println!(
                    "{}: {} {}",
                    path.display(),
                    "ACK".green(),
                    ack_code(&ack)
                );
            }
            Some(None) => {} // filtered out
            None => {
                failures += 1;
                println!("{}: {}", path.display(), "FAILED".red());
            }
        }
    }
    Ok(failures)
}

async fn send_one(
    client: &MllpClient,
    path: &Path,
    filter: Option<&Filter>,
) -> Result<Option<String>> {
    let message = load_message(path)?;
    if !passes_filter(filter, &message, path) {
        return Ok(None);
    }
    let ack = client.send(&message.to_string()).await?;
    debug!("acknowledgment from {}: {:?}", client.endpoint(), ack);
    Ok(Some(ack))
}

/// MSA-1 of the acknowledgment, or its first line when it does not parse.
fn ack_code(ack: &str) -> String {
    if let Ok(parsed) = Message::parse(ack)
        && let Ok(values) = parsed.query("MSA-1")
        && let Some(code) = values.first()
        && !code.is_empty()
    {
        return code.clone();
    }
    ack.split('\r').next().unwrap_or_default().to_string()
}
