//! Byte-level forwarding between an accepted connection and its outbound.

use crate::config::OutboundKind;
use crate::outbound::OutboundManager;
use crate::router::Router;
use std::io;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Route an accepted connection and relay it to the selected outbound.
pub(crate) async fn dispatch(
    mut stream: TcpStream,
    inbound_tag: &str,
    router: &Router,
    outbounds: &OutboundManager,
) -> io::Result<()> {
    let outbound = match router.pick(inbound_tag) {
        Some(target) => outbounds.get(&target),
        None => outbounds.first(),
    };
    let Some(outbound) = outbound else {
        warn!(
            "no outbound available for inbound '{}', dropping connection",
            inbound_tag
        );
        return Ok(());
    };
    match outbound.kind {
        OutboundKind::Blackhole => Ok(()),
        OutboundKind::Direct { ref address, port } => {
            let mut upstream = TcpStream::connect((address.as_str(), port)).await?;
            let (up, down) = tokio::io::copy_bidirectional(&mut stream, &mut upstream).await?;
            debug!(
                "relay on '{}' via '{}' closed ({} bytes up, {} bytes down)",
                inbound_tag, outbound.tag, up, down
            );
            Ok(())
        }
    }
}
