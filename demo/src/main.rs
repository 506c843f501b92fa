use anyhow::Result;
use futures_util::StreamExt;
use kite_domain::pipeline::{
    ChannelForwarder, PersistentEvent, PipelineEvent, PipelineHandler, RemoteAddr, RemoteClient,
};
use kite_domain::protocol::{Header, MessageEntity, PacketPayload};
use kite_domain::stat::FlowStat;
use kite_domain::store::InMemoryKiteStore;
use kite_handler::{PersistentHandler, PersistentHandlerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"{
    "name": "persistent",
    "topics": ["trade", "orders"],
    "max_deliver_worker": 2
}"#;

fn describe(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::Remoting(remoting) => match remoting.packet().payload() {
            PacketPayload::StoreAck(ack) => format!(
                "store-ack  -> {:?} opaque={} id={} ok={} feedback={:?}",
                remoting.targets(),
                remoting.packet().opaque(),
                ack.message_id(),
                ack.status(),
                ack.feedback()
            ),
            PacketPayload::TxAck(ack) => format!(
                "tx-ack     -> {:?} id={} status={:?} reason={:?}",
                remoting.targets(),
                ack.header().message_id(),
                ack.status(),
                ack.feedback()
            ),
        },
        PipelineEvent::DeliverPre(deliver) => format!(
            "deliver    -> id={} topic={}",
            deliver.message_id(),
            deliver.header().topic()
        ),
        PipelineEvent::Persistent(_) => "persistent (unexpected)".to_string(),
    }
}

fn message(id: &str, topic: &str, fly: bool, commit: bool) -> MessageEntity {
    let header = Header::builder()
        .message_id(id)
        .topic(topic)
        .message_type("pay-succ")
        .group_id("s-mts-demo")
        .fly(fly)
        .commit(commit)
        .build();
    MessageEntity::new(header, "{\"amount\":100}")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = PersistentHandlerConfig::from_json_str(CONFIG)?;
    let store = Arc::new(InMemoryKiteStore::new());
    let stat = Arc::new(FlowStat::new());
    let (forwarder, mut outbound) = ChannelForwarder::channel();

    let printer = tokio::spawn(async move {
        while let Some(event) = outbound.next().await {
            println!("{}", describe(&event));
        }
    });

    let handler = PersistentHandler::builder()
        .config(config)
        .store(store.clone())
        .forwarder(Arc::new(forwarder))
        .flow_stat(stat.clone())
        .build()?;

    let remote: Arc<dyn RemoteClient> = Arc::new(RemoteAddr::new("127.0.0.1:13800"));
    let inbound = [
        message("m-unknown", "unknown", false, true),
        message("m-fly", "orders", true, true),
        message("m-fly-tx", "orders", true, false),
        message("m-commit", "trade", false, true),
        message("m-tx", "trade", false, false),
    ];

    for (opaque, entity) in (1..).zip(inbound) {
        let event = PersistentEvent::new(Some(entity), opaque, remote.clone());
        handler.process(event.into()).await?;
    }

    store.set_failing(true);
    let event = PersistentEvent::new(Some(message("m-fail", "trade", false, true)), 99, remote);
    handler.process(event.into()).await?;

    handler.dispatcher().wait_idle().await;
    tracing::info!(stored = store.len(), "all deliveries finished");
    drop(handler);
    printer.await?;

    println!("flow: {}", serde_json::to_string(&stat.snapshot())?);
    Ok(())
}
