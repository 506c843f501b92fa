//! 持久化投递决策（PersistentHandler）
//!
//! 对每条入站消息按（主题是否受理，fly，commit）分类，自上而下匹配：
//!
//! | 主题受理 | fly | commit | 动作 |
//! |---|---|---|---|
//! | 否 | - | - | 回执失败 "UnSupport Topic Message!"，不持久化、不投递 |
//! | 是 | 是 | 是 | 回执成功 "FLY NO NEED SAVE"，不持久化，发起投递 |
//! | 是 | 是 | 否 | 回执失败 "FLY MUST BE COMMITTED !"，不持久化、不投递 |
//! | 是 | 否 | 是 | 持久化，按结果回执；成功则发起投递 |
//! | 是 | 否 | 否 | 持久化，按结果回执；成功则发送事务状态 ACK |
//!
//! 同一条消息的存储结果回执总是先于投递或事务 ACK 转发。
//!
use crate::ack::{
    FEEDBACK_FLY_MUST_BE_COMMITTED, FEEDBACK_FLY_NO_NEED_SAVE, FEEDBACK_UNSUPPORTED_TOPIC,
    build_store_ack, build_tx_ack,
};
use crate::config::PersistentHandlerConfig;
use crate::dispatcher::DeliveryDispatcher;
use crate::topic::TopicFilter;
use async_trait::async_trait;
use bon::bon;
use kite_domain::error::{KiteError, KiteResult};
use kite_domain::pipeline::{
    DeliverPreEvent, Forwarder, PersistentEvent, PipelineEvent, PipelineHandler, RemotingEvent,
};
use kite_domain::protocol::{MessageEntity, Packet};
use kite_domain::stat::{FlowCounter, FlowRecorder};
use kite_domain::store::KiteStore;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span, warn};

pub struct PersistentHandler {
    name: String,
    topics: TopicFilter,
    store: Arc<dyn KiteStore>,
    forwarder: Arc<dyn Forwarder>,
    flow_stat: Arc<dyn FlowRecorder>,
    dispatcher: DeliveryDispatcher,
}

#[bon]
impl PersistentHandler {
    #[builder]
    pub fn new(
        config: PersistentHandlerConfig,
        store: Arc<dyn KiteStore>,
        forwarder: Arc<dyn Forwarder>,
        flow_stat: Arc<dyn FlowRecorder>,
    ) -> KiteResult<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.max_deliver_worker)
            .ok_or_else(|| KiteError::invalid_config("max_deliver_worker must be positive"))?;

        let dispatcher = DeliveryDispatcher::new(capacity, flow_stat.clone())?;

        Ok(Self {
            name: config.name,
            topics: TopicFilter::new(config.topics),
            store,
            forwarder,
            flow_stat,
            dispatcher,
        })
    }
}

impl PersistentHandler {
    pub fn topics(&self) -> &TopicFilter {
        &self.topics
    }

    pub fn dispatcher(&self) -> &DeliveryDispatcher {
        &self.dispatcher
    }

    async fn handle(&self, event: PersistentEvent) {
        let (entity, opaque, remote_client) = event.into_parts();
        let Some(entity) = entity else {
            debug!(opaque, "persistent event without entity, skipped");
            return;
        };
        let target = remote_client.remote_addr();

        if !self.topics.is_served(entity.topic()) {
            warn!(
                message_id = entity.message_id(),
                topic = entity.topic(),
                "unsupported topic"
            );
            let ack = build_store_ack(
                opaque,
                entity.message_id(),
                false,
                FEEDBACK_UNSUPPORTED_TOPIC,
            );
            self.reply(ack, target).await;
            return;
        }

        let (fly, commit) = (entity.header().fly(), entity.header().commit());
        match (fly, commit) {
            (true, true) => {
                debug!(
                    message_id = entity.message_id(),
                    "fly message, deliver without save"
                );
                let ack = build_store_ack(
                    opaque,
                    entity.message_id(),
                    true,
                    FEEDBACK_FLY_NO_NEED_SAVE,
                );
                self.reply(ack, target).await;
                self.deliver(entity).await;
            }
            (true, false) => {
                warn!(message_id = entity.message_id(), "fly message is not committed");
                let ack = build_store_ack(
                    opaque,
                    entity.message_id(),
                    false,
                    FEEDBACK_FLY_MUST_BE_COMMITTED,
                );
                self.reply(ack, target).await;
            }
            (false, _) => self.persist(opaque, entity, target).await,
        }
    }

    /// 非 fly 消息：持久化后回执，再按提交状态投递或发送事务 ACK
    async fn persist(&self, opaque: i32, entity: MessageEntity, target: &str) {
        let succ = self.store.save(&entity).await;
        self.reply(build_store_ack(opaque, entity.message_id(), succ, ""), target)
            .await;

        if !succ {
            warn!(message_id = entity.message_id(), "persist message failed");
            return;
        }

        if entity.header().commit() {
            debug!(message_id = entity.message_id(), "saved committed message");
            self.deliver(entity).await;
        } else {
            debug!(
                message_id = entity.message_id(),
                "saved uncommitted message, tx check"
            );
            let header = entity.header().clone();
            self.reply(build_tx_ack(header), target).await;
        }
    }

    async fn reply(&self, packet: Packet, target: &str) {
        let event = RemotingEvent::new(packet, vec![target.to_string()]);
        if let Err(err) = self.forwarder.forward(event.into()).await {
            warn!(remote = target, error = %err, "forward ack failed");
        }
    }

    async fn deliver(&self, entity: MessageEntity) {
        let event = DeliverPreEvent::from_entity(entity);
        let message_id = event.message_id().to_string();
        self.flow_stat.incr(FlowCounter::DeliverFlow, 1);

        let forwarder = self.forwarder.clone();
        let task_message_id = message_id.clone();
        let mode = self
            .dispatcher
            .dispatch(async move {
                if let Err(err) = forwarder.forward(event.into()).await {
                    warn!(
                        message_id = %task_message_id,
                        error = %err,
                        "forward deliver event failed"
                    );
                }
            })
            .await;
        debug!(message_id = %message_id, ?mode, "delivery dispatched");
    }
}

#[async_trait]
impl PipelineHandler for PersistentHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self, event: &PipelineEvent) -> bool {
        matches!(event, PipelineEvent::Persistent(_))
    }

    async fn process(&self, event: PipelineEvent) -> KiteResult<()> {
        if !self.accepts(&event) {
            return Err(KiteError::InvalidEventType {
                expected: "persistent",
                found: event.kind(),
            });
        }

        if let PipelineEvent::Persistent(event) = event {
            let span = info_span!(
                "persistent_handler",
                handler = %self.name,
                opaque = event.opaque()
            );
            self.handle(event).instrument(span).await;
        }
        Ok(())
    }
}
