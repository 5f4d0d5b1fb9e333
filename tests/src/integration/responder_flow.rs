//! # Responder Flows
//!
//! What a peer does with calls it receives:
//!
//! - authorized calls are queued for the application, with their chain
//! - calls its own session view does not allow are answered with an error
//! - answers on topics it has no settled session for are refused
//! - calls arriving while its queue is full are answered with an error

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{
        peers, peers_with, peers_with_config, permissions, ACCOUNT, CHAIN,
    };
    use serde_json::json;
    use session_rpc::{
        codes, ClientConfig, RequestArguments, RequestError, RequestParams, SessionRpcApi,
    };
    use shared_types::{JsonRpcResponse, RequestId, SessionPermissions, Topic};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_incoming_request_is_queued_with_chain() -> anyhow::Result<()> {
        let p = peers()?;
        let requester = Arc::clone(&p.requester);
        let params = RequestParams::new(
            p.topic.clone(),
            RequestArguments::new("eth_sign").with_params(json!([ACCOUNT, "0xdeadbeef"])),
        )
        .on_chain(CHAIN);
        let call = tokio::spawn(async move { requester.request(params).await });

        let incoming = timeout(Duration::from_secs(5), p.responder.next_request())
            .await?
            .ok_or_else(|| anyhow::anyhow!("responder queue closed"))?;

        assert_eq!(incoming.topic, p.topic);
        assert_eq!(incoming.chain_id.as_deref(), Some(CHAIN));
        assert_eq!(incoming.request.method, "eth_sign");
        assert_eq!(incoming.request.params, json!([ACCOUNT, "0xdeadbeef"]));

        p.responder
            .respond(
                &incoming.topic,
                JsonRpcResponse::result(incoming.request.id, json!("0xsignature")),
            )
            .await?;

        let signature = timeout(Duration::from_secs(5), call).await???;
        assert_eq!(signature, json!("0xsignature"));
        Ok(())
    }

    #[tokio::test]
    async fn test_request_outside_responder_permissions_is_answered_with_error(
    ) -> anyhow::Result<()> {
        // The requester believes personal_sign is allowed; the responder does not
        let p = peers_with(
            SessionPermissions::new(["eth_accounts", "personal_sign"], [CHAIN]),
            permissions(),
        )?;
        let params = RequestParams::new(p.topic.clone(), RequestArguments::new("personal_sign"))
            .on_chain(CHAIN);

        let err = timeout(Duration::from_secs(5), p.requester.request(params))
            .await?
            .unwrap_err();

        assert!(matches!(err, RequestError::Remote(_)));
        assert_eq!(err.code(), codes::UNAUTHORIZED_METHOD);
        assert_eq!(
            err.to_string(),
            "Unauthorized JSON-RPC Method Requested: personal_sign"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_request_for_unsettled_topic_is_ignored() -> anyhow::Result<()> {
        let p = peers()?;
        p.responder_store.delete(&p.topic);

        let params = RequestParams::new(p.topic.clone(), RequestArguments::new("eth_accounts"))
            .on_chain(CHAIN)
            .with_timeout(Duration::from_millis(200));
        let err = p.requester.request(params).await.unwrap_err();

        assert!(matches!(err, RequestError::Timeout { .. }));
        assert!(timeout(Duration::from_millis(50), p.responder.next_request())
            .await
            .is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_respond_on_unknown_topic_is_refused() -> anyhow::Result<()> {
        let p = peers()?;
        let unknown = Topic::generate();

        let err = p
            .responder
            .respond(&unknown, JsonRpcResponse::result(RequestId::next(), json!(null)))
            .await
            .unwrap_err();

        assert_eq!(err, RequestError::session_not_found(&unknown));
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_stops_inbound_processing() -> anyhow::Result<()> {
        let p = peers()?;
        p.responder.shutdown();
        assert!(!p.responder.is_running());

        let params = RequestParams::new(p.topic.clone(), RequestArguments::new("eth_accounts"))
            .on_chain(CHAIN)
            .with_timeout(Duration::from_millis(200));
        let err = p.requester.request(params).await.unwrap_err();

        assert!(matches!(err, RequestError::Timeout { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_full_incoming_queue_rejects_without_blocking_responses() -> anyhow::Result<()> {
        let mut config = ClientConfig::default();
        config.relay.incoming_buffer = 1;
        let p = peers_with_config(config)?;
        let accounts = || {
            RequestParams::new(p.topic.clone(), RequestArguments::new("eth_accounts"))
                .on_chain(CHAIN)
        };

        // The requester's application never reads its queue: one call fills
        // it and the other is turned away
        let call = || {
            let responder = Arc::clone(&p.responder);
            let params = accounts();
            tokio::spawn(async move { responder.request(params).await })
        };
        let (mut a, mut b) = (call(), call());
        let rejected = timeout(Duration::from_secs(5), async {
            tokio::select! {
                r = &mut a => r,
                r = &mut b => r,
            }
        })
        .await??;

        let err = rejected.unwrap_err();
        assert!(matches!(err, RequestError::Remote(_)));
        assert_eq!(err.code(), codes::LIMIT_EXCEEDED);

        // Responses addressed to the requester are still routed
        let answering = Arc::clone(&p.responder);
        let _answer = tokio::spawn(async move {
            if let Some(incoming) = answering.next_request().await {
                let response = JsonRpcResponse::result(incoming.request.id, json!([ACCOUNT]));
                let _ = answering.respond(&incoming.topic, response).await;
            }
        });
        let result = timeout(Duration::from_secs(5), p.requester.request(accounts())).await??;
        assert_eq!(result, json!([ACCOUNT]));
        Ok(())
    }
}
