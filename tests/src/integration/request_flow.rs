//! # Requester Flows
//!
//! A requester sends calls over the relay and a responder answers them.
//!
//! 1. **Result**: `eth_accounts` resolves with the responder's accounts
//! 2. **Remote error**: the responder's error message reaches the caller unmodified
//! 3. **Fail fast**: unknown topics and unauthorized methods/chains never hit the relay
//! 4. **Deadline**: an unanswered call fails after 30s; a late answer is discarded

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{peers, ACCOUNT, CHAIN};
    use relay_bus::RelayPublisher;
    use serde_json::json;
    use session_rpc::{
        codes, RequestArguments, RequestError, RequestParams, SessionRpcApi, SessionRpcClient,
    };
    use shared_types::{JsonRpcResponse, Topic};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tokio::time::{sleep, timeout, Instant};

    fn accounts_on(topic: &Topic) -> RequestParams {
        RequestParams::new(
            topic.clone(),
            RequestArguments::new("eth_accounts").with_params(json!([])),
        )
        .on_chain(CHAIN)
    }

    /// Answer every incoming request with `answer(method)`.
    fn spawn_responder<F>(client: Arc<SessionRpcClient>, answer: F) -> JoinHandle<()>
    where
        F: Fn(&str, shared_types::RequestId) -> JsonRpcResponse + Send + 'static,
    {
        tokio::spawn(async move {
            while let Some(incoming) = client.next_request().await {
                let response = answer(&incoming.request.method, incoming.request.id);
                if client.respond(&incoming.topic, response).await.is_err() {
                    break;
                }
            }
        })
    }

    // =========================================================================
    // RESULTS
    // =========================================================================

    #[tokio::test]
    async fn test_eth_accounts_resolves_with_result() -> anyhow::Result<()> {
        let p = peers()?;
        let _responder = spawn_responder(Arc::clone(&p.responder), |_, id| {
            JsonRpcResponse::result(id, json!([ACCOUNT]))
        });

        let result = timeout(
            Duration::from_secs(5),
            p.requester.request(accounts_on(&p.topic)),
        )
        .await??;

        assert_eq!(result, json!([ACCOUNT]));
        assert_eq!(p.requester.pending_count(), 0);
        assert_eq!(p.requester.stats().completed(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_remote_error_is_propagated_unmodified() -> anyhow::Result<()> {
        let p = peers()?;
        let _responder = spawn_responder(Arc::clone(&p.responder), |_, id| {
            JsonRpcResponse::error(id, "User rejected the request.")
        });

        let err = timeout(
            Duration::from_secs(5),
            p.requester.request(accounts_on(&p.topic)),
        )
        .await?
        .unwrap_err();

        assert!(matches!(err, RequestError::Remote(_)));
        assert_eq!(err.to_string(), "User rejected the request.");
        assert_eq!(err.code(), codes::SERVER_ERROR);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_correlated() -> anyhow::Result<()> {
        let p = peers()?;
        let _responder = spawn_responder(Arc::clone(&p.responder), |method, id| {
            JsonRpcResponse::result(id, json!({ "method": method, "id": id.as_u64() }))
        });

        let mut calls = Vec::new();
        for method in ["eth_accounts", "eth_sign", "eth_accounts", "eth_sign"] {
            let client = Arc::clone(&p.requester);
            let params =
                RequestParams::new(p.topic.clone(), RequestArguments::new(method)).on_chain(CHAIN);
            calls.push((method, tokio::spawn(async move { client.request(params).await })));
        }

        for (method, call) in calls {
            let value = timeout(Duration::from_secs(5), call).await???;
            assert_eq!(value["method"], json!(method));
        }
        assert_eq!(p.requester.pending_count(), 0);
        assert_eq!(p.requester.stats().completed(), 4);
        Ok(())
    }

    // =========================================================================
    // FAIL FAST
    // =========================================================================

    #[tokio::test]
    async fn test_unknown_topic_is_rejected() -> anyhow::Result<()> {
        let p = peers()?;
        let unknown = Topic::new("invalid")?;

        let err = p.requester.request(accounts_on(&unknown)).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "No matching session settled with topic: invalid"
        );
        assert_eq!(p.relay.messages_published(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unauthorized_method_is_rejected_before_send() -> anyhow::Result<()> {
        let p = peers()?;
        let params = RequestParams::new(p.topic.clone(), RequestArguments::new("random_method"))
            .on_chain(CHAIN);

        let err = p.requester.request(params).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unauthorized JSON-RPC Method Requested: random_method"
        );
        assert_eq!(err.code(), codes::UNAUTHORIZED_METHOD);
        assert_eq!(p.relay.messages_published(), 0);
        assert_eq!(p.requester.stats().registered(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unauthorized_chain_is_rejected_before_send() -> anyhow::Result<()> {
        let p = peers()?;
        let params = RequestParams::new(p.topic.clone(), RequestArguments::new("eth_accounts"))
            .on_chain("eip155:42161");

        let err = p.requester.request(params).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unauthorized Target ChainId Requested: eip155:42161"
        );
        assert_eq!(err.code(), codes::UNAUTHORIZED_CHAIN);
        assert_eq!(p.relay.messages_published(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_session_is_not_found() -> anyhow::Result<()> {
        let p = peers()?;
        p.requester_store.expire(&p.topic);

        let err = p.requester.request(accounts_on(&p.topic)).await.unwrap_err();

        assert_eq!(err, RequestError::session_not_found(&p.topic));
        Ok(())
    }

    // =========================================================================
    // DEADLINES
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_unanswered_request_times_out() -> anyhow::Result<()> {
        let p = peers()?;
        let started = Instant::now();

        // The responder never reads its queue
        let err = p.requester.request(accounts_on(&p.topic)).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "JSON-RPC Request timeout after 30s: eth_accounts"
        );
        assert_eq!(err.code(), codes::TIMEOUT);
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(p.requester.pending_count(), 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_discarded() -> anyhow::Result<()> {
        let p = peers()?;
        let requester = Arc::clone(&p.requester);
        let params = accounts_on(&p.topic);
        let call = tokio::spawn(async move { requester.request(params).await });

        // Take the request but answer only after the deadline
        let incoming = p
            .responder
            .next_request()
            .await
            .ok_or_else(|| anyhow::anyhow!("responder queue closed"))?;

        let err = call.await?.unwrap_err();
        assert_eq!(err, RequestError::timeout("eth_accounts", 30));

        p.responder
            .respond(
                &incoming.topic,
                JsonRpcResponse::result(incoming.request.id, json!([ACCOUNT])),
            )
            .await?;
        sleep(Duration::from_millis(100)).await;

        let stats = p.requester.stats();
        assert_eq!(stats.timeouts(), 1);
        assert_eq!(stats.completed(), 0);
        assert_eq!(p.requester.pending_count(), 0);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_before_deadline_cancels_timer() -> anyhow::Result<()> {
        let p = peers()?;
        let _responder = spawn_responder(Arc::clone(&p.responder), |_, id| {
            JsonRpcResponse::result(id, json!([ACCOUNT]))
        });

        let result = p.requester.request(accounts_on(&p.topic)).await?;
        assert_eq!(result, json!([ACCOUNT]));

        // Well past the original deadline
        sleep(Duration::from_secs(60)).await;
        assert_eq!(p.requester.stats().timeouts(), 0);
        assert_eq!(p.requester.stats().completed(), 1);
        Ok(())
    }
}
