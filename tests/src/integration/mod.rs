//! # Integration Tests
//!
//! Two peers, each with its own session store and client, talk over one
//! shared in-memory relay. Both stores hold the same settled session, the
//! way both sides of a pairing do after settlement.

pub mod request_flow;
pub mod responder_flow;

#[cfg(test)]
pub(crate) mod fixtures {
    use relay_bus::InMemoryRelay;
    use session_rpc::{ClientConfig, InMemorySessionStore, SessionRpcClient};
    use shared_types::{Session, SessionPermissions, Topic};
    use std::sync::Arc;

    pub const CHAIN: &str = "eip155:1";
    pub const ACCOUNT: &str = "0x1456225dE90927193F7A171E64a600416f96f2C8";

    pub struct Peers {
        pub relay: Arc<InMemoryRelay>,
        pub topic: Topic,
        pub requester_store: Arc<InMemorySessionStore>,
        pub responder_store: Arc<InMemorySessionStore>,
        pub requester: Arc<SessionRpcClient>,
        pub responder: Arc<SessionRpcClient>,
    }

    pub fn permissions() -> SessionPermissions {
        SessionPermissions::new(["eth_accounts", "eth_sign"], [CHAIN])
    }

    /// Both peers settled on the same topic with the same permissions.
    pub fn peers() -> anyhow::Result<Peers> {
        peers_with(permissions(), permissions())
    }

    /// Peers whose local view of the session permissions differs.
    pub fn peers_with(
        requester_permissions: SessionPermissions,
        responder_permissions: SessionPermissions,
    ) -> anyhow::Result<Peers> {
        build(
            ClientConfig::default(),
            requester_permissions,
            responder_permissions,
        )
    }

    /// Default permissions, with `config` for the requester. The relay is
    /// built from the requester's relay settings.
    pub fn peers_with_config(config: ClientConfig) -> anyhow::Result<Peers> {
        build(config, permissions(), permissions())
    }

    fn build(
        requester_config: ClientConfig,
        requester_permissions: SessionPermissions,
        responder_permissions: SessionPermissions,
    ) -> anyhow::Result<Peers> {
        crate::init_tracing();

        let relay = Arc::new(requester_config.relay.build_relay());
        let topic = Topic::generate();

        let requester_store = Arc::new(InMemorySessionStore::new());
        requester_store.settle(Session::settled(topic.clone(), requester_permissions));
        let responder_store = Arc::new(InMemorySessionStore::new());
        responder_store.settle(Session::settled(topic.clone(), responder_permissions));

        let requester = SessionRpcClient::connect_relay(
            requester_config,
            Arc::clone(&requester_store),
            Arc::clone(&relay),
        )?;
        let responder = SessionRpcClient::connect_relay(
            ClientConfig::default(),
            Arc::clone(&responder_store),
            Arc::clone(&relay),
        )?;

        Ok(Peers {
            relay,
            topic,
            requester_store,
            responder_store,
            requester: Arc::new(requester),
            responder: Arc::new(responder),
        })
    }
}
