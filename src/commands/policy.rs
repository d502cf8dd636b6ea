//! `policy` command: lifecycle events mapped onto filtering engine operations.
//!
//! Each subcommand builds its parameters, calls exactly one engine operation
//! and reports the boolean result through the message sink. Parameter errors
//! abort before the engine is touched, so a policy is never partially applied.
//! No predecessor-state check happens here; the engine is the authority on
//! whether a transition is acceptable.

use std::sync::Arc;

use crate::config::{
    ARG_DNS, ARG_TUNNEL, MSG_APPLY_FAILURE, MSG_APPLY_SUCCESS, MSG_RESET_FAILURE,
    MSG_RESET_SUCCESS, POLICY_COMMAND_DESCRIPTION, POLICY_COMMAND_NAME, SUBCOMMAND_CONNECTED,
    SUBCOMMAND_CONNECTING, SUBCOMMAND_NET_BLOCKED, SUBCOMMAND_RESET,
};
use crate::engine::FilteringEngine;
use crate::error::PolicyError;

use super::dispatcher::{Handler, SubcommandDispatcher};
use super::logic::{build_relay, build_settings};
use super::{MessageSink, Outcome};

pub struct Policy {
    dispatcher: SubcommandDispatcher<Outcome>,
}

impl Policy {
    pub fn new(engine: Arc<dyn FilteringEngine>, sink: MessageSink) -> Self {
        let mut dispatcher = SubcommandDispatcher::new();

        dispatcher.add_subcommand(SUBCOMMAND_CONNECTING, {
            let engine = Arc::clone(&engine);
            let sink = Arc::clone(&sink);
            Handler::with_arguments(move |arguments| {
                let settings = build_settings(arguments)?;
                let relay = build_relay(arguments)?;

                tracing::info!(
                    "Applying connecting policy: relay={relay}, dhcp={}, lan={}",
                    settings.permit_dhcp,
                    settings.permit_lan
                );
                let success = engine.apply_connecting(&settings, &relay);
                Ok(report_apply(&sink, success))
            })
        });

        dispatcher.add_subcommand(SUBCOMMAND_CONNECTED, {
            let engine = Arc::clone(&engine);
            let sink = Arc::clone(&sink);
            Handler::with_arguments(move |arguments| {
                let settings = build_settings(arguments)?;
                let relay = build_relay(arguments)?;
                let tunnel = arguments.get(ARG_TUNNEL)?;
                let dns = arguments.get(ARG_DNS)?;

                tracing::info!(
                    "Applying connected policy: relay={relay}, tunnel={tunnel}, dns={dns}, dhcp={}, lan={}",
                    settings.permit_dhcp,
                    settings.permit_lan
                );
                let success = engine.apply_connected(&settings, &relay, tunnel, dns);
                Ok(report_apply(&sink, success))
            })
        });

        dispatcher.add_subcommand(SUBCOMMAND_NET_BLOCKED, {
            let engine = Arc::clone(&engine);
            let sink = Arc::clone(&sink);
            Handler::plain(move || {
                tracing::info!("Applying netblocked policy");
                Ok(report_apply(&sink, engine.apply_net_blocked()))
            })
        });

        dispatcher.add_subcommand(
            SUBCOMMAND_RESET,
            Handler::plain(move || {
                tracing::info!("Resetting policy");
                let success = engine.reset();
                Ok(report(&sink, success, MSG_RESET_SUCCESS, MSG_RESET_FAILURE))
            }),
        );

        Self { dispatcher }
    }

    pub fn name(&self) -> &'static str {
        POLICY_COMMAND_NAME
    }

    pub fn description(&self) -> &'static str {
        POLICY_COMMAND_DESCRIPTION
    }

    /// Registered subcommand names, sorted.
    pub fn subcommands(&self) -> Vec<&str> {
        self.dispatcher.subcommands()
    }

    /// Handle `<subcommand> [name=value ...]`.
    pub fn handle_request<S: AsRef<str>>(&self, arguments: &[S]) -> Result<Outcome, PolicyError> {
        let (subcommand, rest) = arguments
            .split_first()
            .ok_or(PolicyError::MissingSubcommand)?;

        self.dispatcher.dispatch(subcommand.as_ref(), rest)
    }
}

fn report_apply(sink: &MessageSink, success: bool) -> Outcome {
    report(sink, success, MSG_APPLY_SUCCESS, MSG_APPLY_FAILURE)
}

fn report(sink: &MessageSink, success: bool, on_success: &str, on_failure: &str) -> Outcome {
    if success {
        sink(on_success);
        Outcome::Success
    } else {
        tracing::warn!("Filtering engine reported failure");
        sink(on_failure);
        Outcome::Failure
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::core::{FilteringSettings, RelayEndpoint, RelayProtocol};

    /// Call-counting engine that answers with a fixed result.
    #[derive(Default)]
    struct MockEngine {
        fail: bool,
        connecting: AtomicUsize,
        connected: AtomicUsize,
        net_blocked: AtomicUsize,
        reset: AtomicUsize,
        last_connected: Mutex<Option<(FilteringSettings, RelayEndpoint, String, String)>>,
    }

    impl MockEngine {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn total_calls(&self) -> usize {
            self.connecting.load(Ordering::SeqCst)
                + self.connected.load(Ordering::SeqCst)
                + self.net_blocked.load(Ordering::SeqCst)
                + self.reset.load(Ordering::SeqCst)
        }
    }

    impl FilteringEngine for MockEngine {
        fn apply_connecting(&self, _: &FilteringSettings, _: &RelayEndpoint) -> bool {
            self.connecting.fetch_add(1, Ordering::SeqCst);
            !self.fail
        }

        fn apply_connected(
            &self,
            settings: &FilteringSettings,
            relay: &RelayEndpoint,
            tunnel: &str,
            dns: &str,
        ) -> bool {
            self.connected.fetch_add(1, Ordering::SeqCst);
            *self.last_connected.lock().unwrap() =
                Some((*settings, relay.clone(), tunnel.to_string(), dns.to_string()));
            !self.fail
        }

        fn apply_net_blocked(&self) -> bool {
            self.net_blocked.fetch_add(1, Ordering::SeqCst);
            !self.fail
        }

        fn reset(&self) -> bool {
            self.reset.fetch_add(1, Ordering::SeqCst);
            !self.fail
        }
    }

    struct Harness {
        engine: Arc<MockEngine>,
        messages: Arc<Mutex<Vec<String>>>,
        policy: Policy,
    }

    fn harness(engine: MockEngine) -> Harness {
        let engine = Arc::new(engine);
        let messages = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&messages);
        let sink: MessageSink = Arc::new(move |msg: &str| {
            captured.lock().unwrap().push(msg.to_string());
        });
        let policy = Policy::new(engine.clone(), sink);
        Harness {
            engine,
            messages,
            policy,
        }
    }

    impl Harness {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    const CONNECTING: &[&str] = &[
        "connecting",
        "dhcp=yes",
        "lan=no",
        "relay=10.0.0.1",
        "port=1194",
        "protocol=udp",
    ];

    #[test]
    fn test_name_and_description() {
        let h = harness(MockEngine::default());
        assert_eq!(h.policy.name(), "policy");
        assert_eq!(h.policy.description(), "Activate and reset policies.");
        assert_eq!(
            h.policy.subcommands(),
            vec!["connected", "connecting", "netblocked", "reset"]
        );
    }

    #[test]
    fn test_missing_subcommand() {
        let h = harness(MockEngine::default());
        let err = h.policy.handle_request::<&str>(&[]).unwrap_err();
        assert_eq!(err, PolicyError::MissingSubcommand);
        assert_eq!(h.engine.total_calls(), 0);
        assert!(h.messages().is_empty());
    }

    #[test]
    fn test_unknown_subcommand_makes_no_engine_call() {
        let h = harness(MockEngine::default());
        let err = h.policy.handle_request(&["disconnect", "dhcp=yes"]).unwrap_err();
        assert_eq!(err, PolicyError::UnknownSubcommand("disconnect".into()));
        assert_eq!(h.engine.total_calls(), 0);
        assert!(h.messages().is_empty());
    }

    #[test]
    fn test_subcommand_names_are_case_sensitive() {
        let h = harness(MockEngine::default());
        let err = h.policy.handle_request(&["Reset"]).unwrap_err();
        assert_eq!(err.kind(), "UnknownSubcommand");
        assert_eq!(h.engine.total_calls(), 0);
    }

    #[test]
    fn test_connecting_applies_policy() {
        let h = harness(MockEngine::default());
        assert_eq!(h.policy.handle_request(CONNECTING).unwrap(), Outcome::Success);
        assert_eq!(h.engine.connecting.load(Ordering::SeqCst), 1);
        assert_eq!(h.messages(), vec!["Successfully applied policy."]);
    }

    #[test]
    fn test_connecting_without_port_never_reaches_engine() {
        let h = harness(MockEngine::default());
        let args: Vec<&str> = CONNECTING
            .iter()
            .copied()
            .filter(|a| !a.starts_with("port="))
            .collect();

        let err = h.policy.handle_request(&args).unwrap_err();
        assert_eq!(err, PolicyError::MissingArgument("port".into()));
        assert_eq!(h.engine.connecting.load(Ordering::SeqCst), 0);
        assert!(h.messages().is_empty());
    }

    #[test]
    fn test_connecting_with_bad_port_never_reaches_engine() {
        let h = harness(MockEngine::default());
        let err = h
            .policy
            .handle_request(&[
                "connecting",
                "dhcp=yes",
                "lan=yes",
                "relay=10.0.0.1",
                "port=65536",
                "protocol=tcp",
            ])
            .unwrap_err();
        assert_eq!(err.kind(), "Parse");
        assert_eq!(h.engine.total_calls(), 0);
    }

    #[test]
    fn test_connected_builds_parameters() {
        let h = harness(MockEngine::default());
        let outcome = h
            .policy
            .handle_request(&[
                "connected",
                "dhcp=yes",
                "lan=no",
                "relay=10.0.0.1",
                "port=1194",
                "protocol=udp",
                "tunnel=tun0",
                "dns=10.0.0.1",
            ])
            .unwrap();

        assert_eq!(outcome, Outcome::Success);
        assert_eq!(h.engine.connected.load(Ordering::SeqCst), 1);
        let (settings, relay, tunnel, dns) =
            h.engine.last_connected.lock().unwrap().clone().unwrap();
        assert_eq!(
            settings,
            FilteringSettings {
                permit_dhcp: true,
                permit_lan: false
            }
        );
        assert_eq!(
            relay,
            RelayEndpoint {
                ip: "10.0.0.1".into(),
                port: 1194,
                protocol: RelayProtocol::Udp
            }
        );
        assert_eq!(tunnel, "tun0");
        assert_eq!(dns, "10.0.0.1");
        assert_eq!(h.messages(), vec!["Successfully applied policy."]);
    }

    #[test]
    fn test_connected_requires_tunnel_and_dns() {
        let h = harness(MockEngine::default());
        let mut args = CONNECTING.to_vec();
        args[0] = "connected";
        args.push("tunnel=tun0");

        let err = h.policy.handle_request(&args).unwrap_err();
        assert_eq!(err, PolicyError::MissingArgument("dns".into()));
        assert_eq!(h.engine.total_calls(), 0);
    }

    #[test]
    fn test_netblocked_and_reset_need_no_arguments() {
        let h = harness(MockEngine::default());
        assert_eq!(h.policy.handle_request(&["netblocked"]).unwrap(), Outcome::Success);
        assert_eq!(h.policy.handle_request(&["reset"]).unwrap(), Outcome::Success);
        assert_eq!(
            h.messages(),
            vec!["Successfully applied policy.", "Successfully reset policy."]
        );
    }

    #[test]
    fn test_netblocked_ignores_stray_arguments() {
        let h = harness(MockEngine::default());
        assert_eq!(
            h.policy.handle_request(&["netblocked", "not-a-pair"]).unwrap(),
            Outcome::Success
        );
        assert_eq!(h.engine.net_blocked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_twice_reports_success_twice() {
        let h = harness(MockEngine::default());
        for _ in 0..2 {
            assert_eq!(h.policy.handle_request(&["reset"]).unwrap(), Outcome::Success);
        }
        assert_eq!(h.engine.reset.load(Ordering::SeqCst), 2);
        assert_eq!(
            h.messages(),
            vec!["Successfully reset policy.", "Successfully reset policy."]
        );
    }

    #[test]
    fn test_engine_failure_is_reported_not_raised() {
        let h = harness(MockEngine::failing());
        assert_eq!(h.policy.handle_request(CONNECTING).unwrap(), Outcome::Failure);
        assert_eq!(h.policy.handle_request(&["netblocked"]).unwrap(), Outcome::Failure);
        assert_eq!(h.policy.handle_request(&["reset"]).unwrap(), Outcome::Failure);
        assert_eq!(
            h.messages(),
            vec![
                "Failed to apply policy.",
                "Failed to apply policy.",
                "Failed to reset policy."
            ]
        );
    }

    #[test]
    fn test_any_transition_order_is_accepted() {
        let h = harness(MockEngine::default());
        let mut connected = CONNECTING.to_vec();
        connected[0] = "connected";
        connected.extend(["tunnel=wg0", "dns=10.64.0.1"]);

        // connected before connecting, netblocked before anything else.
        assert_eq!(h.policy.handle_request(&["netblocked"]).unwrap(), Outcome::Success);
        assert_eq!(h.policy.handle_request(&connected).unwrap(), Outcome::Success);
        assert_eq!(h.policy.handle_request(CONNECTING).unwrap(), Outcome::Success);
        assert_eq!(h.engine.total_calls(), 3);
    }
}
