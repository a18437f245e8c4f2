//! End-to-end onboarding flows against a mocked Directory backend.
//!
//! The wallet provider is played by the test through the wallet bridge;
//! the Directory is played by mockito.

use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};
use tokio::time::timeout;

use fomo_client::{
    ClientSettings, FomoClient, ModalView, OnboardingDomainEvent, OnboardingEventPort,
    WalletAddress, WalletBridgeCommand,
};

async fn build_client(server: &ServerGuard) -> FomoClient {
    let mut settings = ClientSettings::default();
    settings.directory.base_url = server.url();
    settings.directory.request_timeout = Duration::from_secs(5);
    settings.wallet.reconnect_delay = Duration::from_millis(1);

    FomoClient::builder()
        .settings_path("/nonexistent/never-touched.json")
        .settings(settings)
        .build()
        .await
        .expect("client should assemble")
}

async fn wait_for_view<F>(
    events: &mut tokio::sync::mpsc::Receiver<OnboardingDomainEvent>,
    mut predicate: F,
) -> ModalView
where
    F: FnMut(&ModalView) -> bool,
{
    loop {
        let event = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event timeout")
            .expect("event channel closed");
        if let OnboardingDomainEvent::SessionChanged { view } = event {
            if predicate(&view) {
                return view;
            }
        }
    }
}

fn fresh_user_json() -> &'static str {
    r#"{
        "wallet_address": "0xabc",
        "invite_code": "NEWC0D",
        "referred_by": null,
        "twitter_username": null,
        "twitter_verified": false,
        "terms_accepted": false,
        "created_at": "2025-05-02T09:30:00+00:00"
    }"#
}

#[tokio::test]
async fn new_wallet_completes_onboarding_end_to_end() {
    let mut server = Server::new_async().await;

    let lookup = server
        .mock("GET", "/api/user/0xabc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"exists": false, "user": null}"#)
        .create_async()
        .await;
    let register_plain = server
        .mock("POST", "/api/user/register")
        .match_body(Matcher::JsonString(
            r#"{"wallet_address": "0xabc", "invite_code": ""}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"success": true, "is_new": true, "user": {}, "message": "Wallet registered successfully"}}"#,
            fresh_user_json()
        ))
        .create_async()
        .await;
    let verify = server
        .mock("POST", "/api/invite/verify")
        .match_body(Matcher::JsonString(
            r#"{"invite_code": "FRIEND"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"valid": true, "message": "Valid invite code"}"#)
        .create_async()
        .await;
    let register_with_code = server
        .mock("POST", "/api/user/register")
        .match_body(Matcher::JsonString(
            r#"{"wallet_address": "0xabc", "invite_code": "FRIEND"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success": true, "is_new": false, "user": {
                "wallet_address": "0xabc",
                "invite_code": "NEWC0D",
                "referred_by": "FRIEND",
                "twitter_username": null,
                "twitter_verified": false,
                "terms_accepted": false,
                "created_at": "2025-05-02T09:30:00+00:00"
            }, "message": "Wallet already registered"}"#,
        )
        .create_async()
        .await;
    let twitter = server
        .mock("POST", "/api/twitter/connect")
        .match_body(Matcher::JsonString(
            r#"{"wallet_address": "0xabc", "twitter_username": "@realuser"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "message": "Twitter connected successfully"}"#)
        .create_async()
        .await;
    let terms = server
        .mock("POST", "/api/user/accept-terms")
        .match_body(Matcher::JsonString(
            r#"{"wallet_address": "0xabc"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "message": "Terms accepted successfully"}"#)
        .create_async()
        .await;

    let client = build_client(&server).await;
    let mut events = client.onboarding().subscribe().await.expect("subscribe");

    client.onboarding().open_modal(None).await.expect("open");
    client
        .wallet_bridge()
        .report_account_change(Some(WalletAddress::from("0xabc")))
        .await;

    let view = wait_for_view(&mut events, |view| view.step == Some(2)).await;
    assert_eq!(view.address.as_deref(), Some("0xabc"));

    client
        .onboarding()
        .set_invite_draft("friend".to_string())
        .await
        .expect("draft");
    client.onboarding().submit_invite().await.expect("submit");
    wait_for_view(&mut events, |view| view.step == Some(3)).await;

    client
        .onboarding()
        .link_social(Some("@realuser".to_string()))
        .await
        .expect("link");
    let view = wait_for_view(&mut events, |view| view.step == Some(4)).await;
    assert_eq!(view.twitter_handle.as_deref(), Some("@realuser"));

    client
        .onboarding()
        .set_terms_agreement(true)
        .await
        .expect("agree");
    client.onboarding().accept_terms().await.expect("accept");

    let view = wait_for_view(&mut events, |view| view.active).await;
    assert_eq!(view.own_invite_code.as_deref(), Some("NEWC0D"));

    lookup.assert_async().await;
    register_plain.assert_async().await;
    verify.assert_async().await;
    register_with_code.assert_async().await;
    twitter.assert_async().await;
    terms.assert_async().await;
}

#[tokio::test]
async fn returning_wallet_lands_straight_on_connected_view() {
    let mut server = Server::new_async().await;

    let lookup = server
        .mock("GET", "/api/user/0xdef")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"exists": true, "user": {
                "wallet_address": "0xdef",
                "invite_code": "SHARE1",
                "referred_by": null,
                "twitter_username": "@user_k3x9m2",
                "twitter_verified": true,
                "terms_accepted": true,
                "created_at": "2025-04-01T08:00:00+00:00"
            }}"#,
        )
        .create_async()
        .await;

    let client = build_client(&server).await;
    let mut events = client.onboarding().subscribe().await.expect("subscribe");

    client.onboarding().open_modal(None).await.expect("open");
    client
        .wallet_bridge()
        .report_account_change(Some(WalletAddress::from("0xdef")))
        .await;

    let view = wait_for_view(&mut events, |view| view.active).await;
    assert_eq!(view.own_invite_code.as_deref(), Some("SHARE1"));
    assert_eq!(view.twitter_handle.as_deref(), Some("@user_k3x9m2"));

    // The completed-registration notification follows the view update.
    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event timeout")
        .expect("event channel closed");
    match event {
        OnboardingDomainEvent::RegistrationCompleted { address, user } => {
            assert_eq!(address.as_str(), "0xdef");
            assert!(user.terms_accepted);
        }
        other => panic!("expected RegistrationCompleted, got {:?}", other),
    }

    lookup.assert_async().await;
}

#[tokio::test]
async fn provider_commands_flow_out_through_the_bridge() {
    let mut server = Server::new_async().await;

    let _lookup = server
        .mock("GET", "/api/user/0xdef")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"exists": true, "user": {
                "wallet_address": "0xdef",
                "invite_code": "SHARE1",
                "referred_by": null,
                "twitter_username": null,
                "twitter_verified": false,
                "terms_accepted": true,
                "created_at": "2025-04-01T08:00:00+00:00"
            }}"#,
        )
        .create_async()
        .await;

    let client = build_client(&server).await;
    let bridge = client.wallet_bridge();
    let mut commands = bridge.subscribe_commands();
    let mut events = client.onboarding().subscribe().await.expect("subscribe");

    client.onboarding().open_modal(None).await.expect("open");
    client
        .onboarding()
        .request_wallet_connect()
        .await
        .expect("connect request");

    let command = timeout(Duration::from_secs(2), commands.recv())
        .await
        .expect("command timeout")
        .expect("command channel closed");
    assert_eq!(command, WalletBridgeCommand::OpenChooser);

    // The "provider" answers with an account.
    bridge
        .report_account_change(Some(WalletAddress::from("0xdef")))
        .await;
    wait_for_view(&mut events, |view| view.active).await;

    client.onboarding().disconnect().await.expect("disconnect");
    let command = timeout(Duration::from_secs(2), commands.recv())
        .await
        .expect("command timeout")
        .expect("command channel closed");
    assert_eq!(command, WalletBridgeCommand::Disconnect);

    let view = wait_for_view(&mut events, |view| !view.active).await;
    assert_eq!(view.step, Some(1));
}
