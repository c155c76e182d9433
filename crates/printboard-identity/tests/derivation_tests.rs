//! Tests for printboard-identity: determinism, sensitivity, namespace isolation

use printboard_core::*;
use printboard_identity::*;
use printboard_signals::{collect, CollectorOptions, Profile, ProfileEnvironment};
use std::time::Duration;
use uuid::Uuid;

fn default_engine() -> DerivationEngine {
    DerivationEngine::from_namespace_str(DEFAULT_NAMESPACE).unwrap()
}

fn signals() -> SignalSet {
    SignalSet {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".into(),
        language: "en-US".into(),
        platform: "Linux x86_64".into(),
        screen_width: "1920".into(),
        screen_height: "1080".into(),
        color_depth: "24".into(),
        timezone: "Europe/Berlin".into(),
        touch_support: false,
        cookies_enabled: true,
        canvas: "data:image/png;base64,iVBORw0KGgo=".into(),
        webgl_vendor: "Mesa".into(),
        webgl_renderer: "llvmpipe".into(),
        audio: "0,0,3,17,128".into(),
        fonts: vec!["Arial".into(), "Courier New".into()],
    }
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn identifier_matches_reference_vector() {
    // uuid v5 of the canonical JSON under the default namespace, computed
    // independently of this crate.
    let fp = default_engine().derive(&signals()).unwrap();
    assert_eq!(fp.id, "5cd5fce7-ca82-5619-8b38-931e9a20bbce");
    assert_eq!(fp.moniker, "Wild Finch");
    assert_eq!(fp.emoji, "🐺");
}

#[test]
fn derive_is_deterministic_across_calls_and_engines() {
    let a = default_engine().derive_at(&signals(), 1).unwrap();
    let b = default_engine().derive_at(&signals(), 999_999).unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(a.moniker, b.moniker);
    assert_eq!(a.emoji, b.emoji);
    assert_eq!(a.details, b.details);
    assert_ne!(a.timestamp, b.timestamp);
}

#[test]
fn display_fields_recompute_from_id_alone() {
    let fp = default_engine().derive(&signals()).unwrap();
    let (moniker, emoji) = DerivationEngine::display_for(&fp.id).unwrap();
    assert_eq!(moniker, fp.moniker);
    assert_eq!(emoji, fp.emoji);
}

#[test]
fn identifier_is_hyphenated_128_bit_hex() {
    let fp = default_engine().derive(&signals()).unwrap();
    assert_eq!(fp.id.len(), 36);
    let parsed = Uuid::parse_str(&fp.id).unwrap();
    assert_eq!(parsed.get_version_num(), 5);
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn every_field_changes_the_identifier() {
    let engine = default_engine();
    let base = engine.derive(&signals()).unwrap().id;

    fn m(f: impl Fn(&mut SignalSet) + 'static) -> Box<dyn Fn(&mut SignalSet)> {
        Box::new(f)
    }

    let mutations: Vec<(&str, Box<dyn Fn(&mut SignalSet)>)> = vec![
        ("userAgent", m(|s| s.user_agent.push('!'))),
        ("language", m(|s| s.language = "en-GB".into())),
        ("platform", m(|s| s.platform = "Win32".into())),
        ("screenWidth", m(|s| s.screen_width = "1366".into())),
        ("screenHeight", m(|s| s.screen_height = "768".into())),
        ("colorDepth", m(|s| s.color_depth = "30".into())),
        ("timezone", m(|s| s.timezone = "UTC".into())),
        ("touchSupport", m(|s| s.touch_support = true)),
        ("cookiesEnabled", m(|s| s.cookies_enabled = false)),
        ("canvas", m(|s| s.canvas.push('A'))),
        ("webglVendor", m(|s| s.webgl_vendor = "NVIDIA".into())),
        ("webglRenderer", m(|s| s.webgl_renderer = "GeForce".into())),
        ("audio", m(|s| s.audio = "0,0,3,17,129".into())),
        ("fonts", m(|s| {
            s.fonts.pop();
        })),
    ];

    for (field, mutate) in mutations {
        let mut s = signals();
        mutate(&mut s);
        let id = engine.derive(&s).unwrap().id;
        assert_ne!(id, base, "identifier insensitive to {}", field);
    }
}

#[test]
fn screen_size_change_changes_identifier() {
    let engine = default_engine();
    let mut s = signals();
    let before = engine.derive(&s).unwrap();
    s.screen_width = "1366".into();
    s.screen_height = "768".into();
    let after = engine.derive(&s).unwrap();
    assert_ne!(before.id, after.id);
    assert_eq!(after.details.screen_size, "1366x768");
}

// ===========================================================================
// Namespace isolation
// ===========================================================================

#[test]
fn different_namespaces_diverge() {
    let a = DerivationEngine::new(Uuid::parse_str(DEFAULT_NAMESPACE).unwrap());
    let b = DerivationEngine::new(Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap());
    assert_eq!(a.namespace(), default_engine().namespace());
    assert_ne!(a.namespace(), b.namespace());
    assert_ne!(a.derive(&signals()).unwrap().id, b.derive(&signals()).unwrap().id);
}

// ===========================================================================
// Details projection
// ===========================================================================

#[test]
fn details_digest_raw_probe_output() {
    let fp = default_engine().derive(&signals()).unwrap();
    let d = &fp.details;
    assert_eq!(d.browser, "Firefox");
    assert_eq!(d.os, "Linux");
    assert_eq!(d.color_depth, "24-bit");
    assert_eq!(d.canvas_hash, digest("data:image/png;base64,iVBORw0KGgo="));
    assert_eq!(d.audio_hash, digest("0,0,3,17,128"));
    assert_eq!(d.canvas_hash.len(), 64);
}

// ===========================================================================
// Collector -> engine
// ===========================================================================

#[tokio::test]
async fn collected_profile_derives_reference_identifier() {
    let profile = Profile {
        user_agent: Some(signals().user_agent),
        language: Some("en-US".into()),
        platform: Some("Linux x86_64".into()),
        screen_width: Some(1920),
        screen_height: Some(1080),
        color_depth: Some(24),
        timezone: Some("Europe/Berlin".into()),
        touch_support: Some(false),
        cookies_enabled: Some(true),
        canvas: Some("data:image/png;base64,iVBORw0KGgo=".into()),
        webgl_vendor: Some("Mesa".into()),
        webgl_renderer: Some("llvmpipe".into()),
        audio_bins: Some(vec![0, 0, 3, 17, 128]),
        installed_fonts: Some(vec!["Courier New".into(), "Arial".into()]),
    };
    let options = CollectorOptions {
        audio_window: Duration::from_millis(1),
        ..Default::default()
    };
    let collected = collect(&ProfileEnvironment::new(profile), &options).await;
    let fp = default_engine().derive(&collected.signals).unwrap();
    assert_eq!(fp.id, "5cd5fce7-ca82-5619-8b38-931e9a20bbce");
}
