use super::*;
use crate::config::RouterConfig;
use crate::detection::BoundingBox;
use crate::feedback::{FeedbackRequest, QueueMode};
use crate::interaction::{AppMode, InteractionSnapshot};
use std::time::{Duration, Instant};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn snapshot(mode: AppMode, target: Option<&str>) -> InteractionSnapshot {
    InteractionSnapshot {
        phase: "test",
        current_mode: mode,
        selected_mode: mode,
        target_object: target.map(str::to_string),
        current_label_index: 0,
        label_count: 2,
        selecting_target: false,
        awaiting_target_confirmation: false,
        detection_enabled: true,
    }
}

fn general() -> InteractionSnapshot {
    snapshot(AppMode::General, None)
}

fn specific(target: &str) -> InteractionSnapshot {
    snapshot(AppMode::Specific, Some(target))
}

fn object(label: &str, cx: f32, h: f32) -> BoundingBox {
    BoundingBox::from_center(cx, 0.5, 0.2, h, label, 0.9)
}

fn pulses(requests: &[FeedbackRequest]) -> Vec<(u8, u64)> {
    requests
        .iter()
        .filter_map(|request| match request {
            FeedbackRequest::Vibrate {
                intensity,
                duration_ms,
            } => Some((*intensity, *duration_ms)),
            FeedbackRequest::Speak { .. } => None,
        })
        .collect()
}

fn texts(requests: &[FeedbackRequest]) -> Vec<&str> {
    requests.iter().filter_map(|r| r.spoken_text()).collect()
}

#[test]
fn distance_buckets_use_strict_thresholds() {
    assert_eq!(distance_description(0.6), "very close");
    assert_eq!(distance_description(0.5), "close");
    assert_eq!(distance_description(0.31), "close");
    assert_eq!(distance_description(0.3), "medium distance");
    assert_eq!(distance_description(0.16), "medium distance");
    assert_eq!(distance_description(0.15), "far");
    assert_eq!(distance_description(0.0), "far");
}

#[test]
fn pulse_intensity_is_monotonic_and_clamped() {
    assert_eq!(pulse_intensity(0.5), 255);
    assert_eq!(pulse_intensity(0.0), 128);
    assert_eq!(pulse_intensity(1.0), 128);
    assert_eq!(pulse_intensity(-3.0), 50);
    assert_eq!(pulse_intensity(f32::NAN), 50);

    let mut previous = u8::MAX;
    for step in 0..=400 {
        let offset = step as f32 / 100.0;
        let intensity = pulse_intensity(0.5 + offset);
        assert!((50..=255).contains(&intensity));
        assert!(intensity <= previous, "offset {offset}");
        previous = intensity;
    }
}

#[test]
fn general_mode_announces_nearest_after_cooldown() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let t0 = Instant::now();
    let person = [object("person", 0.5, 0.6)];

    let first = router.route(&general(), &person, t0, false);
    assert_eq!(first.len(), 2);
    assert_eq!(router.last_spoken(), Some(t0));

    let at_1200 = router.route(&general(), &person, t0 + ms(1200), false);
    assert_eq!(
        at_1200,
        vec![
            FeedbackRequest::Speak {
                text: "person is very close".to_string(),
                queue: QueueMode::Enqueue,
                tag: None,
            },
            FeedbackRequest::pulse(255, 200),
        ]
    );

    let at_1500 = router.route(&general(), &person, t0 + ms(1500), false);
    assert!(at_1500.is_empty());
}

#[test]
fn general_mode_picks_the_most_centered_box() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let boxes = [
        object("chair", 0.0, 0.2),
        object("traffic_light", 0.75, 0.1),
        object("door", 0.25, 0.4),
    ];
    let requests = router.route(&general(), &boxes, Instant::now(), false);
    // Ties go to the first box in frame order.
    assert_eq!(texts(&requests), vec!["traffic light is far"]);
}

#[test]
fn general_mode_waits_while_engine_is_speaking() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let t0 = Instant::now();
    let boxes = [object("person", 0.5, 0.2)];

    assert!(router.route(&general(), &boxes, t0, true).is_empty());
    assert_eq!(router.last_spoken(), None);
    let later = router.route(&general(), &boxes, t0 + ms(10), false);
    assert_eq!(texts(&later), vec!["person is medium distance"]);
}

#[test]
fn general_emissions_are_never_closer_than_cooldown() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let t0 = Instant::now();
    let boxes = [object("person", 0.5, 0.6)];
    let mut emitted = Vec::new();
    for step in 0..100 {
        let now = t0 + ms(step * 75);
        if !router.route(&general(), &boxes, now, false).is_empty() {
            emitted.push(now);
        }
    }
    assert!(emitted.len() > 1);
    for pair in emitted.windows(2) {
        assert!(pair[1] - pair[0] > ms(1000));
    }
}

#[test]
fn specific_mode_pulses_for_target_without_speech() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let boxes = [object("door", 0.5, 0.4), object("chair", 0.2, 0.4)];
    let requests = router.route(&specific("door"), &boxes, Instant::now(), false);
    assert_eq!(requests, vec![FeedbackRequest::pulse(255, 100)]);
    assert_eq!(router.last_spoken(), None);
}

#[test]
fn specific_mode_pulses_once_per_frame_with_first_match() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let boxes = [
        object("Door", 0.1, 0.4),
        object("door", 0.5, 0.4),
        object("door", 0.9, 0.4),
    ];
    let requests = router.route(&specific("door"), &boxes, Instant::now(), false);
    assert_eq!(pulses(&requests), vec![(pulse_intensity(0.1), 100)]);
    assert!(texts(&requests).is_empty());
}

#[test]
fn specific_mode_names_other_objects_with_flush() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let t0 = Instant::now();
    let boxes = [object("dining_chair", 0.3, 0.4), object("person", 0.5, 0.4)];

    let first = router.route(&specific("door"), &boxes, t0, true);
    assert_eq!(first, vec![FeedbackRequest::say("dining chair")]);
    assert!(router.route(&specific("door"), &boxes, t0 + ms(1000), false).is_empty());
    let again = router.route(&specific("door"), &boxes, t0 + ms(1001), false);
    assert_eq!(texts(&again), vec!["dining chair"]);
}

#[test]
fn cooldown_is_shared_between_modes() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let t0 = Instant::now();
    router.route(&specific("door"), &[object("chair", 0.5, 0.4)], t0, false);
    let person = [object("person", 0.5, 0.6)];
    let general_frame = router.route(&general(), &person, t0 + ms(500), false);
    assert!(general_frame.is_empty());
}

#[test]
fn disabled_or_pending_states_drop_frames() {
    let mut router = DetectionRouter::new(RouterConfig::default());
    let boxes = [object("door", 0.5, 0.6)];
    let now = Instant::now();

    let mut disabled = general();
    disabled.detection_enabled = false;
    assert!(router.route(&disabled, &boxes, now, false).is_empty());

    let mut pending = specific("door");
    pending.awaiting_target_confirmation = true;
    assert!(!DetectionRouter::accepts(&pending));
    assert!(router.route(&pending, &boxes, now, false).is_empty());

    assert!(router
        .route(&snapshot(AppMode::Specific, None), &boxes, now, false)
        .is_empty());
    assert!(router.route(&general(), &[], now, false).is_empty());
    assert_eq!(router.last_spoken(), None);
}

#[test]
fn pulse_durations_follow_config() {
    let config = RouterConfig {
        general_pulse: ms(350),
        target_pulse: ms(40),
        ..RouterConfig::default()
    };
    let mut router = DetectionRouter::new(config);
    let now = Instant::now();
    let boxes = [object("door", 0.5, 0.6)];
    assert_eq!(pulses(&router.route(&general(), &boxes, now, false)), vec![(255, 350)]);
    assert_eq!(
        pulses(&router.route(&specific("door"), &boxes, now, false)),
        vec![(255, 40)]
    );
}
