//! End-to-end measurement scenarios.

use super::{approx_eq, click, create_widget, drag};
use crate::config::{ImageDetails, SpectrogramConfig, WidgetConfig};
use crate::coords::{DomainBounds, PanelRect};
use crate::keybindings::KeyCode;
use crate::message::{Modifiers, WidgetMessage};
use crate::mode::Mode;
use crate::model::HarmonicSet;
use crate::render::Primitive;
use crate::widget::SpectrogramWidget;

#[test]
fn test_doppler_speed_scenario() {
    let mut w = create_widget();
    w.set_mode(Mode::Doppler);
    // f- = 760 Hz at 10 s, f+ = 1000 Hz at 30 s
    drag(&mut w, (760.0, 900.0), (1000.0, 700.0));

    let fit = w.features().doppler().expect("fit captured").clone();
    assert!(approx_eq(fit.f_zero.frequency, 880.0, 1e-9));
    assert!(approx_eq(fit.delta_f(), 120.0, 1e-9));

    let speed = w.readout().doppler_speed.expect("defined speed");
    assert!(approx_eq(speed, 1500.0 / 880.0 * 120.0, 1e-9));
    assert!(approx_eq(speed, 204.545, 1e-3));
}

#[test]
fn test_doppler_speed_uses_configured_sound_speed() {
    let mut settings = WidgetConfig::default();
    settings.preferences.sound_speed = 343.0;
    let mut w = SpectrogramWidget::new(
        SpectrogramConfig::new(0.0, 100.0, 0.0, 1000.0, "spectrogram.png"),
        ImageDetails::new(1000, 1000),
        settings,
        PanelRect::new(0.0, 0.0, 1000.0, 1000.0),
    )
    .expect("valid widget");
    w.set_mode(Mode::Doppler);
    drag(&mut w, (760.0, 900.0), (1000.0, 700.0));
    let speed = w.readout().doppler_speed.expect("defined speed");
    assert!(approx_eq(speed, 343.0 / 880.0 * 120.0, 1e-9));
}

#[test]
fn test_doppler_speed_undefined_at_zero_hz() {
    let mut w = create_widget();
    w.set_mode(Mode::Doppler);
    // Both endpoints on the 0 Hz edge put f0 at 0 Hz
    drag(&mut w, (0.0, 900.0), (0.0, 700.0));
    let fit = w.features().doppler().expect("fit captured");
    assert!(approx_eq(fit.f_zero.frequency, 0.0, 1e-12));
    assert_eq!(w.readout().doppler_speed, None);
}

#[test]
fn test_doppler_symmetry_grid() {
    let points = [
        (100.0, 100.0),
        (250.0, 900.0),
        (800.0, 450.0),
        (990.0, 10.0),
        (500.0, 700.0),
    ];
    for a in points {
        for b in points {
            if a == b {
                continue;
            }
            let mut w = create_widget();
            w.set_mode(Mode::Doppler);
            drag(&mut w, a, b);
            let fit = w.features().doppler().expect("fit captured");
            assert!(
                fit.f_minus.time < fit.f_plus.time,
                "drag {a:?} -> {b:?} gave {fit:?}"
            );
        }
    }
}

#[test]
fn test_harmonic_ladder_scenario() {
    let set = HarmonicSet::new(1, 0.0, 50.0, "#ffffff");
    let frequencies: Vec<f64> = set.harmonics(0.0, 220.0).map(|(_, f)| f).collect();
    assert_eq!(frequencies, vec![50.0, 100.0, 150.0, 200.0]);

    // Boundaries are inclusive at both ends
    let frequencies: Vec<f64> = set.harmonics(50.0, 200.0).map(|(_, f)| f).collect();
    assert_eq!(frequencies, vec![50.0, 100.0, 150.0, 200.0]);
}

#[test]
fn test_harmonic_ladder_rendered_lines() {
    let mut w = SpectrogramWidget::new(
        SpectrogramConfig::new(0.0, 100.0, 0.0, 220.0, "spectrogram.png"),
        ImageDetails::new(1000, 1000),
        WidgetConfig::default(),
        PanelRect::new(0.0, 0.0, 1000.0, 1000.0),
    )
    .expect("valid widget");
    w.add_harmonic_set(50.0).expect("valid spacing");

    let frame = w.render();
    let mut xs: Vec<f64> = frame
        .items
        .iter()
        .filter(|item| item.owner == Some(Mode::Harmonics))
        .filter_map(|item| match item.primitive {
            Primitive::Line { from, .. } => Some(from.x),
            _ => None,
        })
        .collect();
    xs.sort_by(f64::total_cmp);
    let expected = [50.0, 100.0, 150.0, 200.0].map(|f: f64| f / 220.0 * 1000.0);
    assert_eq!(xs.len(), expected.len());
    for (x, e) in xs.iter().zip(expected) {
        assert!(approx_eq(*x, e, 1e-9));
    }
}

#[test]
fn test_manual_harmonic_anchors_in_visible_window() {
    let mut w = create_widget();
    w.zoom_to_region(DomainBounds {
        time_min: 30.0,
        time_max: 50.0,
        freq_min: 0.0,
        freq_max: 1000.0,
    })
    .expect("region inside bounds");

    let id = w.add_harmonic_set(75.0).expect("valid spacing");
    let set = w.features().harmonic_set(id).expect("set");
    assert!(approx_eq(set.anchor_time, 40.0, 1e-9), "anchor {}", set.anchor_time);
}

#[test]
fn test_manual_harmonic_rejects_bad_spacing() {
    let mut w = create_widget();
    // 1000 Hz over 1000 image columns: nothing finer than 1 Hz
    for spacing in [0.0, -5.0, f64::NAN, f64::INFINITY, 1e-6, 0.999] {
        assert!(w.add_harmonic_set(spacing).is_err(), "spacing {spacing}");
    }
    assert!(w.features().harmonic_sets().is_empty());
    assert!(w.add_harmonic_set(1.0).is_ok());
}

#[test]
fn test_harmonic_click_just_above_zero_hz_creates_nothing() {
    let mut w = create_widget();
    w.set_mode(Mode::Harmonics);
    // 0.05 px from the left edge is 0.05 Hz, a spacing of 0.01 Hz
    click(&mut w, 0.05, 500.0);
    assert!(w.features().harmonic_sets().is_empty());
    assert!(w.render().items.iter().all(|item| item.owner != Some(Mode::Harmonics)));
}

#[test]
fn test_harmonic_click_lands_on_tenth_above_zero() {
    let mut w = SpectrogramWidget::new(
        SpectrogramConfig::new(0.0, 100.0, 100.0, 1100.0, "spectrogram.png"),
        ImageDetails::new(1000, 1000),
        WidgetConfig::default(),
        PanelRect::new(0.0, 0.0, 1000.0, 1000.0),
    )
    .expect("valid widget");
    w.set_mode(Mode::Harmonics);
    // x = 400 is 500 Hz on a 100..1100 Hz axis
    click(&mut w, 400.0, 500.0);
    let set = w.features().harmonic_sets().first().expect("set created");
    assert!(approx_eq(set.spacing, 50.0, 1e-9));
}

#[test]
fn test_undo_redo_through_keys() {
    let mut w = create_widget();
    click(&mut w, 200.0, 200.0);
    click(&mut w, 600.0, 600.0);
    assert_eq!(w.features().markers().len(), 2);

    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::default()
    };
    w.update(WidgetMessage::Key {
        key: KeyCode::Z,
        modifiers: ctrl,
    })
    .expect("undo key");
    assert_eq!(w.features().markers().len(), 1);

    w.update(WidgetMessage::Key {
        key: KeyCode::Y,
        modifiers: ctrl,
    })
    .expect("redo key");
    assert_eq!(w.features().markers().len(), 2);

    w.update(WidgetMessage::Undo).expect("undo");
    w.update(WidgetMessage::Undo).expect("undo");
    assert!(w.features().markers().is_empty());
    assert!(!w.undo());
}

#[test]
fn test_marker_drag_is_one_undo_step() {
    let mut w = create_widget();
    click(&mut w, 300.0, 500.0);
    drag(&mut w, (300.0, 500.0), (450.0, 250.0));

    let marker = w.features().markers().first().expect("marker").clone();
    assert!(approx_eq(marker.frequency, 450.0, 1e-9));
    assert!(approx_eq(marker.time, 75.0, 1e-9));
    assert_eq!(w.features().markers().len(), 1);

    assert!(w.undo());
    let marker = w.features().markers().first().expect("marker");
    assert!(approx_eq(marker.frequency, 300.0, 1e-9));
    assert!(approx_eq(marker.time, 50.0, 1e-9));
}
