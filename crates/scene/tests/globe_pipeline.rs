//! End-to-end: regions and a route go in, SVG comes out, and the globe stops
//! animating once unmounted.

use foundation::math::GeoCoord;
use foundation::time::Time;
use scene::components::{GeoGeometry, RegionFeature, RegionSet};
use scene::globe::{Globe, GlobeConfig, GlobeEvent, HoverTarget};
use scene::NodeRole;

fn box_ring(south: f64, west: f64, north: f64, east: f64) -> Vec<GeoCoord> {
    vec![
        GeoCoord::new(south, west),
        GeoCoord::new(north, west),
        GeoCoord::new(north, east),
        GeoCoord::new(south, east),
        GeoCoord::new(south, west),
    ]
}

fn world() -> RegionSet {
    RegionSet::new(vec![
        RegionFeature::new(
            Some("840".into()),
            "United States of America",
            GeoGeometry::Polygon(vec![box_ring(25.0, -125.0, 49.0, -67.0)]),
        ),
        RegionFeature::new(
            Some("826".into()),
            "United Kingdom",
            GeoGeometry::MultiPolygon(vec![
                vec![box_ring(50.0, -5.5, 58.5, 1.7)],
                vec![box_ring(54.0, -8.2, 55.3, -5.4)],
            ]),
        ),
    ])
}

#[test]
fn search_round_trip_renders_route_over_regions() {
    let mut globe = Globe::new(GlobeConfig::default(), 1000.0);
    assert_eq!(globe.viewport().height, 600.0);
    globe.frame(Time(0.0));
    globe.set_regions(world());

    globe.set_loading(true);
    for i in 1..=30 {
        globe.frame(Time(i as f64 / 60.0));
    }
    let jfk = GeoCoord::new(40.6413, -73.7781);
    let lhr = GeoCoord::new(51.47, -0.4543);
    globe.set_route(
        Some(jfk),
        Some(lhr),
        Some("JFK - New York".into()),
        Some("LHR - London".into()),
    );
    globe.set_loading(false);
    for i in 31..=150 {
        globe.frame(Time(i as f64 / 60.0));
    }

    let svg = globe.render().to_svg();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("data-region=\"United Kingdom\""));
    assert!(svg.contains("data-role=\"route\""));
    assert!(svg.contains("data-role=\"plane\""));
    assert!(svg.contains("data-tooltip=\"JFK - New York\""));
    assert!(!svg.contains("NaN"));

    // Glow is the bottom layer and the destination marker the top one.
    let order = globe.render().role_order();
    assert_eq!(order.first(), Some(&NodeRole::Glow));
    assert_eq!(order.last(), Some(&NodeRole::DestinationMarker));
}

#[test]
fn region_click_reports_name_and_hover_shows_tooltip() {
    let mut globe = Globe::new(GlobeConfig::default(), 640.0);
    globe.frame(Time(0.0));
    globe.set_regions(world());

    globe.hover(HoverTarget::Region(1));
    assert_eq!(globe.tooltip(), Some("United Kingdom"));

    globe.click_region(1);
    let names: Vec<_> = globe
        .drain_events()
        .into_iter()
        .map(|e| e.payload)
        .collect();
    assert_eq!(names, vec![GlobeEvent::RegionSelected("United Kingdom".into())]);

    globe.leave(HoverTarget::Region(1));
    assert_eq!(globe.tooltip(), None);
}

#[test]
fn unmounted_globe_stays_still() {
    let mut globe = Globe::new(GlobeConfig::default(), 640.0);
    globe.frame(Time(0.0));
    globe.set_regions(world());
    globe.set_route(Some(GeoCoord::new(0.0, 0.0)), Some(GeoCoord::new(20.0, 40.0)), None, None);
    globe.set_loading(true);
    globe.frame(Time(0.1));
    globe.unmount();

    let before = globe.view().rotation();
    globe.frame(Time(0.2));
    for i in 3..60 {
        assert!(!globe.frame(Time(i as f64 / 10.0)));
    }
    assert_eq!(globe.view().rotation(), before);
}
